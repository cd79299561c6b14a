// Copyright 2023 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! Small dense linear-system solve used by the linearised binding equations.

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Solve `a · x = b` by LU decomposition with partial pivoting.
///
/// Systems here are tiny (one row per carrier-binding ion or adsorbing
/// species), so a dense factorisation is the whole story.
pub fn solve_dense(a: DMatrix<f64>, b: DVector<f64>) -> Result<DVector<f64>> {
    a.lu().solve(&b).ok_or(Error::Singular)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solves_two_by_two() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[5.0, 10.0]);
        let x = solve_dense(a, b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_singular_system() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(matches!(solve_dense(a, b), Err(Error::Singular)));
    }
}

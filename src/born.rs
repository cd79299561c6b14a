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

//! Zero-field partition coefficients from the Born charging energy.

use physical_constants::{BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY};
use std::f64::consts::PI;

/// Born solvation model for the zero-potential partition coefficient.
///
/// Transferring an ion of valency z and radius r from partition B (εᵦ) to
/// partition A (εₐ) costs the Born charging energy
/// ΔG = z²e²/(8πε₀r)·(1/εₐ − 1/εᵦ), giving the zero-field coefficient
/// k₀ = cₐ/cᵦ = exp(−ΔG/kT). Used when the caller supplies no coefficient.
///
/// # Examples
/// ~~~
/// use donnan::BornPartitionModel;
/// let born = BornPartitionModel::new(78.4, 78.4, 298.15);
/// // equal permittivities: no solvation penalty in either direction
/// assert_eq!(born.partition_coefficient(1, 3.58e-10), 1.0);
///
/// let born = BornPartitionModel::new(10.0, 78.4, 298.15);
/// // transfer into the low-permittivity partition is strongly unfavourable
/// assert!(born.partition_coefficient(1, 3.58e-10) < 1e-10);
/// ~~~
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BornPartitionModel {
    permittivity_a: f64,
    permittivity_b: f64,
    temperature: f64,
}

impl BornPartitionModel {
    /// New model from the two partition permittivities and the temperature (K)
    pub const fn new(permittivity_a: f64, permittivity_b: f64, temperature: f64) -> Self {
        Self {
            permittivity_a,
            permittivity_b,
            temperature,
        }
    }

    /// Charging energy difference ΔG (J) for one ion of valency `charge`
    /// and radius `radius` in meters
    pub fn transfer_energy(&self, charge: i32, radius: f64) -> f64 {
        f64::from(charge * charge) * ELEMENTARY_CHARGE.powi(2)
            / (8.0 * PI * VACUUM_ELECTRIC_PERMITTIVITY * radius)
            * (1.0 / self.permittivity_a - 1.0 / self.permittivity_b)
    }

    /// Zero-field partition coefficient k₀ = exp(−ΔG/kT)
    pub fn partition_coefficient(&self, charge: i32, radius: f64) -> f64 {
        (-self.transfer_energy(charge, radius) / (BOLTZMANN_CONSTANT * self.temperature)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quadratic_in_valency() {
        let born = BornPartitionModel::new(40.0, 78.4, 298.15);
        let k1 = born.partition_coefficient(1, 4e-10);
        let k2 = born.partition_coefficient(2, 4e-10);
        // ΔG scales with z², so k(2) = k(1)^4
        assert_relative_eq!(k2, k1.powi(4), max_relative = 1e-10);
    }

    #[test]
    fn direction_of_transfer_sets_the_sign() {
        let towards_oil = BornPartitionModel::new(10.0, 78.4, 298.15);
        let towards_water = BornPartitionModel::new(78.4, 10.0, 298.15);
        assert!(towards_oil.partition_coefficient(-1, 3.3e-10) < 1.0);
        assert!(towards_water.partition_coefficient(-1, 3.3e-10) > 1.0);
    }
}

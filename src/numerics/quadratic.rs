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

//! Numerically stable quadratic roots and physical-range root selection,
//! shared by the carrier mass balance and the surface-site occupancy.

use crate::error::{Error, Result};

/// Both roots of `aa·x² + bb·x + cc = 0` via the sign-preserving quadratic
/// formula: the larger-magnitude root is computed directly and the companion
/// as `cc/q`, avoiding the catastrophic cancellation of the textbook form.
///
/// `None` when the roots are complex beyond rounding; a discriminant that is
/// negative within rounding only is clamped to zero (logged, not fatal).
pub fn stable_quadratic_roots(aa: f64, bb: f64, cc: f64) -> Option<[f64; 2]> {
    let mut disc = bb * bb - 4.0 * aa * cc;
    if disc < 0.0 {
        if disc > -1e-12 * (bb * bb + (4.0 * aa * cc).abs()) {
            log::debug!("clamping slightly negative discriminant {disc:.3e} to zero");
            disc = 0.0;
        } else {
            return None;
        }
    }
    let q = -0.5 * (bb + bb.signum() * disc.sqrt());
    Some([q / aa, cc / q])
}

/// The unique root inside `[0, upper]`, within rounding slack.
/// Zero or two qualifying roots indicate an inconsistent configuration and
/// raise [`Error::NoPhysicalRoot`].
pub fn select_physical_root(roots: [f64; 2], upper: f64) -> Result<f64> {
    let slack = 1e-12 * (1.0 + upper.abs());
    let admits = |r: f64| r.is_finite() && r >= -slack && r <= upper + slack;
    match (admits(roots[0]), admits(roots[1])) {
        (true, false) => Ok(roots[0].clamp(0.0, upper)),
        (false, true) => Ok(roots[1].clamp(0.0, upper)),
        _ => Err(Error::NoPhysicalRoot { upper, roots }),
    }
}

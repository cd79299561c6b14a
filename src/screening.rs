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

//! Ionic strength and electrostatic screening lengths in SI units.

use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};
use std::f64::consts::PI;

/// Ionic strength ½·Σ zᵢ²·cᵢ of `(valency, concentration)` pairs.
///
/// Concentrations in mol/m³ give the ionic strength in mol/m³.
///
/// # Examples
/// ~~~
/// use donnan::screening::ionic_strength;
/// // 0.1 M CaCl₂ = 100 mol/m³ Ca²⁺ + 200 mol/m³ Cl⁻
/// let i = ionic_strength([(2, 100.0), (-1, 200.0)].into_iter());
/// assert_eq!(i, 300.0);
/// ~~~
pub fn ionic_strength(pairs: impl Iterator<Item = (i32, f64)>) -> f64 {
    0.5 * pairs
        .map(|(valency, concn)| f64::from(valency * valency) * concn)
        .sum::<f64>()
}

/// Bjerrum length λ𝐵 = e²/4πεᵣε₀𝑘𝑇 in meters.
///
/// # Examples
/// ~~~
/// # use approx::assert_relative_eq;
/// use donnan::screening::bjerrum_length;
/// assert_relative_eq!(bjerrum_length(293.0, 80.0), 7.1288799871283e-10, max_relative = 1e-12);
/// ~~~
pub fn bjerrum_length(temperature: f64, relative_permittivity: f64) -> f64 {
    ELEMENTARY_CHARGE.powi(2)
        / (4.0
            * PI
            * relative_permittivity
            * VACUUM_ELECTRIC_PERMITTIVITY
            * BOLTZMANN_CONSTANT
            * temperature)
}

/// Debye screening length λ𝐷 = √(εᵣε₀𝑘𝑇 / 2e²𝑁𝐴𝐼) in meters,
/// with the ionic strength 𝐼 in mol/m³. `None` when the ionic strength is zero.
///
/// # Examples
/// ~~~
/// # use approx::assert_relative_eq;
/// use donnan::screening::debye_length;
/// // 0.03 M 1:1 salt at 293 K in water
/// let lambda = debye_length(293.0, 80.0, 30.0).unwrap();
/// assert_relative_eq!(lambda, 1.7576538097378368e-9, max_relative = 1e-12);
/// assert!(debye_length(293.0, 80.0, 0.0).is_none());
/// ~~~
pub fn debye_length(temperature: f64, relative_permittivity: f64, ionic_strength: f64) -> Option<f64> {
    if ionic_strength <= 0.0 {
        return None;
    }
    Some(
        (relative_permittivity * VACUUM_ELECTRIC_PERMITTIVITY * BOLTZMANN_CONSTANT * temperature
            / (2.0 * ELEMENTARY_CHARGE.powi(2) * AVOGADRO_CONSTANT * ionic_strength))
            .sqrt(),
    )
}

/// Inverse Debye length κ in 1/m, or `None` when the ionic strength is zero
pub fn kappa(temperature: f64, relative_permittivity: f64, ionic_strength: f64) -> Option<f64> {
    debye_length(temperature, relative_permittivity, ionic_strength).map(f64::recip)
}

/// Boltzmann factor e^x with the exponent clamped to ±500 so that wild
/// trial potentials stay finite instead of overflowing to infinity
pub(crate) fn boltzmann_factor(exponent: f64) -> f64 {
    exponent.clamp(-500.0, 500.0).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn debye_and_bjerrum_are_consistent() {
        // λD = 1/√(8π·λB·NA·I) must match the εkT form
        let (t, eps, i) = (298.15, 78.4, 100.0);
        let from_bjerrum = (8.0
            * PI
            * bjerrum_length(t, eps)
            * physical_constants::AVOGADRO_CONSTANT
            * i)
            .sqrt()
            .recip();
        assert_relative_eq!(debye_length(t, eps, i).unwrap(), from_bjerrum, max_relative = 1e-12);
    }

    #[test]
    fn ionic_strength_of_symmetric_salt_is_concentration() {
        assert_relative_eq!(ionic_strength([(1, 100.0), (-1, 100.0)].into_iter()), 100.0);
    }
}

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

//! Relative permittivity models for filling in partition and Stern-layer
//! dielectric constants.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Trait for media with a (possibly temperature dependent) relative permittivity
pub trait RelativePermittivity {
    /// Relative permittivity at `temperature` (K).
    /// Errors when the temperature is outside the model's validity range.
    fn permittivity(&self, temperature: f64) -> Result<f64>;
}

/// Temperature independent relative permittivity, εᵣ = constant
///
/// # Examples
/// ~~~
/// use donnan::permittivity::{ConstantPermittivity, RelativePermittivity};
/// let dielec = ConstantPermittivity::new(2.0);
/// assert_eq!(dielec.permittivity(298.15).unwrap(), 2.0);
/// ~~~
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct ConstantPermittivity {
    permittivity: f64,
}

impl ConstantPermittivity {
    /// New constant permittivity
    pub const fn new(permittivity: f64) -> Self {
        Self { permittivity }
    }
}

impl RelativePermittivity for ConstantPermittivity {
    fn permittivity(&self, _: f64) -> Result<f64> {
        Ok(self.permittivity)
    }
}

/// Empirical model for the temperature dependent relative permittivity, εᵣ(𝑇)
///
/// For more information, see
/// [Neau and Raspo](https://doi.org/10.1016/j.fluid.2019.112371).
///
/// # Examples
/// ~~~
/// use donnan::permittivity::{EmpiricalPermittivity, RelativePermittivity};
/// assert_eq!(EmpiricalPermittivity::WATER.permittivity(298.15).unwrap(), 78.35565171480539);
/// assert_eq!(EmpiricalPermittivity::METHANOL.permittivity(298.15).unwrap(), 33.081980713895064);
/// assert_eq!(EmpiricalPermittivity::ETHANOL.permittivity(298.15).unwrap(), 24.33523434183735);
/// ~~~
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct EmpiricalPermittivity {
    /// Coefficients for the model
    coeffs: [f64; 5],
    /// Closed temperature interval in which the model is valid
    temperature_interval: (f64, f64),
}

impl EmpiricalPermittivity {
    /// Creates a new instance of the NR model
    pub const fn new(coeffs: &[f64; 5], temperature_interval: (f64, f64)) -> Self {
        Self {
            coeffs: *coeffs,
            temperature_interval,
        }
    }
    /// Relative permittivity of water
    pub const WATER: EmpiricalPermittivity = EmpiricalPermittivity::new(
        &[-1664.4988, -0.884533, 0.0003635, 64839.1736, 308.3394],
        (273.0, 403.0),
    );
    /// Relative permittivity of methanol
    pub const METHANOL: EmpiricalPermittivity = EmpiricalPermittivity::new(
        &[-1750.3069, -0.99026, 0.0004666, 51360.2652, 327.3124],
        (176.0, 318.0),
    );
    /// Relative permittivity of ethanol
    pub const ETHANOL: EmpiricalPermittivity = EmpiricalPermittivity::new(
        &[-1522.2782, -1.00508, 0.0005211, 38733.9481, 293.1133],
        (288.0, 328.0),
    );
}

impl RelativePermittivity for EmpiricalPermittivity {
    fn permittivity(&self, temperature: f64) -> Result<f64> {
        if temperature < self.temperature_interval.0 || temperature > self.temperature_interval.1 {
            return Err(Error::Configuration(format!(
                "temperature {temperature} K outside permittivity model range [{}, {}]",
                self.temperature_interval.0, self.temperature_interval.1
            )));
        }
        Ok(self.coeffs[0]
            + self.coeffs[1] * temperature
            + self.coeffs[2] * temperature.powi(2)
            + self.coeffs[3] / temperature
            + self.coeffs[4] * temperature.ln())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_model_rejects_out_of_range_temperature() {
        assert!(EmpiricalPermittivity::WATER.permittivity(500.0).is_err());
        assert!(EmpiricalPermittivity::WATER.permittivity(298.15).is_ok());
    }
}

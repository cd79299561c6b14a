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

//! System geometry, media, and solver control parameters.

use derive_builder::Builder;
use physical_constants::{BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE};
use serde::{Deserialize, Serialize};

/// Tolerances, iteration caps, and search seeds shared by all solvers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverSettings {
    /// Convergence tolerance for the outer minimizations
    pub tolerance: f64,
    /// Iteration cap for minimizations and bisections
    pub max_iterations: usize,
    /// Initial estimate of the equilibrium potential (V)
    pub initial_potential: f64,
    /// Initial simplex step around the potential estimate (V)
    pub initial_step: f64,
    /// Bracket expansion retries before bisection gives up
    pub bracket_expansions: usize,
    /// Relative net-charge imbalance above which a
    /// [`crate::NeutralityWarning`] is issued
    pub neutrality_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 400,
            initial_potential: 0.0,
            initial_step: 0.025,
            bracket_expansions: 16,
            neutrality_tolerance: 1e-6,
        }
    }
}

/// Geometry and media of a two-partition Donnan system.
///
/// Partition B hosts the carrier, when one is present. Constructed through
/// [`PartitionSystemBuilder`], which validates at build time:
///
/// ~~~
/// use donnan::PartitionSystemBuilder;
/// let system = PartitionSystemBuilder::default()
///     .volume_a(1e-3)
///     .volume_b(1e-3)
///     .permittivity_a(78.4)
///     .permittivity_b(78.4)
///     .build()
///     .unwrap();
/// assert_eq!(system.temperature, 298.15);
/// assert!(PartitionSystemBuilder::default().build().is_err()); // volumes missing
/// ~~~
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct PartitionSystem {
    /// Volume of partition A (m³)
    pub volume_a: f64,
    /// Volume of partition B (m³)
    pub volume_b: f64,
    /// Interfacial contact area (m²); required when `interfacial_charge` is set
    #[builder(default = "0.0")]
    pub area: f64,
    /// Relative permittivity of partition A
    pub permittivity_a: f64,
    /// Relative permittivity of partition B
    pub permittivity_b: f64,
    /// Relative permittivity of the Stern layer facing partition A;
    /// falls back to `permittivity_a`
    #[builder(default, setter(strip_option))]
    pub stern_permittivity_a: Option<f64>,
    /// Relative permittivity of the Stern layer facing partition B;
    /// falls back to `permittivity_b`
    #[builder(default, setter(strip_option))]
    pub stern_permittivity_b: Option<f64>,
    /// Absolute temperature (K)
    #[builder(default = "298.15")]
    pub temperature: f64,
    /// Total carrier concentration in partition B (mol/l); zero = no carrier
    #[builder(default = "0.0")]
    pub carrier_concn: f64,
    /// Carrier radius (ångström); complexed ions enter the Stern-layer
    /// average with this radius
    #[builder(default = "0.0")]
    pub carrier_radius: f64,
    /// Include the interfacial-charge / double-layer correction
    #[builder(default = "false")]
    pub interfacial_charge: bool,
    /// Numerical controls
    #[builder(default)]
    pub settings: SolverSettings,
}

impl PartitionSystemBuilder {
    fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("volume_a", self.volume_a),
            ("volume_b", self.volume_b),
            ("permittivity_a", self.permittivity_a),
            ("permittivity_b", self.permittivity_b),
        ] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    return Err(format!("{label} must be positive, got {v}"));
                }
            }
        }
        if let Some(t) = self.temperature {
            if !(t > 0.0) {
                return Err(format!("temperature must be positive, got {t}"));
            }
        }
        if let Some(c) = self.carrier_concn {
            if c < 0.0 {
                return Err(format!("carrier_concn must be non-negative, got {c}"));
            }
        }
        if self.interfacial_charge == Some(true) && !matches!(self.area, Some(a) if a > 0.0) {
            return Err("interfacial_charge requires a positive interfacial area".into());
        }
        Ok(())
    }
}

impl PartitionSystem {
    /// Thermal voltage kT/e (V)
    pub fn thermal_voltage(&self) -> f64 {
        BOLTZMANN_CONSTANT * self.temperature / ELEMENTARY_CHARGE
    }
    /// Stern-layer permittivity on the A side, with fallback
    pub fn stern_permittivity_a(&self) -> f64 {
        self.stern_permittivity_a.unwrap_or(self.permittivity_a)
    }
    /// Stern-layer permittivity on the B side, with fallback
    pub fn stern_permittivity_b(&self) -> f64 {
        self.stern_permittivity_b.unwrap_or(self.permittivity_b)
    }
}

/// Geometry and media of a single charged surface in contact with one electrolyte.
///
/// ~~~
/// use donnan::SurfaceSystemBuilder;
/// let system = SurfaceSystemBuilder::default()
///     .area(1e-4)
///     .volume(1e-3)
///     .permittivity(78.4)
///     .stern_permittivity(6.0)
///     .build()
///     .unwrap();
/// assert_eq!(system.site_density, 0.0);
/// ~~~
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SurfaceSystem {
    /// Charged surface area (m²)
    pub area: f64,
    /// Electrolyte volume (m³)
    pub volume: f64,
    /// Relative permittivity of the electrolyte
    pub permittivity: f64,
    /// Relative permittivity of the Stern layer; `None` disables the Stern correction
    #[builder(default, setter(strip_option))]
    pub stern_permittivity: Option<f64>,
    /// Absolute temperature (K)
    #[builder(default = "298.15")]
    pub temperature: f64,
    /// Density of specific adsorption sites (mol/m²); zero disables adsorption
    #[builder(default = "0.0")]
    pub site_density: f64,
    /// Numerical controls
    #[builder(default)]
    pub settings: SolverSettings,
}

impl SurfaceSystemBuilder {
    fn validate(&self) -> Result<(), String> {
        for (label, value) in [
            ("area", self.area),
            ("volume", self.volume),
            ("permittivity", self.permittivity),
        ] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    return Err(format!("{label} must be positive, got {v}"));
                }
            }
        }
        if let Some(t) = self.temperature {
            if !(t > 0.0) {
                return Err(format!("temperature must be positive, got {t}"));
            }
        }
        if let Some(d) = self.site_density {
            if d < 0.0 {
                return Err(format!("site_density must be non-negative, got {d}"));
            }
        }
        Ok(())
    }
}

impl SurfaceSystem {
    /// Thermal voltage kT/e (V)
    pub fn thermal_voltage(&self) -> f64 {
        BOLTZMANN_CONSTANT * self.temperature / ELEMENTARY_CHARGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_bad_geometry() {
        let err = PartitionSystemBuilder::default()
            .volume_a(-1.0)
            .volume_b(1e-3)
            .permittivity_a(78.4)
            .permittivity_b(78.4)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("volume_a"));
    }

    #[test]
    fn interfacial_charge_requires_area() {
        let err = PartitionSystemBuilder::default()
            .volume_a(1e-3)
            .volume_b(1e-3)
            .permittivity_a(78.4)
            .permittivity_b(78.4)
            .interfacial_charge(true)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("area"));
    }

    #[test]
    fn stern_permittivity_falls_back_to_partition() {
        let system = PartitionSystemBuilder::default()
            .volume_a(1e-3)
            .volume_b(1e-3)
            .permittivity_a(78.4)
            .permittivity_b(10.0)
            .stern_permittivity_a(6.0)
            .build()
            .unwrap();
        assert_eq!(system.stern_permittivity_a(), 6.0);
        assert_eq!(system.stern_permittivity_b(), 10.0);
    }
}

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

//! YAML scenario descriptions consumed by the command line tool.
//!
//! A scenario bundles a species list with system geometry and says which of
//! the two solver families to run. Permittivities may be given numerically
//! or as a named solvent resolved at the scenario temperature.

use crate::donnan::DonnanSolver;
use crate::error::{Error, Result};
use crate::params::{PartitionSystemBuilder, SolverSettings, SurfaceSystemBuilder};
use crate::permittivity::{EmpiricalPermittivity, RelativePermittivity};
use crate::result::{DonnanResult, SurfaceResult};
use crate::species::{BuiltinIonProperties, IonSpecies};
use crate::surface::GouyChapmanSternSolver;
use core::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

fn default_temperature() -> f64 {
    298.15
}

/// Relative permittivity given as a number or as a named solvent
/// ("water", "methanol", "ethanol")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Permittivity {
    /// Fixed numeric value
    Value(f64),
    /// Solvent name, resolved with the empirical temperature model
    Solvent(String),
}

impl Permittivity {
    /// Resolve to a number at the given temperature (K)
    pub fn resolve(&self, temperature: f64) -> Result<f64> {
        match self {
            Self::Value(value) => Ok(*value),
            Self::Solvent(name) => match name.to_lowercase().as_str() {
                "water" => EmpiricalPermittivity::WATER.permittivity(temperature),
                "methanol" => EmpiricalPermittivity::METHANOL.permittivity(temperature),
                "ethanol" => EmpiricalPermittivity::ETHANOL.permittivity(temperature),
                _ => Err(Error::Configuration(format!("unknown solvent '{name}'"))),
            },
        }
    }
}

/// Input description of one solveable system, deserialised from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "system", rename_all = "snake_case")]
pub enum Scenario {
    /// Two-partition Donnan equilibrium
    Donnan(DonnanScenario),
    /// Single charged surface (Gouy-Chapman-Stern)
    Surface(SurfaceScenario),
}

impl Scenario {
    /// Build the solver and run it
    pub fn run(&self) -> Result<ScenarioOutcome> {
        match self {
            Scenario::Donnan(scenario) => Ok(ScenarioOutcome::Donnan(scenario.solver()?.solve()?)),
            Scenario::Surface(scenario) => {
                Ok(ScenarioOutcome::Surface(scenario.solver()?.solve()?))
            }
        }
    }
}

/// Two-partition scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonnanScenario {
    /// Absolute temperature (K)
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Volume of partition A (m³)
    pub volume_a: f64,
    /// Volume of partition B (m³)
    pub volume_b: f64,
    /// Interfacial contact area (m²)
    #[serde(default)]
    pub area: f64,
    /// Relative permittivity of partition A
    pub permittivity_a: Permittivity,
    /// Relative permittivity of partition B
    pub permittivity_b: Permittivity,
    /// Stern-layer permittivity on the A side
    #[serde(default)]
    pub stern_permittivity_a: Option<f64>,
    /// Stern-layer permittivity on the B side
    #[serde(default)]
    pub stern_permittivity_b: Option<f64>,
    /// Carrier concentration in partition B (mol/l)
    #[serde(default)]
    pub carrier_concn: f64,
    /// Carrier radius (Å)
    #[serde(default)]
    pub carrier_radius: f64,
    /// Include the interfacial-charge correction
    #[serde(default)]
    pub interfacial_charge: bool,
    /// Numerical controls
    #[serde(default)]
    pub settings: SolverSettings,
    /// Species list
    pub ions: Vec<IonSpecies>,
}

impl DonnanScenario {
    /// Construct the validated solver for this scenario
    pub fn solver(&self) -> Result<DonnanSolver> {
        let mut builder = PartitionSystemBuilder::default();
        builder
            .temperature(self.temperature)
            .volume_a(self.volume_a)
            .volume_b(self.volume_b)
            .area(self.area)
            .permittivity_a(self.permittivity_a.resolve(self.temperature)?)
            .permittivity_b(self.permittivity_b.resolve(self.temperature)?)
            .carrier_concn(self.carrier_concn)
            .carrier_radius(self.carrier_radius)
            .interfacial_charge(self.interfacial_charge)
            .settings(self.settings);
        if let Some(permittivity) = self.stern_permittivity_a {
            builder.stern_permittivity_a(permittivity);
        }
        if let Some(permittivity) = self.stern_permittivity_b {
            builder.stern_permittivity_b(permittivity);
        }
        let system = builder
            .build()
            .map_err(|err| Error::Configuration(err.to_string()))?;
        DonnanSolver::with_properties(&self.ions, system, Some(&BuiltinIonProperties))
    }
}

/// Single charged-surface scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceScenario {
    /// Absolute temperature (K)
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Surface area (m²)
    pub area: f64,
    /// Electrolyte volume (m³)
    pub volume: f64,
    /// Relative permittivity of the electrolyte
    pub permittivity: Permittivity,
    /// Stern-layer permittivity; omit to disable the Stern correction
    #[serde(default)]
    pub stern_permittivity: Option<f64>,
    /// Adsorption site density (mol/m²)
    #[serde(default)]
    pub site_density: f64,
    /// Numerical controls
    #[serde(default)]
    pub settings: SolverSettings,
    /// Fixed surface potential (V); mutually exclusive with `surface_charge`
    #[serde(default)]
    pub surface_potential: Option<f64>,
    /// Fixed surface charge density (C/m²)
    #[serde(default)]
    pub surface_charge: Option<f64>,
    /// Species list
    pub ions: Vec<IonSpecies>,
}

impl SurfaceScenario {
    /// Construct the validated solver for this scenario
    pub fn solver(&self) -> Result<GouyChapmanSternSolver> {
        let mut builder = SurfaceSystemBuilder::default();
        builder
            .temperature(self.temperature)
            .area(self.area)
            .volume(self.volume)
            .permittivity(self.permittivity.resolve(self.temperature)?)
            .site_density(self.site_density)
            .settings(self.settings);
        if let Some(permittivity) = self.stern_permittivity {
            builder.stern_permittivity(permittivity);
        }
        let system = builder
            .build()
            .map_err(|err| Error::Configuration(err.to_string()))?;
        let mut solver =
            GouyChapmanSternSolver::with_properties(&self.ions, system, Some(&BuiltinIonProperties))?;
        match (self.surface_potential, self.surface_charge) {
            (Some(potential), None) => solver.set_surface_potential(potential),
            (None, Some(charge)) => solver.set_surface_charge(charge),
            (Some(_), Some(_)) => {
                return Err(Error::Configuration(
                    "surface_potential and surface_charge are mutually exclusive".into(),
                ))
            }
            (None, None) => {
                return Err(Error::Configuration(
                    "set either surface_potential or surface_charge".into(),
                ))
            }
        }
        Ok(solver)
    }
}

/// Result of running a scenario, serialisable to YAML
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ScenarioOutcome {
    /// Result of a Donnan scenario
    Donnan(DonnanResult),
    /// Result of a surface scenario
    Surface(SurfaceResult),
}

impl Display for ScenarioOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ScenarioOutcome::Donnan(result) => result.fmt(f),
            ScenarioOutcome::Surface(result) => result.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DONNAN_YAML: &str = r#"
system: donnan
volume_a: 1.0e-3
volume_b: 1.0e-3
permittivity_a: water
permittivity_b: 78.4
ions:
  - { name: Na, concn_a: 0.1, concn_b: 0.1 }
  - { name: Cl, concn_a: 0.1, concn_b: 0.1 }
"#;

    #[test]
    fn donnan_scenario_round_trip() {
        let scenario: Scenario = serde_yaml::from_str(DONNAN_YAML).unwrap();
        let outcome = scenario.run().unwrap();
        match outcome {
            ScenarioOutcome::Donnan(result) => {
                assert!(result.potential().abs() < 1e-6);
            }
            ScenarioOutcome::Surface(_) => panic!("expected a Donnan outcome"),
        }
    }

    #[test]
    fn named_solvent_resolves_at_temperature() {
        let permittivity = Permittivity::Solvent("water".into());
        let resolved = permittivity.resolve(298.15).unwrap();
        assert!((resolved - 78.356).abs() < 0.01);
        assert!(permittivity.resolve(500.0).is_err());
        assert!(Permittivity::Solvent("oil".into()).resolve(298.15).is_err());
    }

    #[test]
    fn surface_scenario_requires_exactly_one_input() {
        let yaml = r#"
system: surface
area: 1.0e-4
volume: 1.0e-3
permittivity: 78.4
ions:
  - { name: Na, concn_a: 0.1 }
  - { name: Cl, concn_a: 0.1 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        match &scenario {
            Scenario::Surface(surface) => assert!(surface.solver().is_err()),
            Scenario::Donnan(_) => panic!("expected a surface scenario"),
        }
    }
}

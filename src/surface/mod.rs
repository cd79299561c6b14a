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

//! # Gouy-Chapman-Stern solver for a single charged surface
//!
//! Structurally parallel to the Donnan family: the same Grahame/arcsinh
//! diffuse-layer relations, Stern recomputation, and bisection primitives,
//! but facing one electrolyte. Four cases arise from (charge-symmetric vs
//! asymmetric electrolyte) × (specific adsorption vs none); both solve
//! directions (potential → charge and charge → potential) are supported and
//! are mutually exclusive inputs.

mod adsorption;

use crate::donnan::double_layer::{
    diffuse_potential, grahame_charge, stern_radius, surface_excess, Population,
};
use crate::error::{Error, NeutralityWarning, Result};
use crate::numerics::{bisect, BisectOptions};
use crate::params::SurfaceSystem;
use crate::result::{Convergence, SurfaceIonResult, SurfaceResult};
use crate::screening::{debye_length, ionic_strength, kappa};
use crate::species::{IonProperties, IonSpecies};
use crate::table::{IonRecord, IonTable};
use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};

/// Which boundary condition the caller fixed
#[derive(Debug, Clone, Copy, PartialEq)]
enum Input {
    Potential(f64),
    Charge(f64),
}

/// Charged surface in contact with one electrolyte, with optional Stern
/// layer and optional specific adsorption to a finite density of sites.
///
/// # Examples
/// ~~~
/// use donnan::{GouyChapmanSternSolver, IonSpecies, SurfaceSystemBuilder, BuiltinIonProperties};
/// let mut sodium = IonSpecies::new("Na");
/// sodium.concn_a = 0.1;
/// let mut chloride = IonSpecies::new("Cl");
/// chloride.concn_a = 0.1;
/// let system = SurfaceSystemBuilder::default()
///     .area(1e-4)
///     .volume(1e-3)
///     .permittivity(78.4)
///     .build()
///     .unwrap();
/// let mut solver = GouyChapmanSternSolver::with_properties(
///     &[sodium, chloride], system, Some(&BuiltinIonProperties)).unwrap();
/// solver.set_surface_potential(0.05);
/// let result = solver.solve().unwrap();
/// assert!(*result.surface_charge() > 0.0);
/// ~~~
#[derive(Debug, Clone)]
pub struct GouyChapmanSternSolver {
    system: SurfaceSystem,
    table: IonTable,
    input: Option<Input>,
}

impl GouyChapmanSternSolver {
    /// New solver; charges (and radii, when a Stern layer is requested)
    /// must be present on the species records
    pub fn new(species: &[IonSpecies], system: SurfaceSystem) -> Result<Self> {
        Self::with_properties(species, system, None)
    }

    /// New solver with an injected ion-property lookup for unset charges and radii
    pub fn with_properties(
        species: &[IonSpecies],
        system: SurfaceSystem,
        properties: Option<&dyn IonProperties>,
    ) -> Result<Self> {
        let table = IonTable::unpack_surface(species, &system, properties)?;
        Ok(Self {
            system,
            table,
            input: None,
        })
    }

    /// The unpacked, unit-normalised ion table
    pub fn table(&self) -> &IonTable {
        &self.table
    }

    /// Net-charge imbalance of the electrolyte loading, if any
    pub fn neutrality_warning(&self) -> Option<NeutralityWarning> {
        self.table
            .neutrality(self.system.settings.neutrality_tolerance)
    }

    /// Fix the surface potential (V). Discards a previously fixed surface
    /// charge with a logged advisory; the two inputs are mutually exclusive.
    pub fn set_surface_potential(&mut self, potential: f64) {
        if matches!(self.input, Some(Input::Charge(_))) {
            log::warn!("discarding previously set surface charge; potential takes over");
        }
        self.input = Some(Input::Potential(potential));
    }

    /// Fix the surface charge density (C/m²). Discards a previously fixed
    /// surface potential with a logged advisory.
    pub fn set_surface_charge(&mut self, charge: f64) {
        if matches!(self.input, Some(Input::Potential(_))) {
            log::warn!("discarding previously set surface potential; charge takes over");
        }
        self.input = Some(Input::Charge(charge));
    }

    /// The currently fixed surface potential, if any
    pub fn surface_potential(&self) -> Option<f64> {
        match self.input {
            Some(Input::Potential(v)) => Some(v),
            _ => None,
        }
    }

    /// The currently fixed surface charge, if any
    pub fn surface_charge(&self) -> Option<f64> {
        match self.input {
            Some(Input::Charge(c)) => Some(c),
            _ => None,
        }
    }

    /// Solve for whichever boundary condition was fixed last.
    pub fn solve(&self) -> Result<SurfaceResult> {
        if let Some(warning) = self.neutrality_warning() {
            log::warn!("{warning}");
        }
        match self.input {
            Some(Input::Potential(potential)) => self.charge_from_potential(potential),
            Some(Input::Charge(charge)) => self.potential_from_charge(charge),
            None => Err(Error::Configuration(
                "fix either the surface potential or the surface charge before solving".into(),
            )),
        }
    }

    /// Surface charge density sustaining the given surface potential (V).
    pub fn charge_from_potential(&self, surface_potential: f64) -> Result<SurfaceResult> {
        let iface = self.interface();
        if !self.has_adsorption() && self.system.stern_permittivity.is_none() {
            // bare diffuse layer: the Grahame relation is already the answer
            let screened = iface.balancing_charge(surface_potential);
            return self.assemble(
                screened,
                surface_potential,
                surface_potential,
                &vec![0.0; iface.populations.len()],
                Convergence {
                    converged: true,
                    iterations: 0,
                    residual: 0.0,
                },
            );
        }

        // total screened charge whose diffuse and Stern drops add up to the
        // requested surface potential
        let span = iface.balancing_charge(surface_potential).abs() + 1e-4;
        let outcome = bisect(
            |screened| {
                let plane = iface.plane_potential(screened)?;
                Ok(plane + iface.stern_drop(screened, plane) - surface_potential)
            },
            -span,
            span,
            &iface.options,
        )?;
        let screened = outcome.root;
        let plane = iface.plane_potential(screened)?;
        let theta = adsorption::occupancies(&iface.actives, &self.system, plane)?;
        self.assemble(
            screened,
            surface_potential,
            plane,
            &theta,
            Convergence {
                converged: outcome.converged,
                iterations: outcome.iterations,
                residual: outcome.residual,
            },
        )
    }

    /// Surface potential produced by the given surface charge density (C/m²).
    pub fn potential_from_charge(&self, surface_charge: f64) -> Result<SurfaceResult> {
        let iface = self.interface();
        if !self.has_adsorption() {
            let plane = iface.plane_potential(surface_charge)?;
            let potential = plane + iface.stern_drop(surface_charge, plane);
            return self.assemble(
                surface_charge,
                potential,
                plane,
                &vec![0.0; iface.populations.len()],
                Convergence {
                    converged: true,
                    iterations: 0,
                    residual: 0.0,
                },
            );
        }

        // adsorption shifts the screened charge away from the bare surface
        // charge; find the self-consistent value
        let span = surface_charge.abs() + 1e-2;
        let outcome = bisect(
            |screened| {
                let plane = iface.plane_potential(screened)?;
                let theta = adsorption::occupancies(&iface.actives, &self.system, plane)?;
                Ok(screened - surface_charge - self.adsorbed_charge(&theta))
            },
            -span,
            span,
            &iface.options,
        )?;
        let screened = outcome.root;
        let plane = iface.plane_potential(screened)?;
        let theta = adsorption::occupancies(&iface.actives, &self.system, plane)?;
        let potential = plane + iface.stern_drop(screened, plane);
        self.assemble(
            screened,
            potential,
            plane,
            &theta,
            Convergence {
                converged: outcome.converged,
                iterations: outcome.iterations,
                residual: outcome.residual,
            },
        )
    }

    fn has_adsorption(&self) -> bool {
        self.system.site_density > 0.0 && self.table.num_binders() > 0
    }

    /// Adsorbed charge density F·Nₛ·Σ zᵢθᵢ (C/m²)
    fn adsorbed_charge(&self, theta: &[f64]) -> f64 {
        let faraday = ELEMENTARY_CHARGE * AVOGADRO_CONSTANT;
        faraday
            * self.system.site_density
            * self
                .table
                .active()
                .zip(theta)
                .map(|(ion, t)| f64::from(ion.charge) * t)
                .sum::<f64>()
    }

    fn interface(&self) -> Interface<'_> {
        let actives: Vec<&IonRecord> = self.table.active().collect();
        let populations: Vec<Population> = actives
            .iter()
            .map(|ion| (ion.charge, ion.concn_a, ion.radius.unwrap_or(0.0)))
            .collect();
        let symmetric_valency = self
            .table
            .charge_symmetric()
            .then(|| actives[0].charge.unsigned_abs());
        Interface {
            actives,
            populations,
            kt: BOLTZMANN_CONSTANT * self.system.temperature,
            permittivity: self.system.permittivity,
            stern_permittivity: self.system.stern_permittivity,
            symmetric_valency,
            options: BisectOptions {
                tolerance: 1e-12,
                max_iterations: self.system.settings.max_iterations,
                expansions: self.system.settings.bracket_expansions,
            },
        }
    }

    /// Copy a converged interface state into an immutable result.
    fn assemble(
        &self,
        screened_charge: f64,
        surface_potential: f64,
        plane_potential: f64,
        theta: &[f64],
        convergence: Convergence,
    ) -> Result<SurfaceResult> {
        let iface = self.interface();
        let kt = iface.kt;
        let adsorbed = self.adsorbed_charge(theta);
        let surface_charge = screened_charge - adsorbed;

        let strength = ionic_strength(iface.populations.iter().map(|&(z, c, _)| (z, c)));
        let kappa_value = kappa(self.system.temperature, self.system.permittivity, strength);
        let debye = debye_length(self.system.temperature, self.system.permittivity, strength);

        let site_moles = self.system.site_density * self.system.area;
        let mut ions = Vec::with_capacity(self.table.records().len());
        let mut active_index = 0;
        for record in self.table.records() {
            if record.active {
                let i = active_index;
                active_index += 1;
                let occupancy = theta[i];
                let depleted =
                    ((record.total_moles - site_moles * occupancy) / self.system.volume).max(0.0);
                ions.push(SurfaceIonResult::new(
                    record.name.clone(),
                    record.charge,
                    depleted * 1e-3, // mol/m³ -> mol/l
                    occupancy,
                    surface_excess(record.concn_a, record.charge, plane_potential, kt, kappa_value),
                ));
            } else {
                ions.push(SurfaceIonResult::new(
                    record.name.clone(),
                    record.charge,
                    0.0,
                    0.0,
                    0.0,
                ));
            }
        }

        // small-signal diffuse capacitance, with the cosh enhancement on the
        // charge-symmetric branch
        let diffuse_capacitance = kappa_value
            .map(|kappa| {
                let cosh = match iface.symmetric_valency {
                    Some(valency) => (0.5 * f64::from(valency) * ELEMENTARY_CHARGE
                        * plane_potential
                        / kt)
                        .cosh(),
                    None => 1.0,
                };
                self.system.permittivity * VACUUM_ELECTRIC_PERMITTIVITY * kappa * cosh
            })
            .unwrap_or(0.0);

        let stern_thickness = self
            .system
            .stern_permittivity
            .map(|_| stern_radius(&iface.populations, kt, plane_potential));
        let stern_capacitance = self
            .system
            .stern_permittivity
            .zip(stern_thickness)
            .filter(|&(_, thickness)| thickness > 0.0)
            .map(|(permittivity, thickness)| {
                permittivity * VACUUM_ELECTRIC_PERMITTIVITY / thickness
            });

        Ok(SurfaceResult::new(
            surface_potential,
            surface_charge,
            plane_potential,
            -screened_charge,
            adsorbed,
            ions,
            stern_capacitance,
            diffuse_capacitance,
            stern_thickness,
            debye,
            convergence,
        ))
    }
}

/// Electrolyte-side context shared by both solve directions.
struct Interface<'a> {
    actives: Vec<&'a IonRecord>,
    populations: Vec<Population>,
    kt: f64,
    permittivity: f64,
    stern_permittivity: Option<f64>,
    symmetric_valency: Option<u32>,
    options: BisectOptions,
}

impl Interface<'_> {
    /// Charge density screened by a diffuse layer at plane potential `psi`
    fn balancing_charge(&self, psi: f64) -> f64 {
        grahame_charge(&self.populations, self.permittivity, self.kt, psi)
    }

    /// Plane potential sustaining the screened charge: arcsinh closed form
    /// when charge-symmetric, nested bisection otherwise
    fn plane_potential(&self, screened_charge: f64) -> Result<f64> {
        diffuse_potential(
            &self.populations,
            self.permittivity,
            self.kt,
            self.symmetric_valency,
            screened_charge,
            &self.options,
        )
    }

    /// Potential drop across the Stern gap, zero without a Stern layer
    fn stern_drop(&self, screened_charge: f64, plane_potential: f64) -> f64 {
        match self.stern_permittivity {
            Some(permittivity) => {
                let thickness = stern_radius(&self.populations, self.kt, plane_potential);
                screened_charge * thickness / (permittivity * VACUUM_ELECTRIC_PERMITTIVITY)
            }
            None => 0.0,
        }
    }
}

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

//! # Two-partition Donnan equilibrium solver
//!
//! Minimises, over a single scalar trial potential, the squared net
//! ionic-plus-complex charge in partition B. Every objective evaluation
//! re-solves the per-ion concentrations at the trial potential
//! ([`concentrations`]), which in turn may drive the interfacial
//! charge bisection ([`double_layer`]).

mod concentrations;
pub(crate) mod double_layer;

use crate::error::{NeutralityWarning, Result};
use crate::numerics::{minimize, SimplexOptions, SimplexOutcome};
use crate::params::PartitionSystem;
use crate::result::{Convergence, DonnanResult, IonResult};
use crate::screening::{boltzmann_factor, debye_length, ionic_strength, kappa};
use crate::species::{IonProperties, IonSpecies};
use crate::state::SolverState;
use crate::table::IonTable;
use physical_constants::{
    BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};

/// Donnan equilibrium between two ion-permeable partitions, with optional
/// carrier binding and optional interfacial double-layer correction.
///
/// Construction validates the configuration; numerical problems surface at
/// [`DonnanSolver::solve`]. The solver itself is immutable, so independent
/// solves may run concurrently.
///
/// # Examples
/// ~~~
/// use donnan::{DonnanSolver, IonSpecies, PartitionSystemBuilder, BuiltinIonProperties};
/// let mut sodium = IonSpecies::new("Na");
/// sodium.concn_a = 0.1;
/// sodium.concn_b = 0.1;
/// let mut chloride = IonSpecies::new("Cl");
/// chloride.concn_a = 0.1;
/// chloride.concn_b = 0.1;
/// let system = PartitionSystemBuilder::default()
///     .volume_a(1e-3)
///     .volume_b(1e-3)
///     .permittivity_a(78.4)
///     .permittivity_b(78.4)
///     .build()
///     .unwrap();
/// let solver = DonnanSolver::with_properties(
///     &[sodium, chloride], system, Some(&BuiltinIonProperties)).unwrap();
/// let result = solver.solve().unwrap();
/// // a symmetric electrolyte develops no Donnan potential
/// assert!(result.potential().abs() < 1e-6);
/// ~~~
#[derive(Debug, Clone)]
pub struct DonnanSolver {
    system: PartitionSystem,
    table: IonTable,
}

impl DonnanSolver {
    /// New solver; charges and radii must be present on the species records
    pub fn new(species: &[IonSpecies], system: PartitionSystem) -> Result<Self> {
        Self::with_properties(species, system, None)
    }

    /// New solver with an injected ion-property lookup for unset charges and radii
    pub fn with_properties(
        species: &[IonSpecies],
        system: PartitionSystem,
        properties: Option<&dyn IonProperties>,
    ) -> Result<Self> {
        let table = IonTable::unpack(species, &system, properties)?;
        Ok(Self { system, table })
    }

    /// The unpacked, unit-normalised ion table
    pub fn table(&self) -> &IonTable {
        &self.table
    }

    /// Net-charge imbalance of the loading, if any. `solve` logs this and
    /// proceeds; callers wanting stricter behaviour check it beforehand.
    pub fn neutrality_warning(&self) -> Option<NeutralityWarning> {
        self.table
            .neutrality(self.system.settings.neutrality_tolerance)
    }

    /// Find the equilibrium potential and concentration profile.
    pub fn solve(&self) -> Result<DonnanResult> {
        if let Some(warning) = self.neutrality_warning() {
            log::warn!("{warning}");
        }
        let settings = &self.system.settings;
        let mut state = SolverState::new(self.table.num_active());

        // always converge without the interfacial correction first; far from
        // equilibrium the nested charge bisection is not reliably bracketed
        let first = self.search_potential(
            &mut state,
            false,
            settings.initial_potential,
            settings.initial_step,
        )?;
        let mut iterations = first.iterations;
        let outcome = if self.system.interfacial_charge {
            log::debug!(
                "seeding interfacial phase from uncorrected potential {:.6e} V",
                first.x[0]
            );
            let second = self.search_potential(
                &mut state,
                true,
                first.x[0],
                0.1 * settings.initial_step.abs().max(1e-3),
            )?;
            iterations += second.iterations;
            second
        } else {
            first
        };

        let potential = outcome.x[0];
        // leave the state exactly at the reported potential
        concentrations::evaluate(
            &self.table,
            &self.system,
            &mut state,
            potential,
            self.system.interfacial_charge,
        )?;
        Ok(self.collect(
            &state,
            potential,
            Convergence {
                converged: outcome.converged,
                iterations,
                residual: outcome.value.sqrt(),
            },
        ))
    }

    /// Outer simplex search over the trial potential. The objective is the
    /// squared net charge in partition B, scaled to the dominant
    /// concentration so tolerances are dimensionless.
    fn search_potential(
        &self,
        state: &mut SolverState,
        interfacial: bool,
        initial: f64,
        step: f64,
    ) -> Result<SimplexOutcome> {
        let concn_scale = self
            .table
            .active()
            .map(|ion| ion.total_moles / (self.system.volume_a + self.system.volume_b))
            .fold(f64::MIN_POSITIVE, f64::max);
        let mut objective = |x: &[f64]| -> Result<f64> {
            concentrations::evaluate(&self.table, &self.system, state, x[0], interfacial)?;
            let net: f64 = self
                .table
                .active()
                .enumerate()
                .map(|(i, ion)| f64::from(ion.charge) * (state.concn_b[i] + state.complex[i]))
                .sum();
            Ok((net / concn_scale).powi(2))
        };
        let options = SimplexOptions {
            tolerance: self.system.settings.tolerance,
            max_iterations: self.system.settings.max_iterations,
        };
        minimize(&mut objective, &[initial], &[step], &options)
    }

    /// Copy the converged state into an immutable result, re-inserting
    /// inactive species as zeros in their original positions.
    fn collect(&self, state: &SolverState, potential: f64, convergence: Convergence) -> DonnanResult {
        let kt = BOLTZMANN_CONSTANT * self.system.temperature;
        let reduced = potential * ELEMENTARY_CHARGE / kt;

        let mut ions = Vec::with_capacity(self.table.records().len());
        let mut active_index = 0;
        for record in self.table.records() {
            if record.active {
                let i = active_index;
                active_index += 1;
                ions.push(IonResult::new(
                    record.name.clone(),
                    record.charge,
                    state.concn_a[i] * 1e-3, // mol/m³ -> mol/l
                    state.concn_b[i] * 1e-3,
                    state.complex[i] * 1e-3,
                    state.excess_a[i],
                    state.excess_b[i],
                    state.coefficients[i],
                ));
            } else {
                let coefficient = record.coefficient
                    * boltzmann_factor(-f64::from(record.charge) * reduced);
                ions.push(IonResult::new(
                    record.name.clone(),
                    record.charge,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                    0.0,
                    coefficient,
                ));
            }
        }

        let strength_a = ionic_strength(
            self.table
                .active()
                .enumerate()
                .map(|(i, ion)| (ion.charge, state.concn_a[i])),
        );
        let strength_b = ionic_strength(
            self.table
                .active()
                .enumerate()
                .map(|(i, ion)| (ion.charge, state.concn_b[i] + state.complex[i])),
        );
        let temperature = self.system.temperature;
        let debye_a = debye_length(temperature, self.system.permittivity_a, strength_a);
        let debye_b = debye_length(temperature, self.system.permittivity_b, strength_b);

        // small-signal diffuse capacitance per side; the cosh factor applies
        // on the charge-symmetric branch only
        let cosh_factor = |plane_potential: f64| -> f64 {
            if self.table.charge_symmetric() {
                let valency = f64::from(
                    self.table
                        .active()
                        .next()
                        .expect("table has active ions")
                        .charge
                        .unsigned_abs(),
                );
                (0.5 * valency * ELEMENTARY_CHARGE * plane_potential / kt).cosh()
            } else {
                1.0
            }
        };
        let diffuse_capacitance_a = kappa(temperature, self.system.permittivity_a, strength_a).map(
            |kappa| {
                self.system.permittivity_a
                    * VACUUM_ELECTRIC_PERMITTIVITY
                    * kappa
                    * cosh_factor(state.dl_potential_a)
            },
        );
        let diffuse_capacitance_b = kappa(temperature, self.system.permittivity_b, strength_b).map(
            |kappa| {
                self.system.permittivity_b
                    * VACUUM_ELECTRIC_PERMITTIVITY
                    * kappa
                    * cosh_factor(state.dl_potential_b)
            },
        );

        DonnanResult::new(
            potential,
            ions,
            state.surface_charge,
            state.dl_potential_a,
            state.dl_potential_b,
            state.stern_potential,
            state.stern_thickness_a,
            state.stern_thickness_b,
            self.system
                .interfacial_charge
                .then_some(state.stern_capacitance),
            diffuse_capacitance_a,
            diffuse_capacitance_b,
            debye_a,
            debye_b,
            convergence,
        )
    }
}

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

//! # Donnan and Gouy-Chapman-Stern equilibrium solvers
//!
//! This library computes the equilibrium electrical potential and ion/complex
//! concentration profile when charged species distribute between two chemical
//! partitions of differing permittivity, optionally in the presence of a
//! neutral ion-binding carrier and an interfacial double-layer correction
//! ([`DonnanSolver`]), and the structurally parallel problem of a single
//! charged surface facing one electrolyte with optional Stern layer and
//! specific adsorption ([`GouyChapmanSternSolver`]).
//!
//! Both families reduce a nonlinear electroneutrality condition to nested
//! minimization and root finding: an outer potential search drives an inner
//! concentration search, which may in turn drive an innermost
//! interfacial-charge bisection. The generic primitives live in
//! [`numerics`]; the electrostatic screening helpers in [`screening`].
//!
//! ## Example
//!
//! A 1:1 electrolyte loaded with a concentration gradient levels out with no
//! Donnan potential; adding an impermeant anion to one partition sets up a
//! classic Donnan equilibrium:
//!
//! ~~~
//! use donnan::{BuiltinIonProperties, DonnanSolver, IonSpecies, PartitionSystemBuilder};
//!
//! let mut sodium = IonSpecies::new("Na");
//! sodium.concn_a = 0.1;
//! let mut chloride = IonSpecies::new("Cl");
//! chloride.concn_a = 0.1;
//! let mut polyanion = IonSpecies::new("P");
//! polyanion.concn_b = 0.1;
//! polyanion.charge = Some(-1);
//! polyanion.partition_coefficient = Some(0.0); // confined to partition B
//!
//! let system = PartitionSystemBuilder::default()
//!     .volume_a(1e-3)
//!     .volume_b(1e-3)
//!     .permittivity_a(78.4)
//!     .permittivity_b(78.4)
//!     .build()
//!     .unwrap();
//! let solver = DonnanSolver::with_properties(
//!     &[sodium, chloride, polyanion], system, Some(&BuiltinIonProperties)).unwrap();
//! let result = solver.solve().unwrap();
//! // the mobile salt is expelled from the polyanion partition
//! assert!(*result.potential() > 0.0);
//! assert!(result.convergence().converged);
//! ~~~

mod born;
mod donnan;
mod error;
pub mod numerics;
mod params;
pub mod permittivity;
mod result;
pub mod scenario;
pub mod screening;
mod species;
mod state;
mod surface;
mod table;

pub use born::BornPartitionModel;
pub use donnan::DonnanSolver;
pub use error::{Error, NeutralityWarning, Result};
pub use params::{
    PartitionSystem, PartitionSystemBuilder, SolverSettings, SurfaceSystem, SurfaceSystemBuilder,
};
pub use result::{Convergence, DonnanResult, IonResult, SurfaceIonResult, SurfaceResult};
pub use species::{BuiltinIonProperties, IonProperties, IonSpecies};
pub use state::SolverState;
pub use surface::GouyChapmanSternSolver;
pub use table::{IonRecord, IonTable};

pub use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, MOLAR_GAS_CONSTANT,
    VACUUM_ELECTRIC_PERMITTIVITY,
};

/// Faraday constant F = e·Nₐ (C/mol)
pub const FARADAY_CONSTANT: f64 = ELEMENTARY_CHARGE * AVOGADRO_CONSTANT;

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

//! Immutable solver results in reporting units (mol/l, V, C/m², F/m², m).

use core::fmt::{Display, Formatter};
use derive_getters::Getters;
use serde::Serialize;

/// Convergence diagnostics of one solve.
///
/// Reaching the iteration cap is non-fatal: the last estimate is still
/// returned, flagged with `converged == false`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Convergence {
    /// Whether the tolerance was met before the iteration cap
    pub converged: bool,
    /// Outer iterations spent
    pub iterations: usize,
    /// Final outer residual (|net relative charge| for the Donnan solver,
    /// potential-balance mismatch for the surface solver)
    pub residual: f64,
}

/// Equilibrium quantities of one species in the Donnan problem.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct IonResult {
    /// Species name
    name: String,
    /// Signed valency
    charge: i32,
    /// Bulk concentration in partition A (mol/l)
    concn_a: f64,
    /// Bulk concentration in partition B (mol/l)
    concn_b: f64,
    /// Carrier-complex concentration in partition B (mol/l)
    complex: f64,
    /// Interfacial excess on the A side (mol/m²)
    excess_a: f64,
    /// Interfacial excess on the B side (mol/m²)
    excess_b: f64,
    /// Partition coefficient at the equilibrium potential
    coefficient: f64,
}

impl IonResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        charge: i32,
        concn_a: f64,
        concn_b: f64,
        complex: f64,
        excess_a: f64,
        excess_b: f64,
        coefficient: f64,
    ) -> Self {
        Self {
            name,
            charge,
            concn_a,
            concn_b,
            complex,
            excess_a,
            excess_b,
            coefficient,
        }
    }
}

/// Converged state of a two-partition Donnan solve.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct DonnanResult {
    /// Donnan potential, bulk A minus bulk B (V)
    potential: f64,
    /// Per-species results, in input order (inactive species all zero)
    ions: Vec<IonResult>,
    /// Interfacial charge density carried by the A-side diffuse layer (C/m²)
    surface_charge: f64,
    /// Diffuse-layer plane potential relative to bulk A (V)
    dl_potential_a: f64,
    /// Diffuse-layer plane potential relative to bulk B (V)
    dl_potential_b: f64,
    /// Potential drop across the Stern gap (V)
    stern_potential: f64,
    /// Stern-layer thickness on the A side (m)
    stern_thickness_a: f64,
    /// Stern-layer thickness on the B side (m)
    stern_thickness_b: f64,
    /// Series Stern capacitance (F/m²), when the interfacial correction ran
    stern_capacitance: Option<f64>,
    /// Diffuse-layer capacitance facing partition A (F/m²)
    diffuse_capacitance_a: Option<f64>,
    /// Diffuse-layer capacitance facing partition B (F/m²)
    diffuse_capacitance_b: Option<f64>,
    /// Debye length in partition A (m); `None` for an ion-free partition
    debye_length_a: Option<f64>,
    /// Debye length in partition B (m)
    debye_length_b: Option<f64>,
    /// Convergence diagnostics
    convergence: Convergence,
}

impl DonnanResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        potential: f64,
        ions: Vec<IonResult>,
        surface_charge: f64,
        dl_potential_a: f64,
        dl_potential_b: f64,
        stern_potential: f64,
        stern_thickness_a: f64,
        stern_thickness_b: f64,
        stern_capacitance: Option<f64>,
        diffuse_capacitance_a: Option<f64>,
        diffuse_capacitance_b: Option<f64>,
        debye_length_a: Option<f64>,
        debye_length_b: Option<f64>,
        convergence: Convergence,
    ) -> Self {
        Self {
            potential,
            ions,
            surface_charge,
            dl_potential_a,
            dl_potential_b,
            stern_potential,
            stern_thickness_a,
            stern_thickness_b,
            stern_capacitance,
            diffuse_capacitance_a,
            diffuse_capacitance_b,
            debye_length_a,
            debye_length_b,
            convergence,
        }
    }
}

impl Display for DonnanResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Donnan equilibrium: Δφ = {:.3} mV, σ = {:.3e} C/m², λᴰ(A) = {:.2} nm, λᴰ(B) = {:.2} nm ({} iterations, {})",
            self.potential * 1e3,
            self.surface_charge,
            self.debye_length_a.unwrap_or(f64::INFINITY) * 1e9,
            self.debye_length_b.unwrap_or(f64::INFINITY) * 1e9,
            self.convergence.iterations,
            if self.convergence.converged {
                "converged"
            } else {
                "NOT converged"
            }
        )
    }
}

/// Equilibrium quantities of one species at a charged surface.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct SurfaceIonResult {
    /// Species name
    name: String,
    /// Signed valency
    charge: i32,
    /// Bulk concentration after adsorption depletion (mol/l)
    concn: f64,
    /// Fraction of surface sites occupied by this species
    occupancy: f64,
    /// Diffuse-layer surface excess (mol/m²)
    excess: f64,
}

impl SurfaceIonResult {
    pub(crate) fn new(name: String, charge: i32, concn: f64, occupancy: f64, excess: f64) -> Self {
        Self {
            name,
            charge,
            concn,
            occupancy,
            excess,
        }
    }
}

/// Converged state of a Gouy-Chapman-Stern surface solve.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct SurfaceResult {
    /// Potential of the surface proper relative to the bulk (V)
    surface_potential: f64,
    /// Intrinsic surface charge density (C/m²)
    surface_charge: f64,
    /// Potential at the outer Helmholtz plane relative to the bulk (V)
    diffuse_potential: f64,
    /// Charge carried by the diffuse layer (C/m²)
    diffuse_charge: f64,
    /// Charge carried by specifically adsorbed species (C/m²)
    adsorbed_charge: f64,
    /// Per-species results, in input order
    ions: Vec<SurfaceIonResult>,
    /// Stern capacitance (F/m²), when a Stern layer is present
    stern_capacitance: Option<f64>,
    /// Diffuse-layer capacitance (F/m²)
    diffuse_capacitance: f64,
    /// Stern-layer thickness (m), when a Stern layer is present
    stern_thickness: Option<f64>,
    /// Debye length of the electrolyte (m)
    debye_length: Option<f64>,
    /// Convergence diagnostics
    convergence: Convergence,
}

impl SurfaceResult {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        surface_potential: f64,
        surface_charge: f64,
        diffuse_potential: f64,
        diffuse_charge: f64,
        adsorbed_charge: f64,
        ions: Vec<SurfaceIonResult>,
        stern_capacitance: Option<f64>,
        diffuse_capacitance: f64,
        stern_thickness: Option<f64>,
        debye_length: Option<f64>,
        convergence: Convergence,
    ) -> Self {
        Self {
            surface_potential,
            surface_charge,
            diffuse_potential,
            diffuse_charge,
            adsorbed_charge,
            ions,
            stern_capacitance,
            diffuse_capacitance,
            stern_thickness,
            debye_length,
            convergence,
        }
    }
}

impl Display for SurfaceResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Surface equilibrium: φ₀ = {:.3} mV, σ₀ = {:.3e} C/m², φᵈ = {:.3} mV, λᴰ = {:.2} nm ({} iterations, {})",
            self.surface_potential * 1e3,
            self.surface_charge,
            self.diffuse_potential * 1e3,
            self.debye_length.unwrap_or(f64::INFINITY) * 1e9,
            self.convergence.iterations,
            if self.convergence.converged {
                "converged"
            } else {
                "NOT converged"
            }
        )
    }
}

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

//! Per-invocation solver scratch state.

/// Mutable scratch owned by exactly one `solve()` call.
///
/// Per-ion vectors are indexed over the *active* subset of the
/// [`crate::IonTable`], in table order. Nothing here is shared between
/// invocations, so independent solves may run concurrently on their own
/// `SolverState` instances.
#[derive(Debug, Clone, Default)]
pub struct SolverState {
    /// Partition coefficient of each active ion at the current trial potential
    pub coefficients: Vec<f64>,
    /// Bulk concentration in partition A (mol/m³)
    pub concn_a: Vec<f64>,
    /// Bulk concentration in partition B (mol/m³)
    pub concn_b: Vec<f64>,
    /// Carrier-complex concentration in partition B (mol/m³)
    pub complex: Vec<f64>,
    /// Interfacial excess on the A side (mol/m²)
    pub excess_a: Vec<f64>,
    /// Interfacial excess on the B side (mol/m²)
    pub excess_b: Vec<f64>,
    /// Interfacial charge density, A-side diffuse layer (C/m²)
    pub surface_charge: f64,
    /// Diffuse-layer plane potential relative to bulk A (V)
    pub dl_potential_a: f64,
    /// Diffuse-layer plane potential relative to bulk B (V)
    pub dl_potential_b: f64,
    /// Potential drop across the Stern gap (V)
    pub stern_potential: f64,
    /// Stern-layer thickness on the A side (m)
    pub stern_thickness_a: f64,
    /// Stern-layer thickness on the B side (m)
    pub stern_thickness_b: f64,
    /// Series Stern capacitance (F/m²); zero until the double layer has run
    pub stern_capacitance: f64,
    /// Accumulated inner-search iterations (diagnostics)
    pub inner_iterations: usize,
}

impl SolverState {
    /// Fresh state for `n` active ions
    pub fn new(n: usize) -> Self {
        Self {
            coefficients: vec![0.0; n],
            concn_a: vec![0.0; n],
            concn_b: vec![0.0; n],
            complex: vec![0.0; n],
            excess_a: vec![0.0; n],
            excess_b: vec![0.0; n],
            ..Default::default()
        }
    }

    /// Zero all interfacial quantities (used when the correction is disabled)
    pub fn clear_interface(&mut self) {
        self.excess_a.iter_mut().for_each(|x| *x = 0.0);
        self.excess_b.iter_mut().for_each(|x| *x = 0.0);
        self.surface_charge = 0.0;
        self.dl_potential_a = 0.0;
        self.dl_potential_b = 0.0;
        self.stern_potential = 0.0;
        self.stern_thickness_a = 0.0;
        self.stern_thickness_b = 0.0;
        self.stern_capacitance = 0.0;
    }
}

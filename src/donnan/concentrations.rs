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

//! Ion and carrier-complex concentrations at a fixed trial potential.
//!
//! With no interfacial correction and at most one carrier-binding species
//! everything is closed form (linear partition, or a single quadratic mass
//! balance). Otherwise the per-ion concentrations are found by simplex
//! minimization of the mass-balance residuals, with the complexes obtained
//! from a small linear system whenever several ions compete for the carrier.

use crate::error::{Error, Result};
use crate::numerics::{
    minimize, select_physical_root, solve_dense, stable_quadratic_roots, Objective, SimplexOptions,
};
use crate::params::PartitionSystem;
use crate::screening::boltzmann_factor;
use crate::state::SolverState;
use crate::table::{IonRecord, IonTable};
use nalgebra::{DMatrix, DVector};
use physical_constants::{BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE};

use super::double_layer;

/// Fill `state` with the bulk, complex, and interfacial quantities that
/// balance mass at the trial `potential` (bulk A minus bulk B, volts).
pub(crate) fn evaluate(
    table: &IonTable,
    system: &PartitionSystem,
    state: &mut SolverState,
    potential: f64,
    interfacial: bool,
) -> Result<()> {
    let kt = BOLTZMANN_CONSTANT * system.temperature;
    let reduced = potential * ELEMENTARY_CHARGE / kt;
    for (i, ion) in table.active().enumerate() {
        state.coefficients[i] = ion.coefficient * boltzmann_factor(-f64::from(ion.charge) * reduced);
    }

    let carrier = system.carrier_concn * 1e3; // mol/l -> mol/m³
    let binders = if carrier > 0.0 { table.num_binders() } else { 0 };
    if !interfacial && binders <= 1 {
        closed_form(table, system, state, carrier)?;
        state.clear_interface();
    } else {
        search(table, system, state, potential, carrier, interfacial)?;
    }
    Ok(())
}

/// Linear partition for every non-binding ion and the stable quadratic for
/// the single binding one.
fn closed_form(
    table: &IonTable,
    system: &PartitionSystem,
    state: &mut SolverState,
    carrier: f64,
) -> Result<()> {
    let (va, vb) = (system.volume_a, system.volume_b);
    for (i, ion) in table.active().enumerate() {
        let k = state.coefficients[i];
        if ion.assoc_constant > 0.0 && carrier > 0.0 {
            let concn = bound_concentration(ion.total_moles, k, ion.assoc_constant, carrier, va, vb)?;
            let kc = ion.assoc_constant * concn;
            state.concn_b[i] = concn;
            state.complex[i] = kc * carrier / (1.0 + kc);
        } else {
            state.concn_b[i] = ion.total_moles / (va * k + vb);
            state.complex[i] = 0.0;
        }
        state.concn_a[i] = k * state.concn_b[i];
    }
    Ok(())
}

/// Free partition-B concentration of the single carrier-binding ion.
///
/// Eliminating the complex from the simultaneous partition and 1:1 binding
/// equilibria gives `aa·x² + bb·x + cc = 0` with the physical root confined
/// to `[0, n/(vA·k + vB)]`.
fn bound_concentration(
    total_moles: f64,
    coefficient: f64,
    assoc: f64,
    carrier: f64,
    va: f64,
    vb: f64,
) -> Result<f64> {
    let denom = va * coefficient + vb;
    let upper = total_moles / denom;
    let aa = denom * assoc;
    let bb = denom + assoc * (vb * carrier - total_moles);
    let cc = -total_moles;
    let roots = stable_quadratic_roots(aa, bb, cc).ok_or(Error::NoPhysicalRoot {
        upper,
        roots: [f64::NAN, f64::NAN],
    })?;
    select_physical_root(roots, upper)
}

/// Simplex search over the per-ion partition-B concentrations, used whenever
/// several ions compete for the carrier or the interfacial correction is on.
fn search(
    table: &IonTable,
    system: &PartitionSystem,
    state: &mut SolverState,
    potential: f64,
    carrier: f64,
    interfacial: bool,
) -> Result<()> {
    let (va, vb, area) = (system.volume_a, system.volume_b, system.area);
    let actives: Vec<&IonRecord> = table.active().collect();
    let charge_symmetric = table.charge_symmetric();
    let concn_scale = actives
        .iter()
        .map(|ion| ion.total_moles / (va + vb))
        .fold(f64::MIN_POSITIVE, f64::max);

    // seed from the plain linear partition, binding and interface ignored
    let initial: Vec<f64> = actives
        .iter()
        .enumerate()
        .map(|(i, ion)| ion.total_moles / (va * state.coefficients[i] + vb))
        .collect();
    let steps: Vec<f64> = initial
        .iter()
        .map(|c| 0.25 * c.max(1e-6 * concn_scale))
        .collect();

    let mut objective = |x: &[f64]| -> Result<f64> {
        // soft non-negativity: penalise negative trials, evaluate the
        // physics at the clamped values
        let mut value: f64 = x
            .iter()
            .filter(|&&xi| xi < 0.0)
            .map(|xi| 1e6 * (xi / concn_scale).powi(2))
            .sum();
        for (i, &xi) in x.iter().enumerate() {
            state.concn_b[i] = xi.max(0.0);
            state.concn_a[i] = state.coefficients[i] * state.concn_b[i];
        }
        complexes(&actives, state, carrier)?;
        if interfacial {
            double_layer::evaluate(&actives, system, state, potential, charge_symmetric)?;
        }
        for (i, ion) in actives.iter().enumerate() {
            let residual = ion.total_moles
                - state.concn_a[i] * va
                - state.concn_b[i] * vb
                - state.complex[i] * vb
                - (state.excess_a[i] + state.excess_b[i]) * area;
            value += (residual / ion.total_moles).powi(2);
        }
        Ok(value)
    };

    let options = SimplexOptions {
        tolerance: system.settings.tolerance,
        max_iterations: system.settings.max_iterations,
    };
    let outcome = minimize(&mut objective, &initial, &steps, &options)?;
    if !outcome.converged {
        log::debug!(
            "concentration search stopped at iteration cap, residual {:.3e}",
            outcome.value
        );
    }
    // leave the state at the best vertex, not at the last trial
    objective.evaluate(&outcome.x)?;
    state.inner_iterations += outcome.iterations;
    Ok(())
}

/// Carrier-complex concentrations at fixed bulk concentrations.
///
/// One binder is a direct Langmuir-type expression; several binders share
/// the carrier through the linearised 1:1 binding equations, solved densely
/// instead of iterated.
fn complexes(actives: &[&IonRecord], state: &mut SolverState, carrier: f64) -> Result<()> {
    state.complex.iter_mut().for_each(|c| *c = 0.0);
    if carrier <= 0.0 {
        return Ok(());
    }
    let binders: Vec<usize> = actives
        .iter()
        .enumerate()
        .filter(|(_, ion)| ion.assoc_constant > 0.0)
        .map(|(i, _)| i)
        .collect();
    match binders.as_slice() {
        [] => Ok(()),
        [i] => {
            let kc = actives[*i].assoc_constant * state.concn_b[*i];
            state.complex[*i] = kc * carrier / (1.0 + kc);
            Ok(())
        }
        _ => {
            // complexᵢ + Kᵢcᵢ·Σⱼ complexⱼ = Kᵢcᵢ·L
            let m = binders.len();
            let mut a = DMatrix::zeros(m, m);
            let mut b = DVector::zeros(m);
            for (row, &i) in binders.iter().enumerate() {
                let kc = actives[i].assoc_constant * state.concn_b[i];
                for col in 0..m {
                    a[(row, col)] = kc + if row == col { 1.0 } else { 0.0 };
                }
                b[row] = kc * carrier;
            }
            let x = solve_dense(a, b)?;
            for (row, &i) in binders.iter().enumerate() {
                state.complex[i] = x[row].max(0.0);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bound_concentration_satisfies_the_mass_balance() {
        // one binding cation: 0.2 mmol over 1+1 ml, K = 0.1 m³/mol,
        // 50 mol/m³ of carrier in partition B
        let (n, k, assoc, carrier, va, vb) = (2e-4, 1.0, 0.1, 50.0, 1e-3, 1e-3);
        let concn = bound_concentration(n, k, assoc, carrier, va, vb).unwrap();
        let complex = assoc * concn * carrier / (1.0 + assoc * concn);
        let recovered = k * concn * va + concn * vb + complex * vb;
        assert_relative_eq!(recovered, n, max_relative = 1e-10);
        assert!(concn > 0.0 && concn <= n / (va * k + vb));
    }

    #[test]
    fn no_carrier_reduces_to_linear_partition() {
        let concn = bound_concentration(2e-4, 1.0, 0.1, 0.0, 1e-3, 1e-3).unwrap();
        // with zero carrier the quadratic collapses onto n/(vA·k + vB)
        assert_relative_eq!(concn, 0.1, max_relative = 1e-9);
    }
}

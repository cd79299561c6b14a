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

//! Back-to-back double layer at the partition interface.
//!
//! An outer bisection finds the interfacial charge density σ whose A-side
//! diffuse drop, Stern drop, and B-side diffuse drop add up to the trial
//! potential. Each diffuse drop comes from the Gouy-Chapman arcsinh relation
//! for a charge-symmetric electrolyte, or from a nested bisection of the
//! Grahame charge relation otherwise. The Stern gap width is the
//! Boltzmann-weighted mean ion radius at the current plane potentials and is
//! recomputed at every outer step.

use crate::error::{Error, Result};
use crate::numerics::{bisect, BisectOptions};
use crate::params::PartitionSystem;
use crate::screening::{boltzmann_factor, ionic_strength, kappa};
use crate::state::SolverState;
use crate::table::IonRecord;
use physical_constants::{
    AVOGADRO_CONSTANT, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE, VACUUM_ELECTRIC_PERMITTIVITY,
};

/// `(valency, concentration mol/m³, radius m)` of one population facing a
/// side of the interface
pub(crate) type Population = (i32, f64, f64);

/// Solve the interfacial charge balance at the trial `potential` and write
/// charge density, potential drops, Stern geometry, and per-ion surface
/// excesses into `state`. Bulk concentrations are read from `state`.
pub(crate) fn evaluate(
    actives: &[&IonRecord],
    system: &PartitionSystem,
    state: &mut SolverState,
    potential: f64,
    charge_symmetric: bool,
) -> Result<()> {
    let kt = BOLTZMANN_CONSTANT * system.temperature;
    let carrier_radius = system.carrier_radius * 1e-10; // Å -> m

    // populations seen by each side; complexes screen on the B side with
    // the carrier radius but carry no interfacial excess of their own
    let side_a: Vec<Population> = actives
        .iter()
        .enumerate()
        .map(|(i, ion)| (ion.charge, state.concn_a[i], ion.radius.unwrap_or(0.0)))
        .collect();
    let mut side_b: Vec<Population> = actives
        .iter()
        .enumerate()
        .map(|(i, ion)| (ion.charge, state.concn_b[i], ion.radius.unwrap_or(0.0)))
        .collect();
    for (i, ion) in actives.iter().enumerate() {
        if state.complex[i] > 0.0 {
            side_b.push((ion.charge, state.complex[i], carrier_radius));
        }
    }

    let symmetric_valency = charge_symmetric.then(|| actives[0].charge.unsigned_abs());
    let options = BisectOptions {
        tolerance: 1e-12,
        max_iterations: system.settings.max_iterations,
        expansions: system.settings.bracket_expansions,
    };

    let stern_factor_a = system.stern_permittivity_a() * VACUUM_ELECTRIC_PERMITTIVITY;
    let stern_factor_b = system.stern_permittivity_b() * VACUUM_ELECTRIC_PERMITTIVITY;

    // total potential drop across the interface at trial charge density σ
    let trial = |sigma: f64| -> Result<(f64, f64, f64, f64, f64)> {
        let psi_a = diffuse_potential(
            &side_a,
            system.permittivity_a,
            kt,
            symmetric_valency,
            sigma,
            &options,
        )?;
        let psi_b = diffuse_potential(
            &side_b,
            system.permittivity_b,
            kt,
            symmetric_valency,
            sigma,
            &options,
        )?;
        let radius_a = stern_radius(&side_a, kt, -psi_a);
        let radius_b = stern_radius(&side_b, kt, psi_b);
        let stern = sigma * (radius_a / stern_factor_a + radius_b / stern_factor_b);
        Ok((psi_a, psi_b, stern, radius_a, radius_b))
    };

    let span = 0.1 * (1.0 + potential.abs());
    let outcome = bisect(
        |sigma| trial(sigma).map(|(psi_a, psi_b, stern, _, _)| psi_a + stern + psi_b - potential),
        -span,
        span,
        &options,
    )?;
    if !outcome.converged {
        log::debug!(
            "interfacial charge bisection stopped at iteration cap, residual {:.3e} V",
            outcome.residual
        );
    }

    let sigma = outcome.root;
    let (psi_a, psi_b, stern, radius_a, radius_b) = trial(sigma)?;
    state.surface_charge = sigma;
    state.dl_potential_a = -psi_a; // plane potential relative to bulk A
    state.dl_potential_b = psi_b;
    state.stern_potential = stern;
    state.stern_thickness_a = radius_a;
    state.stern_thickness_b = radius_b;
    state.stern_capacitance = VACUUM_ELECTRIC_PERMITTIVITY
        / (radius_a / system.stern_permittivity_a() + radius_b / system.stern_permittivity_b());

    // diffuse-layer surface excesses per side
    let kappa_a = kappa(
        system.temperature,
        system.permittivity_a,
        ionic_strength(side_a.iter().map(|&(z, c, _)| (z, c))),
    );
    let kappa_b = kappa(
        system.temperature,
        system.permittivity_b,
        ionic_strength(side_b.iter().map(|&(z, c, _)| (z, c))),
    );
    for (i, ion) in actives.iter().enumerate() {
        state.excess_a[i] = surface_excess(state.concn_a[i], ion.charge, -psi_a, kt, kappa_a);
        state.excess_b[i] = surface_excess(state.concn_b[i], ion.charge, psi_b, kt, kappa_b);
    }
    Ok(())
}

/// Gouy-Chapman surface excess Γ = (2c/κ)·(e^(−zeψ₀/2kT) − 1) of one ion in
/// a diffuse layer with plane potential ψ₀ relative to its bulk
pub(crate) fn surface_excess(concn: f64, charge: i32, plane_potential: f64, kt: f64, kappa: Option<f64>) -> f64 {
    match kappa {
        Some(kappa) => {
            let half = -0.5 * f64::from(charge) * ELEMENTARY_CHARGE * plane_potential / kt;
            2.0 * concn / kappa * (boltzmann_factor(half) - 1.0)
        }
        None => 0.0,
    }
}

/// Diffuse-layer potential drop (same sign as σ) sustained by one side of
/// the interface carrying the opposing charge.
pub(crate) fn diffuse_potential(
    populations: &[Population],
    permittivity: f64,
    kt: f64,
    symmetric_valency: Option<u32>,
    sigma: f64,
    options: &BisectOptions,
) -> Result<f64> {
    match symmetric_valency {
        Some(valency) => {
            // per-sign number density of a z:z electrolyte
            let number_density: f64 = 0.5
                * AVOGADRO_CONSTANT
                * populations.iter().map(|&(_, c, _)| c).sum::<f64>();
            if number_density <= 0.0 {
                return Err(Error::Configuration(
                    "a partition without ions cannot sustain a diffuse layer".into(),
                ));
            }
            let prefactor =
                (8.0 * permittivity * VACUUM_ELECTRIC_PERMITTIVITY * kt * number_density).sqrt();
            let valency = f64::from(valency);
            Ok(2.0 * kt / (valency * ELEMENTARY_CHARGE) * (sigma / prefactor).asinh())
        }
        None => {
            let outcome = bisect(
                |psi| Ok(grahame_charge(populations, permittivity, kt, psi) - sigma),
                -0.5,
                0.5,
                options,
            )?;
            Ok(outcome.root)
        }
    }
}

/// Grahame relation: the charge density screened by a diffuse layer whose
/// plane sits at `psi` relative to the bulk, for arbitrary valencies
pub(crate) fn grahame_charge(populations: &[Population], permittivity: f64, kt: f64, psi: f64) -> f64 {
    let sum: f64 = populations
        .iter()
        .map(|&(z, c, _)| {
            AVOGADRO_CONSTANT
                * c
                * (boltzmann_factor(-f64::from(z) * ELEMENTARY_CHARGE * psi / kt) - 1.0)
        })
        .sum();
    psi.signum() * (2.0 * permittivity * VACUUM_ELECTRIC_PERMITTIVITY * kt * sum.max(0.0)).sqrt()
}

/// Boltzmann-weighted mean ion radius at a plane potential, setting the
/// Stern gap width on that side
pub(crate) fn stern_radius(populations: &[Population], kt: f64, plane_potential: f64) -> f64 {
    let mut weight_sum = 0.0;
    let mut radius_sum = 0.0;
    for &(z, c, r) in populations {
        let weight =
            c * boltzmann_factor(-f64::from(z) * ELEMENTARY_CHARGE * plane_potential / kt);
        weight_sum += weight;
        radius_sum += weight * r;
    }
    if weight_sum > 0.0 {
        radius_sum / weight_sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const KT: f64 = BOLTZMANN_CONSTANT * 298.15;

    #[test]
    fn grahame_matches_arcsinh_for_symmetric_salt() {
        // 0.1 M 1:1 salt: the general relation must agree with the closed form
        let populations = vec![(1, 100.0, 3.5e-10), (-1, 100.0, 3.3e-10)];
        let psi = 0.05;
        let sigma = grahame_charge(&populations, 78.4, KT, psi);
        let closed = diffuse_potential(&populations, 78.4, KT, Some(1), sigma, &Default::default())
            .unwrap();
        assert_relative_eq!(closed, psi, max_relative = 1e-9);
    }

    #[test]
    fn grahame_is_odd_and_monotone() {
        let populations = vec![(2, 100.0, 4.1e-10), (-1, 200.0, 3.3e-10)];
        let low = grahame_charge(&populations, 78.4, KT, 0.01);
        let high = grahame_charge(&populations, 78.4, KT, 0.05);
        assert!(high > low && low > 0.0);
        assert_relative_eq!(
            grahame_charge(&populations, 78.4, KT, -0.03),
            -grahame_charge(&populations, 78.4, KT, 0.03),
            max_relative = 1e-12
        );
    }

    #[test]
    fn stern_radius_weights_counterions() {
        // near a strongly negative plane the cation radius dominates
        let populations = vec![(1, 100.0, 4.0e-10), (-1, 100.0, 3.0e-10)];
        let radius = stern_radius(&populations, KT, -0.2);
        assert_relative_eq!(radius, 4.0e-10, max_relative = 1e-3);
        // at zero potential both weigh equally
        assert_relative_eq!(stern_radius(&populations, KT, 0.0), 3.5e-10, max_relative = 1e-12);
    }

    #[test]
    fn counterions_accumulate_in_the_excess() {
        let kappa = Some(1e9);
        assert!(surface_excess(100.0, -1, 0.05, KT, kappa) > 0.0);
        assert!(surface_excess(100.0, 1, 0.05, KT, kappa) < 0.0);
        assert_eq!(surface_excess(100.0, 1, 0.05, KT, None), 0.0);
    }
}

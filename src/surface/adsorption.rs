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

//! Surface-site occupancy by specifically adsorbing species.
//!
//! Exactly one adsorbing species reduces to a quadratic in the occupancy;
//! several competing species are solved by simplex minimization of the
//! Langmuir residuals. Adsorbed moles deplete the finite electrolyte volume.

use crate::error::{Error, Result};
use crate::numerics::{
    minimize, select_physical_root, stable_quadratic_roots, Objective, SimplexOptions,
};
use crate::params::SurfaceSystem;
use crate::screening::boltzmann_factor;
use crate::table::IonRecord;
use physical_constants::{BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE};

/// Fraction of surface sites occupied by each active species, given the
/// potential at the adsorption plane (relative to the bulk).
/// Non-adsorbing species get zero.
pub(crate) fn occupancies(
    actives: &[&IonRecord],
    system: &SurfaceSystem,
    plane_potential: f64,
) -> Result<Vec<f64>> {
    let mut theta = vec![0.0; actives.len()];
    let adsorbers: Vec<usize> = actives
        .iter()
        .enumerate()
        .filter(|(_, ion)| ion.assoc_constant > 0.0)
        .map(|(i, _)| i)
        .collect();
    if system.site_density <= 0.0 || adsorbers.is_empty() {
        return Ok(theta);
    }

    let kt = BOLTZMANN_CONSTANT * system.temperature;
    // concentration enhancement at the adsorption plane
    let boltzmann = |charge: i32| {
        boltzmann_factor(-f64::from(charge) * ELEMENTARY_CHARGE * plane_potential / kt)
    };

    match adsorbers.as_slice() {
        [i] => {
            theta[*i] = single_occupancy(actives[*i], system, boltzmann(actives[*i].charge))?;
            Ok(theta)
        }
        _ => {
            let solved = competing_occupancies(actives, &adsorbers, system, &boltzmann)?;
            for (slot, &i) in adsorbers.iter().enumerate() {
                theta[i] = solved[slot];
            }
            Ok(theta)
        }
    }
}

/// Closed-form occupancy of a single adsorbing species.
///
/// Combining the Langmuir isotherm θ = K·cˢ·(1 − θ) with the depleted bulk
/// c = (n − Nₛ·S·θ)/V gives a quadratic whose physical root is confined to
/// `[0, min(1, n/(Nₛ·S))]`.
fn single_occupancy(ion: &IonRecord, system: &SurfaceSystem, boltzmann: f64) -> Result<f64> {
    let site_moles = system.site_density * system.area;
    let kb = ion.assoc_constant * boltzmann;
    let aa = kb * site_moles;
    let bb = -(kb * (ion.total_moles + site_moles) + system.volume);
    let cc = kb * ion.total_moles;
    let upper = (ion.total_moles / site_moles).min(1.0);
    let roots = stable_quadratic_roots(aa, bb, cc).ok_or(Error::NoPhysicalRoot {
        upper,
        roots: [f64::NAN, f64::NAN],
    })?;
    select_physical_root(roots, upper)
}

/// Competitive occupancies via simplex minimization of the Langmuir
/// residuals θᵢ − Kᵢ·cᵢˢ·(1 − Σθ), with soft constraints keeping every
/// occupancy non-negative and the total below one.
fn competing_occupancies(
    actives: &[&IonRecord],
    adsorbers: &[usize],
    system: &SurfaceSystem,
    boltzmann: &dyn Fn(i32) -> f64,
) -> Result<Vec<f64>> {
    let site_moles = system.site_density * system.area;
    let volume = system.volume;

    // independent Langmuir estimates seed the competition
    let mut initial: Vec<f64> = adsorbers
        .iter()
        .map(|&i| {
            let ion = actives[i];
            let kc = ion.assoc_constant * boltzmann(ion.charge) * ion.concn_a;
            kc / (1.0 + kc)
        })
        .collect();
    let total: f64 = initial.iter().sum();
    if total > 0.9 {
        initial.iter_mut().for_each(|t| *t *= 0.9 / total);
    }
    let steps: Vec<f64> = initial.iter().map(|t| 0.1 * t.max(0.01)).collect();

    let mut objective = |theta: &[f64]| -> Result<f64> {
        let mut value: f64 = theta
            .iter()
            .filter(|&&t| t < 0.0)
            .map(|t| 1e6 * t.powi(2))
            .sum();
        let total: f64 = theta.iter().map(|t| t.max(0.0)).sum();
        if total > 1.0 {
            value += 1e6 * (total - 1.0).powi(2);
        }
        let free_sites = (1.0 - total).max(0.0);
        for (slot, &i) in adsorbers.iter().enumerate() {
            let ion = actives[i];
            let t = theta[slot].max(0.0);
            let depleted = ((ion.total_moles - site_moles * t) / volume).max(0.0);
            let surface_concn = boltzmann(ion.charge) * depleted;
            let residual = t - ion.assoc_constant * surface_concn * free_sites;
            value += residual.powi(2);
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
            "occupancy search stopped at iteration cap, residual {:.3e}",
            outcome.value
        );
    }
    Ok(outcome.x.iter().map(|t| t.clamp(0.0, 1.0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SurfaceSystemBuilder;
    use approx::assert_relative_eq;

    fn record(name: &str, charge: i32, concn: f64, assoc: f64, volume: f64) -> IonRecord {
        IonRecord {
            name: name.into(),
            charge,
            radius: Some(3.3e-10),
            concn_a: concn,
            concn_b: 0.0,
            total_moles: concn * volume,
            assoc_constant: assoc,
            coefficient: 1.0,
            active: true,
            source_index: 0,
        }
    }

    fn system() -> SurfaceSystem {
        SurfaceSystemBuilder::default()
            .area(1e-4)
            .volume(1e-3)
            .permittivity(78.4)
            .site_density(1e-6)
            .build()
            .unwrap()
    }

    #[test]
    fn single_adsorber_satisfies_langmuir_with_depletion() {
        let system = system();
        let ion = record("K", 1, 100.0, 0.1, system.volume);
        let theta = single_occupancy(&ion, &system, 1.0).unwrap();
        assert!(theta > 0.0 && theta < 1.0);
        let site_moles = system.site_density * system.area;
        let depleted = (ion.total_moles - site_moles * theta) / system.volume;
        assert_relative_eq!(
            theta,
            ion.assoc_constant * depleted * (1.0 - theta),
            max_relative = 1e-9
        );
    }

    #[test]
    fn competing_adsorbers_share_the_sites() {
        let system = system();
        let strong = record("K", 1, 100.0, 0.5, system.volume);
        let weak = record("Na", 1, 100.0, 0.05, system.volume);
        let actives = [&strong, &weak];
        let theta = occupancies(&actives, &system, 0.0).unwrap();
        assert!(theta[0] > theta[1]);
        assert!(theta.iter().sum::<f64>() < 1.0);
        // both Langmuir relations hold at the solution
        let free = 1.0 - theta[0] - theta[1];
        let site_moles = system.site_density * system.area;
        for (t, ion) in theta.iter().zip([&strong, &weak]) {
            let depleted = (ion.total_moles - site_moles * t) / system.volume;
            assert_relative_eq!(
                *t,
                ion.assoc_constant * depleted * free,
                max_relative = 1e-3
            );
        }
    }

    #[test]
    fn plane_potential_biases_counterion_adsorption() {
        let system = system();
        let cation = record("K", 1, 100.0, 0.1, system.volume);
        let actives = [&cation];
        let at_negative = occupancies(&actives, &system, -0.05).unwrap()[0];
        let at_positive = occupancies(&actives, &system, 0.05).unwrap()[0];
        assert!(at_negative > at_positive);
    }

    #[test]
    fn no_sites_means_no_occupancy() {
        let mut system = system();
        system.site_density = 0.0;
        let ion = record("K", 1, 100.0, 0.1, system.volume);
        let theta = occupancies(&[&ion], &system, 0.0).unwrap();
        assert_eq!(theta, vec![0.0]);
    }
}

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

//! Integration tests for the two-partition Donnan solver.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use donnan::{
    BuiltinIonProperties, DonnanSolver, IonSpecies, PartitionSystem, PartitionSystemBuilder,
    SolverSettings, BOLTZMANN_CONSTANT, ELEMENTARY_CHARGE,
};

const TEMPERATURE: f64 = 298.15;

fn thermal_voltage() -> f64 {
    BOLTZMANN_CONSTANT * TEMPERATURE / ELEMENTARY_CHARGE
}

fn ion(name: &str, concn_a: f64, concn_b: f64) -> IonSpecies {
    let mut species = IonSpecies::new(name);
    species.concn_a = concn_a;
    species.concn_b = concn_b;
    species
}

fn water_system() -> PartitionSystem {
    PartitionSystemBuilder::default()
        .volume_a(1e-3)
        .volume_b(1e-3)
        .permittivity_a(78.4)
        .permittivity_b(78.4)
        .temperature(TEMPERATURE)
        .build()
        .unwrap()
}

fn solver(species: &[IonSpecies], system: PartitionSystem) -> DonnanSolver {
    DonnanSolver::with_properties(species, system, Some(&BuiltinIonProperties)).unwrap()
}

#[test]
fn symmetric_electrolyte_develops_no_potential() {
    let species = [ion("Na", 0.1, 0.1), ion("Cl", 0.1, 0.1)];
    let result = solver(&species, water_system()).solve().unwrap();

    assert!(result.convergence().converged);
    assert_abs_diff_eq!(*result.potential(), 0.0, epsilon = 1e-6);
    for species in result.ions() {
        assert_relative_eq!(*species.concn_a(), 0.1, max_relative = 1e-6);
        assert_relative_eq!(*species.concn_b(), 0.1, max_relative = 1e-6);
    }
}

#[test]
fn solved_state_is_charge_neutral_in_partition_b() {
    let species = [ion("Na", 0.1, 0.01), ion("Cl", 0.1, 0.01)];
    let result = solver(&species, water_system()).solve().unwrap();

    let net: f64 = result
        .ions()
        .iter()
        .map(|i| f64::from(*i.charge()) * (i.concn_b() + i.complex()))
        .sum();
    assert_abs_diff_eq!(net, 0.0, epsilon = 1e-8);
}

#[test]
fn concentration_gradient_satisfies_the_nernst_relation() {
    let species = [ion("Na", 0.1, 0.01), ion("Cl", 0.1, 0.01)];
    let result = solver(&species, water_system()).solve().unwrap();

    let sodium = &result.ions()[0];
    let nernst = thermal_voltage() * (sodium.concn_a() / sodium.concn_b()).ln();
    // within 1% of the thermal voltage scale
    assert_abs_diff_eq!(*result.potential(), nernst, epsilon = 0.01 * thermal_voltage());
}

#[test]
fn impermeant_anion_sets_up_the_classic_donnan_ratio() {
    // NaCl in partition A, NaP in partition B with P confined to B;
    // analytically e^(eV/kT) = 2, i.e. V = (kT/e)·ln 2
    let mut polyanion = ion("P", 0.0, 0.1);
    polyanion.charge = Some(-1);
    polyanion.radius = Some(3.0);
    polyanion.partition_coefficient = Some(0.0);
    let species = [ion("Na", 0.1, 0.1), ion("Cl", 0.1, 0.0), polyanion];
    let result = solver(&species, water_system()).solve().unwrap();

    assert!(result.convergence().converged);
    assert_relative_eq!(
        *result.potential(),
        thermal_voltage() * 2f64.ln(),
        max_relative = 1e-3
    );
    let sodium = &result.ions()[0];
    let chloride = &result.ions()[1];
    let polyanion = &result.ions()[2];
    assert_relative_eq!(*sodium.concn_b(), 0.4 / 3.0, max_relative = 1e-3);
    assert_relative_eq!(*sodium.concn_a(), 0.2 / 3.0, max_relative = 1e-3);
    assert_relative_eq!(*chloride.concn_b(), 0.1 / 3.0, max_relative = 1e-3);
    assert_relative_eq!(*chloride.concn_a(), 0.2 / 3.0, max_relative = 1e-3);
    assert_relative_eq!(*polyanion.concn_b(), 0.1, max_relative = 1e-6);
    // the Donnan ratio is the same for every permeant ion
    assert_relative_eq!(
        sodium.concn_a() / sodium.concn_b(),
        chloride.concn_b() / chloride.concn_a(),
        max_relative = 1e-3
    );
}

#[test]
fn species_without_moles_come_back_as_zeros_in_order() {
    let mut potassium = IonSpecies::new("K");
    potassium.partition_coefficient = Some(1.0);
    let species = [ion("Na", 0.1, 0.1), potassium, ion("Cl", 0.1, 0.1)];
    let result = solver(&species, water_system()).solve().unwrap();

    assert_eq!(result.ions().len(), 3);
    let inactive = &result.ions()[1];
    assert_eq!(inactive.name(), "K");
    assert_eq!(*inactive.concn_a(), 0.0);
    assert_eq!(*inactive.concn_b(), 0.0);
    assert_eq!(*inactive.complex(), 0.0);
}

#[test]
fn solving_twice_gives_identical_results() {
    let species = [ion("Na", 0.1, 0.01), ion("Cl", 0.1, 0.01)];
    let solver = solver(&species, water_system());
    let first = solver.solve().unwrap();
    let second = solver.solve().unwrap();
    assert_eq!(first, second);
}

#[test]
fn single_carrier_binding_respects_all_equilibria() {
    let mut sodium = ion("Na", 0.1, 0.0);
    sodium.assoc_constant = 100.0; // l/mol
    let species = [sodium, ion("Cl", 0.1, 0.0)];
    let system = PartitionSystemBuilder::default()
        .volume_a(1e-3)
        .volume_b(1e-3)
        .permittivity_a(78.4)
        .permittivity_b(78.4)
        .temperature(TEMPERATURE)
        .carrier_concn(0.05)
        .carrier_radius(6.0)
        .build()
        .unwrap();
    let result = DonnanSolver::with_properties(&species, system, Some(&BuiltinIonProperties))
        .unwrap()
        .solve()
        .unwrap();
    assert!(result.convergence().converged);

    let sodium = &result.ions()[0];
    assert!(*sodium.complex() > 0.0);

    // mass conservation per species (volumes are equal, 1 ml each)
    for (species, loading) in result.ions().iter().zip([0.1, 0.1]) {
        let recovered = species.concn_a() + species.concn_b() + species.complex();
        assert_relative_eq!(recovered, loading, max_relative = 1e-6);
    }
    // 1:1 binding equilibrium in molar units
    let free_carrier = 0.05 - sodium.complex();
    assert_relative_eq!(
        *sodium.complex(),
        100.0 * sodium.concn_b() * free_carrier,
        max_relative = 1e-6
    );
    // electroneutrality of partition B
    let net: f64 = result
        .ions()
        .iter()
        .map(|i| f64::from(*i.charge()) * (i.concn_b() + i.complex()))
        .sum();
    assert_abs_diff_eq!(net, 0.0, epsilon = 1e-7);
}

#[test]
fn competing_carriers_share_through_the_linear_solve() {
    let mut sodium = ion("Na", 0.05, 0.0);
    sodium.assoc_constant = 100.0;
    let mut potassium = ion("K", 0.05, 0.0);
    potassium.assoc_constant = 300.0;
    let species = [sodium, potassium, ion("Cl", 0.1, 0.0)];
    let system = PartitionSystemBuilder::default()
        .volume_a(1e-3)
        .volume_b(1e-3)
        .permittivity_a(78.4)
        .permittivity_b(78.4)
        .temperature(TEMPERATURE)
        .carrier_concn(0.02)
        .carrier_radius(6.0)
        .settings(SolverSettings {
            max_iterations: 2000,
            ..Default::default()
        })
        .build()
        .unwrap();
    let result = DonnanSolver::with_properties(&species, system, Some(&BuiltinIonProperties))
        .unwrap()
        .solve()
        .unwrap();

    let sodium = &result.ions()[0];
    let potassium = &result.ions()[1];
    // the stronger binder takes more of the carrier
    assert!(*potassium.complex() > *sodium.complex());
    assert!(*sodium.complex() > 0.0);

    // mass conservation per species
    for (species, loading) in result.ions().iter().zip([0.05, 0.05, 0.1]) {
        let recovered = species.concn_a() + species.concn_b() + species.complex();
        assert_relative_eq!(recovered, loading, max_relative = 1e-4);
    }
    // simultaneous 1:1 binding equilibria
    let free_carrier = 0.02 - sodium.complex() - potassium.complex();
    assert_relative_eq!(
        *sodium.complex(),
        100.0 * sodium.concn_b() * free_carrier,
        max_relative = 1e-4
    );
    assert_relative_eq!(
        *potassium.complex(),
        300.0 * potassium.concn_b() * free_carrier,
        max_relative = 1e-4
    );
}

#[test]
fn imbalanced_loading_warns_but_still_solves() {
    let species = [ion("Na", 0.1, 0.0), ion("Cl", 0.05, 0.0)];
    let solver = solver(&species, water_system());
    let warning = solver.neutrality_warning().unwrap();
    assert!(warning.net_charge > 0.0);

    // the imbalance is absorbed by the equilibrium potential:
    // analytically e^(eV/kT) = 1/2 here
    let result = solver.solve().unwrap();
    assert!(result.convergence().converged);
    assert_relative_eq!(
        *result.potential(),
        -thermal_voltage() * 2f64.ln(),
        max_relative = 1e-3
    );
}

#[test]
fn interfacial_charge_correction_converges_from_the_seeded_potential() {
    let mut polyanion = ion("P", 0.0, 0.1);
    polyanion.charge = Some(-1);
    polyanion.radius = Some(3.0);
    polyanion.partition_coefficient = Some(0.0);
    let species = [ion("Na", 0.1, 0.1), ion("Cl", 0.1, 0.0), polyanion];
    let system = PartitionSystemBuilder::default()
        .volume_a(1e-3)
        .volume_b(1e-3)
        .area(1e-4)
        .permittivity_a(78.4)
        .permittivity_b(78.4)
        .stern_permittivity_a(6.0)
        .stern_permittivity_b(6.0)
        .temperature(TEMPERATURE)
        .interfacial_charge(true)
        .settings(SolverSettings {
            max_iterations: 2000,
            ..Default::default()
        })
        .build()
        .unwrap();
    let result = DonnanSolver::with_properties(&species, system, Some(&BuiltinIonProperties))
        .unwrap()
        .solve()
        .unwrap();
    assert!(result.convergence().converged);

    // interfacial excesses are a small correction here, so the potential
    // stays near the uncorrected Donnan value
    assert_relative_eq!(
        *result.potential(),
        thermal_voltage() * 2f64.ln(),
        max_relative = 1e-2
    );
    // the positive partition charges the interface positively
    assert!(*result.surface_charge() > 0.0);
    // the three potential drops add up to the Donnan potential
    let total = -result.dl_potential_a() + result.stern_potential() + result.dl_potential_b();
    assert_relative_eq!(total, *result.potential(), max_relative = 1e-6);
    // Stern geometry and capacitances are reported
    assert!(*result.stern_thickness_a() > 0.0);
    assert!(result.stern_capacitance().unwrap() > 0.0);
    assert!(result.debye_length_a().unwrap() > 0.0);

    // mass conservation including the interfacial excess; with 1 l per
    // partition the bulk moles equal the molar concentrations numerically,
    // and the excess adds Γ·S over the 1 cm² interface
    for (species, loading) in result.ions().iter().take(2).zip([0.2, 0.1]) {
        let bulk_moles = species.concn_a() + species.concn_b() + species.complex();
        let excess_moles = (species.excess_a() + species.excess_b()) * 1e-4;
        assert_relative_eq!(bulk_moles + excess_moles, loading, max_relative = 1e-4);
    }
}

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

//! Validated, unit-normalised ion tables consumed by the solvers.

use crate::born::BornPartitionModel;
use crate::error::{Error, NeutralityWarning, Result};
use crate::params::{PartitionSystem, SurfaceSystem};
use crate::species::{IonProperties, IonSpecies};
use itertools::Itertools;

const MOLAR_TO_SI: f64 = 1e3; // mol/l -> mol/m³
const LITER_PER_MOL_TO_SI: f64 = 1e-3; // l/mol -> m³/mol
const ANGSTROM: f64 = 1e-10; // Å -> m

/// One unpacked species row in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct IonRecord {
    /// Species name
    pub name: String,
    /// Signed valency
    pub charge: i32,
    /// Hydrated radius (m); `None` only when never needed by the requested model
    pub radius: Option<f64>,
    /// Initial bulk concentration in partition A (mol/m³)
    pub concn_a: f64,
    /// Initial bulk concentration in partition B (mol/m³)
    pub concn_b: f64,
    /// Total moles over the whole system
    pub total_moles: f64,
    /// Association constant with the carrier or surface site (m³/mol)
    pub assoc_constant: f64,
    /// Partition coefficient at zero potential (1 for the surface model)
    pub coefficient: f64,
    /// Whether the species takes part in the numeric search;
    /// species without moles are re-inserted as zeros afterwards
    pub active: bool,
    /// Position in the caller-supplied species list
    pub source_index: usize,
}

/// Immutable, validated collection of ion records plus derived aggregates.
#[derive(Debug, Clone)]
pub struct IonTable {
    records: Vec<IonRecord>,
    charge_symmetric: bool,
    num_cations: usize,
    num_anions: usize,
}

impl IonTable {
    /// Unpack and validate species for the two-partition Donnan problem.
    ///
    /// Concentrations are converted to mol/m³, unset charges and radii are
    /// resolved through `properties`, and unset partition coefficients are
    /// derived from the Born charging energy. A radius is only demanded when
    /// it is actually consumed (Born derivation or interfacial correction).
    pub fn unpack(
        species: &[IonSpecies],
        system: &PartitionSystem,
        properties: Option<&dyn IonProperties>,
    ) -> Result<Self> {
        let born = BornPartitionModel::new(
            system.permittivity_a,
            system.permittivity_b,
            system.temperature,
        );
        let records = species
            .iter()
            .enumerate()
            .map(|(index, sp)| {
                let needs_radius =
                    sp.partition_coefficient.is_none() || system.interfacial_charge;
                let (charge, radius) = resolve_properties(sp, properties, needs_radius)?;
                let concn_a = checked_concentration(sp, sp.concn_a)? * MOLAR_TO_SI;
                let concn_b = checked_concentration(sp, sp.concn_b)? * MOLAR_TO_SI;
                let total_moles = concn_a * system.volume_a + concn_b * system.volume_b;
                let coefficient = match sp.partition_coefficient {
                    Some(k0) if k0 >= 0.0 => k0,
                    Some(k0) => {
                        return Err(Error::Configuration(format!(
                            "partition coefficient of '{}' must be non-negative, got {k0}",
                            sp.name
                        )))
                    }
                    None => born.partition_coefficient(
                        charge,
                        radius.expect("radius demanded for Born derivation"),
                    ),
                };
                Ok(IonRecord {
                    name: sp.name.clone(),
                    charge,
                    radius,
                    concn_a,
                    concn_b,
                    total_moles,
                    assoc_constant: sp.assoc_constant * LITER_PER_MOL_TO_SI,
                    coefficient,
                    active: total_moles > 0.0,
                    source_index: index,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_records(records)
    }

    /// Unpack and validate species for the single-surface problem.
    ///
    /// The single bulk concentration is read from `concn_a`; partition
    /// coefficients play no role and are fixed at one.
    pub fn unpack_surface(
        species: &[IonSpecies],
        system: &SurfaceSystem,
        properties: Option<&dyn IonProperties>,
    ) -> Result<Self> {
        let needs_radius = system.stern_permittivity.is_some();
        let records = species
            .iter()
            .enumerate()
            .map(|(index, sp)| {
                let (charge, radius) = resolve_properties(sp, properties, needs_radius)?;
                let concn = checked_concentration(sp, sp.concn_a)? * MOLAR_TO_SI;
                Ok(IonRecord {
                    name: sp.name.clone(),
                    charge,
                    radius,
                    concn_a: concn,
                    concn_b: 0.0,
                    total_moles: concn * system.volume,
                    assoc_constant: sp.assoc_constant * LITER_PER_MOL_TO_SI,
                    coefficient: 1.0,
                    active: concn > 0.0,
                    source_index: index,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_records(records)
    }

    fn from_records(records: Vec<IonRecord>) -> Result<Self> {
        if let Some(name) = records.iter().map(|r| r.name.as_str()).duplicates().next() {
            return Err(Error::Configuration(format!(
                "duplicate species name '{name}'"
            )));
        }
        for record in &records {
            if record.charge == 0 {
                return Err(Error::Configuration(format!(
                    "species '{}' has zero charge",
                    record.name
                )));
            }
            if record.assoc_constant < 0.0 {
                return Err(Error::Configuration(format!(
                    "association constant of '{}' must be non-negative",
                    record.name
                )));
            }
        }
        if !records.iter().any(|r| r.active) {
            return Err(Error::Configuration(
                "at least one species must have non-zero total moles".into(),
            ));
        }

        let mut magnitudes = records
            .iter()
            .filter(|r| r.active)
            .map(|r| r.charge.unsigned_abs());
        let first = magnitudes.next().expect("at least one active record");
        let charge_symmetric = magnitudes.all(|m| m == first);
        let num_cations = records.iter().filter(|r| r.active && r.charge > 0).count();
        let num_anions = records.iter().filter(|r| r.active && r.charge < 0).count();

        Ok(Self {
            records,
            charge_symmetric,
            num_cations,
            num_anions,
        })
    }

    /// All records, in the caller-supplied order
    pub fn records(&self) -> &[IonRecord] {
        &self.records
    }

    /// Records taking part in the numeric search
    pub fn active(&self) -> impl Iterator<Item = &IonRecord> {
        self.records.iter().filter(|r| r.active)
    }

    /// Number of active records
    pub fn num_active(&self) -> usize {
        self.records.iter().filter(|r| r.active).count()
    }

    /// Active records with non-zero carrier/site affinity
    pub fn binders(&self) -> impl Iterator<Item = &IonRecord> {
        self.active().filter(|r| r.assoc_constant > 0.0)
    }

    /// Number of active binding records
    pub fn num_binders(&self) -> usize {
        self.binders().count()
    }

    /// True iff all active species share the same |valency|
    pub fn charge_symmetric(&self) -> bool {
        self.charge_symmetric
    }

    /// Number of active cationic species
    pub fn num_cations(&self) -> usize {
        self.num_cations
    }

    /// Number of active anionic species
    pub fn num_anions(&self) -> usize {
        self.num_anions
    }

    /// Check overall electroneutrality of the loading.
    ///
    /// Returns a warning when the net charge exceeds `relative_tolerance`
    /// of the larger of total positive and total negative charge.
    pub fn neutrality(&self, relative_tolerance: f64) -> Option<NeutralityWarning> {
        let positive: f64 = self
            .active()
            .filter(|r| r.charge > 0)
            .map(|r| f64::from(r.charge) * r.total_moles)
            .sum();
        let negative: f64 = self
            .active()
            .filter(|r| r.charge < 0)
            .map(|r| f64::from(-r.charge) * r.total_moles)
            .sum();
        let reference = positive.max(negative);
        let net = positive - negative;
        if reference > 0.0 && net.abs() > relative_tolerance * reference {
            Some(NeutralityWarning {
                net_charge: net,
                reference_charge: reference,
                relative_imbalance: net / reference,
            })
        } else {
            None
        }
    }
}

fn checked_concentration(sp: &IonSpecies, concn: f64) -> Result<f64> {
    if concn < 0.0 {
        return Err(Error::Configuration(format!(
            "negative concentration for species '{}'",
            sp.name
        )));
    }
    Ok(concn)
}

fn resolve_properties(
    sp: &IonSpecies,
    properties: Option<&dyn IonProperties>,
    needs_radius: bool,
) -> Result<(i32, Option<f64>)> {
    let charge = sp
        .charge
        .or_else(|| properties.and_then(|p| p.charge(&sp.name)))
        .ok_or_else(|| Error::MissingIonProperty {
            ion: sp.name.clone(),
            property: "charge",
        })?;
    let radius = sp
        .radius
        .or_else(|| properties.and_then(|p| p.radius(&sp.name)))
        .map(|r| r * ANGSTROM);
    if needs_radius && radius.is_none() {
        return Err(Error::MissingIonProperty {
            ion: sp.name.clone(),
            property: "radius",
        });
    }
    Ok((charge, radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PartitionSystemBuilder;
    use crate::species::BuiltinIonProperties;
    use approx::assert_relative_eq;

    fn salt_water_system() -> PartitionSystem {
        PartitionSystemBuilder::default()
            .volume_a(1e-3)
            .volume_b(1e-3)
            .permittivity_a(78.4)
            .permittivity_b(78.4)
            .build()
            .unwrap()
    }

    fn sodium_chloride() -> Vec<IonSpecies> {
        let mut sodium = IonSpecies::new("Na");
        sodium.concn_a = 0.1;
        sodium.concn_b = 0.1;
        let mut chloride = IonSpecies::new("Cl");
        chloride.concn_a = 0.1;
        chloride.concn_b = 0.1;
        vec![sodium, chloride]
    }

    #[test]
    fn unpacks_and_normalises_units() {
        let table = IonTable::unpack(
            &sodium_chloride(),
            &salt_water_system(),
            Some(&BuiltinIonProperties),
        )
        .unwrap();
        let sodium = &table.records()[0];
        assert_eq!(sodium.charge, 1);
        assert_relative_eq!(sodium.concn_a, 100.0); // mol/m³
        assert_relative_eq!(sodium.total_moles, 0.2);
        assert_relative_eq!(sodium.coefficient, 1.0); // Born with equal permittivities
        assert!(table.charge_symmetric());
        assert_eq!((table.num_cations(), table.num_anions()), (1, 1));
    }

    #[test]
    fn species_without_moles_are_excluded_from_the_search() {
        let mut species = sodium_chloride();
        species.push(IonSpecies::new("K")); // zero everywhere
        species[2].charge = Some(1);
        species[2].partition_coefficient = Some(1.0);
        let table =
            IonTable::unpack(&species, &salt_water_system(), Some(&BuiltinIonProperties)).unwrap();
        assert_eq!(table.num_active(), 2);
        assert!(!table.records()[2].active);
    }

    #[test]
    fn missing_charge_is_fatal() {
        let mut species = sodium_chloride();
        species[0].name = "Xx".into(); // not in the builtin table
        let err = IonTable::unpack(&species, &salt_water_system(), Some(&BuiltinIonProperties))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingIonProperty { property: "charge", .. }
        ));
    }

    #[test]
    fn missing_radius_is_fatal_only_when_needed() {
        let mut species = sodium_chloride();
        species[0].name = "Xx".into();
        species[0].charge = Some(1);
        // no coefficient supplied: Born derivation needs a radius
        let err = IonTable::unpack(&species, &salt_water_system(), Some(&BuiltinIonProperties))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingIonProperty { property: "radius", .. }
        ));
        // explicit coefficient and no interfacial correction: radius unused
        species[0].partition_coefficient = Some(1.0);
        assert!(
            IonTable::unpack(&species, &salt_water_system(), Some(&BuiltinIonProperties)).is_ok()
        );
    }

    #[test]
    fn neutrality_warning_on_imbalanced_loading() {
        let mut species = sodium_chloride();
        species[1].concn_a = 0.05;
        let table =
            IonTable::unpack(&species, &salt_water_system(), Some(&BuiltinIonProperties)).unwrap();
        let warning = table.neutrality(1e-6).unwrap();
        assert!(warning.net_charge > 0.0);
        assert!(warning.relative_imbalance > 0.1);
        assert!(IonTable::unpack(
            &sodium_chloride(),
            &salt_water_system(),
            Some(&BuiltinIonProperties)
        )
        .unwrap()
        .neutrality(1e-6)
        .is_none());
    }

    #[test]
    fn asymmetric_valencies_clear_the_symmetry_flag() {
        let mut calcium = IonSpecies::new("Ca");
        calcium.concn_a = 0.1;
        let mut chloride = IonSpecies::new("Cl");
        chloride.concn_a = 0.2;
        let table = IonTable::unpack(
            &[calcium, chloride],
            &salt_water_system(),
            Some(&BuiltinIonProperties),
        )
        .unwrap();
        assert!(!table.charge_symmetric());
    }
}

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

//! Ion species records and the ion-property lookup collaborator.

use serde::{Deserialize, Serialize};

/// Description of one ionic species.
///
/// Only the name and at least one non-zero concentration are mandatory;
/// charge and radius may be left unset and are then resolved through an
/// injected [`IonProperties`] lookup when the species list is unpacked.
///
/// # Examples
/// ~~~
/// use donnan::IonSpecies;
/// let mut sodium = IonSpecies::new("Na");
/// sodium.concn_a = 0.1; // mol/l
/// sodium.concn_b = 0.01;
/// assert_eq!(sodium.charge, None); // resolved later via lookup
/// ~~~
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IonSpecies {
    /// Unique species name, e.g. "Na" or "Cl"
    pub name: String,
    /// Bulk concentration in partition A (mol/l). The surface model reads
    /// its single bulk concentration from this field.
    #[serde(default)]
    pub concn_a: f64,
    /// Bulk concentration in partition B (mol/l); unused by the surface model
    #[serde(default)]
    pub concn_b: f64,
    /// Signed valency; `None` = resolve via the ion-property lookup
    #[serde(default)]
    pub charge: Option<i32>,
    /// Hydrated radius (ångström); `None` = resolve via the ion-property lookup
    #[serde(default)]
    pub radius: Option<f64>,
    /// 1:1 association constant with the carrier or surface site (l/mol);
    /// zero means the species does not bind
    #[serde(default)]
    pub assoc_constant: f64,
    /// Partition coefficient at zero potential; `None` = derive from the
    /// Born charging energy and the partition permittivities
    #[serde(default)]
    pub partition_coefficient: Option<f64>,
}

impl IonSpecies {
    /// New species with the given name and otherwise default (unset) fields
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// Lookup collaborator supplying default ionic radii and charges.
///
/// The core never reads reference tables itself; a caller injects an
/// implementation of this trait. A `None` answer for a property that is
/// actually needed becomes [`crate::Error::MissingIonProperty`] — the lookup
/// is consulted, never trusted to exist.
pub trait IonProperties {
    /// Hydrated radius in ångström, if known
    fn radius(&self, name: &str) -> Option<f64>;
    /// Signed valency, if known
    fn charge(&self, name: &str) -> Option<i32>;
}

/// Name, valency, and hydrated (Stokes) radius in ångström
const COMMON_IONS: &[(&str, i32, f64)] = &[
    ("H", 1, 2.82),
    ("Li", 1, 3.82),
    ("Na", 1, 3.58),
    ("K", 1, 3.31),
    ("Rb", 1, 3.29),
    ("Cs", 1, 3.29),
    ("NH4", 1, 3.31),
    ("Mg", 2, 4.28),
    ("Ca", 2, 4.12),
    ("Sr", 2, 4.12),
    ("Ba", 2, 4.04),
    ("F", -1, 3.52),
    ("Cl", -1, 3.32),
    ("Br", -1, 3.30),
    ("I", -1, 3.31),
    ("NO3", -1, 3.35),
    ("ClO4", -1, 3.38),
    ("SO4", -2, 3.79),
];

/// In-memory table of common aqueous ions.
///
/// A convenience [`IonProperties`] implementation for the CLI and tests;
/// callers with their own reference data inject their own implementation.
///
/// # Examples
/// ~~~
/// use donnan::{BuiltinIonProperties, IonProperties};
/// let table = BuiltinIonProperties;
/// assert_eq!(table.charge("Ca"), Some(2));
/// assert_eq!(table.charge("Xx"), None);
/// ~~~
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinIonProperties;

impl IonProperties for BuiltinIonProperties {
    fn radius(&self, name: &str) -> Option<f64> {
        COMMON_IONS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, _, r)| *r)
    }
    fn charge(&self, name: &str) -> Option<i32> {
        COMMON_IONS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, z, _)| *z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_round_trip() {
        let table = BuiltinIonProperties;
        assert_eq!(table.charge("Na"), Some(1));
        assert_eq!(table.charge("SO4"), Some(-2));
        assert_eq!(table.radius("Cl"), Some(3.32));
        assert!(table.radius("unobtainium").is_none());
    }

    #[test]
    fn species_deserializes_with_defaults() {
        let ion: IonSpecies =
            serde_yaml::from_str("{name: Na, concn_a: 0.1, charge: 1}").unwrap();
        assert_eq!(ion.name, "Na");
        assert_eq!(ion.concn_b, 0.0);
        assert_eq!(ion.assoc_constant, 0.0);
        assert!(ion.partition_coefficient.is_none());
    }
}

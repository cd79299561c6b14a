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

//! Error and warning types shared by all solvers.

use core::fmt::{Display, Formatter};
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Fatal errors raised while configuring or running an equilibrium solve.
///
/// Validation problems surface when a solver is constructed; numerical
/// problems surface at the first `solve()` call. Reaching an iteration cap is
/// *not* an error and is reported through [`crate::result::Convergence`]
/// instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Required geometry, permittivity, or temperature is missing or unphysical.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A radius or charge could neither be taken from user input nor resolved
    /// by the injected [`crate::species::IonProperties`] lookup.
    #[error("no {property} available for ion '{ion}'")]
    MissingIonProperty {
        /// Name of the offending species
        ion: String,
        /// Which property was requested ("charge" or "radius")
        property: &'static str,
    },

    /// A closed-form quadratic or linear solve produced no root inside the
    /// physically valid range, indicating an inconsistent input configuration.
    #[error("no physical root in [0, {upper:.6e}]; candidate roots {roots:?}")]
    NoPhysicalRoot {
        /// Upper end of the admissible range (lower end is zero)
        upper: f64,
        /// The two candidate roots that were examined
        roots: [f64; 2],
    },

    /// Bisection could not find a sign change, even after repeatedly
    /// expanding the initial bracket.
    #[error("failed to bracket a sign change after {attempts} bracket expansions")]
    Bracketing {
        /// Number of expansion attempts performed before giving up
        attempts: usize,
    },

    /// The linearised carrier-binding system is singular.
    #[error("singular linear system in binding equations")]
    Singular,
}

/// Non-fatal report of a net-charge imbalance in the supplied species list.
///
/// Produced by [`crate::table::IonTable::neutrality`] when the net charge
/// exceeds the configured relative tolerance of the larger of the total
/// positive and total negative charge. The solvers log this and proceed;
/// callers wanting stricter behaviour can inspect it before solving.
#[derive(Debug, Clone, PartialEq)]
pub struct NeutralityWarning {
    /// Net charge of all species (mol of elementary charge)
    pub net_charge: f64,
    /// Larger of total positive and |total negative| charge (mol)
    pub reference_charge: f64,
    /// `net_charge / reference_charge`
    pub relative_imbalance: f64,
}

impl Display for NeutralityWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "ion set is not electroneutral: net charge {:.3e} mol ({:.2}% of {:.3e} mol)",
            self.net_charge,
            1e2 * self.relative_imbalance,
            self.reference_charge
        )
    }
}

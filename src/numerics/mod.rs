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

//! Generic numerical primitives: bisection, simplex minimization, and a
//! small dense linear solve. All solver-specific knowledge lives in the
//! objects passed in, never here.

mod bisect;
mod linear;
mod quadratic;
mod simplex;

pub use bisect::{bisect, BisectOptions, RootOutcome};
pub use linear::solve_dense;
pub use quadratic::{select_physical_root, stable_quadratic_roots};
pub use simplex::{minimize, Objective, SimplexOptions, SimplexOutcome};

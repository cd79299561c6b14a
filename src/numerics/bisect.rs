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

//! Scalar bracket-and-bisect root finding with adaptive bracket expansion.

use crate::error::{Error, Result};

/// Controls for the bisection primitive.
#[derive(Debug, Clone, Copy)]
pub struct BisectOptions {
    /// Convergence criterion on the half-bracket width, relative to `1 + |midpoint|`
    pub tolerance: f64,
    /// Iteration cap; reaching it returns the last midpoint with `converged == false`
    pub max_iterations: usize,
    /// How many times a non-straddling bracket is expanded before failing
    pub expansions: usize,
}

impl Default for BisectOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 200,
            expansions: 16,
        }
    }
}

/// Converged (or capped) result of a [`bisect`] call.
#[derive(Debug, Clone, Copy)]
pub struct RootOutcome {
    /// Best estimate of the root
    pub root: f64,
    /// Function value at `root`
    pub residual: f64,
    /// Number of bisection steps performed
    pub iterations: usize,
    /// Whether the bracket width criterion was met before the iteration cap
    pub converged: bool,
}

/// Find a root of `f` inside `[lo, hi]` by interval halving.
///
/// If `f(lo)` and `f(hi)` do not straddle zero, both endpoints are pushed
/// outwards by the current span (doubling the bracket) up to
/// `options.expansions` times; failing that, [`Error::Bracketing`] is raised.
///
/// # Examples
/// ~~~
/// use donnan::numerics::{bisect, BisectOptions};
/// let outcome = bisect(|x| Ok(x * x - 2.0), 0.0, 2.0, &BisectOptions::default()).unwrap();
/// assert!((outcome.root - std::f64::consts::SQRT_2).abs() < 1e-10);
/// ~~~
pub fn bisect<F>(mut f: F, lo: f64, hi: f64, options: &BisectOptions) -> Result<RootOutcome>
where
    F: FnMut(f64) -> Result<f64>,
{
    let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut f_lo = f(lo)?;
    let mut f_hi = f(hi)?;

    let mut attempts = 0;
    while f_lo * f_hi > 0.0 {
        if attempts >= options.expansions {
            return Err(Error::Bracketing { attempts });
        }
        let span = hi - lo;
        lo -= span;
        hi += span;
        f_lo = f(lo)?;
        f_hi = f(hi)?;
        attempts += 1;
    }

    if f_lo == 0.0 {
        return Ok(RootOutcome {
            root: lo,
            residual: 0.0,
            iterations: 0,
            converged: true,
        });
    }
    if f_hi == 0.0 {
        return Ok(RootOutcome {
            root: hi,
            residual: 0.0,
            iterations: 0,
            converged: true,
        });
    }

    let mut iterations = 0;
    loop {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid)?;
        iterations += 1;

        let width = 0.5 * (hi - lo);
        if f_mid == 0.0 || width < options.tolerance * (1.0 + mid.abs()) {
            return Ok(RootOutcome {
                root: mid,
                residual: f_mid,
                iterations,
                converged: true,
            });
        }
        if iterations >= options.max_iterations {
            return Ok(RootOutcome {
                root: mid,
                residual: f_mid,
                iterations,
                converged: false,
            });
        }
        if f_lo * f_mid < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            f_lo = f_mid;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_root() {
        let outcome = bisect(|x| Ok(x.cos()), 0.0, 3.0, &BisectOptions::default()).unwrap();
        assert!((outcome.root - std::f64::consts::FRAC_PI_2).abs() < 1e-10);
        assert!(outcome.converged);
    }

    #[test]
    fn expands_bracket_until_straddling() {
        // root at x = 10 lies far outside the initial [0, 1] bracket
        let outcome = bisect(|x| Ok(x - 10.0), 0.0, 1.0, &BisectOptions::default()).unwrap();
        assert!((outcome.root - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fails_after_exactly_the_configured_expansions() {
        let options = BisectOptions {
            expansions: 5,
            ..Default::default()
        };
        // strictly positive everywhere: no bracket can ever straddle
        let err = bisect(|x| Ok(x * x + 1.0), -1.0, 1.0, &options).unwrap_err();
        match err {
            Error::Bracketing { attempts } => assert_eq!(attempts, 5),
            other => panic!("expected Bracketing, got {other:?}"),
        }
    }

    #[test]
    fn reports_non_convergence_at_iteration_cap() {
        let options = BisectOptions {
            max_iterations: 3,
            tolerance: 1e-15,
            ..Default::default()
        };
        let outcome = bisect(|x| Ok(x - 0.123_456_789), 0.0, 1.0, &options).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn propagates_objective_errors() {
        let result = bisect(
            |_| Err(Error::Configuration("boom".into())),
            0.0,
            1.0,
            &BisectOptions::default(),
        );
        assert!(result.is_err());
    }
}

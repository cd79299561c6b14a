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

//! Derivative-free Nelder-Mead minimization over an [`Objective`].

use crate::error::Result;

/// A scalar objective over a parameter vector.
///
/// Each solver variant (Donnan outer potential search, inner concentration
/// search, surface site occupancy) provides one implementation. Evaluations
/// are fallible because they may drive nested bisections that can fail.
/// Closures of the right shape implement the trait automatically.
pub trait Objective {
    /// Evaluate the objective at `x`.
    fn evaluate(&mut self, x: &[f64]) -> Result<f64>;
}

impl<F> Objective for F
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    fn evaluate(&mut self, x: &[f64]) -> Result<f64> {
        self(x)
    }
}

/// Controls for the simplex minimizer.
#[derive(Debug, Clone, Copy)]
pub struct SimplexOptions {
    /// Converged when the best value drops below `tolerance²` or the relative
    /// spread of vertex values drops below `tolerance`
    pub tolerance: f64,
    /// Iteration cap; reaching it returns the best vertex with `converged == false`
    pub max_iterations: usize,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_iterations: 400,
        }
    }
}

/// Result of a [`minimize`] call.
#[derive(Debug, Clone)]
pub struct SimplexOutcome {
    /// Best parameter vector found
    pub x: Vec<f64>,
    /// Objective value at `x`
    pub value: f64,
    /// Number of simplex iterations performed
    pub iterations: usize,
    /// Whether a convergence criterion was met before the iteration cap
    pub converged: bool,
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimize `objective` starting from `initial`, with one simplex edge of
/// length `steps[i]` along each coordinate.
///
/// Zero steps are replaced by a tiny positive length so the initial simplex
/// never degenerates.
pub fn minimize(
    objective: &mut dyn Objective,
    initial: &[f64],
    steps: &[f64],
    options: &SimplexOptions,
) -> Result<SimplexOutcome> {
    let n = initial.len();
    assert!(n > 0, "objective must have at least one parameter");
    assert_eq!(steps.len(), n, "one step per parameter required");

    let mut vertices: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    vertices.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        let step = if steps[i] != 0.0 { steps[i] } else { 1e-8 };
        vertex[i] += step;
        vertices.push(vertex);
    }
    let mut values = Vec::with_capacity(n + 1);
    for vertex in &vertices {
        values.push(objective.evaluate(vertex)?);
    }

    let mut iterations = 0;
    let converged = loop {
        // order vertices by objective value
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let f_best = values[best];
        let f_worst = values[worst];
        let value_spread =
            2.0 * (f_worst - f_best).abs() / (f_worst.abs() + f_best.abs() + f64::MIN_POSITIVE);
        // domain criterion: widest vertex excursion from the best vertex,
        // relative to the best vertex's own scale
        let domain_spread = vertices
            .iter()
            .flat_map(|vertex| {
                vertex
                    .iter()
                    .zip(&vertices[best])
                    .map(|(x, b)| (x - b).abs())
            })
            .fold(0.0, f64::max);
        let domain_scale = vertices[best].iter().map(|x| x.abs()).fold(0.0, f64::max);
        if f_best < options.tolerance * options.tolerance
            || value_spread < options.tolerance
            || domain_spread < options.tolerance * (1.0 + domain_scale)
        {
            break true;
        }
        if iterations >= options.max_iterations {
            break false;
        }
        iterations += 1;

        // centroid of all vertices except the worst
        let mut centroid = vec![0.0; n];
        for (i, vertex) in vertices.iter().enumerate() {
            if i == worst {
                continue;
            }
            for (c, &x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let blend = |from: &[f64], towards: &[f64], factor: f64| -> Vec<f64> {
            from.iter()
                .zip(towards)
                .map(|(&a, &b)| a + factor * (b - a))
                .collect()
        };

        // reflect the worst vertex through the centroid
        let reflected = blend(&centroid, &vertices[worst], -REFLECT);
        let f_reflected = objective.evaluate(&reflected)?;

        if f_reflected < f_best {
            let expanded = blend(&centroid, &reflected, EXPAND);
            let f_expanded = objective.evaluate(&expanded)?;
            if f_expanded < f_reflected {
                vertices[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                vertices[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }
        if f_reflected < values[second_worst] {
            vertices[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        // contraction, outside or inside depending on the reflected value
        let contracted = if f_reflected < f_worst {
            blend(&centroid, &reflected, CONTRACT)
        } else {
            blend(&centroid, &vertices[worst], CONTRACT)
        };
        let f_contracted = objective.evaluate(&contracted)?;
        if f_contracted < f_worst.min(f_reflected) {
            vertices[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        // shrink everything towards the best vertex
        let best_vertex = vertices[best].clone();
        for i in 0..=n {
            if i == best {
                continue;
            }
            vertices[i] = blend(&best_vertex, &vertices[i], SHRINK);
            values[i] = objective.evaluate(&vertices[i])?;
        }
    };

    let (best, _) = values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .expect("simplex is never empty");
    Ok(SimplexOutcome {
        x: vertices[best].clone(),
        value: values[best],
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimizes_scalar_parabola() {
        let mut objective = |x: &[f64]| Ok((x[0] - 3.0).powi(2));
        let outcome = minimize(&mut objective, &[0.0], &[0.5], &SimplexOptions::default()).unwrap();
        assert!(outcome.converged);
        assert_relative_eq!(outcome.x[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn minimizes_rosenbrock_valley() {
        let mut objective =
            |x: &[f64]| Ok((1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2));
        let options = SimplexOptions {
            tolerance: 1e-12,
            max_iterations: 5000,
        };
        let outcome = minimize(&mut objective, &[-1.2, 1.0], &[0.1, 0.1], &options).unwrap();
        assert_relative_eq!(outcome.x[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(outcome.x[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn stops_at_iteration_cap() {
        let mut objective = |x: &[f64]| Ok(x[0].powi(2) + x[1].powi(2));
        let options = SimplexOptions {
            tolerance: 0.0,
            max_iterations: 5,
        };
        let outcome = minimize(&mut objective, &[10.0, -4.0], &[1.0, 1.0], &options).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 5);
    }
}

//! Derivative-free parameter optimization.
//!
//! The curve-fit error is piecewise (the nearest segment for a sample
//! switches as the curve moves), so gradients are unreliable. A
//! coordinate-wise hill climb with per-parameter adaptive steps is used
//! instead.

use crate::error::{Result, TraceError};

/// Default iteration cap for a bare `HillClimbSolver::with_precision`.
pub const DEFAULT_ITERATION_LIMIT: usize = 1_000_000;

/// A black-box optimizer over a real parameter vector.
pub trait Solver {
    /// Adjust `initial` to maximize `f`.
    fn maximize<F>(&self, f: F, initial: &[f64]) -> Vec<f64>
    where
        F: FnMut(&[f64]) -> f64;

    /// Adjust `initial` to minimize `f`.
    fn minimize<F>(&self, mut f: F, initial: &[f64]) -> Vec<f64>
    where
        F: FnMut(&[f64]) -> f64,
    {
        self.maximize(|params| -f(params), initial)
    }
}

/// Coordinate-wise hill climber with adaptive step sizes.
#[derive(Debug, Clone, Copy)]
pub struct HillClimbSolver {
    precision: f64,
    iteration_limit: usize,
}

impl HillClimbSolver {
    /// `precision` is the step size below which a parameter counts as
    /// converged; must be greater than zero.
    pub fn new(precision: f64, iteration_limit: usize) -> Result<Self> {
        if !(precision > 0.0) {
            return Err(TraceError::InvalidPrecision(precision));
        }
        Ok(HillClimbSolver {
            precision,
            iteration_limit,
        })
    }

    pub fn with_precision(precision: f64) -> Result<Self> {
        Self::new(precision, DEFAULT_ITERATION_LIMIT)
    }

    /// The settings curve fitting uses: precision 0.1, 10,000 iterations.
    pub const fn for_fitting() -> Self {
        HillClimbSolver {
            precision: 0.1,
            iteration_limit: 10_000,
        }
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn iteration_limit(&self) -> usize {
        self.iteration_limit
    }
}

impl Solver for HillClimbSolver {
    fn maximize<F>(&self, mut f: F, initial: &[f64]) -> Vec<f64>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let mut params = initial.to_vec();
        if params.is_empty() {
            return params;
        }
        let mut steps = vec![16.0 * self.precision; params.len()];
        let mut base = f(&params);
        let mut trial = params.clone();

        let mut iters = 0;
        loop {
            for i in 0..params.len() {
                let origin = params[i];
                // Candidate order: base, -1, +1, -2, +2 steps.
                let offsets = [-steps[i], steps[i], -2.0 * steps[i], 2.0 * steps[i]];
                let mut best_index = 0;
                let mut best_value = base;
                for (k, offset) in offsets.iter().enumerate() {
                    trial.copy_from_slice(&params);
                    trial[i] = origin + offset;
                    let value = f(&trial);
                    if value > best_value {
                        best_value = value;
                        best_index = k + 1;
                    }
                }
                if best_index > 0 {
                    params[i] = origin + offsets[best_index - 1];
                    base = best_value;
                }
                match best_index {
                    // Already at the best spot: refine.
                    0 => steps[i] *= 0.25,
                    // Long jump won: move faster.
                    3 | 4 => steps[i] *= 4.0,
                    _ => {}
                }
            }
            let largest = steps.iter().copied().fold(0.0, f64::max);
            let done = iters >= self.iteration_limit || !(largest > self.precision);
            iters += 1;
            if done {
                break;
            }
        }
        log::trace!("hill climb: {} iterations, value {:.6}", iters, base);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_precision() {
        assert!(matches!(
            HillClimbSolver::new(0.0, 10),
            Err(TraceError::InvalidPrecision(_))
        ));
        assert!(HillClimbSolver::with_precision(-1.0).is_err());
        assert!(HillClimbSolver::with_precision(f64::NAN).is_err());
    }

    #[test]
    fn maximizes_a_concave_bowl() {
        let solver = HillClimbSolver::with_precision(1e-4).unwrap();
        let best = solver.maximize(
            |p| -((p[0] - 3.0).powi(2) + (p[1] + 7.5).powi(2)),
            &[0.0, 0.0],
        );
        assert!((best[0] - 3.0).abs() < 1e-3, "x = {}", best[0]);
        assert!((best[1] + 7.5).abs() < 1e-3, "y = {}", best[1]);
    }

    #[test]
    fn minimize_negates() {
        let solver = HillClimbSolver::new(1e-3, 10_000).unwrap();
        let best = solver.minimize(|p| (p[0] - 42.0).abs(), &[0.0]);
        assert!((best[0] - 42.0).abs() < 1e-2, "x = {}", best[0]);
    }

    #[test]
    fn iteration_cap_bounds_work() {
        let solver = HillClimbSolver::new(1e-9, 3).unwrap();
        let mut calls = 0;
        solver.maximize(
            |p| {
                calls += 1;
                p[0]
            },
            &[0.0],
        );
        // One base evaluation plus four trials per iteration.
        assert_eq!(calls, 1 + 4 * 4);
    }

    #[test]
    fn empty_parameter_vector_is_returned_unchanged() {
        let solver = HillClimbSolver::with_precision(0.1).unwrap();
        assert!(solver.maximize(|_| 0.0, &[]).is_empty());
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! One-dimensional optimization and root finding
//!
//! The band-distance engine only ever needs to minimize over a single rigid
//! energy shift and to solve for a single Fermi level, so both routines here
//! are specialised to scalar functions.

use std::cell::Cell;

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use super::errors::{Result, UtilsError};

// Standard Nelder-Mead coefficients
const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Convergence settings for the downhill simplex search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplexOptions {
    /// Maximum number of simplex iterations
    pub max_iterations: usize,
    /// Maximum number of objective evaluations
    pub max_evaluations: usize,
    /// Absolute tolerance on the spread of simplex vertices
    pub xatol: f64,
    /// Absolute tolerance on the spread of objective values
    pub fatol: f64,
    /// Relative size of the initial simplex for a non-zero start
    pub nonzero_step: f64,
    /// Absolute size of the initial simplex when starting from zero
    pub zero_step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            max_evaluations: 200,
            xatol: 1e-4,
            fatol: 1e-4,
            nonzero_step: 0.05,
            zero_step: 0.00025,
        }
    }
}

/// Result of a scalar minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
    /// Position of the minimum
    pub x: f64,
    /// Objective value at `x`
    pub fun: f64,
    /// Number of simplex iterations performed
    pub iterations: usize,
    /// Number of objective evaluations performed
    pub evaluations: usize,
    /// Whether both tolerances were met before hitting a limit
    pub converged: bool,
}

/// Minimize a scalar function of one variable with the Nelder-Mead simplex
///
/// The simplex in one dimension is a pair of points. Reflection, expansion,
/// contraction and shrink steps follow the classic algorithm. When an
/// iteration or evaluation limit is reached the best vertex found so far is
/// returned with `converged == false`.
///
/// # Arguments
///
/// * `f` - Objective function
/// * `x0` - Starting point
/// * `options` - Tolerances and limits
///
/// # Returns
///
/// The best vertex of the final simplex, or an error if the objective
/// evaluates to a non-finite value
pub fn nelder_mead_1d<F>(f: F, x0: f64, options: &SimplexOptions) -> Result<Minimum>
where
    F: Fn(f64) -> f64,
{
    let evaluations = Cell::new(0usize);
    let eval = |x: f64| -> Result<f64> {
        evaluations.set(evaluations.get() + 1);
        let value = f(x);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(UtilsError::NonFiniteObjective { x, value })
        }
    };

    let step = if x0 != 0.0 {
        x0 * options.nonzero_step
    } else {
        options.zero_step
    };

    // (best, worst) vertices
    let mut best = (x0, eval(x0)?);
    let mut worst = (x0 + step, eval(x0 + step)?);
    if worst.1 < best.1 {
        std::mem::swap(&mut best, &mut worst);
    }

    let mut iterations = 1usize;
    let mut converged = false;

    while iterations < options.max_iterations && evaluations.get() < options.max_evaluations {
        if (worst.0 - best.0).abs() <= options.xatol && (worst.1 - best.1).abs() <= options.fatol
        {
            converged = true;
            break;
        }

        // The centroid of all but the worst vertex is the best vertex itself
        let centroid = best.0;

        let xr = (1.0 + REFLECTION) * centroid - REFLECTION * worst.0;
        let fxr = eval(xr)?;

        let mut shrink = false;
        if fxr < best.1 {
            let xe = (1.0 + REFLECTION * EXPANSION) * centroid - REFLECTION * EXPANSION * worst.0;
            let fxe = eval(xe)?;
            worst = if fxe < fxr { (xe, fxe) } else { (xr, fxr) };
        } else if fxr < worst.1 {
            let xc =
                (1.0 + CONTRACTION * REFLECTION) * centroid - CONTRACTION * REFLECTION * worst.0;
            let fxc = eval(xc)?;
            if fxc <= fxr {
                worst = (xc, fxc);
            } else {
                shrink = true;
            }
        } else {
            let xcc = (1.0 - CONTRACTION) * centroid + CONTRACTION * worst.0;
            let fxcc = eval(xcc)?;
            if fxcc < worst.1 {
                worst = (xcc, fxcc);
            } else {
                shrink = true;
            }
        }

        if shrink {
            let xs = best.0 + SHRINK * (worst.0 - best.0);
            worst = (xs, eval(xs)?);
        }

        if worst.1 < best.1 {
            std::mem::swap(&mut best, &mut worst);
        }

        iterations += 1;
    }

    if !converged {
        // A limit may have been hit exactly when the tolerances were met
        converged = (worst.0 - best.0).abs() <= options.xatol
            && (worst.1 - best.1).abs() <= options.fatol;
    }

    if !converged {
        warn!(
            "Nelder-Mead stopped after {} iterations ({} evaluations) without converging, best x = {}",
            iterations,
            evaluations.get(),
            best.0
        );
    }
    trace!(
        "Nelder-Mead minimum f({}) = {} after {} iterations",
        best.0,
        best.1,
        iterations
    );

    Ok(Minimum {
        x: best.0,
        fun: best.1,
        iterations,
        evaluations: evaluations.get(),
        converged,
    })
}

/// Find a root of `f` inside `[lower, upper]` by bisection
///
/// The function values at the two ends must have opposite signs (or one of
/// them must be zero). Bisection stops once `|f(x)| <= ftol`, the bracket
/// is narrower than `xtol`, or `max_iterations` halvings were performed.
///
/// # Arguments
///
/// * `f` - Function whose root is sought
/// * `lower` - Lower end of the bracket
/// * `upper` - Upper end of the bracket
/// * `ftol` - Absolute tolerance on the function value
/// * `xtol` - Absolute tolerance on the bracket width
/// * `max_iterations` - Upper bound on the number of halvings
///
/// # Returns
///
/// The midpoint of the final bracket
pub fn bisect<F>(
    f: F,
    lower: f64,
    upper: f64,
    ftol: f64,
    xtol: f64,
    max_iterations: usize,
) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut lower, mut upper) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };
    let f_lower = f(lower);
    let f_upper = f(upper);

    if !f_lower.is_finite() || !f_upper.is_finite() || f_lower * f_upper > 0.0 {
        return Err(UtilsError::NotBracketed {
            lower,
            upper,
            f_lower,
            f_upper,
        });
    }
    if f_lower == 0.0 {
        return Ok(lower);
    }
    if f_upper == 0.0 {
        return Ok(upper);
    }

    let lower_negative = f_lower < 0.0;
    let mut mid = 0.5 * (lower + upper);

    for _ in 0..max_iterations {
        mid = 0.5 * (lower + upper);
        let f_mid = f(mid);
        if !f_mid.is_finite() {
            return Err(UtilsError::NonFiniteObjective { x: mid, value: f_mid });
        }
        if f_mid.abs() <= ftol || 0.5 * (upper - lower) < xtol {
            return Ok(mid);
        }
        if (f_mid < 0.0) == lower_negative {
            lower = mid;
        } else {
            upper = mid;
        }
    }

    warn!(
        "Bisection reached {} iterations, returning bracket midpoint {}",
        max_iterations, mid
    );
    Ok(mid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_nelder_mead_parabola() {
        let min = nelder_mead_1d(|x| (x - 1.3).powi(2) + 0.5, 0.0, &SimplexOptions::default())
            .unwrap();
        assert!(min.converged);
        assert_abs_diff_eq!(min.x, 1.3, epsilon = 1e-2);
        assert_abs_diff_eq!(min.fun, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_nelder_mead_start_at_minimum() {
        let min = nelder_mead_1d(|x: f64| x.abs(), 0.0, &SimplexOptions::default()).unwrap();
        assert_eq!(min.x, 0.0);
        assert_eq!(min.fun, 0.0);
    }

    #[test]
    fn test_nelder_mead_non_finite() {
        let result = nelder_mead_1d(|_| f64::NAN, 0.0, &SimplexOptions::default());
        assert!(matches!(
            result,
            Err(UtilsError::NonFiniteObjective { .. })
        ));
    }

    #[test]
    fn test_nelder_mead_iteration_limit() {
        let options = SimplexOptions {
            max_iterations: 3,
            ..SimplexOptions::default()
        };
        let min = nelder_mead_1d(|x| (x - 100.0).powi(2), 0.0, &options).unwrap();
        assert!(!min.converged);
        assert!(min.iterations <= 3);
    }

    #[test]
    fn test_bisect() {
        let root = bisect(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 1e-14, 200).unwrap();
        assert_abs_diff_eq!(root, 2f64.sqrt(), epsilon = 1e-10);

        // Reversed bracket and decreasing function
        let root = bisect(|x| 1.0 - x, 3.0, -1.0, 1e-12, 1e-14, 200).unwrap();
        assert_abs_diff_eq!(root, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_bisect_not_bracketed() {
        let result = bisect(|x| x * x + 1.0, -1.0, 1.0, 1e-12, 1e-14, 200);
        assert!(matches!(result, Err(UtilsError::NotBracketed { .. })));
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Fermi level from electron counting
//!
//! The Fermi level of a smeared band set is the chemical potential `mu` at
//! which `sum_k sum_n w_k f((e_kn - mu) / sigma)` equals the electron count.
//! The total is monotone in `mu`, so the root is bracketed by stepping
//! outwards from the band edges and then refined by bisection.

use log::trace;
use ndarray::{ArrayView1, ArrayView2, Axis};

use super::errors::{PreconditionViolation, Result, ShapeMismatch};
use super::smearing::fermi_dirac;
use crate::utils::optimize::bisect;

/// Absolute tolerance on the electron count
pub const ELECTRON_TOLERANCE: f64 = 1e-10;

/// Bracket width (eV) below which bisection stops
pub const ENERGY_TOLERANCE: f64 = 1e-13;

/// Maximum number of bisection steps
pub const MAX_BISECTIONS: usize = 200;

const MAX_BRACKET_STEPS: usize = 64;

/// Weighted number of electrons below `fermi_energy`
pub fn total_occupation(
    bands: ArrayView2<f64>,
    weights: ArrayView1<f64>,
    fermi_energy: f64,
    smearing: f64,
) -> f64 {
    bands
        .axis_iter(Axis(0))
        .zip(weights.iter())
        .map(|(row, &w)| {
            w * row
                .iter()
                .map(|&e| fermi_dirac(e, fermi_energy, smearing))
                .sum::<f64>()
        })
        .sum()
}

/// Find the Fermi level of a smeared band set
///
/// # Arguments
///
/// * `bands` - Eigenvalues of shape `(num_kpoints, num_bands)` in eV
/// * `weights` - k-point weights
/// * `num_electrons` - Target weighted occupation
/// * `smearing` - Fermi-Dirac width in eV, must be positive
///
/// # Returns
///
/// The chemical potential in eV
pub fn find_fermi_level(
    bands: ArrayView2<f64>,
    weights: ArrayView1<f64>,
    num_electrons: f64,
    smearing: f64,
) -> Result<f64> {
    if !(smearing > 0.0) || !smearing.is_finite() {
        return Err(PreconditionViolation::InvalidSmearing(smearing).into());
    }
    if weights.len() != bands.nrows() {
        return Err(ShapeMismatch::WeightsLength {
            weights: weights.len(),
            kpoints: bands.nrows(),
        }
        .into());
    }
    if bands.is_empty() {
        return Err(ShapeMismatch::Empty.into());
    }

    let capacity = weights.sum() * bands.ncols() as f64;
    if !(num_electrons > 0.0) || num_electrons >= capacity {
        return Err(PreconditionViolation::ElectronCountOutOfRange {
            electrons: num_electrons,
            capacity,
        }
        .into());
    }

    let excess = |mu: f64| total_occupation(bands, weights, mu, smearing) - num_electrons;

    let e_min = bands.iter().copied().fold(f64::INFINITY, f64::min);
    let e_max = bands.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut step = (10.0 * smearing).max(1.0);
    let mut lower = e_min - step;
    for _ in 0..MAX_BRACKET_STEPS {
        if excess(lower) <= 0.0 {
            break;
        }
        lower -= step;
        step *= 2.0;
    }

    let mut step = (10.0 * smearing).max(1.0);
    let mut upper = e_max + step;
    for _ in 0..MAX_BRACKET_STEPS {
        if excess(upper) >= 0.0 {
            break;
        }
        upper += step;
        step *= 2.0;
    }

    let fermi_level = bisect(
        excess,
        lower,
        upper,
        ELECTRON_TOLERANCE,
        ENERGY_TOLERANCE,
        MAX_BISECTIONS,
    )?;
    trace!(
        "Fermi level {} eV for {} electrons (bracket {}..{})",
        fermi_level,
        num_electrons,
        lower,
        upper
    );

    Ok(fermi_level)
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Occupation-weighted band distance
//!
//! Two normalized band sets on the same k-point mesh are compared state by
//! state. Each state is weighted by the geometric mean of its Fermi-Dirac
//! occupations in the two sets and by the inverse k-point weight. The
//! distance `eta` is the weighted RMS of the energy difference after the
//! optimal rigid shift; `max_diff` is the largest shifted difference among
//! strongly occupied states.

use log::debug;
use ndarray::{s, Array2, Axis};

use super::config::{DistanceConfig, TopBandTrim};
use super::errors::{PreconditionViolation, Result, ShapeMismatch};
use super::normalize::NormalizedBands;
use super::smearing::occupations;
use crate::utils::optimize::nelder_mead_1d;

/// Distance between two band sets in one comparison regime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceResult {
    /// Occupation-weighted RMS difference after the optimal shift
    pub eta: f64,
    /// Optimal rigid shift applied to `a - b`
    pub shift: f64,
    /// Largest shifted difference among strongly occupied states
    pub max_diff: f64,
}

impl DistanceResult {
    /// Same result with every field multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            eta: self.eta * factor,
            shift: self.shift * factor,
            max_diff: self.max_diff * factor,
        }
    }
}

/// Number of columns compared for two band sets of the given widths
fn common_band_count(a: usize, b: usize, trim: TopBandTrim) -> usize {
    let common = a.min(b);
    match trim {
        TopBandTrim::Always => common.saturating_sub(1),
        TopBandTrim::WhenCountsDiffer if a != b => common.saturating_sub(1),
        TopBandTrim::WhenCountsDiffer => common,
    }
}

fn check_weights(
    a: &NormalizedBands,
    b: &NormalizedBands,
    config: &DistanceConfig,
) -> Result<()> {
    for (index, (&wa, &wb)) in a.weights.iter().zip(b.weights.iter()).enumerate() {
        if (wa - wb).abs() > config.weight_atol + config.weight_rtol * wb.abs() {
            return Err(PreconditionViolation::WeightsMismatch { index, a: wa, b: wb }.into());
        }
    }
    for (index, &weight) in a.weights.iter().enumerate() {
        if weight <= 0.0 {
            return Err(PreconditionViolation::NonPositiveWeight { index, weight }.into());
        }
    }
    Ok(())
}

/// Compute the distance between two normalized band sets
///
/// Occupations of each set are evaluated against its own reference energy
/// raised by `fermi_shift`.
///
/// # Arguments
///
/// * `a` - First band set
/// * `b` - Second band set, on the same k-point mesh
/// * `fermi_shift` - Upward shift of the occupation window in eV
/// * `smearing_width` - Fermi-Dirac width in eV, zero for a sharp window
/// * `config` - Minimizer and threshold settings
///
/// # Returns
///
/// `eta`, the optimal `shift` and `max_diff`, in eV
pub fn distance(
    a: &NormalizedBands,
    b: &NormalizedBands,
    fermi_shift: f64,
    smearing_width: f64,
    config: &DistanceConfig,
) -> Result<DistanceResult> {
    if smearing_width < 0.0 || !smearing_width.is_finite() {
        return Err(PreconditionViolation::InvalidSmearing(smearing_width).into());
    }
    if !fermi_shift.is_finite() {
        return Err(PreconditionViolation::NonFiniteValue("fermi_shift").into());
    }
    if a.num_kpoints() != b.num_kpoints() {
        return Err(ShapeMismatch::KpointCount {
            a: a.num_kpoints(),
            b: b.num_kpoints(),
        }
        .into());
    }
    for bands in [a, b] {
        if bands.weights.len() != bands.num_kpoints() {
            return Err(ShapeMismatch::WeightsLength {
                weights: bands.weights.len(),
                kpoints: bands.num_kpoints(),
            }
            .into());
        }
    }
    check_weights(a, b, config)?;

    let num_bands = common_band_count(a.num_bands(), b.num_bands(), config.top_band_trim);
    if num_bands == 0 || a.num_kpoints() == 0 {
        return Err(ShapeMismatch::Empty.into());
    }
    let bands_a = a.bands.slice(s![.., ..num_bands]);
    let bands_b = b.bands.slice(s![.., ..num_bands]);

    let occ_a = occupations(bands_a, a.fermi_level + fermi_shift, smearing_width);
    let occ_b = occupations(bands_b, b.fermi_level + fermi_shift, smearing_width);
    let occ = (&occ_a * &occ_b).mapv(f64::sqrt);

    let diff = &bands_a - &bands_b;

    // 1/w plays the role of the k-point degeneracy
    let inverse_weights = a.weights.mapv(f64::recip).insert_axis(Axis(1));
    let weighted: Array2<f64> = &occ * &inverse_weights;
    let norm = weighted.sum();
    if !(norm > 0.0) {
        return Err(PreconditionViolation::ZeroOccupation {
            fermi_shift,
            smearing: smearing_width,
        }
        .into());
    }

    let objective = |shift: f64| -> f64 {
        let sum: f64 = weighted
            .iter()
            .zip(diff.iter())
            .map(|(&w, &d)| w * (d + shift).powi(2))
            .sum();
        (sum / norm).sqrt()
    };
    let minimum = nelder_mead_1d(objective, 0.0, &config.simplex)?;
    let shift = minimum.x;

    let threshold = config.occupation_threshold;
    let max_diff = occ
        .iter()
        .zip(diff.iter())
        .filter(|&(&o, _)| o > threshold)
        .map(|(_, &d)| (d + shift).abs())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        .ok_or(PreconditionViolation::EmptyOccupationMask { threshold })?;

    debug!(
        "Band distance over {} bands (fermi_shift = {} eV, smearing = {} eV): eta = {}, shift = {}, max_diff = {}",
        num_bands, fermi_shift, smearing_width, minimum.fun, shift, max_diff
    );

    Ok(DistanceResult {
        eta: minimum.fun,
        shift,
        max_diff,
    })
}

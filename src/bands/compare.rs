/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Pairwise band-structure comparison
//!
//! [`compare`] is the entry point used by the verification tools: it aligns
//! two datasets with possibly different electron counts and evaluates the
//! band distance in the valence regime and in the conduction-inclusive
//! regime. Results are reported in meV.

use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};

use super::config::{DistanceConfig, Protocol};
use super::dataset::BandDataset;
use super::distance::{distance, DistanceResult};
use super::errors::{PreconditionViolation, Result, ShapeMismatch};
use super::normalize::normalize;
use crate::utils::constants::EV_TO_MEV;

/// Unit tag of every energy in a [`PairwiseBandDistance`]
pub const DISTANCE_UNIT: &str = "meV";

/// Band distance between two datasets in both comparison regimes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseBandDistance {
    /// Valence-regime eta
    pub eta_v: f64,
    /// Valence-regime rigid shift
    pub shift_v: f64,
    /// Valence-regime max difference
    pub max_diff_v: f64,
    /// Conduction-regime eta
    pub eta_c: f64,
    /// Conduction-regime rigid shift
    pub shift_c: f64,
    /// Conduction-regime max difference
    pub max_diff_c: f64,
    /// Energy unit of all fields, always "meV"
    pub unit: String,
}

impl PairwiseBandDistance {
    /// Build from the two regime results given in eV
    pub fn from_ev(valence: DistanceResult, conduction: DistanceResult) -> Self {
        let valence = valence.scaled(EV_TO_MEV);
        let conduction = conduction.scaled(EV_TO_MEV);
        Self {
            eta_v: valence.eta,
            shift_v: valence.shift,
            max_diff_v: valence.max_diff,
            eta_c: conduction.eta,
            shift_c: conduction.shift,
            max_diff_c: conduction.max_diff,
            unit: DISTANCE_UNIT.to_string(),
        }
    }

    /// Valence-regime result in meV
    pub fn valence(&self) -> DistanceResult {
        DistanceResult {
            eta: self.eta_v,
            shift: self.shift_v,
            max_diff: self.max_diff_v,
        }
    }

    /// Conduction-regime result in meV
    pub fn conduction(&self) -> DistanceResult {
        DistanceResult {
            eta: self.eta_c,
            shift: self.shift_c,
            max_diff: self.max_diff_c,
        }
    }
}

/// Order two datasets so that the one with fewer electrons comes first
///
/// Datasets with equal electron counts are ordered by content, which makes
/// the result independent of argument order.
fn canonical_order<'a>(
    a: &'a BandDataset,
    b: &'a BandDataset,
) -> (&'a BandDataset, &'a BandDataset) {
    let ordering = a
        .number_of_electrons()
        .cmp(&b.number_of_electrons())
        .then_with(|| a.content_cmp(b));
    match ordering {
        Ordering::Greater => (b, a),
        _ => (a, b),
    }
}

/// Compare two band structures with the default numerical settings
///
/// # Arguments
///
/// * `dataset_a` - First band structure
/// * `dataset_b` - Second band structure, on the same k-point mesh
/// * `smearing_width` - Fermi-Dirac width in eV, must be positive
/// * `fermi_shift` - Extent of the conduction window above the reference
///   energy in eV
/// * `apply_smearing` - Smear the valence regime too, for metals
///
/// With `apply_smearing` the Fermi level is solved from
/// `sum_k w_k sum_n f = N` without a spin factor, so the k-point weights of
/// collinear data must sum to 2. Weights normalized to 1 leave room for only
/// half the electrons and give `ElectronCountOutOfRange`.
///
/// # Returns
///
/// Distances of both regimes in meV
pub fn compare(
    dataset_a: &BandDataset,
    dataset_b: &BandDataset,
    smearing_width: f64,
    fermi_shift: f64,
    apply_smearing: bool,
) -> Result<PairwiseBandDistance> {
    compare_with_config(
        dataset_a,
        dataset_b,
        smearing_width,
        fermi_shift,
        apply_smearing,
        &DistanceConfig::default(),
    )
}

/// Compare two band structures with the settings of a verification protocol
pub fn compare_with_protocol(
    dataset_a: &BandDataset,
    dataset_b: &BandDataset,
    protocol: &Protocol,
    config: &DistanceConfig,
) -> Result<PairwiseBandDistance> {
    compare_with_config(
        dataset_a,
        dataset_b,
        protocol.smearing_width(),
        protocol.fermi_shift,
        protocol.is_metal,
        config,
    )
}

/// Compare two band structures with explicit numerical settings
pub fn compare_with_config(
    dataset_a: &BandDataset,
    dataset_b: &BandDataset,
    smearing_width: f64,
    fermi_shift: f64,
    apply_smearing: bool,
    config: &DistanceConfig,
) -> Result<PairwiseBandDistance> {
    if !(smearing_width > 0.0) || !smearing_width.is_finite() {
        return Err(PreconditionViolation::InvalidSmearing(smearing_width).into());
    }
    if !fermi_shift.is_finite() {
        return Err(PreconditionViolation::NonFiniteValue("fermi_shift").into());
    }

    let (a, b) = canonical_order(dataset_a, dataset_b);
    let electrons_a = a.number_of_electrons();
    let electrons_b = b.number_of_electrons();

    let difference = electrons_b - electrons_a;
    if difference % 2 != 0 {
        return Err(PreconditionViolation::OddElectronDifference {
            fewer: electrons_a,
            more: electrons_b,
        }
        .into());
    }
    let start_band_b = (difference / 2) as usize;

    let bands_a = a.merged_band_count();
    let bands_b = b.merged_band_count();
    let available_b = bands_b
        .checked_sub(start_band_b)
        .filter(|&n| n > 0)
        .ok_or(ShapeMismatch::BandWindow {
            start: start_band_b,
            end: start_band_b + 1,
            available: bands_b,
        })?;
    let num_bands = bands_a.min(available_b);

    debug!(
        "Comparing {} and {} electrons: skipping {} bands of the larger set, keeping {}",
        electrons_a, electrons_b, start_band_b, num_bands
    );

    let normalized_a = normalize(a, 0, num_bands, electrons_a, smearing_width, apply_smearing)?;
    let normalized_b = normalize(
        b,
        start_band_b,
        num_bands,
        electrons_a,
        smearing_width,
        apply_smearing,
    )?;

    let smearing_v = if apply_smearing { smearing_width } else { 0.0 };
    let valence = distance(&normalized_a, &normalized_b, 0.0, smearing_v, config)?;
    let conduction = distance(
        &normalized_a,
        &normalized_b,
        fermi_shift,
        smearing_width,
        config,
    )?;

    let result = PairwiseBandDistance::from_ev(valence, conduction);
    debug!(
        "eta_v = {:.3} meV, max_diff_v = {:.3} meV, eta_c = {:.3} meV, max_diff_c = {:.3} meV",
        result.eta_v, result.max_diff_v, result.eta_c, result.max_diff_c
    );

    Ok(result)
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Band normalization
//!
//! Brings a dataset into the canonical form compared by the distance
//! calculator: spin channels merged into one ladder, energies referenced to
//! the dataset's own Fermi level, a window of `num_bands` columns starting at
//! `start_band_index`, and a recomputed reference energy for that window.

use log::trace;
use ndarray::{s, Array1, Array2, Axis};

use super::dataset::BandDataset;
use super::errors::{PreconditionViolation, Result, ShapeMismatch};
use super::fermi::find_fermi_level;

/// Band matrix aligned for comparison with another dataset
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBands {
    /// Eigenvalues of shape `(num_kpoints, num_bands)` in eV, relative to the
    /// original Fermi level
    pub bands: Array2<f64>,
    /// k-point weights
    pub weights: Array1<f64>,
    /// Reference energy of the retained window: the smeared Fermi level or
    /// the HOMO, in the same frame as `bands`
    pub fermi_level: f64,
}

impl NormalizedBands {
    /// Number of k-points
    pub fn num_kpoints(&self) -> usize {
        self.bands.nrows()
    }

    /// Number of retained bands
    pub fn num_bands(&self) -> usize {
        self.bands.ncols()
    }
}

/// Highest occupied level of an insulator
///
/// The HOMO is the maximum over k-points of band `num_electrons / 2 - 1`.
pub fn homo_energy(bands: &Array2<f64>, num_electrons: u64) -> Result<f64> {
    if num_electrons % 2 != 0 {
        return Err(PreconditionViolation::OddElectronCount(num_electrons).into());
    }
    let capacity = 2.0 * bands.ncols() as f64;
    if num_electrons == 0 || num_electrons as usize / 2 > bands.ncols() {
        return Err(PreconditionViolation::ElectronCountOutOfRange {
            electrons: num_electrons as f64,
            capacity,
        }
        .into());
    }

    let column = bands.index_axis(Axis(1), num_electrons as usize / 2 - 1);
    Ok(column.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Normalize a dataset for comparison
///
/// # Arguments
///
/// * `dataset` - Input band structure
/// * `start_band_index` - Number of lowest bands to skip
/// * `num_bands` - Number of bands to keep after the skipped ones
/// * `num_electrons` - Electrons held by the retained window
/// * `smearing_width` - Fermi-Dirac width in eV, used when `apply_smearing`
/// * `apply_smearing` - Solve for a smeared Fermi level instead of taking
///   the HOMO
///
/// # Returns
///
/// The retained window and its reference energy
pub fn normalize(
    dataset: &BandDataset,
    start_band_index: usize,
    num_bands: usize,
    num_electrons: u64,
    smearing_width: f64,
    apply_smearing: bool,
) -> Result<NormalizedBands> {
    let merged = dataset.bands().merged();
    let available = merged.ncols();
    let end = start_band_index
        .checked_add(num_bands)
        .filter(|&end| num_bands > 0 && end <= available)
        .ok_or(ShapeMismatch::BandWindow {
            start: start_band_index,
            end: start_band_index.saturating_add(num_bands),
            available,
        })?;

    let shifted = merged - dataset.fermi_level();
    let bands = shifted.slice(s![.., start_band_index..end]).to_owned();
    let weights = dataset.weights().clone();

    let fermi_level = if apply_smearing {
        find_fermi_level(
            bands.view(),
            weights.view(),
            num_electrons as f64,
            smearing_width,
        )?
    } else {
        homo_energy(&bands, num_electrons)?
    };

    trace!(
        "Normalized bands {}..{} of {}: reference {} eV ({})",
        start_band_index,
        end,
        available,
        fermi_level,
        if apply_smearing { "smeared" } else { "HOMO" }
    );

    Ok(NormalizedBands {
        bands,
        weights,
        fermi_level,
    })
}

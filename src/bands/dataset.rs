/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Band-structure datasets
//!
//! A [`BandDataset`] holds the eigenvalues of one band-structure calculation
//! together with the metadata the distance engine needs: k-point weights,
//! Fermi level and electron count. Datasets are validated on construction,
//! including when they are deserialized from the JSON layout produced by the
//! verification workflow.

use std::cmp::Ordering;

use ndarray::{s, Array1, Array2, Array3, Axis};
use serde::{Deserialize, Serialize};

use super::errors::{BandsError, PreconditionViolation, Result, ShapeMismatch};

/// Eigenvalues of a band-structure calculation in eV
#[derive(Debug, Clone, PartialEq)]
pub enum Eigenvalues {
    /// Shape `(num_kpoints, num_bands)`
    Collinear(Array2<f64>),
    /// Shape `(num_spin, num_kpoints, num_bands)`
    SpinPolarized(Array3<f64>),
}

impl Eigenvalues {
    /// Number of spin channels
    pub fn num_spin(&self) -> usize {
        match self {
            Eigenvalues::Collinear(_) => 1,
            Eigenvalues::SpinPolarized(bands) => bands.len_of(Axis(0)),
        }
    }

    /// Number of k-points
    pub fn num_kpoints(&self) -> usize {
        match self {
            Eigenvalues::Collinear(bands) => bands.nrows(),
            Eigenvalues::SpinPolarized(bands) => bands.len_of(Axis(1)),
        }
    }

    /// Number of bands along the last axis, per spin channel
    pub fn num_bands(&self) -> usize {
        match self {
            Eigenvalues::Collinear(bands) => bands.ncols(),
            Eigenvalues::SpinPolarized(bands) => bands.len_of(Axis(2)),
        }
    }

    /// Single band ladder of shape `(num_kpoints, num_spin * num_bands)`
    ///
    /// Spin channels are concatenated per k-point and each row is sorted in
    /// ascending energy, as if both channels were separate orbitals.
    /// Collinear eigenvalues are returned unchanged.
    pub fn merged(&self) -> Array2<f64> {
        match self {
            Eigenvalues::Collinear(bands) => bands.clone(),
            Eigenvalues::SpinPolarized(bands) => {
                let (nspin, nk, nb) = bands.dim();
                let mut merged = Array2::<f64>::zeros((nk, nspin * nb));
                for (ik, mut row) in merged.axis_iter_mut(Axis(0)).enumerate() {
                    let mut ladder: Vec<f64> = (0..nspin)
                        .flat_map(|is| bands.slice(s![is, ik, ..]).to_vec())
                        .collect();
                    ladder.sort_by(f64::total_cmp);
                    row.assign(&Array1::from(ladder));
                }
                merged
            }
        }
    }

    fn iter(&self) -> Box<dyn Iterator<Item = &f64> + '_> {
        match self {
            Eigenvalues::Collinear(bands) => Box::new(bands.iter()),
            Eigenvalues::SpinPolarized(bands) => Box::new(bands.iter()),
        }
    }
}

/// One band-structure calculation as consumed by the distance engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBandDataset", into = "RawBandDataset")]
pub struct BandDataset {
    bands: Eigenvalues,
    kpoints: Vec<[f64; 3]>,
    weights: Array1<f64>,
    fermi_level: f64,
    number_of_electrons: u64,
    number_of_bands: usize,
}

impl BandDataset {
    /// Create a validated dataset
    ///
    /// # Arguments
    ///
    /// * `bands` - Eigenvalues in eV
    /// * `weights` - Integration weight of every k-point, non-negative. The
    ///   smeared Fermi level counts `sum_k w_k sum_n f`, so the weights must
    ///   sum to the number of electrons a band can hold: 2 for collinear
    ///   data, 1 for spin-polarized data
    /// * `fermi_level` - Fermi level of the calculation in eV
    /// * `number_of_electrons` - Total electron count, must be integer-valued
    pub fn new(
        bands: Eigenvalues,
        weights: Array1<f64>,
        fermi_level: f64,
        number_of_electrons: f64,
    ) -> Result<Self> {
        let number_of_bands = bands.num_bands();
        Self::validated(
            bands,
            Vec::new(),
            weights,
            fermi_level,
            number_of_electrons,
            number_of_bands,
        )
    }

    /// Attach k-point coordinates, one per row of the eigenvalues
    pub fn with_kpoints(mut self, kpoints: Vec<[f64; 3]>) -> Result<Self> {
        check_kpoints(&kpoints, self.num_kpoints())?;
        self.kpoints = kpoints;
        Ok(self)
    }

    fn validated(
        bands: Eigenvalues,
        kpoints: Vec<[f64; 3]>,
        weights: Array1<f64>,
        fermi_level: f64,
        number_of_electrons: f64,
        number_of_bands: usize,
    ) -> Result<Self> {
        let nk = bands.num_kpoints();
        if nk == 0 || bands.num_bands() == 0 || bands.num_spin() == 0 {
            return Err(ShapeMismatch::Empty.into());
        }
        if bands.num_bands() != number_of_bands {
            return Err(ShapeMismatch::BandCount {
                declared: number_of_bands,
                actual: bands.num_bands(),
            }
            .into());
        }
        if weights.len() != nk {
            return Err(ShapeMismatch::WeightsLength {
                weights: weights.len(),
                kpoints: nk,
            }
            .into());
        }
        check_kpoints(&kpoints, nk)?;

        if !bands.iter().all(|e| e.is_finite()) {
            return Err(PreconditionViolation::NonFiniteValue("bands").into());
        }
        if !fermi_level.is_finite() {
            return Err(PreconditionViolation::NonFiniteValue("fermi_level").into());
        }
        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(PreconditionViolation::NonFiniteValue("weights").into());
            }
            if weight < 0.0 {
                return Err(PreconditionViolation::NegativeWeight { index, weight }.into());
            }
        }

        if !number_of_electrons.is_finite()
            || number_of_electrons < 0.0
            || number_of_electrons.fract() != 0.0
        {
            return Err(PreconditionViolation::NonIntegralElectrons(number_of_electrons).into());
        }

        Ok(Self {
            bands,
            kpoints,
            weights,
            fermi_level,
            number_of_electrons: number_of_electrons as u64,
            number_of_bands,
        })
    }

    /// Raw eigenvalues
    pub fn bands(&self) -> &Eigenvalues {
        &self.bands
    }

    /// k-point coordinates, empty when none were supplied
    pub fn kpoints(&self) -> &[[f64; 3]] {
        &self.kpoints
    }

    /// k-point weights
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    /// Fermi level in eV
    pub fn fermi_level(&self) -> f64 {
        self.fermi_level
    }

    /// Total number of electrons
    pub fn number_of_electrons(&self) -> u64 {
        self.number_of_electrons
    }

    /// Number of bands per spin channel
    pub fn number_of_bands(&self) -> usize {
        self.number_of_bands
    }

    /// Number of k-points
    pub fn num_kpoints(&self) -> usize {
        self.bands.num_kpoints()
    }

    /// Number of spin channels
    pub fn num_spin(&self) -> usize {
        self.bands.num_spin()
    }

    /// Number of bands in the spin-merged ladder
    pub fn merged_band_count(&self) -> usize {
        self.num_spin() * self.number_of_bands
    }

    /// Total order over the dataset contents, used to break ties between
    /// datasets with equal electron counts
    ///
    /// Eigenvalues are compared relative to each dataset's Fermi level, so
    /// the order does not change when a constant is added to all energies.
    pub(crate) fn content_cmp(&self, other: &Self) -> Ordering {
        self.num_spin()
            .cmp(&other.num_spin())
            .then(self.number_of_bands.cmp(&other.number_of_bands))
            .then(self.num_kpoints().cmp(&other.num_kpoints()))
            .then_with(|| {
                cmp_values(
                    self.bands.iter().map(|e| e - self.fermi_level),
                    other.bands.iter().map(|e| e - other.fermi_level),
                )
            })
            .then_with(|| {
                cmp_values(
                    self.weights.iter().copied(),
                    other.weights.iter().copied(),
                )
            })
            .then(self.fermi_level.total_cmp(&other.fermi_level))
    }
}

fn cmp_values(a: impl Iterator<Item = f64>, b: impl Iterator<Item = f64>) -> Ordering {
    a.zip(b)
        .map(|(x, y)| x.total_cmp(&y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn check_kpoints(kpoints: &[[f64; 3]], nk: usize) -> Result<()> {
    if !kpoints.is_empty() && kpoints.len() != nk {
        return Err(ShapeMismatch::KpointsLength {
            coordinates: kpoints.len(),
            kpoints: nk,
        }
        .into());
    }
    Ok(())
}

/// Nested-list eigenvalues as they appear in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEigenvalues {
    SpinPolarized(Vec<Vec<Vec<f64>>>),
    Collinear(Vec<Vec<f64>>),
}

/// Serialized layout of a [`BandDataset`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBandDataset {
    bands: RawEigenvalues,
    #[serde(default)]
    kpoints: Vec<[f64; 3]>,
    weights: Vec<f64>,
    fermi_level: f64,
    number_of_electrons: f64,
    #[serde(default)]
    number_of_bands: Option<usize>,
}

fn rows_to_array(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let expected = rows.first().map_or(0, Vec::len);
    let nrows = rows.len();
    let mut flat = Vec::with_capacity(nrows * expected);
    for (row, values) in rows.into_iter().enumerate() {
        if values.len() != expected {
            return Err(ShapeMismatch::Ragged {
                row,
                found: values.len(),
                expected,
            }
            .into());
        }
        flat.extend(values);
    }
    Array2::from_shape_vec((nrows, expected), flat).map_err(|_| ShapeMismatch::Empty.into())
}

impl TryFrom<RawEigenvalues> for Eigenvalues {
    type Error = BandsError;

    fn try_from(raw: RawEigenvalues) -> Result<Self> {
        match raw {
            RawEigenvalues::Collinear(rows) => Ok(Eigenvalues::Collinear(rows_to_array(rows)?)),
            RawEigenvalues::SpinPolarized(channels) => {
                let nspin = channels.len();
                let mut blocks = Vec::with_capacity(nspin);
                for rows in channels {
                    blocks.push(rows_to_array(rows)?);
                }
                let (nk, nb) = blocks.first().map_or((0, 0), |b| b.dim());
                let mut bands = Array3::<f64>::zeros((nspin, nk, nb));
                for (is, block) in blocks.iter().enumerate() {
                    if block.dim() != (nk, nb) {
                        return Err(ShapeMismatch::Ragged {
                            row: is,
                            found: block.len(),
                            expected: nk * nb,
                        }
                        .into());
                    }
                    bands.index_axis_mut(Axis(0), is).assign(block);
                }
                Ok(Eigenvalues::SpinPolarized(bands))
            }
        }
    }
}

impl TryFrom<RawBandDataset> for BandDataset {
    type Error = BandsError;

    fn try_from(raw: RawBandDataset) -> Result<Self> {
        let bands = Eigenvalues::try_from(raw.bands)?;
        let number_of_bands = raw.number_of_bands.unwrap_or_else(|| bands.num_bands());
        Self::validated(
            bands,
            raw.kpoints,
            Array1::from(raw.weights),
            raw.fermi_level,
            raw.number_of_electrons,
            number_of_bands,
        )
    }
}

impl From<BandDataset> for RawBandDataset {
    fn from(dataset: BandDataset) -> Self {
        let bands = match &dataset.bands {
            Eigenvalues::Collinear(bands) => RawEigenvalues::Collinear(
                bands.outer_iter().map(|row| row.to_vec()).collect(),
            ),
            Eigenvalues::SpinPolarized(bands) => RawEigenvalues::SpinPolarized(
                bands
                    .outer_iter()
                    .map(|channel| channel.outer_iter().map(|row| row.to_vec()).collect())
                    .collect(),
            ),
        };
        Self {
            bands,
            kpoints: dataset.kpoints,
            weights: dataset.weights.to_vec(),
            fermi_level: dataset.fermi_level,
            number_of_electrons: dataset.number_of_electrons as f64,
            number_of_bands: Some(dataset.number_of_bands),
        }
    }
}

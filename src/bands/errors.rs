/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for band-distance calculations

use thiserror::Error;

use crate::utils::errors::UtilsError;

/// Result type for band-distance calculations
pub type Result<T> = std::result::Result<T, BandsError>;

/// Error type for band-distance operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandsError {
    /// An input violates a documented precondition
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    /// Array shapes of the inputs are inconsistent
    #[error("Shape mismatch: {0}")]
    Shape(#[from] ShapeMismatch),

    /// Propagation of error from the numerical utilities
    #[error("Numerical error: {0}")]
    Utils(#[from] UtilsError),
}

/// Input values that the algorithm refuses to work with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionViolation {
    /// The HOMO lookup needs an even number of electrons
    #[error("{0} electrons is odd, the HOMO of an insulator needs an even count")]
    OddElectronCount(u64),

    /// The band offset between two datasets must be a whole number of bands
    #[error("electron counts {fewer} and {more} differ by an odd number")]
    OddElectronDifference { fewer: u64, more: u64 },

    /// The two datasets were computed on different k-point meshes
    #[error("k-point weights differ at index {index}: {a} vs {b}")]
    WeightsMismatch { index: usize, a: f64, b: f64 },

    /// A k-point weight is used as a divisor and must be strictly positive
    #[error("k-point weight at index {index} is {weight}, must be positive")]
    NonPositiveWeight { index: usize, weight: f64 },

    /// No state is occupied strongly enough to take part in max_diff
    #[error("no state has combined occupation above {threshold}")]
    EmptyOccupationMask { threshold: f64 },

    /// The occupation-weighted normalisation of eta vanishes
    #[error("total occupation weight is zero (fermi_shift = {fermi_shift}, smearing = {smearing})")]
    ZeroOccupation { fermi_shift: f64, smearing: f64 },

    /// The requested electron count cannot be held by the retained bands
    #[error("{electrons} electrons cannot be placed in bands holding at most {capacity}")]
    ElectronCountOutOfRange { electrons: f64, capacity: f64 },

    /// The smearing width is negative, or zero where smearing is required
    #[error("smearing width {0} eV is not valid here")]
    InvalidSmearing(f64),

    /// The electron count of a dataset is not a whole number
    #[error("number of electrons {0} is not a non-negative integer")]
    NonIntegralElectrons(f64),

    /// An eigenvalue, weight or Fermi level is NaN or infinite
    #[error("non-finite value in {0}")]
    NonFiniteValue(&'static str),

    /// A k-point weight is negative
    #[error("k-point weight at index {index} is negative: {weight}")]
    NegativeWeight { index: usize, weight: f64 },

    /// The same label appears twice in a comparison set
    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),
}

/// Inconsistent array dimensions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeMismatch {
    /// The two datasets have different numbers of k-points
    #[error("different number of k-points: {a} vs {b}")]
    KpointCount { a: usize, b: usize },

    /// The requested band window exceeds the available columns
    #[error("band window {start}..{end} exceeds the {available} available bands")]
    BandWindow {
        start: usize,
        end: usize,
        available: usize,
    },

    /// The weights do not match the number of k-points
    #[error("{weights} weights for {kpoints} k-points")]
    WeightsLength { weights: usize, kpoints: usize },

    /// The k-point coordinates do not match the eigenvalue array
    #[error("{coordinates} k-point coordinates for {kpoints} k-points")]
    KpointsLength { coordinates: usize, kpoints: usize },

    /// The declared band count differs from the last axis of the eigenvalues
    #[error("declared {declared} bands but eigenvalues have {actual}")]
    BandCount { declared: usize, actual: usize },

    /// Ragged nested arrays
    #[error("ragged eigenvalue array: row {row} has {found} entries, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// No k-point or no band is left to work with
    #[error("eigenvalue array is empty")]
    Empty,
}

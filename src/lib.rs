/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # sssp-bands
//!
//! Band-structure distance engine for pseudopotential verification.
//!
//! Given the band structures of one material computed with two different
//! pseudopotentials, this crate aligns them (electron counts, spin channels,
//! Fermi levels) and measures how far apart they are: the
//! occupation-weighted RMS distance `eta` after an optimal rigid shift and
//! the maximum difference over strongly occupied states, both for the
//! valence bands alone and for a window reaching into the conduction bands.
//!
//! ```
//! use ndarray::array;
//! use sssp_bands::{compare, BandDataset, Eigenvalues};
//!
//! let dataset = BandDataset::new(
//!     Eigenvalues::Collinear(array![[-5.0, -3.0, -1.0, 2.0]]),
//!     array![1.0],
//!     0.0,
//!     8.0,
//! )?;
//! let result = compare(&dataset, &dataset, 0.6, 10.0, false)?;
//! assert_eq!(result.eta_v, 0.0);
//! assert_eq!(result.unit, "meV");
//! # Ok::<(), sssp_bands::BandsError>(())
//! ```

pub mod bands;
pub mod utils;

pub use bands::{
    compare, compare_with_config, compare_with_protocol, distance, normalize, BandDataset,
    BandsError, Chessboard, DistanceCache, DistanceConfig, DistanceResult, Eigenvalues,
    NormalizedBands, PairwiseBandDistance, Protocol, Result,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

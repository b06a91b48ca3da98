/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Band-structure distance module
//!
//! This module compares the electronic band structures obtained with two
//! pseudopotentials. The pipeline is:
//!
//! 1. [`normalize`] each dataset: merge spin channels, reference energies to
//!    the Fermi level, skip semicore bands of the dataset with more
//!    electrons and recompute the reference energy (HOMO or smeared Fermi
//!    level) of the retained window.
//! 2. [`distance`] the two normalized sets with occupation weighting and an
//!    optimal rigid shift, once for the valence regime and once with the
//!    occupation window raised into the conduction bands.
//! 3. Report both regimes in meV as a [`PairwiseBandDistance`].
//!
//! [`compare`] runs the whole pipeline; [`Chessboard`] runs it over every
//! pair of a labelled set.

pub mod chessboard;
pub mod compare;
pub mod config;
pub mod dataset;
pub mod distance;
pub mod errors;
pub mod fermi;
pub mod normalize;
pub mod smearing;

pub use chessboard::{Chessboard, DistanceCache, PairKey};
pub use compare::{
    compare, compare_with_config, compare_with_protocol, PairwiseBandDistance, DISTANCE_UNIT,
};
pub use config::{DistanceConfig, Protocol, TopBandTrim, NONMETAL_ELEMENTS};
pub use dataset::{BandDataset, Eigenvalues};
pub use distance::{distance, DistanceResult};
pub use errors::{BandsError, PreconditionViolation, Result, ShapeMismatch};
pub use fermi::{find_fermi_level, total_occupation};
pub use normalize::{homo_energy, normalize, NormalizedBands};
pub use smearing::{fermi_dirac, heaviside, occupations};

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions for band-distance calculations
//!
//! This module provides unit conversions, physical constants and the small
//! numerical routines (1-D minimization, bracketed root finding) used
//! throughout the crate.

pub mod constants;
pub mod conversions;
pub mod errors;
pub mod optimize;

pub use conversions::{ev_to_mev, mev_to_ev, ry_to_ev};
pub use errors::{Result, UtilsError};
pub use optimize::{bisect, nelder_mead_1d, Minimum, SimplexOptions};

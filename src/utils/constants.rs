/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Physical constants used in band-distance calculations

/// Rydberg energy in eV (CODATA 2018)
pub const RY_TO_EV: f64 = 13.6056980659;

/// Conversion from eV to meV
pub const EV_TO_MEV: f64 = 1000.0;

/// Largest argument for which `f64::exp` stays finite, `ln(f64::MAX)`
pub const EXP_ARG_LIMIT: f64 = 709.782712893384;

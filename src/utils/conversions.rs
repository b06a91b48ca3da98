/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Unit conversion utilities

use super::constants;

/// Convert energy from Rydberg to eV
pub fn ry_to_ev(ry: f64) -> f64 {
    ry * constants::RY_TO_EV
}

/// Convert energy from eV to meV
pub fn ev_to_mev(ev: f64) -> f64 {
    ev * constants::EV_TO_MEV
}

/// Convert energy from meV to eV
pub fn mev_to_ev(mev: f64) -> f64 {
    mev / constants::EV_TO_MEV
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Fermi-Dirac occupations
//!
//! Occupations are evaluated as `1 / (exp((E - mu) / sigma) + 1)`. When the
//! width is zero, or the exponent would overflow, the zero-temperature step
//! function `H(mu - E)` (with `H(0) = 1`) is returned instead so that no
//! `inf` or `nan` ever reaches the caller.

use ndarray::{Array2, ArrayView2};

use crate::utils::constants::EXP_ARG_LIMIT;

/// Zero-temperature occupation: 1 at or below `fermi_energy`, 0 above
pub fn heaviside(energy: f64, fermi_energy: f64) -> f64 {
    if energy <= fermi_energy {
        1.0
    } else {
        0.0
    }
}

/// Fermi-Dirac occupation of a state at `energy`
///
/// # Arguments
///
/// * `energy` - State energy in eV
/// * `fermi_energy` - Chemical potential in eV
/// * `smearing` - Width in eV, zero selects the step function
pub fn fermi_dirac(energy: f64, fermi_energy: f64, smearing: f64) -> f64 {
    if smearing <= 0.0 {
        return heaviside(energy, fermi_energy);
    }

    let x = (energy - fermi_energy) / smearing;
    if x.abs() > EXP_ARG_LIMIT || !x.is_finite() {
        return heaviside(energy, fermi_energy);
    }

    1.0 / (x.exp() + 1.0)
}

/// Fermi-Dirac occupation of every entry of a band matrix
pub fn occupations(bands: ArrayView2<f64>, fermi_energy: f64, smearing: f64) -> Array2<f64> {
    bands.mapv(|e| fermi_dirac(e, fermi_energy, smearing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_fermi_dirac_values() {
        assert_relative_eq!(fermi_dirac(0.0, 0.0, 0.1), 0.5, epsilon = 1e-15);
        assert_relative_eq!(
            fermi_dirac(0.1, 0.0, 0.1),
            1.0 / (1f64.exp() + 1.0),
            epsilon = 1e-15
        );
        // f(mu + d) + f(mu - d) = 1
        let sum = fermi_dirac(1.3, 1.0, 0.2) + fermi_dirac(0.7, 1.0, 0.2);
        assert_relative_eq!(sum, 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_smearing_is_step() {
        assert_eq!(fermi_dirac(-0.1, 0.0, 0.0), 1.0);
        assert_eq!(fermi_dirac(0.0, 0.0, 0.0), 1.0);
        assert_eq!(fermi_dirac(0.1, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_overflow_guard() {
        // exp(1e4) overflows, the step limit is used instead
        assert_eq!(fermi_dirac(1000.0, 0.0, 0.1), 0.0);
        assert_eq!(fermi_dirac(-1000.0, 0.0, 0.1), 1.0);
        assert!(fermi_dirac(1.0, 0.0, 1e-300).is_finite());
    }

    #[test]
    fn test_occupations_matrix() {
        let occ = occupations(array![[-1.0, 0.0, 1.0]].view(), 0.0, 0.0);
        assert_eq!(occ, array![[1.0, 1.0, 0.0]]);
    }
}

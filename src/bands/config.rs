/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Configuration for band-distance calculations

use serde::{Deserialize, Serialize};

use crate::utils::conversions::ry_to_ev;
use crate::utils::optimize::SimplexOptions;

/// Gaussian smearing of the verification protocol in Ry
pub const DEFAULT_SMEARING_RY: f64 = 0.045;

/// Upward shift of the conduction window in eV
pub const DEFAULT_FERMI_SHIFT: f64 = 10.0;

/// Elements whose elemental solids are treated as insulators or
/// semiconductors, with no smearing in the valence regime
pub const NONMETAL_ELEMENTS: &[&str] = &[
    "H", "He", "B", "C", "N", "O", "F", "Ne", "Si", "P", "S", "Cl", "Ar", "Se", "Br", "Kr", "Te",
    "I", "Xe", "Rn",
];

/// Policy for dropping the highest band before comparing two band sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopBandTrim {
    /// Drop the highest common band only when the column counts differ
    WhenCountsDiffer,
    /// Always drop the highest common band
    Always,
}

/// Numerical settings of the distance calculator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Settings for the rigid-shift minimization
    pub simplex: SimplexOptions,
    /// States with combined occupation above this value enter `max_diff`
    pub occupation_threshold: f64,
    /// Handling of the highest band when the two sets differ in size
    pub top_band_trim: TopBandTrim,
    /// Relative tolerance when checking that two weight sets agree
    pub weight_rtol: f64,
    /// Absolute tolerance when checking that two weight sets agree
    pub weight_atol: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            simplex: SimplexOptions::default(),
            occupation_threshold: 0.5,
            top_band_trim: TopBandTrim::WhenCountsDiffer,
            weight_rtol: 1e-5,
            weight_atol: 1e-8,
        }
    }
}

/// Parameters of a band-distance comparison as used by the verification
/// protocol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    /// Smearing width in Ry
    pub smearing_ry: f64,
    /// Upward shift of the conduction window in eV
    pub fermi_shift: f64,
    /// Whether the element is a metal, which enables smearing in the
    /// valence regime
    pub is_metal: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            smearing_ry: DEFAULT_SMEARING_RY,
            fermi_shift: DEFAULT_FERMI_SHIFT,
            is_metal: false,
        }
    }
}

impl Protocol {
    /// Default protocol for a metallic or non-metallic element
    pub fn new(is_metal: bool) -> Self {
        Self {
            is_metal,
            ..Self::default()
        }
    }

    /// Default protocol for an element given by its chemical symbol
    ///
    /// Every element outside [`NONMETAL_ELEMENTS`] is treated as a metal.
    pub fn for_element(symbol: &str) -> Self {
        Self::new(!NONMETAL_ELEMENTS.contains(&symbol.trim()))
    }

    /// Smearing width in eV
    pub fn smearing_width(&self) -> f64 {
        ry_to_ev(self.smearing_ry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_protocol_defaults() {
        let protocol = Protocol::new(true);
        assert!(protocol.is_metal);
        assert_eq!(protocol.fermi_shift, 10.0);
        assert_relative_eq!(protocol.smearing_width(), 0.6122564129655, epsilon = 1e-12);
    }

    #[test]
    fn test_protocol_for_element() {
        assert!(!Protocol::for_element("Si").is_metal);
        assert!(!Protocol::for_element("O").is_metal);
        assert!(Protocol::for_element("Fe").is_metal);
        assert!(Protocol::for_element("Sn").is_metal);
        assert_eq!(Protocol::for_element("Al"), Protocol::new(true));
    }

    #[test]
    fn test_config_defaults() {
        let config = DistanceConfig::default();
        assert_eq!(config.occupation_threshold, 0.5);
        assert_eq!(config.top_band_trim, TopBandTrim::WhenCountsDiffer);
        assert_eq!(config.simplex.max_iterations, 200);
    }
}

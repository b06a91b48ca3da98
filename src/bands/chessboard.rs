/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! All-pairs band distances
//!
//! The verification tools compare every pseudopotential of an element with
//! every other one and show the result as a "chessboard": the upper triangle
//! holds `eta`, the lower triangle holds `max_diff`. Pairs are independent,
//! so missing ones are computed in parallel. Results already known to the
//! caller's [`DistanceCache`] are reused.

use std::collections::{HashMap, HashSet};

use log::debug;
use ndarray::Array2;
use rayon::prelude::*;

use super::compare::{compare_with_protocol, PairwiseBandDistance};
use super::config::{DistanceConfig, Protocol};
use super::dataset::BandDataset;
use super::errors::{PreconditionViolation, Result};

/// Unordered pair of dataset labels
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    /// Key for the pair `{a, b}`, identical for `{b, a}`
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Labels in sorted order
    pub fn labels(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }
}

/// Caller-owned store of pairwise results
///
/// Entries are only meaningful for one protocol; use a separate cache per
/// protocol.
#[derive(Debug, Clone, Default)]
pub struct DistanceCache {
    entries: HashMap<PairKey, PairwiseBandDistance>,
}

impl DistanceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for the pair `{a, b}`
    pub fn get(&self, a: &str, b: &str) -> Option<&PairwiseBandDistance> {
        self.entries.get(&PairKey::new(a, b))
    }

    /// Store the result for the pair `{a, b}`, returning any previous entry
    pub fn insert(
        &mut self,
        a: &str,
        b: &str,
        distance: PairwiseBandDistance,
    ) -> Option<PairwiseBandDistance> {
        self.entries.insert(PairKey::new(a, b), distance)
    }

    /// Whether the pair `{a, b}` is cached
    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.entries.contains_key(&PairKey::new(a, b))
    }

    /// Number of cached pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// All-pairs band distances of a labelled set of datasets, in meV
#[derive(Debug, Clone, PartialEq)]
pub struct Chessboard {
    /// Dataset labels, in input order
    pub labels: Vec<String>,
    /// Valence regime: `eta_v` above the diagonal, `max_diff_v` below
    pub valence: Array2<f64>,
    /// Conduction regime: `eta_c` above the diagonal, `max_diff_c` below
    pub conduction: Array2<f64>,
}

impl Chessboard {
    /// Compute the chessboard of `entries`
    ///
    /// # Arguments
    ///
    /// * `entries` - Labelled datasets, labels must be unique
    /// * `protocol` - Smearing, conduction window and metallicity
    /// * `config` - Numerical settings of the distance calculator
    /// * `cache` - Results of earlier calls, updated with new pairs
    pub fn compute<S>(
        entries: &[(S, BandDataset)],
        protocol: &Protocol,
        config: &DistanceConfig,
        cache: &mut DistanceCache,
    ) -> Result<Self>
    where
        S: AsRef<str> + Sync,
    {
        let labels: Vec<String> = entries
            .iter()
            .map(|(label, _)| label.as_ref().to_string())
            .collect();
        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(PreconditionViolation::DuplicateLabel(label.clone()).into());
            }
        }

        let n = entries.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();
        let missing: Vec<(usize, usize)> = pairs
            .iter()
            .copied()
            .filter(|&(i, j)| !cache.contains(&labels[i], &labels[j]))
            .collect();

        debug!(
            "Chessboard of {} datasets: {} pairs, {} from cache",
            n,
            pairs.len(),
            pairs.len() - missing.len()
        );

        let computed: Vec<(usize, usize, PairwiseBandDistance)> = missing
            .par_iter()
            .map(|&(i, j)| {
                compare_with_protocol(&entries[i].1, &entries[j].1, protocol, config)
                    .map(|distance| (i, j, distance))
            })
            .collect::<Result<_>>()?;

        for (i, j, distance) in computed {
            cache.insert(&labels[i], &labels[j], distance);
        }

        let mut valence = Array2::<f64>::zeros((n, n));
        let mut conduction = Array2::<f64>::zeros((n, n));
        for &(i, j) in &pairs {
            if let Some(distance) = cache.get(&labels[i], &labels[j]) {
                valence[[i, j]] = distance.eta_v;
                valence[[j, i]] = distance.max_diff_v;
                conduction[[i, j]] = distance.eta_c;
                conduction[[j, i]] = distance.max_diff_c;
            }
        }

        Ok(Self {
            labels,
            valence,
            conduction,
        })
    }

    /// Index of `label`
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new("Si.pbe", "Si.pz"), PairKey::new("Si.pz", "Si.pbe"));
        assert_eq!(PairKey::new("b", "a").labels(), ("a", "b"));
    }

    #[test]
    fn test_cache_roundtrip() {
        let mut cache = DistanceCache::new();
        assert!(cache.is_empty());

        let distance = PairwiseBandDistance {
            eta_v: 1.0,
            shift_v: 0.0,
            max_diff_v: 2.0,
            eta_c: 3.0,
            shift_c: 0.0,
            max_diff_c: 4.0,
            unit: "meV".to_string(),
        };
        assert!(cache.insert("x", "y", distance.clone()).is_none());
        assert_eq!(cache.get("y", "x"), Some(&distance));
        assert!(cache.contains("x", "y"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.get("x", "y").is_none());
    }
}

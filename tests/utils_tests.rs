/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::{assert_abs_diff_eq, assert_relative_eq};
use sssp_bands::utils::{
    bisect, constants, ev_to_mev, mev_to_ev, nelder_mead_1d, ry_to_ev, SimplexOptions, UtilsError,
};

#[test]
fn test_unit_conversions() {
    // Test Rydberg -> eV conversion
    let ry_value = 0.045;
    assert_relative_eq!(
        ry_to_ev(ry_value),
        ry_value * constants::RY_TO_EV,
        epsilon = 1e-12
    );

    // Test eV <-> meV conversions
    let ev_value = 0.0421;
    let mev_value = ev_to_mev(ev_value);
    let converted_back = mev_to_ev(mev_value);

    assert_relative_eq!(mev_value, 42.1, epsilon = 1e-10);
    assert_relative_eq!(converted_back, ev_value, epsilon = 1e-12);
}

#[test]
fn test_minimize_weighted_rms() {
    // Weighted RMS of a set of differences is minimized by minus their
    // weighted mean
    let diffs = [0.12, -0.05, 0.30, 0.07];
    let weights = [1.0, 2.0, 0.5, 4.0];
    let norm: f64 = weights.iter().sum();
    let mean: f64 = diffs.iter().zip(&weights).map(|(d, w)| d * w).sum::<f64>() / norm;

    let rms = |shift: f64| {
        let sum: f64 = diffs
            .iter()
            .zip(&weights)
            .map(|(d, w)| w * (d + shift).powi(2))
            .sum();
        (sum / norm).sqrt()
    };

    let minimum = nelder_mead_1d(rms, 0.0, &SimplexOptions::default()).unwrap();
    assert!(minimum.converged);
    assert_abs_diff_eq!(minimum.x, -mean, epsilon = 1e-3);
    assert!(minimum.fun <= rms(0.0));
    assert!(minimum.evaluations <= SimplexOptions::default().max_evaluations);
}

#[test]
fn test_minimize_from_nonzero_start() {
    let minimum = nelder_mead_1d(|x| (x + 2.0).powi(2), 4.0, &SimplexOptions::default()).unwrap();
    assert!(minimum.converged);
    assert_abs_diff_eq!(minimum.x, -2.0, epsilon = 1e-2);
}

#[test]
fn test_minimize_rejects_infinite_objective() {
    let result = nelder_mead_1d(|x| 1.0 / x, 0.0, &SimplexOptions::default());
    assert!(matches!(
        result,
        Err(UtilsError::NonFiniteObjective { x, .. }) if x == 0.0
    ));
}

#[test]
fn test_bisect_monotone_step() {
    // Smooth step function similar to an electron count
    let count = |mu: f64| 2.0 / (1.0 + (-(mu - 0.3) / 0.05).exp()) - 1.0;
    let root = bisect(count, -5.0, 5.0, 1e-12, 1e-13, 200).unwrap();
    assert_abs_diff_eq!(root, 0.3, epsilon = 1e-9);

    assert!(bisect(count, 1.0, 5.0, 1e-12, 1e-13, 200).is_err());
}

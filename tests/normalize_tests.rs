/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_abs_diff_eq;
use ndarray::{array, Array3};
use sssp_bands::bands::errors::{PreconditionViolation, ShapeMismatch};
use sssp_bands::bands::{homo_energy, total_occupation};
use sssp_bands::{compare, normalize, BandDataset, BandsError, Eigenvalues};

fn spin_polarized() -> BandDataset {
    let mut bands = Array3::<f64>::zeros((2, 2, 3));
    bands
        .index_axis_mut(ndarray::Axis(0), 0)
        .assign(&array![[-5.0, -1.0, 2.0], [-4.0, -0.5, 3.0]]);
    bands
        .index_axis_mut(ndarray::Axis(0), 1)
        .assign(&array![[-4.8, -0.8, 2.5], [-4.2, -0.6, 2.8]]);
    BandDataset::new(Eigenvalues::SpinPolarized(bands), array![0.5, 0.5], 0.2, 4.0).unwrap()
}

#[test]
fn test_spin_merge_matches_presorted_ladder() {
    let polarized = spin_polarized();
    let collinear = BandDataset::new(
        Eigenvalues::Collinear(array![
            [-5.0, -4.8, -1.0, -0.8, 2.0, 2.5],
            [-4.2, -4.0, -0.6, -0.5, 2.8, 3.0]
        ]),
        array![0.5, 0.5],
        0.2,
        4.0,
    )
    .unwrap();

    assert_eq!(polarized.number_of_bands(), 3);
    assert_eq!(polarized.merged_band_count(), 6);

    for apply_smearing in [false, true] {
        let a = normalize(&polarized, 0, 6, 4, 0.3, apply_smearing).unwrap();
        let b = normalize(&collinear, 0, 6, 4, 0.3, apply_smearing).unwrap();
        assert_eq!(a, b);
    }

    // HOMO of the merged ladder is column 1, relative to the Fermi level
    let normalized = normalize(&polarized, 0, 6, 4, 0.3, false).unwrap();
    assert_abs_diff_eq!(normalized.fermi_level, -4.0 - 0.2, epsilon = 1e-12);

    let result = compare(&polarized, &collinear, 0.3, 5.0, false).unwrap();
    assert_eq!(result.eta_v, 0.0);
    assert_eq!(result.eta_c, 0.0);
}

#[test]
fn test_metal_fermi_level_counts_electrons() {
    let dataset = BandDataset::new(
        Eigenvalues::Collinear(array![[-1.0, 0.8], [-0.6, 1.2]]),
        array![0.5, 0.5],
        0.0,
        1.0,
    )
    .unwrap();

    let normalized = normalize(&dataset, 0, 2, 1, 0.6, true).unwrap();
    let total = total_occupation(
        normalized.bands.view(),
        normalized.weights.view(),
        normalized.fermi_level,
        0.6,
    );
    assert_abs_diff_eq!(total, 1.0, epsilon = 1e-6);

    let result = compare(&dataset, &dataset, 0.6, 10.0, true).unwrap();
    assert_eq!(result.eta_v, 0.0);
    assert_eq!(result.max_diff_v, 0.0);
    assert_eq!(result.eta_c, 0.0);
    assert_eq!(result.max_diff_c, 0.0);
}

#[test]
fn test_homo_of_reference_example() {
    let bands = array![[-5.0, -3.0, -1.0, 2.0]];
    assert_eq!(homo_energy(&bands, 8).unwrap(), 2.0);
    assert_eq!(homo_energy(&bands, 6).unwrap(), -1.0);
    assert!(homo_energy(&bands, 10).is_err());
}

#[test]
fn test_window_outside_bands() {
    let err = normalize(&spin_polarized(), 4, 3, 4, 0.3, false).unwrap_err();
    assert_eq!(
        err,
        BandsError::Shape(ShapeMismatch::BandWindow {
            start: 4,
            end: 7,
            available: 6
        })
    );
}

#[test]
fn test_dataset_from_json() -> anyhow::Result<()> {
    let json = r#"{
        "bands": [[-5.0, -3.0, -1.0, 2.0], [-4.5, -2.5, -1.5, 2.5]],
        "kpoints": [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
        "weights": [0.5, 0.5],
        "fermi_level": 0.25,
        "number_of_electrons": 4
    }"#;
    let dataset: BandDataset = serde_json::from_str(json)?;
    assert_eq!(dataset.num_kpoints(), 2);
    assert_eq!(dataset.number_of_bands(), 4);
    assert_eq!(dataset.number_of_electrons(), 4);
    assert_eq!(dataset.kpoints()[1], [0.5, 0.0, 0.0]);
    assert_eq!(dataset.num_spin(), 1);

    let restored: BandDataset = serde_json::from_str(&serde_json::to_string(&dataset)?)?;
    assert_eq!(restored, dataset);
    Ok(())
}

#[test]
fn test_spin_polarized_dataset_from_json() -> anyhow::Result<()> {
    let json = r#"{
        "bands": [
            [[-5.0, -1.0, 2.0], [-4.0, -0.5, 3.0]],
            [[-4.8, -0.8, 2.5], [-4.2, -0.6, 2.8]]
        ],
        "weights": [0.5, 0.5],
        "fermi_level": 0.2,
        "number_of_electrons": 4.0,
        "number_of_bands": 3
    }"#;
    let dataset: BandDataset = serde_json::from_str(json)?;
    assert_eq!(dataset, spin_polarized());
    assert!(dataset.kpoints().is_empty());
    Ok(())
}

#[test]
fn test_invalid_json_datasets() {
    // Ragged rows
    let ragged = r#"{"bands": [[1.0, 2.0], [1.0]], "weights": [1.0, 1.0],
        "fermi_level": 0.0, "number_of_electrons": 2}"#;
    assert!(serde_json::from_str::<BandDataset>(ragged).is_err());

    // Fractional electron count
    let fractional = r#"{"bands": [[1.0, 2.0]], "weights": [1.0],
        "fermi_level": 0.0, "number_of_electrons": 2.5}"#;
    assert!(serde_json::from_str::<BandDataset>(fractional).is_err());

    // Declared band count disagrees with the eigenvalues
    let declared = r#"{"bands": [[1.0, 2.0]], "weights": [1.0],
        "fermi_level": 0.0, "number_of_electrons": 2, "number_of_bands": 3}"#;
    assert!(serde_json::from_str::<BandDataset>(declared).is_err());

    // Weights do not match the k-points
    let weights = r#"{"bands": [[1.0, 2.0]], "weights": [0.5, 0.5],
        "fermi_level": 0.0, "number_of_electrons": 2}"#;
    assert!(serde_json::from_str::<BandDataset>(weights).is_err());
}

#[test]
fn test_smeared_weights_must_sum_to_spin_degeneracy() {
    let bands = array![
        [-9.0, -7.0, -5.0, -3.0, 1.0, 2.0, 3.0, 4.0],
        [-8.5, -6.5, -4.5, -2.5, 1.5, 2.5, 3.5, 4.5]
    ];

    // Weights normalized to one hold at most eight electrons in eight bands
    let normalized_to_one =
        BandDataset::new(Eigenvalues::Collinear(bands.clone()), array![0.5, 0.5], 0.0, 8.0)
            .unwrap();
    let err = compare(&normalized_to_one, &normalized_to_one, 0.6, 10.0, true).unwrap_err();
    assert_eq!(
        err,
        BandsError::Precondition(PreconditionViolation::ElectronCountOutOfRange {
            electrons: 8.0,
            capacity: 8.0
        })
    );

    let collinear =
        BandDataset::new(Eigenvalues::Collinear(bands), array![1.0, 1.0], 0.0, 8.0).unwrap();
    let result = compare(&collinear, &collinear, 0.6, 10.0, true).unwrap();
    assert_eq!(result.eta_v, 0.0);
}

//! End-to-end transport values for known parameter sets.

use std::sync::Arc;

use approx::assert_relative_eq;
use proptest::prelude::*;
use tbhall_compute::{ComputeBackend, CpuBackend, SerialBackend};
use tbhall_core::model::{Model, ModelParams};
use tbhall_core::types::{ChemicalPotentialSweep, HoppingParameters};

fn list(values: &[f64]) -> ChemicalPotentialSweep {
    ChemicalPotentialSweep::List(values.to_vec())
}

#[test]
fn test_reference_hoppings_regression() {
    let params = ModelParams::new(HoppingParameters::REFERENCE, 0.1, list(&[-1.0, 0.0, 1.0]))
        .with_resolution(100);
    let model = Model::synthetic(&params).unwrap();

    let expected_hall = [1.543_814_749, 1.414_796_877, 0.620_712_374];
    let expected_density = [0.839_494_711, 1.130_022_363, 1.347_712_447];
    for i in 0..3 {
        assert_relative_eq!(model.hall_number()[i], expected_hall[i], max_relative = 1e-6);
        assert_relative_eq!(model.density()[i], expected_density[i], max_relative = 1e-6);
        assert_relative_eq!(model.doping()[i], 1.0 - expected_density[i], max_relative = 1e-6);
    }
}

#[test]
fn test_filtered_regression() {
    let params = ModelParams::new(HoppingParameters::REFERENCE, 0.1, list(&[-1.0, 0.0, 1.0]))
        .with_resolution(100)
        .with_filter(true);
    let model = Model::synthetic(&params).unwrap();

    let expected_hall = [0.523_945_546, 0.228_468_154, 0.009_526_890];
    for i in 0..3 {
        assert_relative_eq!(model.hall_number()[i], expected_hall[i], max_relative = 1e-5);
    }
    // Density comes from the band energy and ignores the filter.
    assert_relative_eq!(model.density()[0], 0.839_494_711, max_relative = 1e-6);
}

#[test]
fn test_single_band_limit_electron_pocket() {
    let params = ModelParams::new(
        HoppingParameters::nearest_neighbour(1.0),
        0.05,
        list(&[-3.0, -2.5]),
    )
    .with_resolution(200);
    let model = Model::synthetic(&params).unwrap();

    let hall = model.hall_number();
    let density = model.density();
    for i in 0..2 {
        assert!(hall[i] < 0.0, "electron pocket should give negative n_H, got {}", hall[i]);
        let carriers = density[i];
        let rel = (hall[i].abs() - carriers).abs() / carriers;
        assert!(
            rel < 0.05,
            "|n_H| = {} vs density {} ({:.1}% off)",
            hall[i].abs(),
            carriers,
            rel * 100.0
        );
    }
    assert_relative_eq!(hall[0], -0.170_630_604, max_relative = 1e-6);
    assert_relative_eq!(density[0], 0.168_571_940, max_relative = 1e-6);
}

#[test]
fn test_single_band_limit_hole_pocket() {
    let params = ModelParams::new(HoppingParameters::nearest_neighbour(1.0), 0.05, list(&[3.0]))
        .with_resolution(200);
    let model = Model::synthetic(&params).unwrap();

    let hall = model.hall_number()[0];
    let holes = 2.0 - model.density()[0];
    assert!(hall > 0.0);
    assert!(
        (hall - holes).abs() / holes < 0.05,
        "n_H = {hall} vs hole count {holes}"
    );
    assert_relative_eq!(hall, 0.171_798_902, max_relative = 1e-6);
}

#[test]
fn test_backends_agree_exactly() {
    let params = ModelParams::new(
        HoppingParameters::REFERENCE,
        0.1,
        ChemicalPotentialSweep::Range {
            start: -2.0,
            stop: 2.0,
            step: 0.5,
        },
    )
    .with_resolution(40)
    .with_filter(true);

    let serial = Model::builder()
        .with_backend(Arc::new(SerialBackend))
        .synthetic(&params)
        .unwrap();
    let cpu_backend = CpuBackend::with_threads(4).unwrap();
    assert_eq!(cpu_backend.device_info().threads, 4);
    let cpu = Model::builder()
        .with_backend(Arc::new(cpu_backend))
        .synthetic(&params)
        .unwrap();
    assert_eq!(cpu.device_info().threads, 4);

    assert_eq!(serial.transport(), cpu.transport());
    assert_eq!(serial.weights().as_array(), cpu.weights().as_array());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_density_bounded_and_monotone(
        t_prime in -0.4f64..0.4,
        t_double_prime in -0.3f64..0.3,
        mut mus in prop::collection::vec(-5.0f64..5.0, 2..6),
    ) {
        mus.sort_by(f64::total_cmp);
        let params = ModelParams::new(
            HoppingParameters::new(1.0, t_prime, t_double_prime),
            0.1,
            ChemicalPotentialSweep::List(mus),
        )
        .with_resolution(12);
        let model = Model::builder()
            .with_backend(Arc::new(SerialBackend))
            .synthetic(&params)
            .unwrap();

        let density = model.density().to_vec();
        for &n in density.iter() {
            prop_assert!((0.0..=2.0 + 1e-12).contains(&n), "density {} out of range", n);
        }
        for pair in density.windows(2) {
            prop_assert!(pair[1] >= pair[0], "density decreased: {} -> {}", pair[0], pair[1]);
        }
        let doping = model.doping().to_vec();
        for pair in doping.windows(2) {
            prop_assert!(pair[1] <= pair[0]);
        }
    }
}

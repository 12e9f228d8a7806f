//! Analytic derivatives against finite differences, and lattice symmetries.

use proptest::prelude::*;
use tbhall_compute::SerialBackend;
use tbhall_core::dispersion::{band_energy, band_energy_at, derivatives, derivatives_at};
use tbhall_core::spectral::{fermi_arc_masks, spectral_weight};
use tbhall_core::types::{HoppingParameters, MomentumGrid};

fn centred_dx(h: &HoppingParameters, kx: f64, ky: f64, step: f64) -> f64 {
    (band_energy_at(h, kx + step, ky, 0.0) - band_energy_at(h, kx - step, ky, 0.0)) / (2.0 * step)
}

fn centred_dy(h: &HoppingParameters, kx: f64, ky: f64, step: f64) -> f64 {
    (band_energy_at(h, kx, ky + step, 0.0) - band_energy_at(h, kx, ky - step, 0.0)) / (2.0 * step)
}

#[test]
fn test_velocity_matches_centred_differences_at_second_order() {
    let h = HoppingParameters::REFERENCE;
    for &(kx, ky) in &[(0.7, 0.4), (-1.9, 2.3), (2.8, -0.2)] {
        let exact = derivatives_at(&h, kx, ky);

        let err_x_coarse = (centred_dx(&h, kx, ky, 1e-2) - exact.dx).abs();
        let err_x_fine = (centred_dx(&h, kx, ky, 5e-3) - exact.dx).abs();
        let ratio_x = err_x_coarse / err_x_fine;
        assert!(
            (3.5..4.5).contains(&ratio_x),
            "dE/dx error ratio {ratio_x} at ({kx}, {ky}): {err_x_coarse:e} -> {err_x_fine:e}"
        );

        let err_y_coarse = (centred_dy(&h, kx, ky, 1e-2) - exact.dy).abs();
        let err_y_fine = (centred_dy(&h, kx, ky, 5e-3) - exact.dy).abs();
        let ratio_y = err_y_coarse / err_y_fine;
        assert!(
            (3.5..4.5).contains(&ratio_y),
            "dE/dy error ratio {ratio_y} at ({kx}, {ky}): {err_y_coarse:e} -> {err_y_fine:e}"
        );
        assert!(err_x_fine < 1e-4 && err_y_fine < 1e-4);
    }
}

#[test]
fn test_second_derivatives_match_differences_of_velocity() {
    let h = HoppingParameters::REFERENCE;
    let (kx, ky, step) = (0.9, -1.3, 1e-4);
    let exact = derivatives_at(&h, kx, ky);

    let (xp, xm) = (derivatives_at(&h, kx + step, ky), derivatives_at(&h, kx - step, ky));
    let (yp, ym) = (derivatives_at(&h, kx, ky + step), derivatives_at(&h, kx, ky - step));
    let dxx = (xp.dx - xm.dx) / (2.0 * step);
    let dyy = (yp.dy - ym.dy) / (2.0 * step);
    let dxy = (yp.dx - ym.dx) / (2.0 * step);

    assert!((dxx - exact.dxx).abs() < 1e-6, "dxx {dxx} vs {}", exact.dxx);
    assert!((dyy - exact.dyy).abs() < 1e-6, "dyy {dyy} vs {}", exact.dyy);
    assert!((dxy - exact.dxy).abs() < 1e-6, "dxy {dxy} vs {}", exact.dxy);
}

#[test]
fn test_grid_derivatives_match_point_functions() {
    let h = HoppingParameters::new(0.8, 0.1, -0.05);
    let grid = MomentumGrid::new(9).unwrap();
    let d = derivatives(&h, &grid);
    for ((i, j), &kx) in grid.kx().indexed_iter() {
        let ky = grid.ky()[[i, j]];
        let p = derivatives_at(&h, kx, ky);
        assert_eq!(d.dx[[i, j]], p.dx);
        assert_eq!(d.dyy[[i, j]], p.dyy);
        assert_eq!(d.dxy[[i, j]], p.dxy);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_nearest_neighbour_band_is_symmetric(
        t in -2.0f64..2.0,
        kx in -3.2f64..3.2,
        ky in -3.2f64..3.2,
    ) {
        let h = HoppingParameters::nearest_neighbour(t);
        let e = band_energy_at(&h, kx, ky, 0.0);
        let swapped = band_energy_at(&h, ky, kx, 0.0);
        prop_assert!((e - swapped).abs() < 1e-12);

        let d = derivatives_at(&h, kx, ky);
        let ds = derivatives_at(&h, ky, kx);
        prop_assert!((d.dx - ds.dy).abs() < 1e-12);
        prop_assert!((d.dxx - ds.dyy).abs() < 1e-12);
        prop_assert_eq!(d.dxy, 0.0);
    }

    #[test]
    fn prop_velocity_is_odd(
        kx in -3.2f64..3.2,
        ky in -3.2f64..3.2,
    ) {
        let h = HoppingParameters::REFERENCE;
        let d = derivatives_at(&h, kx, ky);
        let m = derivatives_at(&h, -kx, -ky);
        prop_assert!((d.dx + m.dx).abs() < 1e-12);
        prop_assert!((d.dy + m.dy).abs() < 1e-12);
    }

    #[test]
    fn prop_filter_is_idempotent(
        resolution in 1usize..40,
        mu in -3.0f64..3.0,
        eta in 0.01f64..0.5,
    ) {
        let grid = MomentumGrid::new(resolution).unwrap();
        let masks = fermi_arc_masks(&grid, true);
        prop_assert!(masks.filter.iter().all(|&v| v == 0.0 || v == 1.0));

        let energies =
            band_energy(&SerialBackend, &HoppingParameters::REFERENCE, &grid, &[mu]).unwrap();
        let weights = spectral_weight(&SerialBackend, &energies, &masks, 0.0, eta).unwrap();
        let once = weights.slice(0);
        let twice = &once * &masks.filter;
        prop_assert_eq!(&twice, &once);

        // The outline lies inside the filter.
        let outside = masks
            .outline
            .iter()
            .zip(masks.filter.iter())
            .any(|(&o, &f)| o == 1.0 && f == 0.0);
        prop_assert!(!outside);
    }
}

//! Integration tests for radial and angular profiles

use dosekit_grid::{AxisSpec, Grid};
use dosekit_samples::Sample;
use dosekit_tg43::{
    compare_with_reference, AngularAggregator, Normalization, RadialAggregator,
    RIVARD_2004_IR192,
};
use rstest::{fixture, rstest};

/// Regular lattice of unit-energy samples filling a sphere of radius 5 cm
#[fixture]
fn uniform_sphere() -> Vec<Sample> {
    let steps = (-20..=20).map(|i| i as f64 * 0.25).collect::<Vec<f64>>();
    let mut samples = Vec::new();
    for x in &steps {
        for y in &steps {
            for z in &steps {
                let sample = Sample::new(*x, *y, *z, 1.0);
                if sample.radius() <= 5.0 {
                    samples.push(sample);
                }
            }
        }
    }
    samples
}

/// Radial edges 0.1 to 15 cm in 149 shells
fn fine_radial_edges() -> Vec<f64> {
    (0..150).map(|i| 0.1 + i as f64 * 14.9 / 149.0).collect()
}

fn tg43_angular() -> AngularAggregator {
    AngularAggregator::new(
        vec![0.5, 1.0, 2.0, 3.0, 5.0, 7.5, 10.0],
        AngularAggregator::uniform_angular_edges(18),
    )
    .unwrap()
}

/// Sample at distance `r` and polar angle `degrees` in the x-z plane
fn polar(r: f64, degrees: f64, energy: f64) -> Sample {
    let theta = degrees.to_radians();
    Sample::new(r * theta.sin(), 0.0, r * theta.cos(), energy)
}

#[rstest]
fn uniform_sphere_is_flat(uniform_sphere: Vec<Sample>) {
    let radial = RadialAggregator::new(fine_radial_edges()).unwrap();
    let profile = radial.from_samples(&uniform_sphere);

    assert_eq!(profile.normalization, Normalization::Reference);
    assert!((profile.reference_radius() - 1.0).abs() < 0.1);
    assert_eq!(profile.values[profile.reference_index], 1.0);

    for (i, value) in profile.values.iter().enumerate() {
        if profile.counts[i] > 0 {
            assert_eq!(*value, 1.0);
        } else {
            assert_eq!(*value, 0.0);
        }
    }

    // nothing beyond the sphere
    assert!(profile
        .points()
        .filter(|(r, _)| *r > 5.1)
        .all(|(_, v)| v == 0.0));
}

#[rstest]
#[case(0.5)] // inside the first shells
#[case(1.0)] // default
#[case(4.0)] // near the edge of the sphere
fn reference_shell_is_unity(uniform_sphere: Vec<Sample>, #[case] reference: f64) {
    let mut radial = RadialAggregator::new(fine_radial_edges()).unwrap();
    radial.set_reference_radius(reference).unwrap();
    let profile = radial.from_samples(&uniform_sphere);

    assert_eq!(profile.values[profile.reference_index], 1.0);
    assert!((profile.reference_radius() - reference).abs() <= 0.05 + 1e-9);
}

#[rstest]
fn uniform_grid_is_flat() {
    let axis = AxisSpec::new(-9.0, 9.0, 180).unwrap();
    let grid = Grid::from_parts(vec![axis, axis], vec![3.0; 180 * 180]).unwrap();

    let radial = RadialAggregator::new(vec![0.5, 1.5, 2.5, 5.0]).unwrap();
    let profile = radial.from_grid(&grid);

    assert_eq!(profile.raw, vec![3.0; 3]);
    assert_eq!(profile.values, vec![1.0; 3]);
    assert!(profile.counts.iter().all(|n| *n > 0));
}

#[rstest]
fn literature_comparison_of_flat_profile(uniform_sphere: Vec<Sample>) {
    let radial = RadialAggregator::new(vec![0.5, 1.5, 2.5, 3.5, 4.5]).unwrap();
    let profile = radial.from_samples(&uniform_sphere);
    let deviations = compare_with_reference(&profile, &RIVARD_2004_IR192);

    assert_eq!(deviations.len(), 4);
    assert_eq!(deviations[0].deviation_percent, 0.0);
    assert!(deviations
        .windows(2)
        .all(|w| w[1].deviation_percent > w[0].deviation_percent));
}

#[rstest]
fn zero_reference_bin_falls_back() {
    let samples = vec![
        // shell [1, 2): transverse bin present but zero weighted
        polar(1.5, 85.0, 0.0),
        polar(1.5, 45.0, 2.0),
        polar(1.5, 135.0, 4.0),
        // shell [2, 3): usable reference
        polar(2.5, 85.0, 2.0),
        polar(2.5, 45.0, 1.0),
    ];
    let profile = tg43_angular().from_samples(&samples);

    assert_eq!(profile.reference_index, 8);
    assert!(profile.is_fallback(1));
    assert_eq!(profile.ratios[1], vec![1.0; 18]);

    assert!(!profile.is_fallback(2));
    assert_eq!(profile.ratio(2, 8), Some(1.0));
    assert_eq!(profile.ratio(2, 4), Some(0.5));
    assert_eq!(profile.ratio(2, 0), Some(0.0));

    assert!(profile
        .ratios
        .iter()
        .flatten()
        .all(|r| r.is_finite() && *r >= 0.0));
}

#[rstest]
#[case(84.9, true)] // inside the 80-90 bin
#[case(90.5, false)] // just past the transverse edge
#[case(95.0, false)] // clearly above
fn transverse_bin_membership(#[case] degrees: f64, #[case] is_reference: bool) {
    let profile = tg43_angular().from_samples([polar(4.0, degrees, 1.0)]);
    assert_eq!(!profile.is_fallback(3), is_reference);
}

#[rstest]
fn angular_from_grid_is_bounded() {
    let axis = AxisSpec::new(-3.0, 3.0, 24).unwrap();
    let grid = Grid::from_parts(vec![axis; 3], vec![1.0; 24 * 24 * 24]).unwrap();
    let profile = tg43_angular().from_grid(&grid).unwrap();

    for (i, row) in profile.ratios.iter().enumerate() {
        if !profile.is_fallback(i) {
            assert_eq!(row[profile.reference_index], 1.0);
        }
        assert!(row.iter().all(|r| r.is_finite() && *r >= 0.0));
    }
}

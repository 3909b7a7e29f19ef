//! Integration tests for binning samples and comparing grids

use dosekit_grid::{
    difference, read_grid_file, write_grid_file, AxisSpec, Binner, Error, Grid,
};
use dosekit_samples::{open_samples, read_samples, Sample};
use rstest::{fixture, rstest};

#[fixture]
fn phantom() -> Vec<Sample> {
    read_samples("./data/phantom_mm.out", 0.1).unwrap().0
}

fn square(min: f64, max: f64, bins: usize) -> Vec<AxisSpec> {
    let axis = AxisSpec::new(min, max, bins).unwrap();
    vec![axis, axis]
}

#[rstest]
fn two_samples_into_four_by_four() {
    let samples = vec![
        Sample::new(0.0, 0.0, 0.0, 10.0),
        Sample::new(1.0, 0.0, 0.0, 5.0),
    ];
    let binned = Binner::new(square(-2.0, 2.0, 4)).unwrap().bin(&samples);

    let non_zero = binned
        .grid
        .values()
        .iter()
        .filter(|v| **v != 0.0)
        .collect::<Vec<&f64>>();

    assert_eq!(binned.grid.shape(), vec![4, 4]);
    assert_eq!(non_zero.len(), 2);
    assert_eq!(binned.grid.total(), 15.0);
    assert_eq!(binned.grid.get(&[2, 2]), Some(10.0));
    assert_eq!(binned.grid.get(&[3, 2]), Some(5.0));
}

#[rstest]
#[case(-9.0, 9.0, 180)] // full phantom
#[case(-5.0, 5.0, 50)] // partial, some excluded
#[case(-1.0, 1.0, 4)] // mostly excluded
fn energy_is_conserved(
    phantom: Vec<Sample>,
    #[case] min: f64,
    #[case] max: f64,
    #[case] bins: usize,
) {
    let binned = Binner::new(square(min, max, bins)).unwrap().bin(&phantom);
    let summary = binned.summary;

    assert_eq!(summary.binned + summary.excluded, phantom.len());
    assert!((binned.grid.total() + summary.excluded_energy - summary.total_energy).abs() < 1e-12);
    assert!((summary.binned_energy() - binned.grid.total()).abs() < 1e-12);
}

#[rstest]
fn order_does_not_matter(phantom: Vec<Sample>) {
    let binner = Binner::new(square(-9.0, 9.0, 18)).unwrap();
    let forward = binner.bin(&phantom);
    let backward = binner.bin(phantom.iter().rev());

    assert_eq!(forward.summary.binned, backward.summary.binned);
    for (a, b) in forward.grid.values().iter().zip(backward.grid.values()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[rstest]
fn streaming_matches_in_memory(phantom: Vec<Sample>) {
    let binner = Binner::new(square(-9.0, 9.0, 36)).unwrap();
    let in_memory = binner.bin(&phantom);

    let mut stream = open_samples("./data/phantom_mm.out", 0.1).unwrap();
    let streamed = binner.bin(stream.by_ref());

    assert_eq!(stream.summary().samples, phantom.len());
    assert_eq!(in_memory, streamed);
}

#[rstest]
fn self_difference_is_zero() {
    let axes = square(0.0, 10.0, 10);
    let grid = Grid::from_parts(axes, vec![3.0; 100]).unwrap();
    let result = difference(&grid, &grid).unwrap();

    assert!(result.absolute.values().iter().all(|v| *v == 0.0));
    assert!(result.relative.values().iter().all(|v| *v == Some(0.0)));
    assert_eq!(result.undefined, 0);
}

#[rstest]
fn phantom_differences(phantom: Vec<Sample>) {
    let binner = Binner::new(square(-9.0, 9.0, 9)).unwrap();
    let reference = binner.bin(&phantom).grid;

    let mut test = reference.clone();
    test.scale(1.1);

    let result = difference(&reference, &test).unwrap();
    for (value, relative) in reference.values().iter().zip(result.relative.values()) {
        match relative {
            Some(r) => assert!((r - 0.1).abs() < 1e-9),
            None => assert_eq!(*value, 0.0),
        }
    }
    assert_eq!(
        result.undefined,
        reference.values().iter().filter(|v| **v <= 0.0).count()
    );
}

#[rstest]
fn difference_needs_matching_axes() {
    let a = Grid::zeros(square(-9.0, 9.0, 180)).unwrap();
    let b = Grid::zeros(square(-9.0, 9.0, 90)).unwrap();
    match difference(&a, &b) {
        Err(Error::ShapeMismatch { expected, found }) => {
            assert_eq!(expected[0].bins, 180);
            assert_eq!(found[0].bins, 90);
        }
        other => panic!("expected a shape mismatch, got {other:?}"),
    }
}

#[rstest]
fn container_round_trip(phantom: Vec<Sample>) {
    let axes = vec![
        AxisSpec::new(-9.0, 9.0, 18).unwrap(),
        AxisSpec::new(-9.0, 9.0, 18).unwrap(),
        AxisSpec::new(-1.0, 1.0, 2).unwrap(),
    ];
    let grid = Binner::new(axes).unwrap().bin(&phantom).grid;

    let path = std::env::temp_dir().join("dosekit_grid_container_round_trip.grid");
    write_grid_file(&grid, &path).unwrap();
    let loaded = read_grid_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(grid, loaded);
}

#[rstest]
fn container_rejects_other_files() {
    let result = read_grid_file("./data/phantom_mm.out");
    assert!(matches!(result, Err(Error::UnknownContainer { .. })));
}

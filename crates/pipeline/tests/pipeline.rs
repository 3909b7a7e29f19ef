//! Integration tests for full pipeline runs

use dosekit_grid::{AxisSpec, Grid};
use dosekit_pipeline::{
    write_angular_csv, write_json, write_radial_csv, Config, Error, Pipeline,
};
use dosekit_tg43::Normalization;
use rstest::{fixture, rstest};
use std::path::PathBuf;

#[fixture]
fn config() -> Config {
    Config::from_json_file("./data/config.json").unwrap()
}

#[fixture]
fn pipeline(config: Config) -> Pipeline {
    Pipeline::new(config).unwrap()
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("dosekit_pipeline_{}_{name}", std::process::id()))
}

#[rstest]
fn water_dosimetry(pipeline: Pipeline) {
    let report = pipeline.dosimetry("./data/water.out").unwrap();

    // one of each anomaly was planted in the file
    assert_eq!(report.dataset.ingest.samples, 648);
    assert_eq!(report.diagnostics.malformed_lines, 1);
    assert_eq!(report.diagnostics.rejected_samples, 1);
    assert_eq!(report.dataset.ingest.blank, 1);
    assert_eq!(report.dataset.ingest.comments, 1);
    assert!(report.dataset.sanity.is_empty());

    // everything lands on the grid
    assert_eq!(report.dataset.binning.excluded, 0);
    assert!((report.grid.total() - report.dataset.ingest.total_energy).abs() < 1e-9);

    let radial = &report.radial;
    assert_eq!(radial.normalization, Normalization::Reference);
    assert_eq!(radial.values[radial.reference_index], 1.0);
    assert_eq!(report.literature.len(), 10);

    // z -> -z symmetry of the lattice
    let angular = report.angular.as_ref().unwrap();
    assert_eq!(angular.reference_index, 2);
    assert!(angular.fallback_shells.is_empty());
    for shell in 0..angular.ratios.len() {
        assert_eq!(angular.ratio(shell, 2), Some(1.0));
        assert_eq!(angular.ratio(shell, 3), Some(1.0));
        assert_eq!(angular.ratio(shell, 1), angular.ratio(shell, 4));
    }

    assert_eq!(report.diagnostics.normalization_fallbacks, 0);

    // lattice corners reach past the 10 cm radial and 8 cm angular shells
    assert_eq!(report.radial.outside, 64);
    assert_eq!(report.diagnostics.profile_outside, 64 + 232);
    assert_eq!(report.diagnostics.profile_at_origin, 0);
}

#[rstest]
fn undecodable_line_is_skipped(pipeline: Pipeline) {
    let clean = pipeline.dosimetry("./data/water.out").unwrap();
    let report = pipeline.dosimetry("./data/water_corrupt.out").unwrap();

    assert_eq!(report.dataset.ingest.samples, 648);
    assert_eq!(report.diagnostics.malformed_lines, 2);
    assert!(!report.dataset.ingest.interrupted);
    assert_eq!(report.grid, clean.grid);
    assert_eq!(report.radial, clean.radial);
}

#[cfg(unix)]
#[rstest]
fn unreadable_source_is_an_error(pipeline: Pipeline) {
    // a directory opens but can not be read
    assert!(matches!(
        pipeline.dosimetry("./data"),
        Err(Error::Samples(dosekit_samples::Error::Interrupted { line: 0, .. }))
    ));
    assert!(matches!(
        pipeline.compare("./data/water.out", "./data"),
        Err(Error::Samples(dosekit_samples::Error::Interrupted { .. }))
    ));
}

#[rstest]
fn streaming_matches_materialised(config: Config) {
    let materialised = Pipeline::new(config.clone())
        .unwrap()
        .dosimetry("./data/water.out")
        .unwrap();

    let mut streaming = config;
    streaming.angular = None;
    let streamed = Pipeline::new(streaming)
        .unwrap()
        .dosimetry("./data/water.out")
        .unwrap();

    assert!(streamed.angular.is_none());
    assert_eq!(streamed.grid, materialised.grid);
    assert_eq!(streamed.radial, materialised.radial);
    assert_eq!(streamed.dataset, materialised.dataset);
}

#[rstest]
fn bone_against_water(pipeline: Pipeline) {
    let report = pipeline
        .compare("./data/water.out", "./data/bone.out")
        .unwrap();

    let region = |name: &str| {
        report
            .regions
            .iter()
            .find(|r| r.name == name)
            .and_then(|r| r.stats)
            .unwrap()
    };

    let bone = region("bone");
    assert_eq!(bone.count, 64);
    assert!((bone.mean - 10.0).abs() < 1e-4);
    assert!((bone.median - 10.0).abs() < 1e-4);

    assert_eq!(region("water").mean, 0.0);
    assert_eq!(region("water").max, 0.0);
    assert_eq!(region("periphery").mean, 0.0);

    assert!(report.energy_change_percent().unwrap() > 0.0);
    assert_eq!(report.diagnostics.undefined_ratios, 0);
    assert_eq!(report.diagnostics.malformed_lines, 2);
    assert_eq!(report.diagnostics.rejected_samples, 2);

    // rings out to 9 cm, the slab covers half of the ring at 2-2.5 cm
    assert_eq!(report.rings.len(), 18);
    assert_eq!(report.rings.iter().map(|r| r.selected).sum::<usize>(), 256);
    assert_eq!(report.rings[1].stats.unwrap().mean, 0.0);
    assert!((report.rings[4].stats.unwrap().mean - 5.0).abs() < 1e-4);
    assert!(report.rings[0].stats.is_none());

    let significance = report.significance.as_ref().unwrap();
    assert_eq!(significance.windows.len(), 14 * 14);
    assert_eq!(significance.skipped, 0);

    let at = |centre: [usize; 2]| {
        significance
            .windows
            .iter()
            .find(|w| w.centre == centre.to_vec())
            .unwrap()
    };
    assert!(at([9, 13]).p < 1e-6);
    assert_eq!(at([3, 3]).p, 1.0);
}

#[rstest]
fn self_comparison_is_zero(pipeline: Pipeline) {
    let report = pipeline
        .compare("./data/water.out", "./data/water.out")
        .unwrap();

    assert_eq!(report.energy_change_percent(), Some(0.0));
    assert!(report
        .difference
        .absolute
        .values()
        .iter()
        .all(|v| *v == 0.0));
    for region in &report.regions {
        let stats = region.stats.unwrap();
        assert_eq!((stats.min, stats.max), (0.0, 0.0));
    }
    let significance = report.significance.unwrap();
    assert_eq!(significance.significant(0.05), 0);
}

#[rstest]
fn dead_reference_cells_are_counted(pipeline: Pipeline) {
    let axis = AxisSpec::new(-9.0, 9.0, 18).unwrap();
    // cells centred on (-4.5, -4.5) and (-4.5, -3.5), in the phantom water
    let mut values = vec![1.0; 18 * 18];
    values[4 * 18 + 4] = 0.0;
    values[4 * 18 + 5] = -1.0;

    let reference = Grid::from_parts(vec![axis, axis], values).unwrap();
    let test = Grid::from_parts(vec![axis, axis], vec![1.0; 18 * 18]).unwrap();
    let report = pipeline.compare_grids(&reference, &test).unwrap();

    assert_eq!(report.diagnostics.undefined_ratios, 2);
    assert!(report.reference.is_none());

    let water = report.regions.iter().find(|r| r.name == "water").unwrap();
    assert_eq!(water.undefined, 2);
}

#[rstest]
fn mismatched_grids(pipeline: Pipeline) {
    let a = AxisSpec::new(-9.0, 9.0, 18).unwrap();
    let b = AxisSpec::new(-9.0, 9.0, 36).unwrap();
    let reference = Grid::zeros(vec![a, a]).unwrap();
    let test = Grid::zeros(vec![b, b]).unwrap();

    assert!(matches!(
        pipeline.compare_grids(&reference, &test),
        Err(Error::Grid(dosekit_grid::Error::ShapeMismatch { .. }))
    ));
}

#[rstest]
fn missing_source(pipeline: Pipeline) {
    assert!(matches!(
        pipeline.dosimetry("./data/not_here.out"),
        Err(Error::Samples(dosekit_samples::Error::SourceNotFound { .. }))
    ));
}

#[rstest]
fn writers(pipeline: Pipeline) {
    let report = pipeline.dosimetry("./data/water.out").unwrap();

    let radial_path = temp_path("radial.csv");
    write_radial_csv(&report.radial, &radial_path).unwrap();
    let radial = std::fs::read_to_string(&radial_path).unwrap();
    let mut lines = radial.lines();
    assert_eq!(lines.next(), Some("r_cm,value,raw,count"));
    assert_eq!(lines.count(), 10);

    let angular_path = temp_path("angular.csv");
    write_angular_csv(report.angular.as_ref().unwrap(), &angular_path).unwrap();
    let angular = std::fs::read_to_string(&angular_path).unwrap();
    assert_eq!(angular.lines().count(), 1 + 3 * 6);

    let json_path = temp_path("report.json");
    write_json(&report, &json_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["diagnostics"]["malformed_lines"], 1);
    assert_eq!(json["dataset"]["ingest"]["samples"], 648);
    assert!(json.get("grid").is_none());

    for path in [radial_path, angular_path, json_path] {
        std::fs::remove_file(path).unwrap();
    }
}

#[rstest]
fn config_round_trip(config: Config) {
    let path = temp_path("config.json");
    write_json(&config, &path).unwrap();
    let back = Config::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(back, config);
}

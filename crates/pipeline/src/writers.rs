//! Writers for reports and profiles

// crate modules
use crate::error::Result;

// dosekit modules
use dosekit_tg43::{AngularProfile, RadialProfile};

// standard library
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// external crates
use log::debug;
use serde::Serialize;

/// Write anything serialisable, such as a report or [Config](crate::Config),
/// as pretty-printed JSON
///
/// ```rust, no_run
/// # use dosekit_pipeline::{write_json, Config, Pipeline};
/// let report = Pipeline::new(Config::default())
///     .unwrap()
///     .dosimetry("water.out")
///     .unwrap();
/// write_json(&report, "water_report.json").unwrap();
/// ```
pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    debug!("Wrote JSON to {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct RadialRow {
    r_cm: f64,
    value: f64,
    raw: f64,
    count: usize,
}

/// Write a radial profile as CSV, one row per shell
///
/// Columns are `r_cm,value,raw,count`.
pub fn write_radial_csv<P: AsRef<Path>>(profile: &RadialProfile, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    for (i, (r_cm, value)) in profile.points().enumerate() {
        writer.serialize(RadialRow {
            r_cm,
            value,
            raw: profile.raw[i],
            count: profile.counts[i],
        })?;
    }

    writer.flush()?;
    debug!("Wrote {} shells to {}", profile.centers.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct AngularRow {
    r_cm: f64,
    theta_deg: f64,
    ratio: f64,
    mean: f64,
    count: usize,
    fallback: bool,
}

/// Write an angular profile as CSV in long form, one row per shell and angle
///
/// Columns are `r_cm,theta_deg,ratio,mean,count,fallback`.
pub fn write_angular_csv<P: AsRef<Path>>(profile: &AngularProfile, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;
    let degrees = profile.angular_centers_degrees();

    for (i, r_cm) in profile.radial_centers.iter().enumerate() {
        for (j, theta_deg) in degrees.iter().enumerate() {
            writer.serialize(AngularRow {
                r_cm: *r_cm,
                theta_deg: *theta_deg,
                ratio: profile.ratios[i][j],
                mean: profile.means[i][j],
                count: profile.counts[i][j],
                fallback: profile.is_fallback(i),
            })?;
        }
    }

    writer.flush()?;
    debug!(
        "Wrote {} x {} ratios to {}",
        profile.radial_centers.len(),
        degrees.len(),
        path.display()
    );
    Ok(())
}

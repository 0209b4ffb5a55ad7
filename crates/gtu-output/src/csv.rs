//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `trajectories.csv`
//! - `detections.csv`
//! - `failures.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{DetectionRow, FailureRow, OutputResult, TrajectoryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    trajectories: Writer<File>,
    detections:   Writer<File>,
    failures:     Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut trajectories = Writer::from_path(dir.join("trajectories.csv"))?;
        trajectories.write_record(["time", "gtu", "lane", "position", "speed", "acceleration", "x", "y"])?;

        let mut detections = Writer::from_path(dir.join("detections.csv"))?;
        detections.write_record(["time", "sensor", "name", "kind", "gtu", "speed"])?;

        let mut failures = Writer::from_path(dir.join("failures.csv"))?;
        failures.write_record(["time", "gtu", "error"])?;

        log::debug!("writing CSV output to {}", dir.display());
        Ok(Self {
            trajectories,
            detections,
            failures,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_trajectories(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        for row in rows {
            self.trajectories.write_record(&[
                row.time.to_string(),
                row.gtu.to_string(),
                row.lane.to_string(),
                format!("{:.3}", row.position),
                format!("{:.3}", row.speed),
                format!("{:.3}", row.acceleration),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
            ])?;
        }
        Ok(())
    }

    fn write_detection(&mut self, row: &DetectionRow) -> OutputResult<()> {
        self.detections.write_record(&[
            row.time.to_string(),
            row.sensor.to_string(),
            row.name.clone(),
            row.kind.to_string(),
            row.gtu.to_string(),
            format!("{:.3}", row.speed),
        ])?;
        Ok(())
    }

    fn write_failure(&mut self, row: &FailureRow) -> OutputResult<()> {
        self.failures.write_record(&[row.time.to_string(), row.gtu.to_string(), row.error.clone()])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trajectories.flush()?;
        self.detections.flush()?;
        self.failures.flush()?;
        Ok(())
    }
}

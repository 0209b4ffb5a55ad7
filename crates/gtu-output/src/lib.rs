//! `gtu-output` — simulation output writers for the lane-based GTU simulator.
//!
//! | Backend | Files created                                              |
//! |---------|------------------------------------------------------------|
//! | CSV     | `trajectories.csv`, `detections.csv`, `failures.csv`       |
//!
//! Backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `gtu_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gtu_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer);
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{Sampling, SimOutputObserver};
pub use row::{DetectionRow, FailureRow, TrajectoryRow};
pub use writer::OutputWriter;

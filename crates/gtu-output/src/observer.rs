//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use gtu_core::{RelativePosition, SimTime};
use gtu_mobility::{Gtu, Traffic};
use gtu_network::{LaneNetwork, Sensor, SensorKind};
use gtu_sim::{GtuFailure, SimObserver};

use crate::row::{DetectionRow, FailureRow, TrajectoryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// When trajectory rows are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Sampling {
    /// One row per committed move.
    #[default]
    EveryMove,
    /// One row per live vehicle at each snapshot
    /// (`SimConfig::snapshot_interval`).
    Snapshots,
}

/// A [`SimObserver`] that writes trajectories, detector passages, sink
/// exits, and failures to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    sampling:   Sampling,
    rows:       u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, sampling: Sampling::EveryMove, rows: 0, last_error: None }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    /// Trajectory rows written so far.
    pub fn trajectory_rows(&self) -> u64 {
        self.rows
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                log::warn!("output write failed: {e}");
                self.last_error = Some(e);
            }
        }
    }

    fn write_rows(&mut self, rows: OutputResult<Vec<TrajectoryRow>>) {
        let result = rows.and_then(|rows| {
            self.rows += rows.len() as u64;
            self.writer.write_trajectories(&rows)
        });
        self.store_err(result);
    }

    fn passage(&mut self, now: SimTime, sensor: &Sensor, gtu: &Gtu) {
        let row = DetectionRow {
            time:   now.as_secs(),
            sensor: sensor.id.0,
            name:   sensor.name.clone(),
            kind:   match sensor.kind {
                SensorKind::Detector => "detector",
                SensorKind::Sink => "sink",
            },
            gtu:    gtu.id.0,
            speed:  gtu.speed_at(now),
        };
        let result = self.writer.write_detection(&row);
        self.store_err(result);
    }
}

/// Trajectory row for `gtu` at `now`, on its first occupied lane.
fn trajectory_row(network: &LaneNetwork, gtu: &Gtu, now: SimTime) -> OutputResult<Option<TrajectoryRow>> {
    let Some(&lane) = gtu.lanes().first() else {
        return Ok(None);
    };
    let position = gtu.position(network, lane, RelativePosition::Reference, now)?;
    let pose = network.location(lane, position);
    Ok(Some(TrajectoryRow {
        time: now.as_secs(),
        gtu: gtu.id.0,
        lane: lane.0,
        position,
        speed: gtu.speed_at(now),
        acceleration: gtu.kinematics.acceleration,
        x: pose.point.x,
        y: pose.point.y,
    }))
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_move(&mut self, now: SimTime, gtu: &Gtu, network: &LaneNetwork) {
        if self.sampling != Sampling::EveryMove {
            return;
        }
        let rows = trajectory_row(network, gtu, now).map(|row| row.into_iter().collect());
        self.write_rows(rows);
    }

    fn on_detection(&mut self, now: SimTime, detector: &Sensor, gtu: &Gtu) {
        self.passage(now, detector, gtu);
    }

    fn on_exit(&mut self, now: SimTime, sink: &Sensor, gtu: &Gtu) {
        self.passage(now, sink, gtu);
    }

    fn on_failure(&mut self, failure: &GtuFailure) {
        let row = FailureRow {
            time:  failure.time.as_secs(),
            gtu:   failure.gtu.0,
            error: failure.error.to_string(),
        };
        let result = self.writer.write_failure(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, now: SimTime, traffic: &Traffic, network: &LaneNetwork) {
        if self.sampling != Sampling::Snapshots {
            return;
        }
        let rows: OutputResult<Vec<TrajectoryRow>> = traffic
            .gtus
            .ids()
            .into_iter()
            .filter_map(|id| {
                let gtu = match traffic.gtu(id) {
                    Ok(gtu) => gtu,
                    Err(e) => return Some(Err(e.into())),
                };
                trajectory_row(network, gtu, now).transpose()
            })
            .collect();
        self.write_rows(rows);
    }

    fn on_sim_end(&mut self, _now: SimTime) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}

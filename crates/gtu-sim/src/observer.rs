//! Simulation observer trait for progress reporting and data collection.

use gtu_core::SimTime;
use gtu_mobility::{Gtu, Traffic};
use gtu_network::{LaneNetwork, Sensor};

use crate::GtuFailure;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] as events execute.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — exit counter
///
/// ```rust,ignore
/// struct Exits(usize);
///
/// impl SimObserver for Exits {
///     fn on_exit(&mut self, _now: SimTime, _sink: &Sensor, _gtu: &Gtu) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// A vehicle committed a new movement at `now`.  `gtu` already carries
    /// the new kinematics and lanes.
    fn on_move(&mut self, _now: SimTime, _gtu: &Gtu, _network: &LaneNetwork) {}

    /// A detector registered a passage.
    fn on_detection(&mut self, _now: SimTime, _detector: &Sensor, _gtu: &Gtu) {}

    /// A vehicle reached a sink and left the network.  `gtu` is already
    /// deregistered from its lanes.
    fn on_exit(&mut self, _now: SimTime, _sink: &Sensor, _gtu: &Gtu) {}

    /// A vehicle was removed because one of its events failed.
    fn on_failure(&mut self, _failure: &GtuFailure) {}

    /// Called every `config.snapshot_interval` seconds with the full
    /// vehicle state.
    fn on_snapshot(&mut self, _now: SimTime, _traffic: &Traffic, _network: &LaneNetwork) {}

    /// Called once when [`Sim::run`][crate::Sim::run] returns normally.
    fn on_sim_end(&mut self, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

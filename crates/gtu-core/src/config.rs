//! Simulation configuration.
//!
//! Typically built with `SimConfig::default()` and a few overrides, or
//! loaded from JSON by the application crate (enable the `serde` feature).

use crate::{CoreError, CoreResult, LateralDirection, SimTime};

// ── LaneIncentiveDefaults ─────────────────────────────────────────────────────

/// Acceleration-valued lane biases used when neither the route nor a lane
/// drop imposes urgency (m/s²).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneIncentiveDefaults {
    /// Bias for keeping the current lane.
    pub stay:          f64,
    /// Bias for the adjacent lane in [`SimConfig::preferred_direction`].
    pub preferred:     f64,
    /// Bias for the adjacent lane on the other side.
    pub non_preferred: f64,
}

impl Default for LaneIncentiveDefaults {
    fn default() -> Self {
        Self { stay: 0.1, preferred: 0.3, non_preferred: -0.3 }
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated time at which the run starts.
    pub start_time: SimTime,

    /// Simulated time at which the run stops (events at exactly this time
    /// still execute).
    pub end_time: SimTime,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Look-ahead for leaders, in metres.  Default: 500.
    pub forward_headway_distance: f64,

    /// Look-back for followers, in metres.  Default: 200.
    pub backward_headway_distance: f64,

    /// Time horizon for route suitability and lane-drop anticipation, in
    /// seconds.  Default: 90.
    pub suitability_time_horizon: f64,

    /// Side favoured by the default lane incentives (keep-right by default).
    pub preferred_direction: LateralDirection,

    pub incentives: LaneIncentiveDefaults,

    /// Delay before a generator re-checks a blocked entry, in seconds.
    pub generator_retry_interval: f64,

    /// When set, observers get a snapshot of every live vehicle at this
    /// period (seconds) in addition to per-move callbacks.
    pub snapshot_interval: Option<f64>,

    /// Return the first vehicle failure from `run` instead of quarantining
    /// the vehicle and continuing.
    pub abort_on_failure: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_time:                SimTime::ZERO,
            end_time:                  SimTime(3_600.0),
            seed:                      0,
            forward_headway_distance:  500.0,
            backward_headway_distance: 200.0,
            suitability_time_horizon:  90.0,
            preferred_direction:       LateralDirection::Right,
            incentives:                LaneIncentiveDefaults::default(),
            generator_retry_interval:  0.1,
            snapshot_interval:         None,
            abort_on_failure:          false,
        }
    }
}

impl SimConfig {
    /// Check value ranges.  Called by the simulation builder.
    pub fn validate(&self) -> CoreResult<()> {
        if self.end_time < self.start_time {
            return Err(CoreError::Config(format!(
                "end_time {} precedes start_time {}",
                self.end_time, self.start_time
            )));
        }
        for (name, v) in [
            ("forward_headway_distance", self.forward_headway_distance),
            ("backward_headway_distance", self.backward_headway_distance),
            ("suitability_time_horizon", self.suitability_time_horizon),
            ("generator_retry_interval", self.generator_retry_interval),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(CoreError::Config(format!("{name} must be positive, got {v}")));
            }
        }
        if let Some(dt) = self.snapshot_interval {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(CoreError::Config(format!("snapshot_interval must be positive, got {dt}")));
            }
        }
        Ok(())
    }
}

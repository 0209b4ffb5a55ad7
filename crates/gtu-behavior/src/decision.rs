//! Values passed between the decision protocol and the strategies.

use gtu_core::{LateralDirection, SimTime};

// ── LaneIncentives ────────────────────────────────────────────────────────────

/// Acceleration-valued biases for the left, current, and right lane (m/s²).
///
/// [`LaneIncentives::FORBIDDEN`] marks a lane that must not be chosen.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LaneIncentives {
    pub left:    f64,
    pub current: f64,
    pub right:   f64,
}

impl LaneIncentives {
    pub const FORBIDDEN: f64 = f64::NEG_INFINITY;

    pub fn new(left: f64, current: f64, right: f64) -> Self {
        Self { left, current, right }
    }

    #[inline]
    pub fn side(&self, direction: LateralDirection) -> f64 {
        match direction {
            LateralDirection::Left  => self.left,
            LateralDirection::Right => self.right,
        }
    }

    #[inline]
    pub fn set_side(&mut self, direction: LateralDirection, value: f64) {
        match direction {
            LateralDirection::Left  => self.left = value,
            LateralDirection::Right => self.right = value,
        }
    }

    #[inline]
    pub fn is_forbidden(&self, direction: LateralDirection) -> bool {
        self.side(direction) == Self::FORBIDDEN
    }
}

// ── AccelerationStep / MovementDecision ───────────────────────────────────────

/// A car-following result: constant acceleration until `valid_until`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AccelerationStep {
    pub acceleration: f64,
    pub valid_until:  SimTime,
}

/// What a vehicle commits to at an evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MovementDecision {
    pub acceleration: f64,
    pub valid_until:  SimTime,
    /// `Some` if the vehicle changes lane at the start of the interval.
    pub lane_change:  Option<LateralDirection>,
}

impl MovementDecision {
    pub fn keep_lane(step: AccelerationStep) -> Self {
        Self { acceleration: step.acceleration, valid_until: step.valid_until, lane_change: None }
    }
}

/// Limit `acceleration` so that `speed` does not drop below zero within
/// `dt` seconds.  Also turns a non-finite deceleration into a finite one.
#[inline]
pub fn stop_limited(acceleration: f64, speed: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return acceleration.max(0.0);
    }
    acceleration.max(-speed / dt)
}

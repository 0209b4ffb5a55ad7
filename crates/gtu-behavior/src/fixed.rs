//! Constant-acceleration car following, for scripted vehicles and tests.

use crate::CarFollowingStrategy;

/// Ignores leaders and the speed limit: always `acceleration`.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedAcceleration {
    pub acceleration: f64,
    pub step_size:    f64,
}

impl FixedAcceleration {
    pub fn new(acceleration: f64, step_size: f64) -> Self {
        Self { acceleration, step_size }
    }

    /// Constant speed, re-evaluated every `step_size` seconds.
    pub fn cruise(step_size: f64) -> Self {
        Self::new(0.0, step_size)
    }
}

impl CarFollowingStrategy for FixedAcceleration {
    fn name(&self) -> &str {
        "fixed"
    }

    fn acceleration(&self, _speed: f64, _desired_speed: f64, _leader: Option<(f64, f64)>) -> f64 {
        self.acceleration
    }

    fn step_size(&self) -> f64 {
        self.step_size
    }

    fn max_safe_deceleration(&self) -> f64 {
        f64::INFINITY
    }

    fn minimum_headway(&self, _speed: f64, _leader_speed: f64) -> f64 {
        0.0
    }
}

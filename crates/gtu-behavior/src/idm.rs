//! IDM+ car following.

use crate::{BehaviorError, BehaviorResult, CarFollowingStrategy};

/// Gap floor keeping the interaction term finite at contact.
const MIN_GAP: f64 = 0.01;

/// The IDM+ model: the intelligent driver model with the free-road and
/// interaction terms combined by `min` instead of a sum.
///
/// ```text
/// s* = s0 + max(0, v·T + v·Δv / (2·√(a·b)))
/// a  = a_max · min(1 − (v/v0)⁴, 1 − (s*/s)²)
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdmPlus {
    /// Maximum acceleration, m/s².
    pub a:         f64,
    /// Comfortable deceleration, m/s².
    pub b:         f64,
    /// Standstill gap, m.
    pub s0:        f64,
    /// Desired time headway, s.
    pub t:         f64,
    /// Re-evaluation interval, s.
    pub step_size: f64,
}

impl Default for IdmPlus {
    fn default() -> Self {
        Self { a: 1.56, b: 2.09, s0: 3.0, t: 1.2, step_size: 0.5 }
    }
}

impl IdmPlus {
    pub fn new(a: f64, b: f64, s0: f64, t: f64, step_size: f64) -> BehaviorResult<Self> {
        for (name, value) in [("a", a), ("b", b), ("s0", s0), ("t", t), ("step_size", step_size)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(BehaviorError::InvalidParameter { name, value });
            }
        }
        Ok(Self { a, b, s0, t, step_size })
    }

    /// Desired dynamic gap `s*` at `speed` closing in at `dv` m/s.
    pub fn desired_gap(&self, speed: f64, dv: f64) -> f64 {
        self.s0 + (speed * self.t + speed * dv / (2.0 * (self.a * self.b).sqrt())).max(0.0)
    }
}

impl CarFollowingStrategy for IdmPlus {
    fn name(&self) -> &str {
        "IDM+"
    }

    fn acceleration(&self, speed: f64, desired_speed: f64, leader: Option<(f64, f64)>) -> f64 {
        let free = 1.0 - (speed / desired_speed).powi(4);
        let interaction = match leader {
            Some((gap, leader_speed)) => {
                let ratio = self.desired_gap(speed, speed - leader_speed) / gap.max(MIN_GAP);
                1.0 - ratio * ratio
            }
            None => f64::INFINITY,
        };
        self.a * free.min(interaction)
    }

    fn step_size(&self) -> f64 {
        self.step_size
    }

    fn max_safe_deceleration(&self) -> f64 {
        self.b
    }
}

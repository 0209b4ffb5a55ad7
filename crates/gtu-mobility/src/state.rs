//! Per-vehicle kinematic state.

use gtu_core::SimTime;

// ── GtuPhase ──────────────────────────────────────────────────────────────────

/// Where a vehicle is in its move cycle.
///
/// ```text
/// Scheduled ──(move fires)──▶ Evaluating ──▶ Committed ──(reschedule)──▶ Scheduled
///      │                          │
///      └────────(sink / removal / failure)──────▶ Destroyed
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum GtuPhase {
    #[default]
    Scheduled,
    Evaluating,
    Committed,
    Destroyed,
}

// ── Kinematics ────────────────────────────────────────────────────────────────

/// Constant-acceleration motion committed over
/// `[last_evaluation, next_evaluation]`.
///
/// Positions derived from this state are exact inside that interval and
/// extrapolated outside it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Kinematics {
    /// Speed at `last_evaluation`, m/s.
    pub speed:           f64,
    pub acceleration:    f64,
    pub last_evaluation: SimTime,
    pub next_evaluation: SimTime,
    /// Distance driven up to `last_evaluation`, m.
    pub odometer:        f64,
}

impl Kinematics {
    /// A vehicle at `speed`, evaluated at `now` and due again immediately.
    pub fn new(speed: f64, now: SimTime) -> Self {
        Self {
            speed,
            acceleration:    0.0,
            last_evaluation: now,
            next_evaluation: now,
            odometer:        0.0,
        }
    }

    /// Distance covered between `last_evaluation` and `when`.
    #[inline]
    pub fn delta_x(&self, when: SimTime) -> f64 {
        let dt = when.since(self.last_evaluation);
        self.speed * dt + 0.5 * self.acceleration * dt * dt
    }

    #[inline]
    pub fn speed_at(&self, when: SimTime) -> f64 {
        self.speed + self.acceleration * when.since(self.last_evaluation)
    }

    /// Distance to be covered over the whole committed interval.
    #[inline]
    pub fn planned_distance(&self) -> f64 {
        self.delta_x(self.next_evaluation)
    }

    /// Earliest time at which the vehicle will have covered `distance`
    /// metres since `last_evaluation`, or `None` if it never does.
    pub fn time_at_distance(&self, distance: f64) -> Option<SimTime> {
        if distance <= 0.0 {
            return Some(self.last_evaluation);
        }
        let disc = self.speed * self.speed + 2.0 * self.acceleration * distance;
        if disc < 0.0 {
            return None;
        }
        // 2d / (v + √disc) is the smaller positive root of ½at² + vt − d
        // for either sign of a and is stable as a → 0.
        let denom = self.speed + disc.sqrt();
        if denom <= 0.0 {
            return None;
        }
        Some(self.last_evaluation + 2.0 * distance / denom)
    }

    /// Start a new interval at `now` with `acceleration` until `valid_until`.
    pub fn advance(&mut self, now: SimTime, acceleration: f64, valid_until: SimTime) {
        self.odometer += self.delta_x(now);
        self.speed = self.speed_at(now);
        self.last_evaluation = now;
        self.next_evaluation = valid_until;
        self.acceleration = acceleration;
    }
}

//! Simulated time.
//!
//! # Design
//!
//! Vehicle kinematics are continuous: a move commits a constant acceleration
//! over `[last_evaluation, next_evaluation]` and lane crossings and sensor
//! firings happen at the exact solution of the motion equation inside that
//! interval.  Time is therefore a continuous `f64` number of seconds since
//! the start of the run rather than an integer tick.
//!
//! `SimTime` implements a *total* order (`f64::total_cmp`) so it can key a
//! `BTreeMap` event queue.  Values are expected to be finite; `NaN` sorts
//! after every finite time and is never produced by the simulator.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

// ── SimTime ──────────────────────────────────────────────────────────────────

/// An absolute simulated time in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn from_secs(secs: f64) -> Self {
        SimTime(secs)
    }

    #[inline]
    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Seconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[inline]
    pub fn since(self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    /// The largest representable time strictly before `self`.
    ///
    /// Used to clamp trigger times that would otherwise land exactly on the
    /// next evaluation boundary through rounding.
    #[inline]
    pub fn prev(self) -> SimTime {
        SimTime(self.0 - ulp(self.0))
    }

    #[inline]
    pub fn max(self, other: SimTime) -> SimTime {
        if self >= other { self } else { other }
    }

    #[inline]
    pub fn min(self, other: SimTime) -> SimTime {
        if self <= other { self } else { other }
    }
}

/// Distance to the next representable `f64` above `x.abs()`.
fn ulp(x: f64) -> f64 {
    let a = x.abs();
    if a == 0.0 {
        return f64::from_bits(1);
    }
    f64::from_bits(a.to_bits() + 1) - a
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<f64> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: f64) -> SimTime {
        SimTime(self.0 + rhs)
    }
}

impl Sub for SimTime {
    type Output = f64;
    #[inline]
    fn sub(self, rhs: SimTime) -> f64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

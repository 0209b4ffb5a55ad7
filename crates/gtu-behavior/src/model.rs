//! The strategy traits: the extension points for driving behaviour.

use gtu_core::{GtuId, SimTime, VehicleClass};

use crate::{AccelerationStep, Gap, LaneIncentives, MovementDecision, Neighbor};

// ── GtuView ───────────────────────────────────────────────────────────────────

/// Read-only snapshot of the deciding vehicle, valid at `now`.
///
/// Built by the decision protocol once per evaluation.  The car-following
/// strategy travels with the view so that lane-change strategies can
/// evaluate the acceleration the subject would have in another lane.
#[derive(Clone, Copy)]
pub struct GtuView<'a> {
    pub id:            GtuId,
    pub class:         VehicleClass,
    pub length:        f64,
    pub speed:         f64,
    pub max_speed:     f64,
    pub now:           SimTime,
    pub car_following: &'a dyn CarFollowingStrategy,
}

impl GtuView<'_> {
    /// Speed the vehicle aims for under `speed_limit`.
    #[inline]
    pub fn desired_speed(&self, speed_limit: f64) -> f64 {
        speed_limit.min(self.max_speed)
    }
}

// ── CarFollowingStrategy ──────────────────────────────────────────────────────

/// Longitudinal behaviour.
///
/// Implementors supply the single-leader kernel
/// [`acceleration`](Self::acceleration); the multi-leader step and the
/// minimum safe headway are derived from it.
///
/// Strategies are shared between vehicles (`Arc<dyn CarFollowingStrategy>`)
/// and hold no per-vehicle state.
pub trait CarFollowingStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Acceleration at `speed` with desired speed `desired_speed`, following
    /// `leader = (net gap, leader speed)` or driving freely when `None`.
    fn acceleration(&self, speed: f64, desired_speed: f64, leader: Option<(f64, f64)>) -> f64;

    /// Seconds between re-evaluations.
    fn step_size(&self) -> f64;

    /// Largest deceleration (positive m/s²) considered acceptable to impose
    /// on oneself or on a new follower.
    fn max_safe_deceleration(&self) -> f64;

    /// Acceleration constrained by every leader in `leaders`.  Entries that
    /// are not ahead of the subject are ignored.
    fn compute_acceleration(
        &self,
        subject:     &GtuView<'_>,
        leaders:     &[Neighbor],
        speed_limit: f64,
    ) -> AccelerationStep {
        let v0 = subject.desired_speed(speed_limit);
        let acceleration = leaders
            .iter()
            .filter_map(|n| match n.gap {
                Gap::Ahead(d) => Some(self.acceleration(subject.speed, v0, Some((d, n.speed)))),
                _ => None,
            })
            .fold(self.acceleration(subject.speed, v0, None), f64::min);
        AccelerationStep { acceleration, valid_until: subject.now + self.step_size() }
    }

    /// Smallest net gap behind a leader at `leader_speed` that a vehicle
    /// cruising at `speed` accepts without braking harder than
    /// [`max_safe_deceleration`](Self::max_safe_deceleration).
    fn minimum_headway(&self, speed: f64, leader_speed: f64) -> f64 {
        const MAX_GAP: f64 = 250.0;
        const PRECISION: f64 = 0.01;
        let floor = -self.max_safe_deceleration();
        let v0 = speed.max(1.0);
        let acc = |gap: f64| self.acceleration(speed, v0, Some((gap, leader_speed)));
        if acc(MAX_GAP) < floor {
            return MAX_GAP;
        }
        let (mut lo, mut hi) = (0.0, MAX_GAP);
        while hi - lo > PRECISION {
            let mid = 0.5 * (lo + hi);
            if acc(mid) >= floor { hi = mid } else { lo = mid }
        }
        hi
    }
}

// ── LaneChangeStrategy ────────────────────────────────────────────────────────

/// Lateral behaviour: picks an acceleration and an optional lane change.
///
/// `right` / `left` are `None` when no accessible lane exists on that side.
/// Neighbour lists hold leaders ([`Gap::Ahead`]), followers
/// ([`Gap::Behind`]), and, for adjacent lanes, vehicles alongside
/// ([`Gap::Parallel`]).
pub trait LaneChangeStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn compute_lane_change_and_acceleration(
        &self,
        subject:     &GtuView<'_>,
        same_lane:   &[Neighbor],
        right:       Option<&[Neighbor]>,
        left:        Option<&[Neighbor]>,
        speed_limit: f64,
        incentives:  LaneIncentives,
    ) -> MovementDecision;
}

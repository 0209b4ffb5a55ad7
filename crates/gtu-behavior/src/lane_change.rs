//! Reference lane-change strategies.

use gtu_core::LateralDirection;

use crate::{
    stop_limited, Gap, GtuView, LaneChangeStrategy, LaneIncentives, MovementDecision, Neighbor,
};

// ── EgoisticLaneChange ────────────────────────────────────────────────────────

/// Changes lane when the acceleration the subject would have in the
/// adjacent lane, plus that lane's incentive, beats the current lane's.
///
/// A side is only considered when the change is safe: nobody alongside,
/// and neither the subject nor the new follower has to brake harder than
/// the car-following strategy's maximum safe deceleration.  Ties go to the
/// current lane, then to the right.
///
/// While staying in a lane with a finite negative incentive (a lane that
/// must be left within some distance), the subject brakes at least that
/// hard so it comes to a stop at the point of no return.  If it would stop
/// within the step, the decision ends at the moment it stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct EgoisticLaneChange;

/// Shortest interval a stopping decision is cut down to.
const MIN_STOP_INTERVAL: f64 = 0.01;

impl EgoisticLaneChange {
    /// Acceleration in the lane described by `traffic`, or `None` if moving
    /// there is unsafe.
    fn side_acceleration(subject: &GtuView<'_>, traffic: &[Neighbor], speed_limit: f64) -> Option<f64> {
        let cf = subject.car_following;
        let limit = -cf.max_safe_deceleration();
        if traffic.iter().any(Neighbor::is_parallel) {
            return None;
        }
        let own = cf.compute_acceleration(subject, traffic, speed_limit).acceleration;
        if own < limit {
            return None;
        }
        let follower_ok = traffic.iter().all(|n| match n.gap {
            Gap::Behind(d) => cf.acceleration(n.speed, speed_limit, Some((d, subject.speed))) >= limit,
            _ => true,
        });
        follower_ok.then_some(own)
    }
}

impl LaneChangeStrategy for EgoisticLaneChange {
    fn name(&self) -> &str {
        "egoistic"
    }

    fn compute_lane_change_and_acceleration(
        &self,
        subject:     &GtuView<'_>,
        same_lane:   &[Neighbor],
        right:       Option<&[Neighbor]>,
        left:        Option<&[Neighbor]>,
        speed_limit: f64,
        incentives:  LaneIncentives,
    ) -> MovementDecision {
        let straight = subject.car_following.compute_acceleration(subject, same_lane, speed_limit);
        let dt = straight.valid_until.since(subject.now);

        let mut choice: Option<(LateralDirection, f64)> = None;
        let mut best = straight.acceleration + incentives.current;
        for (direction, traffic) in [(LateralDirection::Right, right), (LateralDirection::Left, left)] {
            let Some(traffic) = traffic else { continue };
            if incentives.is_forbidden(direction) {
                continue;
            }
            let Some(acc) = Self::side_acceleration(subject, traffic, speed_limit) else { continue };
            let value = acc + incentives.side(direction);
            if value > best {
                best = value;
                choice = Some((direction, acc));
            }
        }

        let mut valid_until = straight.valid_until;
        let (acceleration, lane_change) = match choice {
            Some((direction, acc)) => (acc, Some(direction)),
            None if incentives.current < 0.0 && incentives.current.is_finite() => {
                let acc = straight.acceleration.min(incentives.current);
                if acc < 0.0 && subject.speed > 0.0 {
                    let stop = subject.speed / -acc;
                    if stop < dt {
                        valid_until = subject.now + stop.max(MIN_STOP_INTERVAL);
                    }
                }
                (acc, None)
            }
            None => (straight.acceleration, None),
        };
        MovementDecision {
            acceleration: stop_limited(acceleration, subject.speed, valid_until.since(subject.now)),
            valid_until,
            lane_change,
        }
    }
}

// ── NoLaneChange ──────────────────────────────────────────────────────────────

/// Never changes lane; pure car following.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLaneChange;

impl LaneChangeStrategy for NoLaneChange {
    fn name(&self) -> &str {
        "none"
    }

    fn compute_lane_change_and_acceleration(
        &self,
        subject:     &GtuView<'_>,
        same_lane:   &[Neighbor],
        _right:      Option<&[Neighbor]>,
        _left:       Option<&[Neighbor]>,
        speed_limit: f64,
        _incentives: LaneIncentives,
    ) -> MovementDecision {
        let mut step = subject.car_following.compute_acceleration(subject, same_lane, speed_limit);
        step.acceleration = stop_limited(step.acceleration, subject.speed, step.valid_until.since(subject.now));
        MovementDecision::keep_lane(step)
    }
}

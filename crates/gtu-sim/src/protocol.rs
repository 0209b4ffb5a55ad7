//! The Decision Protocol: everything a vehicle considers before it moves.
//!
//! # Steps
//!
//! ```text
//! 1. Route suitability for {left, current, right}      (RouteNavigator)
//! 2. Lane incentives from route and lane-drop urgency  (lane_incentives)
//! 3. Neighbour traffic: own lanes and both sides       (headway search)
//! 4. LaneChangeStrategy → MovementDecision
//! ```
//!
//! Incentives are accelerations.  A lane that must be left within `d`
//! metres at speed `v` gets `−v²/(2d)`, the deceleration that would stop
//! the vehicle at that point; a lane that must not be used gets
//! [`LaneIncentives::FORBIDDEN`].

use gtu_behavior::{LaneIncentives, MovementDecision, Neighbor};
use gtu_core::{LaneId, LateralDirection, RelativePosition, SimConfig, SimTime, VehicleClass};
use gtu_mobility::{Gtu, MobilityError, MobilityResult, Traffic};
use gtu_network::{LaneNetwork, SensorKind, Suitability};

/// Incentives at or below this value mark a side as unusable for the
/// lane-drop check.
const UNUSABLE_INCENTIVE: f64 = -10.0;

/// A vehicle braking for the end of its lane aims to stop this far short
/// of it.
const LANE_END_MARGIN: f64 = 1.0;

/// Shortest stopping distance used for a lane-end urgency.
const MIN_STOP_DISTANCE: f64 = 0.1;

/// Urgency that keeps a vehicle standing once it is within the margin.
const LANE_END_HOLD: f64 = -1.0;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Run the full protocol for `gtu` at `now`.
pub fn decide(
    network: &LaneNetwork,
    traffic: &Traffic,
    gtu:     &Gtu,
    config:  &SimConfig,
    now:     SimTime,
) -> MobilityResult<MovementDecision> {
    let lane = gtu.first_compatible_lane(network)?;
    let speed_limit = gtu.speed_limit(network);
    let incentives = lane_incentives(network, gtu, config, now)?;

    let forward = config.forward_headway_distance;
    let backward = config.backward_headway_distance;
    let same_lane = traffic.same_lane_traffic(network, gtu, forward, backward, now)?;
    let side = |direction: LateralDirection| -> MobilityResult<Option<Vec<Neighbor>>> {
        match network.best_accessible_adjacent_lane(lane, direction, gtu.class) {
            Some(adjacent) => {
                Ok(Some(traffic.collect_neighbor_lane_traffic(network, gtu, adjacent, forward, backward, now)?))
            }
            None => Ok(None),
        }
    };
    let right = side(LateralDirection::Right)?;
    let left = side(LateralDirection::Left)?;

    let view = gtu.view(now);
    let decision = gtu.lane_change.compute_lane_change_and_acceleration(
        &view,
        &same_lane,
        right.as_deref(),
        left.as_deref(),
        speed_limit,
        incentives,
    );
    log::trace!(
        "{} at {now}: incentives {incentives:?} → a = {:.3}, change {:?}",
        gtu.id,
        decision.acceleration,
        decision.lane_change
    );
    Ok(decision)
}

// ── Incentives ────────────────────────────────────────────────────────────────

/// The lanes a decision is made between: the first compatible occupied
/// lane and the best accessible lane on either side of it.
#[derive(Copy, Clone, Debug)]
struct Choice {
    left:    Option<LaneId>,
    current: LaneId,
    right:   Option<LaneId>,
}

impl Choice {
    fn side(&self, direction: LateralDirection) -> Option<LaneId> {
        match direction {
            LateralDirection::Left  => self.left,
            LateralDirection::Right => self.right,
        }
    }
}

/// Route- and lane-drop-based incentives for `gtu` at `now`.
///
/// A side without an accessible lane is forbidden.  While the current lane
/// suits the route, every neighbour that suits it too gets the
/// keep-to-the-preferred-side default, and lane ends are checked on top.
pub fn lane_incentives(
    network: &LaneNetwork,
    gtu:     &Gtu,
    config:  &SimConfig,
    now:     SimTime,
) -> MobilityResult<LaneIncentives> {
    let current = gtu.first_compatible_lane(network)?;
    let choice = Choice {
        left:    network.best_accessible_adjacent_lane(current, LateralDirection::Left, gtu.class),
        current,
        right:   network.best_accessible_adjacent_lane(current, LateralDirection::Right, gtu.class),
    };
    let speed = gtu.speed_at(now);
    let horizon = config.suitability_time_horizon;
    let left = route_suitability(network, gtu, choice.left, horizon, now)?;
    let middle = route_suitability(network, gtu, Some(current), horizon, now)?;
    let right = route_suitability(network, gtu, choice.right, horizon, now)?;

    if !middle.is_no_change_needed() {
        return Ok(LaneIncentives::new(incentive(left, speed), incentive(middle, speed), incentive(right, speed)));
    }
    let defaults = default_incentives(config);
    let side = |direction: LateralDirection, suitability: Suitability| match suitability {
        Suitability::NoChangeNeeded => defaults.side(direction),
        other => incentive(other, speed),
    };
    let incentives = LaneIncentives::new(
        side(LateralDirection::Left, left),
        config.incentives.stay,
        side(LateralDirection::Right, right),
    );
    check_lane_drops(network, gtu, config, &choice, incentives, now)
}

/// Defaults when nothing forces a lane change: a small bias to stay and a
/// keep-to-the-preferred-side bias between the neighbours.
fn default_incentives(config: &SimConfig) -> LaneIncentives {
    let d = config.incentives;
    match config.preferred_direction {
        LateralDirection::Right => LaneIncentives::new(d.non_preferred, d.stay, d.preferred),
        LateralDirection::Left  => LaneIncentives::new(d.preferred, d.stay, d.non_preferred),
    }
}

/// Acceleration-valued incentive for a suitability at `speed`.
pub fn incentive(suitability: Suitability, speed: f64) -> f64 {
    match suitability {
        Suitability::NoChangeNeeded => 0.0,
        Suitability::MustLeaveNow => LaneIncentives::FORBIDDEN,
        Suitability::ChangeWithin(d) if d <= 0.0 => LaneIncentives::FORBIDDEN,
        Suitability::ChangeWithin(d) => -speed * speed / (2.0 * d),
    }
}

/// Deceleration that stops a vehicle at `speed` [`LANE_END_MARGIN`] short
/// of a lane end `distance` ahead.  Always finite, and negative within the
/// margin even when standing still.
pub fn lane_end_urgency(distance: f64, speed: f64) -> f64 {
    let d = (distance - LANE_END_MARGIN).max(MIN_STOP_DISTANCE);
    let urgency = -speed * speed / (2.0 * d);
    if distance <= LANE_END_MARGIN { urgency.min(LANE_END_HOLD) } else { urgency }
}

/// Route suitability of `lane`; a missing lane must be left now.
fn route_suitability(
    network: &LaneNetwork,
    gtu:     &Gtu,
    lane:    Option<LaneId>,
    horizon: f64,
    now:     SimTime,
) -> MobilityResult<Suitability> {
    let Some(lane) = lane else {
        return Ok(Suitability::MustLeaveNow);
    };
    let position = gtu.projected_position(network, lane, RelativePosition::Reference, now)?;
    gtu.navigator()
        .suitability(network, lane, position, gtu.class, horizon)
        .map_err(|e| MobilityError::RoutingFailure { gtu: gtu.id, detail: format!("lane {lane}: {e}") })
}

// ── Lane drops ────────────────────────────────────────────────────────────────

/// Adjust `incentives` for physical lane ends within the time horizon.
///
/// If the current lane ends and a neighbour does not end sooner, that
/// neighbour becomes the preferred lane and the other side is forbidden.
/// Staying in an ending lane costs at least the deceleration needed to
/// stop before its end, so a vehicle whose merge is blocked waits there.
fn check_lane_drops(
    network:    &LaneNetwork,
    gtu:        &Gtu,
    config:     &SimConfig,
    choice:     &Choice,
    incentives: LaneIncentives,
    now:        SimTime,
) -> MobilityResult<LaneIncentives> {
    let horizon = config.suitability_time_horizon;
    let drop_on = |lane: LaneId| -> MobilityResult<Suitability> {
        let position = gtu.projected_position(network, lane, RelativePosition::Reference, now)?;
        Ok(lane_drop_suitability(network, lane, position, gtu.class, horizon))
    };
    let mut sides = [Suitability::MustLeaveNow; 2];
    for (k, direction) in [LateralDirection::Left, LateralDirection::Right].into_iter().enumerate() {
        let value = incentives.side(direction);
        sides[k] = match choice.side(direction) {
            Some(lane) if !(value.is_nan() || value < UNUSABLE_INCENTIVE) => drop_on(lane)?,
            _ => Suitability::MustLeaveNow,
        };
    }
    let [left, right] = sides;
    let current = drop_on(choice.current)?;
    let speed = gtu.speed_at(now);

    let Suitability::ChangeWithin(distance) = current else {
        // Neighbours that end get their own urgency.
        let mut adjusted = incentives;
        for (direction, drop) in [(LateralDirection::Left, left), (LateralDirection::Right, right)] {
            if matches!(drop, Suitability::ChangeWithin(_)) {
                adjusted.set_side(direction, incentives.side(direction).min(incentive(drop, speed)));
            }
        }
        return Ok(adjusted);
    };

    let urgency = lane_end_urgency(distance, speed);
    let escapes = |s: Suitability| s != Suitability::MustLeaveNow && distance <= s.distance();
    let escape = match (escapes(left), escapes(right)) {
        (true, true) => Some(config.preferred_direction),
        (true, false) => Some(LateralDirection::Left),
        (false, true) => Some(LateralDirection::Right),
        (false, false) => None,
    };
    let Some(direction) = escape else {
        return Ok(LaneIncentives::new(incentive(left, speed), urgency, incentive(right, speed)));
    };
    let d = config.incentives;
    let mut escaped = LaneIncentives::new(LaneIncentives::FORBIDDEN, d.non_preferred.min(urgency), LaneIncentives::FORBIDDEN);
    escaped.set_side(direction, d.preferred);
    Ok(escaped)
}

/// How far `lane` can be followed from `position` before it physically
/// ends, looking `horizon` seconds ahead at the speed limits.
///
/// Single continuations are followed; a diverge or a sink counts as the
/// lane continuing.
pub fn lane_drop_suitability(
    network:  &LaneNetwork,
    lane:     LaneId,
    position: f64,
    class:    VehicleClass,
    horizon:  f64,
) -> Suitability {
    let mut lane = lane;
    let mut from = position;
    let mut remaining = network.lane(lane).length - position;
    let mut spare = horizon - remaining / network.speed_limit(lane, class);
    while spare >= 0.0 {
        let sink_ahead = network
            .lane(lane)
            .sensors
            .iter()
            .map(|&s| network.sensor(s))
            .any(|s| s.kind == SensorKind::Sink && s.position >= from);
        if sink_ahead {
            return Suitability::NoChangeNeeded;
        }
        let next: Vec<LaneId> = network.next_lanes(lane, class).collect();
        match next.as_slice() {
            [] => return Suitability::ChangeWithin(remaining),
            [only] => lane = *only,
            _ => return Suitability::NoChangeNeeded,
        }
        from = 0.0;
        let length = network.lane(lane).length;
        spare -= length / network.speed_limit(lane, class);
        remaining += length;
    }
    Suitability::NoChangeNeeded
}

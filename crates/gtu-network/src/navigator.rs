//! Route navigation: lane suitability and branch resolution.
//!
//! A [`RouteNavigator`] answers two questions for a vehicle:
//!
//! - which node must the vehicle head for after the end of its current
//!   link (used to pick a successor lane at a diverge), and
//! - how long a given lane can be followed before a lane change becomes
//!   mandatory to stay on the route ([`Suitability`]).

use gtu_core::{LaneId, LateralDirection, LinkId, NodeId, VehicleClass};

use crate::{LaneNetwork, NetworkError, NetworkResult};

// ── Suitability ───────────────────────────────────────────────────────────────

/// Three-way outcome of a suitability query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Suitability {
    /// The lane reaches the destination, or extends beyond the look-ahead
    /// horizon, without a forced lane change.
    NoChangeNeeded,
    /// The lane must be left within this many metres.
    ChangeWithin(f64),
    /// The lane is unusable: a dead end for the route, or not available.
    MustLeaveNow,
}

impl Suitability {
    /// Distance-like value for comparisons: `∞`, `d`, or `0`.
    #[inline]
    pub fn distance(self) -> f64 {
        match self {
            Suitability::NoChangeNeeded  => f64::INFINITY,
            Suitability::ChangeWithin(d) => d,
            Suitability::MustLeaveNow    => 0.0,
        }
    }

    /// Extend a downstream result by the distance `d` travelled to reach it.
    pub fn plus(self, d: f64) -> Suitability {
        match self {
            Suitability::NoChangeNeeded  => Suitability::NoChangeNeeded,
            Suitability::ChangeWithin(x) => Suitability::ChangeWithin(x + d),
            Suitability::MustLeaveNow    => Suitability::ChangeWithin(d),
        }
    }

    #[inline]
    pub fn is_no_change_needed(self) -> bool {
        matches!(self, Suitability::NoChangeNeeded)
    }
}

// ── RouteNavigator trait ──────────────────────────────────────────────────────

/// Per-vehicle route state.  Owned by the vehicle; mutated only when the
/// vehicle enters a lane on a new link.
pub trait RouteNavigator: Send {
    /// The node at the end of the link `links` past the current one, or
    /// `None` if the route does not reach that far.
    fn node_beyond(&self, links: usize) -> Option<NodeId>;

    /// The node the vehicle must reach at the end of the link *after* its
    /// current one, or `None` if there is no route beyond the current link.
    fn next_node_to_visit(&self) -> Option<NodeId> {
        self.node_beyond(1)
    }

    /// Advance past one node; called when the vehicle enters a new link.
    fn visit_next_node(&mut self);

    /// How far `lane` can be followed from `position` before a lane change is
    /// mandatory for the route, looking at most `time_horizon` seconds ahead
    /// at the lane speed limits.
    fn suitability(
        &self,
        network:      &LaneNetwork,
        lane:         LaneId,
        position:     f64,
        class:        VehicleClass,
        time_horizon: f64,
    ) -> NetworkResult<Suitability>;
}

// ── FreeNavigator ─────────────────────────────────────────────────────────────

/// A navigator without a route.  Every lane is suitable; diverges cannot be
/// resolved, so a free vehicle must only drive through networks without
/// diverges (ring roads, corridors).
#[derive(Debug, Default, Clone, Copy)]
pub struct FreeNavigator;

impl RouteNavigator for FreeNavigator {
    fn node_beyond(&self, _links: usize) -> Option<NodeId> {
        None
    }

    fn visit_next_node(&mut self) {}

    fn suitability(
        &self,
        _network:      &LaneNetwork,
        _lane:         LaneId,
        _position:     f64,
        _class:        VehicleClass,
        _time_horizon: f64,
    ) -> NetworkResult<Suitability> {
        Ok(Suitability::NoChangeNeeded)
    }
}

// ── NodeRouteNavigator ────────────────────────────────────────────────────────

/// Follows a route given as a node sequence.
///
/// `current` is the route index of the start node of the link the vehicle
/// is driving on.
#[derive(Debug, Clone)]
pub struct NodeRouteNavigator {
    nodes:   Vec<NodeId>,
    current: usize,
}

impl NodeRouteNavigator {
    /// A navigator for a vehicle starting on the first link of `nodes`.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self { nodes, current: 0 }
    }

    /// A navigator for a vehicle starting on the link that leaves `start`.
    pub fn starting_at(nodes: Vec<NodeId>, start: NodeId) -> NetworkResult<Self> {
        let current = nodes
            .iter()
            .position(|&n| n == start)
            .ok_or_else(|| NetworkError::Route(format!("node {start} is not on the route")))?;
        Ok(Self { nodes, current })
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Route index of the end node of `link`, searching from the current
    /// position so that routes revisiting a node resolve to the next visit.
    fn locate(&self, network: &LaneNetwork, link: LinkId) -> NetworkResult<usize> {
        let l = network.link(link);
        let from = self.current + 1;
        let exact = (from..self.nodes.len()).find(|&k| self.nodes[k] == l.to && self.nodes[k - 1] == l.from);
        exact
            .or_else(|| (self.current..self.nodes.len()).find(|&k| self.nodes[k] == l.to))
            .ok_or_else(|| NetworkError::Route(format!("link {link} is not on the route")))
    }

    /// The route link leaving `nodes[end_idx]` and the route index of its
    /// end node; `None` at the destination.
    fn step(&self, network: &LaneNetwork, end_idx: usize, class: VehicleClass) -> NetworkResult<Option<(LinkId, usize)>> {
        let Some(&target) = self.nodes.get(end_idx + 1) else {
            return Ok(None);
        };
        let node = self.nodes[end_idx];
        network
            .out_links(node)
            .iter()
            .copied()
            .find(|&l| network.link(l).to == target && network.compatible_lanes(l, class).next().is_some())
            .map(|l| Some((l, end_idx + 1)))
            .ok_or_else(|| NetworkError::Route(format!("no usable link from {node} to {target}")))
    }

    fn walk(
        &self,
        network:  &LaneNetwork,
        lane:     LaneId,
        position: f64,
        class:    VehicleClass,
        horizon:  f64,
        end_idx:  usize,
    ) -> NetworkResult<Suitability> {
        let mut remaining = network.lane(lane).length - position;
        let mut spare = horizon - remaining / network.speed_limit(lane, class);
        let mut current_lane = lane;
        let mut link_before = network.link_of(lane);
        let mut end_idx = end_idx;

        loop {
            if spare <= 0.0 {
                return Ok(Suitability::NoChangeNeeded);
            }
            match network.compatible_lanes(link_before, class).count() {
                0 => return Err(NetworkError::Route(format!("no compatible lanes on link {link_before}"))),
                1 => return Ok(Suitability::NoChangeNeeded),
                _ => {}
            }
            let branching = network.out_links(network.link(link_before).to).len();
            if branching == 0 {
                return Ok(Suitability::NoChangeNeeded);
            }
            let Some((next_link, next_idx)) = self.step(network, end_idx, class)? else {
                return Ok(Suitability::NoChangeNeeded);
            };
            if branching > 1 {
                return self.at_branch(network, current_lane, link_before, next_link, next_idx, remaining, spare, class);
            }

            remaining += network.link(next_link).length;
            if network.next_lanes(current_lane, class).next().is_none() {
                // Lane drop: a forced change that the route does not control.
                current_lane = [LateralDirection::Right, LateralDirection::Left]
                    .into_iter()
                    .find_map(|d| {
                        network
                            .accessible_adjacent_lanes(current_lane, d, class)
                            .find(|&a| network.next_lanes(a, class).next().is_some())
                    })
                    .ok_or_else(|| {
                        NetworkError::Route(format!("lane {current_lane} ends without a continuing adjacent lane"))
                    })?;
            }
            let Some(next) = network.next_lanes(current_lane, class).next() else {
                return Ok(Suitability::NoChangeNeeded);
            };
            current_lane = next;
            spare -= network.lane(current_lane).length / network.speed_limit(current_lane, class);
            link_before = next_link;
            end_idx = next_idx;
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn at_branch(
        &self,
        network:      &LaneNetwork,
        current_lane: LaneId,
        link_before:  LinkId,
        link_after:   LinkId,
        after_idx:    usize,
        remaining:    f64,
        spare:        f64,
        class:        VehicleClass,
    ) -> NetworkResult<Suitability> {
        let mut suitable: Vec<(LaneId, Suitability)> = Vec::new();
        for l in network.compatible_lanes(link_before, class) {
            for c in network.next_lanes(l, class) {
                if network.link_of(c) != link_after {
                    continue;
                }
                let value = self.walk(network, c, 0.0, class, spare, after_idx)?.plus(remaining);
                match suitable.iter_mut().find(|(k, _)| *k == l) {
                    Some((_, v)) if value.distance() <= v.distance() => *v = value,
                    Some(_) => {}
                    None => suitable.push((l, value)),
                }
            }
        }
        if suitable.is_empty() {
            return Err(NetworkError::Route(format!("no lane on link {link_before} continues onto link {link_after}")));
        }
        if let Some(&(_, s)) = suitable.iter().find(|(l, _)| *l == current_lane) {
            return Ok(s);
        }

        let total = network.compatible_lanes(network.link_of(current_lane), class).count();
        let left = with_lane_changes(network, current_lane, remaining, &suitable, total, LateralDirection::Left, class);
        let right = with_lane_changes(network, current_lane, remaining, &suitable, total, LateralDirection::Right, class);
        let best = if left.distance() >= right.distance() { left } else { right };
        if best == Suitability::MustLeaveNow {
            return Err(NetworkError::Route(format!(
                "no lane change from lane {current_lane} reaches a lane continuing onto link {link_after}"
            )));
        }
        Ok(best)
    }
}

/// Suitability of a lane that needs lane changes in `direction` to reach a
/// lane continuing the route.  Decreases linearly with the number of changes
/// so the vehicle is coached towards the nearest suitable lane.
fn with_lane_changes(
    network:   &LaneNetwork,
    start:     LaneId,
    remaining: f64,
    suitable:  &[(LaneId, Suitability)],
    total:     usize,
    direction: LateralDirection,
    class:     VehicleClass,
) -> Suitability {
    let mut used = 0usize;
    let mut lane = start;
    let target = loop {
        used += 1;
        let Some(next) = network.accessible_adjacent_lanes(lane, direction, class).next() else {
            return Suitability::MustLeaveNow;
        };
        lane = next;
        if let Some(&(_, s)) = suitable.iter().find(|(l, _)| *l == lane) {
            break s;
        }
    };
    let fraction = if target.is_no_change_needed() { 0.0 } else { 0.5 };
    let not_suitable = total.saturating_sub(suitable.len()) as f64;
    let used = used as f64;
    Suitability::ChangeWithin(remaining * (not_suitable - used + 1.0 + fraction) / (not_suitable + fraction))
}

impl RouteNavigator for NodeRouteNavigator {
    fn node_beyond(&self, links: usize) -> Option<NodeId> {
        self.nodes.get(self.current + 1 + links).copied()
    }

    fn visit_next_node(&mut self) {
        if self.current + 1 < self.nodes.len() {
            self.current += 1;
        }
    }

    fn suitability(
        &self,
        network:      &LaneNetwork,
        lane:         LaneId,
        position:     f64,
        class:        VehicleClass,
        time_horizon: f64,
    ) -> NetworkResult<Suitability> {
        let end_idx = self.locate(network, network.link_of(lane))?;
        self.walk(network, lane, position, class, time_horizon, end_idx)
    }
}

//! The Headway Search Engine.
//!
//! # Algorithm
//!
//! A search walks the lane graph from a start position, forward through
//! successor lanes or backward through predecessor lanes, and reports the
//! nearest other vehicle within a distance budget.
//!
//! The walk is a best-first worklist ordered by the distance already
//! traversed, with a per-query visited set, so ring roads and other cycles
//! terminate: every lane is scanned at most once, plus once more for the
//! part of the start lane behind (forward) or ahead of (backward) the start
//! position when the walk comes back around to it.  A lane is only expanded
//! when nothing was found on it, and the walk stops as soon as the best
//! result so far is nearer than anything left in the worklist.
//!
//! Forward and backward searches follow every class-compatible successor or
//! predecessor; the route is not consulted.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use gtu_behavior::{Gap, HeadwayResult, Neighbor};
use gtu_core::{GtuId, LaneId, LateralDirection, RelativePosition, SimTime, VehicleClass};
use gtu_network::LaneNetwork;
use rustc_hash::FxHashSet;

use crate::{Gtu, MobilityResult, Traffic};

// ── Search parameters ─────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchDirection {
    Forward,
    Backward,
}

/// One nearest-vehicle query.
#[derive(Copy, Clone, Debug)]
pub struct HeadwayQuery {
    pub lane:      LaneId,
    /// Position on `lane` the distance is measured from.
    pub start:     f64,
    /// Largest distance that may be reported, m.
    pub budget:    f64,
    pub when:      SimTime,
    /// Class whose lane connectivity is followed.
    pub class:     VehicleClass,
    pub direction: SearchDirection,
    /// Never reported (usually the searching vehicle).
    pub exclude:   GtuId,
}

// ── Worklist entry ────────────────────────────────────────────────────────────

struct Entry {
    traversed: f64,
    lane:      LaneId,
    start:     f64,
    /// Candidates must lie short of this point: below it going forward,
    /// at or above it going backward.
    bound:     f64,
    wrapped:   bool,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the least traversed entry first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .traversed
            .total_cmp(&self.traversed)
            .then_with(|| other.lane.cmp(&self.lane))
            .then_with(|| other.wrapped.cmp(&self.wrapped))
    }
}

// ── Search core ───────────────────────────────────────────────────────────────

impl Traffic {
    /// Nearest vehicle for `query`, optionally only `target`.
    pub fn search(
        &self,
        network: &LaneNetwork,
        query:   &HeadwayQuery,
        target:  Option<GtuId>,
    ) -> MobilityResult<HeadwayResult> {
        let forward = query.direction == SearchDirection::Forward;
        let mut heap = BinaryHeap::new();
        let mut visited: FxHashSet<(LaneId, bool)> = FxHashSet::default();
        heap.push(Entry {
            traversed: 0.0,
            lane:      query.lane,
            start:     query.start,
            bound:     if forward { f64::INFINITY } else { f64::NEG_INFINITY },
            wrapped:   false,
        });

        let mut best = HeadwayResult::NoneFound;
        while let Some(entry) = heap.pop() {
            if best.distance().is_some_and(|d| d <= entry.traversed) {
                break;
            }
            if !visited.insert((entry.lane, entry.wrapped)) {
                continue;
            }

            let found = self.scan_lane(network, query, target, &entry)?;
            if found.is_found() {
                best = best.nearer(found);
                continue;
            }
            if entry.wrapped {
                continue;
            }

            let lane = network.lane(entry.lane);
            let reach = if forward { entry.traversed + lane.length - entry.start } else { entry.traversed + entry.start };
            if reach >= query.budget {
                continue;
            }
            let neighbours: Vec<LaneId> = if forward {
                network.next_lanes(entry.lane, query.class).collect()
            } else {
                network.prev_lanes(entry.lane, query.class).collect()
            };
            for next in neighbours {
                let wraps = next == query.lane;
                let start = if forward { 0.0 } else { network.lane(next).length };
                heap.push(Entry {
                    traversed: reach,
                    lane:      next,
                    start,
                    bound:     match (wraps, forward) {
                        (true, _) => query.start,
                        (false, true) => f64::INFINITY,
                        (false, false) => f64::NEG_INFINITY,
                    },
                    wrapped:   wraps,
                });
            }
        }
        Ok(best)
    }

    /// Nearest candidate on one lane of the walk.
    fn scan_lane(
        &self,
        network: &LaneNetwork,
        query:   &HeadwayQuery,
        target:  Option<GtuId>,
        entry:   &Entry,
    ) -> MobilityResult<HeadwayResult> {
        let mut best = HeadwayResult::NoneFound;
        for &other in self.occupancy.on(entry.lane) {
            if other == query.exclude || target.is_some_and(|t| t != other) {
                continue;
            }
            let gtu = self.gtus.get(other)?;
            let distance = match query.direction {
                SearchDirection::Forward => {
                    let rear = gtu.position(network, entry.lane, RelativePosition::Rear, query.when)?;
                    if rear < entry.start || rear >= entry.bound {
                        continue;
                    }
                    entry.traversed + rear - entry.start
                }
                SearchDirection::Backward => {
                    let front = gtu.position(network, entry.lane, RelativePosition::Front, query.when)?;
                    if front >= entry.start || front < entry.bound {
                        continue;
                    }
                    entry.traversed + entry.start - front
                }
            };
            if distance <= query.budget {
                best = best.nearer(HeadwayResult::Found { gtu: other, distance });
            }
        }
        Ok(best)
    }

    // ── Lane-level queries ────────────────────────────────────────────────

    /// Nearest vehicle whose rear is at or beyond `start` on `lane`, or on
    /// any lane downstream, within `budget` metres.
    #[allow(clippy::too_many_arguments)]
    pub fn nearest_forward(
        &self,
        network: &LaneNetwork,
        exclude: GtuId,
        lane:    LaneId,
        start:   f64,
        budget:  f64,
        when:    SimTime,
        class:   VehicleClass,
    ) -> MobilityResult<HeadwayResult> {
        let query = HeadwayQuery { lane, start, budget, when, class, direction: SearchDirection::Forward, exclude };
        self.search(network, &query, None)
    }

    /// Nearest vehicle whose front is short of `start` on `lane`, or on any
    /// lane upstream, within `budget` metres.
    #[allow(clippy::too_many_arguments)]
    pub fn nearest_backward(
        &self,
        network: &LaneNetwork,
        exclude: GtuId,
        lane:    LaneId,
        start:   f64,
        budget:  f64,
        when:    SimTime,
        class:   VehicleClass,
    ) -> MobilityResult<HeadwayResult> {
        let query = HeadwayQuery { lane, start, budget, when, class, direction: SearchDirection::Backward, exclude };
        self.search(network, &query, None)
    }

    // ── Vehicle-level queries ─────────────────────────────────────────────

    /// Distance from `subject`'s front to the nearest leader, over all its
    /// occupied lanes.
    pub fn headway(
        &self,
        network: &LaneNetwork,
        subject: &Gtu,
        max:     f64,
        when:    SimTime,
    ) -> MobilityResult<HeadwayResult> {
        let mut best = HeadwayResult::NoneFound;
        for &lane in subject.lanes() {
            let start = subject.position(network, lane, RelativePosition::Front, when)?;
            let found = self.nearest_forward(network, subject.id, lane, start, max, when, subject.class)?;
            best = best.nearer(found);
        }
        Ok(best)
    }

    /// Distance from `subject`'s rear to the nearest follower.
    pub fn headway_back(
        &self,
        network: &LaneNetwork,
        subject: &Gtu,
        max:     f64,
        when:    SimTime,
    ) -> MobilityResult<HeadwayResult> {
        let mut best = HeadwayResult::NoneFound;
        for &lane in subject.lanes() {
            let start = subject.position(network, lane, RelativePosition::Rear, when)?;
            let found = self.nearest_backward(network, subject.id, lane, start, max, when, subject.class)?;
            best = best.nearer(found);
        }
        Ok(best)
    }

    /// Leader headway as if `subject` drove on `lane`, a lane of the same
    /// link as one of its occupied lanes.
    pub fn headway_in_lane(
        &self,
        network: &LaneNetwork,
        subject: &Gtu,
        lane:    LaneId,
        max:     f64,
        when:    SimTime,
    ) -> MobilityResult<HeadwayResult> {
        let start = subject.projected_position(network, lane, RelativePosition::Front, when)?;
        self.nearest_forward(network, subject.id, lane, start, max, when, subject.class)
    }

    /// Follower headway as if `subject` drove on `lane`.
    pub fn headway_back_in_lane(
        &self,
        network: &LaneNetwork,
        subject: &Gtu,
        lane:    LaneId,
        max:     f64,
        when:    SimTime,
    ) -> MobilityResult<HeadwayResult> {
        let start = subject.projected_position(network, lane, RelativePosition::Rear, when)?;
        self.nearest_backward(network, subject.id, lane, start, max, when, subject.class)
    }

    /// Distance from `subject`'s front to `target` if the target is within
    /// `max` in `direction`; `NoneFound` otherwise.
    pub fn headway_to(
        &self,
        network:   &LaneNetwork,
        subject:   &Gtu,
        target:    GtuId,
        max:       f64,
        direction: SearchDirection,
        when:      SimTime,
    ) -> MobilityResult<HeadwayResult> {
        let point = match direction {
            SearchDirection::Forward => RelativePosition::Front,
            SearchDirection::Backward => RelativePosition::Rear,
        };
        let mut best = HeadwayResult::NoneFound;
        for &lane in subject.lanes() {
            let start = subject.position(network, lane, point, when)?;
            let query = HeadwayQuery {
                lane,
                start,
                budget: max,
                when,
                class: subject.class,
                direction,
                exclude: subject.id,
            };
            best = best.nearer(self.search(network, &query, Some(target))?);
        }
        Ok(best)
    }

    // ── Neighbour traffic ─────────────────────────────────────────────────

    /// Vehicles on `lane` whose longitudinal extent overlaps `subject`'s,
    /// compared as link fractions.  `lane` must share a link with one of the
    /// subject's lanes.
    fn overlapping(
        &self,
        network: &LaneNetwork,
        subject: &Gtu,
        lane:    LaneId,
        when:    SimTime,
        out:     &mut Vec<Neighbor>,
    ) -> MobilityResult<()> {
        let length = network.lane(lane).length;
        let front = subject.projected_position(network, lane, RelativePosition::Front, when)? / length;
        let rear = subject.projected_position(network, lane, RelativePosition::Rear, when)? / length;
        for &other in self.occupancy.on(lane) {
            if other == subject.id || out.iter().any(|n| n.gtu == other) {
                continue;
            }
            let gtu = self.gtus.get(other)?;
            let o_front = gtu.fractional_position(network, lane, RelativePosition::Front, when)?;
            let o_rear = gtu.fractional_position(network, lane, RelativePosition::Rear, when)?;
            if o_front > rear && o_rear < front {
                out.push(Neighbor { gtu: other, gap: Gap::Parallel, speed: gtu.speed_at(when), length: gtu.length });
            }
        }
        Ok(())
    }

    /// Vehicles alongside `subject` on the lanes adjacent to its occupied
    /// lanes in `direction`.
    pub fn parallel(
        &self,
        network:   &LaneNetwork,
        subject:   &Gtu,
        direction: LateralDirection,
        when:      SimTime,
    ) -> MobilityResult<Vec<Neighbor>> {
        let mut out = Vec::new();
        for &lane in subject.lanes() {
            for &adjacent in network.lane(lane).adjacent(direction) {
                self.overlapping(network, subject, adjacent, when, &mut out)?;
            }
        }
        Ok(out)
    }

    /// Traffic on `lane` (typically an adjacent lane) from `subject`'s point
    /// of view: vehicles alongside, the leader, and the follower.
    pub fn collect_neighbor_lane_traffic(
        &self,
        network:      &LaneNetwork,
        subject:      &Gtu,
        lane:         LaneId,
        forward_max:  f64,
        backward_max: f64,
        when:         SimTime,
    ) -> MobilityResult<Vec<Neighbor>> {
        let mut out = Vec::new();
        self.overlapping(network, subject, lane, when, &mut out)?;
        let leader = self.headway_in_lane(network, subject, lane, forward_max, when)?;
        self.push_neighbor(&mut out, leader, Gap::Ahead, when)?;
        let follower = self.headway_back_in_lane(network, subject, lane, backward_max, when)?;
        self.push_neighbor(&mut out, follower, Gap::Behind, when)?;
        Ok(out)
    }

    /// Leader and follower of `subject` in its own lanes.
    pub fn same_lane_traffic(
        &self,
        network:      &LaneNetwork,
        subject:      &Gtu,
        forward_max:  f64,
        backward_max: f64,
        when:         SimTime,
    ) -> MobilityResult<Vec<Neighbor>> {
        let mut out = Vec::with_capacity(2);
        let leader = self.headway(network, subject, forward_max, when)?;
        self.push_neighbor(&mut out, leader, Gap::Ahead, when)?;
        let follower = self.headway_back(network, subject, backward_max, when)?;
        self.push_neighbor(&mut out, follower, Gap::Behind, when)?;
        Ok(out)
    }

    fn push_neighbor(
        &self,
        out:    &mut Vec<Neighbor>,
        result: HeadwayResult,
        gap:    fn(f64) -> Gap,
        when:   SimTime,
    ) -> MobilityResult<()> {
        if let HeadwayResult::Found { gtu, distance } = result {
            let other = self.gtus.get(gtu)?;
            out.push(Neighbor { gtu, gap: gap(distance), speed: other.speed_at(when), length: other.length });
        }
        Ok(())
    }
}

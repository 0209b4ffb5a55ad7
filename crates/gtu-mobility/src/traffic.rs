//! `Traffic`: the vehicle store together with the lane occupancy lists.
//!
//! All lane registration changes go through here so that a vehicle's
//! ledger and the occupancy list of every lane agree.

use gtu_core::{GtuId, LaneId, LateralDirection, RelativePosition, SimTime};
use gtu_network::LaneNetwork;

use crate::{Gtu, GtuPhase, GtuStore, LaneOccupancy, MobilityError, MobilityResult};

pub struct Traffic {
    pub gtus:      GtuStore,
    pub occupancy: LaneOccupancy,
}

impl Traffic {
    pub fn new(network: &LaneNetwork) -> Self {
        Self { gtus: GtuStore::new(), occupancy: LaneOccupancy::new(network.lane_count()) }
    }

    #[inline]
    pub fn gtu(&self, id: GtuId) -> MobilityResult<&Gtu> {
        self.gtus.get(id)
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register `gtu` on `lane` with its reference point at `position` (in
    /// lane coordinates, valid at the vehicle's last evaluation).  The
    /// fraction is only stored if the vehicle has none for the lane's link.
    ///
    /// Entering a lane twice is a no-op with a warning; returns whether the
    /// vehicle was newly registered.
    pub fn enter_lane(
        &mut self,
        network:  &LaneNetwork,
        gtu:      &mut Gtu,
        lane:     LaneId,
        position: f64,
        when:     SimTime,
    ) -> MobilityResult<bool> {
        let l = network.try_lane(lane).map_err(|e| MobilityError::inconsistency(gtu.id, e.to_string()))?;
        if !gtu.ledger_mut().enter(lane, l.link, position / l.length) {
            log::warn!("{} entered lane {lane} it already occupies", gtu.id);
            return Ok(false);
        }

        let front = gtu.position(network, lane, RelativePosition::Front, when)?;
        let mut fronts = Vec::with_capacity(self.occupancy.on(lane).len());
        for &other in self.occupancy.on(lane) {
            let o = self.gtus.get(other)?;
            fronts.push(o.position(network, lane, RelativePosition::Front, when)?);
        }
        let index = fronts.partition_point(|&f| f <= front);
        self.occupancy.insert(lane, index, gtu.id);
        log::trace!("{} entered lane {lane} at {position:.2} m", gtu.id);
        Ok(true)
    }

    /// Deregister `gtu` from `lane`.  Leaving the last lane outside of
    /// destruction is reported but not refused.
    pub fn leave_lane(
        &mut self,
        network:            &LaneNetwork,
        gtu:                &mut Gtu,
        lane:               LaneId,
        during_destruction: bool,
    ) -> bool {
        self.occupancy.remove(lane, gtu.id);
        if !gtu.ledger_mut().leave(network, lane) {
            return false;
        }
        if gtu.ledger().is_empty() && !during_destruction {
            log::warn!("{} left lane {lane} and now occupies no lane", gtu.id);
        }
        log::trace!("{} left lane {lane}", gtu.id);
        true
    }

    /// Place a new vehicle on its initial lanes and store it.
    pub fn insert(
        &mut self,
        network: &LaneNetwork,
        mut gtu: Gtu,
        initial: &[(LaneId, f64)],
    ) -> MobilityResult<GtuId> {
        if initial.is_empty() {
            return Err(MobilityError::inconsistency(gtu.id, "no initial lane"));
        }
        let when = gtu.kinematics.last_evaluation;
        for &(lane, position) in initial {
            if let Err(e) = self.enter_lane(network, &mut gtu, lane, position, when) {
                self.unregister(network, &mut gtu);
                return Err(e);
            }
        }
        if let Err(e) = gtu.first_compatible_lane(network).and_then(|_| gtu.check_invariant(network)) {
            self.unregister(network, &mut gtu);
            return Err(e);
        }
        let id = gtu.id;
        self.gtus.put(gtu);
        Ok(id)
    }

    /// Remove a vehicle from every lane and from the store.
    pub fn destroy(&mut self, network: &LaneNetwork, id: GtuId) -> MobilityResult<Gtu> {
        let mut gtu = self.gtus.take(id)?;
        self.unregister(network, &mut gtu);
        Ok(gtu)
    }

    /// Deregister a vehicle that is not in the store from all its lanes.
    pub fn unregister(&mut self, network: &LaneNetwork, gtu: &mut Gtu) {
        let lanes = gtu.lanes().to_vec();
        for lane in lanes {
            self.leave_lane(network, gtu, lane, true);
        }
        gtu.phase = GtuPhase::Destroyed;
    }

    /// Move `gtu` sideways onto every lane reachable in `direction` from its
    /// occupied lanes.  New lanes share the link fraction of the lanes they
    /// replace; old lanes are left afterwards.  Returns `false` (with a
    /// warning) when there is no lane to move to.
    pub fn change_lane(
        &mut self,
        network:   &LaneNetwork,
        gtu:       &mut Gtu,
        direction: LateralDirection,
        now:       SimTime,
    ) -> MobilityResult<bool> {
        let old: Vec<LaneId> = gtu.lanes().to_vec();
        let mut new: Vec<LaneId> = Vec::with_capacity(old.len());
        for &lane in &old {
            for adjacent in network.accessible_adjacent_lanes(lane, direction, gtu.class) {
                if !new.contains(&adjacent) {
                    new.push(adjacent);
                }
            }
        }
        if new.is_empty() {
            log::warn!("{} wants to change {direction} but no lane is reachable from {old:?}", gtu.id);
            return Ok(false);
        }

        for &lane in &new {
            let position = gtu.projected_position(network, lane, RelativePosition::Reference, gtu.kinematics.last_evaluation)?;
            self.enter_lane(network, gtu, lane, position, now)?;
        }
        for &lane in old.iter().filter(|l| !new.contains(l)) {
            self.leave_lane(network, gtu, lane, false);
        }
        gtu.check_invariant(network)?;
        log::debug!("{} changed {direction} from {old:?} to {new:?} at {now}", gtu.id);
        Ok(true)
    }
}

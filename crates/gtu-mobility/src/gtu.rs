//! The vehicle ("GTU") and the template vehicles are stamped from.

use std::fmt;
use std::sync::Arc;

use gtu_behavior::{CarFollowingStrategy, GtuView, LaneChangeStrategy};
use gtu_core::{GtuId, LaneId, Pose, RelativePosition, SimTime, VehicleClass};
use gtu_network::{LaneNetwork, RouteNavigator};

use crate::{GtuPhase, Kinematics, MobilityError, MobilityResult, PositionLedger};

// ── GtuTemplate ───────────────────────────────────────────────────────────────

/// Static vehicle characteristics shared by many vehicles.
#[derive(Clone)]
pub struct GtuTemplate {
    pub class:         VehicleClass,
    /// m
    pub length:        f64,
    /// m
    pub width:         f64,
    /// m/s
    pub max_speed:     f64,
    pub car_following: Arc<dyn CarFollowingStrategy>,
    pub lane_change:   Arc<dyn LaneChangeStrategy>,
}

impl GtuTemplate {
    pub fn new(
        class:         VehicleClass,
        length:        f64,
        width:         f64,
        max_speed:     f64,
        car_following: Arc<dyn CarFollowingStrategy>,
        lane_change:   Arc<dyn LaneChangeStrategy>,
    ) -> Self {
        Self { class, length, width, max_speed, car_following, lane_change }
    }

    pub fn validate(&self) -> MobilityResult<()> {
        for (what, v) in [("length", self.length), ("width", self.width), ("max speed", self.max_speed)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(MobilityError::InvalidTemplate(format!("{what} must be positive, got {v}")));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GtuTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GtuTemplate")
            .field("class", &self.class)
            .field("length", &self.length)
            .field("width", &self.width)
            .field("max_speed", &self.max_speed)
            .field("car_following", &self.car_following.name())
            .field("lane_change", &self.lane_change.name())
            .finish()
    }
}

// ── Gtu ───────────────────────────────────────────────────────────────────────

/// A simulated vehicle.
///
/// Lane registration is changed through [`Traffic`](crate::Traffic) so the
/// per-lane occupancy lists stay in step with the ledger.
pub struct Gtu {
    pub id:            GtuId,
    pub class:         VehicleClass,
    pub length:        f64,
    pub width:         f64,
    pub max_speed:     f64,
    pub kinematics:    Kinematics,
    pub phase:         GtuPhase,
    pub car_following: Arc<dyn CarFollowingStrategy>,
    pub lane_change:   Arc<dyn LaneChangeStrategy>,
    navigator:         Box<dyn RouteNavigator>,
    ledger:            PositionLedger,
}

impl Gtu {
    /// A vehicle on no lane yet, moving at `speed` from `now`.
    pub fn new(
        id:        GtuId,
        template:  &GtuTemplate,
        navigator: Box<dyn RouteNavigator>,
        speed:     f64,
        now:       SimTime,
    ) -> MobilityResult<Self> {
        template.validate()?;
        if !(speed.is_finite() && speed >= 0.0) {
            return Err(MobilityError::InvalidTemplate(format!("initial speed must be non-negative, got {speed}")));
        }
        Ok(Self {
            id,
            class:         template.class,
            length:        template.length,
            width:         template.width,
            max_speed:     template.max_speed,
            kinematics:    Kinematics::new(speed, now),
            phase:         GtuPhase::Scheduled,
            car_following: Arc::clone(&template.car_following),
            lane_change:   Arc::clone(&template.lane_change),
            navigator,
            ledger:        PositionLedger::new(),
        })
    }

    #[inline]
    pub fn lanes(&self) -> &[LaneId] {
        self.ledger.lanes()
    }

    #[inline]
    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    #[inline]
    pub(crate) fn ledger_mut(&mut self) -> &mut PositionLedger {
        &mut self.ledger
    }

    pub fn navigator(&self) -> &dyn RouteNavigator {
        self.navigator.as_ref()
    }

    pub fn navigator_mut(&mut self) -> &mut dyn RouteNavigator {
        self.navigator.as_mut()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.phase != GtuPhase::Destroyed
    }

    #[inline]
    pub fn speed_at(&self, when: SimTime) -> f64 {
        self.kinematics.speed_at(when)
    }

    /// Snapshot handed to the strategies.
    pub fn view(&self, now: SimTime) -> GtuView<'_> {
        GtuView {
            id:            self.id,
            class:         self.class,
            length:        self.length,
            speed:         self.speed_at(now),
            max_speed:     self.max_speed,
            now,
            car_following: self.car_following.as_ref(),
        }
    }

    // ── Positions ─────────────────────────────────────────────────────────

    /// Longitudinal position of `point` on `lane` at `when`.
    pub fn position(
        &self,
        network: &LaneNetwork,
        lane:    LaneId,
        point:   RelativePosition,
        when:    SimTime,
    ) -> MobilityResult<f64> {
        if !self.ledger.contains(lane) {
            return Err(MobilityError::inconsistency(self.id, format!("not registered on lane {lane}")));
        }
        self.projected_position(network, lane, point, when)
    }

    /// Position of `point` projected onto `lane`, which must be on the same
    /// link as one of the occupied lanes.
    pub fn projected_position(
        &self,
        network: &LaneNetwork,
        lane:    LaneId,
        point:   RelativePosition,
        when:    SimTime,
    ) -> MobilityResult<f64> {
        let link = network.link_of(lane);
        let fraction = self.ledger.fraction(link).ok_or_else(|| {
            MobilityError::inconsistency(self.id, format!("no position on link {link} of lane {lane}"))
        })?;
        let length = network.lane(lane).length;
        Ok(fraction * length + self.kinematics.delta_x(when) + point.offset(self.length))
    }

    pub fn fractional_position(
        &self,
        network: &LaneNetwork,
        lane:    LaneId,
        point:   RelativePosition,
        when:    SimTime,
    ) -> MobilityResult<f64> {
        Ok(self.position(network, lane, point, when)? / network.lane(lane).length)
    }

    /// `(lane, position)` for every occupied lane, oldest registration first.
    pub fn positions(
        &self,
        network: &LaneNetwork,
        point:   RelativePosition,
        when:    SimTime,
    ) -> MobilityResult<Vec<(LaneId, f64)>> {
        self.lanes()
            .iter()
            .map(|&l| Ok((l, self.position(network, l, point, when)?)))
            .collect()
    }

    pub fn fractional_positions(
        &self,
        network: &LaneNetwork,
        point:   RelativePosition,
        when:    SimTime,
    ) -> MobilityResult<Vec<(LaneId, f64)>> {
        self.lanes()
            .iter()
            .map(|&l| Ok((l, self.fractional_position(network, l, point, when)?)))
            .collect()
    }

    /// Planar pose of the reference point on the first occupied lane.
    pub fn location(&self, network: &LaneNetwork, when: SimTime) -> MobilityResult<Pose> {
        let lane = self.first_lane()?;
        let position = self.position(network, lane, RelativePosition::Reference, when)?;
        Ok(network.location(lane, position))
    }

    fn first_lane(&self) -> MobilityResult<LaneId> {
        self.lanes()
            .first()
            .copied()
            .ok_or_else(|| MobilityError::inconsistency(self.id, "vehicle occupies no lane"))
    }

    /// The first occupied lane the vehicle's class may use.
    pub fn first_compatible_lane(&self, network: &LaneNetwork) -> MobilityResult<LaneId> {
        self.lanes()
            .iter()
            .copied()
            .find(|&l| network.lane(l).is_compatible(self.class))
            .ok_or_else(|| MobilityError::routing(self.id, "not on any compatible lane"))
    }

    /// Lowest speed limit over the occupied lanes, capped by the vehicle's
    /// own maximum speed.
    pub fn speed_limit(&self, network: &LaneNetwork) -> f64 {
        self.lanes()
            .iter()
            .map(|&l| network.speed_limit(l, self.class))
            .fold(self.max_speed, f64::min)
    }

    pub fn check_invariant(&self, network: &LaneNetwork) -> MobilityResult<()> {
        match self.ledger.violation(network) {
            Some(detail) => Err(MobilityError::NetworkInconsistency { gtu: self.id, detail }),
            None => Ok(()),
        }
    }

    // ── Movement ──────────────────────────────────────────────────────────

    /// Commit a new acceleration at `now`.
    ///
    /// New link fractions are computed from the pre-commit state for every
    /// occupied lane, newest to oldest, and written after the kinematics
    /// advance; where two lanes share a link the oldest one's value wins.
    pub fn commit_move(
        &mut self,
        network:      &LaneNetwork,
        acceleration: f64,
        valid_until:  SimTime,
        now:          SimTime,
    ) -> MobilityResult<()> {
        let mut fractions = Vec::with_capacity(self.lanes().len());
        for &lane in self.lanes().iter().rev() {
            let position = self.position(network, lane, RelativePosition::Reference, now)?;
            fractions.push((network.link_of(lane), position / network.lane(lane).length));
        }
        self.kinematics.advance(now, acceleration, valid_until);
        for (link, fraction) in fractions {
            self.ledger.set_fraction(link, fraction);
        }
        Ok(())
    }

    /// The lane to enter when the front reaches the end of `lane`.
    ///
    /// A single compatible successor is taken as is.  At a diverge the
    /// successor whose link ends at the navigator's next node wins; no
    /// match or several matches is a routing failure.
    pub fn determine_next_lane(&self, network: &LaneNetwork, lane: LaneId) -> MobilityResult<LaneId> {
        self.determine_next_lane_beyond(network, lane, 0)
    }

    /// [`determine_next_lane`](Self::determine_next_lane) for a `lane` that
    /// lies `links_ahead` links past the navigator's current link; used when
    /// one move crosses several lane ends.
    pub fn determine_next_lane_beyond(
        &self,
        network:     &LaneNetwork,
        lane:        LaneId,
        links_ahead: usize,
    ) -> MobilityResult<LaneId> {
        let next: Vec<LaneId> = network.next_lanes(lane, self.class).collect();
        match next.as_slice() {
            [] => Err(MobilityError::routing(self.id, format!("lane {lane} has no successor for {}", self.class))),
            [only] => Ok(*only),
            _ => {
                let node = self.navigator.node_beyond(1 + links_ahead).ok_or_else(|| {
                    MobilityError::routing(self.id, format!("lane {lane} diverges and the route has no next node"))
                })?;
                let matching: Vec<LaneId> = next
                    .iter()
                    .copied()
                    .filter(|&l| network.link(network.link_of(l)).to == node)
                    .collect();
                match matching.as_slice() {
                    [one] => Ok(*one),
                    [] => Err(MobilityError::routing(
                        self.id,
                        format!("no successor of lane {lane} leads to {node}"),
                    )),
                    _ => Err(MobilityError::routing(
                        self.id,
                        format!("{} successors of lane {lane} lead to {node}", matching.len()),
                    )),
                }
            }
        }
    }
}

impl fmt::Debug for Gtu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gtu")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("length", &self.length)
            .field("kinematics", &self.kinematics)
            .field("phase", &self.phase)
            .field("lanes", &self.lanes())
            .finish()
    }
}

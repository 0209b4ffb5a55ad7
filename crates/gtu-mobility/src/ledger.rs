//! The Position Ledger: which lanes a vehicle occupies and where it is on
//! each link.
//!
//! Positions are stored per *link* as a fraction of the lane length, valid
//! at the vehicle's last evaluation time.  During a lane change a vehicle
//! can be registered on two lanes of one link; both share the fraction.
//!
//! Invariant: every occupied lane's link has a fraction, and a fraction
//! only exists while some occupied lane belongs to its link.

use gtu_core::{LaneId, LinkId};
use gtu_network::LaneNetwork;
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default)]
pub struct PositionLedger {
    /// Oldest registration first.
    lanes:     Vec<LaneId>,
    fractions: FxHashMap<LinkId, f64>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }

    #[inline]
    pub fn contains(&self, lane: LaneId) -> bool {
        self.lanes.contains(&lane)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    #[inline]
    pub fn fraction(&self, link: LinkId) -> Option<f64> {
        self.fractions.get(&link).copied()
    }

    pub fn link_count(&self) -> usize {
        self.fractions.len()
    }

    /// Register `lane` (on `link`).  An existing fraction for `link` is kept;
    /// otherwise `fraction` is stored.  Returns `false` if already registered.
    pub fn enter(&mut self, lane: LaneId, link: LinkId, fraction: f64) -> bool {
        if self.contains(lane) {
            return false;
        }
        self.lanes.push(lane);
        self.fractions.entry(link).or_insert(fraction);
        true
    }

    /// Deregister `lane`, dropping its link's fraction when no other
    /// occupied lane is on that link.  Returns `false` if not registered.
    pub fn leave(&mut self, network: &LaneNetwork, lane: LaneId) -> bool {
        let Some(k) = self.lanes.iter().position(|&l| l == lane) else {
            return false;
        };
        self.lanes.remove(k);
        let link = network.link_of(lane);
        if !self.lanes.iter().any(|&l| network.link_of(l) == link) {
            self.fractions.remove(&link);
        }
        true
    }

    /// Overwrite the fraction of a link the vehicle is on.
    pub(crate) fn set_fraction(&mut self, link: LinkId, fraction: f64) {
        self.fractions.insert(link, fraction);
    }

    /// Describe the first violation of the ledger invariant, if any.
    pub fn violation(&self, network: &LaneNetwork) -> Option<String> {
        if self.lanes.is_empty() {
            return Some("vehicle occupies no lane".into());
        }
        if let Some(&lane) = self.lanes.iter().find(|&&l| self.fraction(network.link_of(l)).is_none()) {
            return Some(format!("no fraction for link {} of occupied lane {lane}", network.link_of(lane)));
        }
        self.fractions
            .keys()
            .find(|&&link| !self.lanes.iter().any(|&l| network.link_of(l) == link))
            .map(|link| format!("fraction stored for link {link} without an occupied lane"))
    }
}

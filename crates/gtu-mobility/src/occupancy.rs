//! Per-lane lists of registered vehicles.

use gtu_core::{GtuId, LaneId};

/// `lists[lane.index()]` holds the vehicles registered on that lane,
/// ordered by front position at the time each one entered.
#[derive(Clone, Debug, Default)]
pub struct LaneOccupancy {
    lists: Vec<Vec<GtuId>>,
}

impl LaneOccupancy {
    pub fn new(lane_count: usize) -> Self {
        Self { lists: vec![Vec::new(); lane_count] }
    }

    #[inline]
    pub fn on(&self, lane: LaneId) -> &[GtuId] {
        self.lists.get(lane.index()).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn insert(&mut self, lane: LaneId, index: usize, gtu: GtuId) {
        if lane.index() >= self.lists.len() {
            self.lists.resize_with(lane.index() + 1, Vec::new);
        }
        let list = &mut self.lists[lane.index()];
        list.insert(index.min(list.len()), gtu);
    }

    pub(crate) fn remove(&mut self, lane: LaneId, gtu: GtuId) -> bool {
        let Some(list) = self.lists.get_mut(lane.index()) else {
            return false;
        };
        match list.iter().position(|&g| g == gtu) {
            Some(k) => {
                list.remove(k);
                true
            }
            None => false,
        }
    }

    /// Total registrations; a vehicle on two lanes counts twice.
    pub fn total(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }
}

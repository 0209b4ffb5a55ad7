//! The `GtuStore`: live vehicles by id.

use gtu_core::GtuId;
use rustc_hash::FxHashMap;

use crate::{Gtu, MobilityError, MobilityResult};

/// Live vehicles keyed by id, plus the id counter.
///
/// Ids are handed out sequentially and never reused.  A vehicle can be
/// [`take`](Self::take)n out while it is being mutated and
/// [`put`](Self::put) back afterwards; queries made in between simply do
/// not see it.
#[derive(Default)]
pub struct GtuStore {
    gtus:    FxHashMap<GtuId, Gtu>,
    next_id: u32,
}

impl GtuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next vehicle id.
    pub fn allocate_id(&mut self) -> GtuId {
        let id = GtuId(self.next_id);
        self.next_id += 1;
        id
    }

    #[inline]
    pub fn get(&self, id: GtuId) -> MobilityResult<&Gtu> {
        self.gtus.get(&id).ok_or(MobilityError::UnknownGtu(id))
    }

    #[inline]
    pub fn get_mut(&mut self, id: GtuId) -> MobilityResult<&mut Gtu> {
        self.gtus.get_mut(&id).ok_or(MobilityError::UnknownGtu(id))
    }

    #[inline]
    pub fn contains(&self, id: GtuId) -> bool {
        self.gtus.contains_key(&id)
    }

    pub fn take(&mut self, id: GtuId) -> MobilityResult<Gtu> {
        self.gtus.remove(&id).ok_or(MobilityError::UnknownGtu(id))
    }

    pub fn put(&mut self, gtu: Gtu) {
        self.gtus.insert(gtu.id, gtu);
    }

    pub fn len(&self) -> usize {
        self.gtus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gtus.is_empty()
    }

    /// Ids of all stored vehicles, ascending.
    pub fn ids(&self) -> Vec<GtuId> {
        let mut ids: Vec<GtuId> = self.gtus.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gtu> {
        self.gtus.values()
    }
}

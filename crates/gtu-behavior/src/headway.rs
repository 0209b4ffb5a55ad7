//! Results of headway searches and the neighbour records built from them.

use gtu_core::GtuId;

// ── HeadwayResult ─────────────────────────────────────────────────────────────

/// Outcome of a nearest-vehicle search.
///
/// `NoneFound` means no vehicle within the search budget.  It is not an
/// error and is distinct from a vehicle found at some large distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeadwayResult {
    Found { gtu: GtuId, distance: f64 },
    NoneFound,
}

impl HeadwayResult {
    #[inline]
    pub fn is_found(self) -> bool {
        matches!(self, HeadwayResult::Found { .. })
    }

    #[inline]
    pub fn gtu(self) -> Option<GtuId> {
        match self {
            HeadwayResult::Found { gtu, .. } => Some(gtu),
            HeadwayResult::NoneFound => None,
        }
    }

    #[inline]
    pub fn distance(self) -> Option<f64> {
        match self {
            HeadwayResult::Found { distance, .. } => Some(distance),
            HeadwayResult::NoneFound => None,
        }
    }

    /// The closer of two results; ties keep `self`.
    pub fn nearer(self, other: HeadwayResult) -> HeadwayResult {
        match (self.distance(), other.distance()) {
            (_, None) => self,
            (None, Some(_)) => other,
            (Some(a), Some(b)) => if b < a { other } else { self },
        }
    }
}

// ── Gap / Neighbor ────────────────────────────────────────────────────────────

/// Longitudinal relation between the subject and a neighbour.
///
/// Distances are net: bumper to bumper, never negative.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gap {
    /// The neighbour's rear is this far ahead of the subject's front.
    Ahead(f64),
    /// The neighbour's front is this far behind the subject's rear.
    Behind(f64),
    /// The two vehicles overlap longitudinally.
    Parallel,
}

impl Gap {
    /// Net distance, or `None` for [`Gap::Parallel`].
    #[inline]
    pub fn distance(self) -> Option<f64> {
        match self {
            Gap::Ahead(d) | Gap::Behind(d) => Some(d),
            Gap::Parallel => None,
        }
    }
}

/// Another vehicle as seen by the subject during a decision.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Neighbor {
    pub gtu:    GtuId,
    pub gap:    Gap,
    /// m/s at the decision time.
    pub speed:  f64,
    pub length: f64,
}

impl Neighbor {
    #[inline]
    pub fn is_parallel(&self) -> bool {
        matches!(self.gap, Gap::Parallel)
    }
}

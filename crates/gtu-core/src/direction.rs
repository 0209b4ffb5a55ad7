//! Lateral directions and vehicle-relative longitudinal points.

/// Side of a lane, seen in the driving direction.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LateralDirection {
    Left,
    Right,
}

impl LateralDirection {
    pub const BOTH: [LateralDirection; 2] = [LateralDirection::Left, LateralDirection::Right];

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            LateralDirection::Left  => LateralDirection::Right,
            LateralDirection::Right => LateralDirection::Left,
        }
    }

    /// Slot in `[left, right]` pairs.
    #[inline]
    pub fn slot(self) -> usize {
        match self {
            LateralDirection::Left  => 0,
            LateralDirection::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LateralDirection::Left  => "left",
            LateralDirection::Right => "right",
        }
    }
}

impl std::fmt::Display for LateralDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A longitudinal point on a vehicle.
///
/// The reference point is the front bumper, so `Front` has offset `0` and
/// `Rear` has offset `-length`.  Lane positions stored in the ledger are
/// always reference-point positions; offsets are added on query.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelativePosition {
    Front,
    Rear,
    Reference,
}

impl RelativePosition {
    /// Longitudinal offset from the reference point for a vehicle of `length`.
    #[inline]
    pub fn offset(self, length: f64) -> f64 {
        match self {
            RelativePosition::Front | RelativePosition::Reference => 0.0,
            RelativePosition::Rear => -length,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelativePosition::Front     => "front",
            RelativePosition::Rear      => "rear",
            RelativePosition::Reference => "reference",
        }
    }
}

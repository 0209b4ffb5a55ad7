use gtu_core::{GtuId, SimTime};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MobilityError {
    /// The vehicle's lane registration and link fractions disagree, or a
    /// query named a lane the vehicle is not on.
    #[error("network inconsistency for {gtu}: {detail}")]
    NetworkInconsistency { gtu: GtuId, detail: String },

    /// No usable next lane, or no compatible lane at all.
    #[error("routing failure for {gtu}: {detail}")]
    RoutingFailure { gtu: GtuId, detail: String },

    #[error("{gtu} was scheduled to move at {expected} but the move fired at {fired}")]
    SchedulingInconsistency { gtu: GtuId, expected: SimTime, fired: SimTime },

    #[error("{0} is not a live vehicle")]
    UnknownGtu(GtuId),

    #[error("invalid vehicle template: {0}")]
    InvalidTemplate(String),
}

impl MobilityError {
    pub(crate) fn inconsistency(gtu: GtuId, detail: impl Into<String>) -> Self {
        MobilityError::NetworkInconsistency { gtu, detail: detail.into() }
    }

    pub(crate) fn routing(gtu: GtuId, detail: impl Into<String>) -> Self {
        MobilityError::RoutingFailure { gtu, detail: detail.into() }
    }

    /// The vehicle the error is about, if any.
    pub fn gtu(&self) -> Option<GtuId> {
        match self {
            MobilityError::NetworkInconsistency { gtu, .. }
            | MobilityError::RoutingFailure { gtu, .. }
            | MobilityError::SchedulingInconsistency { gtu, .. }
            | MobilityError::UnknownGtu(gtu) => Some(*gtu),
            MobilityError::InvalidTemplate(_) => None,
        }
    }
}

pub type MobilityResult<T> = Result<T, MobilityError>;

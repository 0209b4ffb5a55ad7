use gtu_behavior::BehaviorError;
use gtu_core::{CoreError, GeneratorId, GtuId, SimTime};
use gtu_mobility::MobilityError;
use gtu_network::NetworkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Mobility(#[from] MobilityError),

    #[error(transparent)]
    Behavior(#[from] BehaviorError),

    #[error("invalid simulation setup: {0}")]
    Builder(String),

    #[error("generator {0} does not exist")]
    UnknownGenerator(GeneratorId),

    /// A lane-change strategy returned an unusable decision.
    #[error("invalid movement decision for {gtu}: {detail}")]
    InvalidDecision { gtu: GtuId, detail: String },
}

impl SimError {
    /// The vehicle the error is about, if any.
    pub fn gtu(&self) -> Option<GtuId> {
        match self {
            SimError::Mobility(e) => e.gtu(),
            SimError::InvalidDecision { gtu, .. } => Some(*gtu),
            _ => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;

/// A vehicle removed from the run because one of its events failed.
#[derive(Debug)]
pub struct GtuFailure {
    pub gtu:   GtuId,
    pub time:  SimTime,
    pub error: SimError,
}

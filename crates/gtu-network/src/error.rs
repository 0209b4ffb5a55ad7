//! Network-subsystem error type.

use thiserror::Error;

use gtu_core::{LaneId, LinkId, NodeId};

/// Errors produced while building or querying a [`LaneNetwork`][crate::LaneNetwork].
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("node {0} not found in network")]
    UnknownNode(NodeId),

    #[error("link {0} not found in network")]
    UnknownLink(LinkId),

    #[error("lane {0} not found in network")]
    UnknownLane(LaneId),

    #[error("link {0} has no lanes")]
    EmptyLink(LinkId),

    #[error("{what} must have a positive length, got {length}")]
    NonPositiveLength { what: String, length: f64 },

    #[error("lane {from} cannot connect to lane {to}: link {from_link} does not end where link {to_link} starts")]
    DisconnectedLanes {
        from:      LaneId,
        to:        LaneId,
        from_link: LinkId,
        to_link:   LinkId,
    },

    #[error("sensor position {position} lies outside lane {lane} of length {length}")]
    SensorOutOfRange { lane: LaneId, position: f64, length: f64 },

    #[error("lane {lane}: invalid {what} {value}")]
    InvalidLaneParameter { lane: LaneId, what: &'static str, value: f64 },

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("route problem: {0}")]
    Route(String),
}

pub type NetworkResult<T> = Result<T, NetworkError>;

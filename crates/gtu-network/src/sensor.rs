//! Lane-internal sensors.
//!
//! A sensor fires when the chosen point of a vehicle passes its position.
//! The simulator schedules the firing at the exact crossing time computed
//! from the vehicle's committed constant-acceleration segment.

use gtu_core::{ClassSet, LaneId, RelativePosition, SensorId};

/// What happens when a sensor fires.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorKind {
    /// Removes the vehicle from the network.
    Sink,
    /// Records a passage (vehicle id, time, speed).
    Detector,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensor {
    pub id:       SensorId,
    pub name:     String,
    pub lane:     LaneId,
    /// Longitudinal position on `lane`, in `[0, lane.length]`.
    pub position: f64,
    /// The vehicle point whose passage triggers the sensor.
    pub trigger:  RelativePosition,
    pub kind:     SensorKind,
    /// Vehicle classes the sensor reacts to.
    pub classes:  ClassSet,
}

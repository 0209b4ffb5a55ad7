//! The lane-drop road used by the demo.
//!
//! ```text
//!   west ══ left  ══╗ merge
//!        ══ right ══╬══ through ══ east (sink)
//! ```
//!
//! The left lane ends at `merge`; trucks may only use the right lane.

use gtu_core::{ClassSet, LaneId, NodeId, Point, RelativePosition, SensorId, VehicleClass};
use gtu_network::{LaneNetwork, LaneNetworkBuilder, LaneSpec, NetworkResult, SensorKind};

/// Length of the two-lane section, m.
pub const DROP_SECTION: f64 = 1_500.0;
/// Length of the single-lane section after the drop, m.
pub const MERGED_SECTION: f64 = 1_000.0;

pub struct LaneDrop {
    pub network:   LaneNetwork,
    /// `[west, merge, east]`
    pub nodes:     [NodeId; 3],
    /// `[left, right, through]`
    pub lanes:     [LaneId; 3],
    /// Detectors 100 m before the drop on `[left, right]`, then 500 m
    /// downstream on `through`.
    pub detectors: [SensorId; 3],
    pub sink:      SensorId,
}

pub fn build_network() -> NetworkResult<LaneDrop> {
    let mut b = LaneNetworkBuilder::new();

    let west  = b.add_node(Point::new(0.0, 0.0));
    let merge = b.add_node(Point::new(DROP_SECTION, 0.0));
    let east  = b.add_node(Point::new(DROP_SECTION + MERGED_SECTION, 0.0));

    let upstream = b.add_link(west, merge)?;
    let downstream = b.add_link(merge, east)?;

    let cars_only = ClassSet::ALL.without(VehicleClass::Truck);
    let left = b.add_lane(upstream, LaneSpec::default().with_allowed(cars_only))?;
    let right = b.add_lane(upstream, LaneSpec::default().with_class_speed_limit(VehicleClass::Truck, 22.22))?;
    let through = b.add_lane(downstream, LaneSpec::default().with_class_speed_limit(VehicleClass::Truck, 22.22))?;
    b.connect(right, through)?;

    let at = DROP_SECTION - 100.0;
    let detectors = [
        b.add_sensor("left-upstream", left, at, RelativePosition::Front, SensorKind::Detector)?,
        b.add_sensor("right-upstream", right, at, RelativePosition::Front, SensorKind::Detector)?,
        b.add_sensor("downstream", through, 500.0, RelativePosition::Front, SensorKind::Detector)?,
    ];
    let sink = b.add_sink(through, MERGED_SECTION)?;

    Ok(LaneDrop {
        network: b.build()?,
        nodes: [west, merge, east],
        lanes: [left, right, through],
        detectors,
        sink,
    })
}

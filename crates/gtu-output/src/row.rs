//! Plain data row types written by output backends.

/// One vehicle's state at a move or snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRow {
    /// Simulated time, s.
    pub time:         f64,
    pub gtu:          u32,
    /// First occupied lane.
    pub lane:         u32,
    /// Reference position on `lane`, m.
    pub position:     f64,
    pub speed:        f64,
    pub acceleration: f64,
    pub x:            f64,
    pub y:            f64,
}

/// A vehicle passing a detector or reaching a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRow {
    pub time:   f64,
    pub sensor: u32,
    pub name:   String,
    /// `"detector"` or `"sink"`.
    pub kind:   &'static str,
    pub gtu:    u32,
    pub speed:  f64,
}

/// A vehicle removed from the run because one of its events failed.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureRow {
    pub time:  f64,
    pub gtu:   u32,
    pub error: String,
}

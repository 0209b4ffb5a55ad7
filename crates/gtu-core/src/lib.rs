//! `gtu-core` — foundational types for the lane-based GTU simulator.
//!
//! This crate is a dependency of every other `gtu-*` crate.  It has no
//! `gtu-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`ids`]       | `GtuId`, `LaneId`, `LinkId`, `NodeId`, `SensorId`, `GeneratorId` |
//! | [`time`]      | `SimTime` (continuous seconds, totally ordered)            |
//! | [`config`]    | `SimConfig`, `LaneIncentiveDefaults`                       |
//! | [`direction`] | `LateralDirection`, `RelativePosition`                     |
//! | [`class`]     | `VehicleClass`, `ClassSet`                                 |
//! | [`geo`]       | `Point`, `Pose` (planar metres)                            |
//! | [`rng`]       | `GtuRng` (one seeded stream per generator)                 |
//! | [`error`]     | `CoreError`, `CoreResult`                                  |
//!
//! All physical quantities are SI `f64`: metres, seconds, m/s, m/s².
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod class;
pub mod config;
pub mod direction;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use class::{ClassSet, VehicleClass};
pub use config::{LaneIncentiveDefaults, SimConfig};
pub use direction::{LateralDirection, RelativePosition};
pub use error::{CoreError, CoreResult};
pub use geo::{Point, Pose};
pub use ids::{GeneratorId, GtuId, LaneId, LinkId, NodeId, SensorId};
pub use rng::GtuRng;
pub use time::SimTime;

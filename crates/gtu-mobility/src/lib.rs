//! `gtu-mobility` — vehicle state, lane registration, and headway search.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                          |
//! |---------------|-------------------------------------------------------------------|
//! | [`state`]     | `Kinematics` (constant-acceleration interval), `GtuPhase`         |
//! | [`ledger`]    | `PositionLedger` — occupied lanes and per-link fractions          |
//! | [`gtu`]       | `Gtu`, `GtuTemplate` — positions, commit, next-lane resolution    |
//! | [`occupancy`] | `LaneOccupancy` — vehicles registered per lane                    |
//! | [`store`]     | `GtuStore` — live vehicles by id                                  |
//! | [`traffic`]   | `Traffic` — store + occupancy; enter/leave/insert/destroy/change  |
//! | [`headway`]   | Headway Search Engine on `Traffic`                                |
//! | [`error`]     | `MobilityError`, `MobilityResult<T>`                              |
//!
//! # Position model
//!
//! A vehicle's reference point is its front bumper; the rear is `length`
//! behind it.  Each occupied link stores the reference point's fraction
//! of the lane length at the last evaluation time, and the position at any
//! later time within the committed interval is
//!
//! ```text
//! position(lane, point, t) = fraction · lane.length + Δx(t) + offset(point)
//! ```
//!
//! Fractions may lie outside `[0, 1]` while a vehicle straddles a lane
//! boundary: a vehicle entering the next lane has a negative fraction there
//! until its reference point crosses the boundary.

pub mod error;
pub mod gtu;
pub mod headway;
pub mod ledger;
pub mod occupancy;
pub mod state;
pub mod store;
pub mod traffic;

#[cfg(test)]
mod tests;

pub use error::{MobilityError, MobilityResult};
pub use gtu::{Gtu, GtuTemplate};
pub use headway::{HeadwayQuery, SearchDirection};
pub use ledger::PositionLedger;
pub use occupancy::LaneOccupancy;
pub use state::{GtuPhase, Kinematics};
pub use store::GtuStore;
pub use traffic::Traffic;

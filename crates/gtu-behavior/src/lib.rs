//! `gtu-behavior` — driving strategies and the values they exchange.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                        |
//! |-----------------|-----------------------------------------------------------------|
//! | [`headway`]     | `HeadwayResult`, `Gap`, `Neighbor`                              |
//! | [`decision`]    | `LaneIncentives`, `AccelerationStep`, `MovementDecision`        |
//! | [`model`]       | `GtuView`, `CarFollowingStrategy`, `LaneChangeStrategy` traits  |
//! | [`idm`]         | `IdmPlus` car following                                         |
//! | [`fixed`]       | `FixedAcceleration` car following                               |
//! | [`lane_change`] | `EgoisticLaneChange`, `NoLaneChange`                            |
//! | [`error`]       | `BehaviorError`, `BehaviorResult<T>`                            |
//!
//! # Design notes
//!
//! Strategies see the world only through [`GtuView`] and neighbour lists
//! assembled by the decision protocol in gtu-sim; they never touch the
//! network or other vehicles directly.  They hold parameters, not
//! per-vehicle state, so one instance is shared by many vehicles.

pub mod decision;
pub mod error;
pub mod fixed;
pub mod headway;
pub mod idm;
pub mod lane_change;
pub mod model;


pub use decision::{stop_limited, AccelerationStep, LaneIncentives, MovementDecision};
pub use error::{BehaviorError, BehaviorResult};
pub use fixed::FixedAcceleration;
pub use headway::{Gap, HeadwayResult, Neighbor};
pub use idm::IdmPlus;
pub use lane_change::{EgoisticLaneChange, NoLaneChange};
pub use model::{CarFollowingStrategy, GtuView, LaneChangeStrategy};

//! `gtu-network` — lane network, sensors, routing, and route navigation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`network`]   | `LaneNetwork` (node/link/lane arenas + adjacency table), `LaneNetworkBuilder`, `LaneSpec` |
//! | [`sensor`]    | `Sensor`, `SensorKind`                                        |
//! | [`router`]    | `Router` trait, `Route`, `DijkstraRouter`                     |
//! | [`navigator`] | `RouteNavigator` trait, `Suitability`, `NodeRouteNavigator`, `FreeNavigator` |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Static topology
//!
//! The network is immutable once built.  Lateral adjacency is resolved into
//! a `(lane, direction)` table at build time, so lookups during a vehicle
//! step are O(1) and vehicles keep no adjacency cache of their own.  Lane
//! occupancy is mutable simulation state and lives in `gtu-mobility`.

pub mod error;
pub mod navigator;
pub mod network;
pub mod router;
pub mod sensor;


pub use error::{NetworkError, NetworkResult};
pub use navigator::{FreeNavigator, NodeRouteNavigator, RouteNavigator, Suitability};
pub use network::{Lane, LaneNetwork, LaneNetworkBuilder, LaneSpec, Link, Node};
pub use router::{DijkstraRouter, Route, Router};
pub use sensor::{Sensor, SensorKind};

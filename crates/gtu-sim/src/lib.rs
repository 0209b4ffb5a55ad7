//! `gtu-sim` — discrete-event loop for the lane-based GTU simulator.
//!
//! # Event loop
//!
//! ```text
//! pop earliest event (FIFO among equal times), clock ← event time
//!   Move          → decision protocol → commit acceleration (+ lane change)
//!                   → schedule sensor / lane-entry events at their exact
//!                     crossing times, lane exits and the next Move at the
//!                     end of the committed interval
//!   EnterLane     → register on the next lane; advance the route on a new link
//!   LeaveLane     → deregister from a lane the rear has left
//!   SensorTrigger → sink: remove the vehicle; detector: count the passage
//!   Arrival       → generator backlog += 1, schedule next arrival, place
//!   Placement     → retry placing a blocked backlog
//!   Snapshot      → observer.on_snapshot, reschedule
//! ```
//!
//! Events of a removed vehicle are skipped when they come up.  A vehicle
//! whose event fails is removed and reported; the run carries on.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`event`]     | `Event`, `EventQueue`                                       |
//! | [`protocol`]  | Decision Protocol: lane incentives, neighbour traffic       |
//! | [`generator`] | `GeneratorSpec`, `Interarrival`, `GeneratorStats`           |
//! | [`builder`]   | `SimBuilder`                                                |
//! | [`sim`]       | `Sim`: event loop and vehicle event handlers                |
//! | [`observer`]  | `SimObserver`, `NoopObserver`                               |
//! | [`error`]     | `SimError`, `SimResult<T>`, `GtuFailure`                    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gtu_core::SimConfig;
//! use gtu_sim::{GeneratorSpec, Interarrival, NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), network)
//!     .generator(GeneratorSpec::new("entry", lane, 0.0, car, Interarrival::Exponential { mean: 3.0 }))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod event;
pub mod generator;
pub mod observer;
pub mod protocol;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{GtuFailure, SimError, SimResult};
pub use event::{Event, EventQueue};
pub use generator::{GeneratorSpec, GeneratorStats, Interarrival};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;

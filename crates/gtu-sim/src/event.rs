//! `EventQueue`: the time-ordered agenda of the discrete-event loop.
//!
//! Events at the same time run in the order they were pushed.  The
//! scheduler relies on this: a `LeaveLane` pushed before the vehicle's next
//! `Move` at the same instant runs first.
//!
//! `BTreeMap` gives O(log T) push and pop where T is the number of distinct
//! pending times.

use std::collections::{BTreeMap, VecDeque};

use gtu_core::{GeneratorId, GtuId, LaneId, SensorId, SimTime};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Event {
    /// Evaluate and commit the vehicle's next movement.
    Move { gtu: GtuId },
    /// The vehicle's front reaches `lane`.  `position` is its reference
    /// position on `lane` at the vehicle's last evaluation.
    EnterLane { gtu: GtuId, lane: LaneId, position: f64 },
    /// The vehicle's rear has left `lane`.
    LeaveLane { gtu: GtuId, lane: LaneId },
    SensorTrigger { gtu: GtuId, sensor: SensorId },
    /// A new vehicle joins the generator's backlog.
    Arrival { generator: GeneratorId },
    /// Try again to place the generator's backlog.
    Placement { generator: GeneratorId },
    Snapshot,
}

impl Event {
    /// The vehicle the event belongs to; such events are dropped once the
    /// vehicle is gone.
    pub fn gtu(&self) -> Option<GtuId> {
        match *self {
            Event::Move { gtu }
            | Event::EnterLane { gtu, .. }
            | Event::LeaveLane { gtu, .. }
            | Event::SensorTrigger { gtu, .. } => Some(gtu),
            Event::Arrival { .. } | Event::Placement { .. } | Event::Snapshot => None,
        }
    }
}

#[derive(Default)]
pub struct EventQueue {
    inner: BTreeMap<SimTime, VecDeque<Event>>,
    /// Cached total event count for O(1) `len()`.
    total: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: SimTime, event: Event) {
        self.inner.entry(time).or_default().push_back(event);
        self.total += 1;
    }

    /// Remove and return the earliest event, oldest first among equal times.
    pub fn pop(&mut self) -> Option<(SimTime, Event)> {
        let mut entry = self.inner.first_entry()?;
        let time = *entry.key();
        let event = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        let event = event?;
        self.total -= 1;
        Some((time, event))
    }

    /// The earliest time with a pending event.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct future times with at least one event.
    pub fn time_count(&self) -> usize {
        self.inner.len()
    }
}

//! Vehicle generators.
//!
//! A generator draws arrival times from an inter-arrival distribution and
//! queues each arrival in a backlog.  Queued vehicles enter the network at
//! the generator's lane position as soon as the entry is clear: nobody
//! overlaps the new vehicle's footprint and the leader ahead is at least
//! the car-following strategy's minimum headway away.

use gtu_core::{GeneratorId, GtuRng, LaneId, NodeId, SimTime};
use gtu_mobility::GtuTemplate;
use rand_distr::{Distribution, Exp};

use crate::{SimError, SimResult};

/// Look-ahead when checking the entry gap, m.
pub const ENTRY_LOOKAHEAD: f64 = 250.0;

// ── Interarrival ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Interarrival {
    /// Poisson arrivals with the given mean headway, s.
    Exponential { mean: f64 },
    /// One arrival every `headway` seconds.
    Fixed { headway: f64 },
}

impl Interarrival {
    fn validate(&self) -> SimResult<()> {
        let (what, v) = match *self {
            Interarrival::Exponential { mean } => ("mean headway", mean),
            Interarrival::Fixed { headway } => ("headway", headway),
        };
        if !(v.is_finite() && v > 0.0) {
            return Err(SimError::Builder(format!("generator {what} must be positive, got {v}")));
        }
        Ok(())
    }

    /// Seconds until the next arrival.
    pub fn sample(&self, rng: &mut GtuRng) -> f64 {
        match *self {
            Interarrival::Exponential { mean } => match Exp::new(1.0 / mean) {
                Ok(exp) => exp.sample(rng.inner()),
                Err(_) => mean,
            },
            Interarrival::Fixed { headway } => headway,
        }
    }
}

// ── GeneratorSpec ─────────────────────────────────────────────────────────────

/// Where, what, and how often a generator produces vehicles.
#[derive(Clone, Debug)]
pub struct GeneratorSpec {
    pub name:          String,
    pub lane:          LaneId,
    /// Front position of new vehicles on `lane`, m.
    pub position:      f64,
    pub template:      GtuTemplate,
    /// Node route for new vehicles, starting at or before the start node of
    /// `lane`'s link.  `None` drives without a route.
    pub route:         Option<Vec<NodeId>>,
    pub interarrival:  Interarrival,
    pub initial_speed: f64,
    /// Stop after this many arrivals.
    pub max_count:     Option<u64>,
    /// No arrivals after this time.
    pub end_time:      Option<SimTime>,
}

impl GeneratorSpec {
    pub fn new(
        name:         impl Into<String>,
        lane:         LaneId,
        position:     f64,
        template:     GtuTemplate,
        interarrival: Interarrival,
    ) -> Self {
        Self {
            name: name.into(),
            lane,
            position,
            template,
            route: None,
            interarrival,
            initial_speed: 0.0,
            max_count: None,
            end_time: None,
        }
    }

    pub fn with_route(mut self, route: Vec<NodeId>) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_initial_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }

    pub fn with_max_count(mut self, count: u64) -> Self {
        self.max_count = Some(count);
        self
    }

    pub fn with_end_time(mut self, end: SimTime) -> Self {
        self.end_time = Some(end);
        self
    }

    pub(crate) fn validate(&self) -> SimResult<()> {
        self.interarrival.validate()?;
        self.template.validate()?;
        if !(self.initial_speed.is_finite() && self.initial_speed >= 0.0) {
            return Err(SimError::Builder(format!(
                "generator {}: initial speed must be non-negative, got {}",
                self.name, self.initial_speed
            )));
        }
        Ok(())
    }
}

// ── Generator ─────────────────────────────────────────────────────────────────

/// Run-time state of one generator.
pub(crate) struct Generator {
    pub id:            GeneratorId,
    pub spec:          GeneratorSpec,
    pub rng:           GtuRng,
    /// Arrivals waiting for a clear entry.
    pub backlog:       u64,
    pub arrivals:      u64,
    pub placed:        u64,
    pub retry_pending: bool,
}

impl Generator {
    pub fn new(id: GeneratorId, spec: GeneratorSpec, seed: u64) -> Self {
        Self {
            id,
            spec,
            rng: GtuRng::for_generator(seed, id),
            backlog: 0,
            arrivals: 0,
            placed: 0,
            retry_pending: false,
        }
    }

    /// Time of the arrival after one at `now`, if the generator has any left.
    pub fn next_arrival(&mut self, now: SimTime) -> Option<SimTime> {
        if self.spec.max_count.is_some_and(|max| self.arrivals >= max) {
            return None;
        }
        let at = now + self.spec.interarrival.sample(&mut self.rng);
        match self.spec.end_time {
            Some(end) if at > end => None,
            _ => Some(at),
        }
    }
}

/// Counters reported by [`Sim::generator_stats`](crate::Sim::generator_stats).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct GeneratorStats {
    pub arrivals: u64,
    pub placed:   u64,
    pub backlog:  u64,
}

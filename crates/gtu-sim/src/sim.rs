//! The `Sim` struct and its event loop.

use gtu_behavior::{HeadwayResult, MovementDecision};
use gtu_core::{GeneratorId, GtuId, LaneId, RelativePosition, SensorId, SimConfig, SimTime};
use gtu_mobility::{Gtu, GtuPhase, GtuTemplate, MobilityError, MobilityResult, Traffic};
use gtu_network::{FreeNavigator, LaneNetwork, NodeRouteNavigator, RouteNavigator, SensorKind};

use crate::generator::{Generator, GeneratorStats, ENTRY_LOOKAHEAD};
use crate::{protocol, Event, EventQueue, GtuFailure, SimError, SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` owns the network, every live vehicle, and the event queue, and
/// executes events strictly in time order:
///
/// - **Move**: the vehicle runs the decision protocol, commits the new
///   acceleration (and lane change), then schedules everything that happens
///   before its next move: sensor passages, entering the next lane when
///   the front crosses a lane end, leaving a lane when the rear does.
/// - **EnterLane / LeaveLane**: lane registration changes.
/// - **SensorTrigger**: sinks remove the vehicle; detectors count it.
/// - **Arrival / Placement**: generators queue and place new vehicles.
///
/// A vehicle whose event fails is removed and reported in
/// [`failures`](Self::failures); the run continues unless
/// `config.abort_on_failure` is set.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config:       SimConfig,
    network:          LaneNetwork,
    traffic:          Traffic,
    pub(crate) queue: EventQueue,
    now:              SimTime,
    generators:       Vec<Generator>,
    /// Passages per sensor, indexed by `SensorId`.
    detections:       Vec<u64>,
    failures:         Vec<GtuFailure>,
    events:           u64,
}

impl Sim {
    pub(crate) fn new(
        config:     SimConfig,
        network:    LaneNetwork,
        queue:      EventQueue,
        generators: Vec<Generator>,
    ) -> Self {
        Self {
            now:        config.start_time,
            traffic:    Traffic::new(&network),
            detections: vec![0; network.sensors.len()],
            config,
            network,
            queue,
            generators,
            failures:   Vec::new(),
            events:     0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn network(&self) -> &LaneNetwork {
        &self.network
    }

    pub fn traffic(&self) -> &Traffic {
        &self.traffic
    }

    pub fn gtu(&self, id: GtuId) -> SimResult<&Gtu> {
        Ok(self.traffic.gtu(id)?)
    }

    /// Vehicles removed because one of their events failed, oldest first.
    pub fn failures(&self) -> &[GtuFailure] {
        &self.failures
    }

    /// Passages registered by a detector (or sink) so far.
    pub fn detections(&self, sensor: SensorId) -> u64 {
        self.detections.get(sensor.index()).copied().unwrap_or(0)
    }

    pub fn generator_stats(&self, generator: GeneratorId) -> SimResult<GeneratorStats> {
        let g = self.generators.get(generator.index()).ok_or(SimError::UnknownGenerator(generator))?;
        Ok(GeneratorStats { arrivals: g.arrivals, placed: g.placed, backlog: g.backlog })
    }

    pub fn events_processed(&self) -> u64 {
        self.events
    }

    // ── Vehicles ──────────────────────────────────────────────────────────

    /// Place a vehicle on `lanes` (reference positions) at the current time
    /// and schedule its first move immediately.
    pub fn add_gtu(
        &mut self,
        template:  &GtuTemplate,
        navigator: Box<dyn RouteNavigator>,
        lanes:     &[(LaneId, f64)],
        speed:     f64,
    ) -> SimResult<GtuId> {
        let id = self.traffic.gtus.allocate_id();
        let gtu = Gtu::new(id, template, navigator, speed, self.now)?;
        let id = self.traffic.insert(&self.network, gtu, lanes)?;
        self.queue.push(self.now, Event::Move { gtu: id });
        log::debug!("added {id} on {lanes:?} at {}", self.now);
        Ok(id)
    }

    /// Take a vehicle out of the run.  Its pending events are dropped.
    pub fn remove_gtu(&mut self, id: GtuId) -> SimResult<()> {
        self.traffic.destroy(&self.network, id)?;
        log::debug!("removed {id} at {}", self.now);
        Ok(())
    }

    // ── Event loop ────────────────────────────────────────────────────────

    /// Run until `config.end_time`.  Events at exactly the end time still
    /// execute.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        log::info!("simulation running from {} to {}", self.now, self.config.end_time);
        self.run_until(self.config.end_time, observer)?;
        log::info!(
            "simulation finished at {}: {} events, {} vehicles alive, {} failures",
            self.now,
            self.events,
            self.traffic.gtus.len(),
            self.failures.len()
        );
        observer.on_sim_end(self.now);
        Ok(())
    }

    /// Execute every event due at or before `until`, then set the clock to
    /// `until`.  Ignores `config.end_time`; useful for tests and
    /// incremental stepping.
    pub fn run_until<O: SimObserver>(&mut self, until: SimTime, observer: &mut O) -> SimResult<()> {
        while self.queue.next_time().is_some_and(|t| t <= until) {
            self.step(observer)?;
        }
        self.now = self.now.max(until);
        Ok(())
    }

    /// Execute the next event.  Returns `false` when the queue is empty.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        let Some((time, event)) = self.queue.pop() else {
            return Ok(false);
        };
        self.now = time;
        self.events += 1;
        self.dispatch(event, observer)?;
        Ok(true)
    }

    fn dispatch<O: SimObserver>(&mut self, event: Event, observer: &mut O) -> SimResult<()> {
        if let Some(gtu) = event.gtu() {
            if !self.traffic.gtus.contains(gtu) {
                log::trace!("skipping {event:?} at {}: {gtu} is gone", self.now);
                return Ok(());
            }
            return match self.vehicle_event(gtu, event, observer) {
                Ok(()) => Ok(()),
                Err(e) if self.config.abort_on_failure => Err(e),
                Err(e) => {
                    self.quarantine(gtu, e, observer);
                    Ok(())
                }
            };
        }
        match event {
            Event::Arrival { generator } => self.arrival(generator),
            Event::Placement { generator } => {
                self.generator_mut(generator)?.retry_pending = false;
                self.place_backlog(generator)
            }
            Event::Snapshot => {
                observer.on_snapshot(self.now, &self.traffic, &self.network);
                if let Some(dt) = self.config.snapshot_interval {
                    let next = self.now + dt;
                    if next <= self.config.end_time {
                        self.queue.push(next, Event::Snapshot);
                    }
                }
                Ok(())
            }
            Event::Move { .. } | Event::EnterLane { .. } | Event::LeaveLane { .. } | Event::SensorTrigger { .. } => {
                Ok(())
            }
        }
    }

    fn vehicle_event<O: SimObserver>(&mut self, id: GtuId, event: Event, observer: &mut O) -> SimResult<()> {
        match event {
            Event::Move { .. } => self.move_gtu(id, observer),
            Event::EnterLane { lane, position, .. } => self.enter_lane(id, lane, position),
            Event::LeaveLane { lane, .. } => self.leave_lane(id, lane),
            Event::SensorTrigger { sensor, .. } => self.trigger(id, sensor, observer),
            Event::Arrival { .. } | Event::Placement { .. } | Event::Snapshot => Ok(()),
        }
    }

    /// Remove a failed vehicle and record the failure.
    fn quarantine<O: SimObserver>(&mut self, id: GtuId, error: SimError, observer: &mut O) {
        let now = self.now;
        log::error!("{id} failed at {now}: {error}; removing it from the run");
        if self.traffic.gtus.contains(id) {
            if let Err(e) = self.traffic.destroy(&self.network, id) {
                log::warn!("could not deregister {id}: {e}");
            }
        }
        let failure = GtuFailure { gtu: id, time: now, error };
        observer.on_failure(&failure);
        self.failures.push(failure);
    }

    /// Run `f` on a vehicle taken out of the store, so that it can be
    /// mutated alongside the lane occupancy lists.  The vehicle is put back
    /// whatever `f` returns.
    fn with_gtu<T>(
        &mut self,
        id: GtuId,
        f:  impl FnOnce(&mut Traffic, &LaneNetwork, &mut Gtu) -> SimResult<T>,
    ) -> SimResult<T> {
        let mut gtu = self.traffic.gtus.take(id)?;
        let result = f(&mut self.traffic, &self.network, &mut gtu);
        self.traffic.gtus.put(gtu);
        result
    }

    // ── Vehicle events ────────────────────────────────────────────────────

    fn move_gtu<O: SimObserver>(&mut self, id: GtuId, observer: &mut O) -> SimResult<()> {
        let now = self.now;
        let gtu = self.traffic.gtus.get_mut(id)?;
        let expected = gtu.kinematics.next_evaluation;
        if expected != now {
            return Err(MobilityError::SchedulingInconsistency { gtu: id, expected, fired: now }.into());
        }
        if gtu.lanes().is_empty() {
            self.traffic.destroy(&self.network, id)?;
            log::debug!("{id} occupies no lane at {now}; removed");
            return Ok(());
        }
        gtu.phase = GtuPhase::Evaluating;

        let gtu = self.traffic.gtu(id)?;
        let decision = protocol::decide(&self.network, &self.traffic, gtu, &self.config, now)?;
        check_decision(id, &decision, now)?;

        self.with_gtu(id, |traffic, network, gtu| {
            gtu.commit_move(network, decision.acceleration, decision.valid_until, now)?;
            if let Some(direction) = decision.lane_change {
                traffic.change_lane(network, gtu, direction, now)?;
            }
            gtu.phase = GtuPhase::Committed;
            Ok(())
        })?;

        let gtu = self.traffic.gtu(id)?;
        observer.on_move(now, gtu, &self.network);
        for (time, event) in crossing_events(&self.network, gtu)? {
            self.queue.push(time, event);
        }
        let next = gtu.kinematics.next_evaluation;
        self.queue.push(next, Event::Move { gtu: id });
        self.traffic.gtus.get_mut(id)?.phase = GtuPhase::Scheduled;
        Ok(())
    }

    fn enter_lane(&mut self, id: GtuId, lane: LaneId, position: f64) -> SimResult<()> {
        let now = self.now;
        self.with_gtu(id, |traffic, network, gtu| {
            let new_link = gtu.ledger().fraction(network.link_of(lane)).is_none();
            if traffic.enter_lane(network, gtu, lane, position, now)? && new_link {
                gtu.navigator_mut().visit_next_node();
            }
            gtu.check_invariant(network)?;
            log::debug!("{} entered lane {lane} at {now}", gtu.id);
            Ok(())
        })
    }

    fn leave_lane(&mut self, id: GtuId, lane: LaneId) -> SimResult<()> {
        let now = self.now;
        self.with_gtu(id, |traffic, network, gtu| {
            if traffic.leave_lane(network, gtu, lane, false) {
                log::debug!("{} left lane {lane} at {now}", gtu.id);
            }
            gtu.check_invariant(network)?;
            Ok(())
        })
    }

    fn trigger<O: SimObserver>(&mut self, id: GtuId, sensor_id: SensorId, observer: &mut O) -> SimResult<()> {
        let now = self.now;
        let sensor = self.network.sensor(sensor_id);
        let gtu = self.traffic.gtu(id)?;
        if !gtu.ledger().contains(sensor.lane) {
            log::trace!("{id} no longer on lane {} at {now}; sensor {} not fired", sensor.lane, sensor.name);
            return Ok(());
        }
        self.detections[sensor_id.index()] += 1;
        match sensor.kind {
            SensorKind::Detector => {
                log::trace!("{id} passed detector {} at {now}", sensor.name);
                observer.on_detection(now, sensor, gtu);
            }
            SensorKind::Sink => {
                let gtu = self.traffic.destroy(&self.network, id)?;
                log::debug!("{id} left the network at sink {} at {now}", sensor.name);
                observer.on_exit(now, sensor, &gtu);
            }
        }
        Ok(())
    }

    // ── Generators ────────────────────────────────────────────────────────

    fn generator_mut(&mut self, id: GeneratorId) -> SimResult<&mut Generator> {
        self.generators.get_mut(id.index()).ok_or(SimError::UnknownGenerator(id))
    }

    fn arrival(&mut self, id: GeneratorId) -> SimResult<()> {
        let now = self.now;
        let generator = self.generator_mut(id)?;
        generator.arrivals += 1;
        generator.backlog += 1;
        if let Some(at) = generator.next_arrival(now) {
            self.queue.push(at, Event::Arrival { generator: id });
        }
        self.place_backlog(id)
    }

    /// Place queued vehicles while the entry is clear; otherwise make sure a
    /// retry is scheduled.
    fn place_backlog(&mut self, id: GeneratorId) -> SimResult<()> {
        loop {
            let generator = self.generators.get(id.index()).ok_or(SimError::UnknownGenerator(id))?;
            if generator.backlog == 0 {
                return Ok(());
            }
            if !self.entry_clear(generator)? {
                let retry = self.now + self.config.generator_retry_interval;
                let generator = self.generator_mut(id)?;
                if !generator.retry_pending {
                    generator.retry_pending = true;
                    self.queue.push(retry, Event::Placement { generator: id });
                }
                return Ok(());
            }
            self.place(id)?;
        }
    }

    fn entry_clear(&self, generator: &Generator) -> SimResult<bool> {
        let spec = &generator.spec;
        let now = self.now;
        let rear = spec.position + RelativePosition::Rear.offset(spec.template.length);
        for &other in self.traffic.occupancy.on(spec.lane) {
            let gtu = self.traffic.gtu(other)?;
            let front = gtu.position(&self.network, spec.lane, RelativePosition::Front, now)?;
            let back = gtu.position(&self.network, spec.lane, RelativePosition::Rear, now)?;
            if front > rear && back < spec.position {
                return Ok(false);
            }
        }
        let ahead = self.traffic.nearest_forward(
            &self.network,
            GtuId::INVALID,
            spec.lane,
            spec.position,
            ENTRY_LOOKAHEAD,
            now,
            spec.template.class,
        )?;
        Ok(match ahead {
            HeadwayResult::NoneFound => true,
            HeadwayResult::Found { gtu, distance } => {
                let leader_speed = self.traffic.gtu(gtu)?.speed_at(now);
                distance >= spec.template.car_following.minimum_headway(spec.initial_speed, leader_speed)
            }
        })
    }

    fn place(&mut self, id: GeneratorId) -> SimResult<GtuId> {
        let now = self.now;
        let generator = self.generators.get(id.index()).ok_or(SimError::UnknownGenerator(id))?;
        let spec = &generator.spec;
        let navigator: Box<dyn RouteNavigator> = match &spec.route {
            Some(route) => {
                let start = self.network.link(self.network.link_of(spec.lane)).from;
                Box::new(NodeRouteNavigator::starting_at(route.clone(), start)?)
            }
            None => Box::new(FreeNavigator),
        };
        let gtu_id = self.traffic.gtus.allocate_id();
        let gtu = Gtu::new(gtu_id, &spec.template, navigator, spec.initial_speed, now)?;
        self.traffic.insert(&self.network, gtu, &[(spec.lane, spec.position)])?;
        self.queue.push(now, Event::Move { gtu: gtu_id });
        log::debug!("generator {} placed {gtu_id} on lane {} at {now}", spec.name, spec.lane);

        let generator = self.generator_mut(id)?;
        generator.backlog -= 1;
        generator.placed += 1;
        Ok(gtu_id)
    }
}

// ── Scheduling helpers ────────────────────────────────────────────────────────

fn check_decision(id: GtuId, decision: &MovementDecision, now: SimTime) -> SimResult<()> {
    if !decision.acceleration.is_finite() {
        return Err(SimError::InvalidDecision {
            gtu:    id,
            detail: format!("acceleration {}", decision.acceleration),
        });
    }
    if !(decision.valid_until.as_secs().is_finite() && decision.valid_until > now) {
        return Err(SimError::InvalidDecision {
            gtu:    id,
            detail: format!("valid until {} is not after {now}", decision.valid_until),
        });
    }
    Ok(())
}

/// Everything `gtu` passes during its committed interval: sensor firings
/// and lane entries at their exact times, lane exits at the interval end.
///
/// Sensors use half-open ranges `[from, from + travel)` so a point that
/// ends an interval exactly on a sensor fires in the next one.  A lane end
/// is crossed once the front would pass it and no successor is occupied
/// yet, which also catches a front that rounding put just past the end.
///
/// Lanes entered during the interval are scanned too, so a move that
/// crosses a short lane enters every lane on the way.
fn crossing_events(network: &LaneNetwork, gtu: &Gtu) -> MobilityResult<Vec<(SimTime, Event)>> {
    let k = gtu.kinematics;
    let (start, end) = (k.last_evaluation, k.next_evaluation);
    let travel = k.planned_distance();
    let mut events = Vec::new();
    if travel <= 0.0 {
        return Ok(events);
    }
    let at = |distance: f64| k.time_at_distance(distance).unwrap_or(end).min(end.prev()).max(start);

    // (lane, front at `start` in lane coordinates, links past the navigator's current one)
    let mut scan = Vec::with_capacity(gtu.lanes().len() + 1);
    for &lane in gtu.lanes() {
        scan.push((lane, gtu.position(network, lane, RelativePosition::Front, start)?, 0));
    }
    let mut i = 0;
    while let Some(&(lane, front, links_ahead)) = scan.get(i) {
        i += 1;
        for point in [RelativePosition::Front, RelativePosition::Rear, RelativePosition::Reference] {
            let from = front + point.offset(gtu.length);
            for sensor in network.sensors_for(lane, point, gtu.class) {
                if from <= sensor.position && sensor.position < from + travel {
                    events.push((at(sensor.position - from), Event::SensorTrigger { gtu: gtu.id, sensor: sensor.id }));
                }
            }
        }

        let length = network.lane(lane).length;
        let entered = network.next_lanes(lane, gtu.class).any(|n| gtu.ledger().contains(n));
        if length < front + travel && !entered && !sink_ahead(network, gtu, lane, front) {
            let next = gtu.determine_next_lane_beyond(network, lane, links_ahead)?;
            let position = front - length;
            events.push((at(length - front), Event::EnterLane { gtu: gtu.id, lane: next, position }));
            scan.push((next, position, links_ahead + 1));
        }
        let rear = front + RelativePosition::Rear.offset(gtu.length);
        if length < rear + travel {
            events.push((end, Event::LeaveLane { gtu: gtu.id, lane }));
        }
    }
    Ok(events)
}

/// Whether a sink for `gtu` lies on `lane` at or beyond `front`; such a
/// vehicle leaves the network and needs no next lane.
fn sink_ahead(network: &LaneNetwork, gtu: &Gtu, lane: LaneId, front: f64) -> bool {
    network
        .lane(lane)
        .sensors
        .iter()
        .map(|&s| network.sensor(s))
        .any(|s| s.kind == SensorKind::Sink && s.classes.contains(gtu.class) && s.position >= front)
}

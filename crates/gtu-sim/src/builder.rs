//! Fluent builder for constructing a [`Sim`].

use gtu_core::{GeneratorId, SimConfig};
use gtu_network::{LaneNetwork, NodeRouteNavigator};

use crate::generator::Generator;
use crate::{Event, EventQueue, GeneratorSpec, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: time window, seed, look-ahead distances, incentives, …
/// - [`LaneNetwork`]: from [`gtu_network::LaneNetworkBuilder`]
///
/// # Optional inputs
///
/// | Method            | Default        |
/// |-------------------|----------------|
/// | `.generator(spec)`| no generators  |
///
/// Vehicles can also be placed directly with [`Sim::add_gtu`] after
/// building.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, network)
///     .generator(GeneratorSpec::new("on-ramp", lane, 0.0, car, Interarrival::Exponential { mean: 4.0 }))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    network:    LaneNetwork,
    generators: Vec<GeneratorSpec>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, network: LaneNetwork) -> Self {
        Self { config, network, generators: Vec::new() }
    }

    pub fn generator(mut self, spec: GeneratorSpec) -> Self {
        self.generators.push(spec);
        self
    }

    /// Validate inputs, schedule the first arrivals, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        let start = self.config.start_time;

        let mut generators = Vec::with_capacity(self.generators.len());
        for (i, spec) in self.generators.into_iter().enumerate() {
            check_generator(&self.network, &spec)?;
            let id = u16::try_from(i)
                .map(GeneratorId)
                .map_err(|_| SimError::Builder(format!("generator {}: more than {} generators", spec.name, u16::MAX)))?;
            generators.push(Generator::new(id, spec, self.config.seed));
        }

        let mut queue = EventQueue::new();
        for generator in &mut generators {
            if let Some(at) = generator.next_arrival(start) {
                queue.push(at, Event::Arrival { generator: generator.id });
            }
        }
        if self.config.snapshot_interval.is_some() {
            queue.push(start, Event::Snapshot);
        }

        log::debug!(
            "built simulation: {} lanes, {} sensors, {} generators",
            self.network.lane_count(),
            self.network.sensors.len(),
            generators.len()
        );
        Ok(Sim::new(self.config, self.network, queue, generators))
    }
}

fn check_generator(network: &LaneNetwork, spec: &GeneratorSpec) -> SimResult<()> {
    spec.validate()?;
    let lane = network.try_lane(spec.lane)?;
    if !lane.is_compatible(spec.template.class) {
        return Err(SimError::Builder(format!(
            "generator {}: lane {} does not admit {}",
            spec.name, spec.lane, spec.template.class
        )));
    }
    if !(0.0..=lane.length).contains(&spec.position) {
        return Err(SimError::Builder(format!(
            "generator {}: position {} is not on lane {} of length {}",
            spec.name, spec.position, spec.lane, lane.length
        )));
    }
    if let Some(route) = &spec.route {
        NodeRouteNavigator::starting_at(route.clone(), network.link(lane.link).from)?;
    }
    Ok(())
}

//! lane_drop — a two-lane road that narrows to one lane.
//!
//! Cars enter on both lanes, trucks on the right lane only.  Cars on the
//! left lane must merge before the lane ends; vehicles leave through a
//! sink at the far end.  Trajectories, detector passages, and failures are
//! written as CSV.
//!
//! ```text
//! lane_drop [config.json] [output-dir]
//! ```
//!
//! `config.json` holds any subset of `SimConfig` fields; missing fields
//! keep their defaults.  Set `RUST_LOG=info` (or `debug`) for progress.

mod network;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use gtu_behavior::{EgoisticLaneChange, IdmPlus};
use gtu_core::{GeneratorId, SimConfig, SimTime, VehicleClass};
use gtu_mobility::{Gtu, GtuTemplate, Traffic};
use gtu_network::{DijkstraRouter, LaneNetwork, Router, Sensor};
use gtu_output::{CsvWriter, OutputWriter, SimOutputObserver};
use gtu_sim::{GeneratorSpec, GtuFailure, Interarrival, SimBuilder, SimObserver};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:               u64 = 42;
const SIM_SECS:           f64 = 900.0;
const CAR_HEADWAY_LEFT:   f64 = 6.0; // mean seconds between arrivals
const CAR_HEADWAY_RIGHT:  f64 = 5.0;
const TRUCK_HEADWAY:      f64 = 30.0;
const ENTRY_SPEED:        f64 = 20.0;
const DEFAULT_OUTPUT_DIR: &str = "output/lane_drop";

// ── Vehicle types ─────────────────────────────────────────────────────────────

fn car() -> GtuTemplate {
    GtuTemplate::new(
        VehicleClass::Car,
        4.5,
        1.8,
        36.0,
        Arc::new(IdmPlus::default()),
        Arc::new(EgoisticLaneChange),
    )
}

fn truck() -> Result<GtuTemplate> {
    Ok(GtuTemplate::new(
        VehicleClass::Truck,
        15.0,
        2.5,
        25.0,
        Arc::new(IdmPlus::new(0.4, 1.5, 3.0, 1.5, 0.5)?),
        Arc::new(EgoisticLaneChange),
    ))
}

// ── Observer wrapper to count events ─────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:    SimOutputObserver<W>,
    moves:    u64,
    exits:    u64,
    failures: u64,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, moves: 0, exits: 0, failures: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_move(&mut self, now: SimTime, gtu: &Gtu, network: &LaneNetwork) {
        self.moves += 1;
        self.inner.on_move(now, gtu, network);
    }

    fn on_detection(&mut self, now: SimTime, detector: &Sensor, gtu: &Gtu) {
        self.inner.on_detection(now, detector, gtu);
    }

    fn on_exit(&mut self, now: SimTime, sink: &Sensor, gtu: &Gtu) {
        self.exits += 1;
        self.inner.on_exit(now, sink, gtu);
    }

    fn on_failure(&mut self, failure: &GtuFailure) {
        self.failures += 1;
        self.inner.on_failure(failure);
    }

    fn on_snapshot(&mut self, now: SimTime, traffic: &Traffic, network: &LaneNetwork) {
        log::info!("t = {now}: {} vehicles on the road", traffic.gtus.len());
        self.inner.on_snapshot(now, traffic, network);
    }

    fn on_sim_end(&mut self, now: SimTime) {
        self.inner.on_sim_end(now);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            end_time: SimTime(SIM_SECS),
            seed: SEED,
            snapshot_interval: Some(60.0),
            ..SimConfig::default()
        });
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    println!("=== lane_drop — lane-based GTU simulation ===");

    // 1. Configuration.
    let config = load_config(config_path.as_deref())?;
    println!(
        "Sim: {} → {}, seed {}, keep {}",
        config.start_time,
        config.end_time,
        config.seed,
        config.preferred_direction.as_str()
    );

    // 2. Road network and route.
    let road = build_network()?;
    let [left, right, _] = road.lanes;
    let [west, _, east] = road.nodes;
    let route = DijkstraRouter.route(&road.network, west, east, VehicleClass::Car)?;
    println!(
        "Road: {} nodes, {} links, {} lanes; route {:?} ({:.0} s free flow)",
        road.network.node_count(),
        road.network.link_count(),
        road.network.lane_count(),
        route.nodes,
        route.travel_secs
    );

    // 3. Generators.
    let generators = [
        GeneratorSpec::new("cars-left", left, 0.0, car(), Interarrival::Exponential { mean: CAR_HEADWAY_LEFT }),
        GeneratorSpec::new("cars-right", right, 0.0, car(), Interarrival::Exponential { mean: CAR_HEADWAY_RIGHT }),
        GeneratorSpec::new("trucks", right, 0.0, truck()?, Interarrival::Exponential { mean: TRUCK_HEADWAY }),
    ];
    let mut builder = SimBuilder::new(config.clone(), road.network);
    for spec in generators {
        builder = builder.generator(
            spec.with_route(route.nodes.clone()).with_initial_speed(ENTRY_SPEED).with_end_time(config.end_time),
        );
    }
    let mut sim = builder.build()?;

    // 4. Output.
    std::fs::create_dir_all(&output_dir).with_context(|| format!("creating {}", output_dir.display()))?;
    let writer = CsvWriter::new(&output_dir)?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer));

    // 5. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 6. Summary.
    println!("Simulation complete in {:.3} s ({} events)", elapsed.as_secs_f64(), sim.events_processed());
    println!("  moves     : {}", obs.moves);
    println!("  exits     : {}", obs.exits);
    println!("  failures  : {}", obs.failures);
    println!("  on road   : {}", sim.traffic().gtus.len());
    println!("  output    : {}", output_dir.display());
    println!();

    println!("{:<12} {:>9} {:>7} {:>8}", "Generator", "Arrivals", "Placed", "Backlog");
    println!("{}", "-".repeat(39));
    for (i, name) in (0u16..).zip(["cars-left", "cars-right", "trucks"]) {
        let stats = sim.generator_stats(GeneratorId(i))?;
        println!("{:<12} {:>9} {:>7} {:>8}", name, stats.arrivals, stats.placed, stats.backlog);
    }
    println!();

    println!("{:<16} {:>10}", "Sensor", "Passages");
    println!("{}", "-".repeat(27));
    for sensor in road.detectors.into_iter().chain([road.sink]) {
        println!("{:<16} {:>10}", sim.network().sensor(sensor).name, sim.detections(sensor));
    }

    for failure in sim.failures() {
        println!("failed: {} at {}: {}", failure.gtu, failure.time, failure.error);
    }

    Ok(())
}

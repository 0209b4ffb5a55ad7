//! Routing trait and default Dijkstra implementation.
//!
//! Routes are node sequences over links; which *lane* a vehicle uses is
//! decided during the run by the decision protocol and the navigator, not
//! by the router.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use gtu_core::{LinkId, NodeId, VehicleClass};

use crate::{LaneNetwork, NetworkError, NetworkResult};

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Nodes to pass in order, source first, destination last.
    pub nodes:       Vec<NodeId>,
    /// Links between consecutive nodes; `links.len() == nodes.len() - 1`.
    pub links:       Vec<LinkId>,
    /// Free-flow travel time at the class speed limits, seconds.
    pub travel_secs: f64,
}

impl Route {
    pub fn destination(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// `true` if source and destination coincide.
    pub fn is_trivial(&self) -> bool {
        self.links.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to` usable by `class`.
    fn route(
        &self,
        network: &LaneNetwork,
        from:    NodeId,
        to:      NodeId,
        class:   VehicleClass,
    ) -> NetworkResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Dijkstra over links, cost = link length / fastest compatible lane speed
/// limit.  Links without a lane admitting the class are impassable.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network: &LaneNetwork,
        from:    NodeId,
        to:      NodeId,
        class:   VehicleClass,
    ) -> NetworkResult<Route> {
        for n in [from, to] {
            if n.index() >= network.node_count() {
                return Err(NetworkError::UnknownNode(n));
            }
        }
        dijkstra(network, from, to, class)
    }
}

/// Free-flow traversal time of `link` for `class`, or `None` if impassable.
fn link_cost(network: &LaneNetwork, link: LinkId, class: VehicleClass) -> Option<f64> {
    let vmax = network
        .compatible_lanes(link, class)
        .map(|l| network.speed_limit(l, class))
        .fold(f64::NAN, f64::max);
    if vmax.is_nan() {
        return None;
    }
    Some(network.link(link).length / vmax)
}

/// Heap key with a total order on the `f64` cost.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Cost(u64);

impl Cost {
    // Non-negative finite costs order the same as their bit patterns.
    fn of(secs: f64) -> Self {
        Cost(secs.to_bits())
    }
}

fn dijkstra(
    network: &LaneNetwork,
    from:    NodeId,
    to:      NodeId,
    class:   VehicleClass,
) -> NetworkResult<Route> {
    if from == to {
        return Ok(Route { nodes: vec![from], links: vec![], travel_secs: 0.0 });
    }

    let n = network.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev_link = vec![LinkId::INVALID; n];
    dist[from.index()] = 0.0;

    // Secondary key NodeId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost::of(0.0), from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        let cost = f64::from_bits(cost.0);
        if node == to {
            return Ok(reconstruct(network, &prev_link, from, to, cost));
        }
        if cost > dist[node.index()] {
            continue;
        }
        for &link in network.out_links(node) {
            let Some(c) = link_cost(network, link, class) else { continue };
            let next = network.link(link).to;
            let new_cost = cost + c;
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev_link[next.index()] = link;
                heap.push(Reverse((Cost::of(new_cost), next)));
            }
        }
    }

    Err(NetworkError::NoRoute { from, to })
}

fn reconstruct(
    network:   &LaneNetwork,
    prev_link: &[LinkId],
    from:      NodeId,
    to:        NodeId,
    total:     f64,
) -> Route {
    let mut links = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let l = prev_link[cur.index()];
        links.push(l);
        cur = network.link(l).from;
        nodes.push(cur);
    }
    links.reverse();
    nodes.reverse();
    Route { nodes, links, travel_secs: total }
}

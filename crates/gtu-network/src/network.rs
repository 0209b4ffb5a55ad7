//! Lane network representation and builder.
//!
//! # Data layout
//!
//! Nodes, links, lanes, and sensors live in flat arenas indexed by their
//! typed ids (`network.lanes[lane.index()]`).  A [`Link`] groups parallel
//! lanes between two nodes, ordered left to right in the driving direction.
//! Lane-level connectivity (`next` / `prev`) is explicit so that merges,
//! diverges, and lane drops can be expressed independently of link
//! topology.
//!
//! # Geometry
//!
//! Centerlines are straight: a lane runs from its link's start node to its
//! end node, shifted sideways by its lateral offset.  A lane's longitudinal
//! length may differ from the straight-line distance (e.g. ring roads built
//! from a few nodes); positions are mapped proportionally.

use gtu_core::{
    ClassSet, LaneId, LateralDirection, LinkId, NodeId, Point, Pose, RelativePosition, SensorId,
    VehicleClass,
};

use crate::{NetworkError, NetworkResult, Sensor, SensorKind};

// ── Node / Link / Lane ────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Node {
    pub id:       NodeId,
    pub position: Point,
    pub incoming: Vec<LinkId>,
    pub outgoing: Vec<LinkId>,
}

#[derive(Clone, Debug)]
pub struct Link {
    pub id:     LinkId,
    pub from:   NodeId,
    pub to:     NodeId,
    pub length: f64,
    /// Lanes ordered from leftmost to rightmost.
    pub lanes:  Vec<LaneId>,
}

#[derive(Clone, Debug)]
pub struct Lane {
    pub id:                 LaneId,
    pub link:               LinkId,
    pub length:             f64,
    pub width:              f64,
    /// Lateral offset of the centerline from the link axis (positive = left).
    pub lateral_offset:     f64,
    pub allowed:            ClassSet,
    /// Speed limit for classes without a specific entry, m/s.
    pub speed_limit:        f64,
    pub class_speed_limits: Vec<(VehicleClass, f64)>,
    /// Successor lanes; more than one is a diverge.
    pub next:               Vec<LaneId>,
    /// Predecessor lanes; more than one is a merge.
    pub prev:               Vec<LaneId>,
    /// Sensors on this lane, ascending by position.
    pub sensors:            Vec<SensorId>,
    adjacent:               [Vec<LaneId>; 2],
}

impl Lane {
    #[inline]
    pub fn is_compatible(&self, class: VehicleClass) -> bool {
        self.allowed.contains(class)
    }

    pub fn speed_limit(&self, class: VehicleClass) -> f64 {
        self.class_speed_limits
            .iter()
            .find(|(c, _)| *c == class)
            .map(|&(_, v)| v)
            .unwrap_or(self.speed_limit)
    }

    /// Longitudinal position corresponding to a link fraction.
    #[inline]
    pub fn position(&self, fraction: f64) -> f64 {
        fraction * self.length
    }

    /// Link fraction corresponding to a longitudinal position.
    #[inline]
    pub fn fraction(&self, position: f64) -> f64 {
        position / self.length
    }

    /// Laterally adjacent lanes in `direction`, ignoring class compatibility.
    #[inline]
    pub fn adjacent(&self, direction: LateralDirection) -> &[LaneId] {
        &self.adjacent[direction.slot()]
    }
}

// ── LaneNetwork ───────────────────────────────────────────────────────────────

/// Immutable lane network.  Construct with [`LaneNetworkBuilder`].
#[derive(Clone, Debug, Default)]
pub struct LaneNetwork {
    pub nodes:   Vec<Node>,
    pub links:   Vec<Link>,
    pub lanes:   Vec<Lane>,
    pub sensors: Vec<Sensor>,
}

impl LaneNetwork {
    /// A network with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    // ── Arena access ──────────────────────────────────────────────────────

    /// Direct arena access.  Ids handed out by the builder are always valid
    /// for the network it built.
    #[inline]
    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id.index()]
    }

    #[inline]
    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.index()]
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn sensor(&self, id: SensorId) -> &Sensor {
        &self.sensors[id.index()]
    }

    /// Checked lane lookup for ids that come from outside the network.
    pub fn try_lane(&self, id: LaneId) -> NetworkResult<&Lane> {
        self.lanes.get(id.index()).ok_or(NetworkError::UnknownLane(id))
    }

    #[inline]
    pub fn link_of(&self, lane: LaneId) -> LinkId {
        self.lane(lane).link
    }

    // ── Topology queries ──────────────────────────────────────────────────

    /// Successor lanes of `lane` that admit `class`, in insertion order.
    pub fn next_lanes(&self, lane: LaneId, class: VehicleClass) -> impl Iterator<Item = LaneId> + '_ {
        self.lane(lane)
            .next
            .iter()
            .copied()
            .filter(move |&l| self.lane(l).is_compatible(class))
    }

    /// Predecessor lanes of `lane` that admit `class`.
    pub fn prev_lanes(&self, lane: LaneId, class: VehicleClass) -> impl Iterator<Item = LaneId> + '_ {
        self.lane(lane)
            .prev
            .iter()
            .copied()
            .filter(move |&l| self.lane(l).is_compatible(class))
    }

    /// Lanes a vehicle of `class` may change onto from `lane` in `direction`.
    pub fn accessible_adjacent_lanes(
        &self,
        lane:      LaneId,
        direction: LateralDirection,
        class:     VehicleClass,
    ) -> impl Iterator<Item = LaneId> + '_ {
        self.lane(lane)
            .adjacent(direction)
            .iter()
            .copied()
            .filter(move |&l| self.lane(l).is_compatible(class))
    }

    /// The widest accessible adjacent lane, or `None` if there is none.
    pub fn best_accessible_adjacent_lane(
        &self,
        lane:      LaneId,
        direction: LateralDirection,
        class:     VehicleClass,
    ) -> Option<LaneId> {
        self.accessible_adjacent_lanes(lane, direction, class)
            .max_by(|&a, &b| self.lane(a).width.total_cmp(&self.lane(b).width))
    }

    #[inline]
    pub fn speed_limit(&self, lane: LaneId, class: VehicleClass) -> f64 {
        self.lane(lane).speed_limit(class)
    }

    /// Lanes on `link` admitting `class`, left to right.
    pub fn compatible_lanes(&self, link: LinkId, class: VehicleClass) -> impl Iterator<Item = LaneId> + '_ {
        self.link(link)
            .lanes
            .iter()
            .copied()
            .filter(move |&l| self.lane(l).is_compatible(class))
    }

    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        &self.node(node).outgoing
    }

    /// Sensors on `lane` that a vehicle of `class` triggers with `point`.
    pub fn sensors_for(
        &self,
        lane:  LaneId,
        point: RelativePosition,
        class: VehicleClass,
    ) -> impl Iterator<Item = &Sensor> + '_ {
        self.lane(lane)
            .sensors
            .iter()
            .map(move |&s| self.sensor(s))
            .filter(move |s| s.trigger == point && s.classes.contains(class))
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Planar pose of the point at `position` along `lane`'s centerline.
    ///
    /// Positions outside `[0, length]` are extrapolated along the straight
    /// centerline.
    pub fn location(&self, lane: LaneId, position: f64) -> Pose {
        let l = self.lane(lane);
        let link = self.link(l.link);
        let a = self.node(link.from).position;
        let b = self.node(link.to).position;
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let norm = dx.hypot(dy);
        let (ux, uy) = if norm > 0.0 { (dx / norm, dy / norm) } else { (1.0, 0.0) };
        let axis = a.lerp(b, l.fraction(position));
        Pose {
            point:   Point::new(axis.x - uy * l.lateral_offset, axis.y + ux * l.lateral_offset),
            heading: uy.atan2(ux),
        }
    }
}

// ── LaneSpec ──────────────────────────────────────────────────────────────────

/// Parameters of a lane added through [`LaneNetworkBuilder::add_lane`].
#[derive(Clone, Debug)]
pub struct LaneSpec {
    /// Metres.  Default 3.5.
    pub width:              f64,
    /// m/s.  Default 27.78 (100 km/h).
    pub speed_limit:        f64,
    pub allowed:            ClassSet,
    pub class_speed_limits: Vec<(VehicleClass, f64)>,
    /// Overrides the link length for this lane.
    pub length:             Option<f64>,
}

impl Default for LaneSpec {
    fn default() -> Self {
        Self {
            width:              3.5,
            speed_limit:        100.0 / 3.6,
            allowed:            ClassSet::ALL,
            class_speed_limits: Vec::new(),
            length:             None,
        }
    }
}

impl LaneSpec {
    pub fn with_speed_limit(mut self, speed_limit: f64) -> Self {
        self.speed_limit = speed_limit;
        self
    }

    pub fn with_class_speed_limit(mut self, class: VehicleClass, speed_limit: f64) -> Self {
        self.class_speed_limits.push((class, speed_limit));
        self
    }

    pub fn with_allowed(mut self, allowed: ClassSet) -> Self {
        self.allowed = allowed;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }
}

// ── LaneNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`LaneNetwork`] incrementally, then call [`build`](Self::build).
///
/// Every `add_*` / `connect` call validates its own arguments, so a
/// malformed network is rejected at the call that introduces the problem.
///
/// # Example
///
/// ```
/// use gtu_core::Point;
/// use gtu_network::{LaneNetworkBuilder, LaneSpec};
///
/// let mut b = LaneNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(1_000.0, 0.0));
/// let link = b.add_link(a, c).unwrap();
/// let left = b.add_lane(link, LaneSpec::default()).unwrap();
/// let right = b.add_lane(link, LaneSpec::default()).unwrap();
/// let net = b.build().unwrap();
/// assert_eq!(net.lane(left).adjacent(gtu_core::LateralDirection::Right), &[right]);
/// ```
#[derive(Default)]
pub struct LaneNetworkBuilder {
    nodes:       Vec<Point>,
    links:       Vec<RawLink>,
    lanes:       Vec<RawLane>,
    connections: Vec<(LaneId, LaneId)>,
    no_crossing: Vec<(LaneId, LateralDirection)>,
    sensors:     Vec<Sensor>,
}

struct RawLink {
    from:   NodeId,
    to:     NodeId,
    length: f64,
}

struct RawLane {
    link:   LinkId,
    length: f64,
    spec:   LaneSpec,
}

impl LaneNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(position);
        id
    }

    /// Add a directed link whose length is the distance between its nodes.
    pub fn add_link(&mut self, from: NodeId, to: NodeId) -> NetworkResult<LinkId> {
        let a = *self.nodes.get(from.index()).ok_or(NetworkError::UnknownNode(from))?;
        let b = *self.nodes.get(to.index()).ok_or(NetworkError::UnknownNode(to))?;
        self.add_link_with_length(from, to, a.distance(b))
    }

    /// Add a directed link with an explicit length.
    pub fn add_link_with_length(&mut self, from: NodeId, to: NodeId, length: f64) -> NetworkResult<LinkId> {
        for n in [from, to] {
            if n.index() >= self.nodes.len() {
                return Err(NetworkError::UnknownNode(n));
            }
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(NetworkError::NonPositiveLength {
                what: format!("link {from}->{to}"),
                length,
            });
        }
        let id = LinkId(self.links.len() as u32);
        self.links.push(RawLink { from, to, length });
        Ok(id)
    }

    /// Append a lane to `link`, to the right of the lanes added before it.
    pub fn add_lane(&mut self, link: LinkId, spec: LaneSpec) -> NetworkResult<LaneId> {
        let raw_link = self.links.get(link.index()).ok_or(NetworkError::UnknownLink(link))?;
        let id = LaneId(self.lanes.len() as u32);
        let length = spec.length.unwrap_or(raw_link.length);
        if !(length.is_finite() && length > 0.0) {
            return Err(NetworkError::NonPositiveLength { what: format!("lane {id}"), length });
        }
        if !(spec.width.is_finite() && spec.width > 0.0) {
            return Err(NetworkError::InvalidLaneParameter { lane: id, what: "width", value: spec.width });
        }
        let limits = std::iter::once(spec.speed_limit).chain(spec.class_speed_limits.iter().map(|&(_, v)| v));
        for v in limits {
            if !(v.is_finite() && v > 0.0) {
                return Err(NetworkError::InvalidLaneParameter { lane: id, what: "speed limit", value: v });
            }
        }
        self.lanes.push(RawLane { link, length, spec });
        Ok(id)
    }

    /// Declare `to` a successor of `from`.  The link of `from` must end at
    /// the node where the link of `to` starts.
    pub fn connect(&mut self, from: LaneId, to: LaneId) -> NetworkResult<()> {
        let from_link = self.lanes.get(from.index()).ok_or(NetworkError::UnknownLane(from))?.link;
        let to_link = self.lanes.get(to.index()).ok_or(NetworkError::UnknownLane(to))?.link;
        if self.links[from_link.index()].to != self.links[to_link.index()].from {
            return Err(NetworkError::DisconnectedLanes { from, to, from_link, to_link });
        }
        if !self.connections.contains(&(from, to)) {
            self.connections.push((from, to));
        }
        Ok(())
    }

    /// Connect lane `k` of `from_link` to lane `k` of `to_link`, counting
    /// from the left, for as many lanes as both links have.  Returns the
    /// number of connections made.
    pub fn connect_lanewise(&mut self, from_link: LinkId, to_link: LinkId) -> NetworkResult<usize> {
        let lanes_of = |link: LinkId| -> Vec<LaneId> {
            self.lanes
                .iter()
                .enumerate()
                .filter(|(_, l)| l.link == link)
                .map(|(i, _)| LaneId(i as u32))
                .collect()
        };
        if from_link.index() >= self.links.len() {
            return Err(NetworkError::UnknownLink(from_link));
        }
        if to_link.index() >= self.links.len() {
            return Err(NetworkError::UnknownLink(to_link));
        }
        let from = lanes_of(from_link);
        let to = lanes_of(to_link);
        let n = from.len().min(to.len());
        for k in 0..n {
            self.connect(from[k], to[k])?;
        }
        Ok(n)
    }

    /// Forbid changing from `lane` towards `direction` (solid line).
    pub fn forbid_lane_change(&mut self, lane: LaneId, direction: LateralDirection) -> NetworkResult<()> {
        if lane.index() >= self.lanes.len() {
            return Err(NetworkError::UnknownLane(lane));
        }
        self.no_crossing.push((lane, direction));
        Ok(())
    }

    /// Place a sensor on `lane`.  `position` must lie within the lane.
    pub fn add_sensor(
        &mut self,
        name:     impl Into<String>,
        lane:     LaneId,
        position: f64,
        trigger:  RelativePosition,
        kind:     SensorKind,
    ) -> NetworkResult<SensorId> {
        let raw = self.lanes.get(lane.index()).ok_or(NetworkError::UnknownLane(lane))?;
        if !(0.0..=raw.length).contains(&position) {
            return Err(NetworkError::SensorOutOfRange { lane, position, length: raw.length });
        }
        let id = SensorId(self.sensors.len() as u32);
        self.sensors.push(Sensor {
            id,
            name: name.into(),
            lane,
            position,
            trigger,
            kind,
            classes: ClassSet::ALL,
        });
        Ok(id)
    }

    /// Convenience: a sink triggered by the vehicle's front at `position`.
    pub fn add_sink(&mut self, lane: LaneId, position: f64) -> NetworkResult<SensorId> {
        let name = format!("sink@{lane}");
        self.add_sensor(name, lane, position, RelativePosition::Front, SensorKind::Sink)
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn lane_count(&self) -> usize { self.lanes.len() }

    /// Consume the builder and produce a [`LaneNetwork`].
    ///
    /// Resolves the lateral adjacency table and lane connectivity.  Argument
    /// validation already happened in the `add_*` calls; `build` only fails
    /// if a link was left without lanes.
    pub fn build(self) -> NetworkResult<LaneNetwork> {
        let mut nodes: Vec<Node> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &position)| Node {
                id: NodeId(i as u32),
                position,
                incoming: Vec::new(),
                outgoing: Vec::new(),
            })
            .collect();

        let mut links: Vec<Link> = self
            .links
            .iter()
            .enumerate()
            .map(|(i, raw)| Link {
                id:     LinkId(i as u32),
                from:   raw.from,
                to:     raw.to,
                length: raw.length,
                lanes:  Vec::new(),
            })
            .collect();
        for link in &links {
            nodes[link.from.index()].outgoing.push(link.id);
            nodes[link.to.index()].incoming.push(link.id);
        }

        let mut lanes: Vec<Lane> = self
            .lanes
            .into_iter()
            .enumerate()
            .map(|(i, raw)| Lane {
                id:                 LaneId(i as u32),
                link:               raw.link,
                length:             raw.length,
                width:              raw.spec.width,
                lateral_offset:     0.0,
                allowed:            raw.spec.allowed,
                speed_limit:        raw.spec.speed_limit,
                class_speed_limits: raw.spec.class_speed_limits,
                next:               Vec::new(),
                prev:               Vec::new(),
                sensors:            Vec::new(),
                adjacent:           [Vec::new(), Vec::new()],
            })
            .collect();
        for lane in &lanes {
            links[lane.link.index()].lanes.push(lane.id);
        }
        if let Some(empty) = links.iter().find(|l| l.lanes.is_empty()) {
            return Err(NetworkError::EmptyLink(empty.id));
        }

        // ── Cross-section layout and adjacency table ──────────────────────
        for link in &links {
            let total: f64 = link.lanes.iter().map(|&l| lanes[l.index()].width).sum();
            let mut left_edge = total / 2.0;
            for (k, &l) in link.lanes.iter().enumerate() {
                let w = lanes[l.index()].width;
                lanes[l.index()].lateral_offset = left_edge - w / 2.0;
                left_edge -= w;

                let forbidden = |d: LateralDirection| self.no_crossing.contains(&(l, d));
                if k > 0 && !forbidden(LateralDirection::Left) {
                    lanes[l.index()].adjacent[LateralDirection::Left.slot()].push(link.lanes[k - 1]);
                }
                if k + 1 < link.lanes.len() && !forbidden(LateralDirection::Right) {
                    lanes[l.index()].adjacent[LateralDirection::Right.slot()].push(link.lanes[k + 1]);
                }
            }
        }

        for &(from, to) in &self.connections {
            lanes[from.index()].next.push(to);
            lanes[to.index()].prev.push(from);
        }

        let sensors = self.sensors;
        for s in &sensors {
            lanes[s.lane.index()].sensors.push(s.id);
        }
        for lane in &mut lanes {
            lane.sensors
                .sort_by(|&a, &b| sensors[a.index()].position.total_cmp(&sensors[b.index()].position));
        }

        Ok(LaneNetwork { nodes, links, lanes, sensors })
    }
}

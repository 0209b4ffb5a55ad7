//! Unit tests for gtu-mobility.

use std::sync::Arc;

use gtu_behavior::{FixedAcceleration, NoLaneChange};
use gtu_core::{GtuId, LaneId, NodeId, Point, SimTime, VehicleClass};
use gtu_network::{FreeNavigator, LaneNetwork, LaneNetworkBuilder, LaneSpec, RouteNavigator};

use crate::{Gtu, GtuTemplate, Traffic};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn template(length: f64) -> GtuTemplate {
    GtuTemplate::new(
        VehicleClass::Car,
        length,
        2.0,
        40.0,
        Arc::new(FixedAcceleration::cruise(0.5)),
        Arc::new(NoLaneChange),
    )
}

/// Place a 4 m vehicle with its front at `position` on `lane`.
fn place(traffic: &mut Traffic, net: &LaneNetwork, lane: LaneId, position: f64, speed: f64) -> GtuId {
    place_with(traffic, net, &[(lane, position)], speed, Box::new(FreeNavigator))
}

fn place_with(
    traffic:   &mut Traffic,
    net:       &LaneNetwork,
    lanes:     &[(LaneId, f64)],
    speed:     f64,
    navigator: Box<dyn RouteNavigator>,
) -> GtuId {
    let id = traffic.gtus.allocate_id();
    let gtu = Gtu::new(id, &template(4.0), navigator, speed, SimTime::ZERO).unwrap();
    traffic.insert(net, gtu, lanes).unwrap()
}

/// Single 1000 m lane.
fn straight() -> (LaneNetwork, LaneId) {
    let mut b = LaneNetworkBuilder::new();
    let a = b.add_node(Point::new(0.0, 0.0));
    let c = b.add_node(Point::new(1_000.0, 0.0));
    let link = b.add_link(a, c).unwrap();
    let lane = b.add_lane(link, LaneSpec::default()).unwrap();
    (b.build().unwrap(), lane)
}

/// Two 100 m lanes in series.
fn series() -> (LaneNetwork, [LaneId; 2]) {
    let mut b = LaneNetworkBuilder::new();
    let a = b.add_node(Point::new(0.0, 0.0));
    let m = b.add_node(Point::new(100.0, 0.0));
    let c = b.add_node(Point::new(200.0, 0.0));
    let l1 = b.add_link(a, m).unwrap();
    let l2 = b.add_link(m, c).unwrap();
    let up = b.add_lane(l1, LaneSpec::default()).unwrap();
    let down = b.add_lane(l2, LaneSpec::default()).unwrap();
    b.connect(up, down).unwrap();
    (b.build().unwrap(), [up, down])
}

/// One 500 m link with two lanes, left then right.
fn two_lane() -> (LaneNetwork, [LaneId; 2]) {
    let mut b = LaneNetworkBuilder::new();
    let a = b.add_node(Point::new(0.0, 0.0));
    let c = b.add_node(Point::new(500.0, 0.0));
    let link = b.add_link(a, c).unwrap();
    let l0 = b.add_lane(link, LaneSpec::default()).unwrap();
    let l1 = b.add_lane(link, LaneSpec::default().with_speed_limit(20.0)).unwrap();
    (b.build().unwrap(), [l0, l1])
}

/// Ring of four 250 m lanes.
fn ring() -> (LaneNetwork, [LaneId; 4]) {
    let mut b = LaneNetworkBuilder::new();
    let nodes: Vec<NodeId> = [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]
        .into_iter()
        .map(|(x, y)| b.add_node(Point::new(x, y)))
        .collect();
    let mut lanes = Vec::new();
    for k in 0..4 {
        let link = b.add_link_with_length(nodes[k], nodes[(k + 1) % 4], 250.0).unwrap();
        lanes.push(b.add_lane(link, LaneSpec::default()).unwrap());
    }
    for k in 0..4 {
        b.connect(lanes[k], lanes[(k + 1) % 4]).unwrap();
    }
    (b.build().unwrap(), [lanes[0], lanes[1], lanes[2], lanes[3]])
}

// ── Kinematics ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod kinematics {
    use assert_approx_eq::assert_approx_eq;
    use gtu_core::SimTime;

    use crate::Kinematics;

    fn k(speed: f64, acceleration: f64) -> Kinematics {
        let mut k = Kinematics::new(speed, SimTime::ZERO);
        k.acceleration = acceleration;
        k.next_evaluation = SimTime::from_secs(10.0);
        k
    }

    #[test]
    fn closed_form_motion() {
        let k = k(10.0, 2.0);
        assert_approx_eq!(k.delta_x(SimTime::from_secs(2.0)), 24.0);
        assert_approx_eq!(k.speed_at(SimTime::from_secs(2.0)), 14.0);
        assert_approx_eq!(k.planned_distance(), 200.0);
    }

    #[test]
    fn crossing_times() {
        assert_approx_eq!(k(10.0, 0.0).time_at_distance(50.0).unwrap().as_secs(), 5.0);
        assert_approx_eq!(k(0.0, 2.0).time_at_distance(4.0).unwrap().as_secs(), 2.0);
        assert_approx_eq!(k(10.0, -2.0).time_at_distance(16.0).unwrap().as_secs(), 2.0);
        assert!(k(10.0, -2.0).time_at_distance(30.0).is_none());
        assert!(k(0.0, 0.0).time_at_distance(1.0).is_none());
        assert_eq!(k(5.0, 0.0).time_at_distance(0.0), Some(SimTime::ZERO));
    }

    #[test]
    fn advance_keeps_interval_ordered() {
        let mut k = k(10.0, 1.0);
        k.advance(SimTime::from_secs(2.0), -1.0, SimTime::from_secs(2.5));
        assert_approx_eq!(k.odometer, 22.0);
        assert_approx_eq!(k.speed, 12.0);
        assert_eq!(k.acceleration, -1.0);
        assert!(k.next_evaluation >= k.last_evaluation);
    }
}

// ── Position Ledger ───────────────────────────────────────────────────────────

#[cfg(test)]
mod ledger {
    use assert_approx_eq::assert_approx_eq;
    use gtu_core::{ClassSet, RelativePosition, SimTime};

    use super::*;
    use crate::MobilityError;

    #[test]
    fn reference_position_is_fraction_times_length() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, lane, 250.0, 0.0);
        let gtu = traffic.gtu(id).unwrap();
        assert_approx_eq!(gtu.ledger().fraction(net.link_of(lane)).unwrap(), 0.25);
        assert_approx_eq!(gtu.position(&net, lane, RelativePosition::Reference, SimTime::ZERO).unwrap(), 250.0);
        assert_approx_eq!(gtu.position(&net, lane, RelativePosition::Rear, SimTime::ZERO).unwrap(), 246.0);
        assert_approx_eq!(gtu.fractional_position(&net, lane, RelativePosition::Front, SimTime::ZERO).unwrap(), 0.25);
        gtu.check_invariant(&net).unwrap();
    }

    #[test]
    fn enter_then_leave_restores_fractions() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, up, 40.0, 0.0);
        let mut gtu = traffic.gtus.take(id).unwrap();
        let before = gtu.ledger().clone();

        assert!(traffic.enter_lane(&net, &mut gtu, down, -60.0, SimTime::ZERO).unwrap());
        assert_eq!(gtu.lanes(), &[up, down]);
        assert_approx_eq!(gtu.ledger().fraction(net.link_of(down)).unwrap(), -0.6);
        assert!(traffic.leave_lane(&net, &mut gtu, down, false));

        assert_eq!(gtu.lanes(), before.lanes());
        assert_eq!(gtu.ledger().link_count(), before.link_count());
        assert_eq!(gtu.ledger().fraction(net.link_of(up)), before.fraction(net.link_of(up)));
        assert!(gtu.ledger().fraction(net.link_of(down)).is_none());
        assert!(traffic.occupancy.on(down).is_empty());
        traffic.gtus.put(gtu);
    }

    #[test]
    fn entering_twice_is_a_no_op() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, lane, 10.0, 0.0);
        let mut gtu = traffic.gtus.take(id).unwrap();
        assert!(!traffic.enter_lane(&net, &mut gtu, lane, 500.0, SimTime::ZERO).unwrap());
        assert_approx_eq!(gtu.ledger().fraction(net.link_of(lane)).unwrap(), 0.01);
        assert_eq!(traffic.occupancy.on(lane), &[id]);
    }

    #[test]
    fn query_on_foreign_lane_is_inconsistency() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, up, 40.0, 0.0);
        let r = traffic.gtu(id).unwrap().position(&net, down, RelativePosition::Front, SimTime::ZERO);
        assert!(matches!(r, Err(MobilityError::NetworkInconsistency { .. })));
    }

    #[test]
    fn commit_move_advances_fractions() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, lane, 100.0, 10.0);
        let gtu = traffic.gtus.get_mut(id).unwrap();
        gtu.commit_move(&net, 0.0, SimTime::from_secs(1.0), SimTime::ZERO).unwrap();
        assert_approx_eq!(gtu.position(&net, lane, RelativePosition::Front, SimTime::from_secs(1.0)).unwrap(), 110.0);

        gtu.commit_move(&net, 1.0, SimTime::from_secs(2.0), SimTime::from_secs(1.0)).unwrap();
        assert_approx_eq!(gtu.ledger().fraction(net.link_of(lane)).unwrap(), 0.11);
        assert_approx_eq!(gtu.kinematics.odometer, 10.0);
        assert_approx_eq!(gtu.position(&net, lane, RelativePosition::Front, SimTime::from_secs(2.0)).unwrap(), 120.5);
    }

    #[test]
    fn oldest_lane_wins_on_shared_link() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        let link = b.add_link(a, c).unwrap();
        let short = b.add_lane(link, LaneSpec::default()).unwrap();
        let long = b.add_lane(link, LaneSpec::default().with_length(200.0)).unwrap();
        let net = b.build().unwrap();

        let mut traffic = Traffic::new(&net);
        let id = place_with(&mut traffic, &net, &[(short, 50.0), (long, 0.0)], 10.0, Box::new(FreeNavigator));
        let gtu = traffic.gtus.get_mut(id).unwrap();
        assert_approx_eq!(gtu.ledger().fraction(link).unwrap(), 0.5);
        gtu.commit_move(&net, 0.0, SimTime::from_secs(2.0), SimTime::from_secs(1.0)).unwrap();
        // short: (50 + 10) / 100 = 0.6, long: (100 + 10) / 200 = 0.55
        assert_approx_eq!(gtu.ledger().fraction(link).unwrap(), 0.6);
    }

    #[test]
    fn insert_rejects_bad_placement() {
        let (net, _) = straight();
        let mut traffic = Traffic::new(&net);
        let gtu = Gtu::new(GtuId(0), &template(4.0), Box::new(FreeNavigator), 0.0, SimTime::ZERO).unwrap();
        assert!(traffic.insert(&net, gtu, &[]).is_err());

        let mut b = LaneNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let c = b.add_node(Point::new(100.0, 0.0));
        let link = b.add_link(a, c).unwrap();
        let trucks = b
            .add_lane(link, LaneSpec::default().with_allowed(ClassSet::of(&[VehicleClass::Truck])))
            .unwrap();
        let net2 = b.build().unwrap();
        let mut traffic2 = Traffic::new(&net2);
        let gtu = Gtu::new(GtuId(0), &template(4.0), Box::new(FreeNavigator), 0.0, SimTime::ZERO).unwrap();
        let r = traffic2.insert(&net2, gtu, &[(trucks, 10.0)]);
        assert!(matches!(r, Err(MobilityError::RoutingFailure { .. })));
        assert!(traffic2.occupancy.on(trucks).is_empty());
    }

    #[test]
    fn invalid_template_rejected() {
        let mut t = template(4.0);
        t.max_speed = 0.0;
        let r = Gtu::new(GtuId(0), &t, Box::new(FreeNavigator), 0.0, SimTime::ZERO);
        assert!(matches!(r, Err(MobilityError::InvalidTemplate(_))));
        let r = Gtu::new(GtuId(0), &template(4.0), Box::new(FreeNavigator), -1.0, SimTime::ZERO);
        assert!(r.is_err());
    }

    #[test]
    fn destroy_clears_occupancy() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let id = place_with(&mut traffic, &net, &[(up, 98.0), (down, -2.0)], 0.0, Box::new(FreeNavigator));
        assert_eq!(traffic.occupancy.total(), 2);
        let gtu = traffic.destroy(&net, id).unwrap();
        assert!(!gtu.is_alive());
        assert!(gtu.lanes().is_empty());
        assert_eq!(traffic.occupancy.total(), 0);
        assert!(traffic.gtu(id).is_err());
    }

    #[test]
    fn speed_limit_is_lowest_over_lanes() {
        let (net, [l0, l1]) = two_lane();
        let mut traffic = Traffic::new(&net);
        let id = place_with(&mut traffic, &net, &[(l0, 50.0), (l1, 50.0)], 0.0, Box::new(FreeNavigator));
        assert_eq!(traffic.gtu(id).unwrap().speed_limit(&net), 20.0);
    }

    #[test]
    fn positions_snapshot_in_registration_order() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let id = place_with(&mut traffic, &net, &[(up, 102.0), (down, 2.0)], 0.0, Box::new(FreeNavigator));
        let gtu = traffic.gtu(id).unwrap();
        let rear = gtu.positions(&net, RelativePosition::Rear, SimTime::ZERO).unwrap();
        assert_eq!(rear.len(), 2);
        assert_eq!(rear[0].0, up);
        assert_approx_eq!(rear[0].1, 98.0);
        assert_approx_eq!(rear[1].1, -2.0);
        let fr = gtu.fractional_positions(&net, RelativePosition::Front, SimTime::ZERO).unwrap();
        assert_approx_eq!(fr[0].1, 1.02);
        let pose = gtu.location(&net, SimTime::ZERO).unwrap();
        assert_approx_eq!(pose.point.x, 102.0);
    }
}

// ── Headway search ────────────────────────────────────────────────────────────

#[cfg(test)]
mod headway {
    use assert_approx_eq::assert_approx_eq;
    use gtu_behavior::{Gap, HeadwayResult};
    use gtu_core::{LateralDirection, SimTime};

    use super::*;
    use crate::SearchDirection;

    #[test]
    fn straight_chase_finds_leader_rear() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        let leader = place(&mut traffic, &net, lane, 500.0, 0.0);
        let follower = place(&mut traffic, &net, lane, 0.0, 20.0);
        let f = traffic.gtu(follower).unwrap();
        let h = traffic.headway(&net, f, 500.0, SimTime::ZERO).unwrap();
        assert_eq!(h.gtu(), Some(leader));
        assert_approx_eq!(h.distance().unwrap(), 496.0);
    }

    #[test]
    fn never_beyond_budget() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        place(&mut traffic, &net, lane, 500.0, 0.0);
        let follower = place(&mut traffic, &net, lane, 0.0, 20.0);
        let f = traffic.gtu(follower).unwrap();
        assert_eq!(traffic.headway(&net, f, 400.0, SimTime::ZERO).unwrap(), HeadwayResult::NoneFound);
    }

    #[test]
    fn empty_road_is_none_found() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, lane, 10.0, 20.0);
        let g = traffic.gtu(id).unwrap();
        assert_eq!(traffic.headway(&net, g, 500.0, SimTime::ZERO).unwrap(), HeadwayResult::NoneFound);
        assert_eq!(traffic.headway_back(&net, g, 200.0, SimTime::ZERO).unwrap(), HeadwayResult::NoneFound);
    }

    #[test]
    fn search_crosses_lane_boundary() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let leader = place(&mut traffic, &net, down, 30.0, 0.0);
        let follower = place(&mut traffic, &net, up, 50.0, 0.0);
        let h = traffic.headway(&net, traffic.gtu(follower).unwrap(), 500.0, SimTime::ZERO).unwrap();
        assert_eq!(h.gtu(), Some(leader));
        assert_approx_eq!(h.distance().unwrap(), 76.0);

        let back = traffic.headway_back(&net, traffic.gtu(leader).unwrap(), 200.0, SimTime::ZERO).unwrap();
        assert_eq!(back.gtu(), Some(follower));
        assert_approx_eq!(back.distance().unwrap(), 76.0);
    }

    #[test]
    fn straddling_vehicle_found_once_at_true_distance() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let leader = place_with(&mut traffic, &net, &[(up, 102.0), (down, 2.0)], 0.0, Box::new(FreeNavigator));
        let follower = place(&mut traffic, &net, up, 80.0, 0.0);
        let h = traffic.headway(&net, traffic.gtu(follower).unwrap(), 500.0, SimTime::ZERO).unwrap();
        assert_eq!(h.gtu(), Some(leader));
        assert_approx_eq!(h.distance().unwrap(), 18.0);
    }

    #[test]
    fn ring_road_terminates_and_wraps() {
        let (net, lanes) = ring();
        let mut traffic = Traffic::new(&net);
        let alone = place(&mut traffic, &net, lanes[0], 10.0, 10.0);
        let g = traffic.gtu(alone).unwrap();
        assert_eq!(traffic.headway(&net, g, 5_000.0, SimTime::ZERO).unwrap(), HeadwayResult::NoneFound);
        assert_eq!(traffic.headway_back(&net, g, 5_000.0, SimTime::ZERO).unwrap(), HeadwayResult::NoneFound);

        let behind = place(&mut traffic, &net, lanes[0], 5.0, 10.0);
        let g = traffic.gtu(alone).unwrap();
        let h = traffic.headway(&net, g, 2_000.0, SimTime::ZERO).unwrap();
        assert_eq!(h.gtu(), Some(behind));
        assert_approx_eq!(h.distance().unwrap(), 991.0);
        let b = traffic.headway_back(&net, g, 2_000.0, SimTime::ZERO).unwrap();
        assert_eq!(b.gtu(), Some(behind));
        assert_approx_eq!(b.distance().unwrap(), 1.0);
    }

    #[test]
    fn headway_to_named_vehicle() {
        let (net, lane) = straight();
        let mut traffic = Traffic::new(&net);
        let far = place(&mut traffic, &net, lane, 300.0, 0.0);
        place(&mut traffic, &net, lane, 100.0, 0.0);
        let me = place(&mut traffic, &net, lane, 0.0, 0.0);
        let g = traffic.gtu(me).unwrap();
        let h = traffic.headway_to(&net, g, far, 500.0, SearchDirection::Forward, SimTime::ZERO).unwrap();
        assert_approx_eq!(h.distance().unwrap(), 296.0);
        let none = traffic.headway_to(&net, g, GtuId(99), 500.0, SearchDirection::Forward, SimTime::ZERO).unwrap();
        assert_eq!(none, HeadwayResult::NoneFound);
        let behind = traffic.headway_to(&net, g, far, 500.0, SearchDirection::Backward, SimTime::ZERO).unwrap();
        assert_eq!(behind, HeadwayResult::NoneFound);
    }

    #[test]
    fn headway_is_route_agnostic_at_diverge() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let m = b.add_node(Point::new(100.0, 0.0));
        let c = b.add_node(Point::new(200.0, 50.0));
        let d = b.add_node(Point::new(200.0, -50.0));
        let am = b.add_link(a, m).unwrap();
        let mc = b.add_link(m, c).unwrap();
        let md = b.add_link(m, d).unwrap();
        let up = b.add_lane(am, LaneSpec::default()).unwrap();
        let to_c = b.add_lane(mc, LaneSpec::default()).unwrap();
        let to_d = b.add_lane(md, LaneSpec::default()).unwrap();
        b.connect(up, to_c).unwrap();
        b.connect(up, to_d).unwrap();
        let net = b.build().unwrap();

        let mut traffic = Traffic::new(&net);
        place(&mut traffic, &net, to_c, 60.0, 0.0);
        let nearer = place(&mut traffic, &net, to_d, 20.0, 0.0);
        let me = place(&mut traffic, &net, up, 50.0, 0.0);
        let h = traffic.headway(&net, traffic.gtu(me).unwrap(), 500.0, SimTime::ZERO).unwrap();
        assert_eq!(h.gtu(), Some(nearer));
        assert_approx_eq!(h.distance().unwrap(), 66.0);
    }

    #[test]
    fn parallel_and_neighbor_traffic() {
        let (net, [l0, l1]) = two_lane();
        let mut traffic = Traffic::new(&net);
        let me = place(&mut traffic, &net, l0, 100.0, 10.0);
        let beside = place(&mut traffic, &net, l1, 102.0, 10.0);
        let ahead = place(&mut traffic, &net, l1, 200.0, 15.0);
        let behind = place(&mut traffic, &net, l1, 50.0, 5.0);
        let g = traffic.gtu(me).unwrap();

        let par = traffic.parallel(&net, g, LateralDirection::Right, SimTime::ZERO).unwrap();
        assert_eq!(par.len(), 1);
        assert_eq!(par[0].gtu, beside);
        assert_eq!(par[0].gap, Gap::Parallel);
        assert!(traffic.parallel(&net, g, LateralDirection::Left, SimTime::ZERO).unwrap().is_empty());

        let n = traffic.collect_neighbor_lane_traffic(&net, g, l1, 500.0, 200.0, SimTime::ZERO).unwrap();
        assert_eq!(n.len(), 3);
        let lead = n.iter().find(|x| x.gtu == ahead).unwrap();
        assert!(matches!(lead.gap, Gap::Ahead(d) if (d - 96.0).abs() < 1e-9));
        assert_eq!(lead.speed, 15.0);
        let foll = n.iter().find(|x| x.gtu == behind).unwrap();
        assert!(matches!(foll.gap, Gap::Behind(d) if (d - 46.0).abs() < 1e-9));
    }
}

// ── Lane change & next lane ───────────────────────────────────────────────────

#[cfg(test)]
mod transitions {
    use assert_approx_eq::assert_approx_eq;
    use gtu_core::{LateralDirection, SimTime};
    use gtu_network::NodeRouteNavigator;

    use super::*;
    use crate::MobilityError;

    #[test]
    fn lane_change_moves_registration_atomically() {
        let (net, [l0, l1]) = two_lane();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, l0, 100.0, 10.0);
        let mut gtu = traffic.gtus.take(id).unwrap();
        assert!(traffic.change_lane(&net, &mut gtu, LateralDirection::Right, SimTime::ZERO).unwrap());
        assert_eq!(gtu.lanes(), &[l1]);
        assert_approx_eq!(gtu.ledger().fraction(net.link_of(l1)).unwrap(), 0.2);
        assert!(traffic.occupancy.on(l0).is_empty());
        assert_eq!(traffic.occupancy.on(l1), &[id]);
        gtu.check_invariant(&net).unwrap();

        assert!(!traffic.change_lane(&net, &mut gtu, LateralDirection::Right, SimTime::ZERO).unwrap());
        assert_eq!(gtu.lanes(), &[l1]);
        traffic.gtus.put(gtu);
    }

    /// Lane `up` on A→M diverges into `to_c` (M→C) and `to_d` (M→D).
    fn diverge() -> (LaneNetwork, [NodeId; 4], [LaneId; 3]) {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let m = b.add_node(Point::new(100.0, 0.0));
        let c = b.add_node(Point::new(200.0, 50.0));
        let d = b.add_node(Point::new(200.0, -50.0));
        let am = b.add_link(a, m).unwrap();
        let mc = b.add_link(m, c).unwrap();
        let md = b.add_link(m, d).unwrap();
        let up = b.add_lane(am, LaneSpec::default()).unwrap();
        let to_c = b.add_lane(mc, LaneSpec::default()).unwrap();
        let to_d = b.add_lane(md, LaneSpec::default()).unwrap();
        b.connect(up, to_c).unwrap();
        b.connect(up, to_d).unwrap();
        (b.build().unwrap(), [a, m, c, d], [up, to_c, to_d])
    }

    #[test]
    fn next_lane_follows_route_at_diverge() {
        let (net, [a, m, c, d], [up, to_c, to_d]) = diverge();
        let mut traffic = Traffic::new(&net);
        let via_c = place_with(&mut traffic, &net, &[(up, 10.0)], 0.0, Box::new(NodeRouteNavigator::new(vec![a, m, c])));
        let via_d = place_with(&mut traffic, &net, &[(up, 50.0)], 0.0, Box::new(NodeRouteNavigator::new(vec![a, m, d])));
        assert_eq!(traffic.gtu(via_c).unwrap().determine_next_lane(&net, up).unwrap(), to_c);
        assert_eq!(traffic.gtu(via_d).unwrap().determine_next_lane(&net, up).unwrap(), to_d);
    }

    #[test]
    fn next_lane_fails_without_route_match() {
        let (net, [a, m, _, _], [up, to_c, _]) = diverge();
        let mut traffic = Traffic::new(&net);
        let free = place(&mut traffic, &net, up, 10.0, 0.0);
        let r = traffic.gtu(free).unwrap().determine_next_lane(&net, up);
        assert!(matches!(r, Err(MobilityError::RoutingFailure { .. })));

        // route ends at M: nothing to steer by
        let short = place_with(&mut traffic, &net, &[(up, 50.0)], 0.0, Box::new(NodeRouteNavigator::new(vec![a, m])));
        assert!(traffic.gtu(short).unwrap().determine_next_lane(&net, up).is_err());

        let lone = place(&mut traffic, &net, to_c, 10.0, 0.0);
        let r = traffic.gtu(lone).unwrap().determine_next_lane(&net, to_c);
        assert!(matches!(r, Err(MobilityError::RoutingFailure { .. })));
    }

    #[test]
    fn next_lane_fails_when_both_successors_match() {
        let mut b = LaneNetworkBuilder::new();
        let a = b.add_node(Point::new(0.0, 0.0));
        let m = b.add_node(Point::new(100.0, 0.0));
        let c = b.add_node(Point::new(200.0, 0.0));
        let am = b.add_link(a, m).unwrap();
        let mc = b.add_link(m, c).unwrap();
        let up = b.add_lane(am, LaneSpec::default()).unwrap();
        let c0 = b.add_lane(mc, LaneSpec::default()).unwrap();
        let c1 = b.add_lane(mc, LaneSpec::default()).unwrap();
        b.connect(up, c0).unwrap();
        b.connect(up, c1).unwrap();
        let net = b.build().unwrap();

        let mut traffic = Traffic::new(&net);
        let id = place_with(&mut traffic, &net, &[(up, 10.0)], 0.0, Box::new(NodeRouteNavigator::new(vec![a, m, c])));
        let r = traffic.gtu(id).unwrap().determine_next_lane(&net, up);
        assert!(matches!(r, Err(MobilityError::RoutingFailure { .. })));
    }

    #[test]
    fn single_successor_needs_no_route() {
        let (net, [up, down]) = series();
        let mut traffic = Traffic::new(&net);
        let id = place(&mut traffic, &net, up, 10.0, 0.0);
        assert_eq!(traffic.gtu(id).unwrap().determine_next_lane(&net, up).unwrap(), down);
    }
}

//! Unit tests for gtu-core primitives.

#[cfg(test)]
mod ids {
    use crate::{GtuId, LaneId, LinkId};

    #[test]
    fn index_roundtrip() {
        let id = LaneId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(LaneId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(GtuId::INVALID.0, u32::MAX);
        assert_eq!(LinkId::default(), LinkId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(GtuId(7).to_string(), "GtuId(7)");
    }
}

#[cfg(test)]
mod time {
    use std::collections::BTreeMap;

    use crate::SimTime;

    #[test]
    fn arithmetic() {
        let t = SimTime(10.0);
        assert_eq!(t + 2.5, SimTime(12.5));
        assert_eq!(SimTime(12.5) - t, 2.5);
        assert_eq!(SimTime(12.5).since(t), 2.5);
    }

    #[test]
    fn total_order_keys_btree() {
        let mut m = BTreeMap::new();
        m.insert(SimTime(2.0), "b");
        m.insert(SimTime(0.5), "a");
        m.insert(SimTime(10.0), "c");
        let keys: Vec<_> = m.keys().map(|t| t.0).collect();
        assert_eq!(keys, vec![0.5, 2.0, 10.0]);
    }

    #[test]
    fn prev_is_strictly_smaller() {
        for t in [0.0, 0.5, 1.0, 3_600.0, 1e9] {
            let p = SimTime(t).prev();
            assert!(p < SimTime(t));
            assert!(SimTime(t) - p < 1e-6);
        }
    }

    #[test]
    fn display() {
        assert_eq!(SimTime(1.5).to_string(), "1.500s");
    }
}

#[cfg(test)]
mod class {
    use crate::{ClassSet, VehicleClass};

    #[test]
    fn set_membership() {
        let s = ClassSet::of(&[VehicleClass::Car, VehicleClass::Bus]);
        assert!(s.contains(VehicleClass::Car));
        assert!(s.contains(VehicleClass::Bus));
        assert!(!s.contains(VehicleClass::Truck));
        assert!(ClassSet::ALL.contains(VehicleClass::Motorcycle));
        assert!(ClassSet::ALL.without(VehicleClass::Truck).with(VehicleClass::Truck) == ClassSet::ALL);
        assert!(ClassSet::NONE.is_empty());
    }
}

#[cfg(test)]
mod direction {
    use crate::{LateralDirection, RelativePosition};

    #[test]
    fn flip_and_slot() {
        assert_eq!(LateralDirection::Left.flip(), LateralDirection::Right);
        assert_eq!(LateralDirection::Left.slot(), 0);
        assert_eq!(LateralDirection::Right.slot(), 1);
    }

    #[test]
    fn offsets_from_front_reference() {
        assert_eq!(RelativePosition::Front.offset(4.0), 0.0);
        assert_eq!(RelativePosition::Reference.offset(4.0), 0.0);
        assert_eq!(RelativePosition::Rear.offset(4.0), -4.0);
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;

    #[test]
    fn distance_and_lerp() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-12);
        assert_eq!(a.lerp(b, 0.5), Point::new(1.5, 2.0));
    }
}

#[cfg(test)]
mod config {
    use crate::{SimConfig, SimTime};

    #[test]
    fn defaults_are_valid() {
        let c = SimConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.forward_headway_distance, 500.0);
        assert_eq!(c.backward_headway_distance, 200.0);
        assert_eq!(c.suitability_time_horizon, 90.0);
        assert_eq!(c.incentives.stay, 0.1);
    }

    #[test]
    fn rejects_reversed_times() {
        let c = SimConfig { start_time: SimTime(10.0), end_time: SimTime(5.0), ..SimConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_horizon() {
        let c = SimConfig { forward_headway_distance: 0.0, ..SimConfig::default() };
        assert!(c.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{GeneratorId, GtuRng};

    #[test]
    fn same_stream_same_draws() {
        let mut a = GtuRng::for_generator(42, GeneratorId(3));
        let mut b = GtuRng::for_generator(42, GeneratorId(3));
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1_000u32), b.gen_range(0..1_000u32));
        }
    }

    #[test]
    fn generator_streams_differ() {
        let mut a = GtuRng::for_generator(42, GeneratorId(0));
        let mut b = GtuRng::for_generator(42, GeneratorId(1));
        let xs: Vec<u32> = (0..8).map(|_| a.gen_range(0..u32::MAX)).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen_range(0..u32::MAX)).collect();
        assert_ne!(xs, ys);
    }
}

//! Vehicle classes and lane compatibility sets.
//!
//! A lane admits a [`ClassSet`]; a vehicle of class `c` may only enter,
//! follow, or change onto lanes whose set contains `c`.  Speed limits are
//! looked up per class with a lane-wide default.

/// The kind of a simulated vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleClass {
    #[default]
    Car,
    Truck,
    Bus,
    Motorcycle,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Truck,
        VehicleClass::Bus,
        VehicleClass::Motorcycle,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Human-readable label, used for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleClass::Car        => "car",
            VehicleClass::Truck      => "truck",
            VehicleClass::Bus        => "bus",
            VehicleClass::Motorcycle => "motorcycle",
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bit set of [`VehicleClass`]es.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassSet(u8);

impl ClassSet {
    pub const NONE: ClassSet = ClassSet(0);
    pub const ALL: ClassSet = ClassSet(0b1111);

    pub fn of(classes: &[VehicleClass]) -> Self {
        ClassSet(classes.iter().fold(0, |acc, c| acc | c.bit()))
    }

    #[inline]
    pub fn contains(self, class: VehicleClass) -> bool {
        self.0 & class.bit() != 0
    }

    pub fn with(self, class: VehicleClass) -> Self {
        ClassSet(self.0 | class.bit())
    }

    pub fn without(self, class: VehicleClass) -> Self {
        ClassSet(self.0 & !class.bit())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for ClassSet {
    fn default() -> Self {
        ClassSet::ALL
    }
}

//! Wheel positions and the fixed four-entry per-wheel table.

use core::fmt;
use core::ops::{Index, IndexMut};
use serde::{Deserialize, Serialize};

use crate::InvalidWheelIndex;

/// Position of a wheel on the vehicle.
///
/// The discriminant is the wire/storage index used by the diagnostic
/// protocol (`0` = front-left ... `3` = rear-right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelPosition {
    /// Front-left wheel.
    FrontLeft = 0,
    /// Front-right wheel.
    FrontRight = 1,
    /// Rear-left wheel.
    RearLeft = 2,
    /// Rear-right wheel.
    RearRight = 3,
}

impl WheelPosition {
    /// Number of wheel positions.
    pub const COUNT: usize = 4;

    /// All positions in index order.
    pub const ALL: [WheelPosition; 4] = [
        WheelPosition::FrontLeft,
        WheelPosition::FrontRight,
        WheelPosition::RearLeft,
        WheelPosition::RearRight,
    ];

    /// Numeric index of this position.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Look up a position by numeric index.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::FrontLeft),
            1 => Some(Self::FrontRight),
            2 => Some(Self::RearLeft),
            3 => Some(Self::RearRight),
            _ => None,
        }
    }

    /// Two-letter abbreviation (`FL`, `FR`, `RL`, `RR`).
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::FrontLeft => "FL",
            Self::FrontRight => "FR",
            Self::RearLeft => "RL",
            Self::RearRight => "RR",
        }
    }
}

impl TryFrom<u8> for WheelPosition {
    type Error = InvalidWheelIndex;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or(InvalidWheelIndex(value))
    }
}

impl fmt::Display for WheelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FrontLeft => "front-left",
            Self::FrontRight => "front-right",
            Self::RearLeft => "rear-left",
            Self::RearRight => "rear-right",
        };
        f.write_str(name)
    }
}

/// One value per wheel position.
///
/// Replaces loose `[T; 4]` arrays indexed by integer: lookups go through
/// [`WheelPosition`], so there is no out-of-range index to handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelMap<T> {
    front_left: T,
    front_right: T,
    rear_left: T,
    rear_right: T,
}

impl<T> WheelMap<T> {
    /// Build a table from explicit per-wheel values.
    pub const fn new(front_left: T, front_right: T, rear_left: T, rear_right: T) -> Self {
        Self {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }

    /// Build a table by evaluating `f` for each position in index order.
    pub fn from_fn(mut f: impl FnMut(WheelPosition) -> T) -> Self {
        Self {
            front_left: f(WheelPosition::FrontLeft),
            front_right: f(WheelPosition::FrontRight),
            rear_left: f(WheelPosition::RearLeft),
            rear_right: f(WheelPosition::RearRight),
        }
    }

    /// Shared access to one wheel's value.
    pub fn get(&self, wheel: WheelPosition) -> &T {
        match wheel {
            WheelPosition::FrontLeft => &self.front_left,
            WheelPosition::FrontRight => &self.front_right,
            WheelPosition::RearLeft => &self.rear_left,
            WheelPosition::RearRight => &self.rear_right,
        }
    }

    /// Exclusive access to one wheel's value.
    pub fn get_mut(&mut self, wheel: WheelPosition) -> &mut T {
        match wheel {
            WheelPosition::FrontLeft => &mut self.front_left,
            WheelPosition::FrontRight => &mut self.front_right,
            WheelPosition::RearLeft => &mut self.rear_left,
            WheelPosition::RearRight => &mut self.rear_right,
        }
    }

    /// Iterate `(position, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (WheelPosition, &T)> {
        [
            (WheelPosition::FrontLeft, &self.front_left),
            (WheelPosition::FrontRight, &self.front_right),
            (WheelPosition::RearLeft, &self.rear_left),
            (WheelPosition::RearRight, &self.rear_right),
        ]
        .into_iter()
    }

    /// Iterate `(position, value)` pairs mutably in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WheelPosition, &mut T)> {
        [
            (WheelPosition::FrontLeft, &mut self.front_left),
            (WheelPosition::FrontRight, &mut self.front_right),
            (WheelPosition::RearLeft, &mut self.rear_left),
            (WheelPosition::RearRight, &mut self.rear_right),
        ]
        .into_iter()
    }

    /// Iterate values in index order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(_, v)| v)
    }

    /// Transform every value, keeping positions.
    pub fn map<U>(self, mut f: impl FnMut(WheelPosition, T) -> U) -> WheelMap<U> {
        WheelMap {
            front_left: f(WheelPosition::FrontLeft, self.front_left),
            front_right: f(WheelPosition::FrontRight, self.front_right),
            rear_left: f(WheelPosition::RearLeft, self.rear_left),
            rear_right: f(WheelPosition::RearRight, self.rear_right),
        }
    }
}

impl<T> Index<WheelPosition> for WheelMap<T> {
    type Output = T;

    fn index(&self, wheel: WheelPosition) -> &T {
        self.get(wheel)
    }
}

impl<T> IndexMut<WheelPosition> for WheelMap<T> {
    fn index_mut(&mut self, wheel: WheelPosition) -> &mut T {
        self.get_mut(wheel)
    }
}

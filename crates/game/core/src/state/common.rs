use std::fmt;

/// Unique identifier for any living tracked by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Milliseconds on the simulation clock.
///
/// The core never reads a wall clock; callers pass the current `GameTime` in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTime(pub u64);

impl GameTime {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub const fn since(self, earlier: GameTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for GameTime {
    type Output = GameTime;
    fn add(self, rhs: u64) -> GameTime {
        GameTime(self.0.saturating_add(rhs))
    }
}

impl std::ops::Sub<u64> for GameTime {
    type Output = GameTime;
    fn sub(self, rhs: u64) -> GameTime {
        GameTime(self.0.saturating_sub(rhs))
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Heading in client units: a full turn is 4096.
pub const HEADING_UNITS: u32 = 4096;

const HEADING_PER_RADIAN: f64 = HEADING_UNITS as f64 / std::f64::consts::TAU;

/// World position. Distances across regions are undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub region: u16,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(region: u16, x: i32, y: i32, z: i32) -> Self {
        Self { region, x, y, z }
    }

    /// Euclidean distance, `None` when the two points are in different regions.
    pub fn distance_to(&self, other: &Position) -> Option<f64> {
        if self.region != other.region {
            return None;
        }
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        let dz = f64::from(other.z - self.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }

    /// True if `other` is in the same region and no further than `radius`.
    pub fn is_within(&self, other: &Position, radius: u32) -> bool {
        self.distance_to(other)
            .is_some_and(|d| d <= f64::from(radius))
    }

    /// Heading from this point towards `other`, in [`HEADING_UNITS`].
    pub fn heading_to(&self, other: &Position) -> u16 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        let mut heading = (-dx).atan2(dy) * HEADING_PER_RADIAN;
        if heading < 0.0 {
            heading += f64::from(HEADING_UNITS);
        }
        (heading as u32 % HEADING_UNITS) as u16
    }
}

/// True if `target` lies inside the forward arc of `view_degrees` centered on `heading`.
pub fn is_in_front(origin: &Position, heading: u16, target: &Position, view_degrees: u16) -> bool {
    if origin.x == target.x && origin.y == target.y {
        return true;
    }
    let relative = (u32::from(origin.heading_to(target)) + HEADING_UNITS - u32::from(heading))
        % HEADING_UNITS;
    let angle = f64::from(relative) * 360.0 / f64::from(HEADING_UNITS);
    let half = f64::from(view_degrees) / 2.0;
    angle >= 360.0 - half || angle < half
}

/// Integer resource meter (health, mana, endurance).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: u32,
    pub maximum: u32,
}

impl ResourceMeter {
    pub fn new(current: u32, maximum: u32) -> Self {
        Self {
            current: current.min(maximum),
            maximum,
        }
    }

    pub fn full(maximum: u32) -> Self {
        Self::new(maximum, maximum)
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.maximum
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Applies `delta` clamped to `[0, maximum]` and returns the change actually applied.
    pub fn apply(&mut self, delta: i64) -> i64 {
        let before = i64::from(self.current);
        let after = (before + delta).clamp(0, i64::from(self.maximum));
        self.current = after as u32;
        after - before
    }

    /// Percentage of the maximum, 0 for an empty pool.
    pub fn percent(&self) -> u8 {
        if self.maximum == 0 {
            return 0;
        }
        (u64::from(self.current) * 100 / u64::from(self.maximum)) as u8
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for any entity tracked by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete simulation time unit. One tick per fixed-timestep update pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete grid position expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell offset by `distance` steps along `direction`.
    pub fn offset(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx * distance, self.y + dy * distance)
    }
}

impl Default for GridPos {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Continuous world-space position derived from the grid position.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: WorldPos) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned world-space rectangle used for visibility culling.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WorldRect {
    pub min: WorldPos,
    pub max: WorldPos,
}

impl WorldRect {
    pub fn new(min: WorldPos, max: WorldPos) -> Self {
        Self { min, max }
    }

    /// Rectangle of `size` centered on `center`.
    pub fn centered(center: WorldPos, size: f32) -> Self {
        let half = size / 2.0;
        Self {
            min: WorldPos::new(center.x - half, center.y - half),
            max: WorldPos::new(center.x + half, center.y + half),
        }
    }

    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Facing and movement direction on the grid.
///
/// Screen-style axes: `Up` decreases `y`, `Down` increases it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

bitflags::bitflags! {
    /// Set of directions from which an interactable accepts requests.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DirectionSet: u8 {
        const UP = 1 << 0;
        const RIGHT = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
    }
}

impl DirectionSet {
    pub fn accepts(self, direction: Direction) -> bool {
        self.contains(DirectionSet::from(direction))
    }
}

impl From<Direction> for DirectionSet {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => DirectionSet::UP,
            Direction::Right => DirectionSet::RIGHT,
            Direction::Down => DirectionSet::DOWN,
            Direction::Left => DirectionSet::LEFT,
        }
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        iter.into_iter()
            .fold(DirectionSet::empty(), |set, d| set | DirectionSet::from(d))
    }
}

impl Default for DirectionSet {
    fn default() -> Self {
        DirectionSet::all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_set_membership() {
        let set: DirectionSet = [Direction::Up, Direction::Left].into_iter().collect();
        assert!(set.accepts(Direction::Up));
        assert!(set.accepts(Direction::Left));
        assert!(!set.accepts(Direction::Right));
        assert!(DirectionSet::all().accepts(Direction::Down));
    }

    #[test]
    fn offset_follows_screen_axes() {
        let origin = GridPos::new(3, 3);
        assert_eq!(origin.offset(Direction::Up, 1), GridPos::new(3, 2));
        assert_eq!(origin.offset(Direction::Down, 2), GridPos::new(3, 5));
        assert_eq!(origin.offset(Direction::Left, 1), GridPos::new(2, 3));
    }
}

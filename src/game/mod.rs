//! # Game Module
//!
//! Core simulation state: the entity arena, room activation, player movement,
//! encounters, and the session object that owns them for a play-through.
//!
//! This module contains the fundamental building blocks of Undercroft:
//! - World-space and lattice coordinates
//! - Entity arena with explicit activation states
//! - Room streaming around the player
//! - Momentum-based movement integration
//! - Enemy, loot and stairs interactions

pub mod activation;
pub mod encounter;
pub mod entities;
pub mod movement;
pub mod player;
pub mod settings;
pub mod state;

pub use activation::*;
pub use encounter::*;
pub use entities::*;
pub use movement::*;
pub use player::*;
pub use settings::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// Identifier of a room within one generated dungeon.
pub type RoomId = u32;

/// A point or vector in world space.
///
/// Y is up. Rooms lie on the X/Z plane.
///
/// # Examples
///
/// ```
/// use undercroft::Point3;
///
/// let a = Point3::new(0.0, 0.0, 0.0);
/// let b = Point3::new(3.0, 0.0, 4.0);
/// assert_eq!(a.distance(b), 5.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    /// The origin / zero vector.
    pub const ZERO: Point3 = Point3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a new point with the given coordinates.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Creates a point from an `[x, y, z]` array.
    pub const fn from_array(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// Length of this vector.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point3) -> f32 {
        (self - other).length()
    }

    /// Returns a unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Point3 {
        let len = self.length();
        if len > f32::EPSILON {
            self * (1.0 / len)
        } else {
            Point3::ZERO
        }
    }

    /// Linear interpolation toward `target`; `t` is not clamped.
    pub fn lerp(self, target: Point3, t: f32) -> Point3 {
        self + (target - self) * t
    }

    /// Whether every component is finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Add for Point3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::AddAssign for Point3 {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::ops::Sub for Point3 {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Mul<f32> for Point3 {
    type Output = Self;

    fn mul(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl std::ops::MulAssign<f32> for Point3 {
    fn mul_assign(&mut self, k: f32) {
        *self = *self * k;
    }
}

/// A cell of the room lattice. Y is always 0, so only X and Z are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub z: i32,
}

impl GridPos {
    /// Creates a new lattice position.
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The lattice origin, home of the entry room.
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }

    /// World-space center of this cell for the given room size.
    pub fn to_world(self, room_size: f32) -> Point3 {
        Point3::new(self.x as f32 * room_size, 0.0, self.z as f32 * room_size)
    }

    /// The neighbouring cell in `direction`.
    pub fn step(self, direction: Direction) -> GridPos {
        self + direction.to_delta()
    }
}

impl std::ops::Add for GridPos {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.z + other.z)
    }
}

/// Cardinal directions on the room lattice. North is +Z, East is +X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions in a fixed order; generation draws from this order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a lattice delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{Direction, GridPos};
    ///
    /// assert_eq!(Direction::North.to_delta(), GridPos::new(0, 1));
    /// assert_eq!(Direction::West.to_delta(), GridPos::new(-1, 0));
    /// ```
    pub fn to_delta(self) -> GridPos {
        match self {
            Direction::North => GridPos::new(0, 1),
            Direction::South => GridPos::new(0, -1),
            Direction::East => GridPos::new(1, 0),
            Direction::West => GridPos::new(-1, 0),
        }
    }

    /// The direction pointing back the other way.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Single-letter label used in logs and the minimap.
    pub fn label(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::South => 'S',
            Direction::East => 'E',
            Direction::West => 'W',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(a.distance(b), 0.0);
        assert_eq!(Point3::ZERO.distance(Point3::new(0.0, 3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_point_normalized() {
        let v = Point3::new(3.0, 0.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert_eq!(Point3::ZERO.normalized(), Point3::ZERO);
    }

    #[test]
    fn test_point_lerp() {
        let a = Point3::ZERO;
        let b = Point3::new(10.0, 0.0, -10.0);
        assert_eq!(a.lerp(b, 0.5), Point3::new(5.0, 0.0, -5.0));
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn test_grid_to_world() {
        assert_eq!(GridPos::new(2, -1).to_world(8.0), Point3::new(16.0, 0.0, -8.0));
        assert_eq!(GridPos::origin().to_world(8.0), Point3::ZERO);
    }

    #[test]
    fn test_direction_opposites() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            let there = GridPos::origin().step(dir);
            assert_eq!(there.step(dir.opposite()), GridPos::origin());
        }
    }
}

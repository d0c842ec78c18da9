//! # Player
//!
//! The single player character: kinematic state plus the stats shown on the HUD.

use crate::{config, Point3, Transform};
use serde::{Deserialize, Serialize};

/// Size of the player's bounding box.
pub const PLAYER_EXTENTS: Point3 = Point3::new(1.0, 2.0, 1.0);

/// The player character.
///
/// Created once per session and repositioned, never recreated, when the
/// dungeon is regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Feet position; y is height above the floor
    pub position: Point3,
    /// Heading in degrees, clockwise from +Z
    pub yaw: f32,
    /// Look angle in degrees, positive looks down, clamped to [-90, 90]
    pub pitch: f32,
    /// Horizontal velocity carried between ticks
    pub momentum: Point3,
    /// Seconds spent above the floor since leaving it
    pub air_time: f32,
    pub health: i32,
    pub gold: u32,
    /// Cleared while paused; a disabled player ignores movement
    pub enabled: bool,
}

impl Player {
    /// Creates a player at `spawn` with full health and no gold.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{Player, Point3};
    ///
    /// let player = Player::new(Point3::new(0.0, 1.0, 0.0));
    /// assert_eq!(player.health, 30);
    /// assert_eq!(player.gold, 0);
    /// ```
    pub fn new(spawn: Point3) -> Self {
        Self {
            position: spawn,
            yaw: 0.0,
            pitch: 0.0,
            momentum: Point3::ZERO,
            air_time: 0.0,
            health: config::PLAYER_START_HEALTH,
            gold: 0,
            enabled: true,
        }
    }

    /// Moves the player to `spawn` and clears any motion, keeping stats.
    pub fn respawn(&mut self, spawn: Point3) {
        self.position = spawn;
        self.momentum = Point3::ZERO;
        self.air_time = 0.0;
    }

    /// Restores starting health and gold.
    pub fn reset_stats(&mut self) {
        self.health = config::PLAYER_START_HEALTH;
        self.gold = 0;
    }

    /// Whether the player is standing on the floor.
    pub fn is_grounded(&self) -> bool {
        self.position.y <= 0.0
    }

    /// Whether the player has any health left.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Bounding box, standing on `position`.
    pub fn bounds(&self) -> Transform {
        let center = self.position + Point3::new(0.0, PLAYER_EXTENTS.y / 2.0, 0.0);
        Transform::new(center, PLAYER_EXTENTS)
    }

    /// Applies damage, saturating at zero health.
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Point3::from_array(config::SPAWN_POINT))
    }
}

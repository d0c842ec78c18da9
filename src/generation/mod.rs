//! # Generation Module
//!
//! Procedural content generation for dungeons: the room lattice, the wall and
//! door geometry carved for it, and the loot tables rolled during play.
//!
//! Generation is fully deterministic for a given [`GenerationConfig::seed`].

pub mod dungeon;
pub mod geometry;
pub mod items;

pub use dungeon::*;
pub use geometry::*;
pub use items::*;

use crate::{config, UndercroftError, UndercroftResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls how many rooms are placed, how big they are and how densely they
/// are populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Number of rooms, entry room included
    pub room_count: usize,
    /// Edge length of a room and lattice step between room centers
    pub room_size: f32,
    /// Probability of loot in each non-origin room (0.0 to 1.0)
    pub loot_chance: f64,
    /// Probability of an enemy in each non-origin room (0.0 to 1.0)
    pub enemy_chance: f64,
    /// Whether enemies are spawned at all
    pub enable_enemies: bool,
    /// Failed placements tolerated per room before giving up
    pub max_placement_attempts: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.room_count, 8);
    /// assert!(config.room_size > 0.0);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            room_count: config::ROOM_COUNT,
            room_size: config::ROOM_SIZE,
            loot_chance: config::LOOT_CHANCE,
            enemy_chance: config::ENEMY_CHANCE,
            enable_enemies: true,
            max_placement_attempts: config::MAX_PLACEMENT_ATTEMPTS,
        }
    }

    /// Creates a configuration for testing: every room gets loot and an enemy.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            room_count: 6,
            room_size: config::ROOM_SIZE,
            loot_chance: 1.0,
            enemy_chance: 1.0,
            enable_enemies: true,
            max_placement_attempts: 200,
        }
    }

    /// Checks that the configuration can produce a dungeon.
    pub fn validate(&self) -> UndercroftResult<()> {
        if self.room_count < 2 {
            return Err(UndercroftError::InvalidConfig(format!(
                "room_count must be at least 2 to place stairs, got {}",
                self.room_count
            )));
        }
        if !(self.room_size.is_finite() && self.room_size > 0.0) {
            return Err(UndercroftError::InvalidConfig(format!(
                "room_size must be positive, got {}",
                self.room_size
            )));
        }
        // a doorway needs wall left over on both sides for its jambs
        if self.room_size <= config::DOOR_WIDTH {
            return Err(UndercroftError::InvalidConfig(format!(
                "room_size must exceed the door width {}, got {}",
                config::DOOR_WIDTH,
                self.room_size
            )));
        }
        for (name, p) in [
            ("loot_chance", self.loot_chance),
            ("enemy_chance", self.enemy_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(UndercroftError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.max_placement_attempts == 0 {
            return Err(UndercroftError::InvalidConfig(
                "max_placement_attempts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> UndercroftResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> UndercroftResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}

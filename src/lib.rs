//! # Undercroft
//!
//! A small first-person dungeon crawler built around a procedural room graph.
//!
//! ## Architecture Overview
//!
//! The simulation core is engine-independent and is driven one tick per frame:
//!
//! - **Generation**: builds a connected lattice of rooms with paired doors ([`RoomGraph`])
//! - **Room Activation**: streams rooms in and out around the player ([`RoomActivation`])
//! - **Movement**: momentum, friction and the simplified gravity model ([`MovementIntegrator`])
//! - **Encounters**: enemy pursuit, loot pickup and stairs regeneration ([`Encounters`])
//! - **Session**: the context object tying the above together ([`GameSession`])
//!
//! Rendering, input polling and the HUD live in [`rendering`], [`input`] and [`scenes`] and
//! only observe the simulation through the entity arena and session events.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use utils::*;

pub use rendering::{Display, Hud};
pub use scenes::SceneManager;

/// Core error type for the Undercroft game.
#[derive(thiserror::Error, Debug)]
pub enum UndercroftError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The dungeon builder could not place a room
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A scene primitive could not be constructed
    #[error("Entity creation failed: {0}")]
    EntityCreation(String),

    /// Processing a discrete input event failed
    #[error("Input handling failed: {0}")]
    InputHandler(String),

    /// A simulation tick failed
    #[error("Update tick failed: {0}")]
    UpdateTick(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Settings failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UndercroftError {
    /// Classification written to the persistent error log.
    pub fn kind(&self) -> &'static str {
        match self {
            UndercroftError::Io(_) => "IoError",
            UndercroftError::Serde(_) => "SerializationError",
            UndercroftError::Generation(_) => "GenerationError",
            UndercroftError::EntityCreation(_) => "EntityCreationError",
            UndercroftError::InputHandler(_) => "InputHandlerError",
            UndercroftError::UpdateTick(_) => "UpdateTickError",
            UndercroftError::InvalidState(_) => "InvalidStateError",
            UndercroftError::InvalidConfig(_) => "ConfigError",
        }
    }
}

/// Result type used throughout the Undercroft codebase.
pub type UndercroftResult<T> = Result<T, UndercroftError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Edge length of a room cell, also the lattice step between room centers
    pub const ROOM_SIZE: f32 = 8.0;

    /// Rooms per generated dungeon
    pub const ROOM_COUNT: usize = 8;

    /// Failed placements tolerated per room before generation gives up
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 1_000;

    /// Probability that a non-origin room receives loot
    pub const LOOT_CHANCE: f64 = 0.7;

    /// Probability that a non-origin room receives an enemy
    pub const ENEMY_CHANCE: f64 = 0.7;

    /// Wall height in world units
    pub const WALL_HEIGHT: f32 = 5.0;

    /// Wall thickness in world units
    pub const WALL_THICKNESS: f32 = 0.5;

    /// Width of a door opening
    pub const DOOR_WIDTH: f32 = 2.0;

    /// Height of a door panel
    pub const DOOR_HEIGHT: f32 = 4.0;

    /// Depth of a door panel
    pub const DOOR_DEPTH: f32 = 0.3;

    /// Door panels sit this far outside the wall plane to avoid z-fighting
    pub const DOOR_OFFSET: f32 = 0.01;

    /// Player-to-door distance that makes the door's room current
    pub const DOOR_TRIGGER_DISTANCE: f32 = 1.5;

    /// Upper bound on rooms streamed in around the current room
    pub const PRELOAD_MAX_ROOMS: usize = 10;

    /// Preload window half-extent, in multiples of the room size
    pub const PRELOAD_EXTENT: f32 = 2.0;

    /// Player starting health
    pub const PLAYER_START_HEALTH: i32 = 30;

    /// Spawn point in the origin room
    pub const SPAWN_POINT: [f32; 3] = [0.0, 1.0, 0.0];

    /// Horizontal movement speed
    pub const PLAYER_SPEED: f32 = 2.0;

    /// Instantaneous height gained by a jump
    pub const JUMP_HEIGHT: f32 = 2.0;

    /// Gravity factor applied to squared airtime
    pub const GRAVITY: f32 = 1.0;

    /// Momentum smoothing rate toward the target velocity
    pub const ACCELERATION: f32 = 20.0;

    /// Momentum decay rate with no input held
    pub const FRICTION: f32 = 0.7;

    /// Degrees of rotation per unit of pointer velocity per second
    pub const MOUSE_SENSITIVITY: f32 = 40.0;

    /// Enemy starting health
    pub const ENEMY_HEALTH: i32 = 10;

    /// Distance at which an enemy starts pursuing
    pub const ENEMY_DETECTION_RADIUS: f32 = 6.0;

    /// Enemy pursuit speed
    pub const ENEMY_SPEED: f32 = 2.0;

    /// Melee reach for both the player and enemies
    pub const MELEE_RANGE: f32 = 2.0;

    /// Damage an enemy deals per hit
    pub const ENEMY_ATTACK_DAMAGE: i32 = 2;

    /// Seconds between enemy hits
    pub const ENEMY_ATTACK_COOLDOWN: f32 = 1.0;

    /// Damage the player deals per attack
    pub const PLAYER_ATTACK_DAMAGE: i32 = 5;

    /// Inclusive gold range awarded per loot pickup
    pub const GOLD_RANGE: (u32, u32) = (1, 5);

    /// Distance to the stairs that triggers regeneration
    pub const STAIRS_TRIGGER_DISTANCE: f32 = 2.0;
}

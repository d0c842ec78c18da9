//! # Game Settings
//!
//! Everything tunable about a session, loadable from a JSON file.

use crate::{
    config, ActivationSettings, EncounterSettings, GenerationConfig, MovementSettings,
    UndercroftError, UndercroftResult,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional features; the two presets reproduce the two shipped variants of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureProfile {
    /// Spawn enemies and allow the attack action
    pub enable_enemies: bool,
    /// Draw the minimap overlay
    pub enable_minimap: bool,
}

impl FeatureProfile {
    /// Enemies and combat, no minimap.
    pub fn classic() -> Self {
        Self {
            enable_enemies: true,
            enable_minimap: false,
        }
    }

    /// Exploration only: no enemies, minimap on.
    pub fn lite() -> Self {
        Self {
            enable_enemies: false,
            enable_minimap: true,
        }
    }

    /// Looks up a preset by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "lite" => Some(Self::lite()),
            _ => None,
        }
    }
}

impl Default for FeatureProfile {
    fn default() -> Self {
        Self::classic()
    }
}

/// All session tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub generation: GenerationConfig,
    pub profile: FeatureProfile,
    pub activation: ActivationSettings,
    pub movement: MovementSettings,
    pub encounters: EncounterSettings,
    /// Where the player appears in the entry room
    pub spawn_point: [f32; 3],
}

impl GameSettings {
    /// Default settings with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::new(seed),
            ..Self::default()
        }
    }

    /// Switches to a profile, keeping generation in step with it.
    pub fn with_profile(mut self, profile: FeatureProfile) -> Self {
        self.profile = profile;
        self.generation.enable_enemies = profile.enable_enemies;
        self
    }

    /// Reads settings from a JSON file; missing fields take their defaults.
    ///
    /// A profile without enemies also turns off enemy generation.
    pub fn from_json_file(path: impl AsRef<Path>) -> UndercroftResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let mut settings: GameSettings = serde_json::from_str(&text)?;
        settings.generation.enable_enemies &= settings.profile.enable_enemies;
        settings.validate()?;
        Ok(settings)
    }

    /// Serializes the settings as pretty JSON.
    pub fn to_json(&self) -> UndercroftResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every section for values the simulation cannot work with.
    pub fn validate(&self) -> UndercroftResult<()> {
        self.generation.validate()?;

        if !(self.activation.door_trigger_distance > 0.0) {
            return Err(UndercroftError::InvalidConfig(
                "door_trigger_distance must be positive".to_string(),
            ));
        }
        if !(self.activation.preload_extent > 0.0) {
            return Err(UndercroftError::InvalidConfig(
                "preload_extent must be positive".to_string(),
            ));
        }
        if self.movement.friction < 0.0 || self.movement.acceleration < 0.0 {
            return Err(UndercroftError::InvalidConfig(
                "friction and acceleration must not be negative".to_string(),
            ));
        }
        if self.spawn_point.iter().any(|v| !v.is_finite()) {
            return Err(UndercroftError::InvalidConfig(
                "spawn_point must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            profile: FeatureProfile::default(),
            activation: ActivationSettings::default(),
            movement: MovementSettings::default(),
            encounters: EncounterSettings::default(),
            spawn_point: config::SPAWN_POINT,
        }
    }
}

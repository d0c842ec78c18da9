//! # Encounters
//!
//! Enemy pursuit and attacks, the player's melee attack, loot pickup and the
//! stairs trigger. Only the current room's contents take part.

use crate::{
    config, EntityHandle, EntityKind, LootTable, Player, Point3, RoomGraph, RoomId,
    UndercroftError, UndercroftResult,
};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Tunables for combat, loot and stairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterSettings {
    pub detection_radius: f32,
    pub enemy_speed: f32,
    pub melee_range: f32,
    pub enemy_damage: i32,
    /// Seconds between enemy attacks
    pub attack_cooldown: f32,
    pub player_damage: i32,
    pub stairs_trigger_distance: f32,
    pub loot: LootTable,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            detection_radius: config::ENEMY_DETECTION_RADIUS,
            enemy_speed: config::ENEMY_SPEED,
            melee_range: config::MELEE_RANGE,
            enemy_damage: config::ENEMY_ATTACK_DAMAGE,
            attack_cooldown: config::ENEMY_ATTACK_COOLDOWN,
            player_damage: config::PLAYER_ATTACK_DAMAGE,
            stairs_trigger_distance: config::STAIRS_TRIGGER_DISTANCE,
            loot: LootTable::new(),
        }
    }
}

/// Something that happened between the player and the current room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EncounterEvent {
    PlayerHit { damage: i32, remaining: i32 },
    EnemyHit { remaining: i32 },
    EnemyDefeated,
    LootCollected { gold: u32, lore: String },
    StairsReached,
}

impl EncounterEvent {
    /// Status line shown on the HUD for this event.
    pub fn message(&self) -> String {
        match self {
            EncounterEvent::PlayerHit { .. } => "Enemy hit you!".to_string(),
            EncounterEvent::EnemyHit { .. } | EncounterEvent::EnemyDefeated => {
                "You hit the enemy!".to_string()
            }
            EncounterEvent::LootCollected { lore, .. } => lore.clone(),
            EncounterEvent::StairsReached => "You ascend the stairs!".to_string(),
        }
    }
}

/// Distance on the floor plane; encounter ranges ignore height.
fn flat_distance(a: Point3, b: Point3) -> f32 {
    Point3::new(a.x - b.x, 0.0, a.z - b.z).length()
}

/// Resolves interactions in the current room.
#[derive(Debug, Clone, Default)]
pub struct Encounters {
    pub settings: EncounterSettings,
}

impl Encounters {
    pub fn new(settings: EncounterSettings) -> Self {
        Self { settings }
    }

    /// Runs one tick of enemy, loot and stairs checks for `room`.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        graph: &mut RoomGraph,
        room: RoomId,
        player: &mut Player,
        rng: &mut R,
        dt: f32,
    ) -> UndercroftResult<Vec<EncounterEvent>> {
        let mut events = Vec::new();
        events.extend(self.update_enemy(graph, room, player, dt)?);
        events.extend(self.collect_loot(graph, room, player, rng)?);
        if self.stairs_reached(graph, room, player) {
            events.push(EncounterEvent::StairsReached);
        }
        Ok(events)
    }

    /// The room's enemy, if it is active and still alive.
    fn live_enemy(&self, graph: &RoomGraph, room: RoomId) -> UndercroftResult<Option<EntityHandle>> {
        let room = graph
            .room(room)
            .ok_or_else(|| UndercroftError::InvalidState(format!("no room with id {}", room)))?;
        Ok(room.enemy.filter(|&handle| {
            graph.arena.get(handle).map_or(false, |entity| {
                entity.is_active() && matches!(&entity.kind, EntityKind::Enemy(state) if state.is_alive())
            })
        }))
    }

    /// Moves the enemy toward the player and lets it attack when ready.
    pub fn update_enemy(
        &self,
        graph: &mut RoomGraph,
        room: RoomId,
        player: &mut Player,
        dt: f32,
    ) -> UndercroftResult<Option<EncounterEvent>> {
        let Some(handle) = self.live_enemy(graph, room)? else {
            return Ok(None);
        };
        let Some(entity) = graph.arena.get_mut(handle) else {
            return Ok(None);
        };

        let s = &self.settings;
        let distance = flat_distance(entity.transform.position, player.position);
        if distance < s.detection_radius && distance > 0.0 {
            let toward = Point3::new(
                player.position.x - entity.transform.position.x,
                0.0,
                player.position.z - entity.transform.position.z,
            )
            .normalized();
            entity.transform.position += toward * (s.enemy_speed * dt).min(distance);
        }

        let EntityKind::Enemy(state) = &mut entity.kind else {
            return Ok(None);
        };
        if state.attack_cooldown > 0.0 {
            state.attack_cooldown -= dt;
        }

        let distance = flat_distance(entity.transform.position, player.position);
        if distance < s.melee_range && state.attack_cooldown <= 0.0 {
            state.attack_cooldown = s.attack_cooldown;
            player.take_damage(s.enemy_damage);
            debug!("Enemy in room {} hit the player, hp={}", room, player.health);
            return Ok(Some(EncounterEvent::PlayerHit {
                damage: s.enemy_damage,
                remaining: player.health,
            }));
        }
        Ok(None)
    }

    /// The player's melee attack against the room's enemy.
    ///
    /// Returns `None` when there is nothing in range.
    pub fn player_attack(
        &self,
        graph: &mut RoomGraph,
        room: RoomId,
        player: &Player,
    ) -> UndercroftResult<Option<EncounterEvent>> {
        let Some(handle) = self.live_enemy(graph, room)? else {
            return Ok(None);
        };
        let Some(entity) = graph.arena.get_mut(handle) else {
            return Ok(None);
        };
        if flat_distance(entity.transform.position, player.position) >= self.settings.melee_range {
            return Ok(None);
        }
        let EntityKind::Enemy(state) = &mut entity.kind else {
            return Ok(None);
        };

        state.health -= self.settings.player_damage;
        let remaining = state.health;
        if remaining > 0 {
            debug!("Enemy in room {} hit, hp={}", room, remaining);
            return Ok(Some(EncounterEvent::EnemyHit { remaining }));
        }

        graph.arena.destroy(handle)?;
        debug!("Enemy in room {} defeated", room);
        Ok(Some(EncounterEvent::EnemyDefeated))
    }

    /// Picks up the room's loot if the player is touching it.
    pub fn collect_loot<R: Rng + ?Sized>(
        &self,
        graph: &mut RoomGraph,
        room: RoomId,
        player: &mut Player,
        rng: &mut R,
    ) -> UndercroftResult<Option<EncounterEvent>> {
        let loot = graph
            .room(room)
            .ok_or_else(|| UndercroftError::InvalidState(format!("no room with id {}", room)))?
            .loot;
        let Some(handle) = loot else {
            return Ok(None);
        };
        let Some(entity) = graph.arena.get_mut(handle) else {
            return Ok(None);
        };
        if !entity.is_active() || !player.bounds().intersects(&entity.transform) {
            return Ok(None);
        }
        let EntityKind::Loot(state) = &mut entity.kind else {
            return Ok(None);
        };
        if state.collected {
            return Ok(None);
        }
        state.collected = true;
        graph.arena.destroy(handle)?;

        let roll = self.settings.loot.roll(rng);
        player.gold += roll.gold;
        debug!("Loot in room {} worth {} gold", room, roll.gold);
        Ok(Some(EncounterEvent::LootCollected {
            gold: roll.gold,
            lore: roll.lore,
        }))
    }

    /// Whether the player stands close enough to the room's stairs.
    pub fn stairs_reached(&self, graph: &RoomGraph, room: RoomId, player: &Player) -> bool {
        graph
            .room(room)
            .and_then(|r| r.stairs)
            .and_then(|handle| graph.arena.get(handle))
            .map_or(false, |stairs| {
                stairs.is_active()
                    && flat_distance(stairs.transform.position, player.position)
                        < self.settings.stairs_trigger_distance
            })
    }
}

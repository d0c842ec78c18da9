//! # Room Activation
//!
//! Decides which room is current from the player's position and streams
//! nearby rooms in and out.
//!
//! Each call runs in a fixed order:
//! 1. Door proximity: walking up to another room's door makes that room current
//! 2. Footprint: standing inside a room's floor area makes it current
//! 3. Preload: rooms around the current one are shown, up to a cap
//! 4. Stream-out: every other active room is hidden

use crate::{config, Point3, RoomGraph, RoomId, UndercroftError, UndercroftResult};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tunables for room streaming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationSettings {
    /// Horizontal distance to a door panel that switches rooms
    pub door_trigger_distance: f32,
    /// Most rooms shown around the current one
    pub preload_max_rooms: usize,
    /// Preload half-width, in room sizes
    pub preload_extent: f32,
}

impl Default for ActivationSettings {
    fn default() -> Self {
        Self {
            door_trigger_distance: config::DOOR_TRIGGER_DISTANCE,
            preload_max_rooms: config::PRELOAD_MAX_ROOMS,
            preload_extent: config::PRELOAD_EXTENT,
        }
    }
}

/// Streams rooms in and out around the player.
#[derive(Debug, Clone, Default)]
pub struct RoomActivation {
    pub settings: ActivationSettings,
}

impl RoomActivation {
    pub fn new(settings: ActivationSettings) -> Self {
        Self { settings }
    }

    /// Resolves the current room for this tick and updates room visibility.
    ///
    /// Returns the new current room, which equals `current` when nothing triggered.
    pub fn activate(
        &self,
        player_pos: Point3,
        graph: &mut RoomGraph,
        current: RoomId,
    ) -> UndercroftResult<RoomId> {
        if graph.room(current).is_none() {
            return Err(UndercroftError::InvalidState(format!(
                "current room {} does not exist",
                current
            )));
        }

        let mut current = current;

        if let Some(target) = self.door_target(player_pos, graph, current) {
            debug!("Door proximity: room {} -> {}", current, target);
            self.switch_room(graph, current, target)?;
            current = target;
        }

        let room_size = graph.room_size();
        let inside = graph
            .rooms()
            .find(|room| room.contains_xz(player_pos, room_size))
            .map(|room| room.id);
        if let Some(target) = inside {
            if target != current {
                debug!("Player entered room {} from {}", target, current);
                self.switch_room(graph, current, target)?;
                current = target;
            }
        }

        let preloaded = self.preload(graph, current)?;
        self.stream_out(graph, current, &preloaded)?;
        Ok(current)
    }

    /// First room, in id order, with a door panel within trigger distance.
    fn door_target(&self, player_pos: Point3, graph: &RoomGraph, current: RoomId) -> Option<RoomId> {
        // panels hang 2 units up, further than the trigger distance from the
        // player's feet, so a straight-line check never fires; use the floor plane
        let feet = Point3::new(player_pos.x, 0.0, player_pos.z);
        graph
            .rooms()
            .filter(|room| room.id != current)
            .find(|room| {
                graph.door_positions(room.id).iter().any(|(_, door)| {
                    feet.distance(Point3::new(door.x, 0.0, door.z))
                        < self.settings.door_trigger_distance
                })
            })
            .map(|room| room.id)
    }

    /// Hides the previous room and shows the new one with its doors.
    pub fn switch_room(
        &self,
        graph: &mut RoomGraph,
        from: RoomId,
        to: RoomId,
    ) -> UndercroftResult<()> {
        if from == to {
            return Ok(());
        }
        graph.set_room_active(from, false)?;
        graph.set_room_active(to, true)?;
        graph.set_doors_active(to, true)?;
        Ok(())
    }

    /// Shows rooms whose center lies within the preload box around `current`.
    ///
    /// Returns the preloaded room ids, not counting `current`. Rooms that are
    /// already active stay untouched.
    pub fn preload(&self, graph: &mut RoomGraph, current: RoomId) -> UndercroftResult<Vec<RoomId>> {
        let center = graph
            .room(current)
            .map(|room| room.center)
            .ok_or_else(|| UndercroftError::InvalidState(format!("no room with id {}", current)))?;
        let reach = graph.room_size() * self.settings.preload_extent;

        let nearby: Vec<RoomId> = graph
            .rooms()
            .filter(|room| room.id != current)
            .filter(|room| {
                (room.center.x - center.x).abs() < reach && (room.center.z - center.z).abs() < reach
            })
            .map(|room| room.id)
            .take(self.settings.preload_max_rooms)
            .collect();

        for &id in &nearby {
            if graph.set_room_active(id, true)? | graph.set_doors_active(id, true)? {
                debug!("Preloaded room {} around {}", id, current);
            }
        }
        Ok(nearby)
    }

    /// Hides every active room that is neither current nor preloaded.
    pub fn stream_out(
        &self,
        graph: &mut RoomGraph,
        current: RoomId,
        preloaded: &[RoomId],
    ) -> UndercroftResult<()> {
        let keep: BTreeSet<RoomId> = preloaded.iter().copied().chain([current]).collect();
        for id in graph.active_rooms() {
            if !keep.contains(&id) {
                debug!("Streaming out room {}", id);
                graph.set_room_active(id, false)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActiveState, Direction, GridPos};

    fn graph(seed: u64) -> RoomGraph {
        RoomGraph::generate(8, 8.0, seed).unwrap()
    }

    fn start(graph: &mut RoomGraph) -> RoomActivation {
        let activation = RoomActivation::default();
        graph.set_room_active(0, true).unwrap();
        graph.set_doors_active(0, true).unwrap();
        activation.preload(graph, 0).unwrap();
        graph.arena.drain_transitions();
        activation
    }

    #[test]
    fn test_staying_put_keeps_current_room() {
        let mut graph = graph(11);
        let activation = start(&mut graph);

        let current = activation
            .activate(Point3::new(0.0, 0.0, 0.0), &mut graph, 0)
            .unwrap();
        assert_eq!(current, 0);
        assert!(graph.room(0).unwrap().is_active());
        // nothing to change after the initial preload
        assert!(graph.arena.pending_transitions().is_empty());
    }

    #[test]
    fn test_walking_into_a_room_switches_to_it() {
        let mut graph = graph(5);
        let activation = start(&mut graph);

        let (direction, target) = Direction::ALL
            .iter()
            .find_map(|&d| graph.neighbor(0, d).map(|id| (d, id)))
            .unwrap();
        let center = graph.room(target).unwrap().center;

        let current = activation.activate(center, &mut graph, 0).unwrap();
        assert_eq!(current, target);
        assert!(graph.room(target).unwrap().is_active());
        // the entry room is adjacent, so the preload keeps it visible
        assert!(graph.room(0).unwrap().is_active());

        let door = graph.room(target).unwrap().door_entities[&direction.opposite()];
        assert_eq!(graph.arena.state(door), Some(ActiveState::Active));
    }

    #[test]
    fn test_switch_hides_previous_room() {
        let mut graph = graph(21);
        let activation = start(&mut graph);
        let target = graph.room_ids()[1];

        activation.switch_room(&mut graph, 0, target).unwrap();
        let transitions = graph.arena.drain_transitions();

        let entry = graph.room(0).unwrap();
        assert!(!entry.is_active());
        for handle in &entry.entities {
            assert_ne!(graph.arena.state(*handle), Some(ActiveState::Active));
        }
        assert!(transitions.iter().any(|t| entry.entities.contains(&t.handle)
            && t.to == ActiveState::Inactive));
        assert!(graph.room(target).unwrap().is_active());
    }

    #[test]
    fn test_door_proximity_switches_before_entering() {
        let mut graph = graph(77);
        let activation = start(&mut graph);
        let (direction, target) = Direction::ALL
            .iter()
            .find_map(|&d| graph.neighbor(0, d).map(|id| (d, id)))
            .unwrap();

        // just short of the shared doorway, still inside the entry room's footprint
        let delta = direction.to_delta();
        let doorway = Point3::new(delta.x as f32 * 3.0, 0.0, delta.z as f32 * 3.0);
        assert!(activation.door_target(doorway, &graph, 0).is_some());

        // footprint check runs last and keeps the player in the room they stand in
        let current = activation.activate(doorway, &mut graph, 0).unwrap();
        assert_eq!(current, 0);
        assert!(graph.room(target).unwrap().is_active());
    }

    #[test]
    fn test_door_trigger_ignores_panel_height() {
        let mut graph = graph(42);
        let activation = start(&mut graph);
        let (target, door) = graph
            .rooms()
            .filter(|room| room.id != 0)
            .find_map(|room| graph.door_positions(room.id).first().map(|&(_, p)| (room.id, p)))
            .unwrap();

        let feet = Point3::new(door.x, 0.0, door.z);
        assert!(feet.distance(door) >= activation.settings.door_trigger_distance);
        assert_eq!(activation.door_target(feet, &graph, 0), Some(target));
    }

    #[test]
    fn test_preload_is_bounded_and_local() {
        let mut graph = graph(3);
        graph.set_room_active(0, true).unwrap();
        let activation = RoomActivation::new(ActivationSettings {
            preload_max_rooms: 1,
            ..ActivationSettings::default()
        });

        let loaded = activation.preload(&mut graph, 0).unwrap();
        assert!(loaded.len() <= 1);
        for id in loaded {
            let grid = graph.room(id).unwrap().grid;
            assert!((grid.x - GridPos::origin().x).abs() <= 1);
            assert!((grid.z - GridPos::origin().z).abs() <= 1);
        }
    }

    #[test]
    fn test_preload_is_idempotent() {
        let mut graph = graph(8);
        let activation = start(&mut graph);

        let before = graph.active_rooms();
        activation.preload(&mut graph, 0).unwrap();
        assert_eq!(graph.active_rooms(), before);
        assert!(graph.arena.pending_transitions().is_empty());
    }

    #[test]
    fn test_far_rooms_are_streamed_out() {
        let mut graph = graph(9);
        let activation = start(&mut graph);
        for id in graph.room_ids() {
            graph.set_room_active(id, true).unwrap();
        }

        activation.activate(Point3::ZERO, &mut graph, 0).unwrap();
        for room in graph.rooms() {
            let near = (room.grid.x).abs() <= 1 && (room.grid.z).abs() <= 1;
            if !near {
                assert!(!room.is_active(), "room {} should be streamed out", room.id);
            }
        }
    }

    #[test]
    fn test_unknown_current_room_is_an_error() {
        let mut graph = graph(1);
        let activation = RoomActivation::default();
        assert!(activation.activate(Point3::ZERO, &mut graph, 99).is_err());
    }
}

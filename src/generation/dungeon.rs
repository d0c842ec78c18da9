//! # Dungeon Generation
//!
//! Builds a connected lattice of rooms with paired doors.
//!
//! The generator grows the dungeon outward from the entry room:
//! 1. Pick the stairs room up front
//! 2. Repeatedly attach a new room to a random existing room in a random direction,
//!    rejecting cells that are already occupied
//! 3. Lay down floors, walls and stairs, then roll enemies and loot
//! 4. Carve every recorded door into its wall once all doors are known

use super::utils;
use crate::{
    config, doorway_transforms, enemy_transform, floor_transform, loot_transform,
    stairs_transform, wall_transform, ActiveState, Direction, EnemyState, EntityArena,
    EntityHandle, EntityKind, GenerationConfig, Generator, GridPos, LootState, Point3, RoomId,
    UndercroftError, UndercroftResult,
};
use log::{debug, info, warn};
use rand::{rngs::StdRng, Rng};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// A unit cell of the dungeon lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    /// Unique identifier; the entry room is always 0
    pub id: RoomId,
    /// Lattice cell occupied by this room
    pub grid: GridPos,
    /// World-space center of the floor
    pub center: Point3,
    /// Directions that have a door, recorded during placement
    pub doors: BTreeSet<Direction>,
    /// Door panels, one per carved direction
    pub door_entities: BTreeMap<Direction, EntityHandle>,
    /// Solid walls; a wall is destroyed when a door is carved through it
    pub walls: BTreeMap<Direction, EntityHandle>,
    /// Every entity whose visibility follows this room
    pub entities: Vec<EntityHandle>,
    pub enemy: Option<EntityHandle>,
    pub loot: Option<EntityHandle>,
    /// Whether this is the stairs room
    pub has_stairs: bool,
    /// Stairs entity; `None` in the stairs room if it could not be created
    pub stairs: Option<EntityHandle>,
    /// Whether the room is streamed in
    pub state: ActiveState,
}

impl Room {
    /// Creates an empty room at a lattice cell.
    pub fn new(id: RoomId, grid: GridPos, room_size: f32, has_stairs: bool) -> Self {
        Self {
            id,
            grid,
            center: grid.to_world(room_size),
            doors: BTreeSet::new(),
            door_entities: BTreeMap::new(),
            walls: BTreeMap::new(),
            entities: Vec::new(),
            enemy: None,
            loot: None,
            has_stairs,
            stairs: None,
            state: ActiveState::Inactive,
        }
    }

    /// Records a door on the given side.
    pub fn add_door(&mut self, direction: Direction) {
        self.doors.insert(direction);
    }

    /// Whether the room has a door on the given side.
    pub fn has_door(&self, direction: Direction) -> bool {
        self.doors.contains(&direction)
    }

    /// Whether a point lies within this room's footprint on the X/Z plane.
    pub fn contains_xz(&self, point: Point3, room_size: f32) -> bool {
        let half = room_size / 2.0;
        (point.x - self.center.x).abs() < half && (point.z - self.center.z).abs() < half
    }

    /// Whether the room is streamed in.
    pub fn is_active(&self) -> bool {
        self.state == ActiveState::Active
    }
}

/// A generated dungeon: rooms keyed by id plus the entity arena they own.
///
/// Once generation finishes the layout never changes; reaching the stairs
/// replaces the whole graph.
#[derive(Debug, Clone)]
pub struct RoomGraph {
    rooms: BTreeMap<RoomId, Room>,
    by_grid: HashMap<GridPos, RoomId>,
    room_size: f32,
    seed: u64,
    stairs_room: RoomId,
    /// Primitives for every room in this dungeon
    pub arena: EntityArena,
}

impl RoomGraph {
    fn empty(room_size: f32, seed: u64, stairs_room: RoomId) -> Self {
        Self {
            rooms: BTreeMap::new(),
            by_grid: HashMap::new(),
            room_size,
            seed,
            stairs_room,
            arena: EntityArena::new(),
        }
    }

    /// Generates a dungeon with the default spawn rates.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::RoomGraph;
    ///
    /// let graph = RoomGraph::generate(8, 8.0, 1234).unwrap();
    /// assert_eq!(graph.len(), 8);
    /// assert!(graph.is_connected());
    /// ```
    pub fn generate(room_count: usize, room_size: f32, seed: u64) -> UndercroftResult<Self> {
        let config = GenerationConfig {
            room_count,
            room_size,
            ..GenerationConfig::new(seed)
        };
        let mut rng = utils::create_rng(&config);
        RoomGraphGenerator::new().generate(&config, &mut rng)
    }

    fn insert_room(&mut self, room: Room) {
        self.by_grid.insert(room.grid, room.id);
        self.rooms.insert(room.id, room);
    }

    /// Gets a room by id.
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// Gets a room mutably by id.
    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Iterates over rooms in id order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Room ids in ascending order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the graph has no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Edge length of every room.
    pub fn room_size(&self) -> f32 {
        self.room_size
    }

    /// Seed this dungeon was generated from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Id of the room flagged to hold the stairs.
    pub fn stairs_room(&self) -> RoomId {
        self.stairs_room
    }

    /// Room occupying a lattice cell, if any.
    pub fn room_at(&self, grid: GridPos) -> Option<RoomId> {
        self.by_grid.get(&grid).copied()
    }

    /// Room reached by walking through the door on `direction`, if there is one.
    pub fn neighbor(&self, id: RoomId, direction: Direction) -> Option<RoomId> {
        let room = self.room(id)?;
        if !room.has_door(direction) {
            return None;
        }
        self.room_at(room.grid.step(direction))
    }

    /// Every room reachable from `start` through doors.
    pub fn reachable_from(&self, start: RoomId) -> BTreeSet<RoomId> {
        let mut visited = BTreeSet::new();
        if !self.rooms.contains_key(&start) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            for direction in Direction::ALL {
                if let Some(next) = self.neighbor(id, direction) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        visited
    }

    /// Whether every room is reachable from the entry room.
    pub fn is_connected(&self) -> bool {
        self.reachable_from(0).len() == self.rooms.len()
    }

    /// Checks that every door has a matching door leading back.
    pub fn check_door_symmetry(&self) -> UndercroftResult<()> {
        for room in self.rooms() {
            for direction in Direction::ALL {
                let neighbor = self.room_at(room.grid.step(direction)).and_then(|id| self.room(id));
                let here = room.has_door(direction);
                let there = neighbor.map_or(false, |n| n.has_door(direction.opposite()));
                if here != there {
                    return Err(UndercroftError::Generation(format!(
                        "door mismatch between room {} and its {:?} neighbour",
                        room.id, direction
                    )));
                }
            }
        }
        Ok(())
    }

    /// Lattice bounding box as (min, max) corners.
    pub fn grid_bounds(&self) -> (GridPos, GridPos) {
        let mut min = GridPos::origin();
        let mut max = GridPos::origin();
        for room in self.rooms() {
            min.x = min.x.min(room.grid.x);
            min.z = min.z.min(room.grid.z);
            max.x = max.x.max(room.grid.x);
            max.z = max.z.max(room.grid.z);
        }
        (min, max)
    }

    /// Ids of rooms that are currently streamed in.
    pub fn active_rooms(&self) -> Vec<RoomId> {
        self.rooms()
            .filter(|r| r.is_active())
            .map(|r| r.id)
            .collect()
    }

    /// Shows or hides a room and every entity it owns.
    ///
    /// Returns whether anything changed; repeating a call is a no-op.
    pub fn set_room_active(&mut self, id: RoomId, active: bool) -> UndercroftResult<bool> {
        let room = self
            .rooms
            .get_mut(&id)
            .ok_or_else(|| UndercroftError::InvalidState(format!("no room with id {}", id)))?;

        let target = if active {
            ActiveState::Active
        } else {
            ActiveState::Inactive
        };
        let mut changed = room.state != target;
        room.state = target;

        for &handle in &room.entities {
            changed |= self.arena.set_active(handle, active)?;
        }
        Ok(changed)
    }

    /// Shows or hides a room's door panels independently of the room.
    pub fn set_doors_active(&mut self, id: RoomId, active: bool) -> UndercroftResult<bool> {
        let room = self
            .rooms
            .get(&id)
            .ok_or_else(|| UndercroftError::InvalidState(format!("no room with id {}", id)))?;

        let mut changed = false;
        for &handle in room.door_entities.values() {
            changed |= self.arena.set_active(handle, active)?;
        }
        Ok(changed)
    }

    /// World positions of a room's door panels.
    pub fn door_positions(&self, id: RoomId) -> Vec<(Direction, Point3)> {
        self.room(id)
            .map(|room| {
                room.door_entities
                    .iter()
                    .filter_map(|(&dir, &handle)| self.arena.position(handle).map(|p| (dir, p)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Dungeon generator using rejection sampling on the room lattice.
#[derive(Debug, Clone)]
pub struct RoomGraphGenerator {
    /// Whether to verify connectivity and door pairing after generation
    pub validate_output: bool,
}

impl RoomGraphGenerator {
    /// Creates a generator that validates its output.
    pub fn new() -> Self {
        Self {
            validate_output: true,
        }
    }

    /// Attaches room `id` to a random existing room.
    fn place_room(
        &self,
        graph: &mut RoomGraph,
        id: RoomId,
        has_stairs: bool,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> UndercroftResult<()> {
        for _ in 0..config.max_placement_attempts {
            // ids are contiguous, so this is uniform over existing rooms
            let base_id = rng.gen_range(0..graph.len()) as RoomId;
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];

            let base_grid = graph
                .room(base_id)
                .map(|r| r.grid)
                .ok_or_else(|| UndercroftError::Generation(format!("missing base room {}", base_id)))?;
            let candidate = base_grid.step(direction);
            if graph.room_at(candidate).is_some() {
                continue;
            }

            let mut room = Room::new(id, candidate, config.room_size, has_stairs);
            room.add_door(direction.opposite());
            graph.insert_room(room);
            if let Some(base) = graph.room_mut(base_id) {
                base.add_door(direction);
            }

            debug!(
                "Placed room {} at ({}, {}) via {} door of room {}",
                id,
                candidate.x,
                candidate.z,
                direction.label(),
                base_id
            );
            return Ok(());
        }

        Err(UndercroftError::Generation(format!(
            "could not place room {} after {} attempts",
            id, config.max_placement_attempts
        )))
    }

    /// Lays down floors, solid walls and stairs for every room.
    fn build_shells(&self, graph: &mut RoomGraph) -> UndercroftResult<()> {
        let room_size = graph.room_size;
        let RoomGraph { rooms, arena, .. } = graph;

        for room in rooms.values_mut() {
            let floor = arena.spawn(room.id, EntityKind::Floor, floor_transform(room.center, room_size))?;
            room.entities.push(floor);

            for direction in Direction::ALL {
                let wall = arena.spawn(
                    room.id,
                    EntityKind::Wall { direction },
                    wall_transform(room.center, direction, room_size),
                )?;
                room.walls.insert(direction, wall);
                room.entities.push(wall);
            }

            if room.has_stairs {
                match arena.spawn(room.id, EntityKind::Stairs, stairs_transform(room.center)) {
                    Ok(stairs) => {
                        room.stairs = Some(stairs);
                        room.entities.push(stairs);
                    }
                    Err(e) => warn!("Stairs unavailable in room {}: {}", room.id, e),
                }
            }
        }
        Ok(())
    }

    /// Rolls enemies and loot for every room except the entry room.
    fn populate(
        &self,
        graph: &mut RoomGraph,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> UndercroftResult<()> {
        let RoomGraph { rooms, arena, .. } = graph;

        for room in rooms.values_mut().filter(|r| r.id != 0) {
            if config.enable_enemies && rng.gen_bool(config.enemy_chance) {
                let kind = EntityKind::Enemy(EnemyState::new(config::ENEMY_HEALTH));
                match arena.spawn(room.id, kind, enemy_transform(room.center)) {
                    Ok(enemy) => {
                        room.enemy = Some(enemy);
                        room.entities.push(enemy);
                    }
                    Err(e) => warn!("Enemy unavailable in room {}: {}", room.id, e),
                }
            }

            if rng.gen_bool(config.loot_chance) {
                let kind = EntityKind::Loot(LootState::default());
                match arena.spawn(room.id, kind, loot_transform(room.center)) {
                    Ok(loot) => {
                        room.loot = Some(loot);
                        room.entities.push(loot);
                    }
                    Err(e) => warn!("Loot unavailable in room {}: {}", room.id, e),
                }
            }
        }
        Ok(())
    }

    /// Replaces each doored wall with two jambs and a door panel.
    ///
    /// Must run after placement so each wall is cut once per direction.
    fn finalize_doors(&self, graph: &mut RoomGraph) -> UndercroftResult<()> {
        let room_size = graph.room_size;
        let RoomGraph { rooms, arena, .. } = graph;

        for room in rooms.values_mut() {
            let pending: Vec<Direction> = room
                .doors
                .iter()
                .copied()
                .filter(|d| !room.door_entities.contains_key(d))
                .collect();

            for direction in pending {
                if let Some(&wall) = room.walls.get(&direction) {
                    arena.destroy(wall)?;
                }

                let geometry = doorway_transforms(room.center, direction, room_size);
                for jamb in [geometry.left_jamb, geometry.right_jamb] {
                    match arena.spawn(room.id, EntityKind::DoorJamb { direction }, jamb) {
                        Ok(handle) => room.entities.push(handle),
                        Err(e) => warn!("Door jamb unavailable in room {}: {}", room.id, e),
                    }
                }
                let door = arena.spawn(room.id, EntityKind::Door { direction }, geometry.panel)?;

                room.entities.push(door);
                room.door_entities.insert(direction, door);
            }
        }
        // carving records destroy transitions nobody has observed yet
        arena.drain_transitions();
        Ok(())
    }
}

impl Generator<RoomGraph> for RoomGraphGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> UndercroftResult<RoomGraph> {
        config.validate()?;

        let stairs_room = rng.gen_range(1..config.room_count) as RoomId;
        info!(
            "Generating dungeon: seed={} rooms={} room_size={} stairs_room={}",
            config.seed, config.room_count, config.room_size, stairs_room
        );

        let mut graph = RoomGraph::empty(config.room_size, config.seed, stairs_room);
        graph.insert_room(Room::new(0, GridPos::origin(), config.room_size, false));

        for id in 1..config.room_count as RoomId {
            self.place_room(&mut graph, id, id == stairs_room, config, rng)?;
        }

        self.build_shells(&mut graph)?;
        self.populate(&mut graph, config, rng)?;
        self.finalize_doors(&mut graph)?;

        if self.validate_output {
            self.validate(&graph, config)?;
        }

        info!(
            "Dungeon ready: {} rooms, {} entities",
            graph.len(),
            graph.arena.len()
        );
        Ok(graph)
    }

    fn validate(&self, graph: &RoomGraph, config: &GenerationConfig) -> UndercroftResult<()> {
        if graph.len() != config.room_count {
            return Err(UndercroftError::Generation(format!(
                "expected {} rooms, found {}",
                config.room_count,
                graph.len()
            )));
        }

        if !graph.is_connected() {
            return Err(UndercroftError::Generation(
                "not every room is reachable from the entry room".to_string(),
            ));
        }

        graph.check_door_symmetry()?;

        let stairs: Vec<RoomId> = graph.rooms().filter(|r| r.has_stairs).map(|r| r.id).collect();
        if stairs.len() != 1 || stairs[0] == 0 {
            return Err(UndercroftError::Generation(format!(
                "expected exactly one stairs room outside the entry room, found {:?}",
                stairs
            )));
        }

        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "RoomGraphGenerator"
    }
}

impl Default for RoomGraphGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64) -> RoomGraph {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = utils::create_rng(&config);
        RoomGraphGenerator::new().generate(&config, &mut rng).unwrap()
    }

    #[test]
    fn test_entry_room_at_origin_without_stairs() {
        let graph = generate(12345);
        let entry = graph.room(0).unwrap();
        assert_eq!(entry.grid, GridPos::origin());
        assert!(!entry.has_stairs);
        assert!(entry.enemy.is_none());
        assert!(entry.loot.is_none());
    }

    #[test]
    fn test_rooms_occupy_distinct_cells() {
        let graph = generate(777);
        let cells: BTreeSet<GridPos> = graph.rooms().map(|r| r.grid).collect();
        assert_eq!(cells.len(), graph.len());
    }

    #[test]
    fn test_room_centers_follow_room_size() {
        let graph = generate(4);
        for room in graph.rooms() {
            assert_eq!(room.center, room.grid.to_world(graph.room_size()));
        }
    }

    #[test]
    fn test_stairs_entity_placed() {
        let graph = generate(31);
        let room = graph.room(graph.stairs_room()).unwrap();
        assert!(room.has_stairs);
        let stairs = room.stairs.expect("stairs entity");
        assert_eq!(graph.arena.get(stairs).unwrap().owner, room.id);
    }

    #[test]
    fn test_testing_config_populates_every_room() {
        let graph = generate(8);
        for room in graph.rooms().filter(|r| r.id != 0) {
            assert!(room.enemy.is_some(), "room {} has no enemy", room.id);
            assert!(room.loot.is_some(), "room {} has no loot", room.id);
        }
    }

    #[test]
    fn test_disabled_enemies_are_never_spawned() {
        let config = GenerationConfig {
            enable_enemies: false,
            ..GenerationConfig::for_testing(5)
        };
        let mut rng = utils::create_rng(&config);
        let graph = RoomGraphGenerator::new().generate(&config, &mut rng).unwrap();
        assert!(graph.rooms().all(|r| r.enemy.is_none()));
    }

    #[test]
    fn test_doors_replace_walls() {
        let graph = generate(2024);
        for room in graph.rooms() {
            assert_eq!(room.doors.len(), room.door_entities.len());
            for direction in Direction::ALL {
                let wall = room.walls[&direction];
                let wall_state = graph.arena.state(wall).unwrap();
                if room.has_door(direction) {
                    assert_eq!(wall_state, ActiveState::Destroyed);
                } else {
                    assert_eq!(wall_state, ActiveState::Inactive);
                }
            }
        }
        assert!(graph.arena.pending_transitions().is_empty());
    }

    #[test]
    fn test_room_size_below_door_width_is_a_config_error() {
        assert!(matches!(
            RoomGraph::generate(8, 2.0, 1),
            Err(UndercroftError::InvalidConfig(_))
        ));
        assert!(matches!(
            RoomGraph::generate(8, 1.5, 1),
            Err(UndercroftError::InvalidConfig(_))
        ));

        // narrow but valid rooms still get both jambs and a panel per door
        let graph = RoomGraph::generate(8, 2.5, 1).unwrap();
        for room in graph.rooms() {
            let jambs = room
                .entities
                .iter()
                .filter(|&&h| matches!(graph.arena.get(h).unwrap().kind, EntityKind::DoorJamb { .. }))
                .count();
            assert_eq!(jambs, room.doors.len() * 2);
        }
    }

    #[test]
    fn test_neighbor_follows_doors() {
        let graph = generate(99);
        for room in graph.rooms() {
            for direction in Direction::ALL {
                match graph.neighbor(room.id, direction) {
                    Some(other) => {
                        assert!(room.has_door(direction));
                        assert_eq!(graph.neighbor(other, direction.opposite()), Some(room.id));
                    }
                    None => assert!(!room.has_door(direction)),
                }
            }
        }
    }

    #[test]
    fn test_placement_cap_raises_generation_error() {
        // one attempt per room cannot survive hundreds of placements
        let config = GenerationConfig {
            room_count: 400,
            max_placement_attempts: 1,
            ..GenerationConfig::new(3)
        };
        let mut rng = utils::create_rng(&config);
        let result = RoomGraphGenerator::new().generate(&config, &mut rng);
        assert!(matches!(result, Err(UndercroftError::Generation(_))));
    }

    #[test]
    fn test_set_room_active_is_idempotent() {
        let mut graph = generate(10);
        assert!(graph.set_room_active(0, true).unwrap());
        graph.arena.drain_transitions();

        assert!(!graph.set_room_active(0, true).unwrap());
        assert!(!graph.set_doors_active(0, true).unwrap());
        assert!(graph.arena.pending_transitions().is_empty());
        assert_eq!(graph.active_rooms(), vec![0]);
    }

    #[test]
    fn test_unknown_room_is_an_error() {
        let mut graph = generate(10);
        assert!(graph.set_room_active(1_000, true).is_err());
        assert!(graph.door_positions(1_000).is_empty());
    }

    #[test]
    fn test_contains_xz() {
        let room = Room::new(1, GridPos::new(1, 0), 8.0, false);
        assert!(room.contains_xz(Point3::new(8.0, 3.0, 0.0), 8.0));
        assert!(room.contains_xz(Point3::new(11.9, 0.0, -3.9), 8.0));
        assert!(!room.contains_xz(Point3::new(12.0, 0.0, 0.0), 8.0));
    }
}

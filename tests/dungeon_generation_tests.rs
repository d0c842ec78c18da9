//! Property tests for the room graph generator.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use undercroft::{
    generation::utils, Direction, GenerationConfig, Generator, GridPos, RoomGraph,
    RoomGraphGenerator, RoomId,
};

/// Layout fingerprint: id, lattice cell, doors and stairs flag per room.
fn layout(graph: &RoomGraph) -> Vec<(RoomId, GridPos, BTreeSet<Direction>, bool)> {
    graph
        .rooms()
        .map(|r| (r.id, r.grid, r.doors.clone(), r.has_stairs))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_dungeons_are_connected(seed in any::<u64>(), rooms in 2usize..24) {
        let graph = RoomGraph::generate(rooms, 8.0, seed).unwrap();

        prop_assert_eq!(graph.len(), rooms);
        prop_assert!(graph.is_connected());
        prop_assert_eq!(graph.reachable_from(0).len(), rooms);

        let cells: HashSet<GridPos> = graph.rooms().map(|r| r.grid).collect();
        prop_assert_eq!(cells.len(), rooms);
    }

    #[test]
    fn doors_always_come_in_pairs(seed in any::<u64>(), rooms in 2usize..24) {
        let graph = RoomGraph::generate(rooms, 8.0, seed).unwrap();

        for room in graph.rooms() {
            for direction in Direction::ALL {
                let neighbor = graph
                    .room_at(room.grid.step(direction))
                    .and_then(|id| graph.room(id));
                let back = neighbor.map_or(false, |n| n.has_door(direction.opposite()));
                prop_assert_eq!(room.has_door(direction), back);
            }
        }
    }

    #[test]
    fn exactly_one_stairs_room_outside_entry(seed in any::<u64>(), rooms in 2usize..24) {
        let graph = RoomGraph::generate(rooms, 8.0, seed).unwrap();

        let stairs: Vec<RoomId> = graph.rooms().filter(|r| r.has_stairs).map(|r| r.id).collect();
        prop_assert_eq!(stairs.len(), 1);
        prop_assert_ne!(stairs[0], 0);
        prop_assert_eq!(stairs[0], graph.stairs_room());
        prop_assert!(graph.room(stairs[0]).unwrap().stairs.is_some());
    }

    #[test]
    fn entry_room_is_never_populated(seed in any::<u64>()) {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = utils::create_rng(&config);
        let graph = RoomGraphGenerator::new().generate(&config, &mut rng).unwrap();

        let entry = graph.room(0).unwrap();
        prop_assert!(entry.enemy.is_none());
        prop_assert!(entry.loot.is_none());
        prop_assert_eq!(entry.grid, GridPos::origin());
    }
}

#[test]
fn test_same_seed_same_dungeon() {
    let first = RoomGraph::generate(8, 8.0, 31_337).unwrap();
    let second = RoomGraph::generate(8, 8.0, 31_337).unwrap();

    assert_eq!(layout(&first), layout(&second));
    assert_eq!(first.stairs_room(), second.stairs_room());
    assert_eq!(first.arena.len(), second.arena.len());
}

#[test]
fn test_doored_walls_are_replaced() {
    let graph = RoomGraph::generate(10, 8.0, 99).unwrap();

    for room in graph.rooms() {
        for direction in Direction::ALL {
            assert_eq!(
                room.has_door(direction),
                room.door_entities.contains_key(&direction),
                "room {} direction {:?}",
                room.id,
                direction
            );
        }
    }
}

#[test]
fn test_disabled_enemies_are_never_spawned() {
    let mut config = GenerationConfig::for_testing(12);
    config.enable_enemies = false;
    let mut rng = utils::create_rng(&config);
    let graph = RoomGraphGenerator::new().generate(&config, &mut rng).unwrap();

    assert!(graph.rooms().all(|r| r.enemy.is_none()));
    // loot is unaffected by the enemy switch
    assert!(graph.rooms().filter(|r| r.id != 0).all(|r| r.loot.is_some()));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = GenerationConfig::new(1);
    config.room_count = 1;
    let mut rng = utils::create_rng(&config);
    assert!(RoomGraphGenerator::new().generate(&config, &mut rng).is_err());
}

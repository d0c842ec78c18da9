//! # Room Geometry
//!
//! Transforms for the primitives that make up a room: floor, solid walls, the
//! two jambs and panel that replace a wall when a door is carved, and the
//! positions of stairs, enemies and loot relative to the room center.

use crate::{config, Direction, Point3, Transform};

/// Floor plane covering the whole room cell.
pub fn floor_transform(center: Point3, room_size: f32) -> Transform {
    Transform::new(
        Point3::new(center.x, 0.0, center.z),
        Point3::new(room_size, 1.0, room_size),
    )
}

/// Offset from the room center to the middle of the wall facing `direction`.
fn wall_offset(direction: Direction, room_size: f32) -> Point3 {
    let half = room_size / 2.0;
    match direction {
        Direction::North => Point3::new(0.0, 0.0, half),
        Direction::South => Point3::new(0.0, 0.0, -half),
        Direction::East => Point3::new(half, 0.0, 0.0),
        Direction::West => Point3::new(-half, 0.0, 0.0),
    }
}

/// Builds a scale vector that runs `along` the wall and is `across` thick.
fn wall_scale(direction: Direction, along: f32, height: f32, across: f32) -> Point3 {
    match direction {
        Direction::North | Direction::South => Point3::new(along, height, across),
        Direction::East | Direction::West => Point3::new(across, height, along),
    }
}

/// Unit vector running along the wall facing `direction`.
fn wall_tangent(direction: Direction) -> Point3 {
    match direction {
        Direction::North | Direction::South => Point3::new(1.0, 0.0, 0.0),
        Direction::East | Direction::West => Point3::new(0.0, 0.0, 1.0),
    }
}

/// Solid wall on the `direction` side of a room.
///
/// # Examples
///
/// ```
/// use undercroft::{wall_transform, Direction, Point3};
///
/// let wall = wall_transform(Point3::ZERO, Direction::East, 8.0);
/// assert_eq!(wall.position.x, 4.0);
/// assert_eq!(wall.scale.z, 8.0);
/// ```
pub fn wall_transform(center: Point3, direction: Direction, room_size: f32) -> Transform {
    let mut position = center + wall_offset(direction, room_size);
    position.y = config::WALL_HEIGHT / 2.0;
    Transform::new(
        position,
        wall_scale(
            direction,
            room_size,
            config::WALL_HEIGHT,
            config::WALL_THICKNESS,
        ),
    )
}

/// The three primitives that replace a solid wall when a door is carved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorwayGeometry {
    pub left_jamb: Transform,
    pub right_jamb: Transform,
    pub panel: Transform,
}

/// Jambs either side of the opening and the door panel sitting just outside the wall.
pub fn doorway_transforms(center: Point3, direction: Direction, room_size: f32) -> DoorwayGeometry {
    let wall_mid = center + wall_offset(direction, room_size);
    let tangent = wall_tangent(direction);

    let jamb_length = (room_size - config::DOOR_WIDTH) / 2.0;
    let jamb_shift = config::DOOR_WIDTH / 2.0 + jamb_length / 2.0;
    let jamb_scale = wall_scale(
        direction,
        jamb_length,
        config::WALL_HEIGHT,
        config::WALL_THICKNESS,
    );

    let mut left = wall_mid + tangent * -jamb_shift;
    left.y = config::WALL_HEIGHT / 2.0;
    let mut right = wall_mid + tangent * jamb_shift;
    right.y = config::WALL_HEIGHT / 2.0;

    let outward = direction.to_delta();
    let mut panel = wall_mid
        + Point3::new(outward.x as f32, 0.0, outward.z as f32) * config::DOOR_OFFSET;
    panel.y = config::DOOR_HEIGHT / 2.0;

    DoorwayGeometry {
        left_jamb: Transform::new(left, jamb_scale),
        right_jamb: Transform::new(right, jamb_scale),
        panel: Transform::new(
            panel,
            wall_scale(
                direction,
                config::DOOR_WIDTH,
                config::DOOR_HEIGHT,
                config::DOOR_DEPTH,
            ),
        ),
    }
}

/// Stairs cube, set back toward the south wall.
pub fn stairs_transform(center: Point3) -> Transform {
    Transform::new(
        Point3::new(center.x, 1.0, center.z - 2.0),
        Point3::new(2.0, 2.0, 2.0),
    )
}

/// Enemy spawn, toward the north wall.
pub fn enemy_transform(center: Point3) -> Transform {
    Transform::new(
        Point3::new(center.x, 1.0, center.z + 2.0),
        Point3::new(1.0, 1.0, 1.0),
    )
}

/// Loot pickup, toward the east wall.
pub fn loot_transform(center: Point3) -> Transform {
    Transform::new(
        Point3::new(center.x + 2.0, 1.0, center.z),
        Point3::new(0.7, 0.7, 0.7),
    )
}

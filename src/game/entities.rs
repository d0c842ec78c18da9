//! # Entity Arena
//!
//! Every scene primitive a dungeon needs (floors, walls, door jambs, door panels,
//! stairs, enemies, loot) lives in one arena and is addressed by a stable integer
//! [`EntityHandle`]. The simulation only flips [`ActiveState`]s; each flip is
//! recorded as a [`StateTransition`] that the rendering adapter drains to keep
//! its own primitives in sync.

use crate::{Direction, Point3, RoomId, UndercroftError, UndercroftResult};
use serde::{Deserialize, Serialize};

/// Stable index of an entity inside an [`EntityArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

impl EntityHandle {
    /// Position of this handle in the arena's storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Lifecycle of a scene entity.
///
/// `Destroyed` is terminal: a destroyed entity never becomes active again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActiveState {
    /// Exists but is hidden and has no collider
    Inactive,
    /// Visible and collidable
    Active,
    /// Permanently removed from the scene
    Destroyed,
}

/// Primitive the renderer should draw for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Cube,
    Plane,
}

/// Color role of an entity; the renderer maps these to concrete colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Palette {
    Floor,
    Wall,
    Door,
    Stairs,
    Enemy,
    Loot,
}

/// Position and size of an axis-aligned primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Center of the primitive
    pub position: Point3,
    /// Full extents along each axis
    pub scale: Point3,
}

impl Transform {
    /// Creates a new transform.
    pub fn new(position: Point3, scale: Point3) -> Self {
        Self { position, scale }
    }

    /// Half of the scale along each axis.
    pub fn half_extents(&self) -> Point3 {
        self.scale * 0.5
    }

    /// Axis-aligned overlap test against another box.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{Point3, Transform};
    ///
    /// let a = Transform::new(Point3::ZERO, Point3::new(1.0, 1.0, 1.0));
    /// let b = Transform::new(Point3::new(0.9, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// let c = Transform::new(Point3::new(3.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
    /// assert!(a.intersects(&b));
    /// assert!(!a.intersects(&c));
    /// ```
    pub fn intersects(&self, other: &Transform) -> bool {
        let a = self.half_extents();
        let b = other.half_extents();
        (self.position.x - other.position.x).abs() <= a.x + b.x
            && (self.position.y - other.position.y).abs() <= a.y + b.y
            && (self.position.z - other.position.z).abs() <= a.z + b.z
    }
}

/// Mutable state of an enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyState {
    pub health: i32,
    /// Seconds until the enemy may hit again; zero or below means ready
    pub attack_cooldown: f32,
}

impl EnemyState {
    /// Creates a fresh enemy with the given health and a ready attack.
    pub fn new(health: i32) -> Self {
        Self {
            health,
            attack_cooldown: 0.0,
        }
    }

    /// Whether the enemy still has health left.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Mutable state of a loot pickup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootState {
    pub collected: bool,
}

/// What an entity is. Per-kind data is carried in the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Floor,
    Wall { direction: Direction },
    DoorJamb { direction: Direction },
    Door { direction: Direction },
    Stairs,
    Enemy(EnemyState),
    Loot(LootState),
}

impl EntityKind {
    /// Primitive used to draw this kind.
    pub fn shape(&self) -> Shape {
        match self {
            EntityKind::Floor => Shape::Plane,
            _ => Shape::Cube,
        }
    }

    /// Color role used to draw this kind.
    pub fn palette(&self) -> Palette {
        match self {
            EntityKind::Floor => Palette::Floor,
            EntityKind::Wall { .. } | EntityKind::DoorJamb { .. } => Palette::Wall,
            EntityKind::Door { .. } => Palette::Door,
            EntityKind::Stairs => Palette::Stairs,
            EntityKind::Enemy(_) => Palette::Enemy,
            EntityKind::Loot(_) => Palette::Loot,
        }
    }
}

/// A single primitive owned by a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    pub handle: EntityHandle,
    /// Room whose activation this entity follows
    pub owner: RoomId,
    pub kind: EntityKind,
    pub transform: Transform,
    pub state: ActiveState,
}

impl SceneEntity {
    /// Whether the entity is currently visible and collidable.
    pub fn is_active(&self) -> bool {
        self.state == ActiveState::Active
    }
}

/// A recorded change of an entity's [`ActiveState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub handle: EntityHandle,
    pub from: ActiveState,
    pub to: ActiveState,
}

/// Arena of scene entities for one generated dungeon.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityArena {
    entities: Vec<SceneEntity>,
    #[serde(skip)]
    transitions: Vec<StateTransition>,
}

impl EntityArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new inactive entity and returns its handle.
    ///
    /// Fails with [`UndercroftError::EntityCreation`] when the transform is not
    /// finite or has a non-positive extent.
    pub fn spawn(
        &mut self,
        owner: RoomId,
        kind: EntityKind,
        transform: Transform,
    ) -> UndercroftResult<EntityHandle> {
        let scale = transform.scale;
        if !transform.position.is_finite()
            || !scale.is_finite()
            || scale.x <= 0.0
            || scale.y <= 0.0
            || scale.z <= 0.0
        {
            return Err(UndercroftError::EntityCreation(format!(
                "invalid transform for {:?} in room {}: {:?}",
                kind.palette(),
                owner,
                transform
            )));
        }

        let handle = EntityHandle(self.entities.len() as u32);
        self.entities.push(SceneEntity {
            handle,
            owner,
            kind,
            transform,
            state: ActiveState::Inactive,
        });
        Ok(handle)
    }

    /// Gets an entity by handle.
    pub fn get(&self, handle: EntityHandle) -> Option<&SceneEntity> {
        self.entities.get(handle.index())
    }

    /// Gets an entity mutably by handle.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut SceneEntity> {
        self.entities.get_mut(handle.index())
    }

    /// Current state of an entity.
    pub fn state(&self, handle: EntityHandle) -> Option<ActiveState> {
        self.get(handle).map(|e| e.state)
    }

    /// World position of an entity.
    pub fn position(&self, handle: EntityHandle) -> Option<Point3> {
        self.get(handle).map(|e| e.transform.position)
    }

    /// Enables or disables an entity.
    ///
    /// Returns whether anything changed. Destroyed entities and entities already
    /// in the requested state are left untouched and record no transition.
    pub fn set_active(&mut self, handle: EntityHandle, active: bool) -> UndercroftResult<bool> {
        let entity = self.entities.get_mut(handle.index()).ok_or_else(|| {
            UndercroftError::InvalidState(format!("unknown entity handle {}", handle.0))
        })?;

        let target = if active {
            ActiveState::Active
        } else {
            ActiveState::Inactive
        };
        if entity.state == ActiveState::Destroyed || entity.state == target {
            return Ok(false);
        }

        self.transitions.push(StateTransition {
            handle,
            from: entity.state,
            to: target,
        });
        entity.state = target;
        Ok(true)
    }

    /// Permanently removes an entity from the scene.
    pub fn destroy(&mut self, handle: EntityHandle) -> UndercroftResult<bool> {
        let entity = self.entities.get_mut(handle.index()).ok_or_else(|| {
            UndercroftError::InvalidState(format!("unknown entity handle {}", handle.0))
        })?;

        if entity.state == ActiveState::Destroyed {
            return Ok(false);
        }

        self.transitions.push(StateTransition {
            handle,
            from: entity.state,
            to: ActiveState::Destroyed,
        });
        entity.state = ActiveState::Destroyed;
        Ok(true)
    }

    /// Number of entities ever spawned, destroyed ones included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.iter()
    }

    /// Iterates over entities that are currently active.
    pub fn iter_active(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.iter().filter(|e| e.is_active())
    }

    /// Transitions recorded since the last drain.
    pub fn pending_transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Takes all recorded transitions, leaving the log empty.
    pub fn drain_transitions(&mut self) -> Vec<StateTransition> {
        std::mem::take(&mut self.transitions)
    }
}

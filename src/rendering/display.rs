//! # Scene Display
//!
//! Draws the active part of the dungeon from the player's eyes.
//!
//! The display keeps its own set of visible entities, updated from the
//! arena's state transitions each frame and rebuilt whenever the dungeon is
//! replaced.

use super::{palette_color, to_render, FogMaterial, FogParams};
use crate::{ActiveState, EntityHandle, GameSession, Point3, SceneEntity, Shape, StateTransition};
use log::debug;
use macroquad::prelude::*;
use std::collections::BTreeSet;

/// Camera height above the player's feet.
pub const EYE_HEIGHT: f32 = 1.6;

/// Unit view vector for a heading and look angle in degrees.
///
/// Yaw turns clockwise from +Z toward +X; positive pitch looks down.
pub fn view_direction(yaw: f32, pitch: f32) -> Point3 {
    let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
    let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();
    Point3::new(sin_yaw * cos_pitch, -sin_pitch, cos_yaw * cos_pitch)
}

/// Entities the renderer currently draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibleSet {
    handles: BTreeSet<EntityHandle>,
    /// Depth and seed of the dungeon the set was built from
    source: Option<(u32, u64)>,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies transitions in the order they happened.
    pub fn apply(&mut self, transitions: &[StateTransition]) {
        for transition in transitions {
            if transition.to == ActiveState::Active {
                self.handles.insert(transition.handle);
            } else {
                self.handles.remove(&transition.handle);
            }
        }
    }

    /// Brings the set up to date with the session's dungeon.
    pub fn sync(&mut self, session: &mut GameSession) {
        let source = (session.depth, session.graph.seed());
        let transitions = session.graph.arena.drain_transitions();

        if self.source != Some(source) {
            self.handles = session.graph.arena.iter_active().map(|e| e.handle).collect();
            self.source = Some(source);
            debug!("Rebuilt visible set: {} entities", self.handles.len());
        } else {
            self.apply(&transitions);
        }
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.handles.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.handles.iter().copied()
    }
}

/// First-person 3D view of the dungeon.
pub struct Display {
    pub visible: VisibleSet,
    fog: Option<FogMaterial>,
    pub background: Color,
    /// Vertical field of view in degrees
    pub fov: f32,
}

impl Display {
    /// Creates the display, compiling the fog material if asked to.
    ///
    /// Needs a live macroquad context.
    pub fn new(use_fog: bool) -> Self {
        let params = FogParams::default();
        let fog = if use_fog {
            FogMaterial::load_or_fallback(params)
        } else {
            None
        };
        Self {
            visible: VisibleSet::new(),
            fog,
            background: params.color,
            fov: 70.0,
        }
    }

    /// Whether the fog material is in use.
    pub fn has_fog(&self) -> bool {
        self.fog.is_some()
    }

    /// Picks up visibility changes from the simulation.
    pub fn sync(&mut self, session: &mut GameSession) {
        self.visible.sync(session);
    }

    /// Draws the scene. Leaves the default 2D camera active for the HUD.
    pub fn render(&self, session: &GameSession) {
        clear_background(self.background);

        let player = &session.player;
        let eye = player.position + Point3::new(0.0, EYE_HEIGHT, 0.0);
        let target = eye + view_direction(player.yaw, player.pitch);
        set_camera(&Camera3D {
            position: to_render(eye),
            target: to_render(target),
            up: vec3(0.0, 1.0, 0.0),
            fovy: self.fov.to_radians(),
            ..Default::default()
        });

        if let Some(fog) = &self.fog {
            fog.apply();
        }
        for handle in self.visible.iter() {
            if let Some(entity) = session.graph.arena.get(handle) {
                draw_entity(entity);
            }
        }
        if let Some(fog) = &self.fog {
            fog.reset();
        }

        set_default_camera();
    }
}

fn draw_entity(entity: &SceneEntity) {
    let color = palette_color(entity.kind.palette());
    let position = to_render(entity.transform.position);
    let scale = entity.transform.scale;

    match entity.kind.shape() {
        Shape::Cube => {
            let size = vec3(scale.x, scale.y, scale.z);
            draw_cube(position, size, None, color);
            draw_cube_wires(position, size, Color::new(0.0, 0.0, 0.0, 0.35));
        }
        Shape::Plane => {
            // planes take half extents
            draw_plane(position, vec2(scale.x / 2.0, scale.z / 2.0), None, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameSettings;

    #[test]
    fn test_view_direction() {
        let ahead = view_direction(0.0, 0.0);
        assert!((ahead.z - 1.0).abs() < 1e-6);

        let right = view_direction(90.0, 0.0);
        assert!((right.x - 1.0).abs() < 1e-6);

        let down = view_direction(0.0, 90.0);
        assert!((down.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_visible_set_follows_session() {
        let mut session = GameSession::new(GameSettings::new(14)).unwrap();
        let mut visible = VisibleSet::new();

        visible.sync(&mut session);
        let initial: Vec<EntityHandle> = session.graph.arena.iter_active().map(|e| e.handle).collect();
        assert_eq!(visible.len(), initial.len());

        // hide the entry room and watch its floor disappear
        let floor = session.graph.room(0).unwrap().entities[0];
        assert!(visible.contains(floor));
        session.graph.set_room_active(0, false).unwrap();
        visible.sync(&mut session);
        assert!(!visible.contains(floor));
        assert!(session.graph.arena.pending_transitions().is_empty());
    }

    #[test]
    fn test_visible_set_rebuilds_on_new_dungeon() {
        let mut session = GameSession::new(GameSettings::new(15)).unwrap();
        let mut visible = VisibleSet::new();
        visible.sync(&mut session);

        session.regenerate().unwrap();
        visible.sync(&mut session);
        let active: BTreeSet<EntityHandle> =
            session.graph.arena.iter_active().map(|e| e.handle).collect();
        assert_eq!(visible.iter().collect::<BTreeSet<_>>(), active);
    }
}

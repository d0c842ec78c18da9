//! # Rendering Module
//!
//! macroquad adapter: the 3D scene, the fog material and the 2D HUD.
//!
//! Nothing here mutates the simulation beyond draining the arena's
//! state transitions.

pub mod display;
pub mod shaders;
pub mod ui;

pub use display::*;
pub use shaders::*;
pub use ui::*;

use crate::{Palette, Point3};
use macroquad::prelude::*;

/// Concrete color for an entity's palette role.
pub fn palette_color(palette: Palette) -> Color {
    match palette {
        Palette::Floor => DARKGRAY,
        Palette::Wall => Color::new(0.55, 0.52, 0.48, 1.0),
        Palette::Door => BROWN,
        Palette::Stairs => Color::new(0.8, 0.8, 0.85, 1.0),
        Palette::Enemy => RED,
        Palette::Loot => GOLD,
    }
}

/// Converts a simulation point to render space.
///
/// The simulation keeps +X to the right of +Z; macroquad's camera is
/// right-handed, so X is mirrored.
pub fn to_render(point: Point3) -> Vec3 {
    vec3(-point.x, point.y, point.z)
}

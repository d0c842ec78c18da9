//! # User Interface Elements
//!
//! HUD text, the crosshair, the title/pause/game-over panels and the minimap.

use crate::{Direction, GameSession, GridPos, RoomGraph, RoomId, SessionPhase, UndercroftError, UndercroftResult};
use log::warn;
use macroquad::prelude::*;

/// Tutorial panel contents.
pub fn tutorial_lines(enemies: bool) -> Vec<&'static str> {
    let mut lines = vec![
        "Welcome to the Dungeon!",
        "Controls:",
        "WASD - Move",
        "Mouse - Look around (hold right button)",
    ];
    if enemies {
        lines.push("E - Attack enemies");
    }
    lines.extend([
        "ESC - Pause menu",
        "Touch doors to enter new rooms",
        "Collect gold and avoid enemies",
        "",
        "Press SPACE to start",
    ]);
    lines
}

/// How a room is drawn on the minimap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimapRole {
    Current,
    Preloaded,
    Stairs,
    Hidden,
}

/// One room square on the minimap, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapCell {
    pub room: RoomId,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub role: MinimapRole,
    /// Door openings, indexed like [`Direction::ALL`]
    pub doors: [bool; 4],
}

/// Lays out the room lattice top-down with its top-left corner at (`left`, `top`).
///
/// North is up. The stairs room is marked only while it is not current.
pub fn minimap_layout(
    graph: &RoomGraph,
    current: RoomId,
    left: f32,
    top: f32,
    cell: f32,
) -> UndercroftResult<Vec<MinimapCell>> {
    if graph.is_empty() {
        return Err(UndercroftError::InvalidState("no rooms to map".to_string()));
    }
    if !(cell > 0.0) {
        return Err(UndercroftError::InvalidState(format!("bad minimap cell size {}", cell)));
    }
    let (min, max) = graph.grid_bounds();

    Ok(graph
        .rooms()
        .map(|room| {
            let role = if room.id == current {
                MinimapRole::Current
            } else if room.has_stairs {
                MinimapRole::Stairs
            } else if room.is_active() {
                MinimapRole::Preloaded
            } else {
                MinimapRole::Hidden
            };
            let GridPos { x, z } = room.grid;
            MinimapCell {
                room: room.id,
                x: left + (x - min.x) as f32 * cell,
                y: top + (max.z - z) as f32 * cell,
                size: cell,
                role,
                doors: Direction::ALL.map(|d| room.has_door(d)),
            }
        })
        .collect())
}

/// Screen-space HUD drawn on top of the 3D view.
pub struct Hud {
    pub show_minimap: bool,
    pub font_size: f32,
    /// Pixel size of one room on the minimap
    pub minimap_cell: f32,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Hud {
    pub fn new(show_minimap: bool) -> Self {
        Self {
            show_minimap,
            font_size: 28.0,
            minimap_cell: 14.0,
        }
    }

    /// Draws everything for the session's phase. Expects the default camera.
    pub fn draw(&self, session: &GameSession) {
        match session.phase {
            SessionPhase::Title => {
                let lines = tutorial_lines(session.settings.profile.enable_enemies);
                self.draw_panel("Tutorial", &lines);
            }
            SessionPhase::Playing => {
                self.draw_stats(session);
                self.draw_crosshair();
                if self.show_minimap {
                    if let Err(e) = self.draw_minimap(session) {
                        warn!("Minimap skipped: {}", e);
                    }
                }
            }
            SessionPhase::Paused => {
                self.draw_stats(session);
                self.draw_panel("Pause Menu", &["PAUSED", "", "ESC - Resume", "Q - Quit"]);
            }
            SessionPhase::GameOver => {
                let stats = &session.statistics;
                let lines = [
                    "You have fallen.".to_string(),
                    format!("Reached floor {}", session.depth),
                    format!("Gold earned: {}", stats.gold_earned),
                    format!("Enemies defeated: {}", stats.enemies_defeated),
                    format!("Rooms entered: {}", stats.rooms_entered),
                    String::new(),
                    "Press SPACE to try again".to_string(),
                ];
                let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
                self.draw_panel("Game Over", &refs);
            }
        }

        if let Some(status) = &session.status {
            let width = measure_text(status, None, self.font_size as u16, 1.0).width;
            draw_text(status, (screen_width() - width) / 2.0, 30.0, self.font_size, RED);
        }
    }

    fn draw_stats(&self, session: &GameSession) {
        let size = self.font_size;
        let player = &session.player;
        self.draw_boxed(&format!("HP: {}", player.health), 20.0, 40.0, WHITE);
        self.draw_boxed(&format!("Gold: {}", player.gold), 20.0, 40.0 + size * 1.3, YELLOW);
        self.draw_boxed(&format!("Floor: {}", session.depth), 20.0, 40.0 + size * 2.6, LIGHTGRAY);

        if !session.message.is_empty() {
            let small = size * 0.8;
            let width = measure_text(&session.message, None, small as u16, 1.0).width;
            let x = (screen_width() - width) / 2.0;
            let y = screen_height() - 40.0;
            draw_rectangle(x - 8.0, y - small, width + 16.0, small * 1.4, Color::new(0.0, 0.0, 0.0, 0.6));
            draw_text(&session.message, x, y, small, WHITE);
        }
    }

    fn draw_boxed(&self, text: &str, x: f32, y: f32, color: Color) {
        let dims = measure_text(text, None, self.font_size as u16, 1.0);
        draw_rectangle(
            x - 6.0,
            y - dims.offset_y - 4.0,
            dims.width + 12.0,
            dims.height + 8.0,
            Color::new(0.0, 0.0, 0.0, 0.6),
        );
        draw_text(text, x, y, self.font_size, color);
    }

    fn draw_crosshair(&self) {
        let (cx, cy) = (screen_width() / 2.0, screen_height() / 2.0);
        draw_line(cx - 8.0, cy, cx + 8.0, cy, 2.0, WHITE);
        draw_line(cx, cy - 8.0, cx, cy + 8.0, 2.0, WHITE);
    }

    fn draw_panel(&self, title: &str, lines: &[&str]) {
        let size = self.font_size;
        let line_height = size * 1.2;
        let width = lines
            .iter()
            .chain([&title])
            .map(|line| measure_text(line, None, size as u16, 1.0).width)
            .fold(0.0, f32::max)
            + 60.0;
        let height = line_height * (lines.len() as f32 + 2.5);
        let x = (screen_width() - width) / 2.0;
        let y = (screen_height() - height) / 2.0;

        draw_rectangle(x, y, width, height, Color::new(0.05, 0.05, 0.08, 0.9));
        draw_rectangle_lines(x, y, width, height, 2.0, GRAY);
        draw_text(title, x + 30.0, y + line_height * 1.2, size * 1.1, GOLD);
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, x + 30.0, y + line_height * (i as f32 + 2.4), size, WHITE);
        }
    }

    fn draw_minimap(&self, session: &GameSession) -> UndercroftResult<()> {
        let graph = &session.graph;
        let (min, max) = graph.grid_bounds();
        let cols = (max.x - min.x + 1) as f32;
        let cell = self.minimap_cell;
        let left = screen_width() - cols * cell - 20.0;
        let top = 20.0;

        let cells = minimap_layout(graph, session.current_room, left, top, cell)?;
        for c in &cells {
            let color = match c.role {
                MinimapRole::Current => WHITE,
                MinimapRole::Stairs => GOLD,
                MinimapRole::Preloaded => GRAY,
                MinimapRole::Hidden => Color::new(0.25, 0.25, 0.25, 0.8),
            };
            draw_rectangle(c.x + 1.0, c.y + 1.0, c.size - 2.0, c.size - 2.0, color);
            if c.role != MinimapRole::Hidden {
                let (cx, cy) = (c.x + c.size / 2.0, c.y + c.size / 2.0);
                for (direction, _) in Direction::ALL.iter().zip(c.doors).filter(|(_, open)| *open) {
                    let step = direction.to_delta();
                    let (ex, ey) = (step.x as f32 * c.size / 2.0, -step.z as f32 * c.size / 2.0);
                    draw_line(cx + ex * 0.6, cy + ey * 0.6, cx + ex, cy + ey, 2.0, DARKBROWN);
                }
            }
        }

        // player dot, in the same lattice space as the cells
        let room_size = graph.room_size();
        let p = session.player.position;
        let px = left + (p.x / room_size - min.x as f32 + 0.5) * cell;
        let py = top + (max.z as f32 - p.z / room_size + 0.5) * cell;
        draw_circle(px, py, cell * 0.2, RED);
        Ok(())
    }
}

//! # Scene Management System
//!
//! Drives one [`GameSession`] from the macroquad frame loop: poll input,
//! tick the simulation, sync the scene and draw.

use crate::{
    Display, ErrorSink, GameEvent, GameSession, Hud, InputHandler, PlayerInput, SessionPhase,
    UndercroftResult,
};
use log::{debug, info};
use macroquad::prelude::*;

/// The main scene manager that owns the session and its presentation.
pub struct SceneManager {
    session: GameSession,
    display: Display,
    hud: Hud,
    input_handler: InputHandler,
    error_sink: Box<dyn ErrorSink>,
    /// Pointer grab last applied to the window
    grabbed: bool,
}

impl SceneManager {
    /// Creates a scene manager. Needs a live macroquad context.
    pub fn new(session: GameSession, error_sink: Box<dyn ErrorSink>, use_fog: bool) -> Self {
        let hud = Hud::new(session.settings.profile.enable_minimap);
        Self {
            session,
            display: Display::new(use_fog),
            hud,
            input_handler: InputHandler::new(),
            error_sink,
            grabbed: false,
        }
    }

    /// Runs the frame loop until the player quits.
    pub async fn run(&mut self) -> UndercroftResult<()> {
        info!("Entering frame loop (fog: {})", self.display.has_fog());
        loop {
            if self.update_frame() {
                break;
            }
            next_frame().await;
        }

        set_cursor_grab(false);
        show_mouse(true);
        info!(
            "Leaving after {} floors, {} gold",
            self.session.statistics.floors_descended, self.session.player.gold
        );
        Ok(())
    }

    /// Runs one frame. Returns true when the player asked to quit.
    fn update_frame(&mut self) -> bool {
        let dt = get_frame_time();

        for input in self.input_handler.poll_events() {
            if input == PlayerInput::Quit && self.session.phase == SessionPhase::Paused {
                return true;
            }
            let events = self.session.on_input(input, self.error_sink.as_mut());
            Self::log_events(&events);
        }

        let intent = self.input_handler.held_intent(dt);
        let events = self.session.tick(&intent, dt, self.error_sink.as_mut());
        Self::log_events(&events);

        self.apply_pointer_grab();
        self.display.sync(&mut self.session);
        self.display.render(&self.session);
        self.hud.draw(&self.session);
        false
    }

    fn apply_pointer_grab(&mut self) {
        let locked = self.session.pointer_locked;
        if locked != self.grabbed {
            set_cursor_grab(locked);
            show_mouse(!locked);
            self.grabbed = locked;
        }
    }

    fn log_events(events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::DungeonRegenerated { depth, seed } => {
                    info!("Now on floor {} (seed {})", depth, seed);
                }
                GameEvent::PlayerDied => info!("Game over"),
                other => debug!("{:?}", other),
            }
        }
    }
}

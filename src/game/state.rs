//! # Game Session
//!
//! The session owns everything one run of the game mutates: the current
//! dungeon, the current room, the player and the phase of play.
//!
//! A frame drives it through two entry points, both on the same thread:
//! - [`GameSession::on_input`] for discrete key events
//! - [`GameSession::tick`] once per frame with held-key intent and the frame delta
//!
//! Both catch failures, record them in an [`ErrorSink`] and leave the session
//! running for the next frame.

use crate::{
    generation::utils, EncounterEvent, Encounters, ErrorSink, GameSettings, Generator,
    InputIntent, MovementIntegrator, Player, PlayerInput, Point3, RoomActivation, RoomGraph,
    RoomGraphGenerator, RoomId, UndercroftError, UndercroftResult,
};
use log::{debug, error, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Status line shown after a tick fails.
pub const UPDATE_ERROR_STATUS: &str = "Error in update - see error log";
/// Status line shown after an input event fails.
pub const INPUT_ERROR_STATUS: &str = "Error in input - see error log";

/// Phase of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Tutorial panel, waiting for Space
    Title,
    Playing,
    /// Simulation frozen, pause panel shown
    Paused,
    /// The player ran out of health
    GameOver,
}

/// Something the session reports back to the frame driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted { depth: u32 },
    RoomEntered { from: RoomId, to: RoomId },
    Encounter(EncounterEvent),
    DungeonRegenerated { depth: u32, seed: u64 },
    PauseToggled { paused: bool },
    PlayerDied,
}

/// Running totals for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub rooms_entered: u32,
    pub loot_collected: u32,
    pub gold_earned: u64,
    pub enemies_defeated: u32,
    pub damage_taken: u64,
    pub floors_descended: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds an event into the totals.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::RoomEntered { .. } => self.rooms_entered += 1,
            GameEvent::DungeonRegenerated { .. } => self.floors_descended += 1,
            GameEvent::Encounter(EncounterEvent::PlayerHit { damage, .. }) => {
                self.damage_taken += (*damage).max(0) as u64;
            }
            GameEvent::Encounter(EncounterEvent::EnemyDefeated) => self.enemies_defeated += 1,
            GameEvent::Encounter(EncounterEvent::LootCollected { gold, .. }) => {
                self.loot_collected += 1;
                self.gold_earned += *gold as u64;
            }
            _ => {}
        }
    }
}

/// One run of the game.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub settings: GameSettings,
    pub graph: RoomGraph,
    /// The single room whose contents the player can interact with
    pub current_room: RoomId,
    pub player: Player,
    pub phase: SessionPhase,
    /// Lore or combat text shown at the bottom of the HUD
    pub message: String,
    /// Set when a tick or input event fails
    pub status: Option<String>,
    pub statistics: GameStatistics,
    /// Floor number, starting at 1
    pub depth: u32,
    pub pointer_locked: bool,
    rng: StdRng,
    activation: RoomActivation,
    movement: MovementIntegrator,
    encounters: Encounters,
}

impl GameSession {
    /// Generates the first dungeon and waits on the title screen.
    ///
    /// # Examples
    ///
    /// ```
    /// use undercroft::{GameSession, GameSettings, SessionPhase};
    ///
    /// let session = GameSession::new(GameSettings::new(7)).unwrap();
    /// assert_eq!(session.phase, SessionPhase::Title);
    /// assert_eq!(session.current_room, 0);
    /// assert_eq!(session.player.health, 30);
    /// ```
    pub fn new(settings: GameSettings) -> UndercroftResult<Self> {
        settings.validate()?;

        let graph = Self::generate_graph(&settings, settings.generation.seed)?;
        // session randomness must not disturb the generator's stream
        let rng = StdRng::seed_from_u64(settings.generation.seed.rotate_left(32) ^ 0x5eed);
        let spawn = Point3::from_array(settings.spawn_point);

        let mut session = Self {
            activation: RoomActivation::new(settings.activation.clone()),
            movement: MovementIntegrator::new(settings.movement.clone()),
            encounters: Encounters::new(settings.encounters.clone()),
            settings,
            graph,
            current_room: 0,
            player: Player::new(spawn),
            phase: SessionPhase::Title,
            message: String::new(),
            status: None,
            statistics: GameStatistics::new(),
            depth: 1,
            pointer_locked: false,
            rng,
        };
        session.show_entry_room()?;
        Ok(session)
    }

    fn generate_graph(settings: &GameSettings, seed: u64) -> UndercroftResult<RoomGraph> {
        let mut config = settings.generation.clone();
        config.seed = seed;
        config.enable_enemies &= settings.profile.enable_enemies;

        let mut rng = utils::create_rng(&config);
        RoomGraphGenerator::new().generate(&config, &mut rng)
    }

    /// Hides every room, then shows the entry room and its surroundings.
    fn show_entry_room(&mut self) -> UndercroftResult<()> {
        for id in self.graph.room_ids() {
            self.graph.set_room_active(id, false)?;
        }
        self.current_room = 0;
        self.graph.set_room_active(0, true)?;
        self.graph.set_doors_active(0, true)?;
        self.activation.preload(&mut self.graph, 0)?;
        Ok(())
    }

    fn spawn_point(&self) -> Point3 {
        Point3::from_array(self.settings.spawn_point)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    /// Leaves the title or game-over screen and starts a fresh run.
    pub fn start_game(&mut self) -> UndercroftResult<Vec<GameEvent>> {
        if self.phase == SessionPhase::GameOver {
            let seed = self.rng.gen();
            self.graph = Self::generate_graph(&self.settings, seed)?;
            self.depth = 1;
        }

        self.show_entry_room()?;
        self.player.reset_stats();
        self.player.respawn(self.spawn_point());
        self.player.enabled = true;
        self.message.clear();
        self.statistics = GameStatistics::new();
        self.phase = SessionPhase::Playing;
        self.pointer_locked = true;

        info!("Game started at depth {} (seed {})", self.depth, self.graph.seed());
        Ok(vec![GameEvent::GameStarted { depth: self.depth }])
    }

    /// Switches between playing and paused. Does nothing in other phases.
    pub fn toggle_pause(&mut self) -> Option<GameEvent> {
        let paused = match self.phase {
            SessionPhase::Playing => true,
            SessionPhase::Paused => false,
            _ => return None,
        };
        self.phase = if paused {
            SessionPhase::Paused
        } else {
            SessionPhase::Playing
        };
        self.player.enabled = !paused;
        self.pointer_locked = !paused;
        debug!("Paused: {}", paused);
        Some(GameEvent::PauseToggled { paused })
    }

    /// Replaces the dungeon after the stairs are reached.
    ///
    /// On failure the old dungeon stays in place.
    pub fn regenerate(&mut self) -> UndercroftResult<GameEvent> {
        let seed = self.rng.gen();
        let graph = Self::generate_graph(&self.settings, seed)?;

        self.graph = graph;
        self.depth += 1;
        self.player.respawn(self.spawn_point());
        self.show_entry_room()?;
        self.message = EncounterEvent::StairsReached.message();

        info!("Descended to depth {} (seed {})", self.depth, seed);
        Ok(GameEvent::DungeonRegenerated {
            depth: self.depth,
            seed,
        })
    }

    /// Applies a discrete input event.
    pub fn handle_input(&mut self, input: PlayerInput) -> UndercroftResult<Vec<GameEvent>> {
        let mut events = Vec::new();
        match (self.phase, input) {
            (SessionPhase::Title | SessionPhase::GameOver, PlayerInput::Jump) => {
                for event in self.start_game()? {
                    self.record(&mut events, event);
                }
            }
            (SessionPhase::Playing | SessionPhase::Paused, PlayerInput::TogglePause) => {
                if let Some(event) = self.toggle_pause() {
                    self.record(&mut events, event);
                }
            }
            (SessionPhase::Playing, PlayerInput::Jump) => {
                self.movement.jump(&mut self.player);
            }
            (SessionPhase::Playing, PlayerInput::Attack) if self.settings.profile.enable_enemies => {
                if let Some(event) =
                    self.encounters
                        .player_attack(&mut self.graph, self.current_room, &self.player)?
                {
                    self.message = event.message();
                    self.record(&mut events, GameEvent::Encounter(event));
                }
            }
            (SessionPhase::Playing, PlayerInput::PointerLock(locked)) => {
                self.pointer_locked = locked;
            }
            _ => {}
        }
        Ok(events)
    }

    /// Advances the simulation by one frame.
    ///
    /// Runs room activation, then encounters, then movement. Does nothing
    /// unless the game is being played.
    pub fn update(&mut self, intent: &InputIntent, dt: f32) -> UndercroftResult<Vec<GameEvent>> {
        if !self.is_playing() {
            return Ok(Vec::new());
        }
        let mut events = Vec::new();

        let previous = self.current_room;
        self.current_room = self
            .activation
            .activate(self.player.position, &mut self.graph, previous)?;
        if self.current_room != previous {
            let entered = GameEvent::RoomEntered {
                from: previous,
                to: self.current_room,
            };
            self.record(&mut events, entered);
        }

        let outcomes = self.encounters.resolve(
            &mut self.graph,
            self.current_room,
            &mut self.player,
            &mut self.rng,
            dt,
        )?;
        for outcome in outcomes {
            self.message = outcome.message();
            let stairs = outcome == EncounterEvent::StairsReached;
            self.record(&mut events, GameEvent::Encounter(outcome));
            if stairs {
                let regenerated = self.regenerate()?;
                self.record(&mut events, regenerated);
                break;
            }
        }

        if !self.player.is_alive() {
            self.phase = SessionPhase::GameOver;
            self.player.enabled = false;
            self.pointer_locked = false;
            info!("Player died at depth {}", self.depth);
            self.record(&mut events, GameEvent::PlayerDied);
        }

        let intent = InputIntent {
            pointer_locked: self.pointer_locked,
            ..*intent
        };
        self.movement.step(&mut self.player, &intent, dt);
        Ok(events)
    }

    /// Counts an event as it happens, so a later failure in the tick keeps it.
    fn record(&mut self, events: &mut Vec<GameEvent>, event: GameEvent) {
        self.statistics.update_from_event(&event);
        events.push(event);
    }

    /// Frame boundary: runs [`update`](Self::update) and absorbs any failure.
    pub fn tick(&mut self, intent: &InputIntent, dt: f32, sink: &mut dyn ErrorSink) -> Vec<GameEvent> {
        match self.update(intent, dt) {
            Ok(events) => events,
            Err(e) => {
                let err = UndercroftError::UpdateTick(e.to_string());
                error!("{}", err);
                sink.record_error(&err);
                self.status = Some(UPDATE_ERROR_STATUS.to_string());
                Vec::new()
            }
        }
    }

    /// Input boundary: runs [`handle_input`](Self::handle_input) and absorbs any failure.
    pub fn on_input(&mut self, input: PlayerInput, sink: &mut dyn ErrorSink) -> Vec<GameEvent> {
        match self.handle_input(input) {
            Ok(events) => events,
            Err(e) => {
                let err = UndercroftError::InputHandler(e.to_string());
                error!("{}", err);
                sink.record_error(&err);
                self.status = Some(INPUT_ERROR_STATUS.to_string());
                Vec::new()
            }
        }
    }

    /// Rooms shown besides the current one.
    pub fn preloaded_rooms(&self) -> Vec<RoomId> {
        self.graph
            .active_rooms()
            .into_iter()
            .filter(|&id| id != self.current_room)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeatureProfile, MemoryErrorLog};

    const DT: f32 = 1.0 / 60.0;

    fn session(seed: u64) -> GameSession {
        GameSession::new(GameSettings::new(seed)).unwrap()
    }

    fn playing(seed: u64) -> GameSession {
        let mut session = session(seed);
        session.handle_input(PlayerInput::Jump).unwrap();
        session
    }

    #[test]
    fn test_title_ignores_everything_but_start() {
        let mut session = session(1);
        let before = session.player.position;

        assert!(session.handle_input(PlayerInput::TogglePause).unwrap().is_empty());
        assert!(session.update(&InputIntent::from_keys(true, false, false, false), DT).unwrap().is_empty());
        assert_eq!(session.player.position, before);
        assert_eq!(session.phase, SessionPhase::Title);

        let events = session.handle_input(PlayerInput::Jump).unwrap();
        assert_eq!(events, vec![GameEvent::GameStarted { depth: 1 }]);
        assert!(session.is_playing());
        assert!(session.pointer_locked);
    }

    #[test]
    fn test_start_resets_player() {
        let mut session = playing(2);
        session.player.health = 4;
        session.player.gold = 9;
        session.message = "old".to_string();
        session.phase = SessionPhase::Title;

        session.start_game().unwrap();
        assert_eq!(session.player.health, 30);
        assert_eq!(session.player.gold, 0);
        assert!(session.message.is_empty());
        assert_eq!(session.player.position, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(session.current_room, 0);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut session = playing(3);
        session.handle_input(PlayerInput::TogglePause).unwrap();
        assert_eq!(session.phase, SessionPhase::Paused);
        assert!(!session.player.enabled);
        assert!(!session.pointer_locked);

        let before = session.player.clone();
        let forward = InputIntent::from_keys(true, false, false, false);
        for _ in 0..30 {
            assert!(session.update(&forward, DT).unwrap().is_empty());
        }
        assert_eq!(session.player, before);

        // attacks and jumps are ignored while paused
        session.handle_input(PlayerInput::Attack).unwrap();
        session.handle_input(PlayerInput::Jump).unwrap();
        assert_eq!(session.player, before);

        session.handle_input(PlayerInput::TogglePause).unwrap();
        assert!(session.is_playing());
        assert!(session.player.enabled);
    }

    #[test]
    fn test_walking_forward_moves_player() {
        let mut session = playing(4);
        let forward = InputIntent::from_keys(true, false, false, false);
        for _ in 0..60 {
            session.update(&forward, DT).unwrap();
        }
        assert!(session.player.position.z > 0.5);
        assert_eq!(session.player.position.y, 0.0);
    }

    #[test]
    fn test_regenerate_moves_to_new_floor() {
        let mut session = playing(5);
        let old_seed = session.graph.seed();
        session.player.gold = 3;
        session.player.position = Point3::new(9.0, 0.0, 9.0);

        let event = session.regenerate().unwrap();
        assert!(matches!(event, GameEvent::DungeonRegenerated { depth: 2, .. }));
        assert_ne!(session.graph.seed(), old_seed);
        assert_eq!(session.depth, 2);
        assert_eq!(session.current_room, 0);
        assert_eq!(session.player.position, Point3::new(0.0, 1.0, 0.0));
        assert_eq!(session.player.gold, 3);
        assert_eq!(session.message, "You ascend the stairs!");
        assert!(session.graph.room(0).unwrap().is_active());
    }

    #[test]
    fn test_death_ends_the_run() {
        let mut session = playing(6);
        session.player.health = 0;
        let events = session.update(&InputIntent::default(), DT).unwrap();
        assert!(events.contains(&GameEvent::PlayerDied));
        assert_eq!(session.phase, SessionPhase::GameOver);

        let seed = session.graph.seed();
        session.handle_input(PlayerInput::Jump).unwrap();
        assert!(session.is_playing());
        assert_eq!(session.player.health, 30);
        assert_ne!(session.graph.seed(), seed);
    }

    #[test]
    fn test_tick_failure_is_logged_and_survived() {
        let mut session = playing(7);
        session.current_room = 9_999;
        let mut sink = MemoryErrorLog::new();

        let events = session.tick(&InputIntent::default(), DT, &mut sink);
        assert!(events.is_empty());
        assert_eq!(sink.records.len(), 1);
        assert_eq!(sink.records[0].kind, "UpdateTickError");
        assert_eq!(session.status.as_deref(), Some(UPDATE_ERROR_STATUS));

        // the loop carries on once the state is sane again
        session.current_room = 0;
        session.tick(&InputIntent::default(), DT, &mut sink);
        assert_eq!(sink.records.len(), 1);
    }

    #[test]
    fn test_input_failure_is_logged() {
        let mut session = playing(8);
        session.current_room = 9_999;
        let mut sink = MemoryErrorLog::new();

        session.on_input(PlayerInput::Attack, &mut sink);
        assert_eq!(sink.records[0].kind, "InputHandlerError");
        assert_eq!(session.status.as_deref(), Some(INPUT_ERROR_STATUS));
    }

    #[test]
    fn test_lite_profile_has_no_enemies() {
        let settings = GameSettings::new(9).with_profile(FeatureProfile::lite());
        let session = GameSession::new(settings).unwrap();
        assert!(session.graph.rooms().all(|r| r.enemy.is_none()));
    }

    #[test]
    fn test_profile_masks_enemy_generation() {
        let mut settings = GameSettings::new(9);
        settings.profile = FeatureProfile::lite();
        assert!(settings.generation.enable_enemies);

        let session = GameSession::new(settings).unwrap();
        assert!(session.graph.rooms().all(|r| r.enemy.is_none()));
    }

    #[test]
    fn test_statistics_survive_a_failed_regeneration() {
        let mut settings = GameSettings::new(10).with_profile(FeatureProfile::lite());
        settings.generation.loot_chance = 1.0;
        let mut session = GameSession::new(settings).unwrap();
        session.handle_input(PlayerInput::Jump).unwrap();

        // put the loot on the stairs so both resolve in one tick
        let room = session.graph.room(session.graph.stairs_room()).unwrap();
        let (stairs, loot) = (room.stairs.unwrap(), room.loot.unwrap());
        let stairs_pos = session.graph.arena.position(stairs).unwrap();
        session.graph.arena.get_mut(loot).unwrap().transform.position = stairs_pos;
        session.player.position = Point3::new(stairs_pos.x, 0.0, stairs_pos.z);

        // the next floor cannot be generated
        session.settings.generation.room_count = 1;
        let mut sink = MemoryErrorLog::new();
        let events = session.tick(&InputIntent::default(), DT, &mut sink);

        assert!(events.is_empty());
        assert_eq!(sink.records.len(), 1);
        assert_eq!(session.depth, 1);
        assert!(session.player.gold > 0);
        assert_eq!(session.statistics.loot_collected, 1);
        assert_eq!(session.statistics.gold_earned, session.player.gold as u64);
        assert_eq!(session.statistics.rooms_entered, 1);
        assert_eq!(session.statistics.floors_descended, 0);
    }

    #[test]
    fn test_statistics_follow_events() {
        let mut stats = GameStatistics::new();
        stats.update_from_event(&GameEvent::Encounter(EncounterEvent::LootCollected {
            gold: 4,
            lore: String::new(),
        }));
        stats.update_from_event(&GameEvent::Encounter(EncounterEvent::PlayerHit {
            damage: 2,
            remaining: 28,
        }));
        stats.update_from_event(&GameEvent::RoomEntered { from: 0, to: 1 });
        assert_eq!(stats.loot_collected, 1);
        assert_eq!(stats.gold_earned, 4);
        assert_eq!(stats.damage_taken, 2);
        assert_eq!(stats.rooms_entered, 1);
    }
}

//! # Undercroft Main Entry Point
//!
//! Parses the command line, builds the session settings, sets up logging and
//! runs the macroquad frame loop.

use clap::{Parser, ValueEnum};
use log::{error, info};
use macroquad::prelude::*;
use std::path::PathBuf;
use undercroft::{
    ErrorLogFormat, ErrorSink, FeatureProfile, GameSession, GameSettings, SceneManager,
    UndercroftResult,
};

/// Feature preset selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    /// Enemies and combat
    Classic,
    /// Exploration only, with a minimap
    Lite,
}

impl From<ProfileArg> for FeatureProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Classic => FeatureProfile::classic(),
            ProfileArg::Lite => FeatureProfile::lite(),
        }
    }
}

/// Command line arguments for Undercroft.
#[derive(Parser, Debug)]
#[command(name = "undercroft")]
#[command(about = "A first-person dungeon crawler with procedurally generated, streamed rooms")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Rooms per dungeon
    #[arg(long)]
    rooms: Option<usize>,

    /// Edge length of a room
    #[arg(long)]
    room_size: Option<f32>,

    /// Feature preset
    #[arg(long, value_enum)]
    profile: Option<ProfileArg>,

    /// JSON settings file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Persistent error log path
    #[arg(long)]
    error_log: Option<PathBuf>,

    /// Persistent error log format
    #[arg(long, value_enum, default_value = "json")]
    error_log_format: ErrorLogFormat,

    /// Draw with flat colors instead of the fog shader
    #[arg(long)]
    no_fog: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Undercroft".to_owned(),
        window_width: 1024,
        window_height: 768,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() -> UndercroftResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting Undercroft v{}", undercroft::VERSION);

    let settings = match build_settings(&args) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid settings: {}", e);
            return Err(e);
        }
    };
    info!(
        "Seed {} with {} rooms of size {}",
        settings.generation.seed, settings.generation.room_count, settings.generation.room_size
    );

    let mut sink = args.error_log_format.open(args.error_log.clone());
    let session = match GameSession::new(settings) {
        Ok(session) => session,
        Err(e) => {
            error!("Could not create the dungeon: {}", e);
            sink.record_error(&e);
            return Err(e);
        }
    };

    let mut scenes = SceneManager::new(session, sink, !args.no_fog);
    scenes.run().await
}

/// Initializes `env_logger` at the requested level unless `RUST_LOG` is set.
fn initialize_logging(log_level: &str) {
    let env = env_logger::Env::default().default_filter_or(log_level);
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        eprintln!("Logger already initialized: {}", e);
    }
}

/// Merges the settings file, the command line and the defaults.
fn build_settings(args: &Args) -> UndercroftResult<GameSettings> {
    let mut settings = match &args.config {
        Some(path) => GameSettings::from_json_file(path)?,
        None => GameSettings::default(),
    };

    if let Some(profile) = args.profile {
        settings = settings.with_profile(profile.into());
    }
    match args.seed {
        Some(seed) => settings.generation.seed = seed,
        None if args.config.is_none() => {
            settings.generation.seed = chrono::Local::now().timestamp_millis() as u64;
        }
        None => {}
    }
    if let Some(rooms) = args.rooms {
        settings.generation.room_count = rooms;
    }
    if let Some(room_size) = args.room_size {
        settings.generation.room_size = room_size;
    }

    settings.validate()?;
    Ok(settings)
}

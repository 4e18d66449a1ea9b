//! # Carotid Main Entry Point
//!
//! Parses the command line, sets up logging, builds the first level and
//! hands control to the scene manager.

use carotid::scenes::SceneManager;
use carotid::{
    AssetRegistry, AudioSink, CarotidResult, GameSettings, GameState, InputHandler,
    LoggingAudioSink, MutedAudioSink,
};
use clap::Parser;
use log::info;
use macroquad::prelude::request_new_screen_size;
use std::path::PathBuf;

/// Command line arguments for Carotid.
#[derive(Parser, Debug)]
#[command(name = "carotid")]
#[command(about = "Survive the crypt: free the souls, find the exit")]
#[command(version)]
struct Args {
    /// Random seed for level generation and spawns
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with game settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with god mode on
    #[arg(long)]
    god: bool,

    /// Start with noclip on
    #[arg(long)]
    noclip: bool,

    /// Ignore the lightmap when drawing
    #[arg(long)]
    fullbright: bool,

    /// Show the debug overlay
    #[arg(long)]
    debug: bool,

    /// Disable sound
    #[arg(long)]
    mute: bool,

    /// Log level (error, warn, info, debug, trace); defaults to RUST_LOG, then info
    #[arg(long)]
    log_level: Option<String>,
}

#[macroquad::main("Carotid")]
async fn main() -> CarotidResult<()> {
    let args = Args::parse();
    initialize_logging(args.log_level.as_deref());

    info!("Starting Carotid v{}", carotid::VERSION);
    run_game(&args).await
}

/// Initializes env_logger from the flag, falling back to `RUST_LOG`.
fn initialize_logging(log_level: Option<&str>) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = log_level {
        builder.parse_filters(level);
    }
    builder.format_target(false).init();
}

fn load_settings(args: &Args) -> CarotidResult<GameSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            info!("Loading settings from {}", path.display());
            GameSettings::from_json_file(path)?
        }
        None => GameSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    Ok(settings)
}

async fn run_game(args: &Args) -> CarotidResult<()> {
    request_new_screen_size(1024.0, 768.0);

    let settings = load_settings(args)?;
    info!("Generating level 1 with seed {}", settings.seed);
    let mut game_state = GameState::new(settings, AssetRegistry::new())?;
    game_state.flags.god = args.god;
    game_state.flags.noclip = args.noclip;
    game_state.flags.fullbright = args.fullbright;
    game_state.flags.debug = args.debug;

    let audio: Box<dyn AudioSink> = if args.mute {
        Box::new(MutedAudioSink)
    } else {
        Box::new(LoggingAudioSink::default())
    };

    let mut scenes = SceneManager::new(game_state, InputHandler::new(), audio);
    scenes.run().await?;

    info!("Game loop ended");
    Ok(())
}

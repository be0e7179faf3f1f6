//! Startup settings: command-line flags layered over an optional JSON board
//! config file.

use crate::game::{Game, Mode};
use anyhow::Context;
use chessboard::{BoardConfig, DropOffBoard, ErrorMode, Orientation, PositionInput};
use clap::Parser;
use cozy_chess::Color;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Environment variable naming a board config file.
pub const CONFIG_ENV: &str = "CHESSBOARD_CONFIG";

#[derive(Debug, Parser)]
#[command(name = "chessboard-tui", about = "Drag-and-drop chessboard in the terminal")]
pub struct Args {
    /// JSON board config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Board orientation, which is also the side you play: white or black.
    #[arg(long)]
    pub orientation: Option<String>,

    /// Starting position: "start", a FEN, or just its board field.
    #[arg(long)]
    pub fen: Option<String>,

    /// Minimum milliseconds between dragged-piece updates.
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Show the spare-piece trays for setting up positions.
    #[arg(long)]
    pub spare_pieces: bool,

    /// Remove pieces dropped off the board instead of snapping them back.
    #[arg(long)]
    pub trash: bool,

    /// Seed for the opponent's move choice.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Color theme: dark or light. Defaults to `CHESSBOARD_THEME`.
    #[arg(long)]
    pub theme: Option<String>,
}

impl Args {
    /// Layer the flags over `config` and apply what the terminal host needs:
    /// pieces are always draggable and errors go to the status line.
    pub fn apply(&self, mut config: BoardConfig) -> anyhow::Result<BoardConfig> {
        if let Some(orientation) = &self.orientation {
            config.orientation = orientation
                .parse::<Orientation>()
                .context("Invalid --orientation")?;
        }
        if let Some(fen) = &self.fen {
            config.position = Some(PositionInput::from_text(fen));
        }
        if let Some(ms) = self.throttle_ms {
            config.drag_throttle_rate = ms;
        }
        if self.spare_pieces {
            config.spare_pieces = true;
        }
        if self.trash {
            config.drop_off_board = DropOffBoard::Trash;
        }
        config.draggable = true;
        config.show_errors = ErrorMode::Alert;
        Ok(config.normalized())
    }
}

/// Where the board config comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by the user; it is an error if it cannot be read.
    Explicit(PathBuf),
    /// The per-user default file, which exists.
    Default(PathBuf),
    Builtin,
}

/// Find the board config file.
///
/// Priority:
/// 1. `--config` flag if given
/// 2. `CHESSBOARD_CONFIG` env variable if set
/// 3. `<config dir>/chessboard/config.json` if it exists
/// 4. built-in defaults
pub fn config_source(cli: Option<&Path>) -> ConfigSource {
    config_source_in(cli, std::env::var(CONFIG_ENV).ok(), default_config_dir())
}

fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chessboard"))
}

fn config_source_in(cli: Option<&Path>, env: Option<String>, dir: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = cli {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.is_empty()) {
        return ConfigSource::Explicit(PathBuf::from(path));
    }
    match dir.map(|dir| dir.join("config.json")) {
        Some(path) if path.is_file() => ConfigSource::Default(path),
        _ => ConfigSource::Builtin,
    }
}

/// Read the board config. Unknown or wrongly typed options fall back to
/// their defaults; an unreadable file or invalid JSON is an error.
pub fn load_config(source: &ConfigSource) -> anyhow::Result<BoardConfig> {
    let path = match source {
        ConfigSource::Explicit(path) | ConfigSource::Default(path) => path,
        ConfigSource::Builtin => return Ok(BoardConfig::default()),
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in config file {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded board config");
    Ok(BoardConfig::from_value(&value))
}

/// The game that goes with the configured position.
///
/// A FEN the rules engine accepts starts a game from it. Any other position
/// (board-only FEN, piece map) opens in setup mode. No position means the
/// standard start, and the board is told so.
pub fn initial_game(config: &mut BoardConfig, seed: Option<u64>) -> Game {
    let human = match config.orientation {
        Orientation::White => Color::White,
        Orientation::Black => Color::Black,
    };
    let mut game = match seed {
        Some(seed) => Game::with_seed(human, seed),
        None => Game::new(human),
    };

    match &config.position {
        None | Some(PositionInput::Start) => {
            config.position = Some(PositionInput::Start);
        }
        Some(PositionInput::Fen(fen)) if game.load_fen(fen).is_ok() => {}
        Some(_) => {
            tracing::info!("Position is not a playable game, opening in setup mode");
            game.set_mode(Mode::Setup);
        }
    }
    game
}

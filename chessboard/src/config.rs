//! Board configuration.
//!
//! Every option has a documented default. The loose loader
//! [`BoardConfig::from_value`] never fails: a wrongly typed or out-of-range
//! value is replaced by its default and logged at debug level.

use crate::error::{BoardError, ErrorMode};
use chess::{Piece, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Default image template; `{piece}` is replaced by the piece code.
pub const DEFAULT_PIECE_THEME: &str = "img/chesspieces/{piece}.png";

const DEFAULT_APPEAR_SPEED_MS: u64 = 200;
const DEFAULT_MOVE_SPEED_MS: u64 = 200;
const DEFAULT_SNAPBACK_SPEED_MS: u64 = 60;
const DEFAULT_SNAP_SPEED_MS: u64 = 30;
const DEFAULT_TRASH_SPEED_MS: u64 = 100;
const DEFAULT_DRAG_THROTTLE_RATE_MS: u64 = 20;

const FAST_MS: u64 = 200;
const SLOW_MS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    White,
    Black,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl FromStr for Orientation {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            other => Err(BoardError::argument("orientation", other)),
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a piece dropped outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropOffBoard {
    #[default]
    Snapback,
    Trash,
}

/// Duration of one animation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationSpeed {
    Fast,
    Slow,
    Millis(u64),
}

impl AnimationSpeed {
    pub fn duration(self) -> Duration {
        match self {
            Self::Fast => Duration::from_millis(FAST_MS),
            Self::Slow => Duration::from_millis(SLOW_MS),
            Self::Millis(ms) => Duration::from_millis(ms),
        }
    }

    /// `"fast"`, `"slow"` or a non-negative integer number of milliseconds.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if s == "fast" => Some(Self::Fast),
            Value::String(s) if s == "slow" => Some(Self::Slow),
            Value::Number(n) => n.as_u64().map(Self::Millis),
            _ => None,
        }
    }
}

pub type PieceThemeFn = Arc<dyn Fn(Piece) -> String + Send + Sync>;

/// Resolves a piece to its image source.
#[derive(Clone)]
pub enum PieceTheme {
    /// URL template with a `{piece}` placeholder.
    Template(String),
    Custom(PieceThemeFn),
}

impl PieceTheme {
    pub fn image_for(&self, piece: Piece) -> String {
        match self {
            Self::Template(template) => template.replace("{piece}", &piece.to_string()),
            Self::Custom(f) => f(piece),
        }
    }
}

impl Default for PieceTheme {
    fn default() -> Self {
        Self::Template(DEFAULT_PIECE_THEME.to_string())
    }
}

impl std::fmt::Debug for PieceTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Anything the board accepts as a position.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionInput {
    /// The standard initial position.
    Start,
    Fen(String),
    Position(Position),
    /// Square name → piece code strings, validated on use.
    Raw(BTreeMap<String, String>),
}

impl PositionInput {
    /// Validate and convert to a Position.
    pub fn resolve(&self) -> Result<Position, BoardError> {
        match self {
            Self::Start => Ok(Position::start()),
            Self::Fen(fen) => Ok(Position::from_fen(fen)?),
            Self::Position(position) => Ok(position.clone()),
            Self::Raw(raw) => Ok(Position::from_raw(raw)?),
        }
    }

    /// `"start"` (any case) or a FEN string.
    pub fn from_text(text: &str) -> Self {
        if text.eq_ignore_ascii_case("start") {
            Self::Start
        } else {
            Self::Fen(text.to_string())
        }
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_text(s),
            Value::Object(map) => Self::Raw(
                map.iter()
                    .map(|(k, v)| {
                        let v = v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string());
                        (k.clone(), v)
                    })
                    .collect(),
            ),
            other => Self::Fen(other.to_string()),
        }
    }
}

impl From<Position> for PositionInput {
    fn from(position: Position) -> Self {
        Self::Position(position)
    }
}

impl From<&str> for PositionInput {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub orientation: Orientation,
    pub show_notation: bool,
    pub draggable: bool,
    pub drop_off_board: DropOffBoard,
    /// Implies `draggable`.
    pub spare_pieces: bool,
    pub piece_theme: PieceTheme,
    pub appear_speed: AnimationSpeed,
    pub move_speed: AnimationSpeed,
    pub snapback_speed: AnimationSpeed,
    pub snap_speed: AnimationSpeed,
    pub trash_speed: AnimationSpeed,
    /// Minimum interval between pointer-move updates, at least 1 ms.
    pub drag_throttle_rate: u64,
    pub position: Option<PositionInput>,
    pub show_errors: ErrorMode,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::White,
            show_notation: true,
            draggable: false,
            drop_off_board: DropOffBoard::Snapback,
            spare_pieces: false,
            piece_theme: PieceTheme::default(),
            appear_speed: AnimationSpeed::Millis(DEFAULT_APPEAR_SPEED_MS),
            move_speed: AnimationSpeed::Millis(DEFAULT_MOVE_SPEED_MS),
            snapback_speed: AnimationSpeed::Millis(DEFAULT_SNAPBACK_SPEED_MS),
            snap_speed: AnimationSpeed::Millis(DEFAULT_SNAP_SPEED_MS),
            trash_speed: AnimationSpeed::Millis(DEFAULT_TRASH_SPEED_MS),
            drag_throttle_rate: DEFAULT_DRAG_THROTTLE_RATE_MS,
            position: None,
            show_errors: ErrorMode::Silent,
        }
    }
}

impl BoardConfig {
    /// Re-apply the cross-field invariants.
    pub fn normalized(mut self) -> Self {
        if self.spare_pieces {
            self.draggable = true;
        }
        if self.drag_throttle_rate < 1 {
            self.drag_throttle_rate = DEFAULT_DRAG_THROTTLE_RATE_MS;
        }
        self
    }

    pub fn drag_throttle_interval(&self) -> Duration {
        Duration::from_millis(self.drag_throttle_rate)
    }

    /// Build a config from loosely typed JSON, e.g. a user config file.
    ///
    /// A bare `"start"`, FEN string or position object is shorthand for
    /// `{"position": ...}`.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let map = match value {
            Value::String(s) => {
                let input = PositionInput::from_text(s);
                if input.resolve().is_err() {
                    tracing::debug!(value = %s, "Ignoring unrecognised config string");
                    return defaults;
                }
                return Self {
                    position: Some(input),
                    ..defaults
                };
            }
            Value::Object(map) => {
                let input = PositionInput::from_value(value);
                if input.resolve().is_ok() {
                    return Self {
                        position: Some(input),
                        ..defaults
                    };
                }
                map
            }
            _ => {
                tracing::debug!("Config is not an object, using defaults");
                return defaults;
            }
        };

        let orientation = match map.get("orientation") {
            Some(Value::String(s)) if s == "black" => Orientation::Black,
            Some(Value::String(s)) if s == "white" => Orientation::White,
            None => defaults.orientation,
            Some(other) => fallback("orientation", other, defaults.orientation),
        };

        let show_notation = match map.get("showNotation") {
            Some(Value::Bool(b)) => *b,
            None => defaults.show_notation,
            Some(other) => fallback("showNotation", other, defaults.show_notation),
        };

        let draggable = match map.get("draggable") {
            Some(Value::Bool(b)) => *b,
            None => defaults.draggable,
            Some(other) => fallback("draggable", other, defaults.draggable),
        };

        let drop_off_board = match map.get("dropOffBoard") {
            Some(Value::String(s)) if s == "trash" => DropOffBoard::Trash,
            Some(Value::String(s)) if s == "snapback" => DropOffBoard::Snapback,
            None => defaults.drop_off_board,
            Some(other) => fallback("dropOffBoard", other, defaults.drop_off_board),
        };

        let spare_pieces = match map.get("sparePieces") {
            Some(Value::Bool(b)) => *b,
            None => defaults.spare_pieces,
            Some(other) => fallback("sparePieces", other, defaults.spare_pieces),
        };

        let piece_theme = match map.get("pieceTheme") {
            Some(Value::String(s)) => PieceTheme::Template(s.clone()),
            None => defaults.piece_theme.clone(),
            Some(other) => fallback("pieceTheme", other, defaults.piece_theme.clone()),
        };

        let speed = |key: &str, default: AnimationSpeed| match map.get(key) {
            None => default,
            Some(v) => AnimationSpeed::from_value(v).unwrap_or_else(|| fallback(key, v, default)),
        };

        let drag_throttle_rate = match map.get("dragThrottleRate") {
            None => defaults.drag_throttle_rate,
            Some(v) => v
                .as_u64()
                .filter(|rate| *rate >= 1)
                .unwrap_or_else(|| fallback("dragThrottleRate", v, defaults.drag_throttle_rate)),
        };

        let show_errors = match map.get("showErrors") {
            Some(Value::String(s)) if s == "console" => ErrorMode::Console,
            Some(Value::String(s)) if s == "alert" => ErrorMode::Alert,
            Some(Value::Bool(false)) | None => ErrorMode::Silent,
            Some(other) => fallback("showErrors", other, ErrorMode::Silent),
        };

        Self {
            orientation,
            show_notation,
            draggable,
            drop_off_board,
            spare_pieces,
            piece_theme,
            appear_speed: speed("appearSpeed", defaults.appear_speed),
            move_speed: speed("moveSpeed", defaults.move_speed),
            snapback_speed: speed("snapbackSpeed", defaults.snapback_speed),
            snap_speed: speed("snapSpeed", defaults.snap_speed),
            trash_speed: speed("trashSpeed", defaults.trash_speed),
            drag_throttle_rate,
            position: map.get("position").map(PositionInput::from_value),
            show_errors,
        }
        .normalized()
    }
}

fn fallback<T>(key: &str, value: &Value, default: T) -> T {
    tracing::debug!(key, value = %value, "Invalid config value, using default");
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.orientation, Orientation::White);
        assert!(config.show_notation);
        assert!(!config.draggable);
        assert_eq!(config.drop_off_board, DropOffBoard::Snapback);
        assert_eq!(config.appear_speed.duration(), Duration::from_millis(200));
        assert_eq!(config.snapback_speed.duration(), Duration::from_millis(60));
        assert_eq!(config.snap_speed.duration(), Duration::from_millis(30));
        assert_eq!(config.trash_speed.duration(), Duration::from_millis(100));
        assert_eq!(config.drag_throttle_rate, 20);
    }

    #[test]
    fn test_from_value_reads_known_keys() {
        let config = BoardConfig::from_value(&json!({
            "orientation": "black",
            "showNotation": false,
            "draggable": true,
            "dropOffBoard": "trash",
            "moveSpeed": "slow",
            "appearSpeed": 0,
            "dragThrottleRate": 50,
            "position": "start",
            "showErrors": "console",
        }));
        assert_eq!(config.orientation, Orientation::Black);
        assert!(!config.show_notation);
        assert!(config.draggable);
        assert_eq!(config.drop_off_board, DropOffBoard::Trash);
        assert_eq!(config.move_speed.duration(), Duration::from_millis(600));
        assert_eq!(config.appear_speed, AnimationSpeed::Millis(0));
        assert_eq!(config.drag_throttle_rate, 50);
        assert_eq!(config.position, Some(PositionInput::Start));
        assert!(matches!(config.show_errors, ErrorMode::Console));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = BoardConfig::from_value(&json!({
            "orientation": "purple",
            "draggable": "yes",
            "dropOffBoard": 3,
            "moveSpeed": -5,
            "snapSpeed": "medium",
            "trashSpeed": 1.5,
            "dragThrottleRate": 0,
            "pieceTheme": 12,
        }));
        let defaults = BoardConfig::default();
        assert_eq!(config.orientation, defaults.orientation);
        assert_eq!(config.draggable, defaults.draggable);
        assert_eq!(config.drop_off_board, defaults.drop_off_board);
        assert_eq!(config.move_speed, defaults.move_speed);
        assert_eq!(config.snap_speed, defaults.snap_speed);
        assert_eq!(config.trash_speed, defaults.trash_speed);
        assert_eq!(config.drag_throttle_rate, defaults.drag_throttle_rate);
        assert!(matches!(config.piece_theme, PieceTheme::Template(ref t) if t == DEFAULT_PIECE_THEME));
    }

    #[test]
    fn test_spare_pieces_imply_draggable() {
        let config = BoardConfig::from_value(&json!({ "sparePieces": true, "draggable": false }));
        assert!(config.spare_pieces);
        assert!(config.draggable);
    }

    #[test]
    fn test_bare_position_shorthand() {
        let config = BoardConfig::from_value(&json!("8/8/8/8/8/8/8/K7"));
        assert_eq!(
            config.position,
            Some(PositionInput::Fen("8/8/8/8/8/8/8/K7".into()))
        );

        let config = BoardConfig::from_value(&json!({ "e1": "wK", "e8": "bK" }));
        let position = config.position.unwrap().resolve().unwrap();
        assert_eq!(position.len(), 2);

        let config = BoardConfig::from_value(&json!("not a fen"));
        assert!(config.position.is_none());
    }

    #[test]
    fn test_piece_theme_template() {
        let theme = PieceTheme::Template("pieces/{piece}.svg".into());
        let piece: Piece = "bQ".parse().unwrap();
        assert_eq!(theme.image_for(piece), "pieces/bQ.svg");

        let custom = PieceTheme::Custom(Arc::new(|p: Piece| format!("custom-{}", p)));
        assert_eq!(custom.image_for(piece), "custom-bQ");
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!("black".parse::<Orientation>().unwrap(), Orientation::Black);
        assert_eq!("flip".parse::<Orientation>().unwrap_err().code(), 5482);
        assert_eq!(Orientation::White.flipped(), Orientation::Black);
    }
}

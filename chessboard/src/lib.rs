//! An interactive chessboard: position reconciliation, animation and drag
//! and drop, independent of how the board is drawn.

pub mod animate;
pub mod board;
pub mod config;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod hooks;
pub mod surface;
pub mod throttle;

pub use animate::{Animator, RenderState, Speeds};
pub use board::{Chessboard, DragOutcome};
pub use config::{
    AnimationSpeed, BoardConfig, DropOffBoard, Orientation, PieceTheme, PositionInput,
    DEFAULT_PIECE_THEME,
};
pub use drag::{resolve_drop, DragLocation, DragSource, DropAction, DropOverride};
pub use error::{BoardError, ErrorCallback, ErrorMode};
pub use geometry::{square_size_for, BoardLayout, Point};
pub use hooks::{BoardHooks, NoHooks};
pub use surface::{BoardSurface, Highlight, SlideFrom};
pub use throttle::Throttle;

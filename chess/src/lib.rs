pub mod diff;
pub mod fen;
pub mod position;
pub mod square;
pub mod types;

pub use diff::{apply, diff, DiffOp};
pub use fen::{format_fen, parse_fen, validate_fen, FenError, START_FEN};
pub use position::{validate_position, Position, PositionError};
pub use square::{parse_square, ParseSquareError, Square};
pub use types::{ParsePieceError, Piece, PieceColor, PieceKind};

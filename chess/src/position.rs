//! Square → piece mapping used as the board's canonical state.

use crate::fen::{self, FenError, START_FEN};
use crate::square::Square;
use crate::types::Piece;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occupied squares only; at most one piece per square.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Position {
    squares: BTreeMap<Square, Piece>,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard initial position.
    pub fn start() -> Self {
        fen::parse_fen(START_FEN).unwrap_or_default()
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        fen::parse_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        fen::format_fen(self)
    }

    /// Build a position from string codes, e.g. `{"e2": "wP"}`.
    pub fn from_raw<K, V, I>(raw: I) -> Result<Self, PositionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut squares = BTreeMap::new();
        for (key, value) in raw {
            let square: Square = key
                .as_ref()
                .parse()
                .map_err(|_| PositionError::InvalidSquare(key.as_ref().to_string()))?;
            let piece: Piece =
                value
                    .as_ref()
                    .parse()
                    .map_err(|_| PositionError::InvalidPiece {
                        square: key.as_ref().to_string(),
                        piece: value.as_ref().to_string(),
                    })?;
            squares.insert(square, piece);
        }
        Ok(Self { squares })
    }

    /// String-coded form of the position.
    pub fn to_raw(&self) -> BTreeMap<String, String> {
        self.squares
            .iter()
            .map(|(sq, piece)| (sq.to_string(), piece.to_string()))
            .collect()
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares.get(&square).copied()
    }

    pub fn contains(&self, square: Square) -> bool {
        self.squares.contains_key(&square)
    }

    /// Place a piece, returning whatever stood there before.
    pub fn insert(&mut self, square: Square, piece: Piece) -> Option<Piece> {
        self.squares.insert(square, piece)
    }

    pub fn remove(&mut self, square: Square) -> Option<Piece> {
        self.squares.remove(&square)
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Occupied squares in file-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares.iter().map(|(sq, piece)| (*sq, *piece))
    }

    /// Move whatever stands on `from` to `to`. Returns false when `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> bool {
        match self.squares.remove(&from) {
            Some(piece) => {
                self.squares.insert(to, piece);
                true
            }
            None => false,
        }
    }
}

impl FromIterator<(Square, Piece)> for Position {
    fn from_iter<T: IntoIterator<Item = (Square, Piece)>>(iter: T) -> Self {
        Self {
            squares: iter.into_iter().collect(),
        }
    }
}

/// True when every key is a square name and every value a piece code.
pub fn validate_position<K, V, I>(raw: I) -> bool
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Position::from_raw(raw).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Invalid square name: {0:?}")]
    InvalidSquare(String),
    #[error("Invalid piece code {piece:?} on {square}")]
    InvalidPiece { square: String, piece: String },
}

//! FEN board-field parsing and formatting.
//!
//! Only the piece-placement field is read. Side to move, castling rights and
//! move counters are ignored when present.

use crate::position::Position;
use crate::square::Square;
use crate::types::Piece;

/// Board field of the standard initial position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Parse the board field of a FEN string into a Position.
pub fn parse_fen(fen: &str) -> Result<Position, FenError> {
    let placement = fen
        .split_whitespace()
        .next()
        .ok_or(FenError::Empty)?;

    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount(ranks.len()));
    }

    let mut position = Position::new();
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_idx as u8;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip @ 1..=8) = c.to_digit(10) {
                file += skip as usize;
            } else {
                let piece = Piece::from_fen_char(c).ok_or(FenError::InvalidCharacter(c))?;
                if let Some(square) = Square::new(file as u8, rank) {
                    position.insert(square, piece);
                }
                file += 1;
            }
        }
        if file != 8 {
            return Err(FenError::WrongRankLength {
                rank: rank + 1,
                len: file,
            });
        }
    }

    Ok(position)
}

/// Format a Position as a FEN board field.
pub fn format_fen(position: &Position) -> String {
    let mut fen = String::with_capacity(START_FEN.len());
    for rank in (0..8u8).rev() {
        let mut empty = 0u8;
        for file in 0..8u8 {
            let piece = Square::new(file, rank).and_then(|sq| position.get(sq));
            match piece {
                Some(piece) => {
                    if empty > 0 {
                        fen.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    fen.push(piece.to_fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            fen.push((b'0' + empty) as char);
        }
        if rank > 0 {
            fen.push('/');
        }
    }
    fen
}

/// True when `fen` has a well-formed board field.
pub fn validate_fen(fen: &str) -> bool {
    parse_fen(fen).is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("Empty FEN string")]
    Empty,
    #[error("Expected 8 ranks, found {0}")]
    WrongRankCount(usize),
    #[error("Rank {rank} expands to {len} squares instead of 8")]
    WrongRankLength { rank: u8, len: usize },
    #[error("Invalid FEN character: {0:?}")]
    InvalidCharacter(char),
}

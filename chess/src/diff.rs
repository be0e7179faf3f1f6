//! Minimal add/clear/move transitions between two positions.
//!
//! Moves are preferred over add+clear pairs so that animated transitions slide
//! pieces instead of making them vanish and reappear.

use crate::position::Position;
use crate::square::Square;
use crate::types::Piece;
use std::collections::BTreeMap;

/// One step of a position transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiffOp {
    Clear {
        square: Square,
        piece: Piece,
    },
    Add {
        square: Square,
        piece: Piece,
    },
    Move {
        source: Square,
        destination: Square,
        piece: Piece,
    },
}

impl DiffOp {
    pub fn piece(&self) -> Piece {
        match *self {
            Self::Clear { piece, .. } | Self::Add { piece, .. } | Self::Move { piece, .. } => {
                piece
            }
        }
    }
}

/// Compute the operations that turn `current` into `target`.
///
/// Output order is moves, then adds, then clears.
pub fn diff(current: &Position, target: &Position) -> Vec<DiffOp> {
    let mut remaining_current: BTreeMap<Square, Piece> = current.iter().collect();
    let mut remaining_target: BTreeMap<Square, Piece> = BTreeMap::new();

    for (square, piece) in target.iter() {
        if remaining_current.get(&square) == Some(&piece) {
            remaining_current.remove(&square);
        } else {
            remaining_target.insert(square, piece);
        }
    }

    let mut ops = Vec::new();
    let mut move_destinations = Vec::new();

    let targets: Vec<(Square, Piece)> = remaining_target.iter().map(|(s, p)| (*s, *p)).collect();
    for (destination, piece) in targets {
        if let Some(source) = nearest_source(&remaining_current, piece, destination) {
            ops.push(DiffOp::Move {
                source,
                destination,
                piece,
            });
            remaining_current.remove(&source);
            remaining_target.remove(&destination);
            move_destinations.push(destination);
        }
    }

    for (square, piece) in remaining_target {
        ops.push(DiffOp::Add { square, piece });
    }

    // A moved piece replaces whatever stood on its destination, so that
    // square needs no separate clear.
    for (square, piece) in remaining_current {
        if !move_destinations.contains(&square) {
            ops.push(DiffOp::Clear { square, piece });
        }
    }

    ops
}

/// Nearest square in `candidates` holding `piece`, excluding `destination`
/// itself. Ties go to the earlier square in file-major order.
fn nearest_source(
    candidates: &BTreeMap<Square, Piece>,
    piece: Piece,
    destination: Square,
) -> Option<Square> {
    let mut by_distance: Vec<Square> = Square::ALL
        .iter()
        .copied()
        .filter(|sq| *sq != destination)
        .collect();
    // sort_by_key is stable, keeping file-major order within a distance
    by_distance.sort_by_key(|sq| sq.distance(destination));
    by_distance
        .into_iter()
        .find(|sq| candidates.get(sq) == Some(&piece))
}

/// Apply `ops` to `current` as one simultaneous step.
///
/// Every cleared square and move source is vacated before any add or move
/// destination is filled, so swaps and move chains land correctly.
pub fn apply(current: &Position, ops: &[DiffOp]) -> Position {
    let mut next = current.clone();
    for op in ops {
        match *op {
            DiffOp::Clear { square, .. } => {
                next.remove(square);
            }
            DiffOp::Move { source, .. } => {
                next.remove(source);
            }
            DiffOp::Add { .. } => {}
        }
    }
    for op in ops {
        match *op {
            DiffOp::Add { square, piece } => {
                next.insert(square, piece);
            }
            DiffOp::Move {
                destination, piece, ..
            } => {
                next.insert(destination, piece);
            }
            DiffOp::Clear { .. } => {}
        }
    }
    next
}

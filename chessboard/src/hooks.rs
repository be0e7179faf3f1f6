//! Host callbacks. Every hook is optional.

use crate::config::Orientation;
use crate::drag::{DragLocation, DragSource, DropOverride};
use chess::{Piece, Position, Square};

#[allow(unused_variables)]
pub trait BoardHooks: Send {
    /// Return false to refuse the drag.
    fn on_drag_start(
        &mut self,
        source: DragSource,
        piece: Piece,
        position: &Position,
        orientation: Orientation,
    ) -> bool {
        true
    }

    /// The pointer crossed into a different square (or off the board).
    fn on_drag_move(
        &mut self,
        location: DragLocation,
        previous: DragLocation,
        source: DragSource,
        piece: Piece,
        position: &Position,
        orientation: Orientation,
    ) {
    }

    /// Called before a drop is applied. `new_position` is what the board
    /// will show if the drop goes through.
    fn on_drop(
        &mut self,
        source: DragSource,
        target: DragLocation,
        piece: Piece,
        new_position: &Position,
        old_position: &Position,
        orientation: Orientation,
    ) -> Option<DropOverride> {
        None
    }

    /// The dropped piece finished snapping onto its target.
    fn on_snap_end(&mut self, source: DragSource, target: Square, piece: Piece) {}

    /// The piece finished returning to its source square.
    fn on_snapback_end(
        &mut self,
        piece: Piece,
        source: Square,
        position: &Position,
        orientation: Orientation,
    ) {
    }

    /// An animated position change finished.
    fn on_move_end(&mut self, old_position: &Position, new_position: &Position) {}

    /// The position changed. Only fired when the FEN actually differs.
    fn on_change(&mut self, old_position: &Position, new_position: &Position) {}

    fn on_mouseover_square(
        &mut self,
        square: Square,
        piece: Option<Piece>,
        position: &Position,
        orientation: Orientation,
    ) {
    }

    fn on_mouseout_square(
        &mut self,
        square: Square,
        piece: Option<Piece>,
        position: &Position,
        orientation: Orientation,
    ) {
    }
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl BoardHooks for NoHooks {}

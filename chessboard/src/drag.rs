//! Drag gesture state and hit-testing.
//!
//! ```text
//! Idle --begin--> Dragging --update--> Dragging --finish--> Idle
//! ```
//!
//! The controller only tracks the gesture. Hooks and animations are driven
//! by [`crate::Chessboard`], which owns it.

use crate::config::DropOffBoard;
use crate::geometry::Point;
use chess::{Piece, Square};
use std::collections::HashMap;

/// Where a dragged piece came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragSource {
    Square(Square),
    /// The spare-piece tray.
    Spare,
}

/// What is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragLocation {
    Square(Square),
    Offboard,
}

impl DragLocation {
    pub fn square(self) -> Option<Square> {
        match self {
            Self::Square(sq) => Some(sq),
            Self::Offboard => None,
        }
    }
}

impl std::fmt::Display for DragLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Square(sq) => write!(f, "{}", sq),
            Self::Offboard => f.write_str("offboard"),
        }
    }
}

impl std::fmt::Display for DragSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Square(sq) => write!(f, "{}", sq),
            Self::Spare => f.write_str("spare"),
        }
    }
}

/// How a drop is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropAction {
    /// Place the piece on the target square.
    Drop,
    /// Return the piece to its source square.
    Snapback,
    /// Remove the piece from the board.
    Trash,
}

/// A drop hook's veto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOverride {
    Snapback,
    Trash,
}

/// Decide what a drop does. A hook override always wins; otherwise
/// off-board drops follow the configured policy.
pub fn resolve_drop(
    location: DragLocation,
    policy: DropOffBoard,
    hook_override: Option<DropOverride>,
) -> DropAction {
    match (hook_override, location, policy) {
        (Some(DropOverride::Snapback), _, _) => DropAction::Snapback,
        (Some(DropOverride::Trash), _, _) => DropAction::Trash,
        (None, DragLocation::Offboard, DropOffBoard::Snapback) => DropAction::Snapback,
        (None, DragLocation::Offboard, DropOffBoard::Trash) => DropAction::Trash,
        (None, DragLocation::Square(_), _) => DropAction::Drop,
    }
}

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub source: DragSource,
    pub piece: Piece,
    pub pointer: Point,
    /// Last location the pointer was over.
    pub location: DragLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationChange {
    pub previous: DragLocation,
    pub current: DragLocation,
}

#[derive(Debug, Default)]
pub struct DragController {
    state: Option<DragState>,
    offsets: HashMap<Square, Point>,
    square_size: u32,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    /// Enter `Dragging`. `offsets` is the layout snapshot used for every hit
    /// test until the drag ends.
    pub fn begin(
        &mut self,
        source: DragSource,
        piece: Piece,
        pointer: Point,
        offsets: HashMap<Square, Point>,
        square_size: u32,
    ) -> DragState {
        let location = match source {
            DragSource::Square(sq) => DragLocation::Square(sq),
            DragSource::Spare => DragLocation::Offboard,
        };
        let state = DragState {
            source,
            piece,
            pointer,
            location,
        };
        self.offsets = offsets;
        self.square_size = square_size;
        self.state = Some(state);
        state
    }

    /// Square whose box contains `point`, or `Offboard`.
    pub fn hit_test(&self, point: Point) -> DragLocation {
        let size = self.square_size as i32;
        self.offsets
            .iter()
            .find(|(_, o)| point.x >= o.x && point.x < o.x + size && point.y >= o.y && point.y < o.y + size)
            .map(|(sq, _)| DragLocation::Square(*sq))
            .unwrap_or(DragLocation::Offboard)
    }

    /// Track the pointer. Returns the change when it crossed into a new location.
    pub fn update(&mut self, pointer: Point) -> Option<LocationChange> {
        let current = self.hit_test(pointer);
        let state = self.state.as_mut()?;
        state.pointer = pointer;
        if state.location == current {
            return None;
        }
        let previous = state.location;
        state.location = current;
        Some(LocationChange { previous, current })
    }

    /// Leave `Dragging`, returning the final state with the drop location.
    pub fn finish(&mut self, pointer: Point) -> Option<DragState> {
        let location = self.hit_test(pointer);
        let mut state = self.state.take()?;
        state.pointer = pointer;
        state.location = location;
        self.offsets.clear();
        Some(state)
    }
}

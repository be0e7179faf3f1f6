//! The rendering seam between the board logic and whatever draws it.

use crate::geometry::{BoardLayout, Point};
use async_trait::async_trait;
use chess::{Piece, Position, Square};
use std::time::Duration;

/// Square highlight classes used while dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    /// The square a drag started from.
    Source,
    /// The square currently under the pointer.
    Hover,
}

/// Where a sliding piece starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideFrom {
    /// Piece leaves this board square as the slide begins.
    Square(Square),
    /// Piece comes out of the spare tray.
    Spare,
}

/// A board renderer.
///
/// Draw calls are synchronous. Animation calls resolve when the animation
/// has finished; the board may run several at once and waits for all of
/// them, so implementations take `&self` and use interior mutability.
#[async_trait]
pub trait BoardSurface: Send + Sync {
    /// Width available to the board, in surface units.
    fn container_width(&self) -> u32;

    /// Top-left corner of `square` as currently laid out.
    fn square_offset(&self, square: Square) -> Point;

    /// Rebuild the empty board: squares, notation and spare trays.
    fn draw_board(&self, layout: &BoardLayout);

    /// Replace every piece visual with exactly `position`.
    fn draw_position(&self, position: &Position);

    fn set_highlight(&self, square: Square, highlight: Highlight, on: bool);

    fn clear_highlights(&self);

    /// Hide the piece on `square` without removing it from the board.
    fn hide_piece(&self, square: Square);

    /// Show the dragged piece with its top-left corner at `at`.
    fn show_dragged(&self, piece: Piece, at: Point);

    fn move_dragged(&self, at: Point);

    fn hide_dragged(&self);

    /// Insert `piece` on `square` invisibly, then fade it in.
    async fn fade_in(&self, square: Square, piece: Piece, duration: Duration);

    /// Fade out and remove the piece visual on `square`.
    async fn fade_out(&self, square: Square, duration: Duration);

    /// Slide a transient copy of `piece` to `to`, then show it there.
    async fn slide(&self, from: SlideFrom, to: Square, piece: Piece, duration: Duration);

    /// Animate the dragged piece's top-left corner to `to`.
    async fn slide_dragged(&self, to: Point, duration: Duration);

    /// Fade the dragged piece out.
    async fn fade_dragged(&self, duration: Duration);

    /// Detach from the host and release everything drawn.
    fn destroy(&self);
}

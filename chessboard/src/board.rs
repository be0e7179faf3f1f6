use crate::animate::{Animator, RenderState, Speeds};
use crate::config::{BoardConfig, Orientation, PositionInput};
use crate::drag::{resolve_drop, DragController, DragLocation, DragSource, DropAction};
use crate::error::{BoardError, ErrorReporter};
use crate::geometry::{square_size_for, BoardLayout, Point};
use crate::hooks::{BoardHooks, NoHooks};
use crate::surface::{BoardSurface, Highlight};
use crate::throttle::Throttle;
use chess::{diff, parse_square, Piece, Position, Square};
use std::collections::HashMap;

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Nothing to do: not draggable, empty square, no drag in progress.
    Ignored,
    /// `on_drag_start` said no.
    Refused,
    Started,
    Moved,
    Dropped(DropAction),
}

/// An interactive chessboard drawn on a [`BoardSurface`].
///
/// Reconciliation calls take `&mut self`, so a second `set_position` cannot
/// start while an animated one is still awaiting its animations.
pub struct Chessboard<S: BoardSurface> {
    surface: S,
    config: BoardConfig,
    hooks: Box<dyn BoardHooks>,
    reporter: ErrorReporter,
    position: Position,
    orientation: Orientation,
    square_size: u32,
    speeds: Speeds,
    animator: Animator,
    drag: DragController,
}

impl<S: BoardSurface> Chessboard<S> {
    pub fn new(surface: S, config: BoardConfig) -> Self {
        Self::with_hooks(surface, config, NoHooks)
    }

    pub fn with_hooks(surface: S, config: BoardConfig, hooks: impl BoardHooks + 'static) -> Self {
        let config = config.normalized();
        let mut reporter = ErrorReporter::new(config.show_errors.clone());

        let position = match config.position.as_ref().map(PositionInput::resolve) {
            None => Position::new(),
            Some(Ok(position)) => position,
            Some(Err(err)) => {
                reporter.report(&BoardError::InvalidConfigPosition(Box::new(err)));
                Position::new()
            }
        };

        let mut board = Self {
            surface,
            orientation: config.orientation,
            speeds: Speeds::from(&config),
            config,
            hooks: Box::new(hooks),
            reporter,
            position,
            square_size: 0,
            animator: Animator::new(),
            drag: DragController::new(),
        };
        board.resize();

        tracing::info!(
            orientation = %board.orientation,
            square_size = board.square_size,
            pieces = board.position.len(),
            "Chessboard created"
        );
        board
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.to_fen()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn square_size(&self) -> u32 {
        self.square_size
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn layout(&self) -> BoardLayout {
        BoardLayout {
            orientation: self.orientation,
            show_notation: self.config.show_notation,
            spare_pieces: self.config.spare_pieces,
            square_size: self.square_size,
        }
    }

    pub fn piece_image(&self, piece: Piece) -> String {
        self.config.piece_theme.image_for(piece)
    }

    /// Messages queued in alert mode since the last call.
    pub fn take_alerts(&mut self) -> Vec<String> {
        self.reporter.take_alerts()
    }

    pub fn render_state(&self) -> RenderState {
        self.animator.state()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// A throttle for pointer moves at the configured rate.
    pub fn drag_throttle(&self) -> Throttle<Point> {
        Throttle::new(self.config.drag_throttle_interval())
    }

    /// Show `input`, animating the difference from the current position.
    ///
    /// Invalid input is reported and leaves the board untouched. An animated
    /// call returns once every animation has finished and `on_move_end` has
    /// fired; it does not fire when nothing changed.
    pub async fn set_position(
        &mut self,
        input: impl Into<PositionInput>,
        animated: bool,
    ) -> Result<(), BoardError> {
        let target = match input.into().resolve() {
            Ok(position) => position,
            Err(err) => {
                self.reporter.report(&err);
                return Err(err);
            }
        };

        if !animated {
            self.commit(target);
            self.surface.draw_position(&self.position);
            return Ok(());
        }

        let ops = diff(&self.position, &target);
        let old = self.commit(target);
        if ops.is_empty() {
            return Ok(());
        }

        self.animator
            .play(&self.surface, &ops, &self.speeds, self.config.spare_pieces)
            .await;
        self.surface.draw_position(&self.position);
        self.hooks.on_move_end(&old, &self.position);
        Ok(())
    }

    /// `"start"` (any case) or a FEN string.
    pub async fn set_position_str(&mut self, text: &str, animated: bool) -> Result<(), BoardError> {
        self.set_position(PositionInput::from_text(text), animated)
            .await
    }

    pub async fn start(&mut self, animated: bool) {
        // The start position always resolves
        let _ = self.set_position(PositionInput::Start, animated).await;
    }

    pub async fn clear(&mut self, animated: bool) {
        let _ = self.set_position(Position::new(), animated).await;
    }

    /// Apply `"e2-e4"` style moves in order and return the new position.
    ///
    /// All moves are parsed before anything happens; one malformed move is
    /// reported and the call does nothing. A move from an empty square is
    /// skipped.
    pub async fn move_pieces(
        &mut self,
        moves: &[&str],
        animated: bool,
    ) -> Result<Position, BoardError> {
        let mut pairs = Vec::with_capacity(moves.len());
        for text in moves {
            match parse_move(text) {
                Some(pair) => pairs.push(pair),
                None => {
                    let err = BoardError::argument("move", *text);
                    self.reporter.report(&err);
                    return Err(err);
                }
            }
        }

        let mut next = self.position.clone();
        for (from, to) in pairs {
            if !next.relocate(from, to) {
                tracing::debug!(%from, %to, "No piece to move");
            }
        }
        self.set_position(next.clone(), animated).await?;
        Ok(next)
    }

    /// Set the orientation and rebuild the board.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
        self.redraw();
    }

    /// `"white"`, `"black"` or `"flip"`.
    pub fn orient(&mut self, value: &str) -> Result<Orientation, BoardError> {
        let orientation = match value {
            "flip" => self.orientation.flipped(),
            other => match other.parse() {
                Ok(orientation) => orientation,
                Err(err) => {
                    self.reporter.report(&err);
                    return Err(err);
                }
            },
        };
        self.set_orientation(orientation);
        Ok(orientation)
    }

    pub fn flip(&mut self) -> Orientation {
        self.set_orientation(self.orientation.flipped());
        self.orientation
    }

    /// Recompute the square size from the container and rebuild the board.
    pub fn resize(&mut self) {
        self.square_size = square_size_for(self.surface.container_width());
        self.redraw();
    }

    /// Tear the board down and hand the surface back.
    pub fn destroy(self) -> S {
        self.surface.destroy();
        tracing::info!("Chessboard destroyed");
        self.surface
    }

    fn redraw(&mut self) {
        self.surface.draw_board(&self.layout());
        self.surface.draw_position(&self.position);
    }

    /// Replace the position, returning the old one. `on_change` fires only
    /// when the FEN differs.
    fn commit(&mut self, next: Position) -> Position {
        let old = std::mem::replace(&mut self.position, next);
        if old.to_fen() != self.position.to_fen() {
            self.hooks.on_change(&old, &self.position);
        }
        old
    }

    // Pointer input. Points are in surface coordinates.

    pub fn pointer_down_square(&mut self, square: Square, point: Point) -> DragOutcome {
        if !self.config.draggable || self.drag.is_dragging() {
            return DragOutcome::Ignored;
        }
        match self.position.get(square) {
            Some(piece) => self.begin_drag(DragSource::Square(square), piece, point),
            None => DragOutcome::Ignored,
        }
    }

    pub fn pointer_down_spare(&mut self, piece: Piece, point: Point) -> DragOutcome {
        if !self.config.spare_pieces || self.drag.is_dragging() {
            return DragOutcome::Ignored;
        }
        self.begin_drag(DragSource::Spare, piece, point)
    }

    fn begin_drag(&mut self, source: DragSource, piece: Piece, point: Point) -> DragOutcome {
        if !self
            .hooks
            .on_drag_start(source, piece, &self.position, self.orientation)
        {
            tracing::debug!(%source, %piece, "Drag refused");
            return DragOutcome::Refused;
        }

        let offsets: HashMap<Square, Point> = Square::ALL
            .iter()
            .map(|sq| (*sq, self.surface.square_offset(*sq)))
            .collect();
        self.drag
            .begin(source, piece, point, offsets, self.square_size);

        self.surface.show_dragged(piece, self.centered(point));
        if let DragSource::Square(square) = source {
            self.surface
                .set_highlight(square, Highlight::Source, true);
            self.surface.hide_piece(square);
        }
        tracing::debug!(%source, %piece, "Drag started");
        DragOutcome::Started
    }

    pub fn pointer_move(&mut self, point: Point) -> DragOutcome {
        let Some(state) = self.drag.state().copied() else {
            return DragOutcome::Ignored;
        };
        self.surface.move_dragged(self.centered(point));

        if let Some(change) = self.drag.update(point) {
            if let DragLocation::Square(sq) = change.previous {
                self.surface.set_highlight(sq, Highlight::Hover, false);
            }
            if let DragLocation::Square(sq) = change.current {
                self.surface.set_highlight(sq, Highlight::Hover, true);
            }
            self.hooks.on_drag_move(
                change.current,
                change.previous,
                state.source,
                state.piece,
                &self.position,
                self.orientation,
            );
        }
        DragOutcome::Moved
    }

    /// End the drag at `point` and resolve the drop. Returns once the
    /// resulting animation has finished.
    pub async fn pointer_up(&mut self, point: Point) -> DragOutcome {
        let Some(state) = self.drag.finish(point) else {
            return DragOutcome::Ignored;
        };

        let proposed = self.proposed_position(state.source, state.location, state.piece);
        let hook_override = self.hooks.on_drop(
            state.source,
            state.location,
            state.piece,
            &proposed,
            &self.position,
            self.orientation,
        );

        let action = match (
            resolve_drop(state.location, self.config.drop_off_board, hook_override),
            state.source,
        ) {
            // A spare piece has nowhere to snap back to
            (DropAction::Snapback, DragSource::Spare) => DropAction::Trash,
            (action, _) => action,
        };
        tracing::debug!(
            source = %state.source,
            target = %state.location,
            piece = %state.piece,
            ?action,
            "Piece dropped"
        );

        self.surface.clear_highlights();
        match (action, state.source, state.location) {
            (DropAction::Snapback, DragSource::Square(source), _) => {
                let to = self.surface.square_offset(source);
                self.surface
                    .slide_dragged(to, self.speeds.snapback)
                    .await;
                self.surface.draw_position(&self.position);
                self.surface.hide_dragged();
                self.hooks
                    .on_snapback_end(state.piece, source, &self.position, self.orientation);
            }
            (DropAction::Drop, source, DragLocation::Square(target)) => {
                let mut next = self.position.clone();
                if let DragSource::Square(from) = source {
                    next.remove(from);
                }
                next.insert(target, state.piece);
                self.commit(next);

                let to = self.surface.square_offset(target);
                self.surface.slide_dragged(to, self.speeds.snap).await;
                self.surface.draw_position(&self.position);
                self.surface.hide_dragged();
                self.hooks.on_snap_end(source, target, state.piece);
            }
            // Trash, plus the combinations resolve_drop never produces
            (_, source, _) => {
                self.trash(source).await;
                return DragOutcome::Dropped(DropAction::Trash);
            }
        }
        DragOutcome::Dropped(action)
    }

    async fn trash(&mut self, source: DragSource) {
        let mut next = self.position.clone();
        if let DragSource::Square(from) = source {
            next.remove(from);
        }
        self.commit(next);
        self.surface.draw_position(&self.position);
        self.surface.fade_dragged(self.speeds.trash).await;
        self.surface.hide_dragged();
    }

    /// The position a drop would produce, as shown to `on_drop`.
    fn proposed_position(&self, source: DragSource, target: DragLocation, piece: Piece) -> Position {
        let mut next = self.position.clone();
        if let DragSource::Square(from) = source {
            next.remove(from);
        }
        if let DragLocation::Square(to) = target {
            next.insert(to, piece);
        }
        next
    }

    pub fn pointer_enter_square(&mut self, square: Square) {
        if self.drag.is_dragging() {
            return;
        }
        self.hooks.on_mouseover_square(
            square,
            self.position.get(square),
            &self.position,
            self.orientation,
        );
    }

    pub fn pointer_leave_square(&mut self, square: Square) {
        if self.drag.is_dragging() {
            return;
        }
        self.hooks.on_mouseout_square(
            square,
            self.position.get(square),
            &self.position,
            self.orientation,
        );
    }

    /// Top-left corner that centres the dragged piece on `point`.
    fn centered(&self, point: Point) -> Point {
        let half = (self.square_size / 2) as i32;
        point.offset(-half, -half)
    }
}

fn parse_move(text: &str) -> Option<(Square, Square)> {
    let (from, to) = text.split_once('-')?;
    Some((parse_square(from)?, parse_square(to)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(
            parse_move("e2-e4"),
            Some((parse_square("e2").unwrap(), parse_square("e4").unwrap()))
        );
        assert_eq!(parse_move("e2e4"), None);
        assert_eq!(parse_move("e9-e4"), None);
        assert_eq!(parse_move("e2-"), None);
        assert_eq!(parse_move("e2-e4-e5"), None);
    }
}

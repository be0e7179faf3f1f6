//! Board hooks that put the rules of chess behind the board's drag and drop.
//!
//! Hooks run inside the board actor, so the only command they enqueue is the
//! delayed opponent move, sent from its own task.

use crate::actor::BoardCommand;
use crate::game::{lock, Mode, SharedGame};
use chess::{Piece, Position, Square};
use chessboard::{BoardHooks, DragLocation, DragSource, DropOverride, Orientation};
use std::time::Duration;
use tokio::sync::mpsc;

/// Pause before the opponent answers, so the human's move is seen first.
pub const OPPONENT_DELAY: Duration = Duration::from_millis(250);

pub struct GameHooks {
    game: SharedGame,
    cmd_tx: mpsc::Sender<BoardCommand>,
    opponent_delay: Duration,
    opponent_due: bool,
}

impl GameHooks {
    pub fn new(game: SharedGame, cmd_tx: mpsc::Sender<BoardCommand>) -> Self {
        Self {
            game,
            cmd_tx,
            opponent_delay: OPPONENT_DELAY,
            opponent_due: false,
        }
    }

    pub fn with_opponent_delay(mut self, delay: Duration) -> Self {
        self.opponent_delay = delay;
        self
    }
}

impl BoardHooks for GameHooks {
    fn on_drag_start(
        &mut self,
        source: DragSource,
        piece: Piece,
        _position: &Position,
        _orientation: Orientation,
    ) -> bool {
        let game = lock(&self.game);
        match source {
            DragSource::Spare => game.mode() == Mode::Setup,
            DragSource::Square(_) => game.can_drag(piece.color),
        }
    }

    fn on_drop(
        &mut self,
        source: DragSource,
        target: DragLocation,
        _piece: Piece,
        _new_position: &Position,
        _old_position: &Position,
        _orientation: Orientation,
    ) -> Option<DropOverride> {
        let mut game = lock(&self.game);
        if game.mode() == Mode::Setup {
            return None;
        }

        let (DragSource::Square(from), DragLocation::Square(to)) = (source, target) else {
            return Some(DropOverride::Snapback);
        };
        match game.play_drop(from, to) {
            Ok(mv) => {
                tracing::info!(mv = %mv, "Human move");
                game.set_notice(None);
                self.opponent_due = game.opponent_to_move();
                None
            }
            Err(err) => {
                tracing::debug!(error = %err, %from, %to, "Drop rejected");
                game.set_notice(Some(err.to_string()));
                Some(DropOverride::Snapback)
            }
        }
    }

    fn on_snap_end(&mut self, _source: DragSource, _target: Square, _piece: Piece) {
        if lock(&self.game).mode() == Mode::Setup {
            return;
        }
        if std::mem::take(&mut self.opponent_due) {
            let cmd_tx = self.cmd_tx.clone();
            let delay = self.opponent_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = cmd_tx.send(BoardCommand::OpponentMove).await;
            });
        }
    }

    fn on_change(&mut self, old_position: &Position, new_position: &Position) {
        tracing::debug!(old = %old_position.to_fen(), new = %new_position.to_fen(), "Board changed");
    }

    fn on_mouseover_square(
        &mut self,
        square: Square,
        piece: Option<Piece>,
        _position: &Position,
        _orientation: Orientation,
    ) {
        let text = match piece {
            Some(piece) => format!("{square}: {piece}"),
            None => square.to_string(),
        };
        lock(&self.game).set_hover(Some(text));
    }

    fn on_mouseout_square(
        &mut self,
        _square: Square,
        _piece: Option<Piece>,
        _position: &Position,
        _orientation: Orientation,
    ) {
        lock(&self.game).set_hover(None);
    }
}

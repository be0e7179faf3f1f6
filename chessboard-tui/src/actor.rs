//! The board actor: owns the [`Chessboard`] and processes input one command
//! at a time, so an animation always finishes before the next gesture starts.

use crate::game::{lock, Mode, SharedGame};
use crate::hooks::GameHooks;
use crate::surface::{lock_scene, SharedScene, TuiSurface};
use chess::Square;
use chessboard::{BoardConfig, Chessboard, Orientation, Point};
use cozy_chess::Color;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

#[derive(Debug)]
pub enum BoardCommand {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// Pointer moved with no button held.
    PointerHover(Point),
    /// The viewport changed size.
    Resize,
    Flip,
    Restart,
    Undo,
    /// Empty the board and enter setup mode.
    Clear,
    /// Start position in setup mode.
    SetupStart,
    /// Leave setup mode and play on from the board as it stands.
    PlayFromHere,
    OpponentMove,
    GetSnapshot {
        reply: oneshot::Sender<BoardSnapshot>,
    },
    Shutdown,
}

/// The board as the actor sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub fen: String,
    pub orientation: Orientation,
    pub square_size: u32,
    pub dragging: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("Board actor is not running")]
    Closed,
}

/// Cheap, cloneable handle to the board actor.
#[derive(Clone)]
pub struct BoardHandle {
    cmd_tx: mpsc::Sender<BoardCommand>,
}

impl BoardHandle {
    pub async fn send(&self, cmd: BoardCommand) -> Result<(), ActorError> {
        self.cmd_tx.send(cmd).await.map_err(|_| ActorError::Closed)
    }

    pub async fn snapshot(&self) -> Result<BoardSnapshot, ActorError> {
        let (tx, rx) = oneshot::channel();
        self.send(BoardCommand::GetSnapshot { reply: tx }).await?;
        rx.await.map_err(|_| ActorError::Closed)
    }

    pub async fn shutdown(&self) {
        let _ = self.send(BoardCommand::Shutdown).await;
    }
}

struct BoardActor {
    board: Chessboard<TuiSurface>,
    scene: SharedScene,
    game: SharedGame,
    hovered: Option<Square>,
    opponent_delay: Duration,
}

/// Build the board on `scene` and start its actor.
pub fn spawn_board_actor(
    scene: SharedScene,
    config: BoardConfig,
    game: SharedGame,
    opponent_delay: Duration,
) -> (BoardHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel(32);
    let hooks = GameHooks::new(game.clone(), cmd_tx.clone()).with_opponent_delay(opponent_delay);
    let board = Chessboard::with_hooks(TuiSurface::new(scene.clone()), config, hooks);

    let actor = BoardActor {
        board,
        scene,
        game,
        hovered: None,
        opponent_delay,
    };
    let task = tokio::spawn(
        run_board_actor(actor, cmd_rx).instrument(tracing::info_span!("board")),
    );
    (BoardHandle { cmd_tx }, task)
}

async fn run_board_actor(mut actor: BoardActor, mut cmd_rx: mpsc::Receiver<BoardCommand>) {
    tracing::info!("Board actor started");

    // The opponent may have the first move
    actor.maybe_opponent().await;

    while let Some(cmd) = cmd_rx.recv().await {
        if matches!(cmd, BoardCommand::Shutdown) {
            break;
        }
        actor.handle_command(cmd).await;
        actor.publish_alerts();
    }

    tracing::info!("Board actor exited");
}

impl BoardActor {
    async fn handle_command(&mut self, cmd: BoardCommand) {
        match cmd {
            BoardCommand::PointerDown(p) => {
                let (spare, square) = {
                    let scene = lock_scene(&self.scene);
                    (scene.spare_at(p), scene.square_at(p))
                };
                let outcome = match (spare, square) {
                    (Some(piece), _) => self.board.pointer_down_spare(piece, p),
                    (None, Some(square)) => self.board.pointer_down_square(square, p),
                    (None, None) => return,
                };
                tracing::trace!(?outcome, "Pointer down");
            }
            BoardCommand::PointerMove(p) => {
                self.board.pointer_move(p);
            }
            BoardCommand::PointerUp(p) => {
                let outcome = self.board.pointer_up(p).await;
                tracing::trace!(?outcome, "Pointer up");
                // Castling, en passant and promotion move more than the dragged piece
                self.sync().await;
            }
            BoardCommand::PointerHover(p) => self.hover(p),
            BoardCommand::Resize => self.board.resize(),
            BoardCommand::Flip => {
                self.board.flip();
            }
            BoardCommand::Restart => {
                lock(&self.game).restart();
                self.board.start(true).await;
                self.maybe_opponent().await;
            }
            BoardCommand::Undo => {
                let undone = {
                    let mut game = lock(&self.game);
                    if game.mode() == Mode::Setup {
                        0
                    } else {
                        game.undo(2)
                    }
                };
                if undone > 0 {
                    self.sync().await;
                    self.maybe_opponent().await;
                }
            }
            BoardCommand::Clear => {
                lock(&self.game).set_mode(Mode::Setup);
                self.board.clear(true).await;
            }
            BoardCommand::SetupStart => {
                lock(&self.game).set_mode(Mode::Setup);
                self.board.start(true).await;
            }
            BoardCommand::PlayFromHere => self.play_from_here().await,
            BoardCommand::OpponentMove => self.opponent_move().await,
            BoardCommand::GetSnapshot { reply } => {
                let _ = reply.send(BoardSnapshot {
                    fen: self.board.fen(),
                    orientation: self.board.orientation(),
                    square_size: self.board.square_size(),
                    dragging: self.board.is_dragging(),
                });
            }
            BoardCommand::Shutdown => {}
        }
    }

    fn hover(&mut self, p: Point) {
        if self.board.is_dragging() {
            return;
        }
        let square = lock_scene(&self.scene).square_at(p);
        if square == self.hovered {
            return;
        }
        if let Some(old) = self.hovered {
            self.board.pointer_leave_square(old);
        }
        if let Some(new) = square {
            self.board.pointer_enter_square(new);
        }
        self.hovered = square;
    }

    /// Animate the board to the game's position. Play mode only.
    async fn sync(&mut self) {
        let fen = {
            let game = lock(&self.game);
            if game.mode() == Mode::Setup {
                return;
            }
            game.fen()
        };
        if let Err(err) = self.board.set_position_str(&fen, true).await {
            tracing::error!(error = %err, "Failed to show game position");
        }
    }

    async fn opponent_move(&mut self) {
        let played = lock(&self.game).play_random();
        if let Some(mv) = played {
            tracing::info!(mv = %mv, "Opponent move");
            self.sync().await;
        }
    }

    async fn maybe_opponent(&mut self) {
        if lock(&self.game).opponent_to_move() {
            tokio::time::sleep(self.opponent_delay).await;
            self.opponent_move().await;
        }
    }

    async fn play_from_here(&mut self) {
        let result = {
            let mut game = lock(&self.game);
            let side = match game.human() {
                Color::White => 'w',
                Color::Black => 'b',
            };
            let fen = format!("{} {} - - 0 1", self.board.fen(), side);
            game.load_fen(&fen)
        };
        match result {
            Ok(()) => {
                lock(&self.game).set_notice(None);
                self.sync().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Cannot play from this position");
                lock(&self.game).set_notice(Some(err.to_string()));
            }
        }
    }

    /// Move the board's queued error alerts to the status line.
    fn publish_alerts(&mut self) {
        let alerts = self.board.take_alerts();
        if !alerts.is_empty() {
            lock(&self.game).set_notice(Some(alerts.join("; ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::scene::{Scene, Viewport};
    use chessboard::PositionInput;
    use std::sync::{Arc, Mutex};

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    /// Square size 6 with the board at the top-left of the terminal.
    fn spawn_test_actor(human: Color) -> (BoardHandle, SharedGame, SharedScene) {
        spawn_actor_at(human, None, Duration::from_millis(250))
    }

    fn spawn_actor_at(
        human: Color,
        fen: Option<&str>,
        opponent_delay: Duration,
    ) -> (BoardHandle, SharedGame, SharedScene) {
        let scene = Arc::new(Mutex::new(Scene::new(Viewport {
            left: 0,
            top: 0,
            square_size: 6,
        })));
        let mut game = Game::with_seed(human, 3);
        let position = match fen {
            Some(fen) => {
                game.load_fen(fen).unwrap();
                PositionInput::Fen(fen.to_string())
            }
            None => PositionInput::Start,
        };
        let game = Arc::new(Mutex::new(game));
        let config = BoardConfig {
            draggable: true,
            position: Some(position),
            ..BoardConfig::default()
        };
        let (handle, _task) = spawn_board_actor(scene.clone(), config, game.clone(), opponent_delay);
        (handle, game, scene)
    }

    /// Centre of `name` with white at the bottom.
    fn centre(name: &str) -> Point {
        let square: Square = name.parse().unwrap();
        let col = square.file() as i32;
        let row = 7 - square.rank() as i32;
        Point::new(col * 6 + 3, row * 6 + 3)
    }

    fn placement(game: &SharedGame) -> String {
        lock(game).fen().split_whitespace().next().unwrap().to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_plays_move_and_opponent_answers() {
        let (handle, game, _scene) = spawn_test_actor(Color::White);
        handle.send(BoardCommand::PointerDown(centre("e2"))).await.unwrap();
        handle.send(BoardCommand::PointerMove(centre("e3"))).await.unwrap();
        handle.send(BoardCommand::PointerUp(centre("e4"))).await.unwrap();

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.fen, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
        assert!(!snap.dragging);

        tokio::time::sleep(Duration::from_secs(2)).await;
        let snap = handle.snapshot().await.unwrap();
        assert!(lock(&game).is_human_turn());
        assert_eq!(snap.fen, placement(&game));
        assert_ne!(snap.fen, "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR");
    }

    #[tokio::test(start_paused = true)]
    async fn test_castling_moves_the_rook_with_a_busy_queue() {
        let (handle, game, _scene) = spawn_actor_at(
            Color::White,
            Some("4k3/8/8/8/8/8/8/4K2R w K - 0 1"),
            Duration::from_secs(60),
        );
        handle.send(BoardCommand::PointerDown(centre("e1"))).await.unwrap();
        handle.send(BoardCommand::PointerUp(centre("g1"))).await.unwrap();
        // Keep the command queue full while the drop is handled
        for _ in 0..40 {
            handle.send(BoardCommand::PointerHover(Point::new(-5, -5))).await.unwrap();
        }

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.fen, "4k3/8/8/8/8/8/8/5RK1");
        assert_eq!(snap.fen, placement(&game));
    }

    #[tokio::test(start_paused = true)]
    async fn test_illegal_drag_snaps_back() {
        let (handle, game, scene) = spawn_test_actor(Color::White);
        handle.send(BoardCommand::PointerDown(centre("e2"))).await.unwrap();
        handle.send(BoardCommand::PointerUp(centre("e5"))).await.unwrap();

        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.fen, START);
        assert!(lock(&game).notice().unwrap().contains("Illegal move"));
        assert!(lock_scene(&scene).dragged.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_opponent_moves_first_when_human_is_black() {
        let (handle, game, _scene) = spawn_test_actor(Color::Black);
        let snap = handle.snapshot().await.unwrap();
        assert_ne!(snap.fen, START);
        assert!(lock(&game).is_human_turn());
    }

    #[tokio::test(start_paused = true)]
    async fn test_setup_and_play_from_here() {
        let (handle, game, _scene) = spawn_test_actor(Color::White);
        handle.send(BoardCommand::Clear).await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().fen, "8/8/8/8/8/8/8/8");
        assert_eq!(lock(&game).mode(), Mode::Setup);

        // No kings on the board
        handle.send(BoardCommand::PlayFromHere).await.unwrap();
        handle.snapshot().await.unwrap();
        assert!(lock(&game).notice().unwrap().contains("Invalid FEN"));

        handle.send(BoardCommand::SetupStart).await.unwrap();
        // Any piece may move in setup mode
        handle.send(BoardCommand::PointerDown(centre("d8"))).await.unwrap();
        handle.send(BoardCommand::PointerUp(centre("d4"))).await.unwrap();
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(snap.fen, "rnb1kbnr/pppppppp/8/8/3q4/8/PPPPPPPP/RNBQKBNR");

        handle.send(BoardCommand::PlayFromHere).await.unwrap();
        handle.snapshot().await.unwrap();
        assert_eq!(lock(&game).mode(), Mode::Play);
        assert_eq!(placement(&game), snap.fen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_and_flip() {
        let (handle, game, _scene) = spawn_test_actor(Color::White);
        handle.send(BoardCommand::PointerHover(centre("g1"))).await.unwrap();
        handle.snapshot().await.unwrap();
        assert_eq!(lock(&game).hover(), Some("g1: wN"));

        handle.send(BoardCommand::PointerHover(Point::new(-5, -5))).await.unwrap();
        handle.send(BoardCommand::Flip).await.unwrap();
        let snap = handle.snapshot().await.unwrap();
        assert_eq!(lock(&game).hover(), None);
        assert_eq!(snap.orientation, Orientation::Black);
        assert_eq!(snap.square_size, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_and_undo() {
        let (handle, game, _scene) = spawn_test_actor(Color::White);
        handle.send(BoardCommand::PointerDown(centre("d2"))).await.unwrap();
        handle.send(BoardCommand::PointerUp(centre("d4"))).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        handle.send(BoardCommand::Undo).await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().fen, START);
        assert_eq!(placement(&game), START);

        handle.send(BoardCommand::Clear).await.unwrap();
        handle.send(BoardCommand::Restart).await.unwrap();
        assert_eq!(handle.snapshot().await.unwrap().fen, START);
        assert_eq!(lock(&game).mode(), Mode::Play);
    }

    #[tokio::test]
    async fn test_shutdown() {
        let (handle, _game, _scene) = spawn_test_actor(Color::White);
        handle.shutdown().await;
        assert!(handle.snapshot().await.is_err());
    }
}

//! Rules-side game state for the host, random opponent included. The board
//! itself knows nothing about chess rules.

use chess::PieceColor;
use cozy_chess::{Board, Color, File, GameStatus, Move, Piece, Rank, Square};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Game is over")]
    GameOver,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Human against the random opponent, rules enforced.
    Play,
    /// Free editing: any piece may be dragged anywhere.
    Setup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    HumanWon,
    OpponentWon,
    Draw,
}

pub type SharedGame = Arc<Mutex<Game>>;

/// Lock a shared game, recovering from a poisoned lock.
pub fn lock(game: &SharedGame) -> MutexGuard<'_, Game> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Game {
    position: Board,
    history: Vec<Board>,
    human: Color,
    mode: Mode,
    rng: StdRng,
    hover: Option<String>,
    notice: Option<String>,
}

impl Game {
    pub fn new(human: Color) -> Self {
        Self::with_rng(human, StdRng::from_os_rng())
    }

    /// Deterministic opponent, for tests and reproducible sessions.
    pub fn with_seed(human: Color, seed: u64) -> Self {
        Self::with_rng(human, StdRng::seed_from_u64(seed))
    }

    fn with_rng(human: Color, rng: StdRng) -> Self {
        Self {
            position: Board::default(),
            history: Vec::new(),
            human,
            mode: Mode::Play,
            rng,
            hover: None,
            notice: None,
        }
    }

    /// Continue from an arbitrary position.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), GameError> {
        let board = fen
            .parse::<Board>()
            .map_err(|_| GameError::InvalidFen(fen.to_string()))?;
        self.position = board;
        self.history.clear();
        self.mode = Mode::Play;
        Ok(())
    }

    pub fn position(&self) -> &Board {
        &self.position
    }

    pub fn fen(&self) -> String {
        self.position.to_string()
    }

    pub fn human(&self) -> Color {
        self.human
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.position.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    pub fn outcome(&self) -> Outcome {
        match self.position.status() {
            GameStatus::Ongoing => Outcome::Ongoing,
            GameStatus::Drawn => Outcome::Draw,
            // The side to move has been mated
            GameStatus::Won if self.position.side_to_move() == self.human => Outcome::OpponentWon,
            GameStatus::Won => Outcome::HumanWon,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome() != Outcome::Ongoing
    }

    pub fn is_human_turn(&self) -> bool {
        self.position.side_to_move() == self.human
    }

    /// Whether a piece of `color` may be picked up.
    pub fn can_drag(&self, color: PieceColor) -> bool {
        match self.mode {
            Mode::Setup => true,
            Mode::Play => !self.is_over() && self.is_human_turn() && to_cozy_color(color) == self.human,
        }
    }

    /// Play the human's drag from `from` to `to`. Pawns reaching the last
    /// rank always become queens.
    pub fn play_drop(&mut self, from: chess::Square, to: chess::Square) -> Result<Move, GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        if !self.is_human_turn() {
            return Err(GameError::NotYourTurn);
        }

        let from = to_cozy_square(from);
        let to = to_cozy_square(to);
        let last_rank = match self.human {
            Color::White => Rank::Eighth,
            Color::Black => Rank::First,
        };
        let promotion = (self.position.piece_on(from) == Some(Piece::Pawn) && to.rank() == last_rank)
            .then_some(Piece::Queen);

        let legal = self.legal_moves();
        let mv = king_takes_rook(
            Move {
                from,
                to,
                promotion,
            },
            &legal,
        );
        if !legal.contains(&mv) {
            return Err(GameError::IllegalMove(format!("{}{}", from, to)));
        }

        self.play(mv);
        Ok(mv)
    }

    pub fn opponent_to_move(&self) -> bool {
        self.mode == Mode::Play && !self.is_over() && !self.is_human_turn()
    }

    /// Play a uniformly random legal move for the opponent.
    pub fn play_random(&mut self) -> Option<Move> {
        if !self.opponent_to_move() {
            return None;
        }
        let legal = self.legal_moves();
        let mv = legal.choose(&mut self.rng).copied()?;
        self.play(mv);
        Some(mv)
    }

    fn play(&mut self, mv: Move) {
        self.history.push(self.position.clone());
        self.position.play_unchecked(mv);
        tracing::debug!(mv = %mv, fen = %self.position, "Move played");
    }

    /// Take back up to `plies` moves. Returns how many were undone.
    pub fn undo(&mut self, plies: usize) -> usize {
        let mut undone = 0;
        while undone < plies {
            match self.history.pop() {
                Some(board) => {
                    self.position = board;
                    undone += 1;
                }
                None => break,
            }
        }
        undone
    }

    pub fn restart(&mut self) {
        self.position = Board::default();
        self.history.clear();
        self.mode = Mode::Play;
        self.notice = None;
    }

    pub fn status_line(&self) -> String {
        if self.mode == Mode::Setup {
            return "Setup mode.".to_string();
        }
        match self.outcome() {
            Outcome::Ongoing => match self.position.side_to_move() {
                Color::White => "White to move.".to_string(),
                Color::Black => "Black to move.".to_string(),
            },
            Outcome::HumanWon => "You win!".to_string(),
            Outcome::OpponentWon => "Opponent wins!".to_string(),
            Outcome::Draw => "Draw!".to_string(),
        }
    }

    pub fn hover(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    pub fn set_hover(&mut self, hover: Option<String>) {
        self.hover = hover;
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }
}

/// cozy-chess encodes castling as the king capturing its own rook.
/// Translate a two-square king move (e1g1) into that form when it is legal.
fn king_takes_rook(mv: Move, legal: &[Move]) -> Move {
    if mv.from.file() != File::E || mv.promotion.is_some() {
        return mv;
    }
    let rook = match (mv.from.rank(), mv.to.rank(), mv.to.file()) {
        (Rank::First, Rank::First, File::G) => Square::new(File::H, Rank::First),
        (Rank::First, Rank::First, File::C) => Square::new(File::A, Rank::First),
        (Rank::Eighth, Rank::Eighth, File::G) => Square::new(File::H, Rank::Eighth),
        (Rank::Eighth, Rank::Eighth, File::C) => Square::new(File::A, Rank::Eighth),
        _ => return mv,
    };
    let castle = Move {
        from: mv.from,
        to: rook,
        promotion: None,
    };
    if legal.contains(&castle) {
        castle
    } else {
        mv
    }
}

fn to_cozy_square(square: chess::Square) -> Square {
    Square::new(
        File::index(square.file() as usize),
        Rank::index(square.rank() as usize),
    )
}

fn to_cozy_color(color: PieceColor) -> Color {
    match color {
        PieceColor::White => Color::White,
        PieceColor::Black => Color::Black,
    }
}

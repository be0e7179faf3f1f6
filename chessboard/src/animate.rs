//! Plays a diff as concurrent animations and waits for all of them.

use crate::config::BoardConfig;
use crate::surface::{BoardSurface, SlideFrom};
use chess::DiffOp;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;

/// Resolved durations for each animation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speeds {
    pub appear: Duration,
    pub moves: Duration,
    pub snapback: Duration,
    pub snap: Duration,
    pub trash: Duration,
}

impl From<&BoardConfig> for Speeds {
    fn from(config: &BoardConfig) -> Self {
        Self {
            appear: config.appear_speed.duration(),
            moves: config.move_speed.duration(),
            snapback: config.snapback_speed.duration(),
            snap: config.snap_speed.duration(),
            trash: config.trash_speed.duration(),
        }
    }
}

/// Whether a reconciliation is in flight. `play` holds the board mutably
/// for its whole run, so callers outside it only ever observe `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Animating,
}

#[derive(Debug, Default)]
pub struct Animator {
    state: RenderState,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Run one animation per operation concurrently.
    ///
    /// Returns once every animation has completed, with the number that did.
    /// An empty list returns immediately without leaving `Idle`.
    pub async fn play<S>(
        &mut self,
        surface: &S,
        ops: &[DiffOp],
        speeds: &Speeds,
        spare_pieces: bool,
    ) -> usize
    where
        S: BoardSurface + ?Sized,
    {
        if ops.is_empty() {
            return 0;
        }

        self.state = RenderState::Animating;
        tracing::debug!(operations = ops.len(), "Animating position change");

        let mut animations: FuturesUnordered<_> = ops
            .iter()
            .map(|op| animate_op(surface, *op, speeds, spare_pieces))
            .collect();
        let mut completed = 0;
        while animations.next().await.is_some() {
            completed += 1;
            tracing::trace!(completed, total = ops.len(), "Animation finished");
        }
        debug_assert_eq!(completed, ops.len());

        self.state = RenderState::Idle;
        tracing::debug!(completed, "Position animation finished");
        completed
    }
}

async fn animate_op<S>(surface: &S, op: DiffOp, speeds: &Speeds, spare_pieces: bool)
where
    S: BoardSurface + ?Sized,
{
    match op {
        DiffOp::Clear { square, .. } => surface.fade_out(square, speeds.trash).await,
        DiffOp::Add { square, piece } if spare_pieces => {
            surface
                .slide(SlideFrom::Spare, square, piece, speeds.moves)
                .await
        }
        DiffOp::Add { square, piece } => surface.fade_in(square, piece, speeds.appear).await,
        DiffOp::Move {
            source,
            destination,
            piece,
        } => {
            surface
                .slide(SlideFrom::Square(source), destination, piece, speeds.moves)
                .await
        }
    }
}

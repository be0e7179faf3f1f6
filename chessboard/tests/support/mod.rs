#![allow(dead_code)]

use async_trait::async_trait;
use chess::{Piece, Position, Square};
use chessboard::{
    BoardHooks, BoardLayout, BoardSurface, DragLocation, DragSource, DropOverride, Highlight,
    Orientation, Point, SlideFrom,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 401 units wide: squares of 50.
pub const CONTAINER_WIDTH: u32 = 401;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DrawBoard(BoardLayout),
    DrawPosition(String),
    Highlight(Square, Highlight, bool),
    ClearHighlights,
    HidePiece(Square),
    ShowDragged(Piece, Point),
    MoveDragged(Point),
    HideDragged,
    FadeIn(Square, Piece, Duration),
    FadeOut(Square, Duration),
    Slide(SlideFrom, Square, Piece, Duration),
    SlideDragged(Point, Duration),
    FadeDragged(Duration),
    Destroy,
}

/// Surface that records every call. Animations sleep for their duration so
/// paused-clock tests can observe concurrency.
pub struct RecordingSurface {
    width: u32,
    layout: Mutex<Option<BoardLayout>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::with_width(CONTAINER_WIDTH)
    }

    pub fn with_width(width: u32) -> Self {
        Self {
            width,
            layout: Mutex::new(None),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn animations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::FadeIn(..)
                        | Call::FadeOut(..)
                        | Call::Slide(..)
                        | Call::SlideDragged(..)
                        | Call::FadeDragged(..)
                )
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BoardSurface for RecordingSurface {
    fn container_width(&self) -> u32 {
        self.width
    }

    fn square_offset(&self, square: Square) -> Point {
        match *self.layout.lock().unwrap() {
            Some(layout) => layout.square_offset(Point::default(), square),
            None => Point::default(),
        }
    }

    fn draw_board(&self, layout: &BoardLayout) {
        *self.layout.lock().unwrap() = Some(*layout);
        self.record(Call::DrawBoard(*layout));
    }

    fn draw_position(&self, position: &Position) {
        self.record(Call::DrawPosition(position.to_fen()));
    }

    fn set_highlight(&self, square: Square, highlight: Highlight, on: bool) {
        self.record(Call::Highlight(square, highlight, on));
    }

    fn clear_highlights(&self) {
        self.record(Call::ClearHighlights);
    }

    fn hide_piece(&self, square: Square) {
        self.record(Call::HidePiece(square));
    }

    fn show_dragged(&self, piece: Piece, at: Point) {
        self.record(Call::ShowDragged(piece, at));
    }

    fn move_dragged(&self, at: Point) {
        self.record(Call::MoveDragged(at));
    }

    fn hide_dragged(&self) {
        self.record(Call::HideDragged);
    }

    async fn fade_in(&self, square: Square, piece: Piece, duration: Duration) {
        self.record(Call::FadeIn(square, piece, duration));
        tokio::time::sleep(duration).await;
    }

    async fn fade_out(&self, square: Square, duration: Duration) {
        self.record(Call::FadeOut(square, duration));
        tokio::time::sleep(duration).await;
    }

    async fn slide(&self, from: SlideFrom, to: Square, piece: Piece, duration: Duration) {
        self.record(Call::Slide(from, to, piece, duration));
        tokio::time::sleep(duration).await;
    }

    async fn slide_dragged(&self, to: Point, duration: Duration) {
        self.record(Call::SlideDragged(to, duration));
        tokio::time::sleep(duration).await;
    }

    async fn fade_dragged(&self, duration: Duration) {
        self.record(Call::FadeDragged(duration));
        tokio::time::sleep(duration).await;
    }

    fn destroy(&self) {
        self.record(Call::Destroy);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    DragStart(DragSource, Piece),
    DragMove {
        location: DragLocation,
        previous: DragLocation,
    },
    Drop {
        source: DragSource,
        target: DragLocation,
        new_fen: String,
        old_fen: String,
    },
    SnapEnd(DragSource, Square, Piece),
    SnapbackEnd(Piece, Square),
    MoveEnd {
        old_fen: String,
        new_fen: String,
    },
    Change {
        old_fen: String,
        new_fen: String,
    },
    MouseOver(Square, Option<Piece>),
    MouseOut(Square, Option<Piece>),
}

/// Hooks that record every call and can be told to refuse drags or veto drops.
#[derive(Clone, Default)]
pub struct RecordingHooks {
    pub events: Arc<Mutex<Vec<HookEvent>>>,
    pub refuse_drags: bool,
    pub drop_override: Option<DropOverride>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn changes(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HookEvent::Change { old_fen, new_fen } => Some((old_fen, new_fen)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HookEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl BoardHooks for RecordingHooks {
    fn on_drag_start(
        &mut self,
        source: DragSource,
        piece: Piece,
        _position: &Position,
        _orientation: Orientation,
    ) -> bool {
        self.push(HookEvent::DragStart(source, piece));
        !self.refuse_drags
    }

    fn on_drag_move(
        &mut self,
        location: DragLocation,
        previous: DragLocation,
        _source: DragSource,
        _piece: Piece,
        _position: &Position,
        _orientation: Orientation,
    ) {
        self.push(HookEvent::DragMove { location, previous });
    }

    fn on_drop(
        &mut self,
        source: DragSource,
        target: DragLocation,
        _piece: Piece,
        new_position: &Position,
        old_position: &Position,
        _orientation: Orientation,
    ) -> Option<DropOverride> {
        self.push(HookEvent::Drop {
            source,
            target,
            new_fen: new_position.to_fen(),
            old_fen: old_position.to_fen(),
        });
        self.drop_override
    }

    fn on_snap_end(&mut self, source: DragSource, target: Square, piece: Piece) {
        self.push(HookEvent::SnapEnd(source, target, piece));
    }

    fn on_snapback_end(
        &mut self,
        piece: Piece,
        source: Square,
        _position: &Position,
        _orientation: Orientation,
    ) {
        self.push(HookEvent::SnapbackEnd(piece, source));
    }

    fn on_move_end(&mut self, old_position: &Position, new_position: &Position) {
        self.push(HookEvent::MoveEnd {
            old_fen: old_position.to_fen(),
            new_fen: new_position.to_fen(),
        });
    }

    fn on_change(&mut self, old_position: &Position, new_position: &Position) {
        self.push(HookEvent::Change {
            old_fen: old_position.to_fen(),
            new_fen: new_position.to_fen(),
        });
    }

    fn on_mouseover_square(
        &mut self,
        square: Square,
        piece: Option<Piece>,
        _position: &Position,
        _orientation: Orientation,
    ) {
        self.push(HookEvent::MouseOver(square, piece));
    }

    fn on_mouseout_square(
        &mut self,
        square: Square,
        piece: Option<Piece>,
        _position: &Position,
        _orientation: Orientation,
    ) {
        self.push(HookEvent::MouseOut(square, piece));
    }
}

pub fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

pub fn piece(code: &str) -> Piece {
    code.parse().unwrap()
}

/// Centre of `square` on a white-oriented board with 50-unit squares.
pub fn centre(name: &str) -> Point {
    let square = sq(name);
    let x = square.file() as i32 * 50 + 25;
    let y = (7 - square.rank() as i32) * 50 + 25;
    Point::new(x, y)
}

//! What the terminal shows, in board surface units.
//!
//! One unit is one terminal column. A terminal row is two units tall, so a
//! square of size `s` covers `s` columns and `s / 2` rows and stays square on
//! screen.

use chess::{Piece, PieceColor, Position, Square};
use chessboard::{BoardLayout, Highlight, Orientation, Point};
use ratatui::layout::Rect;
use std::collections::{BTreeMap, HashSet};

/// A piece drawn on a board square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceVisual {
    pub piece: Piece,
    /// 0.0 is invisible, 1.0 fully drawn.
    pub opacity: f32,
    pub hidden: bool,
}

impl PieceVisual {
    pub fn shown(piece: Piece) -> Self {
        Self {
            piece,
            opacity: 1.0,
            hidden: false,
        }
    }
}

/// A piece not yet settled on a square: sliding, or fading in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub id: u64,
    pub piece: Piece,
    pub at: Point,
    pub opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraggedPiece {
    pub piece: Piece,
    pub at: Point,
    pub opacity: f32,
}

/// Where the board sits on the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Terminal cell of surface point (0, 0).
    pub left: u16,
    pub top: u16,
    /// Square size the terminal can fit; always even.
    pub square_size: u32,
}

impl Viewport {
    /// Largest even square size that fits `area`, with room for the spare
    /// trays when they are shown.
    pub fn for_area(area: Rect, spare_pieces: bool) -> Self {
        let tray_squares = if spare_pieces { 2 } else { 0 };
        let by_width = area.width as u32 / 8;
        let by_height = area.height as u32 * 2 / (8 + tray_squares);
        let size = (by_width.min(by_height) & !1).max(2);

        let board_cols = size * 8;
        let board_rows = size / 2 * (8 + tray_squares);
        let left = area.x as u32 + (area.width as u32).saturating_sub(board_cols) / 2;
        let top = area.y as u32
            + (area.height as u32).saturating_sub(board_rows) / 2
            + size / 2 * tray_squares / 2;

        Self {
            left: left.min(u16::MAX as u32) as u16,
            top: top.min(u16::MAX as u32) as u16,
            square_size: size,
        }
    }

    /// Container width that makes the board pick exactly `square_size`.
    pub fn container_width(&self) -> u32 {
        self.square_size * 8 + 1
    }

    /// Surface point in the middle of terminal cell (`col`, `row`).
    pub fn to_point(&self, col: u16, row: u16) -> Point {
        Point::new(
            col as i32 - self.left as i32,
            (row as i32 - self.top as i32) * 2 + 1,
        )
    }

    /// Terminal cell containing surface point `p`. May be off screen.
    pub fn to_cell(&self, p: Point) -> (i32, i32) {
        (self.left as i32 + p.x, self.top as i32 + p.y.div_euclid(2))
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    pub viewport: Viewport,
    pub layout: Option<BoardLayout>,
    pub pieces: BTreeMap<Square, PieceVisual>,
    pub highlights: HashSet<(Square, Highlight)>,
    pub sprites: Vec<Sprite>,
    pub dragged: Option<DraggedPiece>,
    pub destroyed: bool,
    next_sprite: u64,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn square_size(&self) -> u32 {
        self.layout.map(|l| l.square_size).unwrap_or(0)
    }

    pub fn square_offset(&self, square: Square) -> Point {
        match self.layout {
            Some(layout) => layout.square_offset(Point::default(), square),
            None => Point::default(),
        }
    }

    /// Board square under `p`, if any.
    pub fn square_at(&self, p: Point) -> Option<Square> {
        let layout = self.layout?;
        let size = layout.square_size as i32;
        if size == 0 || p.x < 0 || p.y < 0 {
            return None;
        }
        layout.square_at_cell((p.x / size) as u32, (p.y / size) as u32)
    }

    /// Top-left corner of the tray slot holding `piece`.
    ///
    /// The tray nearest the viewer holds the pieces of the bottom colour.
    pub fn spare_slot(&self, piece: Piece) -> Point {
        let Some(layout) = self.layout else {
            return Point::default();
        };
        let size = layout.square_size as i32;
        let index = Piece::set_of(piece.color)
            .iter()
            .position(|p| *p == piece)
            .unwrap_or(0) as i32;
        let y = if tray_is_bottom(layout.orientation, piece.color) {
            8 * size
        } else {
            -size
        };
        Point::new((index + 1) * size, y)
    }

    /// Spare piece under `p`, when the trays are shown.
    pub fn spare_at(&self, p: Point) -> Option<Piece> {
        let layout = self.layout.filter(|l| l.spare_pieces)?;
        let size = layout.square_size as i32;
        [PieceColor::White, PieceColor::Black]
            .into_iter()
            .flat_map(Piece::set_of)
            .find(|piece| {
                let slot = self.spare_slot(*piece);
                p.x >= slot.x && p.x < slot.x + size && p.y >= slot.y && p.y < slot.y + size
            })
    }

    pub fn set_position(&mut self, position: &Position) {
        self.pieces = position
            .iter()
            .map(|(square, piece)| (square, PieceVisual::shown(piece)))
            .collect();
    }

    pub fn add_sprite(&mut self, piece: Piece, at: Point, opacity: f32) -> u64 {
        self.next_sprite += 1;
        self.sprites.push(Sprite {
            id: self.next_sprite,
            piece,
            at,
            opacity,
        });
        self.next_sprite
    }

    pub fn sprite_mut(&mut self, id: u64) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|s| s.id == id)
    }

    pub fn remove_sprite(&mut self, id: u64) {
        self.sprites.retain(|s| s.id != id);
    }
}

fn tray_is_bottom(orientation: Orientation, color: PieceColor) -> bool {
    matches!(
        (orientation, color),
        (Orientation::White, PieceColor::White) | (Orientation::Black, PieceColor::Black)
    )
}

/// Point `t` of the way from `from` to `to`.
pub fn lerp(from: Point, to: Point, t: f32) -> Point {
    let step = |a: i32, b: i32| a + ((b - a) as f32 * t).round() as i32;
    Point::new(step(from.x, to.x), step(from.y, to.y))
}

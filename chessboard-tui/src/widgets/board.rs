use crate::scene::Scene;
use crate::theme::Theme;
use chess::{Piece, PieceColor, PieceKind, Square};
use chessboard::{Highlight, Point};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

/// Pieces below this opacity are not drawn at all; below 1.0 they are dimmed.
const VISIBLE_OPACITY: f32 = 0.34;

/// Draws a [`Scene`]: squares, notation, pieces, spare trays, pieces in
/// flight and the dragged piece, in that order.
pub struct BoardWidget<'a> {
    scene: &'a Scene,
    theme: &'a Theme,
}

impl<'a> BoardWidget<'a> {
    pub fn new(scene: &'a Scene, theme: &'a Theme) -> Self {
        Self { scene, theme }
    }
}

impl Widget for BoardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let scene = self.scene;
        let Some(layout) = scene.layout.filter(|_| !scene.destroyed) else {
            return;
        };
        let size = layout.square_size as i32;
        if size == 0 {
            return;
        }
        let canvas = Canvas {
            scene,
            bounds: area.intersection(buf.area),
            size,
        };

        for square in Square::ALL {
            let light = square.is_light();
            let bg = square_background(scene, self.theme, square, light);
            let origin = scene.square_offset(square);
            canvas.fill(buf, origin, bg);

            let label_style = Style::default().fg(self.theme.board_label);
            if layout.shows_rank_label(square) {
                canvas.put(buf, origin, &square.rank_char().to_string(), label_style);
            }
            if layout.shows_file_label(square) {
                let corner = origin.offset(size - 1, size - 2);
                canvas.put(buf, corner, &square.file_char().to_string(), label_style);
            }
        }

        for (square, visual) in &scene.pieces {
            if visual.hidden {
                continue;
            }
            let origin = scene.square_offset(*square);
            canvas.piece(buf, origin, visual.piece, visual.opacity, self.theme);
        }

        if layout.spare_pieces {
            for piece in [PieceColor::White, PieceColor::Black]
                .into_iter()
                .flat_map(Piece::set_of)
            {
                let slot = scene.spare_slot(piece);
                canvas.fill(buf, slot, self.theme.tray_bg);
                canvas.piece(buf, slot, piece, 1.0, self.theme);
            }
        }

        for sprite in &scene.sprites {
            canvas.piece(buf, sprite.at, sprite.piece, sprite.opacity, self.theme);
        }

        if let Some(dragged) = scene.dragged {
            canvas.piece(buf, dragged.at, dragged.piece, dragged.opacity, self.theme);
        }
    }
}

fn square_background(scene: &Scene, theme: &Theme, square: Square, light: bool) -> Color {
    if scene.highlights.contains(&(square, Highlight::Hover)) {
        theme.highlight_color(theme.highlight_hover, light)
    } else if scene.highlights.contains(&(square, Highlight::Source)) {
        theme.highlight_color(theme.highlight_source, light)
    } else {
        theme.square_color(light)
    }
}

/// Maps surface points to clipped terminal cells.
struct Canvas<'a> {
    scene: &'a Scene,
    bounds: Rect,
    size: i32,
}

impl Canvas<'_> {
    fn cell(&self, p: Point) -> Option<(u16, u16)> {
        let (col, row) = self.scene.viewport.to_cell(p);
        let inside = col >= self.bounds.left() as i32
            && col < self.bounds.right() as i32
            && row >= self.bounds.top() as i32
            && row < self.bounds.bottom() as i32;
        inside.then_some((col as u16, row as u16))
    }

    /// Paint the square-sized box whose top-left corner is `origin`.
    fn fill(&self, buf: &mut Buffer, origin: Point, bg: Color) {
        let style = Style::default().bg(bg);
        for dy in (0..self.size).step_by(2) {
            for dx in 0..self.size {
                if let Some(pos) = self.cell(origin.offset(dx, dy)) {
                    buf[pos].set_symbol(" ").set_style(style);
                }
            }
        }
    }

    fn put(&self, buf: &mut Buffer, at: Point, text: &str, style: Style) {
        if let Some((x, y)) = self.cell(at) {
            buf.set_string(x, y, text, style);
        }
    }

    /// Draw a piece glyph centred in the box at `origin`.
    fn piece(&self, buf: &mut Buffer, origin: Point, piece: Piece, opacity: f32, theme: &Theme) {
        if opacity < VISIBLE_OPACITY {
            return;
        }
        let fg = match piece.color {
            PieceColor::White => theme.white_piece,
            PieceColor::Black => theme.black_piece,
        };
        let mut style = Style::default().fg(fg).add_modifier(Modifier::BOLD);
        if opacity < 1.0 {
            style = style.add_modifier(Modifier::DIM);
        }
        let centre = origin.offset(self.size / 2, self.size / 2);
        self.put(buf, centre, glyph(piece.kind), style);
    }
}

fn glyph(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::King => "♚",
        PieceKind::Queen => "♛",
        PieceKind::Rook => "♜",
        PieceKind::Bishop => "♝",
        PieceKind::Knight => "♞",
        PieceKind::Pawn => "♟",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DraggedPiece, PieceVisual, Viewport};
    use chessboard::{BoardLayout, Orientation};

    fn scene(orientation: Orientation, spare_pieces: bool) -> Scene {
        let mut scene = Scene::new(Viewport {
            left: 0,
            top: if spare_pieces { 2 } else { 0 },
            square_size: 4,
        });
        scene.layout = Some(BoardLayout {
            orientation,
            show_notation: true,
            spare_pieces,
            square_size: 4,
        });
        scene
    }

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn symbol(buf: &Buffer, x: u16, y: u16) -> &str {
        buf[(x, y)].symbol()
    }

    fn render(scene: &Scene, area: Rect) -> Buffer {
        let theme = Theme::dark();
        let mut buf = Buffer::empty(area);
        BoardWidget::new(scene, &theme).render(area, &mut buf);
        buf
    }

    #[test]
    fn test_squares_and_labels() {
        let theme = Theme::dark();
        let buf = render(&scene(Orientation::White, false), Rect::new(0, 0, 32, 16));

        // a8 is light, top-left, and carries the rank label
        assert_eq!(buf[(0, 0)].bg, theme.light_square);
        assert_eq!(symbol(&buf, 0, 0), "8");
        assert_eq!(buf[(4, 0)].bg, theme.dark_square);
        // h1 file label sits in the bottom-right corner
        assert_eq!(symbol(&buf, 31, 15), "h");
    }

    #[test]
    fn test_pieces_and_highlights() {
        let theme = Theme::dark();
        let mut scene = scene(Orientation::White, false);
        let king: Piece = "wK".parse().unwrap();
        scene.pieces.insert(sq("e1"), PieceVisual::shown(king));
        scene.highlights.insert((sq("e4"), Highlight::Hover));

        let buf = render(&scene, Rect::new(0, 0, 32, 16));
        // e1 is column 4, row 7; centre is two units in
        assert_eq!(symbol(&buf, 18, 15), "♚");
        assert_eq!(buf[(18, 15)].fg, theme.white_piece);
        // e4 is a light square
        assert_eq!(buf[(16, 8)].bg, Color::LightBlue);
    }

    #[test]
    fn test_faded_and_hidden_pieces() {
        let mut scene = scene(Orientation::White, false);
        let queen: Piece = "bQ".parse().unwrap();
        scene.pieces.insert(
            sq("d8"),
            PieceVisual {
                piece: queen,
                opacity: 0.1,
                hidden: false,
            },
        );
        scene.pieces.insert(
            sq("d1"),
            PieceVisual {
                piece: queen,
                opacity: 1.0,
                hidden: true,
            },
        );
        scene.pieces.insert(
            sq("d4"),
            PieceVisual {
                piece: queen,
                opacity: 0.5,
                hidden: false,
            },
        );

        let buf = render(&scene, Rect::new(0, 0, 32, 16));
        assert_eq!(symbol(&buf, 14, 1), " ");
        assert_eq!(symbol(&buf, 14, 15), " ");
        assert_eq!(symbol(&buf, 14, 9), "♛");
        assert!(buf[(14, 9)].modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_dragged_piece_is_clipped() {
        let mut scene = scene(Orientation::Black, false);
        let knight: Piece = "bN".parse().unwrap();
        scene.dragged = Some(DraggedPiece {
            piece: knight,
            at: Point::new(30, 10),
            opacity: 1.0,
        });
        let buf = render(&scene, Rect::new(0, 0, 32, 16));
        // Centre lands at (32, 12): one column past the edge
        assert!(buf.content.iter().all(|cell| cell.symbol() != "♞"));

        scene.dragged = Some(DraggedPiece {
            piece: knight,
            at: Point::new(10, 10),
            opacity: 1.0,
        });
        let buf = render(&scene, Rect::new(0, 0, 32, 16));
        assert_eq!(symbol(&buf, 12, 6), "♞");
    }

    #[test]
    fn test_spare_trays() {
        let theme = Theme::dark();
        let buf = render(&scene(Orientation::White, true), Rect::new(0, 0, 32, 20));
        // White king in the bottom tray, slot one, below the board
        assert_eq!(symbol(&buf, 6, 19), "♚");
        assert_eq!(buf[(4, 18)].bg, theme.tray_bg);
        // Black king in the top tray
        assert_eq!(symbol(&buf, 6, 1), "♚");
        assert_eq!(buf[(6, 1)].fg, theme.black_piece);
    }

    #[test]
    fn test_destroyed_scene_draws_nothing() {
        let mut scene = scene(Orientation::White, false);
        scene.destroyed = true;
        let buf = render(&scene, Rect::new(0, 0, 32, 16));
        assert_eq!(buf, Buffer::empty(Rect::new(0, 0, 32, 16)));
    }
}

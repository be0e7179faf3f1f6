//! Screen geometry shared by the board and its rendering surfaces.

use crate::config::Orientation;
use chess::Square;

/// A point in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Everything a surface needs to lay the board out. Each board instance
/// owns its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub orientation: Orientation,
    pub show_notation: bool,
    pub spare_pieces: bool,
    pub square_size: u32,
}

impl BoardLayout {
    /// Column and row of `square`, counted from the top-left corner.
    pub fn cell(&self, square: Square) -> (u32, u32) {
        let file = square.file() as u32;
        let rank = square.rank() as u32;
        match self.orientation {
            Orientation::White => (file, 7 - rank),
            Orientation::Black => (7 - file, rank),
        }
    }

    pub fn square_at_cell(&self, col: u32, row: u32) -> Option<Square> {
        if col > 7 || row > 7 {
            return None;
        }
        match self.orientation {
            Orientation::White => Square::new(col as u8, (7 - row) as u8),
            Orientation::Black => Square::new((7 - col) as u8, row as u8),
        }
    }

    /// Top-left corner of `square` for a board drawn at `origin`.
    pub fn square_offset(&self, origin: Point, square: Square) -> Point {
        let (col, row) = self.cell(square);
        let size = self.square_size as i32;
        origin.offset(col as i32 * size, row as i32 * size)
    }

    pub fn board_width(&self) -> u32 {
        self.square_size * 8
    }

    /// Squares whose file label is drawn (bottom row).
    pub fn shows_file_label(&self, square: Square) -> bool {
        self.show_notation && self.cell(square).1 == 7
    }

    /// Squares whose rank label is drawn (left column).
    pub fn shows_rank_label(&self, square: Square) -> bool {
        self.show_notation && self.cell(square).0 == 0
    }
}

/// Square size for a container: the widest multiple of 8 strictly inside
/// the container, divided by 8.
pub fn square_size_for(container_width: u32) -> u32 {
    if container_width == 0 {
        return 0;
    }
    let mut width = container_width - 1;
    while width % 8 != 0 && width > 0 {
        width -= 1;
    }
    width / 8
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::parse_square;

    fn layout(orientation: Orientation) -> BoardLayout {
        BoardLayout {
            orientation,
            show_notation: true,
            spare_pieces: false,
            square_size: 10,
        }
    }

    #[test]
    fn test_cells_follow_orientation() {
        let a1 = parse_square("a1").unwrap();
        assert_eq!(layout(Orientation::White).cell(a1), (0, 7));
        assert_eq!(layout(Orientation::Black).cell(a1), (7, 0));
        for square in Square::ALL {
            for orientation in [Orientation::White, Orientation::Black] {
                let l = layout(orientation);
                let (col, row) = l.cell(square);
                assert_eq!(l.square_at_cell(col, row), Some(square));
            }
        }
    }

    #[test]
    fn test_square_offset() {
        let l = layout(Orientation::White);
        let e4 = parse_square("e4").unwrap();
        assert_eq!(l.square_offset(Point::new(5, 5), e4), Point::new(45, 45));
    }

    #[test]
    fn test_square_size_for() {
        assert_eq!(square_size_for(0), 0);
        assert_eq!(square_size_for(1), 0);
        assert_eq!(square_size_for(8), 0);
        assert_eq!(square_size_for(9), 1);
        assert_eq!(square_size_for(400), 49);
        assert_eq!(square_size_for(401), 50);
    }

    #[test]
    fn test_notation_edges() {
        let l = layout(Orientation::White);
        assert!(l.shows_file_label(parse_square("c1").unwrap()));
        assert!(!l.shows_file_label(parse_square("c2").unwrap()));
        assert!(l.shows_rank_label(parse_square("a5").unwrap()));
        let flipped = layout(Orientation::Black);
        assert!(flipped.shows_file_label(parse_square("c8").unwrap()));
        assert!(flipped.shows_rank_label(parse_square("h5").unwrap()));
    }
}

//! Board squares named by file letter and rank digit (`a1` .. `h8`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

/// One of the 64 squares. Ordering is file-major: a1, a2, .., a8, b1, .., h8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// All squares in file-major order.
    pub const ALL: [Square; 64] = {
        let mut all = [Square { file: 0, rank: 0 }; 64];
        let mut i = 0;
        while i < 64 {
            all[i] = Square {
                file: (i / 8) as u8,
                rank: (i % 8) as u8,
            };
            i += 1;
        }
        all
    };

    /// Zero-based file and rank. Returns None when either is off the board.
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    pub fn file_char(self) -> char {
        FILES[self.file as usize]
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.rank) as char
    }

    /// Chebyshev distance: the larger of the file and rank distances.
    pub fn distance(self, other: Square) -> u8 {
        let df = self.file.abs_diff(other.file);
        let dr = self.rank.abs_diff(other.rank);
        df.max(dr)
    }

    pub fn is_light(self) -> bool {
        (self.file + self.rank) % 2 == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid square: {0:?}")]
pub struct ParseSquareError(pub String);

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseSquareError(s.to_string()));
        }
        match (bytes[0], bytes[1]) {
            (f @ b'a'..=b'h', r @ b'1'..=b'8') => Ok(Self {
                file: f - b'a',
                rank: r - b'1',
            }),
            _ => Err(ParseSquareError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse a square like "e4"; None for anything else.
pub fn parse_square(s: &str) -> Option<Square> {
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_is_file_major() {
        assert_eq!(Square::ALL[0].to_string(), "a1");
        assert_eq!(Square::ALL[1].to_string(), "a2");
        assert_eq!(Square::ALL[8].to_string(), "b1");
        assert_eq!(Square::ALL[63].to_string(), "h8");
        let mut sorted = Square::ALL;
        sorted.sort();
        assert_eq!(sorted, Square::ALL);
    }

    #[test]
    fn test_parse_square() {
        let sq: Square = "e4".parse().unwrap();
        assert_eq!((sq.file(), sq.rank()), (4, 3));
        for bad in ["", "e", "e9", "i1", "E4", "e44", "4e"] {
            assert!(parse_square(bad).is_none(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_distance_is_chebyshev() {
        let a1 = parse_square("a1").unwrap();
        assert_eq!(a1.distance(parse_square("c2").unwrap()), 2);
        assert_eq!(a1.distance(parse_square("h8").unwrap()), 7);
        assert_eq!(a1.distance(a1), 0);
    }

    #[test]
    fn test_square_colors() {
        assert!(!parse_square("a1").unwrap().is_light());
        assert!(parse_square("h1").unwrap().is_light());
    }
}

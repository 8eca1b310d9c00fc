//! Board squares and their `"a1".."h8"` key encoding.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// One of the 64 board squares, indexed `file + 8 * rank`.
///
/// The key encoding is the usual algebraic one: file letter `a..h`,
/// rank digit `1..8`. `Display`/`FromStr` are a bijection over all 64
/// squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub fn new(file: u8, rank: u8) -> Square {
        debug_assert!(file < 8 && rank < 8);
        Square(file + 8 * rank)
    }

    /// Builds a square from signed coordinates, `None` if off the board.
    pub fn from_coords(file: i8, rank: i8) -> Option<Square> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square(file as u8 + 8 * rank as u8))
        } else {
            None
        }
    }

    pub fn file(self) -> u8 {
        self.0 % 8
    }

    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Signed coordinates, convenient for geometry arithmetic.
    pub fn coords(self) -> (i8, i8) {
        ((self.0 % 8) as i8, (self.0 / 8) as i8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The square `df` files and `dr` ranks away, if still on the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Square::from_coords(self.file() as i8 + df, self.rank() as i8 + dr)
    }

    /// All 64 squares, in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Square, ParseError> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].wrapping_sub(b'a') as i8;
        let rank = bytes[1].wrapping_sub(b'1') as i8;
        Square::from_coords(file, rank).ok_or_else(|| ParseError::InvalidSquare(s.to_string()))
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Square {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Square, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(D::Error::custom)
    }
}

//! Core board model for an embeddable chess-board component: squares,
//! pieces, geometric primitives, FEN-style placement strings, the mutable
//! board snapshot, and the geometric premove generator.
//!
//! Chess rules proper (check detection, legal-move filtering for the side
//! to move) live outside this crate; the premove generator is intentionally
//! rule-incomplete and permissive.

pub mod board;
pub mod error;
pub mod fen;
pub mod geometry;
pub mod piece;
pub mod premove;
pub mod square;

pub use board::{Board, LastMove, MoveResult, Predrop};
pub use error::ParseError;
pub use piece::{Color, Piece, Role};
pub use premove::{premove, PremoveOpts};
pub use square::Square;

//! Bridge from a `shakmaty` position to the destination map and turn
//! state the controller consumes. This is one possible rules provider;
//! any source of legal destinations works.

use std::collections::HashMap;

use shakmaty::{Chess, Position};

use board_core::{Color, Square};

use crate::config::DestsMap;

fn convert(sq: shakmaty::Square) -> Square {
    Square::new(sq.file() as u8, sq.rank() as u8)
}

/// Legal destinations per origin for the side to move. Castling moves map
/// to the rook's square, Chess960 style.
pub fn legal_dests(pos: &Chess) -> DestsMap {
    let mut dests: DestsMap = HashMap::new();
    for m in pos.legal_moves() {
        if let Some(from) = m.from() {
            dests
                .entry(convert(from))
                .or_default()
                .insert(convert(m.to()));
        }
    }
    dests
}

pub fn turn(pos: &Chess) -> Color {
    match pos.turn() {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

/// The color in check, if any.
pub fn check(pos: &Chess) -> Option<Color> {
    pos.is_check().then(|| turn(pos))
}

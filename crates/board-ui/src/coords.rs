//! Screen-point to square mapping.

use board_core::{geometry, Square};

use crate::adapter::Bounds;
use crate::events::Point;

/// The square containing a screen point, `None` outside the board.
pub fn square_at(point: Point, as_white: bool, bounds: Bounds) -> Option<Square> {
    let mut file = ((8.0 * (point.x - bounds.left)) / bounds.width).floor() as i32;
    if !as_white {
        file = 7 - file;
    }
    let mut rank = 7 - ((8.0 * (point.y - bounds.top)) / bounds.height).floor() as i32;
    if !as_white {
        rank = 7 - rank;
    }
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::new(file as u8, rank as u8))
    } else {
        None
    }
}

/// The screen center of a square.
pub fn square_center(sq: Square, as_white: bool, bounds: Bounds) -> Point {
    let (mut file, mut rank) = sq.coords();
    if !as_white {
        file = 7 - file;
        rank = 7 - rank;
    }
    Point {
        x: bounds.left + bounds.width * file as f64 / 8.0 + bounds.width / 16.0,
        y: bounds.top + bounds.height * (7 - rank) as f64 / 8.0 + bounds.height / 16.0,
    }
}

/// The square nearest to `point` among those a queen or knight could reach
/// from `orig` (or `orig` itself). Arrow endpoints snap to these.
pub fn snapped_square(orig: Square, point: Point, as_white: bool, bounds: Bounds) -> Square {
    let from = orig.coords();
    let mut best = orig;
    let mut best_d = f64::INFINITY;
    for sq in Square::all() {
        let to = sq.coords();
        if sq != orig && !geometry::is_queen_move(from, to) && !geometry::is_knight_move(from, to)
        {
            continue;
        }
        let d = point.distance_sq(square_center(sq, as_white, bounds));
        if d < best_d {
            best_d = d;
            best = sq;
        }
    }
    best
}

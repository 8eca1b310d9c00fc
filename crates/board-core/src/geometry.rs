//! Directional predicates and line tracing.
//!
//! Everything works on signed `(file, rank)` pairs rather than `Square`,
//! because the premove path rules probe virtual endpoints one step past the
//! board edge (a pawn's path is checked up to the square beyond its
//! destination).

use crate::piece::Color;
use crate::square::Square;

/// Signed `(file, rank)` coordinates.
pub type Coords = (i8, i8);

fn diff(a: i8, b: i8) -> i8 {
    (a - b).abs()
}

pub fn is_knight_move(a: Coords, b: Coords) -> bool {
    diff(a.0, b.0) * diff(a.1, b.1) == 2
}

pub fn is_rook_move(a: Coords, b: Coords) -> bool {
    (a.0 == b.0) != (a.1 == b.1)
}

pub fn is_bishop_move(a: Coords, b: Coords) -> bool {
    diff(a.0, b.0) == diff(a.1, b.1) && a.0 != b.0
}

pub fn is_queen_move(a: Coords, b: Coords) -> bool {
    is_rook_move(a, b) || is_bishop_move(a, b)
}

pub fn is_king_step(a: Coords, b: Coords) -> bool {
    diff(a.0, b.0).max(diff(a.1, b.1)) == 1
}

pub fn is_pawn_capture(a: Coords, b: Coords, color: Color) -> bool {
    diff(a.0, b.0) == 1 && b.1 == a.1 + color.forward()
}

/// One step forward, or two from the mover's first two ranks. The two-rank
/// window covers non-standard starts such as horde pawns on the back rank.
pub fn is_pawn_advance(a: Coords, b: Coords, color: Color) -> bool {
    let step = color.forward();
    a.0 == b.0
        && (b.1 == a.1 + step
            || (b.1 == a.1 + 2 * step && if step == 1 { a.1 <= 1 } else { a.1 >= 6 }))
}

/// The open interval strictly between two aligned coordinates (rank, file
/// or diagonal). Misaligned or adjacent endpoints yield nothing. Endpoints
/// may sit one square off the board; only real squares are returned.
pub fn squares_between(a: Coords, b: Coords) -> Vec<Square> {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    if dx != 0 && dy != 0 && dx.abs() != dy.abs() {
        return Vec::new();
    }
    let step_x = dx.signum();
    let step_y = dy.signum();
    let mut squares = Vec::new();
    let (mut x, mut y) = (a.0 + step_x, a.1 + step_y);
    while (x, y) != (b.0, b.1) {
        if let Some(sq) = Square::from_coords(x, y) {
            squares.push(sq);
        }
        x += step_x;
        y += step_y;
    }
    squares
}

/// The one or two squares horizontally adjacent on the same rank.
pub fn rank_neighbors(sq: Square) -> Vec<Square> {
    [(-1, 0), (1, 0)]
        .iter()
        .filter_map(|&(df, dr)| sq.offset(df, dr))
        .collect()
}

/// Vertical shift, `None` past the edge.
pub fn shifted_vertically(sq: Square, delta: i8) -> Option<Square> {
    sq.offset(0, delta)
}

/// Squared Euclidean distance between two coordinates.
pub fn distance_sq(a: Coords, b: Coords) -> i32 {
    let dx = (a.0 - b.0) as i32;
    let dy = (a.1 - b.1) as i32;
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(key: &str) -> Coords {
        key.parse::<Square>().unwrap().coords()
    }

    #[test]
    fn test_knight_move() {
        assert!(is_knight_move(sq("b1"), sq("c3")));
        assert!(is_knight_move(sq("b1"), sq("a3")));
        assert!(!is_knight_move(sq("b1"), sq("b3")));
        assert!(!is_knight_move(sq("b1"), sq("d3")));
    }

    #[test]
    fn test_rook_move() {
        assert!(is_rook_move(sq("d4"), sq("d8")));
        assert!(is_rook_move(sq("d4"), sq("a4")));
        assert!(!is_rook_move(sq("d4"), sq("d4")));
        assert!(!is_rook_move(sq("d4"), sq("e5")));
    }

    #[test]
    fn test_bishop_move() {
        assert!(is_bishop_move(sq("c1"), sq("h6")));
        assert!(is_bishop_move(sq("c1"), sq("a3")));
        assert!(!is_bishop_move(sq("c1"), sq("c4")));
        assert!(!is_bishop_move(sq("c1"), sq("c1")));
    }

    #[test]
    fn test_king_step() {
        assert!(is_king_step(sq("e1"), sq("d2")));
        assert!(is_king_step(sq("e1"), sq("e2")));
        assert!(!is_king_step(sq("e1"), sq("e3")));
        assert!(!is_king_step(sq("e1"), sq("e1")));
    }

    #[test]
    fn test_pawn_capture() {
        assert!(is_pawn_capture(sq("e4"), sq("d5"), Color::White));
        assert!(is_pawn_capture(sq("e4"), sq("f5"), Color::White));
        assert!(!is_pawn_capture(sq("e4"), sq("e5"), Color::White));
        assert!(is_pawn_capture(sq("e4"), sq("d3"), Color::Black));
        assert!(!is_pawn_capture(sq("e4"), sq("d5"), Color::Black));
    }

    #[test]
    fn test_pawn_advance() {
        assert!(is_pawn_advance(sq("e2"), sq("e3"), Color::White));
        assert!(is_pawn_advance(sq("e2"), sq("e4"), Color::White));
        // generalized double-step from the back rank
        assert!(is_pawn_advance(sq("e1"), sq("e3"), Color::White));
        assert!(!is_pawn_advance(sq("e3"), sq("e5"), Color::White));
        assert!(is_pawn_advance(sq("e7"), sq("e5"), Color::Black));
        assert!(!is_pawn_advance(sq("e7"), sq("e8"), Color::Black));
    }

    #[test]
    fn test_squares_between() {
        let between: Vec<String> = squares_between(sq("a1"), sq("d4"))
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(between, ["b2", "c3"]);

        assert!(squares_between(sq("a1"), sq("a2")).is_empty());
        assert!(squares_between(sq("a1"), sq("b3")).is_empty());
        assert!(squares_between(sq("a1"), sq("a1")).is_empty());

        let file: Vec<String> = squares_between(sq("d1"), sq("d5"))
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(file, ["d2", "d3", "d4"]);
    }

    #[test]
    fn test_squares_between_virtual_endpoint() {
        // endpoint one rank past the board: only real squares come back
        let between = squares_between(sq("e7"), (4, 9));
        let keys: Vec<String> = between.iter().map(|s| s.to_string()).collect();
        assert_eq!(keys, ["e8"]);
    }

    #[test]
    fn test_rank_neighbors() {
        let e4: Square = "e4".parse().unwrap();
        assert_eq!(rank_neighbors(e4).len(), 2);
        let a4: Square = "a4".parse().unwrap();
        let neighbors = rank_neighbors(a4);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].to_string(), "b4");
    }
}

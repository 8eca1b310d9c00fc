//! Geometric premove generation: which squares may be staged as a move
//! while it is not this piece's turn.
//!
//! Deliberately a superset of strict legality (no check filtering). The
//! occupancy rules reason about what the opponent could do before the
//! premove executes: a blocked path or an occupied destination only
//! disqualifies a square when no plausible opponent reply could clear it.
//! The bias is always permissive; a reachable square must never be
//! under-approximated away.

use std::collections::{HashMap, HashSet};

use crate::board::{Board, LastMove};
use crate::geometry::{self, Coords};
use crate::piece::{Color, Piece, Role};
use crate::square::Square;

/// Premove generation switches, usually sourced from the component config.
#[derive(Debug, Clone, Copy)]
pub struct PremoveOpts {
    /// Consider castling destinations for kings.
    pub can_castle: bool,
    /// Drop every occupancy restriction, keeping raw movement geometry.
    pub unrestricted: bool,
}

impl Default for PremoveOpts {
    fn default() -> PremoveOpts {
        PremoveOpts {
            can_castle: true,
            unrestricted: false,
        }
    }
}

struct Ctx<'a> {
    orig: Coords,
    orig_sq: Square,
    color: Color,
    all: &'a HashMap<Square, Piece>,
    friendlies: HashMap<Square, Piece>,
    enemies: HashMap<Square, Piece>,
    /// Files of friendly rooks on the home rank.
    rook_files: Vec<i8>,
    last_move: Option<LastMove>,
    can_castle: bool,
    unrestricted: bool,
}

fn any_piece_between(a: Coords, b: Coords, pieces: &HashMap<Square, Piece>) -> bool {
    geometry::squares_between(a, b)
        .iter()
        .any(|sq| pieces.contains_key(sq))
}

/// The enemy pawn on `pawn_start` could advance to `dest` with nothing in
/// the way (the square beyond `dest` is probed too, so the check covers
/// the pawn actually passing through `dest`).
fn can_enemy_pawn_advance_to(ctx: &Ctx, pawn_start: Square, dest: Square) -> bool {
    let pawn = match ctx.enemies.get(&pawn_start) {
        Some(p) if p.role == Role::Pawn => *p,
        _ => return false,
    };
    let step = pawn.color.forward();
    let start = pawn_start.coords();
    let (dest_file, dest_rank) = dest.coords();
    geometry::is_pawn_advance(start, (dest_file, dest_rank), pawn.color)
        && !any_piece_between(start, (dest_file, dest_rank + step), ctx.all)
}

/// The enemy pawn on `pawn_start` could capture on `dest`: either a
/// friendly piece stands there, or the capture would be en passant.
fn can_enemy_pawn_capture_on(ctx: &Ctx, pawn_start: Square, dest: Square) -> bool {
    let pawn = match ctx.enemies.get(&pawn_start) {
        Some(p) if p.role == Role::Pawn => *p,
        _ => return false,
    };
    if !geometry::is_pawn_capture(pawn_start.coords(), dest.coords(), pawn.color) {
        return false;
    }
    if ctx.friendlies.contains_key(&dest) {
        return true;
    }
    geometry::shifted_vertically(dest, -pawn.color.forward()).is_some_and(|victim| {
        can_be_captured_en_passant(victim, &ctx.friendlies, &ctx.enemies, ctx.last_move)
    })
}

fn can_some_enemy_pawn_advance_to(ctx: &Ctx, dest: Square) -> bool {
    ctx.enemies
        .keys()
        .any(|&start| can_enemy_pawn_advance_to(ctx, start, dest))
}

/// Some enemy piece attacks `dest` right now; sliders need a clear line.
fn enemy_controls(ctx: &Ctx, dest: Square, exclude: &[Role]) -> bool {
    let target = dest.coords();
    ctx.enemies.iter().any(|(&sq, piece)| {
        if exclude.contains(&piece.role) {
            return false;
        }
        let from = sq.coords();
        let reaches = match piece.role {
            Role::Pawn => geometry::is_pawn_capture(from, target, piece.color),
            Role::Knight => geometry::is_knight_move(from, target),
            Role::Bishop => geometry::is_bishop_move(from, target),
            Role::Rook => geometry::is_rook_move(from, target),
            Role::Queen => geometry::is_queen_move(from, target),
            Role::King => geometry::is_king_step(from, target),
        };
        reaches
            && (!matches!(piece.role, Role::Bishop | Role::Rook | Role::Queen)
                || !any_piece_between(from, target, ctx.all))
    })
}

/// A friendly piece occupies `dest` but the opponent can capture it before
/// the premove executes, vacating the square.
fn friendly_on_dest_attacked(ctx: &Ctx, dest: Square) -> bool {
    ctx.friendlies.contains_key(&dest)
        && (can_be_captured_en_passant(dest, &ctx.friendlies, &ctx.enemies, ctx.last_move)
            || enemy_controls(ctx, dest, &[]))
}

/// A friendly pawn on `square` is en-passant-capturable: it sits on its
/// fourth relative rank with an enemy pawn adjacent, and the recorded last
/// move was its own two-square advance. With no last move recorded,
/// eligibility is assumed.
fn can_be_captured_en_passant(
    square: Square,
    friendlies: &HashMap<Square, Piece>,
    enemies: &HashMap<Square, Piece>,
    last_move: Option<LastMove>,
) -> bool {
    match last_move {
        Some(LastMove::Move { dest, .. }) if dest != square => return false,
        Some(LastMove::Drop { .. }) => return false,
        _ => {}
    }
    let pawn = match friendlies.get(&square) {
        Some(p) if p.role == Role::Pawn => *p,
        _ => return false,
    };
    let (file, rank) = square.coords();
    let fourth = if pawn.color == Color::White { 3 } else { 4 };
    if rank != fourth {
        return false;
    }
    if let Some(LastMove::Move { orig, .. }) = last_move {
        if (orig.rank() as i8 - rank).abs() != 2 {
            return false;
        }
    }
    [-1i8, 1].iter().any(|&delta| {
        Square::from_coords(file + delta, rank)
            .and_then(|sq| enemies.get(&sq))
            .is_some_and(|p| p.role == Role::Pawn)
    })
}

/// At most one friendly piece in the way, and only if it is an
/// en-passant-capturable pawn whose capture does not land back on the path.
fn path_clear_of_friendlies(ctx: &Ctx, to: Coords) -> bool {
    if ctx.unrestricted {
        return true;
    }
    let between = geometry::squares_between(ctx.orig, to);
    let blockers: Vec<Square> = between
        .iter()
        .copied()
        .filter(|sq| ctx.friendlies.contains_key(sq))
        .collect();
    match blockers[..] {
        [] => true,
        [blocker] => {
            can_be_captured_en_passant(blocker, &ctx.friendlies, &ctx.enemies, ctx.last_move)
                && !geometry::shifted_vertically(blocker, -ctx.color.forward())
                    .is_some_and(|landing| between.contains(&landing))
        }
        _ => false,
    }
}

/// At most one enemy piece in the way, and only a pawn whose own best
/// replies can all move it somewhere off the path and origin.
fn path_clear_of_enemies(ctx: &Ctx, to: Coords) -> bool {
    if ctx.unrestricted {
        return true;
    }
    let between = geometry::squares_between(ctx.orig, to);
    let blockers: Vec<Square> = between
        .iter()
        .copied()
        .filter(|sq| ctx.enemies.contains_key(sq))
        .collect();
    let blocker = match blockers[..] {
        [] => return true,
        [one] => one,
        _ => return false,
    };
    let pawn = match ctx.enemies.get(&blocker) {
        Some(p) if p.role == Role::Pawn => *p,
        _ => return true,
    };
    let step = pawn.color.forward();
    let mut pawn_dests: Vec<Square> = Vec::new();
    if let Some(ahead) = geometry::shifted_vertically(blocker, step) {
        for sq in geometry::rank_neighbors(ahead) {
            if can_enemy_pawn_capture_on(ctx, blocker, sq) {
                pawn_dests.push(sq);
            }
        }
        for sq in [Some(ahead), geometry::shifted_vertically(ahead, step)]
            .into_iter()
            .flatten()
        {
            if can_enemy_pawn_advance_to(ctx, blocker, sq) {
                pawn_dests.push(sq);
            }
        }
    }
    pawn_dests
        .iter()
        .any(|sq| !between.contains(sq) && *sq != ctx.orig_sq)
}

fn path_clear_enough(ctx: &Ctx, to: Coords) -> bool {
    path_clear_of_friendlies(ctx, to) && path_clear_of_enemies(ctx, to)
}

/// Friendly occupancy only blocks a destination when the occupant cannot be
/// captured away first.
fn occupancy_ok(ctx: &Ctx, dest: Square) -> bool {
    ctx.unrestricted
        || !ctx.friendlies.contains_key(&dest)
        || friendly_on_dest_attacked(ctx, dest)
}

fn pawn_premove(ctx: &Ctx, dest: Square) -> bool {
    let step = ctx.color.forward();
    let from = ctx.orig;
    let to = dest.coords();
    if (from.0 - to.0).abs() > 1 {
        return false;
    }
    if from.0 == to.0 {
        // Straight advance; the path probe extends one square beyond the
        // destination so the destination itself is covered.
        return geometry::is_pawn_advance(from, to, ctx.color)
            && path_clear_enough(ctx, (to.0, to.1 + step));
    }
    if to.1 != from.1 + step {
        return false;
    }
    if ctx.unrestricted || ctx.enemies.contains_key(&dest) {
        return true;
    }
    if ctx.friendlies.contains_key(&dest) {
        return enemy_controls(ctx, dest, &[]);
    }
    // Empty diagonal: valid if an enemy pawn can advance there, if an enemy
    // en-passant capture would land there, or if a non-pawn enemy piece
    // controls it.
    can_some_enemy_pawn_advance_to(ctx, dest)
        || geometry::shifted_vertically(dest, step).is_some_and(|victim| {
            can_be_captured_en_passant(victim, &ctx.friendlies, &ctx.enemies, ctx.last_move)
        })
        || enemy_controls(ctx, dest, &[Role::Pawn])
}

fn knight_premove(ctx: &Ctx, dest: Square) -> bool {
    geometry::is_knight_move(ctx.orig, dest.coords()) && occupancy_ok(ctx, dest)
}

fn bishop_premove(ctx: &Ctx, dest: Square) -> bool {
    geometry::is_bishop_move(ctx.orig, dest.coords())
        && path_clear_enough(ctx, dest.coords())
        && occupancy_ok(ctx, dest)
}

fn rook_premove(ctx: &Ctx, dest: Square) -> bool {
    geometry::is_rook_move(ctx.orig, dest.coords())
        && path_clear_enough(ctx, dest.coords())
        && occupancy_ok(ctx, dest)
}

fn queen_premove(ctx: &Ctx, dest: Square) -> bool {
    bishop_premove(ctx, dest) || rook_premove(ctx, dest)
}

fn king_premove(ctx: &Ctx, dest: Square) -> bool {
    let from = ctx.orig;
    let to = dest.coords();
    if geometry::is_king_step(from, to) && occupancy_ok(ctx, dest) {
        return true;
    }
    if !ctx.can_castle {
        return false;
    }
    let home = ctx.color.home_rank() as i8;
    if from.1 != to.1 || from.1 != home {
        return false;
    }
    let standard = from.0 == 4
        && ((to.0 == 2 && ctx.rook_files.contains(&0))
            || (to.0 == 6 && ctx.rook_files.contains(&7)));
    if !(standard || ctx.rook_files.contains(&to.0)) {
        return false;
    }
    if ctx.unrestricted {
        return true;
    }
    // Nothing but friendly rooks may stand between the king and the castling
    // corner. The sweep stops one file short of the near corner, which lets
    // a stray piece on the last square slip by in one Chess960 arrangement;
    // a king that close to its rook already validated as a plain step above.
    let edge = if to.0 > from.0 { 7 } else { 1 };
    geometry::squares_between(from, (edge, to.1))
        .iter()
        .all(|sq| match ctx.all.get(sq) {
            None => true,
            Some(p) => p.role == Role::Rook && p.color == ctx.color,
        })
}

/// Every destination currently permitted as a queued premove from `orig`.
///
/// Returns an empty set when the origin is empty or its piece belongs to
/// the side to move; the origin square itself is never included.
pub fn premove(board: &Board, orig: Square, opts: PremoveOpts) -> HashSet<Square> {
    let piece = match board.piece_at(orig) {
        Some(p) if p.color != board.turn => *p,
        _ => return HashSet::new(),
    };
    let color = piece.color;
    let friendlies: HashMap<Square, Piece> = board
        .pieces
        .iter()
        .filter(|(_, p)| p.color == color)
        .map(|(&sq, &p)| (sq, p))
        .collect();
    let enemies: HashMap<Square, Piece> = board
        .pieces
        .iter()
        .filter(|(_, p)| p.color != color)
        .map(|(&sq, &p)| (sq, p))
        .collect();
    let home = color.home_rank();
    let rook_files: Vec<i8> = board
        .pieces
        .iter()
        .filter(|(sq, p)| sq.rank() == home && p.color == color && p.role == Role::Rook)
        .map(|(sq, _)| sq.file() as i8)
        .collect();
    let ctx = Ctx {
        orig: orig.coords(),
        orig_sq: orig,
        color,
        all: &board.pieces,
        friendlies,
        enemies,
        rook_files,
        last_move: board.last_move,
        can_castle: opts.can_castle,
        unrestricted: opts.unrestricted,
    };
    let mobility: fn(&Ctx, Square) -> bool = match piece.role {
        Role::Pawn => pawn_premove,
        Role::Knight => knight_premove,
        Role::Bishop => bishop_premove,
        Role::Rook => rook_premove,
        Role::Queen => queen_premove,
        Role::King => king_premove,
    };
    Square::all()
        .filter(|&dest| dest != orig && mobility(&ctx, dest))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    /// Board where the given side is premoving (the other side to move).
    fn premoving(fen: &str, premover: Color) -> Board {
        let mut board = Board::from_fen(fen);
        board.turn = !premover;
        board
    }

    fn dests(board: &Board, orig: &str) -> HashSet<Square> {
        premove(board, sq(orig), PremoveOpts::default())
    }

    #[test]
    fn test_empty_origin_and_wrong_side_yield_empty() {
        let board = Board::start();
        assert!(dests(&board, "e4").is_empty());
        // white to move, so white pieces cannot premove
        assert!(dests(&board, "e2").is_empty());
        // black pieces can
        assert!(!dests(&board, "e7").is_empty());
    }

    #[test]
    fn test_origin_never_included() {
        let board = premoving("4k3/8/8/8/3Q4/8/8/4K3", Color::White);
        for orig in Square::all() {
            assert!(!premove(&board, orig, PremoveOpts::default()).contains(&orig));
        }
    }

    #[test]
    fn test_rook_on_open_board() {
        let board = premoving("4k3/8/8/8/3R4/8/8/4K3", Color::White);
        let set = dests(&board, "d4");
        assert_eq!(set.len(), 14);
        assert!(set.contains(&sq("d8")));
        assert!(set.contains(&sq("d1")));
        assert!(set.contains(&sq("a4")));
        assert!(set.contains(&sq("h4")));
        assert!(!set.contains(&sq("e5")));
    }

    #[test]
    fn test_knight_moves() {
        let board = premoving("4k3/8/8/8/8/8/8/1N2K3", Color::White);
        let set = dests(&board, "b1");
        let expected: HashSet<Square> = ["a3", "c3", "d2"].iter().map(|k| sq(k)).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_pawn_advances_when_clear() {
        let board = premoving("4k3/8/8/8/8/8/4P3/4K3", Color::White);
        let set = dests(&board, "e2");
        assert!(set.contains(&sq("e3")));
        assert!(set.contains(&sq("e4")));
    }

    #[test]
    fn test_pawn_advance_blocked_by_friendly() {
        // friendly knight on e3: not en-passant-capturable, path never clears
        let board = premoving("4k3/8/8/8/8/4N3/4P3/4K3", Color::White);
        let set = dests(&board, "e2");
        assert!(!set.contains(&sq("e3")));
        assert!(!set.contains(&sq("e4")));
    }

    #[test]
    fn test_pawn_advance_blocked_by_enemy_pawn_with_no_escape() {
        // lone black pawn on e3 can only retreat onto e2 (the origin), so
        // the path never clears
        let board = premoving("4k3/8/8/8/8/4p3/4P3/4K3", Color::White);
        let set = dests(&board, "e2");
        assert!(!set.contains(&sq("e3")));
        assert!(!set.contains(&sq("e4")));
    }

    #[test]
    fn test_pawn_advance_through_enemy_pawn_that_can_capture_away() {
        // black pawn e3 can capture the white knight on d2, clearing the file
        let board = premoving("4k3/8/8/8/8/4p3/3NP3/4K3", Color::White);
        let set = dests(&board, "e2");
        assert!(set.contains(&sq("e3")));
        assert!(set.contains(&sq("e4")));
    }

    #[test]
    fn test_pawn_diagonal_onto_enemy() {
        let board = premoving("4k3/8/8/8/8/3p4/4P3/4K3", Color::White);
        assert!(dests(&board, "e2").contains(&sq("d3")));
    }

    #[test]
    fn test_pawn_diagonal_empty_square_enemy_pawn_can_advance_there() {
        // black pawn d4 can advance to d3, so exd3 is a plausible premove
        let board = premoving("4k3/8/8/8/3p4/8/4P3/4K3", Color::White);
        assert!(dests(&board, "e2").contains(&sq("d3")));
    }

    #[test]
    fn test_pawn_diagonal_empty_square_unreachable() {
        let board = premoving("4k3/8/8/8/8/8/4P3/4K3", Color::White);
        assert!(!dests(&board, "e2").contains(&sq("d3")));
        assert!(!dests(&board, "e2").contains(&sq("f3")));
    }

    #[test]
    fn test_pawn_premove_onto_en_passant_landing_square() {
        // White just played d2-d4; black's e4 pawn may capture en passant,
        // landing on d3. A white pawn premoving onto d3 anticipates
        // recapturing there.
        let mut board = Board::from_fen("4k3/8/8/8/3Pp3/8/4P3/4K3");
        board.turn = Color::Black;
        board.last_move = Some(LastMove::Move {
            orig: sq("d2"),
            dest: sq("d4"),
        });
        assert!(dests(&board, "e2").contains(&sq("d3")));

        // same shape from the other side
        let mut board = Board::from_fen("4k3/8/8/8/2pP4/8/2P5/4K3");
        board.turn = Color::Black;
        board.last_move = Some(LastMove::Move {
            orig: sq("d2"),
            dest: sq("d4"),
        });
        // c4 is black's pawn; white's c2 pawn eyes the d3 landing square
        assert!(dests(&board, "c2").contains(&sq("d3")));
    }

    #[test]
    fn test_pawn_en_passant_assumed_without_last_move() {
        // no last move recorded: the d4 pawn counts as en-passant-capturable,
        // so the enemy exd3 landing justifies a c2 premove onto d3
        let board = premoving("4k3/8/8/8/3Pp3/8/2P5/4K3", Color::White);
        assert!(dests(&board, "c2").contains(&sq("d3")));
    }

    #[test]
    fn test_bishop_blocked_by_two_pieces() {
        let board = premoving("4k3/8/8/8/3p4/2p5/8/B3K3", Color::White);
        let set = dests(&board, "a1");
        assert!(set.contains(&sq("b2")));
        assert!(set.contains(&sq("c3")));
        assert!(!set.contains(&sq("e5")));
    }

    #[test]
    fn test_friendly_destination_allowed_only_when_attacked() {
        // black rook h4 attacks the white knight a4, so the knight could be
        // captured away before a rook premove onto a4 executes
        let board = premoving("4k3/8/8/8/N6r/8/8/R3K3", Color::White);
        let set = dests(&board, "a1");
        assert!(set.contains(&sq("a4")));
        // the knight still blocks the file beyond itself
        assert!(!set.contains(&sq("a5")));

        // without the attacking rook, a friendly-occupied destination is out
        let board = premoving("4k3/8/8/8/N7/8/8/R3K3", Color::White);
        assert!(!dests(&board, "a1").contains(&sq("a4")));
    }

    #[test]
    fn test_king_short_castle_premove() {
        let board = premoving("4k3/8/8/8/8/8/8/4K2R", Color::White);
        let set = dests(&board, "e1");
        assert!(set.contains(&sq("g1")));
        // the rook square itself is a Chess960-style destination
        assert!(set.contains(&sq("h1")));
    }

    #[test]
    fn test_king_castle_blocked_by_bishop() {
        let board = premoving("4k3/8/8/8/8/8/8/4KB1R", Color::White);
        let set = dests(&board, "e1");
        assert!(!set.contains(&sq("g1")));
        assert!(!set.contains(&sq("h1")));
    }

    #[test]
    fn test_king_castle_requires_rights() {
        let board = premoving("4k3/8/8/8/8/8/8/4K2R", Color::White);
        let opts = PremoveOpts {
            can_castle: false,
            unrestricted: false,
        };
        let set = premove(&board, sq("e1"), opts);
        assert!(!set.contains(&sq("g1")));
        assert!(!set.contains(&sq("h1")));
        // plain steps remain
        assert!(set.contains(&sq("f1")));
    }

    #[test]
    fn test_king_long_castle_premove() {
        let board = premoving("4k3/8/8/8/8/8/8/R3K3", Color::White);
        let set = dests(&board, "e1");
        assert!(set.contains(&sq("c1")));
        assert!(set.contains(&sq("a1")));
    }

    #[test]
    fn test_unrestricted_ignores_occupancy() {
        let board = premoving("4k3/8/8/8/8/8/PPPPPPPP/RNBQKBNR", Color::White);
        let opts = PremoveOpts {
            can_castle: true,
            unrestricted: true,
        };
        // the queen slides through and onto friendly pieces
        let set = premove(&board, sq("d1"), opts);
        assert!(set.contains(&sq("d2")));
        assert!(set.contains(&sq("d8")));
        assert!(set.contains(&sq("h5")));
    }

    #[test]
    fn test_black_premoves_against_white_to_move() {
        let board = Board::start();
        // e7 is friendly-occupied and not attacked, so only the jumps remain
        let expected: HashSet<Square> = ["f6", "h6"].iter().map(|k| sq(k)).collect();
        assert_eq!(dests(&board, "g8"), expected);
    }
}

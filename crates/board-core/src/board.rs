//! Mutable board snapshot and its mutators.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fen;
use crate::piece::{Color, Piece, Role};
use crate::square::Square;

/// The previous move: two squares for ordinary moves, one for drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastMove {
    Move { orig: Square, dest: Square },
    Drop { dest: Square },
}

impl LastMove {
    pub fn squares(&self) -> Vec<Square> {
        match *self {
            LastMove::Move { orig, dest } => vec![orig, dest],
            LastMove::Drop { dest } => vec![dest],
        }
    }
}

/// A queued drop of a piece in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predrop {
    pub role: Role,
    pub square: Square,
}

/// Outcome of a board mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// The move was played without a capture.
    Played,
    /// The move was played, capturing this piece.
    Captured(Piece),
    /// Same-square, empty origin, or otherwise refused; nothing changed.
    Rejected,
}

impl MoveResult {
    pub fn is_played(&self) -> bool {
        !matches!(self, MoveResult::Rejected)
    }

    pub fn captured(&self) -> Option<Piece> {
        match self {
            MoveResult::Captured(piece) => Some(*piece),
            _ => None,
        }
    }
}

/// The board snapshot: placement plus all turn-bound interaction state.
#[derive(Debug, Clone)]
pub struct Board {
    pub pieces: HashMap<Square, Piece>,
    pub turn: Color,
    pub orientation: Color,
    pub selected: Option<Square>,
    pub last_move: Option<LastMove>,
    /// Square of a king currently flagged as in check.
    pub check: Option<Square>,
    /// Queued premove, mutually exclusive with `predrop`.
    pub premove: Option<(Square, Square)>,
    /// Queued predrop, mutually exclusive with `premove`.
    pub predrop: Option<Predrop>,
}

impl Default for Board {
    fn default() -> Board {
        Board::start()
    }
}

impl Board {
    /// Standard initial position, white to move.
    pub fn start() -> Board {
        Board::from_placement(fen::read(fen::INITIAL))
    }

    pub fn from_placement(pieces: HashMap<Square, Piece>) -> Board {
        Board {
            pieces,
            turn: Color::White,
            orientation: Color::White,
            selected: None,
            last_move: None,
            check: None,
            premove: None,
            predrop: None,
        }
    }

    pub fn from_fen(fen: &str) -> Board {
        Board::from_placement(fen::read(fen))
    }

    pub fn fen(&self) -> String {
        fen::write(&self.pieces)
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.pieces.get(&sq)
    }

    /// Replaces the placement wholesale.
    pub fn set_fen(&mut self, fen: &str) {
        self.pieces = fen::read(fen);
    }

    /// Sparse patch: `Some` places, `None` clears.
    pub fn set_pieces(&mut self, changes: &[(Square, Option<Piece>)]) {
        for &(sq, piece) in changes {
            match piece {
                Some(p) => {
                    self.pieces.insert(sq, p);
                }
                None => {
                    self.pieces.remove(&sq);
                }
            }
        }
    }

    /// Queues a premove, displacing any queued predrop.
    pub fn set_premove(&mut self, orig: Square, dest: Square) {
        self.predrop = None;
        self.premove = Some((orig, dest));
    }

    /// Returns whether a premove was actually queued.
    pub fn unset_premove(&mut self) -> bool {
        self.premove.take().is_some()
    }

    /// Queues a predrop, displacing any queued premove.
    pub fn set_predrop(&mut self, role: Role, square: Square) {
        self.premove = None;
        self.predrop = Some(Predrop { role, square });
    }

    /// Returns whether a predrop was actually queued.
    pub fn unset_predrop(&mut self) -> bool {
        self.predrop.take().is_some()
    }

    /// Flags the king square(s) of `color` as checked; `None` clears.
    pub fn set_check(&mut self, color: Option<Color>) {
        self.check = None;
        if let Some(color) = color {
            for (&sq, piece) in &self.pieces {
                if piece.role == Role::King && piece.color == color {
                    self.check = Some(sq);
                }
            }
        }
    }

    pub fn toggle_orientation(&mut self) {
        self.orientation = !self.orientation;
        self.selected = None;
    }

    /// Moves the piece on `orig` to `dest`, capturing any enemy occupant.
    ///
    /// With `auto_castle`, a king moving two files from its standard start
    /// (or directly onto a friendly same-rank rook) relocates both king and
    /// rook to their castled squares instead. Records the last move and
    /// clears the check flag. Does not touch the turn; committing a move is
    /// the caller's concern.
    pub fn apply_move(&mut self, orig: Square, dest: Square, auto_castle: bool) -> MoveResult {
        let orig_piece = match self.pieces.get(&orig) {
            Some(p) => *p,
            None => return MoveResult::Rejected,
        };
        if orig == dest {
            return MoveResult::Rejected;
        }
        let captured = self
            .pieces
            .get(&dest)
            .filter(|p| p.color != orig_piece.color)
            .copied();
        if self.selected == Some(dest) {
            self.selected = None;
        }
        if !(auto_castle && self.try_auto_castle(orig, dest)) {
            self.pieces.remove(&orig);
            self.pieces.insert(dest, orig_piece);
        }
        self.last_move = Some(LastMove::Move { orig, dest });
        self.check = None;
        match captured {
            Some(piece) => MoveResult::Captured(piece),
            None => MoveResult::Played,
        }
    }

    fn try_auto_castle(&mut self, orig: Square, dest: Square) -> bool {
        let king = match self.pieces.get(&orig) {
            Some(p) if p.role == Role::King => *p,
            _ => return false,
        };
        let (orig_file, orig_rank) = orig.coords();
        let (dest_file, dest_rank) = dest.coords();
        if (orig_rank != 0 && orig_rank != 7) || orig_rank != dest_rank {
            return false;
        }
        let rank = orig_rank as u8;
        // Standard king start: translate the two-file hop onto the rook.
        let mut rook_sq = dest;
        if orig_file == 4 && !self.pieces.contains_key(&dest) {
            if dest_file == 6 {
                rook_sq = Square::new(7, rank);
            } else if dest_file == 2 {
                rook_sq = Square::new(0, rank);
            }
        }
        let rook = match self.pieces.get(&rook_sq) {
            Some(p) if p.role == Role::Rook && p.color == king.color => *p,
            _ => return false,
        };
        self.pieces.remove(&orig);
        self.pieces.remove(&rook_sq);
        if orig_file < rook_sq.file() as i8 {
            self.pieces.insert(Square::new(6, rank), king);
            self.pieces.insert(Square::new(5, rank), rook);
        } else {
            self.pieces.insert(Square::new(2, rank), king);
            self.pieces.insert(Square::new(3, rank), rook);
        }
        true
    }

    /// Drops a brand-new piece on `dest`. Fails if occupied and not forced.
    /// Success records a single-square last move, clears check, and passes
    /// the turn.
    pub fn place_new_piece(&mut self, piece: Piece, dest: Square, force: bool) -> bool {
        if self.pieces.contains_key(&dest) {
            if force {
                self.pieces.remove(&dest);
            } else {
                return false;
            }
        }
        self.pieces.insert(dest, piece);
        self.last_move = Some(LastMove::Drop { dest });
        self.check = None;
        self.turn = !self.turn;
        true
    }
}

//! Piece dragging: session lifecycle and per-frame tracking.
//!
//! A drag session opens on press and only "activates" once the pointer has
//! travelled past the configured distance, which is what tells a tap apart
//! from a drag. The pointer is sampled every animation frame rather than on
//! move events alone, since input coalescing varies by platform.

use tracing::debug;

use board_core::{Piece, Square};

use crate::adapter::Host;
use crate::controller::Controller;
use crate::events::{Point, PointerButton, PointerInput};
use crate::scheduler::FrameTask;

/// Where the dragged piece came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOrigin {
    Board(Square),
    /// A piece not yet on the board (pocket drag).
    NewPiece { force: bool },
}

impl DragOrigin {
    pub fn board_square(&self) -> Option<Square> {
        match *self {
            DragOrigin::Board(sq) => Some(sq),
            DragOrigin::NewPiece { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragSession {
    pub origin: DragOrigin,
    pub piece: Piece,
    pub start: Point,
    pub pos: Point,
    /// The drag passed the activation distance.
    pub started: bool,
    pub previously_selected: Option<Square>,
    /// The hovered square has differed from the origin at some point.
    pub square_left_origin: bool,
}

impl<H: Host> Controller<H> {
    pub(crate) fn drag_start(&mut self, ev: PointerInput) {
        if !(self.config.trust_all_events || ev.trusted) {
            return;
        }
        if ev.button != PointerButton::Left || ev.touches > 1 {
            return;
        }
        let Some(point) = ev.point else {
            return;
        };
        let Some(orig) = self.square_at(point) else {
            return;
        };
        let piece = self.board.piece_at(orig).copied();
        let previously_selected = self.board.selected;
        if previously_selected.is_none()
            && self.config.drawable.enabled
            && (self.config.drawable.erase_on_click
                || piece.map_or(true, |p| p.color != self.board.turn))
        {
            self.clear_shapes();
        }
        let had_premove = self.board.premove.is_some();
        let had_predrop = self.board.predrop.is_some();
        self.ctrl_key = ev.modifiers.ctrl;
        match self.board.selected {
            Some(selected) if self.can_move(selected, orig) => {
                self.with_animation(|c| c.select_square_inner(orig, false));
            }
            _ => self.select_square_inner(orig, false),
        }
        let still_selected = self.board.selected == Some(orig);
        match piece {
            Some(piece) if still_selected && self.is_draggable(orig) => {
                debug!(%orig, "drag opened");
                self.drag = Some(DragSession {
                    origin: DragOrigin::Board(orig),
                    piece,
                    start: point,
                    pos: point,
                    started: self.config.draggable.auto_distance && self.dragged,
                    previously_selected,
                    square_left_origin: false,
                });
                self.arm(FrameTask::DragPoll);
            }
            _ => {
                if had_premove {
                    self.unset_premove();
                }
                if had_predrop {
                    self.unset_predrop();
                }
            }
        }
        self.host.schedule_redraw();
    }

    /// Starts dragging a piece that is not yet on the board.
    pub fn drag_new_piece(&mut self, piece: Piece, ev: PointerInput, force: bool) {
        let Some(point) = ev.point else {
            return;
        };
        debug!(?piece, "dragging new piece");
        self.drag = Some(DragSession {
            origin: DragOrigin::NewPiece { force },
            piece,
            start: point,
            pos: point,
            started: true,
            previously_selected: self.board.selected,
            square_left_origin: false,
        });
        self.arm(FrameTask::DragPoll);
        self.host.schedule_redraw();
    }

    /// Per-frame sampling of the drag session.
    pub(crate) fn drag_poll(&mut self) {
        let Some(mut session) = self.drag.take() else {
            return;
        };
        if let DragOrigin::Board(orig) = session.origin {
            // the grabbed piece follows the pointer, not the animation
            if self
                .animation
                .as_ref()
                .is_some_and(|a| a.plan.anims.contains_key(&orig))
            {
                self.animation = None;
            }
            // if the piece is gone from the origin, the session dies
            let alive = self
                .board
                .piece_at(orig)
                .is_some_and(|p| p.same_movement(&session.piece));
            if !alive {
                self.host.drag_ended();
                self.unselect();
                self.host.schedule_redraw();
                return;
            }
        }
        if !session.started
            && session.pos.distance_sq(session.start) >= self.config.draggable.distance.powi(2)
        {
            session.started = true;
        }
        if session.started {
            self.host.drag_moved(session.piece, session.pos);
            if let DragOrigin::Board(orig) = session.origin {
                if !session.square_left_origin {
                    session.square_left_origin = self.square_at(session.pos) != Some(orig);
                }
            }
        }
        self.drag = Some(session);
        self.arm(FrameTask::DragPoll);
    }

    pub(crate) fn drag_move(&mut self, ev: PointerInput) {
        if ev.touches > 1 {
            return;
        }
        if let (Some(session), Some(point)) = (self.drag.as_mut(), ev.point) {
            session.pos = point;
        }
    }

    pub(crate) fn drag_end(&mut self, ev: PointerInput) {
        let Some(session) = self.drag.take() else {
            return;
        };
        self.tasks.disarm(FrameTask::DragPoll);
        self.unset_premove();
        self.unset_predrop();
        let point = ev.point.unwrap_or(session.pos);
        let dest = self.square_at(point);
        let orig_sq = session.origin.board_square();
        let landing = match dest {
            Some(d) if session.started && orig_sq != Some(d) => Some(d),
            _ => None,
        };
        if let Some(dest) = landing {
            match session.origin {
                DragOrigin::NewPiece { force } => {
                    self.drop_new_piece(session.piece, dest, force);
                }
                DragOrigin::Board(orig) => {
                    self.ctrl_key = ev.modifiers.ctrl;
                    if self.user_move(orig, dest) {
                        debug!(%orig, %dest, "drag committed");
                        self.dragged = true;
                    }
                }
            }
        } else if matches!(session.origin, DragOrigin::NewPiece { .. }) {
            // the piece in hand evaporates
        } else if self.config.draggable.delete_on_drop_off && dest.is_none() {
            if let Some(orig) = orig_sq {
                self.board.pieces.remove(&orig);
                self.host.on_change();
            }
        }
        if (orig_sq == session.previously_selected || session.square_left_origin)
            && (orig_sq == dest || dest.is_none())
        {
            self.unselect();
        } else if !self.config.selectable.enabled {
            self.unselect();
        }
        self.host.drag_ended();
        self.host.schedule_redraw();
    }

    /// Abandons the drag session, restoring an idle state. Idempotent.
    pub fn drag_cancel(&mut self) {
        if self.drag.take().is_some() {
            debug!("drag cancelled");
            self.tasks.disarm(FrameTask::DragPoll);
            self.unselect();
            self.host.drag_ended();
            self.host.schedule_redraw();
        }
    }
}

//! Shape drawing: circles and arrows sketched over the board.
//!
//! Like dragging, an active draw session is sampled every animation frame,
//! and the sampling stops the instant the session ends.

use board_core::Square;

use crate::adapter::Host;
use crate::config::{Brush, Shape};
use crate::controller::Controller;
use crate::coords;
use crate::events::{Point, PointerButton, PointerInput};
use crate::scheduler::FrameTask;

#[derive(Debug, Clone)]
pub struct DrawSession {
    pub orig: Square,
    pub pos: Point,
    pub brush: Brush,
    pub snap_to_valid_move: bool,
    /// Square currently under the pointer (possibly snapped).
    pub hover: Option<Square>,
    /// Arrow endpoint; `None` while hovering the origin (a circle).
    pub dest: Option<Square>,
}

/// Brush selection from modifier keys, four combinations.
pub(crate) fn brush_from(ev: &PointerInput) -> Brush {
    let mod_a = (ev.modifiers.shift || ev.modifiers.ctrl) && ev.button == PointerButton::Right;
    let mod_b = ev.modifiers.alt || ev.modifiers.meta;
    match (mod_a, mod_b) {
        (false, false) => Brush::Green,
        (true, false) => Brush::Red,
        (false, true) => Brush::Blue,
        (true, true) => Brush::Yellow,
    }
}

impl<H: Host> Controller<H> {
    pub(crate) fn draw_start(&mut self, ev: PointerInput) {
        if ev.touches > 1 {
            return;
        }
        if ev.modifiers.ctrl {
            self.unselect();
        } else {
            self.cancel_move_inner();
        }
        let Some(point) = ev.point else {
            return;
        };
        let Some(orig) = self.square_at(point) else {
            return;
        };
        self.draw = Some(DrawSession {
            orig,
            pos: point,
            brush: brush_from(&ev),
            snap_to_valid_move: self.config.drawable.default_snap_to_valid_move,
            hover: None,
            dest: None,
        });
        self.arm(FrameTask::DrawPoll);
    }

    /// Per-frame sampling of the draw session.
    pub(crate) fn draw_poll(&mut self) {
        let Some(mut session) = self.draw.take() else {
            return;
        };
        let bounds = self.host.bounds();
        let as_white = self.as_white();
        let under_pointer = coords::square_at(session.pos, as_white, bounds);
        if under_pointer.is_none() {
            session.snap_to_valid_move = false;
        }
        let hover = if session.snap_to_valid_move {
            Some(coords::snapped_square(
                session.orig,
                session.pos,
                as_white,
                bounds,
            ))
        } else {
            under_pointer
        };
        if hover != session.hover {
            session.hover = hover;
            session.dest = hover.filter(|&h| h != session.orig);
            self.host.redraw_now(false);
        }
        self.draw = Some(session);
        self.arm(FrameTask::DrawPoll);
    }

    pub(crate) fn draw_move(&mut self, ev: PointerInput) {
        if let (Some(session), Some(point)) = (self.draw.as_mut(), ev.point) {
            session.pos = point;
        }
    }

    pub(crate) fn draw_end(&mut self) {
        let Some(session) = self.draw.take() else {
            return;
        };
        self.tasks.disarm(FrameTask::DrawPoll);
        if session.hover.is_some() {
            self.add_shape(&session);
        }
        self.host.schedule_redraw();
    }

    /// Abandons the draw session without committing. Idempotent.
    pub fn draw_cancel(&mut self) {
        if self.draw.take().is_some() {
            self.tasks.disarm(FrameTask::DrawPoll);
            self.host.schedule_redraw();
        }
    }

    /// Commits a drawn shape. A shape over the same endpoints replaces the
    /// old one; drawing the identical shape again removes it instead.
    fn add_shape(&mut self, session: &DrawSession) {
        let shape = Shape {
            orig: session.orig,
            dest: session.dest,
            brush: session.brush,
        };
        let shapes = &mut self.config.drawable.shapes;
        let similar = shapes
            .iter()
            .find(|s| s.orig == shape.orig && s.dest == shape.dest)
            .copied();
        if similar.is_some() {
            shapes.retain(|s| !(s.orig == shape.orig && s.dest == shape.dest));
        }
        if similar.map_or(true, |s| s.brush != shape.brush) {
            shapes.push(shape);
        }
        let snapshot = self.config.drawable.shapes.clone();
        self.host.on_shapes_changed(&snapshot);
    }

    /// Erases every user shape.
    pub fn clear_shapes(&mut self) {
        if !self.config.drawable.shapes.is_empty() {
            self.config.drawable.shapes.clear();
            self.host.schedule_redraw();
            self.host.on_shapes_changed(&[]);
        }
    }
}

//! The interaction controller: one instance per board, owning the board
//! snapshot, the configuration, and every in-flight session (drag, draw,
//! animation, explosion). All mutation happens synchronously inside the
//! pointer entry points, the programmatic API, and `on_frame`.

use std::collections::HashSet;

use tracing::debug;

use board_core::{premove, Board, Color, LastMove, MoveResult, Piece, Predrop, PremoveOpts, Role, Square};

use crate::adapter::{DropMeta, Host, MoveMeta};
use crate::anim::{self, AnimCurrent};
use crate::config::{CheckPatch, Config, ConfigPatch, DestsMap, LastMovePatch, MovableSide, Shape};
use crate::coords;
use crate::drag::DragSession;
use crate::draw::DrawSession;
use crate::events::{Point, PointerButton, PointerInput};
use crate::scheduler::{FrameTask, FrameTasks};

const EXPLOSION_STAGE_MS: f64 = 120.0;

/// A two-stage timed highlight on a square set.
#[derive(Debug, Clone)]
pub struct Explosion {
    pub stage: u8,
    pub squares: Vec<Square>,
    stage_until: f64,
}

pub struct Controller<H: Host> {
    pub(crate) board: Board,
    pub(crate) config: Config,
    pub(crate) host: H,
    /// Cached premove destinations of the current selection.
    pub(crate) premove_dests: Option<HashSet<Square>>,
    pub(crate) drag: Option<DragSession>,
    pub(crate) draw: Option<DrawSession>,
    pub(crate) animation: Option<AnimCurrent>,
    pub(crate) exploding: Option<Explosion>,
    /// Piece in hand for click-to-drop mode.
    pub(crate) drop_mode: Option<Piece>,
    pub(crate) tasks: FrameTasks,
    /// Ctrl state of the most recent press, reported in move metadata.
    pub(crate) ctrl_key: bool,
    /// A drag gesture has been observed; tap-tap users keep the activation
    /// threshold.
    pub(crate) dragged: bool,
}

impl<H: Host> Controller<H> {
    pub fn new(config: Config, host: H) -> Controller<H> {
        Controller::with_board(Board::start(), config, host)
    }

    pub fn with_board(board: Board, config: Config, host: H) -> Controller<H> {
        Controller {
            board,
            config,
            host,
            premove_dests: None,
            drag: None,
            draw: None,
            animation: None,
            exploding: None,
            drop_mode: None,
            tasks: FrameTasks::default(),
            ctrl_key: false,
            dragged: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn fen(&self) -> String {
        self.board.fen()
    }

    pub fn animation(&self) -> Option<&AnimCurrent> {
        self.animation.as_ref()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn draw_session(&self) -> Option<&DrawSession> {
        self.draw.as_ref()
    }

    pub fn exploding(&self) -> Option<&Explosion> {
        self.exploding.as_ref()
    }

    /// Premove destinations of the current selection, for rendering.
    pub fn premove_dests(&self) -> Option<&HashSet<Square>> {
        self.premove_dests.as_ref()
    }

    // ------------------------------------------------------------------
    // Eligibility
    // ------------------------------------------------------------------

    pub(crate) fn is_movable(&self, orig: Square) -> bool {
        match self.board.piece_at(orig) {
            Some(piece) => match self.config.movable.side {
                MovableSide::Both => true,
                side => side.is_exactly(piece.color) && self.board.turn == piece.color,
            },
            None => false,
        }
    }

    pub(crate) fn can_move(&self, orig: Square, dest: Square) -> bool {
        orig != dest
            && self.is_movable(orig)
            && (self.config.movable.free
                || self
                    .config
                    .movable
                    .dests
                    .as_ref()
                    .and_then(|dests| dests.get(&orig))
                    .is_some_and(|set| set.contains(&dest)))
    }

    pub(crate) fn is_premovable(&self, orig: Square) -> bool {
        self.board.piece_at(orig).is_some_and(|piece| {
            self.config.premovable.enabled
                && self.config.movable.side.is_exactly(piece.color)
                && self.board.turn != piece.color
        })
    }

    fn premove_opts(&self) -> PremoveOpts {
        PremoveOpts {
            can_castle: self.config.premovable.castle,
            unrestricted: self.config.premovable.unrestricted,
        }
    }

    /// Premove destinations for an origin: custom-supplied if present,
    /// otherwise computed by the engine.
    pub fn premove_dests_of(&self, orig: Square) -> HashSet<Square> {
        match &self.config.premovable.custom_dests {
            Some(custom) => custom.get(&orig).cloned().unwrap_or_default(),
            None => premove(&self.board, orig, self.premove_opts()),
        }
    }

    pub(crate) fn can_premove(&self, orig: Square, dest: Square) -> bool {
        orig != dest && self.is_premovable(orig) && self.premove_dests_of(orig).contains(&dest)
    }

    pub(crate) fn can_drop_piece(&self, piece: Piece, dest: Square) -> bool {
        !self.board.pieces.contains_key(&dest)
            && match self.config.movable.side {
                MovableSide::Both => true,
                side => side.is_exactly(piece.color) && self.board.turn == piece.color,
            }
    }

    pub(crate) fn can_predrop_piece(&self, piece: Piece, dest: Square) -> bool {
        self.board
            .piece_at(dest)
            .map_or(true, |p| !self.config.movable.side.is_exactly(p.color))
            && self.config.predroppable.enabled
            && (piece.role != Role::Pawn || (dest.rank() != 0 && dest.rank() != 7))
            && self.config.movable.side.is_exactly(piece.color)
            && self.board.turn != piece.color
    }

    pub(crate) fn is_draggable(&self, orig: Square) -> bool {
        self.board.piece_at(orig).is_some_and(|piece| {
            self.config.draggable.enabled
                && match self.config.movable.side {
                    MovableSide::Both => true,
                    side => {
                        side.is_exactly(piece.color)
                            && (self.board.turn == piece.color || self.config.premovable.enabled)
                    }
                }
        })
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub(crate) fn set_selected(&mut self, sq: Square) {
        self.board.selected = Some(sq);
        if self.is_premovable(sq) && self.config.premovable.custom_dests.is_none() {
            self.premove_dests = Some(premove(&self.board, sq, self.premove_opts()));
        } else if !self.is_premovable(sq) {
            self.premove_dests = None;
        }
    }

    pub(crate) fn unselect(&mut self) {
        self.board.selected = None;
        self.premove_dests = None;
    }

    pub(crate) fn select_square_inner(&mut self, sq: Square, force: bool) {
        self.host.on_select(sq);
        if let Some(selected) = self.board.selected {
            if selected == sq && !self.config.draggable.enabled {
                self.unselect();
                return;
            } else if (self.config.selectable.enabled || force) && selected != sq {
                if self.user_move(selected, sq) {
                    self.dragged = false;
                    return;
                }
            }
        }
        if (self.config.selectable.enabled || self.config.draggable.enabled)
            && (self.is_movable(sq) || self.is_premovable(sq))
        {
            self.set_selected(sq);
        }
    }

    /// Programmatic selection; `None` unselects.
    pub fn select_square(&mut self, sq: Option<Square>, force: bool) {
        match sq {
            Some(sq) => self.with_animation(|c| c.select_square_inner(sq, force)),
            None => {
                if self.board.selected.is_some() {
                    self.unselect();
                    self.host.schedule_redraw();
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Moves
    // ------------------------------------------------------------------

    pub(crate) fn base_move(&mut self, orig: Square, dest: Square) -> MoveResult {
        let result = self.board.apply_move(orig, dest, self.config.auto_castle);
        if result.is_played() {
            if self.board.selected.is_none() {
                self.premove_dests = None;
            }
            self.host.on_move(orig, dest, result.captured());
            self.host.on_change();
        }
        result
    }

    /// A committed move: invalidates the destination map, passes the turn,
    /// and drops any running animation baseline.
    pub(crate) fn base_user_move(&mut self, orig: Square, dest: Square) -> MoveResult {
        let result = self.base_move(orig, dest);
        if result.is_played() {
            self.config.movable.dests = None;
            self.board.turn = !self.board.turn;
            self.animation = None;
        }
        result
    }

    pub(crate) fn base_new_piece(&mut self, piece: Piece, dest: Square, force: bool) -> bool {
        if self.board.pieces.contains_key(&dest) && !force {
            return false;
        }
        self.host.on_new_piece(piece, dest);
        self.board.place_new_piece(piece, dest, force);
        self.config.movable.dests = None;
        self.host.on_change();
        true
    }

    /// Resolve a gesture from `orig` to `dest`: commit if the rules allow
    /// it, else queue a premove, else give up. Always clears the selection.
    pub(crate) fn user_move(&mut self, orig: Square, dest: Square) -> bool {
        if self.can_move(orig, dest) {
            let result = self.base_user_move(orig, dest);
            if result.is_played() {
                let meta = MoveMeta {
                    premove: false,
                    ctrl_key: self.ctrl_key,
                    captured: result.captured(),
                };
                self.unselect();
                self.host.on_move_after(orig, dest, meta);
                return true;
            }
        } else if self.can_premove(orig, dest) {
            self.set_premove(orig, dest);
            self.unselect();
            return true;
        }
        self.unselect();
        false
    }

    pub(crate) fn drop_new_piece(&mut self, piece: Piece, dest: Square, force: bool) {
        if self.can_drop_piece(piece, dest) || force {
            if self.base_new_piece(piece, dest, force) {
                self.host.on_new_piece_after(
                    piece.role,
                    dest,
                    DropMeta {
                        premove: false,
                        predrop: false,
                    },
                );
            }
        } else if self.can_predrop_piece(piece, dest) {
            self.set_predrop(piece.role, dest);
        } else {
            self.unset_premove();
            self.unset_predrop();
        }
        self.unselect();
    }

    /// Programmatic move, animated. Does not pass the turn.
    pub fn move_piece(&mut self, orig: Square, dest: Square) -> MoveResult {
        self.with_animation(|c| c.base_move(orig, dest))
    }

    /// Programmatic drop, animated.
    pub fn new_piece(&mut self, piece: Piece, dest: Square) -> bool {
        self.with_animation(|c| c.base_new_piece(piece, dest, false))
    }

    /// Sparse placement patch, animated.
    pub fn set_pieces(&mut self, changes: Vec<(Square, Option<Piece>)>) {
        self.with_animation(|c| c.board.set_pieces(&changes));
    }

    /// Wholesale placement replacement, animated.
    pub fn set_fen(&mut self, fen: &str) {
        self.with_animation(|c| c.board.set_fen(fen));
    }

    // ------------------------------------------------------------------
    // Premove / predrop queues
    // ------------------------------------------------------------------

    fn set_premove(&mut self, orig: Square, dest: Square) {
        self.unset_predrop();
        self.board.set_premove(orig, dest);
        debug!(%orig, %dest, "premove queued");
        self.host.on_premove_set(orig, dest);
    }

    pub(crate) fn unset_premove(&mut self) {
        if self.board.unset_premove() {
            debug!("premove cleared");
            self.host.on_premove_unset();
        }
    }

    fn set_predrop(&mut self, role: Role, square: Square) {
        self.unset_premove();
        self.board.set_predrop(role, square);
        debug!(?role, %square, "predrop queued");
        self.host.on_predrop_set(role, square);
    }

    pub(crate) fn unset_predrop(&mut self) {
        if self.board.unset_predrop() {
            debug!("predrop cleared");
            self.host.on_predrop_unset();
        }
    }

    /// Attempts the queued premove through the ordinary commit path. The
    /// queue entry is consumed either way; a failed attempt is discarded,
    /// never retried.
    pub fn play_premove(&mut self) -> bool {
        if self.board.premove.is_none() {
            return false;
        }
        let played = self.with_animation(|c| {
            let Some((orig, dest)) = c.board.premove else {
                return false;
            };
            let mut success = false;
            if c.can_move(orig, dest) {
                let result = c.base_user_move(orig, dest);
                if result.is_played() {
                    debug!(%orig, %dest, "premove played");
                    c.host.on_move_after(
                        orig,
                        dest,
                        MoveMeta {
                            premove: true,
                            ctrl_key: false,
                            captured: result.captured(),
                        },
                    );
                    success = true;
                }
            }
            c.unset_premove();
            success
        });
        if !played {
            // nothing moved; redraw to clear the stale premove highlight
            self.host.schedule_redraw();
        }
        played
    }

    /// Attempts the queued predrop, if `validate` accepts it. The queue
    /// entry is consumed either way.
    pub fn play_predrop(&mut self, validate: impl FnOnce(Predrop) -> bool) -> bool {
        let Some(drop) = self.board.predrop else {
            return false;
        };
        let mut success = false;
        if validate(drop) {
            if let Some(color) = self.config.movable.side.exact_color() {
                let piece = Piece::new(color, drop.role);
                if self.base_new_piece(piece, drop.square, false) {
                    debug!(role = ?drop.role, square = %drop.square, "predrop played");
                    self.host.on_new_piece_after(
                        drop.role,
                        drop.square,
                        DropMeta {
                            premove: false,
                            predrop: true,
                        },
                    );
                    success = true;
                }
            }
        }
        self.unset_predrop();
        self.host.schedule_redraw();
        success
    }

    pub fn cancel_premove(&mut self) {
        self.unset_premove();
        self.host.schedule_redraw();
    }

    pub fn cancel_predrop(&mut self) {
        self.unset_predrop();
        self.host.schedule_redraw();
    }

    pub(crate) fn cancel_move_inner(&mut self) {
        self.unset_premove();
        self.unset_predrop();
        self.unselect();
    }

    /// Abandons every in-flight session: queues, selection, drag.
    /// Idempotent.
    pub fn cancel_move(&mut self) {
        self.cancel_move_inner();
        self.drag_cancel();
        self.host.schedule_redraw();
    }

    /// Clears all turn-bound state without touching the placement.
    pub fn stop(&mut self) {
        debug!("stopping interaction");
        self.config.movable.side = MovableSide::None;
        self.config.movable.dests = None;
        self.animation = None;
        self.cancel_move_inner();
        self.drag_cancel();
        self.host.schedule_redraw();
    }

    pub fn toggle_orientation(&mut self) {
        self.board.toggle_orientation();
        self.premove_dests = None;
        self.animation = None;
        self.drag = None;
        self.host.drag_ended();
        self.host.schedule_redraw();
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Applies a partial update. A placement change animates; everything
    /// else redraws once.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(orientation) = patch.orientation {
            if orientation != self.board.orientation {
                self.toggle_orientation();
            }
        }
        if patch.fen.is_some() {
            self.with_animation(|c| c.configure(patch));
        } else {
            self.configure(patch);
            self.host.schedule_redraw();
        }
    }

    fn configure(&mut self, patch: ConfigPatch) {
        self.config.apply(&patch);
        if let Some(fen) = &patch.fen {
            self.board.set_fen(fen);
            // a new position invalidates user drawings unless resupplied
            if patch.drawable.shapes.is_none() {
                self.config.drawable.shapes.clear();
            }
        }
        if let Some(turn) = patch.turn {
            self.board.turn = turn;
        }
        match patch.check {
            Some(CheckPatch::Off) => self.board.set_check(None),
            Some(CheckPatch::CurrentTurn) => {
                let turn = self.board.turn;
                self.board.set_check(Some(turn));
            }
            Some(CheckPatch::Color(color)) => self.board.set_check(Some(color)),
            None => {}
        }
        match patch.last_move {
            Some(LastMovePatch::Clear) => self.board.last_move = None,
            Some(LastMovePatch::Move { orig, dest }) => {
                self.board.last_move = Some(LastMove::Move { orig, dest })
            }
            Some(LastMovePatch::Drop { dest }) => {
                self.board.last_move = Some(LastMove::Drop { dest })
            }
            None => {}
        }
        // recompute cached premove destinations against the new state
        if let Some(selected) = self.board.selected {
            self.set_selected(selected);
        }
        self.fix_rook_castle_dests();
    }

    /// Wholesale destination-map replacement, the per-move resupply path.
    pub fn set_dests(&mut self, dests: Option<DestsMap>) {
        self.config.movable.dests = dests;
        self.fix_rook_castle_dests();
        self.host.schedule_redraw();
    }

    /// With `rook_castle` off, a supplied corner destination that doubles a
    /// standard castle destination is dropped from the king's entry.
    fn fix_rook_castle_dests(&mut self) {
        if self.config.movable.rook_castle {
            return;
        }
        let Some(color) = self.config.movable.side.exact_color() else {
            return;
        };
        let rank = color.home_rank();
        let king_sq = Square::new(4, rank);
        if !self
            .board
            .piece_at(king_sq)
            .is_some_and(|p| p.role == Role::King)
        {
            return;
        }
        let Some(dests) = &mut self.config.movable.dests else {
            return;
        };
        let Some(king_dests) = dests.get(&king_sq).cloned() else {
            return;
        };
        let corner_a = Square::new(0, rank);
        let castle_c = Square::new(2, rank);
        let corner_h = Square::new(7, rank);
        let castle_g = Square::new(6, rank);
        let filtered: HashSet<Square> = king_dests
            .iter()
            .copied()
            .filter(|&d| {
                !(d == corner_a && king_dests.contains(&castle_c))
                    && !(d == corner_h && king_dests.contains(&castle_g))
            })
            .collect();
        dests.insert(king_sq, filtered);
    }

    // ------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------

    pub fn shapes(&self) -> &[Shape] {
        &self.config.drawable.shapes
    }

    /// Wholesale replacement of user shapes.
    pub fn set_shapes(&mut self, shapes: Vec<Shape>) {
        self.config.drawable.shapes = shapes;
        self.host.schedule_redraw();
    }

    /// Wholesale replacement of program shapes.
    pub fn set_auto_shapes(&mut self, shapes: Vec<Shape>) {
        self.config.drawable.auto_shapes = shapes;
        self.host.schedule_redraw();
    }

    // ------------------------------------------------------------------
    // Drop mode
    // ------------------------------------------------------------------

    /// Arms or disarms click-to-drop for a piece in hand.
    pub fn set_drop_mode(&mut self, piece: Option<Piece>) {
        self.drop_mode = piece;
    }

    fn drop_mode_click(&mut self, ev: PointerInput) {
        let Some(piece) = self.drop_mode else {
            return;
        };
        self.unset_premove();
        self.unset_predrop();
        if let Some(point) = ev.point {
            if let Some(dest) = self.square_at(point) {
                self.drop_new_piece(piece, dest, false);
            }
        }
        self.host.schedule_redraw();
    }

    // ------------------------------------------------------------------
    // Pointer routing
    // ------------------------------------------------------------------

    pub(crate) fn as_white(&self) -> bool {
        self.board.orientation == Color::White
    }

    /// The square containing a screen point, `None` outside the board.
    pub fn square_at(&mut self, point: Point) -> Option<Square> {
        let bounds = self.host.bounds();
        coords::square_at(point, self.as_white(), bounds)
    }

    fn press_starts_drawing(&mut self, ev: PointerInput) -> bool {
        if !self.config.drawable.enabled || self.board.selected.is_some() {
            return false;
        }
        let Some(point) = ev.point else {
            return false;
        };
        match self.square_at(point) {
            // an empty or ineligible square cannot begin a move gesture
            Some(sq) => !(self.is_movable(sq) || self.is_premovable(sq)),
            None => false,
        }
    }

    /// Entry point for press events. An active session swallows the press
    /// as a cancel; shift/right presses draw; everything else selects,
    /// drags, or click-drops.
    pub fn pointer_down(&mut self, ev: PointerInput) {
        if self.drag.is_some() {
            self.drag_cancel();
        } else if self.draw.is_some() {
            self.draw_cancel();
        } else if ev.modifiers.shift || ev.button == PointerButton::Right {
            if self.config.drawable.enabled {
                self.draw_start(ev);
            }
        } else if !self.config.view_only {
            if self.drop_mode.is_some() {
                self.drop_mode_click(ev);
            } else if self.press_starts_drawing(ev) {
                self.draw_start(ev);
            } else {
                self.drag_start(ev);
            }
        }
    }

    pub fn pointer_move(&mut self, ev: PointerInput) {
        if self.draw.is_some() {
            if self.config.drawable.enabled {
                self.draw_move(ev);
            }
        } else if !self.config.view_only {
            self.drag_move(ev);
        }
    }

    pub fn pointer_up(&mut self, ev: PointerInput) {
        if self.draw.is_some() {
            if self.config.drawable.enabled {
                self.draw_end();
            }
        } else if !self.config.view_only {
            self.drag_end(ev);
        }
    }

    // ------------------------------------------------------------------
    // Frames
    // ------------------------------------------------------------------

    pub(crate) fn arm(&mut self, task: FrameTask) {
        if self.tasks.arm(task) {
            self.host.request_frame();
        }
    }

    /// Host callback for a granted animation frame.
    pub fn on_frame(&mut self, now: f64) {
        let frame = self.tasks.take_frame();
        if frame.runs(FrameTask::Animation) {
            self.animation_step(now);
        }
        if frame.runs(FrameTask::DragPoll) {
            self.drag_poll();
        }
        if frame.runs(FrameTask::DrawPoll) {
            self.draw_poll();
        }
        if frame.runs(FrameTask::Explosion) {
            self.explosion_step(now);
        }
    }

    /// Runs a mutation under the animation engine: the placement before and
    /// after is diffed into a plan, and vectors ease to zero over the
    /// configured duration. With animation disabled the mutation just
    /// schedules a redraw.
    pub(crate) fn with_animation<R>(&mut self, mutation: impl FnOnce(&mut Self) -> R) -> R {
        if !self.config.animation.enabled {
            let result = mutation(self);
            self.host.schedule_redraw();
            return result;
        }
        let prev = self.board.pieces.clone();
        let result = mutation(self);
        let plan = anim::compute_plan(&prev, &self.board.pieces);
        if plan.is_empty() {
            self.host.schedule_redraw();
        } else {
            let now = self.host.now_ms();
            self.animation = Some(AnimCurrent {
                start: now,
                frequency: 1.0 / self.config.animation.duration_ms,
                plan,
            });
            self.arm(FrameTask::Animation);
        }
        result
    }

    fn animation_step(&mut self, now: f64) {
        let Some(mut current) = self.animation.take() else {
            // the animation was cancelled between frames
            self.host.redraw_now(false);
            return;
        };
        let rest = 1.0 - (now - current.start) * current.frequency;
        if rest <= 0.0 {
            self.host.redraw_now(false);
        } else {
            let eased = anim::ease(rest);
            for vector in current.plan.anims.values_mut() {
                vector.current = (vector.from.0 * eased, vector.from.1 * eased);
            }
            self.animation = Some(current);
            // skip the shape layers mid-animation
            self.host.redraw_now(true);
            self.arm(FrameTask::Animation);
        }
    }

    // ------------------------------------------------------------------
    // Explosion
    // ------------------------------------------------------------------

    /// Two-stage timed highlight on a square set.
    pub fn explode(&mut self, squares: Vec<Square>) {
        let now = self.host.now_ms();
        self.exploding = Some(Explosion {
            stage: 1,
            squares,
            stage_until: now + EXPLOSION_STAGE_MS,
        });
        self.host.schedule_redraw();
        self.arm(FrameTask::Explosion);
    }

    fn explosion_step(&mut self, now: f64) {
        let Some(mut explosion) = self.exploding.take() else {
            return;
        };
        if now >= explosion.stage_until {
            if explosion.stage == 1 {
                explosion.stage = 2;
                explosion.stage_until = now + EXPLOSION_STAGE_MS;
                self.exploding = Some(explosion);
                self.arm(FrameTask::Explosion);
            }
            self.host.schedule_redraw();
        } else {
            self.exploding = Some(explosion);
            self.arm(FrameTask::Explosion);
        }
    }
}

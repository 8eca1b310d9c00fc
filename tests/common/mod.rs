use board_core::{Piece, Role, Square};
use board_ui::{Bounds, EventSink, MoveMeta, Point, RenderAdapter, Shape};

pub const BOUNDS: Bounds = Bounds {
    left: 0.0,
    top: 0.0,
    width: 800.0,
    height: 800.0,
};

/// Recording host with a hand-cranked clock.
#[allow(dead_code)]
pub struct TestHost {
    pub clock: f64,
    pub frame_wanted: bool,
    pub scheduled_redraws: u32,
    pub immediate_redraws: u32,
    pub drag_positions: Vec<(Piece, Point)>,
    pub drag_ends: u32,
    pub moves_after: Vec<(Square, Square, MoveMeta)>,
    pub drops_after: Vec<(Role, Square)>,
    pub premoves_set: u32,
    pub premoves_unset: u32,
    pub shape_snapshots: Vec<Vec<Shape>>,
}

impl TestHost {
    pub fn new() -> TestHost {
        TestHost {
            clock: 0.0,
            frame_wanted: false,
            scheduled_redraws: 0,
            immediate_redraws: 0,
            drag_positions: Vec::new(),
            drag_ends: 0,
            moves_after: Vec::new(),
            drops_after: Vec::new(),
            premoves_set: 0,
            premoves_unset: 0,
            shape_snapshots: Vec::new(),
        }
    }
}

impl RenderAdapter for TestHost {
    fn bounds(&mut self) -> Bounds {
        BOUNDS
    }

    fn schedule_redraw(&mut self) {
        self.scheduled_redraws += 1;
    }

    fn redraw_now(&mut self, _skip_shapes: bool) {
        self.immediate_redraws += 1;
    }

    fn now_ms(&mut self) -> f64 {
        self.clock
    }

    fn request_frame(&mut self) {
        self.frame_wanted = true;
    }

    fn drag_moved(&mut self, piece: Piece, at: Point) {
        self.drag_positions.push((piece, at));
    }

    fn drag_ended(&mut self) {
        self.drag_ends += 1;
    }
}

impl EventSink for TestHost {
    fn on_move_after(&mut self, orig: Square, dest: Square, meta: MoveMeta) {
        self.moves_after.push((orig, dest, meta));
    }

    fn on_new_piece_after(&mut self, role: Role, dest: Square, _meta: board_ui::DropMeta) {
        self.drops_after.push((role, dest));
    }

    fn on_premove_set(&mut self, _orig: Square, _dest: Square) {
        self.premoves_set += 1;
    }

    fn on_premove_unset(&mut self) {
        self.premoves_unset += 1;
    }

    fn on_shapes_changed(&mut self, shapes: &[Shape]) {
        self.shape_snapshots.push(shapes.to_vec());
    }
}

/// The screen center of a square under [`BOUNDS`], white point of view.
pub fn center(key: &str) -> Point {
    let sq: Square = key.parse().unwrap();
    let (file, rank) = sq.coords();
    Point::new(
        BOUNDS.left + BOUNDS.width * file as f64 / 8.0 + BOUNDS.width / 16.0,
        BOUNDS.top + BOUNDS.height * (7 - rank) as f64 / 8.0 + BOUNDS.height / 16.0,
    )
}

pub fn sq(key: &str) -> Square {
    key.parse().unwrap()
}

/// Drain requested frames, advancing the clock 16 ms per frame.
pub fn run_frames(controller: &mut board_ui::Controller<TestHost>) {
    let mut guard = 0;
    while controller.host().frame_wanted && guard < 1000 {
        controller.host_mut().frame_wanted = false;
        controller.host_mut().clock += 16.0;
        let now = controller.host().clock;
        controller.on_frame(now);
        guard += 1;
    }
}

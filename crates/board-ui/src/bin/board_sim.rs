//! Interactive-session simulator.
//!
//! Drives a controller through a scripted game fragment (click moves, a
//! queued premove, animation frames) against a stdout host, printing the
//! board after each step. Useful for eyeballing the state machine without
//! a real rendering adapter.

use tracing::{debug, info};

use board_core::{Board, Piece, Square};
use board_ui::{
    Bounds, Config, ConfigPatch, Controller, EventSink, MovableSide, MoveMeta, Point, PointerInput,
    RenderAdapter, Shape,
};

/// Parse `--fen <placement>` from CLI args.
fn parse_fen_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--fen" {
            if let Some(fen) = args.get(i + 1) {
                return Some(fen.clone());
            }
        }
    }
    None
}

struct SimHost {
    clock: f64,
    frame_wanted: bool,
    redraws: u32,
}

impl SimHost {
    fn new() -> SimHost {
        SimHost {
            clock: 0.0,
            frame_wanted: false,
            redraws: 0,
        }
    }
}

impl RenderAdapter for SimHost {
    fn bounds(&mut self) -> Bounds {
        Bounds {
            left: 0.0,
            top: 0.0,
            width: 512.0,
            height: 512.0,
        }
    }

    fn schedule_redraw(&mut self) {
        self.redraws += 1;
    }

    fn redraw_now(&mut self, _skip_shapes: bool) {
        self.redraws += 1;
    }

    fn now_ms(&mut self) -> f64 {
        self.clock
    }

    fn request_frame(&mut self) {
        self.frame_wanted = true;
    }

    fn drag_moved(&mut self, piece: Piece, at: Point) {
        debug!(?piece, x = at.x, y = at.y, "drag visual moved");
    }

    fn drag_ended(&mut self) {}
}

impl EventSink for SimHost {
    fn on_move_after(&mut self, orig: Square, dest: Square, meta: MoveMeta) {
        info!(%orig, %dest, premove = meta.premove, "move committed");
    }

    fn on_premove_set(&mut self, orig: Square, dest: Square) {
        info!(%orig, %dest, "premove queued");
    }

    fn on_premove_unset(&mut self) {
        info!("premove queue cleared");
    }

    fn on_shapes_changed(&mut self, shapes: &[Shape]) {
        info!(count = shapes.len(), "shapes changed");
    }
}

/// The screen center of a square under the sim host's bounds.
fn center(controller: &mut Controller<SimHost>, key: &str) -> Point {
    let sq: Square = key.parse().expect("valid square key");
    let bounds = controller.host_mut().bounds();
    let (file, rank) = sq.coords();
    Point::new(
        bounds.left + bounds.width * file as f64 / 8.0 + bounds.width / 16.0,
        bounds.top + bounds.height * (7 - rank) as f64 / 8.0 + bounds.height / 16.0,
    )
}

fn click(controller: &mut Controller<SimHost>, key: &str) {
    let at = center(controller, key);
    controller.pointer_down(PointerInput::mouse(at));
    controller.pointer_up(PointerInput::mouse(at));
    run_frames(controller);
}

/// Drain requested animation frames, advancing the synthetic clock.
fn run_frames(controller: &mut Controller<SimHost>) {
    while controller.host().frame_wanted {
        controller.host_mut().frame_wanted = false;
        controller.host_mut().clock += 16.0;
        let now = controller.host().clock;
        controller.on_frame(now);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let board = match parse_fen_arg() {
        Some(fen) => Board::from_fen(&fen),
        None => Board::start(),
    };

    let config = Config::default();
    let mut controller = Controller::with_board(board, config, SimHost::new());
    controller.apply(ConfigPatch {
        movable: board_ui::config::MovablePatch {
            side: Some(MovableSide::White),
            ..Default::default()
        },
        ..Default::default()
    });

    info!(fen = %controller.fen(), "initial position");

    // white moves by tap-tap
    click(&mut controller, "e2");
    click(&mut controller, "e4");
    info!(fen = %controller.fen(), turn = ?controller.board().turn, "after 1. e4");

    // black to move; white stages a premove
    click(&mut controller, "g1");
    click(&mut controller, "f3");
    info!(premove = ?controller.board().premove, "queued");

    // the opponent's reply arrives
    controller.move_piece("e7".parse()?, "e5".parse()?);
    run_frames(&mut controller);
    controller.apply(ConfigPatch {
        turn: Some(board_core::Color::White),
        ..Default::default()
    });
    info!(fen = %controller.fen(), "after 1... e5");

    // the queued premove now plays through the ordinary commit path
    let played = controller.play_premove();
    run_frames(&mut controller);
    info!(played, fen = %controller.fen(), "after premove attempt");

    info!(
        redraws = controller.host().redraws,
        "simulation finished"
    );
    Ok(())
}

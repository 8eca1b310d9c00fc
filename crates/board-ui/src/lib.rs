//! Interaction shell for an embeddable chess-board component: typed
//! configuration, the pointer-driven controller, drag and draw sessions,
//! and the animation-diff engine.
//!
//! Rendering and chess rules stay host-side: the [`Host`] trait supplies
//! bounds, redraws, a clock and frame callbacks, while legal destinations
//! arrive through the config as a plain map (see [`rules`] for a
//! `shakmaty`-backed source, behind the `shakmaty` feature).

pub mod adapter;
pub mod anim;
pub mod config;
pub mod controller;
pub mod coords;
pub mod drag;
pub mod draw;
pub mod events;
#[cfg(feature = "shakmaty")]
pub mod rules;
pub mod scheduler;

pub use adapter::{Bounds, DropMeta, EventSink, Host, MoveMeta, RenderAdapter};
pub use anim::{AnimCurrent, AnimPlan, AnimVector};
pub use config::{
    Brush, CheckPatch, Config, ConfigPatch, DestsMap, LastMovePatch, MovableSide, Shape,
};
pub use controller::{Controller, Explosion};
pub use drag::{DragOrigin, DragSession};
pub use draw::DrawSession;
pub use events::{Modifiers, Point, PointerButton, PointerInput};

//! Typed component configuration and its patch structure.
//!
//! Updates arrive as a [`ConfigPatch`]: a tree of optional fields mirroring
//! [`Config`]. Absent fields leave the current value untouched, present
//! fields overwrite it. Destination maps and shape lists are replaced
//! wholesale, never merged. There is no dynamic recursive merge anywhere.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use board_core::{Color, Square};

/// Per-origin legal destinations, supplied by the external rules provider.
pub type DestsMap = HashMap<Square, HashSet<Square>>;

/// Which side the local player may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovableSide {
    White,
    Black,
    Both,
    None,
}

impl MovableSide {
    /// Exactly this color (never matches `Both`).
    pub fn is_exactly(self, color: Color) -> bool {
        matches!(
            (self, color),
            (MovableSide::White, Color::White) | (MovableSide::Black, Color::Black)
        )
    }

    pub fn exact_color(self) -> Option<Color> {
        match self {
            MovableSide::White => Some(Color::White),
            MovableSide::Black => Some(Color::Black),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brush {
    Green,
    Red,
    Blue,
    Yellow,
}

/// A persistent annotation: a circle (`dest` absent) or an arrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub orig: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<Square>,
    pub brush: Brush,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovableConfig {
    /// Accept every move without consulting `dests`.
    pub free: bool,
    pub side: MovableSide,
    /// Legal destinations for the side to move; invalidated by every
    /// committed move and resupplied by the caller.
    pub dests: Option<DestsMap>,
    pub show_dests: bool,
    /// Keep the rook's own square as a castling destination.
    pub rook_castle: bool,
}

impl Default for MovableConfig {
    fn default() -> MovableConfig {
        MovableConfig {
            free: true,
            side: MovableSide::Both,
            dests: None,
            show_dests: true,
            rook_castle: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PremovableConfig {
    pub enabled: bool,
    pub show_dests: bool,
    /// Offer castling premoves.
    pub castle: bool,
    /// Skip every occupancy restriction in the premove engine.
    pub unrestricted: bool,
    /// Externally supplied premove destinations, overriding the engine.
    pub custom_dests: Option<DestsMap>,
}

impl Default for PremovableConfig {
    fn default() -> PremovableConfig {
        PremovableConfig {
            enabled: true,
            show_dests: true,
            castle: true,
            unrestricted: false,
            custom_dests: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredroppableConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraggableConfig {
    pub enabled: bool,
    /// Pixels of movement before a drag activates.
    pub distance: f64,
    /// Skip the distance threshold once a drag gesture has been observed.
    pub auto_distance: bool,
    pub show_ghost: bool,
    /// Dragging a piece off the board deletes it.
    pub delete_on_drop_off: bool,
}

impl Default for DraggableConfig {
    fn default() -> DraggableConfig {
        DraggableConfig {
            enabled: true,
            distance: 3.0,
            auto_distance: true,
            show_ghost: true,
            delete_on_drop_off: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectableConfig {
    pub enabled: bool,
}

impl Default for SelectableConfig {
    fn default() -> SelectableConfig {
        SelectableConfig { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawableConfig {
    pub enabled: bool,
    /// A press on an empty square erases all shapes.
    pub erase_on_click: bool,
    /// New arrows snap to queen/knight lines from their origin.
    pub default_snap_to_valid_move: bool,
    pub shapes: Vec<Shape>,
    /// Program-supplied shapes (engine arrows and the like), kept apart
    /// from user drawings.
    pub auto_shapes: Vec<Shape>,
}

impl Default for DrawableConfig {
    fn default() -> DrawableConfig {
        DrawableConfig {
            enabled: true,
            erase_on_click: true,
            default_snap_to_valid_move: true,
            shapes: Vec::new(),
            auto_shapes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub enabled: bool,
    pub duration_ms: f64,
}

impl Default for AnimationConfig {
    fn default() -> AnimationConfig {
        AnimationConfig {
            enabled: true,
            duration_ms: 200.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub last_move: bool,
    pub check: bool,
}

impl Default for HighlightConfig {
    fn default() -> HighlightConfig {
        HighlightConfig {
            last_move: true,
            check: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub view_only: bool,
    pub auto_castle: bool,
    /// Accept synthetic pointer events too.
    pub trust_all_events: bool,
    pub movable: MovableConfig,
    pub premovable: PremovableConfig,
    pub predroppable: PredroppableConfig,
    pub draggable: DraggableConfig,
    pub selectable: SelectableConfig,
    pub drawable: DrawableConfig,
    pub animation: AnimationConfig,
    pub highlight: HighlightConfig,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            view_only: false,
            auto_castle: true,
            trust_all_events: false,
            movable: MovableConfig::default(),
            premovable: PremovableConfig::default(),
            predroppable: PredroppableConfig::default(),
            draggable: DraggableConfig::default(),
            selectable: SelectableConfig::default(),
            drawable: DrawableConfig::default(),
            animation: AnimationConfig::default(),
            highlight: HighlightConfig::default(),
        }
    }
}

/// Board-level check update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckPatch {
    Off,
    /// Flag the king of the side to move.
    CurrentTurn,
    Color(Color),
}

/// Board-level last-move update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LastMovePatch {
    Clear,
    Move { orig: Square, dest: Square },
    Drop { dest: Square },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovablePatch {
    pub free: Option<bool>,
    pub side: Option<MovableSide>,
    /// Wholesale replacement; `Some(None)` clears the map.
    pub dests: Option<Option<DestsMap>>,
    pub show_dests: Option<bool>,
    pub rook_castle: Option<bool>,
}

impl MovablePatch {
    fn apply_to(&self, cfg: &mut MovableConfig) {
        if let Some(v) = self.free {
            cfg.free = v;
        }
        if let Some(v) = self.side {
            cfg.side = v;
        }
        if let Some(v) = &self.dests {
            cfg.dests = v.clone();
        }
        if let Some(v) = self.show_dests {
            cfg.show_dests = v;
        }
        if let Some(v) = self.rook_castle {
            cfg.rook_castle = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PremovablePatch {
    pub enabled: Option<bool>,
    pub show_dests: Option<bool>,
    pub castle: Option<bool>,
    pub unrestricted: Option<bool>,
    /// Wholesale replacement; `Some(None)` clears.
    pub custom_dests: Option<Option<DestsMap>>,
}

impl PremovablePatch {
    fn apply_to(&self, cfg: &mut PremovableConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
        if let Some(v) = self.show_dests {
            cfg.show_dests = v;
        }
        if let Some(v) = self.castle {
            cfg.castle = v;
        }
        if let Some(v) = self.unrestricted {
            cfg.unrestricted = v;
        }
        if let Some(v) = &self.custom_dests {
            cfg.custom_dests = v.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PredroppablePatch {
    pub enabled: Option<bool>,
}

impl PredroppablePatch {
    fn apply_to(&self, cfg: &mut PredroppableConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraggablePatch {
    pub enabled: Option<bool>,
    pub distance: Option<f64>,
    pub auto_distance: Option<bool>,
    pub show_ghost: Option<bool>,
    pub delete_on_drop_off: Option<bool>,
}

impl DraggablePatch {
    fn apply_to(&self, cfg: &mut DraggableConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
        if let Some(v) = self.distance {
            cfg.distance = v;
        }
        if let Some(v) = self.auto_distance {
            cfg.auto_distance = v;
        }
        if let Some(v) = self.show_ghost {
            cfg.show_ghost = v;
        }
        if let Some(v) = self.delete_on_drop_off {
            cfg.delete_on_drop_off = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectablePatch {
    pub enabled: Option<bool>,
}

impl SelectablePatch {
    fn apply_to(&self, cfg: &mut SelectableConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawablePatch {
    pub enabled: Option<bool>,
    pub erase_on_click: Option<bool>,
    pub default_snap_to_valid_move: Option<bool>,
    /// Wholesale replacement of the user shape list.
    pub shapes: Option<Vec<Shape>>,
    /// Wholesale replacement of the program shape list.
    pub auto_shapes: Option<Vec<Shape>>,
}

impl DrawablePatch {
    fn apply_to(&self, cfg: &mut DrawableConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
        if let Some(v) = self.erase_on_click {
            cfg.erase_on_click = v;
        }
        if let Some(v) = self.default_snap_to_valid_move {
            cfg.default_snap_to_valid_move = v;
        }
        if let Some(v) = &self.shapes {
            cfg.shapes = v.clone();
        }
        if let Some(v) = &self.auto_shapes {
            cfg.auto_shapes = v.clone();
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationPatch {
    pub enabled: Option<bool>,
    pub duration_ms: Option<f64>,
}

impl AnimationPatch {
    fn apply_to(&self, cfg: &mut AnimationConfig) {
        if let Some(v) = self.enabled {
            cfg.enabled = v;
        }
        if let Some(v) = self.duration_ms {
            cfg.duration_ms = v;
        }
        // no need for such short animations
        if cfg.duration_ms < 70.0 {
            cfg.enabled = false;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPatch {
    pub last_move: Option<bool>,
    pub check: Option<bool>,
}

impl HighlightPatch {
    fn apply_to(&self, cfg: &mut HighlightConfig) {
        if let Some(v) = self.last_move {
            cfg.last_move = v;
        }
        if let Some(v) = self.check {
            cfg.check = v;
        }
    }
}

/// Partial update over the whole component: board-level fields plus every
/// config section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    /// Replace the placement from a board-description string.
    pub fen: Option<String>,
    pub orientation: Option<Color>,
    pub turn: Option<Color>,
    pub check: Option<CheckPatch>,
    pub last_move: Option<LastMovePatch>,
    pub view_only: Option<bool>,
    pub auto_castle: Option<bool>,
    pub trust_all_events: Option<bool>,
    pub movable: MovablePatch,
    pub premovable: PremovablePatch,
    pub predroppable: PredroppablePatch,
    pub draggable: DraggablePatch,
    pub selectable: SelectablePatch,
    pub drawable: DrawablePatch,
    pub animation: AnimationPatch,
    pub highlight: HighlightPatch,
}

impl Config {
    /// Applies the config sections of a patch. Board-level fields (`fen`,
    /// `turn`, `check`, ...) are the controller's concern.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(v) = patch.view_only {
            self.view_only = v;
        }
        if let Some(v) = patch.auto_castle {
            self.auto_castle = v;
        }
        if let Some(v) = patch.trust_all_events {
            self.trust_all_events = v;
        }
        patch.movable.apply_to(&mut self.movable);
        patch.premovable.apply_to(&mut self.premovable);
        patch.predroppable.apply_to(&mut self.predroppable);
        patch.draggable.apply_to(&mut self.draggable);
        patch.selectable.apply_to(&mut self.selectable);
        patch.drawable.apply_to(&mut self.drawable);
        patch.animation.apply_to(&mut self.animation);
        patch.highlight.apply_to(&mut self.highlight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    #[test]
    fn test_patch_leaves_absent_fields_alone() {
        let mut cfg = Config::default();
        cfg.movable.free = false;
        let patch = ConfigPatch {
            draggable: DraggablePatch {
                distance: Some(5.0),
                ..DraggablePatch::default()
            },
            ..ConfigPatch::default()
        };
        cfg.apply(&patch);
        assert!(!cfg.movable.free);
        assert_eq!(cfg.draggable.distance, 5.0);
        assert!(cfg.draggable.enabled);
    }

    #[test]
    fn test_dests_replace_wholesale() {
        let mut cfg = Config::default();
        let mut old: DestsMap = DestsMap::new();
        old.insert(sq("e2"), [sq("e3"), sq("e4")].into_iter().collect());
        cfg.movable.dests = Some(old);

        let mut fresh: DestsMap = DestsMap::new();
        fresh.insert(sq("d2"), [sq("d4")].into_iter().collect());
        let patch = ConfigPatch {
            movable: MovablePatch {
                dests: Some(Some(fresh)),
                ..MovablePatch::default()
            },
            ..ConfigPatch::default()
        };
        cfg.apply(&patch);
        let dests = cfg.movable.dests.as_ref().unwrap();
        assert!(!dests.contains_key(&sq("e2")));
        assert!(dests.contains_key(&sq("d2")));

        // Some(None) clears
        let patch = ConfigPatch {
            movable: MovablePatch {
                dests: Some(None),
                ..MovablePatch::default()
            },
            ..ConfigPatch::default()
        };
        cfg.apply(&patch);
        assert!(cfg.movable.dests.is_none());
    }

    #[test]
    fn test_short_animation_disables_engine() {
        let mut cfg = Config::default();
        let patch = ConfigPatch {
            animation: AnimationPatch {
                duration_ms: Some(40.0),
                ..AnimationPatch::default()
            },
            ..ConfigPatch::default()
        };
        cfg.apply(&patch);
        assert!(!cfg.animation.enabled);
    }

    #[test]
    fn test_patch_roundtrips_through_json() {
        let patch = ConfigPatch {
            fen: Some("start".to_string()),
            turn: Some(Color::Black),
            check: Some(CheckPatch::CurrentTurn),
            last_move: Some(LastMovePatch::Move {
                orig: sq("e2"),
                dest: sq("e4"),
            }),
            ..ConfigPatch::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        let back: ConfigPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back.fen.as_deref(), Some("start"));
        assert_eq!(back.turn, Some(Color::Black));
        assert_eq!(back.check, Some(CheckPatch::CurrentTurn));
    }
}

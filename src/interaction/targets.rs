//! On-screen hit-test targets
//!
//! The overlay owns the actual views; the state machine only needs each
//! target's current screen rectangle, obtained through [`HitTest`].

use crate::geometry::{Position, Rect};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Menu buttons, in hit-test priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selector {
    Tap,
    Slide,
    Drag,
    Dismiss,
    Move,
}

impl Selector {
    /// Registration order; the first selector hit wins when rectangles overlap
    pub const ALL: [Selector; 5] = [
        Selector::Tap,
        Selector::Slide,
        Selector::Drag,
        Selector::Dismiss,
        Selector::Move,
    ];
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Tap => write!(f, "tap"),
            Selector::Slide => write!(f, "slide"),
            Selector::Drag => write!(f, "drag"),
            Selector::Dismiss => write!(f, "dismiss"),
            Selector::Move => write!(f, "move"),
        }
    }
}

/// Named UI target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "selector", rename_all = "camelCase")]
pub enum TargetId {
    /// Always-visible zone that reveals the menu
    Reveal,
    /// The menu panel holding the selectors
    Panel,
    Selector(Selector),
}

/// Source of target geometry
///
/// `None` means the target is not laid out right now; callers treat that as
/// "not hit".
pub trait HitTest: Send + Sync {
    fn bounds(&self, target: TargetId) -> Option<Rect>;
}

/// True when a cursor glyph of `glyph` size at `cursor` overlaps `target`
pub fn cursor_hits(hit_test: &dyn HitTest, target: TargetId, cursor: Position, glyph: (f64, f64)) -> bool {
    let glyph_rect = Rect::at(cursor, glyph.0, glyph.1);
    hit_test
        .bounds(target)
        .map(|bounds| bounds.intersects(&glyph_rect))
        .unwrap_or(false)
}

/// Thread-safe table of target rectangles
///
/// The overlay writes into it whenever views are laid out or moved; the
/// state machine reads it on every sample.
#[derive(Debug, Default)]
pub struct TargetLayout {
    targets: RwLock<HashMap<TargetId, Rect>>,
}

impl TargetLayout {
    /// Create an empty layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layout from target rectangles
    pub fn from_entries(entries: impl IntoIterator<Item = (TargetId, Rect)>) -> Self {
        Self {
            targets: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Insert or replace the rectangle of `target`
    pub fn set(&self, target: TargetId, bounds: Rect) {
        self.targets.write().insert(target, bounds);
    }

    /// Shift the panel and every selector so the panel's origin lands on `origin`
    pub fn move_panel_to(&self, origin: Position) {
        let mut targets = self.targets.write();
        let Some(panel) = targets.get(&TargetId::Panel).copied() else {
            return;
        };
        let dx = origin.x - panel.x;
        let dy = origin.y - panel.y;
        for (id, rect) in targets.iter_mut() {
            if matches!(id, TargetId::Panel | TargetId::Selector(_)) {
                rect.x += dx;
                rect.y += dy;
            }
        }
    }
}

impl HitTest for TargetLayout {
    fn bounds(&self, target: TargetId) -> Option<Rect> {
        self.targets.read().get(&target).copied()
    }
}

//! Collaborators the session reports to: the overlay UI and the volume control

use crate::geometry::Position;
use crate::interaction::targets::TargetLayout;
use serde::{Deserialize, Serialize};

/// Visual side of the state machine
///
/// All methods are called from the sampling task and must not block. The
/// defaults ignore the notification.
pub trait OverlayFeedback: Send + Sync {
    /// Cursor glyph moved
    fn cursor_moved(&self, _at: Position) {}

    fn panel_visible(&self, _visible: bool) {}

    /// Show the slide start marker, or hide it with `None`
    fn marker(&self, _at: Option<Position>) {}

    /// Dwell progress in [0, 1]
    fn dwell_progress(&self, _fraction: f32) {}

    /// Move the panel's top-left corner
    fn move_panel(&self, _origin: Position) {}

    fn dwell_completed(&self) {}

    /// The user selected the dismiss button
    fn close_requested(&self) {}
}

/// Overlay that ignores everything
#[derive(Debug, Default)]
pub struct NullOverlay;

impl OverlayFeedback for NullOverlay {}

/// Without real views, moving the panel means moving its hit-test rectangles
impl OverlayFeedback for TargetLayout {
    fn move_panel(&self, origin: Position) {
        self.move_panel_to(origin);
    }

    fn close_requested(&self) {
        tracing::info!("Overlay close requested");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeDirection {
    Up,
    Down,
}

/// Media volume, adjusted one step at a time
pub trait VolumeControl: Send + Sync {
    fn adjust(&self, direction: VolumeDirection);
}

//! Discrete interaction intents and the commands that carry them to the executor

use crate::geometry::Position;
use serde::{Deserialize, Serialize};

/// A fully resolved interaction intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Single touch at a point
    Tap { at: Position },
    /// One continuous stroke between two points
    Slide { from: Position, to: Position },
    /// Next point of a drag; consecutive drags extend the same contact
    Drag { at: Position },
    /// Two-finger positions; paired with the previous zoom to form two strokes
    Zoom { first: Position, second: Position },
}

impl Action {
    /// Create a tap action
    pub fn tap(at: Position) -> Self {
        Action::Tap { at }
    }

    /// Create a slide action
    pub fn slide(from: Position, to: Position) -> Self {
        Action::Slide { from, to }
    }

    /// Create a drag step action
    pub fn drag(at: Position) -> Self {
        Action::Drag { at }
    }

    /// Create a two-finger zoom action
    pub fn zoom(first: Position, second: Position) -> Self {
        Action::Zoom { first, second }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::Tap { .. } => "tap",
            Action::Slide { .. } => "slide",
            Action::Drag { .. } => "drag",
            Action::Zoom { .. } => "zoom",
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        match *self {
            Action::Tap { at } | Action::Drag { at } => vec![at],
            Action::Slide { from, to } => vec![from, to],
            Action::Zoom { first, second } => vec![first, second],
        }
    }

    /// True when every coordinate is a finite number
    pub fn is_resolved(&self) -> bool {
        self.positions().iter().all(Position::is_finite)
    }
}

/// Item of the action queue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    Run { action: Action },
    /// Release the open drag contact at the given point
    TerminateDrag { at: Position },
    /// Forget the stored zoom anchor
    TerminateZoom,
}

impl Command {
    /// Wrap an action for the queue
    pub fn run(action: Action) -> Self {
        Command::Run { action }
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Command::Run { action }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Run { action } => write!(f, "{}", action.name()),
            Command::TerminateDrag { .. } => write!(f, "terminate-drag"),
            Command::TerminateZoom => write!(f, "terminate-zoom"),
        }
    }
}

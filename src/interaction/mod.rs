//! Dwell-based intent selection
//!
//! Decides, from cursor positions and the overlay's target rectangles, which
//! interaction the user wants and when to commit it.

pub mod machine;
pub mod targets;

pub use machine::{Effect, InteractionMachine, InteractionState};
pub use targets::{HitTest, Selector, TargetId, TargetLayout};

//! Input capture
//!
//! This module provides the tracking sources that feed the session.

pub mod tracking;

// Re-export tracking types
pub use tracking::{ChannelTrackingSource, ReplayScript, ReplayTrackingSource, TrackingSample, TrackingSource};

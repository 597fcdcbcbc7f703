//! Hand tracking input
//!
//! The landmark detector itself lives outside this crate; it delivers
//! normalized positions through a [`TrackingSource`]. A replay source plays
//! back recorded sessions for demos and tests.

pub mod replay;
pub mod source;
pub mod types;

pub use replay::{ReplayError, ReplayScript, ReplayTrackingSource};
pub use source::{ChannelTrackingSource, TrackingSource};
pub use types::TrackingSample;

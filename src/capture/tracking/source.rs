//! Tracking source trait
//!
//! Defines the interface to the hand tracking pipeline that feeds the
//! session with landmark positions.

use crate::capture::tracking::types::TrackingSample;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Producer of tracking samples
///
/// Samples are delivered in order and never twice. `next_sample` must be
/// cancel-safe: the session polls it inside `select!` and may drop the
/// future before it completes.
#[async_trait]
pub trait TrackingSource: Send {
    /// Source identifier for logging (e.g. "camera", "replay")
    fn id(&self) -> &str;

    /// Wait for the next sample; `None` once the source is exhausted
    async fn next_sample(&mut self) -> Option<TrackingSample>;
}

/// Source fed through an mpsc channel by an external tracker
pub struct ChannelTrackingSource {
    id: String,
    rx: mpsc::Receiver<TrackingSample>,
}

impl ChannelTrackingSource {
    /// Create a source and the sender the tracker pushes samples into
    pub fn new(capacity: usize) -> (mpsc::Sender<TrackingSample>, Self) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            tx,
            Self {
                id: "channel".to_string(),
                rx,
            },
        )
    }
}

#[async_trait]
impl TrackingSource for ChannelTrackingSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_sample(&mut self) -> Option<TrackingSample> {
        self.rx.recv().await
    }
}

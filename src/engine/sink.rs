//! Gesture sink trait
//!
//! Defines the interface to the OS input layer that performs synthesized
//! gestures (an accessibility service, a virtual input device, a test double).

use crate::engine::gesture::Gesture;
use async_trait::async_trait;
use parking_lot::Mutex as ParkingMutex;
use thiserror::Error;
use tokio::time::Instant;

/// Errors reported by a gesture sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The OS refused this particular gesture; later gestures may still succeed
    #[error("Gesture rejected: {0}")]
    Rejected(String),

    /// The connection to the input layer is gone; the session cannot continue
    #[error("Gesture sink disconnected")]
    Disconnected,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Receiver of synthesized gestures
///
/// The executor never dispatches a new gesture before the previous one's
/// duration has elapsed, so implementations do not need their own queueing.
#[async_trait]
pub trait GestureSink: Send + Sync {
    /// Hand one gesture to the input layer
    async fn dispatch(&self, gesture: &Gesture) -> SinkResult<()>;
}

/// Sink that only logs what it is given
#[derive(Debug, Default)]
pub struct LoggingSink;

#[async_trait]
impl GestureSink for LoggingSink {
    async fn dispatch(&self, gesture: &Gesture) -> SinkResult<()> {
        for stroke in &gesture.strokes {
            tracing::info!(
                "Stroke {} path={:?} duration={:?} continues={} continuation_of={:?}",
                stroke.handle,
                stroke.path,
                stroke.duration,
                stroke.continues,
                stroke.continuation_of.map(|h| h.to_string())
            );
        }
        Ok(())
    }
}

/// A gesture together with the instant it reached the sink
#[derive(Debug, Clone)]
pub struct DispatchRecord {
    pub gesture: Gesture,
    pub at: Instant,
}

/// Sink that keeps every dispatched gesture in memory
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: ParkingMutex<Vec<DispatchRecord>>,
    fail_with: ParkingMutex<Option<SinkError>>,
}

impl RecordingSink {
    /// Create a new sink that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following dispatch fail with `error` (None restores success)
    pub fn fail_with(&self, error: Option<SinkError>) {
        *self.fail_with.lock() = error;
    }

    /// Get every dispatch so far, oldest first
    pub fn records(&self) -> Vec<DispatchRecord> {
        self.records.lock().clone()
    }

    /// Get the dispatched gestures without timestamps
    pub fn gestures(&self) -> Vec<Gesture> {
        self.records.lock().iter().map(|r| r.gesture.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl GestureSink for RecordingSink {
    async fn dispatch(&self, gesture: &Gesture) -> SinkResult<()> {
        if let Some(error) = self.fail_with.lock().clone() {
            return Err(error);
        }
        self.records.lock().push(DispatchRecord {
            gesture: gesture.clone(),
            at: Instant::now(),
        });
        Ok(())
    }
}

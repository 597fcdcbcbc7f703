//! Recorded tracking sessions
//!
//! A replay script bundles the display geometry, the overlay layout and a
//! list of timestamped samples, so a session can be driven without a camera.

use crate::capture::tracking::source::TrackingSource;
use crate::capture::tracking::types::TrackingSample;
use crate::geometry::{DisplayGeometry, Orientation, Rect, ScreenSize};
use crate::interaction::targets::{TargetId, TargetLayout};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Errors that can occur while loading a replay script
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Sample {index} is older than the sample before it")]
    OutOfOrder { index: usize },
}

/// Result type for replay operations
pub type ReplayResult<T> = Result<T, ReplayError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetEntry {
    pub target: TargetId,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    pub screen: ScreenSize,
    #[serde(default)]
    pub orientation: Orientation,
    pub targets: Vec<TargetEntry>,
    pub samples: Vec<TrackingSample>,
}

impl ReplayScript {
    /// Load and validate a script from a JSON file
    pub fn load(path: &Path) -> ReplayResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let script: ReplayScript = serde_json::from_str(&content)?;
        script.validate()?;
        Ok(script)
    }

    /// Samples must be in delivery order
    pub fn validate(&self) -> ReplayResult<()> {
        for (index, pair) in self.samples.windows(2).enumerate() {
            if pair[1].process_time_ms < pair[0].process_time_ms {
                return Err(ReplayError::OutOfOrder { index: index + 1 });
            }
        }
        Ok(())
    }

    /// Display geometry the script was recorded on
    pub fn geometry(&self) -> DisplayGeometry {
        DisplayGeometry::new(self.screen, self.orientation)
    }

    /// Build the hit-test layout from the script's targets
    pub fn layout(&self) -> TargetLayout {
        TargetLayout::from_entries(self.targets.iter().map(|e| (e.target, e.bounds)))
    }
}

/// Source that plays back recorded samples at their original pace
pub struct ReplayTrackingSource {
    id: String,
    samples: Vec<TrackingSample>,
    next: usize,
    started: Option<Instant>,
}

impl ReplayTrackingSource {
    /// Create a new source over `samples`
    pub fn new(samples: Vec<TrackingSample>) -> Self {
        Self {
            id: "replay".to_string(),
            samples,
            next: 0,
            started: None,
        }
    }

    /// Samples not yet delivered
    pub fn remaining(&self) -> usize {
        self.samples.len() - self.next
    }
}

#[async_trait]
impl TrackingSource for ReplayTrackingSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn next_sample(&mut self) -> Option<TrackingSample> {
        let sample = *self.samples.get(self.next)?;
        let started = *self.started.get_or_insert_with(Instant::now);

        let offset = Duration::from_secs_f64(sample.process_time_ms.max(0.0) / 1000.0);
        tokio::time::sleep_until(started + offset).await;

        // Only advance once the sample is actually handed out
        self.next += 1;
        Some(sample)
    }
}

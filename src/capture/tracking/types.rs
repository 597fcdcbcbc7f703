use serde::{Deserialize, Serialize};

/// One hand tracking result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSample {
    /// Normalized camera-space position of the tracked landmark
    pub x: f64,
    pub y: f64,
    /// Normalized distance between the wrist and the tracked knuckle
    pub span: f64,
    /// Time in milliseconds from the start of tracking
    pub process_time_ms: f64,
}

impl TrackingSample {
    /// Create a new sample
    pub fn new(x: f64, y: f64, span: f64, process_time_ms: f64) -> Self {
        Self {
            x,
            y,
            span,
            process_time_ms,
        }
    }

    /// Normalized position as an `(x, y)` pair
    pub fn raw(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

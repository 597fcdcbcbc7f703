//! Normalized tracking position to screen cursor mapping
//!
//! The hand tracker reports positions in [0,1]×[0,1] camera space. Only a
//! band around the center of that space is used; its width shrinks as the
//! sensitivity grows, so small hand movements cover the whole screen when
//! the hand is far from the camera.

use crate::config::CursorConfig;
use crate::geometry::{DisplayGeometry, Orientation, Position};

/// Stateless mapper from raw tracking coordinates to screen pixels.
///
/// Orientation is not remembered; callers pass the current geometry with
/// every sample.
#[derive(Debug, Clone)]
pub struct CursorMapper {
    config: CursorConfig,
}

impl CursorMapper {
    /// Create a new mapper
    pub fn new(config: CursorConfig) -> Self {
        Self { config }
    }

    /// Sensitivity multiplier derived from the hand span.
    ///
    /// The span is the normalized distance between two reference landmarks
    /// (wrist to a knuckle). A larger span means the hand is closer to the
    /// camera and gets a lower multiplier.
    ///
    /// A non-finite or non-positive span carries no distance information and
    /// yields the ceiling if one is configured, the floor otherwise.
    pub fn sensitivity(&self, span: f64) -> f64 {
        let floor = self.config.min_sensitivity;
        let ceiling = self.config.max_sensitivity;
        if !span.is_finite() || span <= 0.0 {
            return ceiling.unwrap_or(floor);
        }
        // max/min rather than clamp: an inverted floor and ceiling must not panic
        let sensitivity = (1.0 / (2.0 * span)).max(floor);
        match ceiling {
            Some(ceiling) => sensitivity.min(ceiling),
            None => sensitivity,
        }
    }

    /// Map a raw normalized position to a screen position.
    ///
    /// # Arguments
    /// * `raw` - normalized `(x, y)` as reported by the tracker; out of range
    ///   values are clamped
    /// * `span` - hand span estimate used for sensitivity
    /// * `geometry` - current display size and orientation
    pub fn map(&self, raw: (f64, f64), span: f64, geometry: &DisplayGeometry) -> Position {
        let (raw_x, raw_y) = match geometry.orientation {
            Orientation::Portrait => raw,
            Orientation::Landscape => (raw.1, 1.0 - raw.0),
        };
        let norm_x = clamp_unit(raw_x);
        let norm_y = clamp_unit(raw_y);

        let sensitivity = self.sensitivity(span);
        let x = scale_axis(norm_x, geometry.size.width, sensitivity);
        let y = scale_axis(norm_y, geometry.size.height, sensitivity);

        let max_x = geometry.size.width * self.config.safe_width_fraction;
        let max_y = geometry.size.height * self.config.safe_height_fraction;

        Position::new(x.min(max_x).max(0.0), y.min(max_y).max(0.0))
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}

/// Restrict one axis to the active band and stretch it over the full dimension.
fn scale_axis(normalized: f64, dimension: f64, sensitivity: f64) -> f64 {
    let lower = dimension * (1.0 - 1.0 / sensitivity) / 2.0;
    let upper = dimension * (1.0 + 1.0 / sensitivity) / 2.0;
    let pixel = (normalized * dimension).max(lower).min(upper);
    (pixel - lower) * sensitivity
}

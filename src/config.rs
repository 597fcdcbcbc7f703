//! Engine configuration
//!
//! Every threshold the engine uses is tunable here. Values are loaded from a
//! JSON file; missing sections and fields fall back to the defaults below.

use crate::geometry::Position;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Raw tracking position to screen pixel mapping
    pub cursor: CursorConfig,
    /// Dwell timing and movement thresholds
    pub dwell: DwellConfig,
    /// Durations of synthesized strokes
    pub strokes: StrokeTimings,
    /// Finger positions used by the zoom in / zoom out shortcuts
    pub pinch: PinchPreset,
}

impl EngineConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: EngineConfig =
            serde_json::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.cursor.min_sensitivity > 0.0,
            "cursor.minSensitivity must be positive"
        );
        if let Some(max) = self.cursor.max_sensitivity {
            ensure!(
                max >= self.cursor.min_sensitivity,
                "cursor.maxSensitivity must be >= cursor.minSensitivity"
            );
        }
        for (name, value) in [
            ("cursor.safeWidthFraction", self.cursor.safe_width_fraction),
            ("cursor.safeHeightFraction", self.cursor.safe_height_fraction),
        ] {
            ensure!(
                value > 0.0 && value <= 1.0,
                "{} must be within (0, 1], got {}",
                name,
                value
            );
        }
        ensure!(self.dwell.tick_ms > 0, "dwell.tickMs must be positive");
        ensure!(
            self.dwell.required_ticks > 0,
            "dwell.requiredTicks must be positive"
        );
        for (name, value) in [
            ("dwell.hoverThresholdPx", self.dwell.hover_threshold_px),
            ("dwell.settleThresholdPx", self.dwell.settle_threshold_px),
            ("dwell.trackThresholdPx", self.dwell.track_threshold_px),
        ] {
            ensure!(value >= 0.0, "{} must not be negative", name);
        }
        Ok(())
    }
}

/// Cursor mapping configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CursorConfig {
    /// Lower bound of the sensitivity multiplier
    pub min_sensitivity: f64,
    /// Optional upper bound. Unset by default, so the multiplier follows
    /// `1 / (2 * span)` for every positive span.
    pub max_sensitivity: Option<f64>,
    /// Fraction of the screen width the cursor may reach
    pub safe_width_fraction: f64,
    /// Fraction of the screen height the cursor may reach
    pub safe_height_fraction: f64,
    /// Size of the cursor glyph used for hit-testing
    pub glyph_width: f64,
    pub glyph_height: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            min_sensitivity: 2.0,
            max_sensitivity: None,
            safe_width_fraction: 0.9,
            safe_height_fraction: 0.96,
            glyph_width: 96.0,
            glyph_height: 96.0,
        }
    }
}

/// Dwell timer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DwellConfig {
    /// Tick cadence of the dwell counter
    pub tick_ms: u64,
    /// Ticks of stillness before a dwell fires
    pub required_ticks: u32,
    /// Movement tolerated while hovering a selector
    pub hover_threshold_px: f64,
    /// Movement tolerated while picking a point (tap, slide start, drag start, panel move)
    pub settle_threshold_px: f64,
    /// Displacement that counts as a new step while sliding or dragging
    pub track_threshold_px: f64,
}

impl DwellConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            required_ticks: 30,
            hover_threshold_px: 40.0,
            settle_threshold_px: 100.0,
            track_threshold_px: 125.0,
        }
    }
}

/// Stroke durations in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StrokeTimings {
    pub tap_ms: u64,
    pub slide_ms: u64,
    /// First stroke of a drag; later continuations replace it before it ends
    pub drag_hold_ms: u64,
    pub drag_step_ms: u64,
    pub drag_release_ms: u64,
    pub zoom_ms: u64,
}

impl Default for StrokeTimings {
    fn default() -> Self {
        Self {
            tap_ms: 1,
            slide_ms: 20,
            drag_hold_ms: 1000,
            drag_step_ms: 50,
            drag_release_ms: 10,
            zoom_ms: 200,
        }
    }
}

/// Two-finger positions for the zoom shortcuts.
///
/// The second finger stays on `anchor`; the first finger travels between
/// `near` and `far`. Zooming in spreads the fingers, zooming out pinches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PinchPreset {
    pub anchor: Position,
    pub near: Position,
    pub far: Position,
}

impl Default for PinchPreset {
    fn default() -> Self {
        Self {
            anchor: Position::new(500.0, 500.0),
            near: Position::new(300.0, 300.0),
            far: Position::new(250.0, 250.0),
        }
    }
}

//! Screen-space geometry shared by the mapper, the state machine and the executor.

use serde::{Deserialize, Serialize};

/// A point in screen pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest per-axis displacement between two points.
    ///
    /// Movement thresholds are compared against this rather than the
    /// euclidean distance, so a threshold of `T` describes a square of side
    /// `2T` around the anchor.
    pub fn axis_distance(&self, other: &Position) -> f64 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Neither coordinate lies left of or above the screen origin
    pub fn is_non_negative(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle of the given size whose top-left corner is `origin`.
    pub fn at(origin: Position, width: f64, height: f64) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    /// X coordinate of the right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the two rectangles share a non-empty area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Physical orientation of the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Orientation::Portrait => write!(f, "portrait"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// Size of the display in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    /// Create a new screen size
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the size with its axes swapped if they disagree with `orientation`.
    ///
    /// Some devices report the pre-rotation size right after a configuration
    /// change; portrait must be taller than wide and landscape wider than tall.
    pub fn oriented(self, orientation: Orientation) -> Self {
        let swapped = match orientation {
            Orientation::Portrait => self.width > self.height,
            Orientation::Landscape => self.width < self.height,
        };
        if swapped {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }
}

/// Current display geometry: size plus orientation.
///
/// Deserialized input goes through [`DisplayGeometry::new`], so a size
/// reported before rotation is corrected the same way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawDisplayGeometry")]
pub struct DisplayGeometry {
    pub size: ScreenSize,
    pub orientation: Orientation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDisplayGeometry {
    size: ScreenSize,
    #[serde(default)]
    orientation: Orientation,
}

impl From<RawDisplayGeometry> for DisplayGeometry {
    fn from(raw: RawDisplayGeometry) -> Self {
        DisplayGeometry::new(raw.size, raw.orientation)
    }
}

impl DisplayGeometry {
    /// Create geometry, correcting `size` to agree with `orientation`
    pub fn new(size: ScreenSize, orientation: Orientation) -> Self {
        Self {
            size: size.oriented(orientation),
            orientation,
        }
    }
}

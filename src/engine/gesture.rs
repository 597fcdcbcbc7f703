//! Synthetic pointer strokes and gestures
//!
//! A stroke is one pointer path with a duration. A gesture is the set of
//! strokes handed to the OS in one dispatch; multi-finger gestures carry one
//! stroke per finger.

use crate::geometry::Position;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Identifies a dispatched stroke so a later stroke can continue it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeHandle(Uuid);

impl StrokeHandle {
    /// Create a new unique handle
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StrokeHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StrokeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub handle: StrokeHandle,
    pub path: Vec<Position>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    /// The contact stays down after this stroke so another can extend it
    pub continues: bool,
    /// The open stroke this one extends
    pub continuation_of: Option<StrokeHandle>,
}

impl Stroke {
    /// Stroke that touches a single point
    pub fn point(at: Position, duration: Duration) -> Self {
        Self {
            handle: StrokeHandle::new(),
            path: vec![at],
            duration,
            continues: false,
            continuation_of: None,
        }
    }

    /// Straight stroke between two points
    pub fn line(from: Position, to: Position, duration: Duration) -> Self {
        Self {
            handle: StrokeHandle::new(),
            path: vec![from, to],
            duration,
            continues: false,
            continuation_of: None,
        }
    }

    /// Keep the contact open after this stroke
    pub fn continuing(mut self) -> Self {
        self.continues = true;
        self
    }

    /// Mark this stroke as extending `previous`
    pub fn continuation_of(mut self, previous: StrokeHandle) -> Self {
        self.continuation_of = Some(previous);
        self
    }
}

/// Strokes dispatched together as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub strokes: Vec<Stroke>,
}

impl Gesture {
    /// Gesture made of one stroke
    pub fn single(stroke: Stroke) -> Self {
        Self {
            strokes: vec![stroke],
        }
    }

    /// Two-finger gesture
    pub fn pair(first: Stroke, second: Stroke) -> Self {
        Self {
            strokes: vec![first, second],
        }
    }

    /// Time until every stroke of the gesture has finished
    pub fn duration(&self) -> Duration {
        self.strokes
            .iter()
            .map(|s| s.duration)
            .max()
            .unwrap_or_default()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gesture_duration_is_longest_stroke() {
        let gesture = Gesture::pair(
            Stroke::line(Position::new(0.0, 0.0), Position::new(1.0, 1.0), Duration::from_millis(200)),
            Stroke::point(Position::new(5.0, 5.0), Duration::from_millis(20)),
        );
        assert_eq!(gesture.duration(), Duration::from_millis(200));
    }

    #[test]
    fn test_continuation_builders() {
        let first = Stroke::point(Position::new(1.0, 1.0), Duration::from_millis(1000)).continuing();
        let next = Stroke::line(Position::new(1.0, 1.0), Position::new(2.0, 2.0), Duration::from_millis(50))
            .continuing()
            .continuation_of(first.handle);

        assert!(first.continues);
        assert_eq!(first.continuation_of, None);
        assert_eq!(next.continuation_of, Some(first.handle));
        assert_ne!(first.handle, next.handle);
    }

    #[test]
    fn test_stroke_json_uses_milliseconds() {
        let stroke = Stroke::point(Position::new(500.0, 800.0), Duration::from_millis(1));
        let json = serde_json::to_value(&stroke).unwrap();
        assert_eq!(json["duration"], 1);
        assert_eq!(json["continues"], false);
    }
}

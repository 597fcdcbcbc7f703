//! Action to gesture synthesis
//!
//! Turns queued commands into gestures. Drag and zoom are stateful: a drag
//! keeps one pointer contact open across many commands, and a zoom pairs
//! each new finger position with the previous one. That state lives in
//! [`ExecutorState`], which only the executor touches.

use crate::config::StrokeTimings;
use crate::engine::action::{Action, Command};
use crate::engine::gesture::{Gesture, Stroke, StrokeHandle};
use crate::geometry::Position;
use std::time::Duration;

/// Continuation state carried between commands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutorState {
    /// Finger positions of the last zoom, paired with the next one
    pub prev_zoom: Option<(Position, Position)>,
    /// Where the open drag contact currently is
    pub prev_drag_position: Option<Position>,
    /// Stroke the next drag step continues
    pub open_drag_stroke: Option<StrokeHandle>,
}

impl ExecutorState {
    /// A drag stroke is open and can be continued
    pub fn is_dragging(&self) -> bool {
        self.open_drag_stroke.is_some()
    }

    fn clear_drag(&mut self) {
        self.prev_drag_position = None;
        self.open_drag_stroke = None;
    }
}

#[derive(Debug, Clone)]
pub struct ActionExecutor {
    timings: StrokeTimings,
    state: ExecutorState,
}

impl ActionExecutor {
    /// Create a new executor with empty continuation state
    pub fn new(timings: StrokeTimings) -> Self {
        Self {
            timings,
            state: ExecutorState::default(),
        }
    }

    /// Get the current continuation state
    pub fn state(&self) -> &ExecutorState {
        &self.state
    }

    /// Drop the open drag handle and the zoom anchor
    pub fn reset(&mut self) {
        self.state = ExecutorState::default();
    }

    /// Build the gesture for one command, updating continuation state.
    ///
    /// Returns `None` when the command produces nothing to dispatch: the first
    /// zoom of a sequence, a zoom termination, and anything that fails
    /// validation (which is logged and dropped).
    pub fn synthesize(&mut self, command: Command) -> Option<Gesture> {
        match command {
            Command::Run { action } => {
                if !action.is_resolved() {
                    tracing::warn!("Dropping {} with unresolved coordinates: {:?}", action.name(), action);
                    return None;
                }
                match action {
                    Action::Tap { at } => Some(self.tap(at)),
                    Action::Slide { from, to } => self.slide(from, to),
                    Action::Drag { at } => Some(self.drag(at)),
                    Action::Zoom { first, second } => self.zoom(first, second),
                }
            }
            Command::TerminateDrag { at } => self.terminate_drag(at),
            Command::TerminateZoom => {
                self.state.prev_zoom = None;
                tracing::debug!("Zoom anchor cleared");
                None
            }
        }
    }

    fn tap(&self, at: Position) -> Gesture {
        Gesture::single(Stroke::point(at, ms(self.timings.tap_ms)))
    }

    fn slide(&self, from: Position, to: Position) -> Option<Gesture> {
        if !from.is_non_negative() {
            tracing::warn!("Slide start is negative ({}, {}); not dispatched", from.x, from.y);
            return None;
        }
        if !to.is_non_negative() {
            tracing::warn!("Slide end is negative ({}, {}); not dispatched", to.x, to.y);
            return None;
        }
        Some(Gesture::single(Stroke::line(from, to, ms(self.timings.slide_ms))))
    }

    fn drag(&mut self, at: Position) -> Gesture {
        let stroke = match (self.state.open_drag_stroke, self.state.prev_drag_position) {
            (Some(open), Some(prev)) => Stroke::line(prev, at, ms(self.timings.drag_step_ms))
                .continuing()
                .continuation_of(open),
            _ => Stroke::point(at, ms(self.timings.drag_hold_ms)).continuing(),
        };
        self.state.open_drag_stroke = Some(stroke.handle);
        self.state.prev_drag_position = Some(at);
        Gesture::single(stroke)
    }

    fn terminate_drag(&mut self, at: Position) -> Option<Gesture> {
        let (Some(open), Some(prev)) = (self.state.open_drag_stroke, self.state.prev_drag_position) else {
            tracing::warn!("Drag termination without an open drag; ignored");
            return None;
        };
        if !at.is_finite() {
            tracing::warn!("Drag termination point is unresolved; releasing at last position");
        }
        let end = if at.is_finite() { at } else { prev };
        let stroke = Stroke::line(prev, end, ms(self.timings.drag_release_ms)).continuation_of(open);
        self.state.clear_drag();
        tracing::info!("Drag released at ({}, {})", end.x, end.y);
        Some(Gesture::single(stroke))
    }

    fn zoom(&mut self, first: Position, second: Position) -> Option<Gesture> {
        let Some((prev_first, prev_second)) = self.state.prev_zoom.replace((first, second)) else {
            tracing::debug!("Zoom anchor seeded");
            return None;
        };
        let duration = ms(self.timings.zoom_ms);
        Some(Gesture::pair(
            Stroke::line(prev_first, first, duration),
            Stroke::line(prev_second, second, duration),
        ))
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> ActionExecutor {
        ActionExecutor::new(StrokeTimings::default())
    }

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_tap_is_single_point_pulse() {
        let gesture = executor().synthesize(Action::tap(p(500.0, 800.0)).into()).unwrap();
        assert_eq!(gesture.strokes.len(), 1);
        let stroke = &gesture.strokes[0];
        assert_eq!(stroke.path, vec![p(500.0, 800.0)]);
        assert_eq!(stroke.duration, Duration::from_millis(1));
        assert!(!stroke.continues);
    }

    #[test]
    fn test_slide_is_straight_line() {
        let gesture = executor()
            .synthesize(Action::slide(p(10.0, 20.0), p(300.0, 400.0)).into())
            .unwrap();
        assert_eq!(gesture.strokes[0].path, vec![p(10.0, 20.0), p(300.0, 400.0)]);
        assert_eq!(gesture.duration(), Duration::from_millis(20));
    }

    #[test]
    fn test_slide_with_negative_coordinate_is_dropped() {
        let mut executor = executor();
        assert!(executor.synthesize(Action::slide(p(-1.0, 50.0), p(100.0, 100.0)).into()).is_none());
        assert!(executor.synthesize(Action::slide(p(1.0, 50.0), p(100.0, -0.5)).into()).is_none());
    }

    #[test]
    fn test_unresolved_action_is_dropped() {
        let mut executor = executor();
        assert!(executor.synthesize(Action::tap(p(f64::NAN, 1.0)).into()).is_none());
        assert!(executor.synthesize(Action::drag(p(1.0, f64::INFINITY)).into()).is_none());
        assert!(!executor.state().is_dragging());
    }

    #[test]
    fn test_drag_strokes_are_chained() {
        let mut executor = executor();
        let first = executor.synthesize(Action::drag(p(100.0, 100.0)).into()).unwrap();
        let second = executor.synthesize(Action::drag(p(120.0, 110.0)).into()).unwrap();
        let last = executor
            .synthesize(Command::TerminateDrag { at: p(140.0, 120.0) })
            .unwrap();

        let (s1, s2, s3) = (&first.strokes[0], &second.strokes[0], &last.strokes[0]);

        assert_eq!(s1.path, vec![p(100.0, 100.0)]);
        assert_eq!(s1.duration, Duration::from_millis(1000));
        assert!(s1.continues);
        assert_eq!(s1.continuation_of, None);

        assert_eq!(s2.path, vec![p(100.0, 100.0), p(120.0, 110.0)]);
        assert_eq!(s2.duration, Duration::from_millis(50));
        assert!(s2.continues);
        assert_eq!(s2.continuation_of, Some(s1.handle));

        assert_eq!(s3.path, vec![p(120.0, 110.0), p(140.0, 120.0)]);
        assert!(!s3.continues);
        assert_eq!(s3.continuation_of, Some(s2.handle));

        assert_eq!(executor.state(), &ExecutorState::default());
    }

    #[test]
    fn test_terminate_without_open_drag_is_ignored() {
        let mut executor = executor();
        assert!(executor.synthesize(Command::TerminateDrag { at: p(1.0, 1.0) }).is_none());
    }

    #[test]
    fn test_drag_after_termination_starts_new_contact() {
        let mut executor = executor();
        executor.synthesize(Action::drag(p(1.0, 1.0)).into());
        executor.synthesize(Command::TerminateDrag { at: p(2.0, 2.0) });
        let fresh = executor.synthesize(Action::drag(p(3.0, 3.0)).into()).unwrap();
        assert_eq!(fresh.strokes[0].continuation_of, None);
        assert_eq!(fresh.strokes[0].duration, Duration::from_millis(1000));
    }

    #[test]
    fn test_zoom_pairs_with_previous() {
        let mut executor = executor();
        let (a, b, c, d) = (p(300.0, 300.0), p(500.0, 500.0), p(250.0, 250.0), p(520.0, 520.0));

        assert!(executor.synthesize(Action::zoom(a, b).into()).is_none());
        let gesture = executor.synthesize(Action::zoom(c, d).into()).unwrap();

        assert_eq!(gesture.strokes.len(), 2);
        assert_eq!(gesture.strokes[0].path, vec![a, c]);
        assert_eq!(gesture.strokes[1].path, vec![b, d]);
        assert!(gesture.strokes.iter().all(|s| s.duration == Duration::from_millis(200)));
        assert_eq!(executor.state().prev_zoom, Some((c, d)));
    }

    #[test]
    fn test_terminate_zoom_clears_anchor() {
        let mut executor = executor();
        executor.synthesize(Action::zoom(p(1.0, 1.0), p(2.0, 2.0)).into());
        executor.synthesize(Command::TerminateZoom);
        assert!(executor.synthesize(Action::zoom(p(3.0, 3.0), p(4.0, 4.0)).into()).is_none());
    }

    #[test]
    fn test_reset_discards_continuations() {
        let mut executor = executor();
        executor.synthesize(Action::drag(p(1.0, 1.0)).into());
        executor.synthesize(Action::zoom(p(1.0, 1.0), p(2.0, 2.0)).into());
        executor.reset();
        assert_eq!(executor.state(), &ExecutorState::default());
    }
}

//! Dwell timer
//!
//! Tracks how long the cursor has stayed near an anchor point. Samples decide
//! whether the cursor moved (which re-anchors and resets the count); ticks
//! arriving on a fixed cadence advance the count while the cursor is still.

use crate::geometry::Position;

/// Result of feeding a cursor sample to the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// The cursor left the threshold square; the anchor moved and the count reset
    Moved,
    /// The cursor is within the threshold; the timer is counting
    Settled,
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DwellTick {
    /// The timer is not counting
    Idle,
    /// Counting, not yet complete
    Progress(u32),
    /// The required number of ticks was reached; the count is back at zero
    Fired,
}

#[derive(Debug, Clone)]
pub struct DwellTimer {
    anchor: Option<Position>,
    ticks: u32,
    required_ticks: u32,
    running: bool,
}

impl DwellTimer {
    /// Create a new timer that fires after `required_ticks` still ticks
    pub fn new(required_ticks: u32) -> Self {
        Self {
            anchor: None,
            ticks: 0,
            required_ticks: required_ticks.max(1),
            running: false,
        }
    }

    /// Compare a new cursor position with the anchor.
    ///
    /// Movement beyond `threshold` on either axis always resets the count to 0,
    /// whatever its previous value.
    pub fn observe(&mut self, position: Position, threshold: f64) -> Movement {
        match self.anchor {
            Some(anchor) if anchor.axis_distance(&position) <= threshold => {
                self.running = true;
                Movement::Settled
            }
            _ => {
                self.anchor = Some(position);
                self.stop();
                Movement::Moved
            }
        }
    }

    /// Advance the count by one tick if the cursor has settled
    pub fn tick(&mut self) -> DwellTick {
        if !self.running {
            return DwellTick::Idle;
        }
        self.ticks += 1;
        if self.ticks >= self.required_ticks {
            self.stop();
            DwellTick::Fired
        } else {
            DwellTick::Progress(self.ticks)
        }
    }

    /// Stop counting without touching the anchor
    pub fn stop(&mut self) {
        self.ticks = 0;
        self.running = false;
    }

    /// Forget the anchor; the next sample starts a fresh dwell
    pub fn reset(&mut self) {
        self.anchor = None;
        self.stop();
    }

    /// Re-anchor at `position` with the count at zero
    pub fn anchor_at(&mut self, position: Position) {
        self.anchor = Some(position);
        self.stop();
    }

    /// Position the current dwell is measured against
    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    /// Ticks counted so far in the current dwell
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Fraction of the dwell completed, for the progress indicator
    pub fn progress(&self) -> f32 {
        self.ticks as f32 / self.required_ticks as f32
    }
}

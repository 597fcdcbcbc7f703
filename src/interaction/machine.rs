//! Dwell-driven selection state machine
//!
//! Converts a stream of cursor positions into at most one committed
//! interaction at a time. Entering and leaving menu states is immediate on
//! hit-test; everything that commits something requires a dwell.
//!
//! ```text
//! Hidden ──reveal hit──> Visible ──selector hit──> Hovering(sel)
//!   ^                      ^  │                        │ dwell
//!   └──── leaves menu ─────┘  └───── hit lost ─────────┤
//!                                                      v
//!        ArmedTap / ArmedSlideStart / ArmedDragStart / ArmedMove
//!                         │ dwell
//!                         v
//!           Tap ⟶ Visible, ArmedSlideEnd, ArmedDrag, Visible
//! ```
//!
//! The machine performs no I/O; every outward consequence is returned as an
//! [`Effect`] for the session to route.

use crate::config::DwellConfig;
use crate::engine::action::{Action, Command};
use crate::geometry::Position;
use crate::interaction::targets::{cursor_hits, HitTest, Selector, TargetId};
use crate::processing::dwell::{DwellTick, DwellTimer, Movement};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum InteractionState {
    /// Menu hidden; only the reveal zone is live
    Hidden,
    /// Menu shown, nothing under the cursor
    Visible,
    /// Cursor over a selector, dwelling to choose it
    Hovering { selector: Selector },
    /// Dwell anywhere to tap there
    ArmedTap,
    /// Marker follows the cursor; dwell to fix the slide start
    ArmedSlideStart,
    /// Large moves slide from `origin`; dwell ends the slide
    ArmedSlideEnd { origin: Position },
    /// Dwell to put the finger down
    ArmedDragStart,
    /// Large moves extend the drag; dwell lifts the finger
    ArmedDrag,
    /// Panel follows the cursor, offset by `grip`; dwell drops it
    ArmedMove { grip: Position },
}

impl InteractionState {
    /// A committed interaction is in flight
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            InteractionState::Hidden | InteractionState::Visible | InteractionState::Hovering { .. }
        )
    }

    fn is_menu(&self) -> bool {
        matches!(self, InteractionState::Visible | InteractionState::Hovering { .. })
    }
}

/// Output of the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Hand a command to the action queue
    Execute(Command),
    PanelVisible(bool),
    /// Show the slide start marker at a position, or hide it
    Marker(Option<Position>),
    /// Dwell progress in [0, 1]
    Progress(f32),
    /// Move the panel's top-left corner
    MovePanel(Position),
    /// A dwell completed
    DwellCompleted,
    /// The user chose to close the overlay
    CloseRequested,
}

#[derive(Debug, Clone)]
pub struct InteractionMachine {
    config: DwellConfig,
    glyph: (f64, f64),
    state: InteractionState,
    dwell: DwellTimer,
    cursor: Option<Position>,
}

impl InteractionMachine {
    /// `glyph` is the cursor glyph size used for hit-testing
    pub fn new(config: DwellConfig, glyph: (f64, f64)) -> Self {
        let dwell = DwellTimer::new(config.required_ticks);
        Self {
            config,
            glyph,
            state: InteractionState::Hidden,
            dwell,
            cursor: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn cursor(&self) -> Option<Position> {
        self.cursor
    }

    pub fn dwell(&self) -> &DwellTimer {
        &self.dwell
    }

    /// Feed one cursor position
    pub fn on_sample(&mut self, position: Position, hit_test: &dyn HitTest) -> Vec<Effect> {
        self.cursor = Some(position);
        let mut effects = Vec::new();

        if self.state.is_menu()
            && !self.hits(hit_test, TargetId::Reveal)
            && !self.hits(hit_test, TargetId::Panel)
        {
            self.transition(InteractionState::Hidden);
            self.clear_dwell(&mut effects);
            effects.push(Effect::PanelVisible(false));
            return effects;
        }

        match self.state {
            InteractionState::Hidden => {
                if self.hits(hit_test, TargetId::Reveal) {
                    self.transition(InteractionState::Visible);
                    self.clear_dwell(&mut effects);
                    effects.push(Effect::PanelVisible(true));
                }
            }
            InteractionState::Visible => {
                self.clear_dwell(&mut effects);
                let hovered = Selector::ALL
                    .into_iter()
                    .find(|s| self.hits(hit_test, TargetId::Selector(*s)));
                if let Some(selector) = hovered {
                    self.transition(InteractionState::Hovering { selector });
                    self.dwell.anchor_at(position);
                }
            }
            InteractionState::Hovering { selector } => {
                if self.hits(hit_test, TargetId::Selector(selector)) {
                    self.observe(position, self.config.hover_threshold_px, &mut effects);
                } else {
                    self.transition(InteractionState::Visible);
                    self.clear_dwell(&mut effects);
                }
            }
            InteractionState::ArmedTap | InteractionState::ArmedDragStart => {
                self.observe(position, self.config.settle_threshold_px, &mut effects);
            }
            InteractionState::ArmedSlideStart => {
                self.observe(position, self.config.settle_threshold_px, &mut effects);
                effects.push(Effect::Marker(Some(position)));
            }
            InteractionState::ArmedMove { grip } => {
                self.observe(position, self.config.settle_threshold_px, &mut effects);
                effects.push(Effect::MovePanel(Position::new(
                    position.x - grip.x,
                    position.y - grip.y,
                )));
            }
            InteractionState::ArmedSlideEnd { origin } => {
                if self.observe(position, self.config.track_threshold_px, &mut effects) == Movement::Moved {
                    effects.push(Effect::Execute(Action::slide(origin, position).into()));
                }
            }
            InteractionState::ArmedDrag => {
                if self.observe(position, self.config.track_threshold_px, &mut effects) == Movement::Moved {
                    effects.push(Effect::Execute(Action::drag(position).into()));
                }
            }
        }

        effects
    }

    /// Advance the dwell counter by one tick
    pub fn on_tick(&mut self, hit_test: &dyn HitTest) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.dwell.tick() {
            DwellTick::Idle => {}
            DwellTick::Progress(_) => effects.push(Effect::Progress(self.dwell.progress())),
            DwellTick::Fired => {
                effects.push(Effect::Progress(0.0));
                effects.push(Effect::DwellCompleted);
                self.complete_dwell(hit_test, &mut effects);
            }
        }
        effects
    }

    /// Commit `selector` as if its dwell had completed.
    ///
    /// Returns `None` without changing anything while another interaction is
    /// still active.
    pub fn select(&mut self, selector: Selector, hit_test: &dyn HitTest) -> Option<Vec<Effect>> {
        if self.state.is_active() {
            tracing::debug!("Ignoring {} selection while {:?} is active", selector, self.state);
            return None;
        }
        let mut effects = Vec::new();
        self.clear_dwell(&mut effects);
        self.commit(selector, hit_test, &mut effects);
        Some(effects)
    }

    /// Abandon the active interaction and return to the menu
    pub fn dismiss(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.state.is_active() {
            return effects;
        }
        match self.state {
            InteractionState::ArmedDrag => {
                if let Some(cursor) = self.cursor {
                    effects.push(Effect::Execute(Command::TerminateDrag { at: cursor }));
                }
            }
            InteractionState::ArmedSlideStart | InteractionState::ArmedSlideEnd { .. } => {
                effects.push(Effect::Marker(None));
            }
            _ => {}
        }
        self.transition(InteractionState::Visible);
        self.clear_dwell(&mut effects);
        self.dwell.reset();
        effects
    }

    /// Back to the initial hidden state, forgetting the cursor
    pub fn reset(&mut self) {
        self.state = InteractionState::Hidden;
        self.dwell.reset();
        self.cursor = None;
    }

    fn complete_dwell(&mut self, hit_test: &dyn HitTest, effects: &mut Vec<Effect>) {
        let Some(cursor) = self.cursor else {
            return;
        };
        match self.state {
            InteractionState::Hidden | InteractionState::Visible => {}
            InteractionState::Hovering { selector } => {
                if self.hits(hit_test, TargetId::Selector(selector)) {
                    self.commit(selector, hit_test, effects);
                } else {
                    self.transition(InteractionState::Visible);
                }
            }
            InteractionState::ArmedTap => {
                effects.push(Effect::Execute(Action::tap(cursor).into()));
                self.transition(InteractionState::Visible);
                self.dwell.reset();
            }
            InteractionState::ArmedSlideStart => {
                effects.push(Effect::Marker(Some(cursor)));
                self.transition(InteractionState::ArmedSlideEnd { origin: cursor });
                self.dwell.anchor_at(cursor);
            }
            InteractionState::ArmedSlideEnd { .. } => {
                effects.push(Effect::Marker(None));
                self.transition(InteractionState::Visible);
                self.dwell.reset();
            }
            InteractionState::ArmedDragStart => {
                let start = self.dwell.anchor().unwrap_or(cursor);
                effects.push(Effect::Execute(Action::drag(start).into()));
                self.transition(InteractionState::ArmedDrag);
                self.dwell.anchor_at(start);
            }
            InteractionState::ArmedDrag => {
                effects.push(Effect::Execute(Command::TerminateDrag { at: cursor }));
                self.transition(InteractionState::Visible);
                self.dwell.reset();
            }
            InteractionState::ArmedMove { .. } => {
                self.transition(InteractionState::Visible);
                self.dwell.reset();
            }
        }
    }

    fn commit(&mut self, selector: Selector, hit_test: &dyn HitTest, effects: &mut Vec<Effect>) {
        match selector {
            Selector::Tap => {
                self.transition(InteractionState::ArmedTap);
                self.anchor_at_cursor();
            }
            Selector::Slide => {
                self.transition(InteractionState::ArmedSlideStart);
                self.anchor_at_cursor();
                if let Some(cursor) = self.cursor {
                    effects.push(Effect::Marker(Some(cursor)));
                }
            }
            Selector::Drag => {
                self.transition(InteractionState::ArmedDragStart);
                self.anchor_at_cursor();
            }
            Selector::Dismiss => {
                self.transition(InteractionState::Hidden);
                self.dwell.reset();
                effects.push(Effect::PanelVisible(false));
                effects.push(Effect::CloseRequested);
            }
            Selector::Move => {
                let grip = match (
                    hit_test.bounds(TargetId::Selector(Selector::Move)),
                    hit_test.bounds(TargetId::Panel),
                ) {
                    (Some(handle), Some(panel)) => {
                        Position::new(handle.x - panel.x, handle.y - panel.y)
                    }
                    _ => Position::default(),
                };
                self.transition(InteractionState::ArmedMove { grip });
                self.dwell.reset();
            }
        }
    }

    fn anchor_at_cursor(&mut self) {
        match self.cursor {
            Some(cursor) => self.dwell.anchor_at(cursor),
            None => self.dwell.reset(),
        }
    }

    fn observe(&mut self, position: Position, threshold: f64, effects: &mut Vec<Effect>) -> Movement {
        let had_progress = self.dwell.ticks() > 0;
        let movement = self.dwell.observe(position, threshold);
        if movement == Movement::Moved && had_progress {
            effects.push(Effect::Progress(0.0));
        }
        movement
    }

    /// Stop the dwell counter, reporting the cleared progress if there was any
    fn clear_dwell(&mut self, effects: &mut Vec<Effect>) {
        if self.dwell.ticks() > 0 {
            effects.push(Effect::Progress(0.0));
        }
        self.dwell.stop();
    }

    fn transition(&mut self, next: InteractionState) {
        if self.state != next {
            tracing::debug!("Interaction {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn hits(&self, hit_test: &dyn HitTest, target: TargetId) -> bool {
        match self.cursor {
            Some(cursor) => cursor_hits(hit_test, target, cursor, self.glyph),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::interaction::targets::TargetLayout;

    const REQUIRED: u32 = 3;

    fn default_config() -> DwellConfig {
        DwellConfig {
            required_ticks: REQUIRED,
            ..DwellConfig::default()
        }
    }

    fn layout() -> TargetLayout {
        TargetLayout::from_entries([
            (TargetId::Reveal, Rect::new(0.0, 0.0, 100.0, 100.0)),
            (TargetId::Panel, Rect::new(0.0, 150.0, 500.0, 120.0)),
            (TargetId::Selector(Selector::Tap), Rect::new(10.0, 160.0, 80.0, 80.0)),
            (TargetId::Selector(Selector::Slide), Rect::new(110.0, 160.0, 80.0, 80.0)),
            (TargetId::Selector(Selector::Drag), Rect::new(210.0, 160.0, 80.0, 80.0)),
            (TargetId::Selector(Selector::Dismiss), Rect::new(310.0, 160.0, 80.0, 80.0)),
            (TargetId::Selector(Selector::Move), Rect::new(410.0, 160.0, 80.0, 80.0)),
        ])
    }

    fn machine() -> InteractionMachine {
        InteractionMachine::new(default_config(), (20.0, 20.0))
    }

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    /// Hold the cursor at `pos` until the dwell fires
    fn dwell_at(m: &mut InteractionMachine, layout: &TargetLayout, pos: Position) -> Vec<Effect> {
        let mut effects = m.on_sample(pos, layout);
        effects.extend(m.on_sample(pos, layout));
        for _ in 0..REQUIRED {
            effects.extend(m.on_tick(layout));
        }
        effects
    }

    fn executed(effects: &[Effect]) -> Vec<Command> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Execute(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Reveal the menu and commit `selector` through its button
    fn open_and_select(m: &mut InteractionMachine, layout: &TargetLayout, selector: Selector) {
        m.on_sample(p(50.0, 50.0), layout);
        assert_eq!(m.state(), InteractionState::Visible);
        let button = layout.bounds(TargetId::Selector(selector)).unwrap();
        let center = p(button.x + 20.0, button.y + 20.0);
        m.on_sample(center, layout);
        assert_eq!(m.state(), InteractionState::Hovering { selector });
        dwell_at(m, layout, center);
    }

    #[test]
    fn test_reveal_and_hide_are_immediate() {
        let layout = layout();
        let mut m = machine();

        let effects = m.on_sample(p(50.0, 50.0), &layout);
        assert_eq!(m.state(), InteractionState::Visible);
        assert!(effects.contains(&Effect::PanelVisible(true)));

        // Panel keeps the menu open
        m.on_sample(p(250.0, 255.0), &layout);
        assert!(m.state() == InteractionState::Visible || matches!(m.state(), InteractionState::Hovering { .. }));

        let effects = m.on_sample(p(800.0, 800.0), &layout);
        assert_eq!(m.state(), InteractionState::Hidden);
        assert!(effects.contains(&Effect::PanelVisible(false)));
    }

    #[test]
    fn test_unavailable_geometry_is_no_hit() {
        let layout = TargetLayout::new();
        let mut m = machine();
        m.on_sample(p(50.0, 50.0), &layout);
        assert_eq!(m.state(), InteractionState::Hidden);
    }

    #[test]
    fn test_hover_loss_unarms() {
        let layout = layout();
        let mut m = machine();
        m.on_sample(p(50.0, 50.0), &layout);
        m.on_sample(p(30.0, 180.0), &layout);
        assert_eq!(m.state(), InteractionState::Hovering { selector: Selector::Tap });

        // Still on the panel, between buttons
        m.on_sample(p(95.0, 250.0), &layout);
        assert_eq!(m.state(), InteractionState::Visible);
    }

    #[test]
    fn test_overlapping_selectors_resolve_by_priority() {
        let layout = layout();
        layout.set(TargetId::Selector(Selector::Slide), Rect::new(10.0, 160.0, 80.0, 80.0));
        let mut m = machine();
        m.on_sample(p(50.0, 50.0), &layout);
        m.on_sample(p(30.0, 180.0), &layout);
        assert_eq!(m.state(), InteractionState::Hovering { selector: Selector::Tap });
    }

    #[test]
    fn test_tap_flow() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Tap);
        assert_eq!(m.state(), InteractionState::ArmedTap);

        let effects = dwell_at(&mut m, &layout, p(700.0, 900.0));
        assert_eq!(
            executed(&effects),
            vec![Command::run(Action::tap(p(700.0, 900.0)))]
        );
        assert!(effects.contains(&Effect::DwellCompleted));
        assert_eq!(m.state(), InteractionState::Visible);
    }

    #[test]
    fn test_movement_cancels_pending_commit() {
        for threshold in [40.0, 100.0, 150.0] {
            let layout = layout();
            let mut m = InteractionMachine::new(
                DwellConfig {
                    required_ticks: REQUIRED,
                    settle_threshold_px: threshold,
                    ..DwellConfig::default()
                },
                (20.0, 20.0),
            );
            open_and_select(&mut m, &layout, Selector::Tap);

            m.on_sample(p(700.0, 900.0), &layout);
            m.on_sample(p(700.0, 900.0), &layout);
            m.on_tick(&layout);
            m.on_tick(&layout);
            assert_eq!(m.dwell().ticks(), 2);

            let effects = m.on_sample(p(700.0 + threshold + 1.0, 900.0), &layout);
            assert!(effects.contains(&Effect::Progress(0.0)));
            assert_eq!(m.dwell().ticks(), 0);
            // Ticks alone do not fire without a settled sample
            for _ in 0..REQUIRED * 2 {
                assert!(executed(&m.on_tick(&layout)).is_empty());
            }
            assert_eq!(m.state(), InteractionState::ArmedTap);
        }
    }

    #[test]
    fn test_slide_flow() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Slide);
        assert_eq!(m.state(), InteractionState::ArmedSlideStart);

        let effects = m.on_sample(p(300.0, 600.0), &layout);
        assert!(effects.contains(&Effect::Marker(Some(p(300.0, 600.0)))));
        dwell_at(&mut m, &layout, p(300.0, 600.0));
        assert_eq!(m.state(), InteractionState::ArmedSlideEnd { origin: p(300.0, 600.0) });

        // Small moves are ignored, large moves slide
        assert!(executed(&m.on_sample(p(320.0, 650.0), &layout)).is_empty());
        let effects = m.on_sample(p(300.0, 800.0), &layout);
        assert_eq!(
            executed(&effects),
            vec![Command::run(Action::slide(p(300.0, 600.0), p(300.0, 800.0)))]
        );

        let effects = dwell_at(&mut m, &layout, p(300.0, 800.0));
        assert!(effects.contains(&Effect::Marker(None)));
        assert!(executed(&effects).is_empty());
        assert_eq!(m.state(), InteractionState::Visible);
    }

    #[test]
    fn test_drag_flow() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Drag);
        assert_eq!(m.state(), InteractionState::ArmedDragStart);

        let effects = dwell_at(&mut m, &layout, p(400.0, 400.0));
        assert_eq!(executed(&effects), vec![Command::run(Action::drag(p(400.0, 400.0)))]);
        assert_eq!(m.state(), InteractionState::ArmedDrag);

        let effects = m.on_sample(p(400.0, 600.0), &layout);
        assert_eq!(executed(&effects), vec![Command::run(Action::drag(p(400.0, 600.0)))]);

        let effects = dwell_at(&mut m, &layout, p(400.0, 600.0));
        assert_eq!(
            executed(&effects),
            vec![Command::TerminateDrag { at: p(400.0, 600.0) }]
        );
        assert_eq!(m.state(), InteractionState::Visible);
    }

    #[test]
    fn test_dismiss_terminates_open_drag() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Drag);
        dwell_at(&mut m, &layout, p(400.0, 400.0));
        m.on_sample(p(400.0, 700.0), &layout);

        let effects = m.dismiss();
        assert_eq!(
            executed(&effects),
            vec![Command::TerminateDrag { at: p(400.0, 700.0) }]
        );
        assert_eq!(m.state(), InteractionState::Visible);
        // Dismissing again is a no-op
        assert!(m.dismiss().is_empty());
    }

    #[test]
    fn test_select_is_noop_while_active() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Slide);
        assert!(m.select(Selector::Tap, &layout).is_none());
        assert_eq!(m.state(), InteractionState::ArmedSlideStart);

        m.dismiss();
        assert!(m.select(Selector::Tap, &layout).is_some());
        assert_eq!(m.state(), InteractionState::ArmedTap);
    }

    #[test]
    fn test_dismiss_selector_requests_close() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Dismiss);
        assert_eq!(m.state(), InteractionState::Hidden);
    }

    #[test]
    fn test_move_selector_drags_panel() {
        let layout = layout();
        let mut m = machine();
        open_and_select(&mut m, &layout, Selector::Move);
        assert_eq!(m.state(), InteractionState::ArmedMove { grip: p(410.0, 10.0) });

        let effects = m.on_sample(p(600.0, 600.0), &layout);
        assert!(effects.contains(&Effect::MovePanel(p(190.0, 590.0))));

        dwell_at(&mut m, &layout, p(600.0, 600.0));
        assert_eq!(m.state(), InteractionState::Visible);
    }
}

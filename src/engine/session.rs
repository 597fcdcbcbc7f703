//! Engine session
//!
//! One session per active overlay. It runs two tasks that share nothing but
//! the action queue:
//!
//! - the sampler, which owns the state machine, maps every tracking sample
//!   onto the screen and ticks the dwell counter;
//! - the worker, which owns the executor state and dispatches gestures one
//!   at a time.
//!
//! Every control operation is idempotent. Calling one from an unexpected
//! state logs and returns instead of failing.

use crate::capture::tracking::TrackingSource;
use crate::config::EngineConfig;
use crate::engine::action::{Action, Command};
use crate::engine::overlay::{OverlayFeedback, VolumeControl, VolumeDirection};
use crate::engine::sink::GestureSink;
use crate::engine::worker::{ActionQueue, WorkerExit, WorkerHandle};
use crate::geometry::DisplayGeometry;
use crate::interaction::machine::{Effect, InteractionMachine};
use crate::interaction::targets::{HitTest, Selector};
use crate::processing::cursor_mapper::CursorMapper;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Requests routed to the sampler so the state machine is only touched there
#[derive(Debug, Clone, Copy)]
enum SamplerControl {
    Dismiss,
    Select(Selector),
}

struct SamplerHandle {
    cancel: CancellationToken,
    control: mpsc::UnboundedSender<SamplerControl>,
    join: JoinHandle<Box<dyn TrackingSource>>,
}

impl SamplerHandle {
    /// Stop sampling and take the source back
    async fn shutdown(self) -> Option<Box<dyn TrackingSource>> {
        self.cancel.cancel();
        self.join_source().await
    }

    async fn join_source(self) -> Option<Box<dyn TrackingSource>> {
        match self.join.await {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::error!("Sampler task failed: {}", e);
                None
            }
        }
    }
}

struct Running {
    token: CancellationToken,
    queue: ActionQueue,
    worker: WorkerHandle,
    sampler: SamplerHandle,
}

/// Snapshot of a session for callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub id: Uuid,
    pub running: bool,
    pub geometry: DisplayGeometry,
}

pub struct Session {
    id: Uuid,
    config: EngineConfig,
    sink: Arc<dyn GestureSink>,
    hit_test: Arc<dyn HitTest>,
    overlay: Arc<dyn OverlayFeedback>,
    volume: Option<Arc<dyn VolumeControl>>,
    geometry: DisplayGeometry,
    running: Option<Running>,
}

impl Session {
    /// Create a stopped session.
    ///
    /// A config that fails validation is replaced by the defaults, so a bad
    /// value built in code cannot bring down the sampler.
    pub fn new(
        config: EngineConfig,
        geometry: DisplayGeometry,
        sink: Arc<dyn GestureSink>,
        hit_test: Arc<dyn HitTest>,
        overlay: Arc<dyn OverlayFeedback>,
    ) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Invalid engine config ({:#}); using defaults", e);
                EngineConfig::default()
            }
        };
        Self {
            id: Uuid::new_v4(),
            config,
            sink,
            hit_test,
            overlay,
            volume: None,
            geometry,
            running: None,
        }
    }

    /// Attach the media volume control used by volume intents
    pub fn with_volume(mut self, volume: Arc<dyn VolumeControl>) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Session id, stable across restarts
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Started, and not ended by a lost sink
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .map(|r| !r.token.is_cancelled())
            .unwrap_or(false)
    }

    /// Get a snapshot of the session for callers
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            id: self.id,
            running: self.is_running(),
            geometry: self.geometry,
        }
    }

    /// Start sampling `source` and executing actions.
    ///
    /// Returns false (and drops `source`) if the session is already running.
    pub async fn start(&mut self, source: Box<dyn TrackingSource>) -> bool {
        if self.is_running() {
            tracing::warn!("Session {} already running; ignoring start", self.id);
            return false;
        }
        // Clean up after a run that ended on its own
        self.stop().await;

        let token = CancellationToken::new();
        let (queue, worker) = WorkerHandle::spawn(self.config.strokes.clone(), self.sink.clone(), &token);
        let sampler = self.spawn_sampler(source, queue.clone(), &token);

        tracing::info!(
            "Session {} started ({} {}x{})",
            self.id,
            self.geometry.orientation,
            self.geometry.size.width,
            self.geometry.size.height
        );

        self.running = Some(Running {
            token,
            queue,
            worker,
            sampler,
        });
        true
    }

    /// Stop sampling, cancel any pending stroke wait and drop queued actions.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.token.cancel();
        drop(running.queue);
        running.sampler.shutdown().await;
        let exit = running.worker.shutdown().await;
        tracing::info!("Session {} stopped ({:?})", self.id, exit);
    }

    /// Wait for the source to run out, then let the worker finish the queue.
    pub async fn finish(&mut self) -> Option<WorkerExit> {
        let running = self.running.take()?;
        let Running {
            token,
            queue,
            worker,
            sampler,
        } = running;

        sampler.join_source().await;
        drop(queue);
        let exit = worker.wait().await;
        token.cancel();
        tracing::info!("Session {} finished ({:?})", self.id, exit);
        Some(exit)
    }

    /// Apply new display geometry.
    ///
    /// Both tasks are stopped before the change and restarted afterwards, so
    /// no gesture synthesis overlaps the switch. Executor state and the
    /// interaction state start over.
    pub async fn on_orientation_changed(&mut self, geometry: DisplayGeometry) {
        if geometry == self.geometry {
            return;
        }
        tracing::info!(
            "Display geometry changed to {} {}x{}",
            geometry.orientation,
            geometry.size.width,
            geometry.size.height
        );
        self.geometry = geometry;

        if !self.is_running() {
            return;
        }
        let Some(running) = self.running.take() else {
            return;
        };

        let source = running.sampler.shutdown().await;
        drop(running.queue);
        let exit = running.worker.shutdown().await;
        tracing::debug!("Worker restarted for new geometry ({:?})", exit);

        let Some(source) = source else {
            running.token.cancel();
            return;
        };

        let token = running.token;
        let (queue, worker) = WorkerHandle::spawn(self.config.strokes.clone(), self.sink.clone(), &token);
        let sampler = self.spawn_sampler(source, queue.clone(), &token);
        self.running = Some(Running {
            token,
            queue,
            worker,
            sampler,
        });
    }

    /// Queue a command directly; false when not running
    pub fn enqueue(&self, command: impl Into<Command>) -> bool {
        match &self.running {
            Some(running) if !running.token.is_cancelled() => running.queue.enqueue(command),
            _ => {
                tracing::debug!("Session {} not running; command dropped", self.id);
                false
            }
        }
    }

    /// Tap once at `at`, bypassing the dwell flow
    pub fn tap(&self, at: crate::geometry::Position) -> bool {
        self.enqueue(Action::tap(at))
    }

    /// Spread two fingers using the configured pinch preset
    pub fn zoom_in(&self) -> bool {
        let pinch = &self.config.pinch;
        self.enqueue(Action::zoom(pinch.near, pinch.anchor))
            && self.enqueue(Action::zoom(pinch.far, pinch.anchor))
            && self.enqueue(Command::TerminateZoom)
    }

    /// Pinch two fingers together using the configured pinch preset
    pub fn zoom_out(&self) -> bool {
        let pinch = &self.config.pinch;
        self.enqueue(Action::zoom(pinch.far, pinch.anchor))
            && self.enqueue(Action::zoom(pinch.near, pinch.anchor))
            && self.enqueue(Command::TerminateZoom)
    }

    /// Step the media volume; false when no volume control is attached
    pub fn adjust_volume(&self, direction: VolumeDirection) -> bool {
        match &self.volume {
            Some(volume) => {
                volume.adjust(direction);
                true
            }
            None => {
                tracing::warn!("No volume control attached; ignoring {:?}", direction);
                false
            }
        }
    }

    /// Return the state machine to the menu, releasing an open drag
    pub fn dismiss(&self) -> bool {
        self.send_control(SamplerControl::Dismiss)
    }

    /// Commit a selector without dwelling on its button
    pub fn select(&self, selector: Selector) -> bool {
        self.send_control(SamplerControl::Select(selector))
    }

    fn send_control(&self, control: SamplerControl) -> bool {
        match &self.running {
            Some(running) if !running.token.is_cancelled() => running.sampler.control.send(control).is_ok(),
            _ => false,
        }
    }

    fn spawn_sampler(
        &self,
        source: Box<dyn TrackingSource>,
        queue: ActionQueue,
        session: &CancellationToken,
    ) -> SamplerHandle {
        let cancel = session.child_token();
        let (control, control_rx) = mpsc::unbounded_channel();
        let sampler = Sampler {
            machine: InteractionMachine::new(
                self.config.dwell.clone(),
                (self.config.cursor.glyph_width, self.config.cursor.glyph_height),
            ),
            mapper: CursorMapper::new(self.config.cursor.clone()),
            geometry: self.geometry,
            hit_test: self.hit_test.clone(),
            overlay: self.overlay.clone(),
            queue,
        };
        let join = tokio::spawn(sampler.run(
            source,
            control_rx,
            self.config.dwell.tick_interval(),
            cancel.clone(),
        ));
        SamplerHandle {
            cancel,
            control,
            join,
        }
    }
}

/// Dropping a session without `stop()` still ends both tasks: the worker and
/// sampler tokens are children of the session token.
impl Drop for Session {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.token.cancel();
            tracing::debug!("Session {} dropped while running; tasks cancelled", self.id);
        }
    }
}

/// State owned by the sampling task
struct Sampler {
    machine: InteractionMachine,
    mapper: CursorMapper,
    geometry: DisplayGeometry,
    hit_test: Arc<dyn HitTest>,
    overlay: Arc<dyn OverlayFeedback>,
    queue: ActionQueue,
}

impl Sampler {
    async fn run(
        mut self,
        mut source: Box<dyn TrackingSource>,
        mut control: mpsc::UnboundedReceiver<SamplerControl>,
        tick: Duration,
        cancel: CancellationToken,
    ) -> Box<dyn TrackingSource> {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let source_id = source.id().to_string();
        tracing::debug!("Sampling {} every {:?} tick", source_id, tick);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(request) = control.recv() => {
                    let effects = match request {
                        SamplerControl::Dismiss => self.machine.dismiss(),
                        SamplerControl::Select(selector) => {
                            self.machine.select(selector, self.hit_test.as_ref()).unwrap_or_default()
                        }
                    };
                    self.apply(effects);
                }
                sample = source.next_sample() => match sample {
                    Some(sample) => {
                        let position = self.mapper.map(sample.raw(), sample.span, &self.geometry);
                        self.overlay.cursor_moved(position);
                        let effects = self.machine.on_sample(position, self.hit_test.as_ref());
                        self.apply(effects);
                    }
                    None => {
                        tracing::info!("Tracking source {} exhausted", source_id);
                        break;
                    }
                },
                _ = ticker.tick() => {
                    let effects = self.machine.on_tick(self.hit_test.as_ref());
                    self.apply(effects);
                }
            }
        }

        source
    }

    fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Execute(command) => {
                    tracing::debug!("Committed {}", command);
                    self.queue.enqueue(command);
                }
                Effect::PanelVisible(visible) => self.overlay.panel_visible(visible),
                Effect::Marker(at) => self.overlay.marker(at),
                Effect::Progress(fraction) => self.overlay.dwell_progress(fraction),
                Effect::MovePanel(origin) => self.overlay.move_panel(origin),
                Effect::DwellCompleted => self.overlay.dwell_completed(),
                Effect::CloseRequested => self.overlay.close_requested(),
            }
        }
    }
}

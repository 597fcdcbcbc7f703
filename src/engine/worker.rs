//! Serialized execution of queued commands
//!
//! A single task pulls commands from the queue, synthesizes each into a
//! gesture, dispatches it and then waits out the gesture's duration before
//! pulling the next one. The wait is what keeps two strokes from reaching
//! the OS while it is still performing the previous one.

use crate::config::StrokeTimings;
use crate::engine::action::Command;
use crate::engine::executor::ActionExecutor;
use crate::engine::sink::{GestureSink, SinkError};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Producer side of the action queue. Enqueueing never blocks.
#[derive(Debug, Clone)]
pub struct ActionQueue {
    tx: mpsc::UnboundedSender<Command>,
}

impl ActionQueue {
    /// Queue a command; returns false once the worker has gone away
    pub fn enqueue(&self, command: impl Into<Command>) -> bool {
        let command = command.into();
        match self.tx.send(command) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("Action queue closed; dropping {}", command);
                false
            }
        }
    }
}

/// Why the worker stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Every producer was dropped and the queue ran empty
    Drained,
    /// Cancelled; `dropped` queued commands were discarded
    Cancelled { dropped: usize },
    /// The sink reported a lost connection
    SinkLost,
}

/// Handle to a running worker task
pub struct WorkerHandle {
    cancel: CancellationToken,
    join: JoinHandle<WorkerExit>,
}

impl WorkerHandle {
    /// Spawn a worker with fresh executor state.
    ///
    /// `session` is cancelled by the worker if the sink disconnects; the
    /// worker's own token is a child of it, so cancelling the session also
    /// stops the worker.
    pub fn spawn(
        timings: StrokeTimings,
        sink: Arc<dyn GestureSink>,
        session: &CancellationToken,
    ) -> (ActionQueue, WorkerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = session.child_token();
        let join = tokio::spawn(run_worker(
            ActionExecutor::new(timings),
            rx,
            sink,
            cancel.clone(),
            session.clone(),
        ));
        (ActionQueue { tx }, WorkerHandle { cancel, join })
    }

    /// Cancel any pending wait, drop the queue and wait for the task to end
    pub async fn shutdown(self) -> WorkerExit {
        self.cancel.cancel();
        self.wait().await
    }

    /// Wait for the task to end on its own. Returns once every queue clone
    /// is dropped and the remaining commands have run.
    pub async fn wait(self) -> WorkerExit {
        match self.join.await {
            Ok(exit) => exit,
            Err(e) => {
                tracing::error!("Action worker task failed: {}", e);
                WorkerExit::Cancelled { dropped: 0 }
            }
        }
    }
}

/// Worker loop. Owns the executor (and with it all continuation state).
pub async fn run_worker(
    mut executor: ActionExecutor,
    mut rx: mpsc::UnboundedReceiver<Command>,
    sink: Arc<dyn GestureSink>,
    cancel: CancellationToken,
    session: CancellationToken,
) -> WorkerExit {
    tracing::debug!("Action worker started");

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            next = rx.recv() => Some(next),
        };
        let command = match next {
            None => return discard(&mut executor, &mut rx),
            Some(None) => {
                tracing::debug!("Action queue drained");
                return WorkerExit::Drained;
            }
            Some(Some(command)) => command,
        };

        let Some(gesture) = executor.synthesize(command) else {
            continue;
        };

        match sink.dispatch(&gesture).await {
            Ok(()) => {
                tracing::debug!(
                    "Dispatched {} ({} strokes, {:?})",
                    command,
                    gesture.strokes.len(),
                    gesture.duration()
                );
            }
            Err(SinkError::Rejected(reason)) => {
                tracing::warn!("Sink rejected {}: {}", command, reason);
                continue;
            }
            Err(SinkError::Disconnected) => {
                tracing::error!("Gesture sink disconnected; ending session");
                executor.reset();
                session.cancel();
                return WorkerExit::SinkLost;
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return discard(&mut executor, &mut rx),
            _ = tokio::time::sleep(gesture.duration()) => {}
        }
    }
}

fn discard(executor: &mut ActionExecutor, rx: &mut mpsc::UnboundedReceiver<Command>) -> WorkerExit {
    rx.close();
    let mut dropped = 0;
    while rx.try_recv().is_ok() {
        dropped += 1;
    }
    executor.reset();
    tracing::info!("Action worker cancelled ({} queued commands dropped)", dropped);
    WorkerExit::Cancelled { dropped }
}

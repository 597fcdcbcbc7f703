//! Gesture engine
//!
//! Turns committed actions into synthetic touch gestures:
//! - `action`: what the user asked for
//! - `executor`: action to stroke synthesis, including drag and zoom continuations
//! - `worker`: the queue and the task that dispatches one gesture at a time
//! - `session`: ties tracking, the state machine and the worker together

pub mod action;
pub mod executor;
pub mod gesture;
pub mod overlay;
pub mod session;
pub mod sink;
pub mod worker;

pub use action::{Action, Command};
pub use executor::{ActionExecutor, ExecutorState};
pub use gesture::{Gesture, Stroke, StrokeHandle};
pub use overlay::{NullOverlay, OverlayFeedback, VolumeControl, VolumeDirection};
pub use session::{Session, SessionStatus};
pub use sink::{GestureSink, LoggingSink, RecordingSink, SinkError, SinkResult};
pub use worker::{ActionQueue, WorkerExit, WorkerHandle};

//! Session control commands

use crate::capture::tracking::TrackingSource;
use crate::engine::overlay::VolumeDirection;
use crate::engine::session::{Session, SessionStatus};
use crate::geometry::{DisplayGeometry, Position};
use crate::interaction::targets::Selector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the one session a host drives
#[derive(Clone, Default)]
pub struct SessionState {
    pub session: Arc<Mutex<Option<Session>>>,
}

impl SessionState {
    /// Create state holding `session`
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(Some(session))),
        }
    }
}

/// Direct requests from the host UI, outside the dwell flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum Intent {
    Tap { at: Position },
    ZoomIn,
    ZoomOut,
    Volume { direction: VolumeDirection },
    Select { selector: Selector },
    Dismiss,
}

const NO_SESSION: &str = "No session installed";

/// Replace the installed session, stopping the previous one
pub async fn install_session(state: &SessionState, session: Session) {
    let mut guard = state.session.lock().await;
    if let Some(previous) = guard.as_mut() {
        previous.stop().await;
    }
    *guard = Some(session);
}

/// Start the session; Ok(false) if it was already running
pub async fn start_session(state: &SessionState, source: Box<dyn TrackingSource>) -> Result<bool, String> {
    let mut guard = state.session.lock().await;
    let session = guard.as_mut().ok_or_else(|| NO_SESSION.to_string())?;
    Ok(session.start(source).await)
}

/// Stop the session. Stopping a stopped session is fine.
pub async fn stop_session(state: &SessionState) -> Result<(), String> {
    let mut guard = state.session.lock().await;
    let session = guard.as_mut().ok_or_else(|| NO_SESSION.to_string())?;
    session.stop().await;
    Ok(())
}

/// Apply new display geometry to the session
pub async fn orientation_changed(state: &SessionState, geometry: DisplayGeometry) -> Result<(), String> {
    let mut guard = state.session.lock().await;
    let session = guard.as_mut().ok_or_else(|| NO_SESSION.to_string())?;
    session.on_orientation_changed(geometry).await;
    Ok(())
}

/// Get the current session status
pub async fn session_status(state: &SessionState) -> Result<SessionStatus, String> {
    let guard = state.session.lock().await;
    guard.as_ref().map(Session::status).ok_or_else(|| NO_SESSION.to_string())
}

/// Forward an intent; Ok(false) if the session is not running
pub async fn submit_intent(state: &SessionState, intent: Intent) -> Result<bool, String> {
    let guard = state.session.lock().await;
    let session = guard.as_ref().ok_or_else(|| NO_SESSION.to_string())?;

    if !session.is_running() {
        return Ok(false);
    }
    let accepted = match intent {
        Intent::Tap { at } => {
            if !at.is_finite() || !at.is_non_negative() {
                return Err(format!("Invalid tap position ({}, {})", at.x, at.y));
            }
            session.tap(at)
        }
        Intent::ZoomIn => session.zoom_in(),
        Intent::ZoomOut => session.zoom_out(),
        Intent::Volume { direction } => session.adjust_volume(direction),
        Intent::Select { selector } => session.select(selector),
        Intent::Dismiss => session.dismiss(),
    };
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::tracking::ChannelTrackingSource;
    use crate::config::EngineConfig;
    use crate::engine::overlay::{NullOverlay, VolumeControl};
    use crate::engine::sink::RecordingSink;
    use crate::geometry::{Orientation, ScreenSize};
    use crate::interaction::targets::TargetLayout;
    use parking_lot::Mutex as ParkingMutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingVolume {
        steps: ParkingMutex<Vec<VolumeDirection>>,
    }

    impl VolumeControl for RecordingVolume {
        fn adjust(&self, direction: VolumeDirection) {
            self.steps.lock().push(direction);
        }
    }

    fn geometry() -> DisplayGeometry {
        DisplayGeometry::new(ScreenSize::new(1080.0, 2400.0), Orientation::Portrait)
    }

    fn session_with(sink: Arc<RecordingSink>) -> Session {
        Session::new(
            EngineConfig::default(),
            geometry(),
            sink,
            Arc::new(TargetLayout::new()),
            Arc::new(NullOverlay),
        )
    }

    fn state_with(sink: Arc<RecordingSink>) -> SessionState {
        SessionState::new(session_with(sink))
    }

    #[tokio::test]
    async fn test_commands_without_session() {
        let state = SessionState::default();
        assert!(stop_session(&state).await.is_err());
        assert!(session_status(&state).await.is_err());
        assert!(submit_intent(&state, Intent::ZoomIn).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tap_intent_reaches_sink() {
        let sink = Arc::new(RecordingSink::new());
        let state = state_with(sink.clone());
        let (_tx, source) = ChannelTrackingSource::new(8);

        assert!(start_session(&state, Box::new(source)).await.unwrap());
        assert!(session_status(&state).await.unwrap().running);

        let accepted = submit_intent(&state, Intent::Tap { at: Position::new(10.0, 20.0) })
            .await
            .unwrap();
        assert!(accepted);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(sink.gestures()[0].strokes[0].path, vec![Position::new(10.0, 20.0)]);

        stop_session(&state).await.unwrap();
        assert!(!session_status(&state).await.unwrap().running);
        assert!(!submit_intent(&state, Intent::ZoomOut).await.unwrap());
    }

    #[tokio::test]
    async fn test_negative_tap_rejected() {
        let state = state_with(Arc::new(RecordingSink::new()));
        let (_tx, source) = ChannelTrackingSource::new(8);
        start_session(&state, Box::new(source)).await.unwrap();

        let result = submit_intent(&state, Intent::Tap { at: Position::new(-1.0, 5.0) }).await;
        assert!(result.is_err());
        stop_session(&state).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_volume_intents_reach_control() {
        let volume = Arc::new(RecordingVolume::default());
        let session = session_with(Arc::new(RecordingSink::new())).with_volume(volume.clone());
        let state = SessionState::new(session);
        let (_tx, source) = ChannelTrackingSource::new(8);
        start_session(&state, Box::new(source)).await.unwrap();

        let up = Intent::Volume { direction: VolumeDirection::Up };
        let down = Intent::Volume { direction: VolumeDirection::Down };
        assert!(submit_intent(&state, up).await.unwrap());
        assert!(submit_intent(&state, down).await.unwrap());
        assert_eq!(*volume.steps.lock(), vec![VolumeDirection::Up, VolumeDirection::Down]);

        stop_session(&state).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_volume_without_control_is_refused() {
        let state = state_with(Arc::new(RecordingSink::new()));
        let (_tx, source) = ChannelTrackingSource::new(8);
        start_session(&state, Box::new(source)).await.unwrap();

        let accepted = submit_intent(&state, Intent::Volume { direction: VolumeDirection::Up })
            .await
            .unwrap();
        assert!(!accepted);
        stop_session(&state).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_install_session_stops_previous() {
        let first_sink = Arc::new(RecordingSink::new());
        let state = state_with(first_sink.clone());
        let (_tx, source) = ChannelTrackingSource::new(8);
        start_session(&state, Box::new(source)).await.unwrap();
        let first_id = session_status(&state).await.unwrap().id;

        // The second zoom waits behind the first one's 200 ms strokes
        submit_intent(&state, Intent::ZoomIn).await.unwrap();
        submit_intent(&state, Intent::ZoomIn).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(first_sink.len(), 1);

        install_session(&state, session_with(Arc::new(RecordingSink::new()))).await;
        let status = session_status(&state).await.unwrap();
        assert_ne!(status.id, first_id);
        assert!(!status.running);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(first_sink.len(), 1);
    }

    #[test]
    fn test_intent_wire_format() {
        let intent: Intent = serde_json::from_str(r#"{"intent":"volume","direction":"up"}"#).unwrap();
        assert_eq!(intent, Intent::Volume { direction: VolumeDirection::Up });

        let intent: Intent = serde_json::from_str(r#"{"intent":"select","selector":"drag"}"#).unwrap();
        assert_eq!(intent, Intent::Select { selector: Selector::Drag });
    }
}

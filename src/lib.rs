//! Hands-free - touchscreen control without touching the screen.
//!
//! This is the main library crate. It maps hand tracking samples to a
//! cursor, selects interactions by dwelling, and turns them into synthetic
//! touch gestures dispatched one at a time.

pub mod capture;
pub mod commands;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod interaction;
pub mod processing;

use anyhow::Context;
use capture::tracking::{ReplayScript, ReplayTrackingSource};
use commands::session::SessionState;
use config::EngineConfig;
use engine::{LoggingSink, Session};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hands_free_lib=debug,hands_free=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    // A host or test harness may have installed its own subscriber first
    if let Err(e) = installed {
        tracing::debug!("Keeping existing tracing subscriber: {}", e);
    }
}

/// Play a recorded tracking session through the engine.
///
/// Usage: `hands-free <replay.json> [config.json]`
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting Hands-free v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let script_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .context("usage: hands-free <replay.json> [config.json]")?;
    let config = match args.next() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let script = ReplayScript::load(&script_path)
        .with_context(|| format!("Failed to load replay script {}", script_path.display()))?;
    tracing::info!(
        "Loaded {} samples and {} targets from {}",
        script.samples.len(),
        script.targets.len(),
        script_path.display()
    );

    let layout = Arc::new(script.layout());
    let session = Session::new(
        config,
        script.geometry(),
        Arc::new(LoggingSink),
        layout.clone(),
        layout,
    );
    let state = SessionState::new(session);

    let source = Box::new(ReplayTrackingSource::new(script.samples));
    commands::session::start_session(&state, source)
        .await
        .map_err(anyhow::Error::msg)?;

    let mut guard = state.session.lock().await;
    if let Some(session) = guard.as_mut() {
        let exit = session.finish().await;
        tracing::info!("Replay complete ({:?})", exit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        // The second call finds the subscriber already installed
        init_tracing();
        tracing::info!("still logging");
    }
}

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use solar_audio::error::AppResult;
use solar_audio::{AudioConfig, AudioEngine};

const LOG_TARGET_STARTUP: &str = "solar_audio::startup";

/// Initialize tracing with file rotation
///
/// Logs are written to `<data dir>/SolarAudio/logs/solar-audio.YYYY-MM-DD.log`
/// and mirrored to the console. `RUST_LOG` overrides the default `info` filter.
fn initialize_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("SolarAudio").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    // Daily rotation, written off the calling thread
    let file_appender = rolling::daily(&log_dir, "solar-audio.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!(target: LOG_TARGET_STARTUP, "Log directory: {}", log_dir.display());
    guard
}

fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config").join("audio.json"))
}

/// Plays through the sequence a visitor triggers: menu music, a few
/// button clicks, then a launch with the engine throttling down.
fn run_demo(engine: &AudioEngine) {
    if let Err(e) = engine.play_background() {
        tracing::warn!("Sound needs a user gesture or is missing: {}", e);
    }
    // Second request is ignored while the loop is playing
    let _ = engine.play_background();
    tracing::info!("Background playing: {}", engine.background_state());

    for _ in 0..3 {
        engine.play_hover();
        thread::sleep(Duration::from_millis(150));
        engine.play_click();
        thread::sleep(Duration::from_millis(250));
    }

    engine.play_engine();
    engine.play_engine();
    tracing::info!("Engine playing: {}", engine.is_engine_playing());
    thread::sleep(Duration::from_secs(2));

    engine.fade_engine(0.3, 1500);
    thread::sleep(Duration::from_millis(1500));
    engine.fade_engine(0.0, 800);
    thread::sleep(Duration::from_millis(800));
    engine.stop_engine();

    thread::sleep(Duration::from_secs(1));
    engine.stop_background();
    engine.stop_background();
}

fn main() -> AppResult<()> {
    let _log_guard = initialize_tracing();
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting solar-audio demo v{} on {}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH
    );

    let path = config_path();
    let config = AudioConfig::load(&path)
        .with_context(|| format!("loading audio config from {}", path.display()))?;
    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Sound assets: {}",
        config.asset_dir.display()
    );

    let engine = AudioEngine::with_default_output(&config);
    engine.preload();
    run_demo(&engine);
    engine.shutdown();

    tracing::info!(target: LOG_TARGET_STARTUP, "Demo finished");
    Ok(())
}

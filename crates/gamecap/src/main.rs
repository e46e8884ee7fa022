//! GameCap: hotkey-driven gameplay recording with synchronized input logs.

mod app;
mod command_recorder;
mod config;
mod error;
mod host_info;
mod line_source;
mod process_probe;

pub(crate) use {
    app::App,
    command_recorder::CommandRecorder,
    error::{AppError, Result as AppResult},
    line_source::LineEventSource,
    process_probe::SysinfoProbe,
};

use crate::config::Config;

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use gamecap_core::{
    EventTracker, Orchestrator, TimedEvent, input::poll_interval_for, recorder::notice_channel,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "gamecap=debug,gamecap_core=debug";
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Application entry point.
#[tokio::main]
async fn main() {
    let _log_guard = match init_logging() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            std::process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!(error = ?e, "App error");
        std::process::exit(1);
    }
}

/// Install stderr and daily-rolling file logging.
#[track_caller]
fn init_logging() -> AppResult<WorkerGuard> {
    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "gamecap.log"));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .map_err(|e| AppError::LoggingError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

    Ok(guard)
}

/// Wire the collaborators into the core and run until Ctrl+C.
async fn run(config: Config) -> AppResult<()> {
    let host = host_info::collect();

    let (notifier, notices) = notice_channel();
    let recorder = CommandRecorder::new(
        config.recorder.program.clone(),
        config.recorder.args.clone(),
        notifier,
    );
    let probe = Arc::new(SysinfoProbe::new(&config.targets.allow));
    let orchestrator = Orchestrator::new(
        config.recorder_settings(),
        host,
        Box::new(recorder),
        notices,
        probe,
    );

    let hotkeys = App::bind_hotkeys(&config.hotkeys, &orchestrator)?;

    let poll_interval = poll_interval_for(config.capture.fps, config.capture.polls_per_frame);
    let mut tracker = EventTracker::new(
        LineEventSource::stdin(),
        orchestrator.activity(),
        poll_interval,
    );
    let session_log = orchestrator.session_log();
    tracker.on_any(Arc::new(move |event: &TimedEvent| {
        session_log.append_event(event);
    }));

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let tracker_handle = tokio::spawn(tracker.run(events_tx, shutdown_rx.clone()));

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!(error = ?e, "Failed to listen for Ctrl+C");
                // Dropping the sender would read as a shutdown request.
                std::future::pending::<()>().await;
            }
        }
    });

    info!(
        recording_root = ?config.storage.recording_root,
        start_key = %config.hotkeys.start_key,
        stop_key = %config.hotkeys.stop_key,
        "Ready"
    );

    let app = App {
        orchestrator,
        hotkeys,
        events_rx,
        shutdown_rx,
    };
    app.run().await?;

    match tracker_handle.await {
        Ok(Ok(())) => info!("Event tracker stopped cleanly"),
        Ok(Err(e)) => error!(error = ?e, "Event tracker failed"),
        Err(e) => error!(error = ?e, "Event tracker task panicked"),
    }

    Ok(())
}

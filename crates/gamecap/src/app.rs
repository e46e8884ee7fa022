use crate::{AppResult, config::HotkeysConfig};

use gamecap_core::{
    CoreError, HotkeyManager, Orchestrator, TimedEvent, Trigger, hotkey::action,
};
use tokio::sync::{mpsc, watch};
use tracing::{info, instrument};

/// Main application state.
///
/// Receives forwarded input from the event tracker and dispatches
/// keyboard presses to hotkey actions, one at a time.
pub struct App {
    pub(crate) orchestrator: Orchestrator,
    pub(crate) hotkeys: HotkeyManager,
    pub(crate) events_rx: mpsc::Receiver<TimedEvent>,
    pub(crate) shutdown_rx: watch::Receiver<bool>,
}

impl App {
    /// Bind the start and stop hotkeys to the orchestrator.
    #[track_caller]
    pub(crate) fn bind_hotkeys(
        config: &HotkeysConfig,
        orchestrator: &Orchestrator,
    ) -> AppResult<HotkeyManager> {
        let mut hotkeys = HotkeyManager::new();

        let start = orchestrator.clone();
        hotkeys.bind(
            &config.start_key,
            action(move || {
                let orchestrator = start.clone();
                async move {
                    orchestrator.start(Trigger::Manual).await?;
                    Ok::<(), CoreError>(())
                }
            }),
        )?;

        let stop = orchestrator.clone();
        hotkeys.bind(
            &config.stop_key,
            action(move || {
                let orchestrator = stop.clone();
                async move {
                    orchestrator.stop(Trigger::Manual).await;
                    Ok::<(), CoreError>(())
                }
            }),
        )?;

        Ok(hotkeys)
    }

    /// Run the dispatch loop until shutdown, then close any session.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("GameCap starting");

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => {
                    info!("Shutdown requested");
                    break;
                }

                event = self.events_rx.recv() => {
                    let Some(event) = event else {
                        info!("Event stream closed, shutting down");
                        break;
                    };
                    self.hotkeys.on_event(&event).await;
                }
            }
        }

        self.orchestrator.shutdown().await;
        info!("GameCap shut down successfully");

        Ok(())
    }
}

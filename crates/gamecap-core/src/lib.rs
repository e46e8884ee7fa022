//! Gamecap Core Library
//!
//! Input capture and session recording: raw input is debounced, timestamped,
//! and dispatched to handlers; hotkeys drive a recording orchestrator that
//! keeps a video recorder, a per-session input log, and session metadata in
//! lockstep, with background monitors for target liveness, inactivity, and
//! maximum session length.
//!
//! # Example
//!
//! ```no_run
//! use gamecap_core::{CoreResult, Orchestrator, Trigger};
//!
//! async fn toggle(orchestrator: &Orchestrator) -> CoreResult<()> {
//!     if orchestrator.state().is_recording() {
//!         orchestrator.stop(Trigger::Manual).await;
//!     } else {
//!         orchestrator.start(Trigger::Manual).await?;
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod hotkey;
pub mod input;
pub mod recorder;
pub mod session;

pub use {
    error::{CoreError, Result as CoreResult},
    hotkey::HotkeyManager,
    input::{EventTracker, InputEvent, TimedEvent},
    recorder::{Orchestrator, RecorderState, Trigger},
    session::SessionLog,
};

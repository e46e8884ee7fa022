//! Edge-triggered hotkey dispatch.
//!
//! Actions run to completion before the next keyboard event is handled.
//! Each invocation runs on its own task so that an error or a panic inside
//! an action is logged here instead of tearing down the dispatch loop.

use crate::{
    CoreError, CoreResult,
    hotkey::{key_name, lookup_keycode},
    input::TimedEvent,
};

use std::{collections::HashMap, future::Future, panic::Location, pin::Pin, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Future returned by a [`HotkeyAction`].
pub type HotkeyFuture = Pin<Box<dyn Future<Output = CoreResult<()>> + Send + 'static>>;

/// Asynchronous action bound to a key.
pub type HotkeyAction = Arc<dyn Fn() -> HotkeyFuture + Send + Sync>;

/// Wrap an async closure as a [`HotkeyAction`].
pub fn action<F, Fut>(f: F) -> HotkeyAction
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CoreResult<()>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()))
}

/// Maps keycodes to actions, at most one per key.
#[derive(Default)]
pub struct HotkeyManager {
    bindings: HashMap<u16, HotkeyAction>,
}

impl HotkeyManager {
    /// Create a manager with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the key named `key`, replacing any existing binding.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownKey`] if `key` does not name a key.
    #[track_caller]
    pub fn bind(&mut self, key: &str, action: HotkeyAction) -> CoreResult<u16> {
        let keycode = lookup_keycode(key).ok_or_else(|| CoreError::UnknownKey {
            key: key.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        self.bind_keycode(keycode, action);
        info!(key, keycode, "Hotkey bound");

        Ok(keycode)
    }

    /// Bind a raw keycode. Returns the binding it replaced, if any.
    pub fn bind_keycode(&mut self, keycode: u16, action: HotkeyAction) -> Option<HotkeyAction> {
        self.bindings.insert(keycode, action)
    }

    /// Whether `keycode` has a binding.
    pub fn is_bound(&self, keycode: u16) -> bool {
        self.bindings.contains_key(&keycode)
    }

    /// Run the action bound to this event's key, if it is a press.
    ///
    /// Returns `true` if an action was invoked, whether or not it succeeded.
    #[instrument(skip_all)]
    pub async fn on_event(&self, event: &TimedEvent) -> bool {
        let Some(keycode) = event.event.key_press() else {
            return false;
        };
        let Some(action) = self.bindings.get(&keycode) else {
            return false;
        };

        let key = key_name(keycode).unwrap_or_else(|| keycode.to_string());
        debug!(key = %key, "Hotkey pressed");

        match tokio::spawn(action()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!(key = %key, error = ?e, "Hotkey action failed"),
            Err(e) => error!(key = %key, error = ?e, "Hotkey action panicked"),
        }

        true
    }
}

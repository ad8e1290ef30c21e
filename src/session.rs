//! Session termination: the logout action and its confirmation prompt.
//!
//! [`LogoutAction`] is the built-in behavior bound to session-ending chords.
//! On trigger it first shows a confirmation through the injected
//! [`Notifier`], then invokes the host-supplied [`LogoutCallback`]. The order
//! is fixed: the user always sees the prompt before the session goes away.
//! The action itself never touches credentials or session state; tearing the
//! session down is entirely the callback's business.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tracing::info;

use crate::action::ShortcutAction;
use crate::notify::Notifier;

/// Confirmation text shown before the logout callback runs.
pub const LOGOUT_PROMPT: &str = "Logging you out";

/// Host-supplied hook that ends the session.
///
/// Zero arguments by contract: everything the hook needs is captured at
/// construction time. Cloning is cheap, so one callback can back several
/// bindings.
pub type LogoutCallback = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Shows a confirmation, then ends the session via the injected callback.
pub struct LogoutAction {
    notifier: Arc<dyn Notifier>,
    on_logout: LogoutCallback,
    prompt: String,
}

impl LogoutAction {
    /// Creates the action with the default [`LOGOUT_PROMPT`].
    pub fn new(notifier: Arc<dyn Notifier>, on_logout: LogoutCallback) -> Self {
        Self {
            notifier,
            on_logout,
            prompt: LOGOUT_PROMPT.to_string(),
        }
    }

    /// Replaces the confirmation text.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The confirmation text this action shows.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

impl ShortcutAction for LogoutAction {
    fn trigger(&self) -> Result<()> {
        // Prompt first, session teardown second.
        self.notifier.alert(&self.prompt);
        info!("logout confirmation shown, running logout callback");
        (self.on_logout)()
    }
}

impl fmt::Debug for LogoutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoutAction")
            .field("prompt", &self.prompt)
            .field("on_logout", &"<callback>")
            .finish()
    }
}

//! The shortcut dispatcher task.
//!
//! ## Architecture
//!
//! All binding state lives inside [`ShortcutDispatcher`], which runs as a
//! single Tokio task. It listens on two channels at once:
//!
//! - a command channel carrying [`DispatcherCommand`]s (bind, unbind,
//!   introspection, shutdown), each with its own reply channel, and
//! - an event channel subscribed to the input bus.
//!
//! Because one task owns everything, no locks guard the registry and the
//! semantics stay sequential: events are dispatched one at a time in arrival
//! order, and every binding whose chord matches runs before the next event
//! is considered. An event that matches nothing is a no-op; it is still
//! delivered to any other bus subscribers, since the dispatcher only ever
//! reads its own subscription.
//!
//! Action errors are contained here: a failing action is logged, counted in
//! [`DispatcherStats`], and the loop moves on.
//!
//! ## Handles
//!
//! Callers that register bindings at runtime get a [`BindingHandle`] tied to
//! the binding's id. Dropping the handle releases the binding (best effort);
//! [`BindingHandle::unbind`] does the same deterministically and reports
//! whether the binding was still present.

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::error::{AppResult, KeychordError};
use crate::input::KeyEvent;
use crate::messages::{DispatcherCommand, DispatcherStats};
use crate::registry::{BindError, Binding, BindingRegistry};

/// Single-owner dispatch state: the binding registry plus run counters.
#[derive(Debug, Default)]
pub struct ShortcutDispatcher {
    registry: BindingRegistry,
    stats: DispatcherStats,
}

impl ShortcutDispatcher {
    /// Creates a dispatcher with no bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dispatcher preloaded with `bindings`, preserving their
    /// order. Fails on duplicate or empty ids.
    pub fn with_bindings(bindings: Vec<Binding>) -> Result<Self, BindError> {
        let mut dispatcher = Self::new();
        for binding in bindings {
            dispatcher.registry.insert(binding)?;
        }
        Ok(dispatcher)
    }

    /// Runs the dispatch loop until a `Shutdown` command arrives or both
    /// channels close. Consumes the dispatcher; state cannot be touched from
    /// outside once the loop is running.
    pub async fn run(
        mut self,
        mut command_rx: mpsc::Receiver<DispatcherCommand>,
        mut event_rx: mpsc::Receiver<KeyEvent>,
    ) {
        info!(bindings = self.registry.len(), "shortcut dispatcher started");

        loop {
            tokio::select! {
                Some(command) = command_rx.recv() => {
                    match command {
                        DispatcherCommand::Bind { binding, response } => {
                            let id = binding.id().to_string();
                            let result = self.registry.insert(binding).map(|()| id.clone());
                            match &result {
                                Ok(_) => info!(id = %id, "binding registered"),
                                Err(error) => debug!(id = %id, %error, "binding rejected"),
                            }
                            let _ = response.send(result);
                        }
                        DispatcherCommand::Unbind { id, response } => {
                            let removed = self.registry.remove(&id);
                            if removed {
                                info!(id = %id, "binding released");
                            } else {
                                debug!(id = %id, "unbind for unknown binding");
                            }
                            let _ = response.send(removed);
                        }
                        DispatcherCommand::ListBindings { response } => {
                            let _ = response.send(self.registry.summaries());
                        }
                        DispatcherCommand::Stats { response } => {
                            let _ = response.send(self.stats);
                        }
                        DispatcherCommand::Shutdown { response } => {
                            info!(
                                events_seen = self.stats.events_seen,
                                triggers = self.stats.triggers,
                                "shortcut dispatcher stopping"
                            );
                            let _ = response.send(());
                            break;
                        }
                    }
                }
                Some(event) = event_rx.recv() => {
                    self.handle_event(&event);
                }
                else => {
                    info!("dispatcher channels closed, stopping");
                    break;
                }
            }
        }
    }

    /// Dispatches one event: every matching binding fires, in registration
    /// order. Failures are logged and counted, never propagated.
    fn handle_event(&mut self, event: &KeyEvent) {
        self.stats.events_seen += 1;

        let mut matched = 0u32;
        for binding in self.registry.matching(event) {
            matched += 1;
            match binding.trigger() {
                Ok(()) => {
                    self.stats.triggers += 1;
                    debug!(id = binding.id(), chord = %binding.chord(), "shortcut fired");
                }
                Err(error) => {
                    self.stats.failures += 1;
                    error!(id = binding.id(), %error, "shortcut action failed");
                }
            }
        }

        if matched == 0 {
            trace!(key = ?event.key, "no binding matched event");
        }
    }
}

/// Scoped handle to a registered binding.
///
/// Holding the handle keeps the binding registered. Dropping it sends a
/// best-effort unbind to the dispatcher; call [`unbind`](Self::unbind) to
/// release deterministically, or [`detach`](Self::detach) to leave the
/// binding in place for the dispatcher's lifetime.
#[derive(Debug)]
pub struct BindingHandle {
    id: String,
    command_tx: mpsc::Sender<DispatcherCommand>,
    released: bool,
}

impl BindingHandle {
    pub(crate) fn new(id: String, command_tx: mpsc::Sender<DispatcherCommand>) -> Self {
        Self {
            id,
            command_tx,
            released: false,
        }
    }

    /// The id of the binding this handle controls.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Releases the binding and waits for the dispatcher to confirm.
    /// Returns whether the binding was still registered.
    pub async fn unbind(mut self) -> AppResult<bool> {
        self.released = true;
        let (command, reply) = DispatcherCommand::unbind(self.id.clone());
        self.command_tx
            .send(command)
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher stopped".to_string()))?;
        reply
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher dropped unbind reply".to_string()))
    }

    /// Consumes the handle without releasing the binding.
    pub fn detach(mut self) {
        self.released = true;
    }
}

impl Drop for BindingHandle {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let (command, _reply) = DispatcherCommand::unbind(self.id.clone());
        match self.command_tx.try_send(command) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!(id = %self.id, "binding handle dropped after dispatcher stopped");
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(id = %self.id, "dispatcher mailbox full, binding not released on drop");
            }
        }
    }
}

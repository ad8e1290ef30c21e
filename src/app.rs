//! Application facade: wires the bus, the dispatcher, and the session hooks
//! together and owns the Tokio runtime they run on.
//!
//! [`KeychordApp::new`] reads the shortcut table from [`Settings`], binds
//! every enabled entry to a [`LogoutAction`] built from the injected
//! [`Notifier`] and [`LogoutCallback`], subscribes the dispatcher to the
//! input bus, and spawns the dispatch loop. Hosts embed the app, push key
//! events with [`broadcast`](KeychordApp::broadcast) (or through the bus
//! directly), and call [`shutdown`](KeychordApp::shutdown) at teardown.
//!
//! The async methods must run on the app's own runtime; from synchronous
//! code, drive them with `app.get_runtime().block_on(...)`. `shutdown` is
//! synchronous and must be called from outside the runtime.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::action::ShortcutAction;
use crate::chord::{ChordParseError, KeyChord};
use crate::config::Settings;
use crate::dispatcher::{BindingHandle, ShortcutDispatcher};
use crate::error::{AppResult, KeychordError};
use crate::input::{InputDistributor, KeyEvent};
use crate::messages::{DispatcherCommand, DispatcherStats};
use crate::notify::Notifier;
use crate::registry::{Binding, BindingSummary};
use crate::session::{LogoutAction, LogoutCallback};

/// The assembled shortcut service.
pub struct KeychordApp {
    settings: Arc<Settings>,
    runtime: Arc<Runtime>,
    bus: Arc<InputDistributor>,
    command_tx: mpsc::Sender<DispatcherCommand>,
    dispatcher_task: Mutex<Option<JoinHandle<()>>>,
}

impl KeychordApp {
    /// Builds the service: creates the runtime and the input bus, installs
    /// every enabled configured shortcut as a logout binding, and starts the
    /// dispatcher task.
    pub fn new(
        settings: Arc<Settings>,
        notifier: Arc<dyn Notifier>,
        on_logout: LogoutCallback,
    ) -> AppResult<Self> {
        let runtime = Arc::new(Runtime::new().map_err(KeychordError::Tokio)?);
        let bus = Arc::new(InputDistributor::new(settings.dispatcher.subscriber_capacity));
        let (command_tx, command_rx) =
            mpsc::channel(settings.dispatcher.mailbox_capacity.max(1));

        let mut initial = Vec::new();
        for definition in settings.enabled_shortcuts() {
            let chord: KeyChord = definition.chord.parse().map_err(|e: ChordParseError| {
                KeychordError::Configuration(format!(
                    "Shortcut '{}' has an invalid chord '{}': {}",
                    definition.id, definition.chord, e
                ))
            })?;
            let mut action = LogoutAction::new(notifier.clone(), on_logout.clone());
            if let Some(prompt) = &definition.prompt {
                action = action.with_prompt(prompt.clone());
            }
            initial.push(Binding::new(&definition.id, chord, Box::new(action)));
            info!(id = %definition.id, chord = %chord, "configured shortcut installed");
        }

        let dispatcher = ShortcutDispatcher::with_bindings(initial)?;
        let event_rx = runtime.block_on(bus.subscribe());
        let dispatcher_task = runtime.spawn(dispatcher.run(command_rx, event_rx));

        Ok(Self {
            settings,
            runtime,
            bus,
            command_tx,
            dispatcher_task: Mutex::new(Some(dispatcher_task)),
        })
    }

    /// Registers an action under a generated id. The returned handle keeps
    /// the binding alive; dropping it releases the binding.
    pub async fn bind(
        &self,
        chord: KeyChord,
        action: Box<dyn ShortcutAction>,
    ) -> AppResult<BindingHandle> {
        self.register(Binding::with_generated_id(chord, action)).await
    }

    /// Registers an action under an explicit id.
    pub async fn bind_named(
        &self,
        id: impl Into<String>,
        chord: KeyChord,
        action: Box<dyn ShortcutAction>,
    ) -> AppResult<BindingHandle> {
        self.register(Binding::new(id, chord, action)).await
    }

    async fn register(&self, binding: Binding) -> AppResult<BindingHandle> {
        let (command, reply) = DispatcherCommand::bind(binding);
        self.send(command).await?;
        let id = reply
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher dropped bind reply".to_string()))??;
        Ok(BindingHandle::new(id, self.command_tx.clone()))
    }

    /// Removes the binding with `id`, whether it came from configuration or
    /// a detached handle. Returns whether a binding was removed.
    pub async fn unbind(&self, id: &str) -> AppResult<bool> {
        let (command, reply) = DispatcherCommand::unbind(id.to_string());
        self.send(command).await?;
        reply
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher dropped unbind reply".to_string()))
    }

    /// Snapshot of the current bindings in dispatch order.
    pub async fn bindings(&self) -> AppResult<Vec<BindingSummary>> {
        let (command, reply) = DispatcherCommand::list_bindings();
        self.send(command).await?;
        reply
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher dropped listing reply".to_string()))
    }

    /// Snapshot of the dispatch counters.
    pub async fn stats(&self) -> AppResult<DispatcherStats> {
        let (command, reply) = DispatcherCommand::stats();
        self.send(command).await?;
        reply
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher dropped stats reply".to_string()))
    }

    /// Publishes a key event on the input bus.
    pub async fn broadcast(&self, event: KeyEvent) {
        self.bus.broadcast(event).await;
    }

    async fn send(&self, command: DispatcherCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| KeychordError::Dispatcher("dispatcher stopped".to_string()))
    }

    /// The input bus, for frontends that publish events directly.
    pub fn bus(&self) -> Arc<InputDistributor> {
        self.bus.clone()
    }

    /// The runtime the dispatcher runs on. Use it to drive the async API
    /// from synchronous code.
    pub fn get_runtime(&self) -> Arc<Runtime> {
        self.runtime.clone()
    }

    /// The settings this app was built from.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Stops the dispatcher: asks it to exit, waits up to the configured
    /// timeout for the acknowledgement, then aborts whatever is left.
    /// Safe to call multiple times; later calls are no-ops. Must be called
    /// from outside the runtime.
    pub fn shutdown(&self) {
        let task = match self.dispatcher_task.lock().unwrap().take() {
            Some(task) => task,
            None => return, // already shut down
        };

        info!("shutting down shortcut dispatcher");
        let timeout = Duration::from_millis(self.settings.dispatcher.shutdown_timeout_ms);
        let (command, reply) = DispatcherCommand::shutdown();
        if self.command_tx.blocking_send(command).is_ok() {
            let acked = self
                .runtime
                .block_on(async { tokio::time::timeout(timeout, reply).await.is_ok() });
            if !acked {
                warn!("dispatcher did not acknowledge shutdown in time");
            }
        }
        task.abort();
    }
}

//! Command protocol for the shortcut dispatcher.
//!
//! The dispatcher owns all binding state and runs as a single task; everyone
//! else talks to it by sending a [`DispatcherCommand`] over an mpsc channel.
//! Each request variant carries a `oneshot` sender for its reply, so callers
//! get a typed response without sharing any state with the dispatcher.
//!
//! The helper constructors pair each command with its reply receiver:
//!
//! ```ignore
//! let (command, reply) = DispatcherCommand::unbind("logout".to_string());
//! command_tx.send(command).await?;
//! let removed = reply.await?;
//! ```

use tokio::sync::oneshot;

use crate::registry::{BindError, Binding, BindingSummary};

/// Counters maintained by the dispatcher, queryable at any time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Key events the dispatcher has pulled off the bus.
    pub events_seen: u64,
    /// Actions that ran and returned `Ok`.
    pub triggers: u64,
    /// Actions that ran and returned an error.
    pub failures: u64,
}

/// Requests handled by the dispatcher task.
#[derive(Debug)]
pub enum DispatcherCommand {
    /// Register a binding. Replies with the binding id on success.
    Bind {
        /// The binding to register.
        binding: Binding,
        /// Reply channel: the registered id, or why registration failed.
        response: oneshot::Sender<Result<String, BindError>>,
    },

    /// Remove the binding with the given id. Replies with whether a binding
    /// was actually removed, so a second unbind of the same id reports
    /// `false` instead of erroring.
    Unbind {
        /// Id of the binding to remove.
        id: String,
        /// Reply channel.
        response: oneshot::Sender<bool>,
    },

    /// Snapshot the current bindings in dispatch order.
    ListBindings {
        /// Reply channel.
        response: oneshot::Sender<Vec<BindingSummary>>,
    },

    /// Snapshot the dispatch counters.
    Stats {
        /// Reply channel.
        response: oneshot::Sender<DispatcherStats>,
    },

    /// Stop the dispatcher. The reply is sent just before the task exits;
    /// events still queued on the bus after that point are never dispatched.
    Shutdown {
        /// Reply channel.
        response: oneshot::Sender<()>,
    },
}

impl DispatcherCommand {
    /// Builds a `Bind` command and its reply receiver.
    pub fn bind(binding: Binding) -> (Self, oneshot::Receiver<Result<String, BindError>>) {
        let (response, rx) = oneshot::channel();
        (Self::Bind { binding, response }, rx)
    }

    /// Builds an `Unbind` command and its reply receiver.
    pub fn unbind(id: String) -> (Self, oneshot::Receiver<bool>) {
        let (response, rx) = oneshot::channel();
        (Self::Unbind { id, response }, rx)
    }

    /// Builds a `ListBindings` command and its reply receiver.
    pub fn list_bindings() -> (Self, oneshot::Receiver<Vec<BindingSummary>>) {
        let (response, rx) = oneshot::channel();
        (Self::ListBindings { response }, rx)
    }

    /// Builds a `Stats` command and its reply receiver.
    pub fn stats() -> (Self, oneshot::Receiver<DispatcherStats>) {
        let (response, rx) = oneshot::channel();
        (Self::Stats { response }, rx)
    }

    /// Builds a `Shutdown` command and its reply receiver.
    pub fn shutdown() -> (Self, oneshot::Receiver<()>) {
        let (response, rx) = oneshot::channel();
        (Self::Shutdown { response }, rx)
    }
}

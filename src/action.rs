//! The action seam: what a shortcut does when its chord fires.

use anyhow::Result;
use std::sync::Arc;

/// Behavior invoked when a bound chord matches an event.
///
/// Implementations run on the dispatcher task and should return promptly.
/// A returned error is logged and counted by the dispatcher but never stops
/// it; other bindings and later events are unaffected.
pub trait ShortcutAction: Send + Sync {
    /// Runs the action once.
    fn trigger(&self) -> Result<()>;
}

/// Wraps a plain closure as a [`ShortcutAction`].
#[derive(Clone)]
pub struct CallbackAction {
    callback: Arc<dyn Fn() -> Result<()> + Send + Sync>,
}

impl CallbackAction {
    /// Creates an action from a zero-argument closure.
    pub fn new(callback: impl Fn() -> Result<()> + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl ShortcutAction for CallbackAction {
    fn trigger(&self) -> Result<()> {
        (self.callback)()
    }
}

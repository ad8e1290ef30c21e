//! User-facing notifications.
//!
//! Actions that interrupt the user (the logout flow shows a confirmation
//! before the session ends) talk to a [`Notifier`] rather than a concrete
//! output, so the same action works under a console binary, a GUI shell, or
//! a test harness. [`ConsoleNotifier`] writes to stderr; [`MemoryNotifier`]
//! buffers messages for inspection, in the manner of an in-process log
//! capture.

use std::sync::{Arc, Mutex};
use tracing::debug;

/// Presents a blocking message to the user.
///
/// `alert` must not return until the message has been delivered, so callers
/// can rely on the user having been notified before any follow-up side
/// effect runs.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user and returns once it has been delivered.
    fn alert(&self, message: &str);
}

/// Notifier that prints to stderr. Delivery is the synchronous write itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("⚠️  {message}");
    }
}

/// Notifier that appends messages to an in-memory buffer.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// application and keep another to assert on what was shown.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all messages shown so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Number of messages shown so far.
    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// True if nothing has been shown.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards all buffered messages.
    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }
}

impl Notifier for MemoryNotifier {
    fn alert(&self, message: &str) {
        debug!(text = message, "memory notifier alert");
        self.messages.lock().unwrap().push(message.to_string());
    }
}

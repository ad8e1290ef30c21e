//! Keyboard input events and the fan-out bus that carries them.
//!
//! Frontends (a terminal reader, a window toolkit hook, a replay script)
//! push [`KeyEvent`]s into an [`InputDistributor`]; every subscriber gets its
//! own channel and receives a clone of each event in publication order. The
//! shortcut dispatcher is one subscriber among possibly many, which keeps the
//! bus non-consuming: a shortcut firing never removes the event from other
//! observers.
//!
//! Subscribers that go away are pruned lazily on the next broadcast, so a
//! dropped receiver never wedges the bus.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{mpsc, Mutex};
use tracing::trace;

use crate::chord::{Key, KeyChord, KeyModifiers};

/// Default per-subscriber channel capacity.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

// ============================================================================
// Events
// ============================================================================

/// A single key press observed by the process.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEvent {
    /// The non-modifier key that was pressed.
    pub key: Key,
    /// Modifiers held at press time.
    pub modifiers: KeyModifiers,
    /// When the press was observed.
    pub timestamp: DateTime<Utc>,
}

impl KeyEvent {
    /// Creates an event stamped with the current time.
    pub fn new(key: Key, modifiers: KeyModifiers) -> Self {
        Self {
            key,
            modifiers,
            timestamp: Utc::now(),
        }
    }

    /// Creates a `Ctrl+<key>` event.
    pub fn ctrl(key: Key) -> Self {
        Self::new(key, KeyModifiers::CONTROL)
    }

    /// Creates an event with no modifiers held.
    pub fn plain(key: Key) -> Self {
        Self::new(key, KeyModifiers::NONE)
    }

    /// Synthesizes the event a chord describes. Used by replay scripts and
    /// benchmarks to feed the bus without real hardware.
    pub fn from_chord(chord: &KeyChord) -> Self {
        Self::new(chord.key, chord.modifiers)
    }
}

// ============================================================================
// Distributor
// ============================================================================

/// Fans key events out to any number of subscribers.
///
/// Each subscriber owns an independent bounded channel; `broadcast` clones
/// the event into all of them and awaits delivery, so a slow subscriber
/// exerts backpressure rather than losing events. Closed channels are
/// detected during broadcast and removed.
pub struct InputDistributor {
    subscribers: Mutex<Vec<mpsc::Sender<KeyEvent>>>,
    capacity: usize,
}

impl InputDistributor {
    /// Creates a distributor whose subscriber channels hold `capacity`
    /// undelivered events each.
    pub fn new(capacity: usize) -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    /// Registers a new subscriber and returns its receiving end. Only events
    /// broadcast after this call are delivered.
    pub async fn subscribe(&self) -> mpsc::Receiver<KeyEvent> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers.lock().await.push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber, in subscription order.
    /// Subscribers whose receiver has been dropped are pruned.
    pub async fn broadcast(&self, event: KeyEvent) {
        let mut subscribers = self.subscribers.lock().await;
        if subscribers.is_empty() {
            return;
        }

        let sends = subscribers.iter().map(|tx| {
            let event = event.clone();
            async move { tx.send(event).await }
        });
        let results = join_all(sends).await;

        let dead: Vec<usize> = results
            .iter()
            .enumerate()
            .filter_map(|(i, result)| result.is_err().then_some(i))
            .collect();

        // Remove in reverse so earlier indices stay valid.
        for &index in dead.iter().rev() {
            subscribers.swap_remove(index);
            trace!(index, "pruned dead input subscriber");
        }
    }

    /// Number of currently registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

impl Default for InputDistributor {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_CAPACITY)
    }
}

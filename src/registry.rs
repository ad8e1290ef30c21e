//! Binding storage: which chords are bound, to what, under which id.
//!
//! The registry is a plain ordered list. Registration order is dispatch
//! order, ids are unique, and removal is by id. All mutation happens on the
//! dispatcher task, so no locking lives here.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::action::ShortcutAction;
use crate::chord::KeyChord;
use crate::input::KeyEvent;

/// Errors from registering a binding.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BindError {
    /// A binding with the same id is already registered.
    #[error("Binding id already registered: {0}")]
    DuplicateId(String),

    /// The binding id was empty.
    #[error("Binding id must not be empty")]
    EmptyId,
}

/// A chord bound to an action under a unique id.
pub struct Binding {
    id: String,
    chord: KeyChord,
    action: Box<dyn ShortcutAction>,
}

impl Binding {
    /// Creates a binding with an explicit id.
    pub fn new(id: impl Into<String>, chord: KeyChord, action: Box<dyn ShortcutAction>) -> Self {
        Self {
            id: id.into(),
            chord,
            action,
        }
    }

    /// Creates a binding with a generated UUID id.
    pub fn with_generated_id(chord: KeyChord, action: Box<dyn ShortcutAction>) -> Self {
        Self::new(Uuid::new_v4().to_string(), chord, action)
    }

    /// The binding's unique id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The chord this binding listens for.
    pub fn chord(&self) -> &KeyChord {
        &self.chord
    }

    /// Runs the bound action.
    pub fn trigger(&self) -> anyhow::Result<()> {
        self.action.trigger()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("id", &self.id)
            .field("chord", &self.chord)
            .field("action", &"<action>")
            .finish()
    }
}

/// A snapshot of one binding, safe to send across channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSummary {
    /// The binding id.
    pub id: String,
    /// The chord, rendered as text (e.g. `Ctrl+H`).
    pub chord: String,
}

/// Ordered collection of bindings with unique ids.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<Binding>,
}

impl BindingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding at the end of the dispatch order. Rejects empty and
    /// duplicate ids.
    pub fn insert(&mut self, binding: Binding) -> Result<(), BindError> {
        if binding.id.is_empty() {
            return Err(BindError::EmptyId);
        }
        if self.bindings.iter().any(|b| b.id == binding.id) {
            return Err(BindError::DuplicateId(binding.id));
        }
        self.bindings.push(binding);
        Ok(())
    }

    /// Removes the binding with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| b.id != id);
        self.bindings.len() != before
    }

    /// Iterates the bindings whose chord matches `event`, in registration
    /// order.
    pub fn matching<'a>(&'a self, event: &'a KeyEvent) -> impl Iterator<Item = &'a Binding> {
        self.bindings.iter().filter(|b| b.chord.matches(event))
    }

    /// Snapshot of all bindings in dispatch order.
    pub fn summaries(&self) -> Vec<BindingSummary> {
        self.bindings
            .iter()
            .map(|b| BindingSummary {
                id: b.id.clone(),
                chord: b.chord.to_string(),
            })
            .collect()
    }

    /// Number of registered bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True if no bindings are registered.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

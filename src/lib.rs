//! # Keychord Core Library
//!
//! This crate implements a process-wide keyboard shortcut service. Frontends
//! publish key events on a fan-out bus; a single dispatcher task matches
//! each event against registered chord bindings and runs the bound actions
//! in order. The flagship binding is session logout: `Ctrl+H` shows a
//! blocking "Logging you out" confirmation and then invokes a host-supplied
//! callback. Organizing the project as a library keeps the dispatch engine
//! shared between the CLI binary (`main.rs`) and host applications that
//! embed it.
//!
//! ## Crate Structure
//!
//! The library is organized into several modules, each with a distinct
//! responsibility:
//!
//! - **`app`**: Contains the main `KeychordApp` struct, which owns the
//!   runtime, the input bus, and the dispatcher task, and wires configured
//!   shortcuts to the injected session hooks.
//! - **`chord`**: The key and modifier model: `KeyChord` parsing, display,
//!   and event matching.
//! - **`input`**: `KeyEvent` and the `InputDistributor` bus that fans events
//!   out to subscribers without consuming them.
//! - **`action`**: The `ShortcutAction` trait, the seam between a matched
//!   chord and whatever it should do.
//! - **`registry`**: Ordered binding storage with unique ids.
//! - **`messages`**: The command protocol spoken to the dispatcher task.
//! - **`dispatcher`**: The dispatch loop itself plus the scoped
//!   `BindingHandle` returned for runtime registrations.
//! - **`notify`**: The `Notifier` trait for blocking user-facing alerts,
//!   with console and in-memory implementations.
//! - **`session`**: The built-in logout action and its confirmation prompt.
//! - **`config`**: Loading and validating settings from TOML files. See
//!   `config::Settings`.
//! - **`error`**: The custom `KeychordError` enum for centralized error
//!   handling across the crate.
//! - **`tracing_setup`**: Structured logging initialization.

pub mod action;
pub mod app;
pub mod chord;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod input;
pub mod messages;
pub mod notify;
pub mod registry;
pub mod session;
pub mod tracing_setup;

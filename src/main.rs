//! CLI Entry Point for keychord
//!
//! Provides a command-line interface for:
//! - Replaying a chord script through the dispatcher (one-shot execution)
//! - Checking configuration and printing the resolved bindings
//!
//! # Architecture
//!
//! The binary is a thin shell around the library: it loads settings,
//! initializes tracing, builds a `KeychordApp` with a console notifier and a
//! logout callback that flips a flag, and feeds events into the bus. All
//! dispatch semantics live in the library.
//!
//! # Usage
//!
//! Replay a script (one chord per line, `#` starts a comment):
//! ```bash
//! keychord run demos/logout.keys
//! ```
//!
//! Validate configuration:
//! ```bash
//! keychord check --config default
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use keychord::app::KeychordApp;
use keychord::chord::KeyChord;
use keychord::config::Settings;
use keychord::error::KeychordError;
use keychord::input::KeyEvent;
use keychord::notify::ConsoleNotifier;
use keychord::session::LogoutCallback;
use keychord::tracing_setup;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "keychord")]
#[command(about = "Keyboard chord dispatch service", long_about = None)]
struct Cli {
    /// Configuration name under config/ (without extension)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a chord script through the dispatcher
    Run {
        /// Path to the script file (one chord per line)
        script: PathBuf,
    },

    /// Validate configuration and print the resolved bindings
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Arc::new(Settings::new(cli.config.as_deref())?);
    settings.validate()?;
    tracing_setup::init_from_settings(&settings).map_err(KeychordError::Configuration)?;

    match cli.command {
        Commands::Run { script } => run_script(settings, script),
        Commands::Check => check_config(settings),
    }
}

/// Replays a script of chords through a fresh app instance.
fn run_script(settings: Arc<Settings>, script_path: PathBuf) -> Result<()> {
    println!("⌨️  keychord - replaying {}", script_path.display());

    let logged_out = Arc::new(AtomicBool::new(false));
    let on_logout: LogoutCallback = {
        let logged_out = logged_out.clone();
        Arc::new(move || {
            logged_out.store(true, Ordering::SeqCst);
            Ok(())
        })
    };

    let app = KeychordApp::new(settings, Arc::new(ConsoleNotifier), on_logout)?;
    let runtime = app.get_runtime();
    let content = std::fs::read_to_string(&script_path)?;

    runtime.block_on(async {
        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.parse::<KeyChord>() {
                Ok(chord) => {
                    info!(line = number + 1, chord = %chord, "replaying chord");
                    app.broadcast(KeyEvent::from_chord(&chord)).await;
                }
                Err(error) => {
                    warn!(line = number + 1, %error, "skipping unparseable chord");
                }
            }
            tokio::task::yield_now().await;
            if logged_out.load(Ordering::SeqCst) {
                break;
            }
        }
        // Let the dispatcher drain anything still queued.
        tokio::time::sleep(Duration::from_millis(50)).await;
    });

    let stats = runtime.block_on(app.stats())?;
    app.shutdown();

    println!();
    println!(
        "Events: {}  Triggered: {}  Failed: {}",
        stats.events_seen, stats.triggers, stats.failures
    );
    if logged_out.load(Ordering::SeqCst) {
        println!("✅ Session ended by logout shortcut");
    } else {
        println!("Session still active after replay");
    }
    Ok(())
}

/// Loads the app far enough to prove the configuration is usable, then
/// prints the bindings it would install.
fn check_config(settings: Arc<Settings>) -> Result<()> {
    let app = KeychordApp::new(
        settings.clone(),
        Arc::new(ConsoleNotifier),
        Arc::new(|| Ok(())),
    )?;
    let bindings = app.get_runtime().block_on(app.bindings())?;
    app.shutdown();

    println!("Application: {}", settings.application.name);
    println!("Bindings ({}):", bindings.len());
    for binding in &bindings {
        println!("  {:<20} {}", binding.id, binding.chord);
    }
    println!("✅ Configuration OK");
    Ok(())
}

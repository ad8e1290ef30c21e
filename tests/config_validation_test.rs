//! Configuration loading and validation tests.
//!
//! These tests touch the process environment (the loader honors KEYCHORD_
//! overrides), so they run serially.

use keychord::app::KeychordApp;
use keychord::config::Settings;
use keychord::notify::MemoryNotifier;
use serial_test::serial;
use std::fs;
use std::sync::Arc;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("test.toml");
    fs::write(&path, contents).expect("Failed to write test config");
    path
}

#[test]
#[serial]
fn test_load_from_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
        [application]
        name = "File Test"
        log_level = "warn"

        [[shortcuts]]
        id = "logout"
        chord = "ctrl+h"
        prompt = "Logging you out"
        "#,
    );

    let settings = Settings::load_from(&path).expect("Failed to load settings");
    assert_eq!(settings.application.name, "File Test");
    assert_eq!(settings.application.log_level, "warn");
    assert_eq!(settings.shortcuts.len(), 1);
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_config(
        &dir,
        r#"
        [application]
        name = "Env Test"
        log_level = "info"
        "#,
    );

    std::env::set_var("KEYCHORD_APPLICATION__LOG_LEVEL", "debug");
    let settings = Settings::load_from(&path).expect("Failed to load settings");
    std::env::remove_var("KEYCHORD_APPLICATION__LOG_LEVEL");

    assert_eq!(settings.application.log_level, "debug");
}

#[test]
#[serial]
fn test_missing_file_errors() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let missing = dir.path().join("nope.toml");
    assert!(Settings::load_from(&missing).is_err());
}

#[test]
#[serial]
fn test_malformed_toml_errors() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = write_config(&dir, "[application\nname = ");
    assert!(Settings::load_from(&path).is_err());
}

#[test]
#[serial]
fn test_shipped_default_config_is_valid() {
    let settings =
        Settings::load_from("config/default.toml").expect("Failed to load shipped config");
    settings.validate().expect("Shipped config is invalid");

    let logout = settings
        .shortcuts
        .iter()
        .find(|s| s.id == "logout")
        .expect("Shipped config has no logout shortcut");
    assert_eq!(logout.chord, "ctrl+h");
    assert_eq!(logout.prompt.as_deref(), Some("Logging you out"));
    assert!(logout.enabled);
}

#[test]
#[serial]
fn test_disabled_shortcut_is_not_installed() {
    let settings: Settings = toml::from_str(
        r#"
        [application]
        name = "Keychord Test"

        [[shortcuts]]
        id = "logout"
        chord = "ctrl+h"

        [[shortcuts]]
        id = "dormant"
        chord = "ctrl+d"
        enabled = false
        "#,
    )
    .expect("Failed to parse test config");

    let app = KeychordApp::new(
        Arc::new(settings),
        Arc::new(MemoryNotifier::new()),
        Arc::new(|| Ok(())),
    )
    .expect("Failed to create app");

    let bindings = app
        .get_runtime()
        .block_on(app.bindings())
        .expect("listing failed");
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].id, "logout");

    app.shutdown();
}

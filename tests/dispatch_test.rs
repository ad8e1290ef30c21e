//! End-to-end dispatch tests: events in, alerts and callbacks out.

use keychord::action::CallbackAction;
use keychord::app::KeychordApp;
use keychord::chord::{Key, KeyChord, KeyModifiers};
use keychord::config::Settings;
use keychord::input::KeyEvent;
use keychord::messages::DispatcherStats;
use keychord::notify::MemoryNotifier;
use keychord::session::LogoutCallback;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// App wired to an in-memory notifier and a counting logout callback,
/// with `ctrl+h` bound as the logout shortcut.
fn create_test_app() -> (KeychordApp, MemoryNotifier, Arc<AtomicUsize>) {
    let toml_str = r#"
        [application]
        name = "Keychord Test"
        log_level = "info"

        [[shortcuts]]
        id = "logout"
        chord = "ctrl+h"
    "#;
    let settings: Settings = toml::from_str(toml_str).expect("Failed to parse test config");

    let notifier = MemoryNotifier::new();
    let logout_calls = Arc::new(AtomicUsize::new(0));
    let on_logout: LogoutCallback = {
        let calls = logout_calls.clone();
        Arc::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };

    let app = KeychordApp::new(Arc::new(settings), Arc::new(notifier.clone()), on_logout)
        .expect("Failed to create app");
    (app, notifier, logout_calls)
}

/// Polls dispatcher stats until `n` events have been processed.
fn wait_for_events(app: &KeychordApp, n: u64) -> DispatcherStats {
    let runtime = app.get_runtime();
    runtime.block_on(async {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let stats = app.stats().await.expect("stats query failed");
            if stats.events_seen >= n {
                return stats;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "timed out waiting for {n} events (saw {})",
                stats.events_seen
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
}

fn broadcast(app: &KeychordApp, event: KeyEvent) {
    app.get_runtime().block_on(app.broadcast(event));
}

#[test]
fn test_ctrl_h_shows_alert_and_logs_out() {
    let (app, notifier, logout_calls) = create_test_app();

    broadcast(&app, KeyEvent::ctrl(Key::Char('h')));

    let stats = wait_for_events(&app, 1);
    assert_eq!(stats.triggers, 1);
    assert_eq!(notifier.messages(), vec!["Logging you out"]);
    assert_eq!(logout_calls.load(Ordering::SeqCst), 1);

    app.shutdown();
}

#[test]
fn test_unrelated_events_are_noops() {
    let (app, notifier, logout_calls) = create_test_app();

    broadcast(&app, KeyEvent::ctrl(Key::Char('g')));
    broadcast(&app, KeyEvent::plain(Key::Char('h')));
    broadcast(
        &app,
        KeyEvent::new(Key::Char('h'), KeyModifiers { alt: true, ..KeyModifiers::NONE }),
    );

    let stats = wait_for_events(&app, 3);
    assert_eq!(stats.triggers, 0);
    assert_eq!(stats.failures, 0);
    assert!(notifier.is_empty());
    assert_eq!(logout_calls.load(Ordering::SeqCst), 0);

    app.shutdown();
}

#[test]
fn test_dispatch_does_not_consume_the_event() {
    let (app, _notifier, logout_calls) = create_test_app();
    let runtime = app.get_runtime();

    // A second observer on the bus, alongside the dispatcher.
    let bus = app.bus();
    let mut observer = runtime.block_on(bus.subscribe());

    broadcast(&app, KeyEvent::ctrl(Key::Char('h')));
    wait_for_events(&app, 1);

    assert_eq!(logout_calls.load(Ordering::SeqCst), 1);
    let seen = runtime
        .block_on(observer.recv())
        .expect("observer got nothing");
    assert_eq!(seen.key, Key::Char('h'));
    assert!(seen.modifiers.control);

    app.shutdown();
}

#[test]
fn test_each_repeat_fires_again() {
    let (app, notifier, logout_calls) = create_test_app();

    for _ in 0..3 {
        broadcast(&app, KeyEvent::ctrl(Key::Char('h')));
    }

    let stats = wait_for_events(&app, 3);
    assert_eq!(stats.triggers, 3);
    assert_eq!(notifier.len(), 3);
    assert_eq!(logout_calls.load(Ordering::SeqCst), 3);

    app.shutdown();
}

#[test]
fn test_extra_modifiers_still_fire() {
    let (app, _notifier, logout_calls) = create_test_app();

    broadcast(
        &app,
        KeyEvent::new(
            Key::Char('h'),
            KeyModifiers {
                control: true,
                shift: true,
                ..KeyModifiers::NONE
            },
        ),
    );

    wait_for_events(&app, 1);
    assert_eq!(logout_calls.load(Ordering::SeqCst), 1);

    app.shutdown();
}

#[test]
fn test_capital_h_matches_case_insensitively() {
    let (app, _notifier, logout_calls) = create_test_app();

    broadcast(&app, KeyEvent::ctrl(Key::Char('H')));

    wait_for_events(&app, 1);
    assert_eq!(logout_calls.load(Ordering::SeqCst), 1);

    app.shutdown();
}

#[test]
fn test_dispatch_follows_delivery_order() {
    let (app, _notifier, _logout_calls) = create_test_app();
    let runtime = app.get_runtime();

    let journal: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
    let marker_action = |tag: &'static str| {
        let journal = journal.clone();
        Box::new(CallbackAction::new(move || {
            journal.lock().unwrap().push(tag);
            Ok(())
        }))
    };

    let _a = runtime
        .block_on(app.bind("ctrl+a".parse::<KeyChord>().unwrap(), marker_action("a")))
        .expect("bind failed");
    let _b = runtime
        .block_on(app.bind("ctrl+b".parse::<KeyChord>().unwrap(), marker_action("b")))
        .expect("bind failed");

    for key in ['a', 'b', 'a'] {
        broadcast(&app, KeyEvent::ctrl(Key::Char(key)));
    }

    wait_for_events(&app, 3);
    assert_eq!(*journal.lock().unwrap(), vec!["a", "b", "a"]);

    app.shutdown();
}

#[test]
fn test_failing_action_does_not_break_logout() {
    let (app, notifier, logout_calls) = create_test_app();
    let runtime = app.get_runtime();

    // Same chord as logout, registered after it, always failing.
    let _broken = runtime
        .block_on(app.bind_named(
            "broken",
            "ctrl+h".parse::<KeyChord>().unwrap(),
            Box::new(CallbackAction::new(|| anyhow::bail!("no session backend"))),
        ))
        .expect("bind failed");

    broadcast(&app, KeyEvent::ctrl(Key::Char('h')));

    let stats = wait_for_events(&app, 1);
    assert_eq!(stats.triggers, 1);
    assert_eq!(stats.failures, 1);
    assert_eq!(notifier.messages(), vec!["Logging you out"]);
    assert_eq!(logout_calls.load(Ordering::SeqCst), 1);

    // The dispatcher is still healthy afterwards.
    broadcast(&app, KeyEvent::ctrl(Key::Char('h')));
    let stats = wait_for_events(&app, 2);
    assert_eq!(stats.failures, 2);
    assert_eq!(logout_calls.load(Ordering::SeqCst), 2);

    app.shutdown();
}

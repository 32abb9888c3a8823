use std::{fs, thread::sleep, time::Duration};

use csd_retrofit::geometry::Size;
use csd_retrofit::host::{Application, WidgetRole, WindowKind};
use csd_retrofit::{DecorationEngine, DecorationSettings};
use serial_test::serial;
use tempfile::tempdir;

fn decorate_a_dialog() {
    let app = Application::new();
    let settings = DecorationSettings {
        follow_system_accent: false,
        ..Default::default()
    };
    let _engine = DecorationEngine::attach(&app, settings);
    let dialog = app.create_window("dialog", WindowKind::Dialog, WidgetRole::Plain, Size::new(300, 200));
    app.show(dialog);
    app.process_events();
}

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    csd_retrofit::logging::init(true, Some(path.clone()));
    tracing::info!("decorating test window");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("decorating test window"));
}

#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    csd_retrofit::logging::init(false, None);
    tracing::info!("test");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
}

#[test]
#[serial]
fn reinit_switches_log_file() {
    let dir = tempdir().unwrap();
    let first = dir.path().join("first.txt");
    let second = dir.path().join("second.txt");

    csd_retrofit::logging::init(false, Some(first.clone()));
    tracing::info!("to first");
    csd_retrofit::logging::init(false, Some(second.clone()));
    tracing::info!("to second");

    sleep(Duration::from_millis(100));

    let first = fs::read_to_string(first).unwrap();
    let second = fs::read_to_string(second).unwrap();
    assert!(first.contains("to first"));
    assert!(!first.contains("to second"));
    assert!(second.contains("to second"));
}

#[test]
#[serial]
fn engine_debug_lines_need_debug_logging() {
    std::env::remove_var("RUST_LOG");
    let dir = tempdir().unwrap();
    let quiet = dir.path().join("quiet.txt");
    let verbose = dir.path().join("verbose.txt");

    csd_retrofit::logging::init(false, Some(quiet.clone()));
    decorate_a_dialog();
    tracing::info!("quiet run done");
    csd_retrofit::logging::init(true, Some(verbose.clone()));
    decorate_a_dialog();

    sleep(Duration::from_millis(100));

    let quiet = fs::read_to_string(quiet).unwrap();
    let verbose = fs::read_to_string(verbose).unwrap();
    assert!(quiet.contains("quiet run done"));
    assert!(!quiet.contains("decorating window"));
    assert!(verbose.contains("decorating window"));
    assert!(verbose.contains("decoration engine attached"));
}

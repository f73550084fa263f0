//! Config persistence against a real filesystem.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use pretty_assertions::assert_eq;
use sfa_config::{Config, LogSettings, load_config_from, save_config_to};

#[test]
fn saved_config_loads_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        endpoint: "tcp:127.0.0.1:9090".into(),
        dynamic_notification: false,
        log: LogSettings {
            level: "debug".into(),
            file: Some(PathBuf::from("/var/log/sfa.log")),
        },
        ..Config::default()
    };
    save_config_to(&config, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("endpoint = \"tcp:127.0.0.1:9090\""));
    assert!(written.contains("[retry]"));

    assert_eq!(load_config_from(&path).unwrap(), config);
}

#[test]
fn malformed_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "status_interval_ms = \"soon\"\n").unwrap();

    let err = load_config_from(&path).unwrap_err();
    assert!(err.to_string().starts_with("config loading failed"));
}

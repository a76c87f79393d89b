//! Config file loading and layering tests.

use std::io::Write;
use std::time::Duration;
use syncmon_config::{ConfigError, LogFormat, PartialConfig};

const FILE: &str = r#"
rpc = "https://rpc.osmosis.zone:443"
epoch_start_time = "2021-06-18T17:00:00Z"
check_interval = 15
notifier_target = "https://hooks.slack.com/services/T000/B000/XXXX"

[log]
level = "debug"
format = "json"
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn loads_toml_file() {
    let file = write_config(FILE);
    let config = PartialConfig::load(file.path()).unwrap().resolve().unwrap();

    assert_eq!(config.rpc.as_str(), "https://rpc.osmosis.zone/");
    assert_eq!(config.check_interval, Duration::from_secs(15));
    assert_eq!(config.new_block_threshold, Duration::from_secs(30));
    assert_eq!(
        config.notifier_target.unwrap().host_str(),
        Some("hooks.slack.com")
    );
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log.format, LogFormat::Json);
}

#[test]
fn environment_layer_overrides_file() {
    let file = write_config(FILE);
    let env = PartialConfig {
        rpc: Some("http://127.0.0.1:26657".into()),
        new_block_threshold: Some(120),
        ..Default::default()
    };

    let config = PartialConfig::load(file.path())
        .unwrap()
        .merge(env)
        .resolve()
        .unwrap();

    assert_eq!(config.rpc.as_str(), "http://127.0.0.1:26657/");
    assert_eq!(config.check_interval, Duration::from_secs(15));
    assert_eq!(config.new_block_threshold, Duration::from_secs(120));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = PartialConfig::from_toml_str("rpc = \"http://a\"\nslack = \"x\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    match PartialConfig::load(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("unexpected result: {:?}", other),
    }
}

use std::time::Duration;

use causeway_core::config::*;

#[test]
fn config_defaults() {
    let config = SyncConfig::default();
    assert!(config.retry_failed);
    assert_eq!(config.replay_timeout_secs, None);
    assert!(config.assume_online);
    assert_eq!(config.replay_timeout(), None);
}

#[test]
fn config_loads_from_empty_json_with_all_defaults() {
    let config: SyncConfig = serde_json::from_str("{}").unwrap();
    assert!(config.retry_failed);
    assert_eq!(config.replay_timeout_secs, None);
    assert!(config.assume_online);
}

#[test]
fn config_loads_partial_json_with_overrides() {
    let config: SyncConfig =
        serde_json::from_str(r#"{"retry_failed": false, "replay_timeout_secs": 30}"#).unwrap();
    assert!(!config.retry_failed);
    assert_eq!(config.replay_timeout(), Some(Duration::from_secs(30)));
    // Non-overridden fields keep defaults
    assert!(config.assume_online);
}

#[test]
fn config_serde_roundtrip() {
    let config = SyncConfig {
        retry_failed: false,
        replay_timeout_secs: Some(10),
        assume_online: false,
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: SyncConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.retry_failed, config.retry_failed);
    assert_eq!(back.replay_timeout_secs, config.replay_timeout_secs);
    assert_eq!(back.assume_online, config.assume_online);
}

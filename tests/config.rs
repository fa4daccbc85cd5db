use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pagefactory::config::{
    load_config, ENV_FRAGMENT_DEPTH, ENV_LOG_LEVEL, ENV_PRESERVE_SESSION,
};
use serial_test::serial;

fn clear_env() {
    for key in [ENV_LOG_LEVEL, ENV_PRESERVE_SESSION, ENV_FRAGMENT_DEPTH] {
        env::remove_var(key);
    }
}

#[tokio::test]
#[serial]
async fn loads_yaml_and_resolves_relative_paths() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagefactory.yaml");
    fs::write(
        &path,
        r#"
pages: pages.yaml
fragments:
  path: fragments/common.yaml
  max_depth: 4
session:
  preserve: true
driver:
  timeout: 1m 30s
logging:
  level: debug
  json: true
"#,
    )
    .unwrap();

    let loaded = load_config(Some(&path)).await.unwrap();
    let config = loaded.config;

    assert_eq!(loaded.path, path);
    assert_eq!(config.pages, Some(dir.path().join("pages.yaml")));
    assert_eq!(
        config.fragments.path,
        Some(dir.path().join("fragments/common.yaml"))
    );
    assert_eq!(config.fragments.max_depth, 4);
    assert!(config.session.preserve);
    assert!(config.session.dismiss_alerts_on_dispose);
    assert_eq!(config.driver.timeout().unwrap(), Duration::from_secs(90));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[tokio::test]
#[serial]
async fn missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("absent.yaml");

    let loaded = load_config(Some(&path)).await.unwrap();
    assert_eq!(loaded.config, Default::default());
}

#[tokio::test]
#[serial]
async fn environment_overrides_the_file() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagefactory.yaml");
    fs::write(&path, "session:\n  preserve: false\nlogging:\n  level: info\n").unwrap();

    env::set_var(ENV_LOG_LEVEL, "warn");
    env::set_var(ENV_PRESERVE_SESSION, "yes");
    env::set_var(ENV_FRAGMENT_DEPTH, "2");
    let config = load_config(Some(&path)).await.unwrap().config;
    clear_env();

    assert_eq!(config.logging.level, "warn");
    assert!(config.session.preserve);
    assert_eq!(config.fragments.max_depth, 2);
}

#[tokio::test]
#[serial]
async fn malformed_overrides_are_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    env::set_var(ENV_FRAGMENT_DEPTH, "deep");
    let err = load_config(Some(&path)).await.err().unwrap();
    clear_env();
    assert!(err.to_string().contains(ENV_FRAGMENT_DEPTH));
}

#[tokio::test]
#[serial]
async fn invalid_timeout_is_rejected() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pagefactory.yaml");
    fs::write(&path, "driver:\n  timeout: soon\n").unwrap();

    assert!(load_config(Some(&path)).await.is_err());
}

use oget_core::{OgetErrorKind, Stage};
use oget_lib::config::{self, Config, Overrides, RawConfig};
use std::path::Path;
use std::time::Duration;

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_defaults_filled_when_omitted() {
    let raw = RawConfig::from_json(
        r#"{ "onion_address": "mailboxabc.onion", "username": "mail", "password": "secret" }"#,
    )
    .unwrap();
    let config = Config::resolve(raw, &Overrides::default()).unwrap();

    assert_eq!(config.target.port, 22);
    assert_eq!(config.mailbox.remote_dir.as_str(), "inbox");
    assert_eq!(config.mailbox.local_dir, Path::new("downloads"));
    assert_eq!(config.target.proxy_addr, "127.0.0.1:9050");
    assert_eq!(config.connect_timeout, Duration::from_secs(120));
}

#[test]
fn test_empty_strings_count_as_missing() {
    let raw = RawConfig::from_json(
        r#"{
            "onion_address": "mailboxabc.onion",
            "port": "",
            "username": "mail",
            "password": "secret",
            "remote_dir": "",
            "local_dir": "",
            "proxy_addr": ""
        }"#,
    )
    .unwrap();
    let config = Config::resolve(raw, &Overrides::default()).unwrap();

    assert_eq!(config.target.port, 22);
    assert_eq!(config.mailbox.remote_dir.as_str(), "inbox");
    assert_eq!(config.mailbox.local_dir, Path::new("downloads"));
    assert_eq!(config.target.proxy_addr, "127.0.0.1:9050");
}

#[test]
fn test_remote_dir_backslashes_normalized() {
    let raw = RawConfig::from_json(
        r#"{
            "onion_address": "mailboxabc.onion",
            "username": "mail",
            "password": "secret",
            "remote_dir": "inbox\\queue"
        }"#,
    )
    .unwrap();
    let config = Config::resolve(raw, &Overrides::default()).unwrap();

    assert_eq!(config.mailbox.remote_dir.as_str(), "inbox/queue");
    assert_eq!(config.mailbox.remote_dir.join("m.eml"), "inbox/queue/m.eml");
}

#[test]
fn test_port_number_or_string() {
    for body in [
        r#"{ "onion_address": "h.onion", "username": "u", "password": "p", "port": 2222 }"#,
        r#"{ "onion_address": "h.onion", "username": "u", "password": "p", "port": "2222" }"#,
    ] {
        let config = Config::resolve(RawConfig::from_json(body).unwrap(), &Overrides::default()).unwrap();
        assert_eq!(config.target.port, 2222);
    }
}

#[test]
fn test_target_address_alias() {
    let raw = RawConfig::from_json(
        r#"{ "target_address": "10.1.2.3", "username": "u", "password": "p" }"#,
    )
    .unwrap();
    let config = Config::resolve(raw, &Overrides::default()).unwrap();
    assert_eq!(config.target.host, "10.1.2.3");
}

#[test]
fn test_missing_required_fields() {
    for (body, field) in [
        (r#"{ "username": "u", "password": "p" }"#, "onion_address"),
        (r#"{ "onion_address": "h.onion", "password": "p" }"#, "username"),
        (r#"{ "onion_address": "h.onion", "username": "u", "password": "" }"#, "password"),
    ] {
        let err = Config::resolve(RawConfig::from_json(body).unwrap(), &Overrides::default()).unwrap_err();
        assert_eq!(err.kind, OgetErrorKind::InvalidConfig);
        assert_eq!(err.stage, Stage::Config);
        assert!(err.message.contains(field), "{}", err);
    }
}

#[test]
fn test_bad_port_and_proxy_rejected() {
    let bad_port = r#"{ "onion_address": "h.onion", "username": "u", "password": "p", "port": "twenty-two" }"#;
    let err = Config::resolve(RawConfig::from_json(bad_port).unwrap(), &Overrides::default()).unwrap_err();
    assert_eq!(err.kind, OgetErrorKind::InvalidConfig);

    let ok = r#"{ "onion_address": "h.onion", "username": "u", "password": "p" }"#;
    let overrides = Overrides {
        proxy_addr: Some("localhost".into()),
    };
    let err = Config::resolve(RawConfig::from_json(ok).unwrap(), &overrides).unwrap_err();
    assert_eq!(err.kind, OgetErrorKind::InvalidConfig);
}

#[test]
fn test_load_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_config(
        tmp.path(),
        r#"{
            "onion_address": "mailboxabc.onion",
            "port": "22",
            "username": "mail",
            "password": "secret",
            "proxy_addr": "127.0.0.1:9150",
            "unknown_key": true
        }"#,
    );

    let config = config::load(&path, &Overrides::default()).unwrap();
    assert_eq!(config.target.proxy_addr, "127.0.0.1:9150");
    assert_eq!(config.credentials.username, "mail");
    assert_eq!(config.credentials.password(), "secret");
}

#[test]
fn test_load_missing_or_malformed_file() {
    let tmp = tempfile::tempdir().unwrap();

    let err = config::load(&tmp.path().join("absent.json"), &Overrides::default()).unwrap_err();
    assert_eq!(err.kind, OgetErrorKind::InvalidConfig);
    assert!(err.to_string().starts_with("config failed:"), "{}", err);

    let path = write_config(tmp.path(), "{ not json");
    let err = config::load(&path, &Overrides::default()).unwrap_err();
    assert_eq!(err.kind, OgetErrorKind::InvalidConfig);
}

#[test]
fn test_password_not_in_debug_output() {
    let raw = RawConfig::from_json(
        r#"{ "onion_address": "h.onion", "username": "mail", "password": "hunter2" }"#,
    )
    .unwrap();
    let config = Config::resolve(raw, &Overrides::default()).unwrap();
    assert!(!format!("{:?}", config).contains("hunter2"));
}

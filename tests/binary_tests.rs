use std::process::Command;

fn oget() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_oget"));
    cmd.env_remove("OGET_PROBE").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_probe_exits_before_reading_config() {
    let output = oget()
        .env("OGET_PROBE", "1")
        .args(["-c", "/definitely/not/here.json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "oget: probe ok");
}

#[test]
fn test_missing_config_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let output = oget()
        .current_dir(tmp.path())
        .args(["-c", "missing.json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config failed"), "{}", stderr);
    assert!(!tmp.path().join("downloads").exists());
}

#[test]
fn test_unreachable_proxy_is_fatal_and_names_dial_stage() {
    let tmp = tempfile::tempdir().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    std::fs::write(
        tmp.path().join("config.json"),
        r#"{ "onion_address": "mailboxabc.onion", "username": "mail", "password": "secret" }"#,
    )
    .unwrap();

    let output = oget()
        .current_dir(tmp.path())
        .args(["--proxy", &format!("127.0.0.1:{}", port)])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("dial failed"), "{}", stderr);
    assert!(!stderr.contains("secret"));
    assert!(!tmp.path().join("downloads").exists());
}

use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn json_log_file_records_the_run() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("vitals.log");
    let cfg = dir.path().join("vitals.toml");
    fs::write(
        &cfg,
        format!(
            r#"
[pins]
trigger = 23
echo = 24

[temperature]
samples = 2
delay_ms = 0
min_samples = 1
filter = {{ policy = "none" }}

[logging]
file = "{}"
level = "info"
rotation = "never"
"#,
            log.display()
        ),
    )
    .unwrap();

    Command::cargo_bin("vitals")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("temperature")
        .assert()
        .success();

    let text = fs::read_to_string(&log).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(
        lines
            .iter()
            .any(|v| v["fields"]["message"] == "temperature measurement complete"),
        "log was: {text}"
    );
}

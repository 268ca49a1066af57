//! Command-line behavior that needs no model files.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CARD_TEXT: &str = "\
CĂN CƯỚC CÔNG DÂN
Số / No.: 001099012345
Họ và tên / Full name:
NGUYỄN VĂN AN
Ngày sinh / Date of birth: 01/01/1990
Giới tính / Sex: Nam Quốc tịch / Nationality: Việt Nam
Quê quán / Place of origin: Hà Nội
Nơi thường trú / Place of residence: 12 Lê Lợi, Hà Nội
Có giá trị đến: 01/01/2030
";

/// `cccd` with the user config directory pointed at a scratch location.
fn cccd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cccd").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn test_parse_text_file_as_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("card.txt");
    fs::write(&input, CARD_TEXT).unwrap();

    let output = cccd(&home)
        .args(["parse", "--year", "2025"])
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["card_type"], "citizen_identity");
    assert_eq!(record["id_number"], "001099012345");
    assert_eq!(record["full_name"], "NGUYỄN VĂN AN");
    assert_eq!(record["gender"], "Nam");
    assert_eq!(record["expiry_date"], "01/01/2030");
}

#[test]
fn test_parse_stdin_as_text() {
    let home = TempDir::new().unwrap();

    cccd(&home)
        .args(["parse", "-", "--format", "text", "--year", "2025"])
        .write_stdin(CARD_TEXT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Căn cước công dân"))
        .stdout(predicate::str::contains("001099012345"));
}

#[test]
fn test_parse_empty_text_reports_no_fields() {
    let home = TempDir::new().unwrap();

    cccd(&home)
        .args(["parse", "-"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id_number\": null"))
        .stderr(predicate::str::contains("No fields found"));
}

#[test]
fn test_config_path_uses_config_home() {
    let home = TempDir::new().unwrap();

    cccd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("custom.json");

    cccd(&home)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    cccd(&home)
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_set_then_get() {
    let home = TempDir::new().unwrap();

    cccd(&home)
        .args(["config", "set", "server.port", "9000"])
        .assert()
        .success();

    cccd(&home)
        .args(["config", "get", "server.port"])
        .assert()
        .success()
        .stdout(predicate::str::contains("9000"));

    cccd(&home)
        .args(["config", "set", "server.port", "not-a-port"])
        .assert()
        .failure();
}

#[test]
fn test_process_missing_input() {
    let home = TempDir::new().unwrap();

    cccd(&home)
        .args(["process", "does-not-exist.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_without_recognizer_models() {
    let home = TempDir::new().unwrap();
    let image_path = home.path().join("card.png");
    image::DynamicImage::new_rgb8(40, 20).save(&image_path).unwrap();
    let models = home.path().join("models");
    fs::create_dir_all(&models).unwrap();

    cccd(&home)
        .arg("process")
        .arg(&image_path)
        .arg("--model-dir")
        .arg(&models)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load OCR models"));
}

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::error::Error;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn check_passes_on_valid_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("ok.py");
    fs::write(&file, "def greet(name: str) -> str:\n    return 'hi ' + name\n\nprint(greet('bob'))\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", file.to_str().unwrap()]);
    cmd.assert().success().stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn check_reports_type_error_and_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("bad.py");
    fs::write(&file, "a: int = 'hello'\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", file.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("1:10: error:"))
        .stdout(predicate::str::contains("not assignable to 'int'"));

    Ok(())
}

#[test]
fn check_reports_parse_error_as_json() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("syntax.py");
    fs::write(&file, "def foo()\n    pass\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", file.to_str().unwrap(), "--format", "json"]);
    let output = cmd.assert().failure().get_output().stdout.clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    let first = &json.as_array().expect("array of diagnostics")[0];
    assert_eq!(first["code"], "parse-error");
    assert_eq!(first["severity"], "error");
    assert_eq!(first["start_line"], 1);

    Ok(())
}

#[test]
fn check_respects_config_limit() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("many.py");
    fs::write(&file, "a = x1\nb = x2\nc = x3\n")?;
    let config = dir.path().join("pyrite.toml");
    fs::write(&config, "max-diagnostics = 1\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", file.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    let output = cmd.assert().failure().get_output().stdout.clone();
    assert_eq!(String::from_utf8(output)?.lines().count(), 1);

    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("ok.py");
    fs::write(&file, "x = 1\n")?;
    let config = dir.path().join("pyrite.toml");
    fs::write(&config, "no-such-key = true\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", file.to_str().unwrap(), "--config", config.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));

    Ok(())
}

#[test]
fn complete_lists_variables() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("complete.py");
    fs::write(&file, "my_variable = 10\nmy_var")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["complete", file.to_str().unwrap(), "--line", "2", "--column", "7"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("my_variable\tvariable\tint"));

    Ok(())
}

#[test]
fn complete_json_members() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("members.py");
    fs::write(&file, "s = 'abc'\ns.up")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args([
        "complete",
        file.to_str().unwrap(),
        "--line",
        "2",
        "--column",
        "5",
        "--format",
        "json",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let json: serde_json::Value = serde_json::from_slice(&output)?;
    let labels: Vec<&str> = json
        .as_array()
        .expect("array of items")
        .iter()
        .filter_map(|item| item["label"].as_str())
        .collect();
    assert_eq!(labels, ["upper"]);

    Ok(())
}

#[test]
fn complete_out_of_range_is_empty() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("range.py");
    fs::write(&file, "x = 1\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["complete", file.to_str().unwrap(), "--line", "40", "--column", "1"]);
    cmd.assert().success().stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn symbols_prints_scope_tree() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("symbols.py");
    fs::write(&file, "count = 0\n\ndef greet(name: str) -> str:\n    return name\n")?;

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["symbols", file.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("module <module>"))
        .stdout(predicate::str::contains("count: variable = int @1:1"))
        .stdout(predicate::str::contains("  function greet"))
        .stdout(predicate::str::contains("name: parameter = str"));

    Ok(())
}

#[test]
fn missing_file_is_reported() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let file = dir.path().join("absent.py");

    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", file.to_str().unwrap()]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));

    Ok(())
}

#[test]
fn rejects_parent_dir_paths() -> Result<(), Box<dyn Error>> {
    let mut cmd = Command::cargo_bin("pyrite")?;
    cmd.args(["check", "../outside.py"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Parent directory components"));

    Ok(())
}

//! Command-line behavior of the `cielo` binary.

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn cielo(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cielo"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let output = cielo(temp_path).arg("init").output().unwrap();
    assert!(output.status.success());

    let config_path = temp_path.join(".cielo/settings.toml");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[formats]"));
    assert!(content.contains("[compilers]"));

    let symbols = fs::read_to_string(temp_path.join(".cielo/symbols.toml")).unwrap();
    assert!(symbols.contains("[symbols]"));

    // Second init without --force refuses
    let again = cielo(temp_path).arg("init").output().unwrap();
    assert!(!again.status.success());

    let forced = cielo(temp_path).args(["init", "--force"]).output().unwrap();
    assert!(forced.status.success());
}

#[test]
fn test_config_command() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let config_dir = temp_path.join(".cielo");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("settings.toml"),
        "version = 2\nstores_dir = \"state\"\n[watch]\ndebounce_ms = 250\n",
    )
    .unwrap();

    let output = cielo(temp_path).arg("config").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("version = 2"));
    assert!(stdout.contains("stores_dir = \"state\""));
    assert!(stdout.contains("debounce_ms = 250"));
}

#[test]
fn test_config_env_override() {
    let temp_dir = TempDir::new().unwrap();
    let output = cielo(temp_dir.path())
        .arg("config")
        .env("CIELO_WATCH__DEBOUNCE_MS", "75")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("debounce_ms = 75"));
}

#[test]
fn test_multiple_roots_exit_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("a")).unwrap();
    fs::create_dir(root.join("b")).unwrap();

    let output = cielo(root).args(["brew", "a", "b"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("only one directory"));
}

#[test]
fn test_explicit_unknown_file_exit_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("notes.txt"), "hello\n").unwrap();

    let output = cielo(root).args(["brew", "notes.txt"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("notes.txt"));
}

#[test]
fn test_brew_data_store_without_external_tools() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join("stores")).unwrap();
    fs::write(root.join("stores/_user.json5"), "{name: 'ada', tags: ['x']}\n").unwrap();

    let output = cielo(root).args(["brew", "--data", "-q"]).output().unwrap();
    assert!(output.status.success());

    let js = fs::read_to_string(root.join("stores/user.js")).unwrap();
    assert!(js.starts_with("export const user = {"));
    assert!(js.contains("\"name\": \"ada\""));
}

#[test]
fn test_expand_and_symbols() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir(root.join(".cielo")).unwrap();
    fs::write(
        root.join(".cielo/symbols.toml"),
        "[symbols]\nsay = \"import {say} from 'utils'\"\nlog = \"import {log} from 'log'\"\n",
    )
    .unwrap();
    fs::write(root.join("app.cielo"), "# greet\nsay 'line {{LINE}}'\n").unwrap();

    let output = cielo(root).args(["expand", "app.cielo"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "import {say} from 'utils'\n\n# greet\nsay 'line 2'\n"
    );

    let output = cielo(root)
        .args(["expand", "--strip", "--no-imports", "app.cielo"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "say 'line 2'\n");

    let output = cielo(root).args(["symbols", "app.cielo"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1 NEEDED SYMBOL in app.cielo:"));
    assert!(stdout.contains("   - say"));
}

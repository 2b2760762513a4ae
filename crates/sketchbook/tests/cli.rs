use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn sketchbook(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sketchbook"))
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(config)
        .args(args)
        .output()
        .expect("failed to run sketchbook")
}

fn write_config(root: &Path, body: &str) -> std::path::PathBuf {
    let path = root.join("sketchbook.toml");
    fs::write(&path, body).unwrap();
    path
}

const USER_CONFIG: &str = r#"
version = 1
default_sketch = "noise/dawn-1"
route_prefix = "/s/"

[[sketches]]
id = "mine/plasma"
label = "Plasma"
shader = "plasma.wgsl"
"#;

#[test]
fn list_prints_builtins_then_config_sketches() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), USER_CONFIG);

    let output = sketchbook(&config, &["list"]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert!(lines[0].contains("flare-1"));
    assert!(lines.iter().any(|line| line.starts_with('*') && line.contains("noise/dawn-1")));
    let last = lines.last().unwrap();
    assert!(last.contains("mine/plasma"));
    assert!(last.contains("/s/mine/plasma"));
    assert!(last.contains("plasma.wgsl"));
}

#[test]
fn list_json_is_machine_readable() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), USER_CONFIG);

    let output = sketchbook(&config, &["list", "--json"]);
    assert!(output.status.success(), "{output:?}");
    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = listing.as_array().unwrap();

    assert_eq!(entries[0]["id"], "flare-1");
    assert_eq!(entries[0]["source"], "builtin");
    let plasma = entries.last().unwrap();
    assert_eq!(plasma["label"], "Plasma");
    assert_eq!(plasma["route"], "/s/mine/plasma");
    assert_eq!(
        plasma["source"],
        root.path().join("plasma.wgsl").display().to_string()
    );
}

#[test]
fn route_resolves_without_a_window() {
    let root = TempDir::new().unwrap();
    let config = write_config(root.path(), USER_CONFIG);

    let cases = [
        ("/", "noise/dawn-1\tDawn"),
        ("", "noise/dawn-1\tDawn"),
        ("/s/", "noise/dawn-1\tDawn"),
        ("/s/mine/plasma/", "mine/plasma\tPlasma"),
        ("/distortion/swirl", "distortion/swirl\tSwirl"),
        ("#/s/flare-1", "flare-1\tFlare"),
        ("/s/nope", "nope\t(not registered)"),
    ];
    for (route, expected) in cases {
        let output = sketchbook(&config, &["route", route]);
        assert!(output.status.success(), "{route}: {output:?}");
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.trim_end(), expected, "route {route:?}");
    }
}

#[test]
fn duplicate_sketch_ids_fail_startup() {
    let root = TempDir::new().unwrap();
    let config = write_config(
        root.path(),
        r#"
version = 1

[[sketches]]
id = "flare-1"
shader = "flare.wgsl"
"#,
    );

    let output = sketchbook(&config, &["list"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("flare-1"), "{stderr}");
}

#[test]
fn missing_explicit_config_is_an_error() {
    let root = TempDir::new().unwrap();
    let output = sketchbook(&root.path().join("absent.toml"), &["list"]);
    assert!(!output.status.success());
}

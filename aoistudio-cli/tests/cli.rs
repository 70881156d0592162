//! End-to-end checks of the offline subcommands.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn aoistudio(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aoistudio"))
        .args(args)
        .arg("--config")
        .arg(config)
        .output()
        .expect("binary runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

// =============================================================================
// basemaps
// =============================================================================

#[test]
fn basemaps_lists_every_key() {
    let temp = TempDir::new().unwrap();
    let output = aoistudio(&temp.path().join("config.ini"), &["basemaps"]);

    assert!(output.status.success());
    let text = stdout(&output);
    for key in ["osm", "light", "dark", "topo"] {
        assert!(text.contains(key), "missing {key} in:\n{text}");
    }
}

#[test]
fn basemaps_marks_configured_default() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.ini");
    std::fs::write(&config, "[map]\nbasemap = topo\n").unwrap();

    let output = aoistudio(&config, &["basemaps"]);
    let text = stdout(&output);
    let marked: Vec<_> = text.lines().filter(|l| l.starts_with('*')).collect();

    assert_eq!(marked.len(), 1);
    assert!(marked[0].contains("topo"));
}

// =============================================================================
// config
// =============================================================================

#[test]
fn config_path_echoes_override() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.ini");

    let output = aoistudio(&config, &["config", "path"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), config.display().to_string());
}

#[test]
fn config_init_then_show() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("nested").join("config.ini");

    let init = aoistudio(&config, &["config", "init"]);
    assert!(init.status.success());
    assert!(config.exists());

    let show = aoistudio(&config, &["config", "show"]);
    assert!(show.status.success());
    let text = stdout(&show);
    assert!(text.contains("[map]"));
    assert!(text.contains("basemap=osm"));
    assert!(text.contains("[geocoder]"));
}

#[test]
fn config_init_refuses_existing_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.ini");
    std::fs::write(&config, "[map]\n").unwrap();

    let output = aoistudio(&config, &["config", "init"]);

    assert_eq!(output.status.code(), Some(2));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "[map]\n");
}

#[test]
fn invalid_config_value_exits_with_usage_code() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.ini");
    std::fs::write(&config, "[map]\nbasemap = satellite\n").unwrap();

    let output = aoistudio(&config, &["config", "show"]);

    assert_eq!(output.status.code(), Some(2));
}

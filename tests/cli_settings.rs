//! End-to-end CLI checks against a scratch config directory.

use std::path::Path;
use std::process::{Command, Output};

use quay::settings::{DockItem, DockSettings, DockPosition};

fn quay(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_quay"))
        .args(args)
        .env("QUAY_CONFIG_DIR", config_dir)
        .output()
        .unwrap()
}

#[test]
fn test_settings_change_persists_and_prints() {
    let dir = tempfile::tempdir().unwrap();

    let output = quay(
        dir.path(),
        &["settings", "--icon-size", "48", "--position", "bottom"],
    );
    assert!(output.status.success());

    let printed: DockSettings = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed.icon_size, 48);
    assert_eq!(printed.position, DockPosition::Bottom);

    // A second invocation reads the same document back.
    let output = quay(dir.path(), &["settings"]);
    let reread: DockSettings = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reread, printed);

    assert!(dir.path().join("dock-settings.json").exists());
}

#[test]
fn test_color_and_opacity_compose() {
    let dir = tempfile::tempdir().unwrap();

    let output = quay(dir.path(), &["settings", "--color", "#336699"]);
    let settings: DockSettings = serde_json::from_slice(&output.stdout).unwrap();
    // Opacity keeps its stored value when only the color changes.
    assert_eq!(settings.background, "rgba(51,102,153,0.6)");

    let output = quay(dir.path(), &["settings", "--opacity", "0.25"]);
    let settings: DockSettings = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings.background, "rgba(51,102,153,0.25)");
}

#[test]
fn test_reset_removes_both_documents() {
    let dir = tempfile::tempdir().unwrap();

    quay(dir.path(), &["settings", "--show-labels", "false"]);
    quay(dir.path(), &["add", "/opt/apps/editor.sh"]);
    assert!(dir.path().join("dock-settings.json").exists());
    assert!(dir.path().join("dock-apps.json").exists());

    let output = quay(dir.path(), &["reset"]);
    assert!(output.status.success());
    assert!(!dir.path().join("dock-settings.json").exists());
    assert!(!dir.path().join("dock-apps.json").exists());

    let output = quay(dir.path(), &["settings"]);
    let settings: DockSettings = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings, DockSettings::default());

    let output = quay(dir.path(), &["list"]);
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("no pinned items"), "stdout: {}", text);
}

#[test]
fn test_pin_list_move_remove() {
    let dir = tempfile::tempdir().unwrap();

    assert!(quay(dir.path(), &["add", "/opt/apps/editor.sh"]).status.success());
    assert!(quay(dir.path(), &["add", "/opt/apps/player.sh"]).status.success());

    let output = quay(dir.path(), &["list", "--json"]);
    let items: Vec<DockItem> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].label, "editor");
    assert_eq!(items[1].label, "player");

    let output = quay(dir.path(), &["move", &items[1].id, "0"]);
    assert!(output.status.success());

    let output = quay(dir.path(), &["list", "--json"]);
    let moved: Vec<DockItem> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(moved[0].label, "player");

    let output = quay(dir.path(), &["remove", &items[0].id]);
    assert!(output.status.success());

    let output = quay(dir.path(), &["remove", "app-0"]);
    assert_eq!(output.status.code(), Some(1));

    let output = quay(dir.path(), &["list"]);
    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("player"));
    assert!(!text.contains("editor"));
}

#[test]
fn test_launch_unknown_id_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = quay(dir.path(), &["launch", "app-0"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no dock item"), "stderr: {}", stderr);
}

#[cfg(unix)]
#[test]
fn test_launch_spawns_the_pinned_target() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("launched.txt");
    let target = dir.path().join("tool.sh");
    std::fs::write(&target, format!("#!/bin/sh\ntouch '{}'\n", marker.display())).unwrap();
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(quay(dir.path(), &["add", target.to_str().unwrap()]).status.success());
    let output = quay(dir.path(), &["list", "--json"]);
    let items: Vec<DockItem> = serde_json::from_slice(&output.stdout).unwrap();

    let output = quay(dir.path(), &["launch", &items[0].id]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("launched tool"), "stdout: {}", stdout);

    // The child runs detached; give it a moment to write its marker.
    for _ in 0..100 {
        if marker.exists() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    assert!(marker.exists());
}

#[test]
fn test_attach_rejects_bad_handles() {
    let dir = tempfile::tempdir().unwrap();

    let output = quay(dir.path(), &["attach", "0"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid window handle"), "stderr: {}", stderr);

    let output = quay(dir.path(), &["attach", "worker"]);
    assert_eq!(output.status.code(), Some(1));
}

#[cfg(not(windows))]
#[test]
fn test_attach_native_reports_failure_off_windows() {
    let dir = tempfile::tempdir().unwrap();

    let output = quay(dir.path(), &["attach", "0x4242", "--strategy", "native"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("window could not be attached"),
        "stderr: {}",
        stderr
    );
}

#[test]
fn test_usage_errors_exit_2() {
    // clap owns argument errors.
    let output = Command::new(env!("CARGO_BIN_EXE_quay")).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

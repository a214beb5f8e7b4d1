//! Exit-code contract of the helper binary.

use std::process::Command;

fn helper() -> Command {
    Command::new(env!("CARGO_BIN_EXE_quay-attach"))
}

#[test]
fn test_missing_argument_exits_2() {
    let output = helper().output().unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage"), "stderr was: {}", stderr);
}

#[test]
fn test_unparseable_handle_exits_3() {
    let output = helper().arg("worker").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_zero_handle_exits_3_not_0() {
    let output = helper().arg("0").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_negative_handle_exits_3() {
    let output = helper().arg("-7").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_hex_handles_are_accepted() {
    // 0x10 parses; whatever the desktop looks like, the answer must come
    // from the attach contract, never from argument handling.
    let output = helper().arg("0x10").output().unwrap();
    assert!(matches!(output.status.code(), Some(0) | Some(4) | Some(5)));
}

#[cfg(not(windows))]
#[test]
fn test_no_shell_window_off_windows_exits_4() {
    let output = helper().arg("4242").output().unwrap();
    assert_eq!(output.status.code(), Some(4));
}

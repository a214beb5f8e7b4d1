//! Platform integration layer
//!
//! All `unsafe` OS calls live below this module. Only Windows has a real
//! implementation; other platforms get minimal stand-ins so the rest of the
//! crate stays portable and testable.

#[cfg(target_os = "windows")]
pub mod win32;

#[cfg(target_os = "windows")]
pub use win32::{apply_start_at_login, launch_detached};

/// Register or clear the dock as a login item.
///
/// Login items only exist on Windows here; elsewhere this reports `false`
/// and the caller moves on.
#[cfg(not(target_os = "windows"))]
pub fn apply_start_at_login(enabled: bool) -> bool {
    tracing::debug!(enabled, "login items are not supported on this platform");
    false
}

/// Launch a pinned path as a detached child.
///
/// Windows goes through the shell so documents open with their default
/// handler; elsewhere the path is spawned directly.
#[cfg(not(target_os = "windows"))]
pub fn launch_detached(path: &str) -> std::io::Result<()> {
    tracing::debug!(path, "no shell handler on this platform, spawning directly");
    std::process::Command::new(path).spawn().map(|_| ())
}

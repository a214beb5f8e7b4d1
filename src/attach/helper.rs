//! Attachment via the compiled `quay-attach` helper
//!
//! The helper is a standalone binary in this workspace with no dependency
//! on the dock itself. When it is not installed next to the dock, it is
//! built on demand, provided a cargo toolchain is present on the machine.

use std::path::PathBuf;
use std::process::Command;

use crate::attach::process::{outcome_from_status, run_with_timeout, BUILD_TIMEOUT, RUN_TIMEOUT};
use crate::attach::resolver::WindowHandle;
use crate::attach::{AttachError, AttachStrategy};

const HELPER_NAME: &str = if cfg!(windows) {
    "quay-attach.exe"
} else {
    "quay-attach"
};

/// Strategy that delegates to the compiled helper executable.
pub struct HelperStrategy {
    helper: Option<PathBuf>,
}

impl HelperStrategy {
    /// Look up an already installed helper; missing is fine, it may still
    /// be buildable when the strategy runs.
    pub fn new() -> Self {
        HelperStrategy {
            helper: find_helper(),
        }
    }

    /// Use a specific helper binary instead of the standard lookup.
    pub fn with_helper(path: PathBuf) -> Self {
        HelperStrategy { helper: Some(path) }
    }
}

impl Default for HelperStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachStrategy for HelperStrategy {
    fn name(&self) -> &'static str {
        "helper"
    }

    fn try_attach(&self, target: WindowHandle) -> Result<bool, AttachError> {
        let helper = match &self.helper {
            Some(path) => path.clone(),
            None => build_helper()?,
        };

        let mut cmd = Command::new(&helper);
        cmd.arg(target.0.to_string());

        let status = run_with_timeout(&mut cmd, RUN_TIMEOUT)?;
        let attached = outcome_from_status(status)?;
        if !attached {
            tracing::warn!(
                code = status.code(),
                helper = %helper.display(),
                "helper executable ran but could not attach"
            );
        }
        Ok(attached)
    }
}

/// Check next to the dock executable, then the local build tree.
fn find_helper() -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()));

    let candidates = [
        exe_dir.map(|d| d.join(HELPER_NAME)),
        Some(PathBuf::from("target").join("release").join(HELPER_NAME)),
        Some(PathBuf::from("target").join("debug").join(HELPER_NAME)),
    ];

    candidates.into_iter().flatten().find(|c| c.exists())
}

/// Build the helper from the workspace, if a toolchain is around.
fn build_helper() -> Result<PathBuf, AttachError> {
    if !toolchain_present() {
        return Err(AttachError::MissingToolchain);
    }

    tracing::info!("building the quay-attach helper");
    let mut cmd = Command::new("cargo");
    cmd.args(["build", "--release", "-p", "quay-attach"]);

    let status = run_with_timeout(&mut cmd, BUILD_TIMEOUT)?;
    if !status.success() {
        tracing::warn!(code = status.code(), "helper build failed");
        return Err(AttachError::BuildFailed);
    }

    find_helper().ok_or(AttachError::MissingHelper)
}

/// Check whether a cargo toolchain answers.
fn toolchain_present() -> bool {
    let mut cmd = Command::new("cargo");
    cmd.arg("--version");
    matches!(run_with_timeout(&mut cmd, RUN_TIMEOUT), Ok(status) if status.success())
}

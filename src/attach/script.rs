//! Attachment via the bundled Python helper script
//!
//! `tools/attach.py` performs the same reparenting procedure through
//! ctypes. This strategy covers hosts where the dock process itself cannot
//! make the OS calls; the script is handed the window handle as its one
//! argument and answers through the shared exit-code contract.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::attach::process::{outcome_from_status, run_with_timeout, RUN_TIMEOUT};
use crate::attach::resolver::WindowHandle;
use crate::attach::{AttachError, AttachStrategy};

const SCRIPT_NAME: &str = "attach.py";

/// Interpreters to try, in order. Some machines only install `python3`.
const INTERPRETERS: [&str; 2] = ["python", "python3"];

/// Strategy that delegates to the helper script.
pub struct ScriptStrategy {
    script: Option<PathBuf>,
}

impl ScriptStrategy {
    /// Look up the bundled script in the standard locations.
    pub fn new() -> Self {
        ScriptStrategy {
            script: find_script(),
        }
    }

    /// Use a specific script instead of the bundled lookup.
    pub fn with_script(path: PathBuf) -> Self {
        ScriptStrategy { script: Some(path) }
    }
}

impl Default for ScriptStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl AttachStrategy for ScriptStrategy {
    fn name(&self) -> &'static str {
        "script"
    }

    fn try_attach(&self, target: WindowHandle) -> Result<bool, AttachError> {
        let script = match self.script.as_deref() {
            Some(script) => script,
            None => return Err(AttachError::MissingScript),
        };

        for interpreter in INTERPRETERS {
            match run_script(interpreter, script, target) {
                Err(AttachError::Process(err))
                    if err.kind() == std::io::ErrorKind::NotFound =>
                {
                    tracing::debug!(interpreter, "interpreter not found");
                }
                outcome => return outcome,
            }
        }

        Err(AttachError::MissingInterpreter)
    }
}

fn run_script(
    interpreter: &str,
    script: &Path,
    target: WindowHandle,
) -> Result<bool, AttachError> {
    let mut cmd = Command::new(interpreter);
    cmd.arg(script).arg(target.0.to_string());

    let status = run_with_timeout(&mut cmd, RUN_TIMEOUT)?;
    let attached = outcome_from_status(status)?;
    if !attached {
        tracing::warn!(
            code = status.code(),
            script = %script.display(),
            "helper script ran but could not attach"
        );
    }
    Ok(attached)
}

/// Check next to the executable first, then the working directory.
fn find_script() -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));

    let candidates = [
        exe_dir.as_ref().map(|d| d.join(SCRIPT_NAME)),
        exe_dir
            .as_ref()
            .map(|d| d.join("tools").join(SCRIPT_NAME)),
        Some(PathBuf::from("tools").join(SCRIPT_NAME)),
    ];

    candidates.into_iter().flatten().find(|c| c.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_script_is_reported() {
        let strategy = ScriptStrategy { script: None };

        let err = strategy.try_attach(WindowHandle(0x42)).unwrap_err();
        assert!(matches!(err, AttachError::MissingScript));
    }

    #[cfg(unix)]
    #[test]
    fn test_script_exit_codes_reach_the_caller() {
        // A stand-in script that always reports "no worker".
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join(SCRIPT_NAME);
        std::fs::write(&script, "import sys\nsys.exit(4)\n").unwrap();

        let strategy = ScriptStrategy::with_script(script);
        match strategy.try_attach(WindowHandle(0x42)) {
            // Both interpreters missing on this host is also a valid end.
            Err(AttachError::MissingInterpreter) => {}
            outcome => assert!(!outcome.unwrap()),
        }
    }
}

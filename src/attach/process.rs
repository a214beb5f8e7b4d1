//! Helper process execution with a hard deadline
//!
//! Helpers are expected to finish in well under a second. A child that
//! outlives its deadline is killed and reported as timed out, so a hung
//! shell or interpreter can never block the dock.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::attach::{exit_code, AttachError};

/// Deadline for one helper run.
pub(crate) const RUN_TIMEOUT: Duration = Duration::from_secs(4);

/// Deadline for building the helper executable on demand.
pub(crate) const BUILD_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Run `cmd` to completion, killing it if it outlives `timeout`.
///
/// The child gets no stdio; helpers talk through their exit code.
pub(crate) fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
) -> Result<ExitStatus, AttachError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    hide_console(cmd);

    let mut child = cmd.spawn()?;
    wait_with_deadline(&mut child, timeout)
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, AttachError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AttachError::TimedOut(timeout));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Map a helper's exit status onto the attach outcome.
///
/// Codes 4 and 5 mean the procedure ran and failed; anything else outside
/// the contract marks the helper itself as unusable.
pub(crate) fn outcome_from_status(status: ExitStatus) -> Result<bool, AttachError> {
    match status.code() {
        Some(exit_code::SUCCESS) => Ok(true),
        Some(exit_code::NO_WORKER) | Some(exit_code::REPARENT_FAILED) => Ok(false),
        Some(code) => Err(AttachError::HelperFailed(code)),
        // Killed by a signal.
        None => Err(AttachError::HelperFailed(-1)),
    }
}

#[cfg(windows)]
fn hide_console(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x08000000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console(_cmd: &mut Command) {}

//! Desktop attachment
//!
//! Pins a window to the desktop layer so it renders behind the icons.
//! Three interchangeable strategies perform the identical reparenting
//! procedure: an in-process Win32 call, a Python helper script, and a
//! separately compiled helper executable. [`AttachChain`] tries them in
//! that order and settles on the first one whose environment can run it.
//!
//! Attachment is an enhancement. Every failure here is swallowed into a
//! boolean at the chain boundary; a dock that cannot attach still works as
//! a normal window.

mod helper;
mod native;
mod process;
pub mod resolver;
mod script;

pub use helper::HelperStrategy;
pub use native::NativeStrategy;
pub use resolver::{attach_window, resolve_worker, DesktopShell, WindowHandle};
pub use script::ScriptStrategy;

use std::time::Duration;

use thiserror::Error;

/// Exit codes shared by the helper script and the helper executable.
pub mod exit_code {
    /// Window was reparented.
    pub const SUCCESS: i32 = 0;
    /// No handle argument was given.
    pub const MISSING_ARG: i32 = 2;
    /// The handle argument is not a positive integer.
    pub const BAD_HANDLE: i32 = 3;
    /// No shell window matched (no Progman, or no WorkerW with an icon view).
    pub const NO_WORKER: i32 = 4;
    /// The reparent call was rejected by the OS.
    pub const REPARENT_FAILED: i32 = 5;
}

/// Everything that can go wrong while attaching.
///
/// The first group marks an environment that cannot run the procedure at
/// all (the chain moves on); the last three mean the procedure ran and came
/// back negative (the chain stops, rerunning it elsewhere cannot help).
#[derive(Debug, Error)]
pub enum AttachError {
    /// Handle is zero or otherwise unusable.
    #[error("invalid window handle {0}")]
    InvalidHandle(isize),

    /// This build cannot make the OS calls in-process.
    #[error("in-process attach is not supported on this platform")]
    Unsupported,

    /// The helper script is not installed.
    #[error("helper script not found")]
    MissingScript,

    /// No Python interpreter on this machine.
    #[error("no usable interpreter for the helper script")]
    MissingInterpreter,

    /// The helper executable is not installed and could not be produced.
    #[error("helper executable not found")]
    MissingHelper,

    /// No cargo toolchain to build the helper executable with.
    #[error("helper executable not found and no toolchain to build it")]
    MissingToolchain,

    /// Building the helper executable failed.
    #[error("helper build failed")]
    BuildFailed,

    /// Spawning or waiting on a helper process failed.
    #[error("helper process error: {0}")]
    Process(#[from] std::io::Error),

    /// A helper process outlived its deadline and was killed.
    #[error("helper timed out after {0:?}")]
    TimedOut(Duration),

    /// A helper exited with a code outside the contract.
    #[error("helper exited with unexpected code {0}")]
    HelperFailed(i32),

    /// No Progman window on this desktop.
    #[error("no Progman window on this desktop")]
    ShellNotFound,

    /// No WorkerW window hosting the icon view.
    #[error("no WorkerW window hosting the icon view")]
    WorkerNotFound,

    /// The OS rejected the reparent call.
    #[error("the reparent call was rejected")]
    ReparentFailed,
}

/// One way of performing the desktop attach.
pub trait AttachStrategy {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Attempt the attach.
    ///
    /// `Ok(true)` and `Ok(false)` mean the reparenting procedure ran to a
    /// definite outcome. `Err` means this environment cannot run it and the
    /// next strategy should be consulted.
    fn try_attach(&self, target: WindowHandle) -> Result<bool, AttachError>;
}

/// Ordered list of attach strategies, consulted until one can run.
pub struct AttachChain {
    strategies: Vec<Box<dyn AttachStrategy>>,
}

impl AttachChain {
    pub fn new(strategies: Vec<Box<dyn AttachStrategy>>) -> Self {
        AttachChain { strategies }
    }

    /// Attach `target` behind the desktop icons.
    ///
    /// Never fails the caller: unusable strategies are skipped, a definite
    /// negative outcome stops the chain, and running out of strategies just
    /// means `false`.
    pub fn attach(&self, target: WindowHandle) -> bool {
        if target.is_null() {
            tracing::warn!("refusing to attach the null window handle");
            return false;
        }

        for strategy in &self.strategies {
            match strategy.try_attach(target) {
                Ok(true) => {
                    tracing::info!(
                        strategy = strategy.name(),
                        handle = %target,
                        "window attached to the desktop layer"
                    );
                    return true;
                }
                Ok(false) => {
                    tracing::warn!(
                        strategy = strategy.name(),
                        handle = %target,
                        "attach procedure ran but failed"
                    );
                    return false;
                }
                Err(err) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        error = %err,
                        "strategy unavailable, trying next"
                    );
                }
            }
        }

        tracing::debug!(handle = %target, "no attach strategy available");
        false
    }
}

/// The default strategy order: in-process, then script, then compiled
/// helper.
pub fn default_chain() -> AttachChain {
    AttachChain::new(vec![
        Box::new(NativeStrategy),
        Box::new(ScriptStrategy::new()),
        Box::new(HelperStrategy::new()),
    ])
}

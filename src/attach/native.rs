//! In-process attachment through direct Win32 calls
//!
//! The fastest strategy: no subprocess, just the resolver running against
//! the live shell. On non-Windows builds it reports itself unsupported so
//! the chain moves on.

use crate::attach::resolver::WindowHandle;
use crate::attach::{AttachError, AttachStrategy};

/// Strategy that reparents the window from inside this process.
pub struct NativeStrategy;

impl AttachStrategy for NativeStrategy {
    fn name(&self) -> &'static str {
        "native"
    }

    #[cfg(windows)]
    fn try_attach(&self, target: WindowHandle) -> Result<bool, AttachError> {
        use crate::attach::resolver::attach_window;
        use crate::platform::win32::Win32Shell;

        match attach_window(&Win32Shell, target) {
            Ok(worker) => {
                tracing::debug!(worker = %worker, "reparented under WorkerW");
                Ok(true)
            }
            Err(
                err @ (AttachError::ShellNotFound
                | AttachError::WorkerNotFound
                | AttachError::ReparentFailed),
            ) => {
                tracing::warn!(error = %err, "in-process attach failed");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    fn try_attach(&self, _target: WindowHandle) -> Result<bool, AttachError> {
        Err(AttachError::Unsupported)
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_off_windows() {
        let err = NativeStrategy.try_attach(WindowHandle(0x42)).unwrap_err();
        assert!(matches!(err, AttachError::Unsupported));
    }
}

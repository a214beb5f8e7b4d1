//! Desktop-layer window resolution
//!
//! The desktop shell renders wallpaper and icons through a hidden companion
//! window of class "WorkerW". Sending an undocumented message to the
//! "Progman" host makes the shell spawn that companion; the WorkerW that has
//! a direct "SHELLDLL_DefView" child is the one hosting the icon view, and
//! reparenting a window underneath it makes the window render behind the
//! icons.
//!
//! The resolution logic is written against the small [`DesktopShell`] seam
//! so it can be exercised without a live shell.

use crate::attach::AttachError;

/// Message that makes Progman spawn its WorkerW companion.
pub const WM_SPAWN_WORKER: u32 = 0x052C;

/// Class name of the desktop shell host window.
pub const PROGMAN_CLASS: &str = "Progman";

/// Class name of the wallpaper/icon companion windows.
pub const WORKER_CLASS: &str = "WorkerW";

/// Class name of the control hosting the desktop icon grid.
pub const DEFVIEW_CLASS: &str = "SHELLDLL_DefView";

/// Opaque OS-level window identifier.
///
/// The OS owns the window; this type only carries the handle value around.
/// Zero is never a valid target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// The null handle.
    pub const NULL: WindowHandle = WindowHandle(0);

    /// Whether this is the null handle.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// The windowing primitives the resolver needs from the OS.
///
/// `platform::win32` implements this against Win32; tests use a recording
/// fake.
pub trait DesktopShell {
    /// Find a top-level window by class name.
    fn find_window(&self, class: &str) -> Option<WindowHandle>;

    /// Find a direct child of `parent` by class name.
    fn find_child(&self, parent: WindowHandle, class: &str) -> Option<WindowHandle>;

    /// Post a message to a window and wait briefly for it to be handled.
    fn send_message(&self, window: WindowHandle, message: u32);

    /// Reparent `child` under `new_parent`. Returns whether the OS accepted.
    fn set_parent(&self, child: WindowHandle, new_parent: WindowHandle) -> bool;

    /// Visit every top-level window with its class name until the visitor
    /// returns `false`. Enumeration order is OS-determined.
    fn for_each_top_level(&self, visit: &mut dyn FnMut(WindowHandle, &str) -> bool);
}

/// Locate the WorkerW window that hosts the desktop icon view.
///
/// Sends [`WM_SPAWN_WORKER`] to Progman first so the companion exists, then
/// scans top-level windows for the first WorkerW with a SHELLDLL_DefView
/// child. Which WorkerW comes first is up to the OS; the shell recreates
/// them on restart, so the returned handle must not be cached.
pub fn resolve_worker<S: DesktopShell>(shell: &S) -> Result<WindowHandle, AttachError> {
    let progman = shell
        .find_window(PROGMAN_CLASS)
        .ok_or(AttachError::ShellNotFound)?;

    shell.send_message(progman, WM_SPAWN_WORKER);

    let mut worker = WindowHandle::NULL;
    shell.for_each_top_level(&mut |window, class| {
        if class == WORKER_CLASS && shell.find_child(window, DEFVIEW_CLASS).is_some() {
            worker = window;
            return false;
        }
        true
    });

    if worker.is_null() {
        Err(AttachError::WorkerNotFound)
    } else {
        Ok(worker)
    }
}

/// Reparent `target` under the icon-hosting WorkerW.
///
/// Returns the WorkerW handle on success so callers can log it. Stateless
/// and re-entrant; calling it again after a shell restart re-resolves the
/// worker from scratch.
pub fn attach_window<S: DesktopShell>(
    shell: &S,
    target: WindowHandle,
) -> Result<WindowHandle, AttachError> {
    if target.is_null() {
        return Err(AttachError::InvalidHandle(target.0));
    }

    let worker = resolve_worker(shell)?;

    if shell.set_parent(target, worker) {
        Ok(worker)
    } else {
        Err(AttachError::ReparentFailed)
    }
}

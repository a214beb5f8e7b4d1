//! Win32 bindings for the desktop shell, launching and login items
//!
//! Implements the [`DesktopShell`] seam against the live window manager,
//! spawns pinned items through the shell and writes the per-user Run key for
//! the start-at-login setting.

use windows::core::PCWSTR;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, FindWindowExW, FindWindowW, GetClassNameW, SendMessageTimeoutW, SetParent,
    SMTO_NORMAL,
};

use crate::attach::resolver::{DesktopShell, WindowHandle};

/// Longest class name we care about; real shell classes are far shorter.
const CLASS_NAME_CAP: usize = 256;

/// How long a window gets to answer the spawn message.
const SEND_TIMEOUT_MS: u32 = 1000;

/// Live Win32 implementation of the shell seam.
pub struct Win32Shell;

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn hwnd_of(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut core::ffi::c_void)
}

fn handle_of(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

impl DesktopShell for Win32Shell {
    fn find_window(&self, class: &str) -> Option<WindowHandle> {
        let wide = to_wide(class);
        unsafe {
            match FindWindowW(PCWSTR(wide.as_ptr()), PCWSTR::null()) {
                Ok(hwnd) if !hwnd.0.is_null() => Some(handle_of(hwnd)),
                _ => None,
            }
        }
    }

    fn find_child(&self, parent: WindowHandle, class: &str) -> Option<WindowHandle> {
        let wide = to_wide(class);
        unsafe {
            match FindWindowExW(
                hwnd_of(parent),
                HWND::default(),
                PCWSTR(wide.as_ptr()),
                PCWSTR::null(),
            ) {
                Ok(hwnd) if !hwnd.0.is_null() => Some(handle_of(hwnd)),
                _ => None,
            }
        }
    }

    fn send_message(&self, window: WindowHandle, message: u32) {
        let mut result = 0usize;
        unsafe {
            // Bounded send so a busy shell cannot hang the dock.
            let _ = SendMessageTimeoutW(
                hwnd_of(window),
                message,
                WPARAM(0),
                LPARAM(0),
                SMTO_NORMAL,
                SEND_TIMEOUT_MS,
                Some(&mut result),
            );
        }
    }

    fn set_parent(&self, child: WindowHandle, new_parent: WindowHandle) -> bool {
        unsafe { SetParent(hwnd_of(child), hwnd_of(new_parent)).is_ok() }
    }

    fn for_each_top_level(&self, visit: &mut dyn FnMut(WindowHandle, &str) -> bool) {
        // EnumWindows only passes a pointer-sized payload, so hand it a thin
        // pointer to the fat visitor reference.
        let mut visitor: &mut dyn FnMut(WindowHandle, &str) -> bool = visit;
        unsafe {
            // Err here just means the callback stopped enumeration early.
            let _ = EnumWindows(
                Some(enum_callback),
                LPARAM(&mut visitor as *mut _ as isize),
            );
        }
    }
}

unsafe extern "system" fn enum_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let visit = &mut *(lparam.0 as *mut &mut dyn FnMut(WindowHandle, &str) -> bool);

    let mut buffer = [0u16; CLASS_NAME_CAP];
    let len = GetClassNameW(hwnd, &mut buffer);
    let class = String::from_utf16_lossy(&buffer[..len.max(0) as usize]);

    if visit(handle_of(hwnd), &class) {
        BOOL(1)
    } else {
        BOOL(0)
    }
}

/// Launch a pinned path as a detached child.
///
/// Goes through `cmd /C start` so the shell picks the handler, which lets
/// documents and folders open exactly like a double-click would.
pub fn launch_detached(path: &str) -> std::io::Result<()> {
    use std::os::windows::process::CommandExt;

    const CREATE_NO_WINDOW: u32 = 0x08000000;
    const DETACHED_PROCESS: u32 = 0x00000008;

    // The empty quoted argument is start's window title slot.
    std::process::Command::new("cmd")
        .args(["/C", "start", "", path])
        .creation_flags(CREATE_NO_WINDOW | DETACHED_PROCESS)
        .spawn()
        .map(|_| ())
}

const RUN_VALUE_NAME: &str = "Quay";

/// Register or clear the dock in the per-user Run key.
///
/// Best effort: a missing value on disable counts as success, everything
/// else is logged and reported as `false`.
pub fn apply_start_at_login(enabled: bool) -> bool {
    use windows::core::w;
    use windows::Win32::Foundation::ERROR_FILE_NOT_FOUND;
    use windows::Win32::System::Registry::{
        RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegSetValueExW, HKEY, HKEY_CURRENT_USER,
        KEY_SET_VALUE, REG_SZ,
    };

    let command = match std::env::current_exe() {
        Ok(exe) => format!("\"{}\"", exe.display()),
        Err(err) => {
            tracing::warn!(error = %err, "cannot resolve own executable for the login item");
            return false;
        }
    };

    unsafe {
        let mut key = HKEY::default();
        let status = RegOpenKeyExW(
            HKEY_CURRENT_USER,
            w!("Software\\Microsoft\\Windows\\CurrentVersion\\Run"),
            0,
            KEY_SET_VALUE,
            &mut key,
        );
        if !status.is_ok() {
            tracing::warn!(?status, "cannot open the Run key");
            return false;
        }

        let value = to_wide(RUN_VALUE_NAME);
        let ok = if enabled {
            let data = to_wide(&command);
            let bytes =
                std::slice::from_raw_parts(data.as_ptr() as *const u8, data.len() * 2);
            RegSetValueExW(key, PCWSTR(value.as_ptr()), 0, REG_SZ, Some(bytes)).is_ok()
        } else {
            let status = RegDeleteValueW(key, PCWSTR(value.as_ptr()));
            status.is_ok() || status == ERROR_FILE_NOT_FOUND
        };

        let _ = RegCloseKey(key);

        if ok {
            tracing::debug!(enabled, "login item updated");
        } else {
            tracing::warn!(enabled, "login item update rejected");
        }
        ok
    }
}

//! The reparenting procedure, straight against Win32
//!
//! Deliberately self-contained: this binary must work without the dock
//! being installed, so it carries its own copy of the procedure instead of
//! linking the dock crate.

#[cfg(windows)]
use windows::core::{w, PCWSTR};
#[cfg(windows)]
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, WPARAM};
#[cfg(windows)]
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, FindWindowExW, FindWindowW, GetClassNameW, SendMessageTimeoutW, SetParent,
    SMTO_NORMAL,
};

/// What happened when we tried.
// Off Windows only NoWorker is ever built.
#[cfg_attr(not(windows), allow(dead_code))]
pub enum Outcome {
    Attached,
    NoWorker,
    ReparentFailed,
}

/// Message that makes Progman spawn its WorkerW companion.
#[cfg(windows)]
const WM_SPAWN_WORKER: u32 = 0x052C;

#[cfg(windows)]
pub fn attach_to_desktop(handle: isize) -> Outcome {
    unsafe {
        let progman = match FindWindowW(w!("Progman"), PCWSTR::null()) {
            Ok(hwnd) if !hwnd.0.is_null() => hwnd,
            _ => return Outcome::NoWorker,
        };

        let mut spawn_result = 0usize;
        let _ = SendMessageTimeoutW(
            progman,
            WM_SPAWN_WORKER,
            WPARAM(0),
            LPARAM(0),
            SMTO_NORMAL,
            1000,
            Some(&mut spawn_result),
        );

        let mut worker = HWND::default();
        // Err just means the callback stopped enumeration early.
        let _ = EnumWindows(Some(enum_proc), LPARAM(&mut worker as *mut HWND as isize));
        if worker.0.is_null() {
            return Outcome::NoWorker;
        }

        let target = HWND(handle as *mut core::ffi::c_void);
        match SetParent(target, worker) {
            Ok(_) => Outcome::Attached,
            Err(_) => Outcome::ReparentFailed,
        }
    }
}

/// First WorkerW with a SHELLDLL_DefView child wins.
#[cfg(windows)]
unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let found = &mut *(lparam.0 as *mut HWND);

    let mut buffer = [0u16; 256];
    let len = GetClassNameW(hwnd, &mut buffer);
    if len > 0 && String::from_utf16_lossy(&buffer[..len as usize]) == "WorkerW" {
        if let Ok(def_view) =
            FindWindowExW(hwnd, HWND::default(), w!("SHELLDLL_DefView"), PCWSTR::null())
        {
            if !def_view.0.is_null() {
                *found = hwnd;
                return BOOL(0);
            }
        }
    }
    BOOL(1)
}

/// No shell window can match off Windows.
#[cfg(not(windows))]
pub fn attach_to_desktop(_handle: isize) -> Outcome {
    Outcome::NoWorker
}

//! Reparent a window under the desktop WorkerW layer
//!
//! Usage: `quay-attach <window-handle>`
//!
//! Exit codes: 0 attached, 2 missing argument, 3 handle not parseable,
//! 4 no matching shell window, 5 reparent rejected. The dock invokes this
//! binary when it cannot perform the attach in-process; the contract is
//! shared with the Python helper.

use std::process::ExitCode;

mod attach;

const EXIT_OK: u8 = 0;
const EXIT_MISSING_ARG: u8 = 2;
const EXIT_BAD_HANDLE: u8 = 3;
const EXIT_NO_WORKER: u8 = 4;
const EXIT_REPARENT_FAILED: u8 = 5;

fn main() -> ExitCode {
    let arg = match std::env::args().nth(1) {
        Some(arg) => arg,
        None => {
            eprintln!("usage: quay-attach <window-handle>");
            return ExitCode::from(EXIT_MISSING_ARG);
        }
    };

    let handle = match parse_handle(&arg) {
        Some(handle) => handle,
        None => {
            eprintln!("quay-attach: '{}' is not a window handle", arg);
            return ExitCode::from(EXIT_BAD_HANDLE);
        }
    };

    match attach::attach_to_desktop(handle) {
        attach::Outcome::Attached => ExitCode::from(EXIT_OK),
        attach::Outcome::NoWorker => {
            eprintln!("quay-attach: no WorkerW window hosting the icon view");
            ExitCode::from(EXIT_NO_WORKER)
        }
        attach::Outcome::ReparentFailed => {
            eprintln!("quay-attach: the reparent call was rejected");
            ExitCode::from(EXIT_REPARENT_FAILED)
        }
    }
}

/// Accept decimal or 0x-prefixed hex; zero and negative are invalid.
fn parse_handle(text: &str) -> Option<isize> {
    let text = text.trim();
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => isize::from_str_radix(hex, 16).ok()?,
        None => text.parse::<isize>().ok()?,
    };
    if value <= 0 {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handle() {
        assert_eq!(parse_handle("1234"), Some(1234));
        assert_eq!(parse_handle("0x1f"), Some(31));
        assert_eq!(parse_handle("0"), None);
        assert_eq!(parse_handle("-3"), None);
        assert_eq!(parse_handle("worker"), None);
    }
}

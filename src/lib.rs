//! quay - a dock that lives behind the desktop icons
//!
//! The interesting part is `attach`: reparenting a window under the shell's
//! hidden WorkerW so it renders on the desktop layer, with three redundant
//! strategies for doing so. `settings` persists the dock configuration and
//! pinned items as JSON. Everything outside `platform` is portable, so the
//! logic runs and tests on any host.

pub mod attach;
pub mod cli;
pub mod platform;
pub mod settings;

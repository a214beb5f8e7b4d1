//! Dock configuration and item persistence
//!
//! Two JSON documents live in the per-user config directory:
//! `dock-settings.json` (appearance and behavior, one object) and
//! `dock-apps.json` (the pinned items, one array). Every field is optional
//! on disk; a missing file or field means defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SETTINGS_FILE: &str = "dock-settings.json";
const APPS_FILE: &str = "dock-apps.json";
const CONFIG_DIR_NAME: &str = "quay";

/// Environment override for the config directory, mainly for tests.
pub const CONFIG_DIR_ENV: &str = "QUAY_CONFIG_DIR";

const DEFAULT_BACKGROUND_HEX: &str = "#1e1e1e";
const DEFAULT_OPACITY: f32 = 0.6;

// ============================================================================
// SETTINGS DOCUMENT
// ============================================================================

/// Where the dock sits on the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockPosition {
    #[default]
    Top,
    Bottom,
}

/// Persisted dock appearance and behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DockSettings {
    /// Screen edge the dock docks to.
    pub position: DockPosition,
    /// Background as a CSS `rgba(r,g,b,a)` string.
    pub background: String,
    /// Corner radius in pixels.
    pub border_radius: u32,
    /// Icon edge length in pixels.
    pub icon_size: u32,
    /// Show item labels under the icons. Absent on disk means shown.
    pub show_labels: bool,
    /// Show the add-item button in the dock. Absent on disk means shown.
    pub show_add_button: bool,
    /// Show the settings entry in the dock. Absent on disk means shown.
    pub show_settings_entry: bool,
    /// Register the dock as a login item.
    pub start_at_login: bool,
}

impl Default for DockSettings {
    fn default() -> Self {
        DockSettings {
            position: DockPosition::Top,
            background: rgba_string(DEFAULT_BACKGROUND_HEX, DEFAULT_OPACITY),
            border_radius: 20,
            icon_size: 36,
            show_labels: true,
            show_add_button: true,
            show_settings_entry: true,
            start_at_login: false,
        }
    }
}

/// Convert a `#rrggbb` color and an opacity into the `rgba()` string the
/// settings document stores. Invalid hex falls back to the default dark
/// gray components.
pub fn rgba_string(hex: &str, opacity: f32) -> String {
    let (r, g, b) = parse_hex(hex).unwrap_or((30, 30, 30));
    let a = opacity.clamp(0.0, 1.0);
    format!("rgba({},{},{},{})", r, g, b, a)
}

/// Parse an `rgba(r,g,b,a)` string back into its components.
pub fn parse_rgba(value: &str) -> Option<(u8, u8, u8, f32)> {
    let inner = value.trim().strip_prefix("rgba(")?.strip_suffix(')')?;
    let mut parts = inner.split(',');
    let r = parts.next()?.trim().parse().ok()?;
    let g = parts.next()?.trim().parse().ok()?;
    let b = parts.next()?.trim().parse().ok()?;
    let a = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b, a))
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

// ============================================================================
// DOCK ITEMS
// ============================================================================

/// One pinned dock entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockItem {
    /// Stable id, `app-<millis>`.
    pub id: String,
    /// Display label, defaults to the file stem of `path`.
    pub label: String,
    /// Filesystem path of the launched target.
    pub path: String,
    /// Optional icon as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl DockItem {
    /// Build an entry for a filesystem path.
    pub fn from_path(path: &str) -> Self {
        DockItem {
            id: next_item_id(),
            label: label_for(path),
            path: path.to_string(),
            icon: None,
        }
    }
}

fn label_for(path: &str) -> String {
    match Path::new(path).file_stem() {
        Some(stem) if !stem.is_empty() => stem.to_string_lossy().into_owned(),
        _ => "app".to_string(),
    }
}

/// Wall-clock millis, nudged forward on collision so two quick adds cannot
/// share an id.
fn next_item_id() -> String {
    static LAST: AtomicI64 = AtomicI64::new(0);

    let now = chrono::Utc::now().timestamp_millis();
    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return format!("app-{}", next),
            Err(actual) => prev = actual,
        }
    }
}

// ============================================================================
// STORE
// ============================================================================

/// Settings persistence error.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// No per-user config directory on this system.
    #[error("no user configuration directory")]
    NoConfigDir,

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document exists but is not valid JSON for its schema.
    #[error("malformed settings document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Reads and writes the dock's persisted state.
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Store under the per-user config directory, honoring the
    /// [`CONFIG_DIR_ENV`] override.
    pub fn open() -> Result<Self, SettingsError> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|d| d.join(CONFIG_DIR_NAME))
                .ok_or(SettingsError::NoConfigDir)?,
        };
        Ok(SettingsStore { dir })
    }

    /// Store rooted at a specific directory.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        SettingsStore { dir: dir.into() }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn apps_path(&self) -> PathBuf {
        self.dir.join(APPS_FILE)
    }

    /// Load the settings document, with defaults for a missing file.
    pub fn load(&self) -> Result<DockSettings, SettingsError> {
        match fs::read_to_string(self.settings_path()) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(DockSettings::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Write the settings document (pretty JSON, like every other tool that
    /// touches it expects).
    pub fn save(&self, settings: &DockSettings) -> Result<(), SettingsError> {
        self.write_json(self.settings_path(), settings)
    }

    /// Persist and apply side effects (the login item).
    pub fn apply(&self, settings: &DockSettings) -> Result<(), SettingsError> {
        self.save(settings)?;
        if !crate::platform::apply_start_at_login(settings.start_at_login) {
            tracing::debug!("login item not updated");
        }
        Ok(())
    }

    /// Delete both documents, settings and pinned items; the next load
    /// sees defaults and an empty list.
    pub fn reset(&self) -> Result<(), SettingsError> {
        remove_if_present(&self.settings_path())?;
        remove_if_present(&self.apps_path())
    }

    /// Load the pinned items, empty for a missing file.
    pub fn load_items(&self) -> Result<Vec<DockItem>, SettingsError> {
        match fs::read_to_string(self.apps_path()) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Look up a pinned item by id.
    pub fn find_item(&self, id: &str) -> Result<Option<DockItem>, SettingsError> {
        let items = self.load_items()?;
        Ok(items.into_iter().find(|item| item.id == id))
    }

    pub fn save_items(&self, items: &[DockItem]) -> Result<(), SettingsError> {
        self.write_json(self.apps_path(), items)
    }

    /// Append a new item for `path` and persist the list.
    pub fn add_item(&self, path: &str) -> Result<DockItem, SettingsError> {
        let mut items = self.load_items()?;
        let item = DockItem::from_path(path);
        items.push(item.clone());
        self.save_items(&items)?;
        Ok(item)
    }

    /// Remove an item by id. Returns whether anything was removed.
    pub fn remove_item(&self, id: &str) -> Result<bool, SettingsError> {
        let mut items = self.load_items()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        let removed = items.len() != before;
        if removed {
            self.save_items(&items)?;
        }
        Ok(removed)
    }

    /// Move an item to `index`, clamped to the end of the list. Returns
    /// whether the id was found.
    pub fn move_item(&self, id: &str, index: usize) -> Result<bool, SettingsError> {
        let mut items = self.load_items()?;
        let from = match items.iter().position(|item| item.id == id) {
            Some(from) => from,
            None => return Ok(false),
        };
        let item = items.remove(from);
        let to = index.min(items.len());
        items.insert(to, item);
        self.save_items(&items)?;
        Ok(true)
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        value: &T,
    ) -> Result<(), SettingsError> {
        fs::create_dir_all(&self.dir)?;
        let text = serde_json::to_string_pretty(value)?;
        fs::write(path, text)?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<(), SettingsError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

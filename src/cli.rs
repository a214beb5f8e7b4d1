//! Command-line surface
//!
//! `attach` drives the strategy chain; `launch` spawns a pinned item; the
//! rest manage the persisted settings and the pinned-item list.

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::attach::{
    self, AttachChain, AttachStrategy, HelperStrategy, NativeStrategy, ScriptStrategy,
    WindowHandle,
};
use crate::platform;
use crate::settings::{
    parse_rgba, rgba_string, DockPosition, DockSettings, SettingsError, SettingsStore,
};

/// A dock that pins itself to the desktop layer, behind the icons
#[derive(Parser, Debug)]
#[command(name = "quay")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Attach a window to the desktop layer behind the icons
    Attach {
        /// Window handle, decimal or 0x-prefixed hex
        handle: String,

        /// Use one specific strategy instead of the default order
        #[arg(long, value_enum)]
        strategy: Option<StrategyKind>,
    },

    /// Pin an application to the dock
    Add {
        /// Path of the application to pin
        path: String,
    },

    /// Remove a pinned item
    Remove {
        /// Item id, as shown by `list`
        id: String,
    },

    /// Move a pinned item to a new position
    Move {
        /// Item id, as shown by `list`
        id: String,

        /// Target position, 0-based
        index: usize,
    },

    /// List the pinned items
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Launch a pinned item
    Launch {
        /// Item id, as shown by `list`
        id: String,
    },

    /// Show or change the dock settings
    Settings(SettingsArgs),

    /// Delete the persisted settings and pinned items
    Reset,
}

/// Attach strategies, in their default order.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StrategyKind {
    /// In-process Win32 calls
    Native,
    /// The bundled Python helper script
    Script,
    /// The compiled quay-attach helper
    Helper,
}

impl StrategyKind {
    fn into_strategy(self) -> Box<dyn AttachStrategy> {
        match self {
            StrategyKind::Native => Box::new(NativeStrategy),
            StrategyKind::Script => Box::new(ScriptStrategy::new()),
            StrategyKind::Helper => Box::new(HelperStrategy::new()),
        }
    }
}

/// Setters for `quay settings`; with no flags the current document is
/// printed.
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Dock position
    #[arg(long, value_enum)]
    pub position: Option<PositionArg>,

    /// Background color as #rrggbb
    #[arg(long)]
    pub color: Option<String>,

    /// Background opacity, 0 to 1
    #[arg(long)]
    pub opacity: Option<f32>,

    /// Corner radius in pixels
    #[arg(long)]
    pub border_radius: Option<u32>,

    /// Icon size in pixels
    #[arg(long)]
    pub icon_size: Option<u32>,

    /// Show item labels
    #[arg(long)]
    pub show_labels: Option<bool>,

    /// Show the add-item button
    #[arg(long)]
    pub show_add_button: Option<bool>,

    /// Show the settings entry
    #[arg(long)]
    pub show_settings_entry: Option<bool>,

    /// Start the dock at login
    #[arg(long)]
    pub start_at_login: Option<bool>,
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.color.is_none()
            && self.opacity.is_none()
            && self.border_radius.is_none()
            && self.icon_size.is_none()
            && self.show_labels.is_none()
            && self.show_add_button.is_none()
            && self.show_settings_entry.is_none()
            && self.start_at_login.is_none()
    }
}

/// CLI-facing mirror of [`DockPosition`].
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PositionArg {
    Top,
    Bottom,
}

impl From<PositionArg> for DockPosition {
    fn from(value: PositionArg) -> Self {
        match value {
            PositionArg::Top => DockPosition::Top,
            PositionArg::Bottom => DockPosition::Bottom,
        }
    }
}

/// Error surfaced to the terminal with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("invalid window handle '{0}'")]
    BadHandle(String),

    #[error("window could not be attached")]
    AttachFailed,

    #[error("no dock item with id '{0}'")]
    NoSuchItem(String),

    #[error("could not launch '{0}': {1}")]
    LaunchFailed(String, std::io::Error),
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Attach { handle, strategy } => attach_command(&handle, strategy),
        Command::Add { path } => {
            let store = SettingsStore::open()?;
            let item = store.add_item(&path)?;
            println!("pinned {} as {}", item.label, item.id);
            Ok(())
        }
        Command::Remove { id } => {
            let store = SettingsStore::open()?;
            if store.remove_item(&id)? {
                println!("removed {}", id);
                Ok(())
            } else {
                Err(CliError::NoSuchItem(id))
            }
        }
        Command::Move { id, index } => {
            let store = SettingsStore::open()?;
            if store.move_item(&id, index)? {
                println!("moved {} to {}", id, index);
                Ok(())
            } else {
                Err(CliError::NoSuchItem(id))
            }
        }
        Command::List { json } => list_command(json),
        Command::Launch { id } => {
            let store = SettingsStore::open()?;
            let item = store
                .find_item(&id)?
                .ok_or_else(|| CliError::NoSuchItem(id))?;
            platform::launch_detached(&item.path)
                .map_err(|err| CliError::LaunchFailed(item.path.clone(), err))?;
            println!("launched {}", item.label);
            Ok(())
        }
        Command::Settings(args) => settings_command(args),
        Command::Reset => {
            let store = SettingsStore::open()?;
            store.reset()?;
            println!("dock reset to defaults");
            Ok(())
        }
    }
}

fn attach_command(text: &str, strategy: Option<StrategyKind>) -> Result<(), CliError> {
    let handle = parse_handle(text).ok_or_else(|| CliError::BadHandle(text.to_string()))?;

    let chain = match strategy {
        Some(kind) => AttachChain::new(vec![kind.into_strategy()]),
        None => attach::default_chain(),
    };

    if chain.attach(handle) {
        println!("attached {}", handle);
        Ok(())
    } else {
        Err(CliError::AttachFailed)
    }
}

fn list_command(json: bool) -> Result<(), CliError> {
    let store = SettingsStore::open()?;
    let items = store.load_items()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&items).map_err(SettingsError::from)?
        );
        return Ok(());
    }

    if items.is_empty() {
        println!("no pinned items");
        return Ok(());
    }
    for (index, item) in items.iter().enumerate() {
        println!("{:2}  {:<18}  {:<20}  {}", index, item.id, item.label, item.path);
    }
    Ok(())
}

fn settings_command(args: SettingsArgs) -> Result<(), CliError> {
    let store = SettingsStore::open()?;
    let mut settings = store.load()?;

    if args.is_empty() {
        print_settings(&settings)?;
        return Ok(());
    }

    if let Some(position) = args.position {
        settings.position = position.into();
    }
    if args.color.is_some() || args.opacity.is_some() {
        // Rebuild the rgba string from whichever half was given, keeping
        // the other half as currently stored.
        let (r, g, b, a) = parse_rgba(&settings.background).unwrap_or((30, 30, 30, 0.6));
        let hex = args
            .color
            .unwrap_or_else(|| format!("#{:02x}{:02x}{:02x}", r, g, b));
        settings.background = rgba_string(&hex, args.opacity.unwrap_or(a));
    }
    if let Some(border_radius) = args.border_radius {
        settings.border_radius = border_radius;
    }
    if let Some(icon_size) = args.icon_size {
        settings.icon_size = icon_size;
    }
    if let Some(show_labels) = args.show_labels {
        settings.show_labels = show_labels;
    }
    if let Some(show_add_button) = args.show_add_button {
        settings.show_add_button = show_add_button;
    }
    if let Some(show_settings_entry) = args.show_settings_entry {
        settings.show_settings_entry = show_settings_entry;
    }
    if let Some(start_at_login) = args.start_at_login {
        settings.start_at_login = start_at_login;
    }

    store.apply(&settings)?;
    print_settings(&settings)?;
    Ok(())
}

fn print_settings(settings: &DockSettings) -> Result<(), CliError> {
    println!(
        "{}",
        serde_json::to_string_pretty(settings).map_err(SettingsError::from)?
    );
    Ok(())
}

/// Accept decimal or 0x-prefixed hex; zero and negative are invalid.
pub fn parse_handle(text: &str) -> Option<WindowHandle> {
    let text = text.trim();
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => isize::from_str_radix(hex, 16).ok()?,
        None => text.parse::<isize>().ok()?,
    };
    if value <= 0 {
        None
    } else {
        Some(WindowHandle(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_handle() {
        assert_eq!(parse_handle("66"), Some(WindowHandle(66)));
        assert_eq!(parse_handle("0x2a"), Some(WindowHandle(42)));
        assert_eq!(parse_handle("0X2A"), Some(WindowHandle(42)));
        assert_eq!(parse_handle(" 7 "), Some(WindowHandle(7)));
    }

    #[test]
    fn test_parse_handle_rejects_zero_and_garbage() {
        assert_eq!(parse_handle("0"), None);
        assert_eq!(parse_handle("0x0"), None);
        assert_eq!(parse_handle("-5"), None);
        assert_eq!(parse_handle("abc"), None);
        assert_eq!(parse_handle(""), None);
    }

    #[test]
    fn test_command_line_shapes() {
        let cli = Cli::try_parse_from(["quay", "attach", "0x2a"]).unwrap();
        assert!(matches!(cli.command, Command::Attach { .. }));

        let cli = Cli::try_parse_from(["quay", "launch", "app-17"]).unwrap();
        match cli.command {
            Command::Launch { id } => assert_eq!(id, "app-17"),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "quay",
            "settings",
            "--color",
            "#336699",
            "--opacity",
            "0.5",
        ])
        .unwrap();
        match cli.command {
            Command::Settings(args) => {
                assert!(!args.is_empty());
                assert_eq!(args.color.as_deref(), Some("#336699"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["quay"]).is_err());
        assert!(Cli::try_parse_from(["quay", "attach"]).is_err());
    }

    #[test]
    fn test_settings_with_no_flags_is_empty() {
        let cli = Cli::try_parse_from(["quay", "settings"]).unwrap();
        match cli.command {
            Command::Settings(args) => assert!(args.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

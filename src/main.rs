mod actions;
mod dbus;
mod find_window;
mod gdbus;
mod logging;
mod plugin;

use std::{borrow::Cow, path::Path, process::ExitCode};

use actions::settings::{Binding, JsonSettingsStore, SettingsError, SettingsStore};
use actions::{ActionKind, HostFacade, KeyDown};
use clap::{Parser, Subcommand};
use find_window::MATCH_ANY;
use gdbus::{WindowCommand, WindowDetails, WindowId, WindowSummary};
use plugin::{GnomeWindowCalls, PluginError, EXTENSION_UUID};
use thiserror::Error;
use tracing::{debug, error, info};
use zbus::blocking::Connection;

const DEFAULT_BINDINGS_FILE: &str = "~/.config/gnome-window-calls/bindings.json";

#[derive(Debug, Subcommand)]
enum WindowOp {
    Move {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
    },
    Resize {
        width: i32,
        height: i32,
    },
    MoveResize {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        width: i32,
        height: i32,
    },
    Maximize,
    Minimize,
    Unmaximize,
    Unminimize,
    Activate,
    Close,
}

impl From<WindowOp> for WindowCommand {
    fn from(op: WindowOp) -> Self {
        match op {
            WindowOp::Move { x, y } => WindowCommand::Move { x, y },
            WindowOp::Resize { width, height } => WindowCommand::Resize { width, height },
            WindowOp::MoveResize { x, y, width, height } => {
                WindowCommand::MoveResize { x, y, width, height }
            }
            WindowOp::Maximize => WindowCommand::Maximize,
            WindowOp::Minimize => WindowCommand::Minimize,
            WindowOp::Unmaximize => WindowCommand::Unmaximize,
            WindowOp::Unminimize => WindowCommand::Unminimize,
            WindowOp::Activate => WindowCommand::Activate,
            WindowOp::Close => WindowCommand::Close,
        }
    }
}

#[derive(Debug, Subcommand)]
enum ExtensionOp {
    List,
    Install {
        #[arg(default_value = EXTENSION_UUID)]
        uuid: String,
    },
    Info {
        #[arg(default_value = EXTENSION_UUID)]
        uuid: String,
    },
    Enable {
        uuid: String,
    },
    Disable {
        uuid: String,
    },
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all open windows
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the wm class of every open window
    Classes,
    /// Print the title of every open window
    Titles,
    /// Print the ids of the windows matching both patterns
    Find {
        #[arg(long, default_value = MATCH_ANY)]
        class: String,

        #[arg(long, default_value = MATCH_ANY)]
        title: String,
    },
    Details {
        id: u64,
    },
    Title {
        id: u64,
    },
    /// Send a single command to a window
    Window {
        id: u64,

        #[command(subcommand)]
        op: WindowOp,
    },
    /// Create or update a named binding
    Bind {
        name: String,

        #[arg(value_enum)]
        action: ActionKind,

        #[arg(long)]
        class: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        x: Option<i32>,

        #[arg(long, allow_negative_numbers = true)]
        y: Option<i32>,

        #[arg(long)]
        width: Option<i32>,

        #[arg(long)]
        height: Option<i32>,
    },
    Unbind {
        name: String,
    },
    Bindings,
    /// Run a binding as if its button was pressed
    Press {
        name: String,
    },
    /// List the actions a binding can run
    Actions,
    Extension {
        #[command(subcommand)]
        op: ExtensionOp,
    },
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Opts {
    /// Bindings file
    #[arg(short, long)]
    file: Option<String>,

    #[arg(long, conflicts_with_all = ["session", "system"])]
    dbus_address: Option<String>,

    #[arg(long, conflicts_with = "system")]
    session: bool,

    #[arg(long, conflicts_with = "session")]
    system: bool,

    /// Do not ask gnome shell to install the window-calls extension when it is missing
    #[arg(long)]
    no_install: bool,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    subcommand: Command,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("could not connect to dbus: {0}")]
    Connect(zbus::Error),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Window(#[from] gdbus::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("no binding named '{0}'")]
    UnknownBinding(String),
}

/// The terminal is the only window this host has.
struct TerminalHost;

impl HostFacade for TerminalHost {
    fn main_window_visible(&self) -> bool {
        true
    }

    fn reopen(&mut self) {}

    fn focus_action_configurator(&mut self, action: ActionKind) {
        debug!("showing configurator for {}", action.name());
    }
}

fn connect(opts: &Opts) -> Result<Connection, AppError> {
    let conn = if opts.system {
        Connection::system()
    } else if let Some(addr) = &opts.dbus_address {
        zbus::blocking::connection::Builder::address(addr.as_str()).and_then(|b| b.build())
    } else {
        debug!("using session bus (explicitly requested: {})", opts.session);
        Connection::session()
    };

    conn.map_err(AppError::Connect)
}

fn print_summary(w: &WindowSummary) {
    let geom = w
        .geom
        .map(|g| format!("{},{} {}x{}", g.x, g.y, g.width, g.height))
        .unwrap_or_default();

    println!("{:>12}  {:<32}  {}", w.id, w.wm_class.as_deref().unwrap_or("-"), geom);
}

fn print_details(d: &WindowDetails) {
    println!("{} ({})", d.title, d.wm_class.as_deref().unwrap_or("-"));
    println!("  id:       {}", d.id);

    if let Some(g) = d.geom {
        println!("  position: {},{}", g.x, g.y);
        println!("  size:     {}x{}", g.width, g.height);
    }
}

fn bind(
    store: &mut JsonSettingsStore,
    name: &str,
    action: ActionKind,
    class: Option<String>,
    title: Option<String>,
    position: (Option<i32>, Option<i32>),
    size: (Option<i32>, Option<i32>),
) -> Result<(), SettingsError> {
    let mut settings = store
        .binding(name)
        .map(|existing| existing.settings.clone())
        .unwrap_or_default();

    let config = action.load_config(&settings);
    let config = actions::ActionConfig {
        wm_class: class.unwrap_or(config.wm_class),
        title: title.unwrap_or(config.title),
        x: position.0.unwrap_or(config.x),
        y: position.1.unwrap_or(config.y),
        width: size.0.unwrap_or(config.width),
        height: size.1.unwrap_or(config.height),
    };

    action.save_config(&mut settings, &config);
    store.set_binding(name, Binding { action, settings })?;

    info!("saved binding {name} to {:?}", store.path());
    Ok(())
}

fn run(opts: Opts) -> Result<(), AppError> {
    let path = match &opts.file {
        Some(f) => Cow::Owned(f.clone()),
        None => shellexpand::tilde(DEFAULT_BINDINGS_FILE),
    };
    let path = Path::new(&*path);

    match &opts.subcommand {
        Command::Bind { name, action, class, title, x, y, width, height } => {
            let mut store = JsonSettingsStore::open(path)?;
            bind(
                &mut store,
                name,
                *action,
                class.clone(),
                title.clone(),
                (*x, *y),
                (*width, *height),
            )?;
            return Ok(());
        }
        Command::Unbind { name } => {
            let mut store = JsonSettingsStore::open(path)?;
            return match store.remove_binding(name)? {
                Some(_) => Ok(()),
                None => Err(AppError::UnknownBinding(name.clone())),
            };
        }
        Command::Bindings => {
            let store = JsonSettingsStore::open(path)?;
            for name in store.names() {
                if let Some(binding) = store.binding(name) {
                    println!("{name}: {}", serde_json::to_string(binding)?);
                }
            }
            return Ok(());
        }
        Command::Actions => {
            for holder in plugin::action_holders() {
                let icon = holder.kind.on_ready(Path::new("."));
                println!("{:<40}  {:<14}  {}", holder.id, holder.name, icon.display());
            }
            return Ok(());
        }
        _ => (),
    }

    let conn = connect(&opts)?;
    let plugin = GnomeWindowCalls::new(&conn, !opts.no_install);
    let windows = plugin.windows();

    match opts.subcommand {
        Command::List { json } => {
            let list = windows.list_windows()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                list.iter().for_each(print_summary);
            }
        }
        Command::Classes => {
            for wm_class in windows.all_wm_classes()? {
                println!("{}", wm_class.as_deref().unwrap_or("-"));
            }
        }
        Command::Titles => {
            for title in windows.all_titles()? {
                println!("{title}");
            }
        }
        Command::Find { class, title } => {
            for id in windows.find_windows(&class, &title)? {
                println!("{id}");
            }
        }
        Command::Details { id } => {
            if let Some(details) = windows.window_details(WindowId(id))? {
                println!("{}", serde_json::to_string_pretty(&details)?);
            }
        }
        Command::Title { id } => println!("{}", windows.title(WindowId(id))?),
        Command::Window { id, op } => windows.send(WindowId(id), op.into())?,
        Command::Press { name } => {
            let store = JsonSettingsStore::open(path)?;

            match plugin.press(&store, &name, &mut TerminalHost)? {
                KeyDown::Skipped { missing } => {
                    println!("{name} is missing {}", missing.join(", "))
                }
                KeyDown::Dispatched(report) => {
                    println!("{name}: applied to {} window(s)", report.applied.len());
                    for (id, e) in &report.failed {
                        println!("  window {id} failed: {e}");
                    }
                }
                KeyDown::Status(details) => details.iter().for_each(print_details),
            }
        }
        Command::Extension { op } => {
            let extensions = plugin.extensions();

            match op {
                ExtensionOp::List => {
                    extensions.installed_extensions()?.iter().for_each(|uuid| println!("{uuid}"))
                }
                ExtensionOp::Install { uuid } => {
                    println!("{:?}", extensions.install_extension(&uuid)?)
                }
                ExtensionOp::Info { uuid } => match extensions.extension_info(&uuid)? {
                    Some(info) => {
                        println!("{} ({})", info.name, info.uuid);
                        println!("  {}", info.description);
                        println!("  state: {:?}, enabled: {}", info.state, info.is_enabled());
                        println!("  type: {:?}, prefs: {}", info.exttype, info.has_prefs);
                        if !info.url.is_empty() {
                            println!("  url: {}", info.url);
                        }
                        if !info.error.is_empty() {
                            println!("  error: {}", info.error);
                        }
                    }
                    None => println!("{uuid} is not installed"),
                }
                ExtensionOp::Enable { uuid } => extensions.enable_extension(&uuid)?,
                ExtensionOp::Disable { uuid } => extensions.disable_extension(&uuid)?,
            }
        }
        Command::Bind { .. } | Command::Unbind { .. } | Command::Bindings | Command::Actions => (),
    }

    Ok(())
}

fn main() -> ExitCode {
    let opts = Opts::parse();
    logging::init_logging(opts.verbose);

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Opts::command().debug_assert();
    }

    #[test]
    fn window_subcommand_accepts_negative_coordinates() {
        let opts =
            Opts::try_parse_from(["gnome-window-calls", "window", "17", "move", "-1920", "0"])
                .unwrap();

        match opts.subcommand {
            Command::Window { id, op } => {
                assert_eq!(id, 17);
                assert_eq!(WindowCommand::from(op), WindowCommand::Move { x: -1920, y: 0 });
            }
            other => panic!("unexpected subcommand {other:?}"),
        }
    }

    #[test]
    fn bus_selection_flags_conflict() {
        let both_buses = ["gnome-window-calls", "--session", "--system", "list"];
        assert!(Opts::try_parse_from(both_buses).is_err());

        let address_and_bus =
            ["gnome-window-calls", "--dbus-address", "unix:path=/tmp/bus", "--system", "list"];
        assert!(Opts::try_parse_from(address_and_bus).is_err());
    }

    #[test]
    fn bind_merges_with_existing_binding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");
        let mut store = JsonSettingsStore::open(&path).unwrap();

        let kind = ActionKind::MoveResize;
        let terminal = Some("terminal".to_owned());
        let vim = Some("vim".to_owned());

        bind(&mut store, "term", kind, terminal, None, (Some(10), Some(20)), (None, None)).unwrap();
        bind(&mut store, "term", kind, None, vim, (None, None), (Some(800), Some(600))).unwrap();

        let settings = &store.binding("term").unwrap().settings;
        assert_eq!(settings.wm_class_pattern(), "terminal");
        assert_eq!(settings.title_pattern(), "vim");
        assert_eq!((settings.x(), settings.y()), (Some(10), Some(20)));
        assert_eq!((settings.width(), settings.height()), (Some(800), Some(600)));
    }
}

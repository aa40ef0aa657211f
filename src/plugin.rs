use thiserror::Error;
use tracing::{error, info};
use zbus::blocking::Connection;

use crate::actions::settings::{SettingsError, SettingsStore};
use crate::actions::{ActionKind, HostFacade, KeyDown};
use crate::dbus::{ShellExtensionsProxyBlocking, WindowsProxyBlocking};
use crate::gdbus::extensions::{ExtensionCalls, ExtensionManager, InstallOutcome};
use crate::gdbus::windows::{WindowCalls, WindowManager};

/// The shell extension that exports the window operations.
pub const EXTENSION_UUID: &str = "window-calls@domandoman.xyz";

pub const PLUGIN_NAME: &str = "Gnome Window Calls";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("no binding named '{0}'")]
    UnknownBinding(String),

    #[error(transparent)]
    Window(#[from] crate::gdbus::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// An action as announced to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionHolder {
    pub id: String,
    pub name: &'static str,
    pub kind: ActionKind,
}

/// Every action the plugin offers, in registration order.
pub fn action_holders() -> Vec<ActionHolder> {
    ActionKind::ALL
        .iter()
        .map(|&kind| ActionHolder { id: kind.id(), name: kind.name(), kind })
        .collect()
}

pub struct GnomeWindowCalls<
    W = WindowsProxyBlocking<'static>,
    E = ShellExtensionsProxyBlocking<'static>,
> {
    extensions: ExtensionManager<E>,
    windows: WindowManager<W>,
}

impl GnomeWindowCalls {
    /// Binds both managers. With `install_extension` the window-calls extension
    /// is requested from the shell before the window manager binds, so a fresh
    /// install is picked up right away.
    pub fn new(connection: &Connection, install_extension: bool) -> Self {
        let extensions = ExtensionManager::connect(connection);

        if install_extension {
            handle_extension_installation(&extensions);
        }

        GnomeWindowCalls::from_parts(extensions, WindowManager::connect(connection))
    }
}

fn handle_extension_installation<E: ExtensionCalls>(
    extensions: &ExtensionManager<E>,
) -> Option<InstallOutcome> {
    match extensions.ensure_installed(EXTENSION_UUID) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("failed to check for extension {EXTENSION_UUID}: {e}");
            None
        }
    }
}

impl<W: WindowCalls, E: ExtensionCalls> GnomeWindowCalls<W, E> {
    pub fn from_parts(extensions: ExtensionManager<E>, windows: WindowManager<W>) -> Self {
        info!("{PLUGIN_NAME} {PLUGIN_VERSION} loaded");

        GnomeWindowCalls { extensions, windows }
    }

    pub fn extensions(&self) -> &ExtensionManager<E> {
        &self.extensions
    }

    pub fn windows(&self) -> &WindowManager<W> {
        &self.windows
    }

    /// Runs the key down handler of the binding stored under `name`.
    pub fn press<S: SettingsStore>(
        &self,
        store: &S,
        name: &str,
        host: &mut dyn HostFacade,
    ) -> Result<KeyDown, PluginError> {
        let binding = store
            .binding(name)
            .ok_or_else(|| PluginError::UnknownBinding(name.to_owned()))?;

        info!("{name} pressed, running {}", binding.action.name());

        Ok(binding.action.on_key_down(&self.windows, host, &binding.settings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::settings::{ActionSettings, Binding, JsonSettingsStore, Position};
    use crate::actions::status::tests::RecordingHost;
    use crate::gdbus::extensions::tests::FakeShell;
    use crate::gdbus::windows::tests::{Call, FakeWindows};
    use crate::gdbus::WindowCommand;

    #[test]
    fn registers_all_actions() {
        let holders = action_holders();

        let ids: Vec<_> = holders.iter().map(|holder| holder.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "com_core447_GnomeWindowCalls::Move",
                "com_core447_GnomeWindowCalls::Status",
                "com_core447_GnomeWindowCalls::Resize",
                "com_core447_GnomeWindowCalls::MoveResize",
            ]
        );
        assert_eq!(holders[3].kind, ActionKind::MoveResize);
        assert_eq!(holders[3].name, "Move & Resize");
    }

    #[test]
    fn installation_is_requested_once_missing() {
        let missing = FakeShell::new(vec![], "successful");
        assert_eq!(
            handle_extension_installation(&ExtensionManager::connected(&missing)),
            Some(InstallOutcome::Successful)
        );

        let present = FakeShell::new(vec![EXTENSION_UUID], "successful");
        assert_eq!(
            handle_extension_installation(&ExtensionManager::connected(&present)),
            Some(InstallOutcome::AlreadyInstalled)
        );
    }

    #[test]
    fn press_runs_the_stored_binding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bindings.json");

        let mut store = JsonSettingsStore::open(&path).unwrap();
        store
            .set_binding(
                "gimp-left",
                Binding {
                    action: ActionKind::Move,
                    settings: ActionSettings {
                        wm_class: Some("gimp".into()),
                        position: Some(Position { x: Some(0), y: Some(32) }),
                        ..Default::default()
                    },
                },
            )
            .unwrap();

        let shell = FakeShell::new(vec![EXTENSION_UUID], "");
        let fake = FakeWindows::with_windows(&[
            (1, Some("Gimp"), "GNU Image Manipulation"),
            (2, None, ""),
        ]);
        let plugin = GnomeWindowCalls::from_parts(
            ExtensionManager::connected(&shell),
            WindowManager::connected(&fake),
        );
        let mut host = RecordingHost::default();

        assert!(matches!(plugin.press(&store, "gimp-left", &mut host), Ok(KeyDown::Dispatched(_))));
        let moved = Call::Command("1".into(), WindowCommand::Move { x: 0, y: 32 });
        assert!(fake.calls().contains(&moved));

        assert!(matches!(
            plugin.press(&store, "missing", &mut host),
            Err(PluginError::UnknownBinding(name)) if name == "missing"
        ));
    }
}

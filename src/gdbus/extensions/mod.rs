pub mod extension_info;

use std::collections::HashMap;
use tracing::{debug, info, warn};
use zbus::blocking::Connection;

use super::{shell_exports, Error, Result};
use crate::dbus::ShellExtensionsProxyBlocking;
pub use extension_info::{ExtensionDict, ExtensionInfo};

const EXTENSIONS_PATH: &str = "/org/gnome/Shell";
const EXTENSIONS_INTERFACE: &str = "org.gnome.Shell.Extensions";

/// Raw method set of the shell's extension registry.
pub trait ExtensionCalls {
    fn list_extensions(&self) -> zbus::Result<HashMap<String, ExtensionDict>>;
    fn install_remote_extension(&self, uuid: &str) -> zbus::Result<String>;
    fn get_extension_info(&self, uuid: &str) -> zbus::Result<ExtensionDict>;
    fn enable_extension(&self, uuid: &str) -> zbus::Result<bool>;
    fn disable_extension(&self, uuid: &str) -> zbus::Result<bool>;
}

impl ExtensionCalls for ShellExtensionsProxyBlocking<'_> {
    fn list_extensions(&self) -> zbus::Result<HashMap<String, ExtensionDict>> {
        ShellExtensionsProxyBlocking::list_extensions(self)
    }

    fn install_remote_extension(&self, uuid: &str) -> zbus::Result<String> {
        ShellExtensionsProxyBlocking::install_remote_extension(self, uuid)
    }

    fn get_extension_info(&self, uuid: &str) -> zbus::Result<ExtensionDict> {
        ShellExtensionsProxyBlocking::get_extension_info(self, uuid)
    }

    fn enable_extension(&self, uuid: &str) -> zbus::Result<bool> {
        ShellExtensionsProxyBlocking::enable_extension(self, uuid)
    }

    fn disable_extension(&self, uuid: &str) -> zbus::Result<bool> {
        ShellExtensionsProxyBlocking::disable_extension(self, uuid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    AlreadyInstalled,
    Successful,
    /// The user dismissed the shell's install dialog.
    Cancelled,
    Other(String),
    /// Not connected to the shell, nothing was requested.
    Unavailable,
}

impl From<String> for InstallOutcome {
    fn from(reply: String) -> Self {
        match reply.as_str() {
            "successful" => InstallOutcome::Successful,
            "cancelled" => InstallOutcome::Cancelled,
            _ => InstallOutcome::Other(reply),
        }
    }
}

pub struct ExtensionManager<C = ShellExtensionsProxyBlocking<'static>> {
    calls: Option<C>,
}

impl ExtensionManager {
    pub fn connect(connection: &Connection) -> Self {
        let bound = shell_exports(connection, EXTENSIONS_PATH, EXTENSIONS_INTERFACE).and_then(
            |exported| {
                if exported {
                    Ok(Some(ShellExtensionsProxyBlocking::new(connection)?))
                } else {
                    Ok(None)
                }
            },
        );

        match bound {
            Ok(Some(proxy)) => ExtensionManager::connected(proxy),
            Ok(None) => {
                warn!("gnome shell does not export {}", EXTENSIONS_INTERFACE);
                ExtensionManager::disconnected()
            }
            Err(e) => {
                warn!("failed to get gnome shell extensions: {e}");
                ExtensionManager::disconnected()
            }
        }
    }
}

impl<C: ExtensionCalls> ExtensionManager<C> {
    pub fn connected(calls: C) -> Self {
        ExtensionManager { calls: Some(calls) }
    }

    pub fn disconnected() -> Self {
        ExtensionManager { calls: None }
    }

    pub fn is_connected(&self) -> bool {
        self.calls.is_some()
    }

    /// Uuids of all installed extensions, sorted.
    pub fn installed_extensions(&self) -> Result<Vec<String>> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(Vec::new()),
        };

        debug!("ListExtensions");
        let mut uuids: Vec<_> = calls.list_extensions()?.into_keys().collect();
        uuids.sort();

        Ok(uuids)
    }

    /// Asks the shell to download and install `uuid`. The shell shows a
    /// confirmation dialog, so this blocks until the user answered it.
    pub fn install_extension(&self, uuid: &str) -> Result<InstallOutcome> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(InstallOutcome::Unavailable),
        };

        debug!("InstallRemoteExtension({uuid})");
        let outcome = InstallOutcome::from(calls.install_remote_extension(uuid)?);

        match &outcome {
            InstallOutcome::Successful => info!("installed extension {uuid}"),
            InstallOutcome::Cancelled => warn!("installation of extension {uuid} was cancelled"),
            InstallOutcome::Other(reply) => {
                warn!("unexpected reply installing extension {uuid}: {reply}")
            }
            _ => (),
        }

        Ok(outcome)
    }

    pub fn ensure_installed(&self, uuid: &str) -> Result<InstallOutcome> {
        if !self.is_connected() {
            return Ok(InstallOutcome::Unavailable);
        }

        if self.installed_extensions()?.iter().any(|installed| installed == uuid) {
            info!("Extension {uuid} is already installed");
            Ok(InstallOutcome::AlreadyInstalled)
        } else {
            self.install_extension(uuid)
        }
    }

    pub fn extension_info(&self, uuid: &str) -> Result<Option<ExtensionInfo>> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(None),
        };

        debug!("GetExtensionInfo({uuid})");
        Ok(ExtensionInfo::from_dict(&calls.get_extension_info(uuid)?))
    }

    pub fn enable_extension(&self, uuid: &str) -> Result<()> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(()),
        };

        debug!("EnableExtension({uuid})");
        if calls.enable_extension(uuid)? {
            Ok(())
        } else {
            Err(Error::Shell("extension does not exist".to_owned()))
        }
    }

    pub fn disable_extension(&self, uuid: &str) -> Result<()> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(()),
        };

        debug!("DisableExtension({uuid})");
        if calls.disable_extension(uuid)? {
            Ok(())
        } else {
            Err(Error::Shell("extension does not exist".to_owned()))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::extension_info::tests::dict;
    use super::*;
    use std::cell::RefCell;
    use zbus::zvariant::Value;

    /// Extension registry double: knows a fixed set of uuids and answers
    /// installation requests with `install_reply`.
    pub(crate) struct FakeShell {
        pub(crate) installed: Vec<&'static str>,
        pub(crate) install_reply: &'static str,
        pub(crate) calls: RefCell<Vec<String>>,
    }

    impl FakeShell {
        pub(crate) fn new(installed: Vec<&'static str>, install_reply: &'static str) -> Self {
            FakeShell { installed, install_reply, calls: RefCell::new(Vec::new()) }
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl ExtensionCalls for FakeShell {
        fn list_extensions(&self) -> zbus::Result<HashMap<String, ExtensionDict>> {
            self.record("ListExtensions".into());

            Ok(self
                .installed
                .iter()
                .map(|uuid| (uuid.to_string(), dict(vec![("uuid", Value::from(*uuid))])))
                .collect())
        }

        fn install_remote_extension(&self, uuid: &str) -> zbus::Result<String> {
            self.record(format!("InstallRemoteExtension({uuid})"));
            Ok(self.install_reply.to_owned())
        }

        fn get_extension_info(&self, uuid: &str) -> zbus::Result<ExtensionDict> {
            self.record(format!("GetExtensionInfo({uuid})"));

            if self.installed.iter().any(|installed| *installed == uuid) {
                Ok(dict(vec![
                    ("uuid", Value::from(uuid.to_owned())),
                    ("name", Value::from("Window Calls")),
                    ("state", Value::F64(1.0)),
                ]))
            } else {
                Ok(ExtensionDict::new())
            }
        }

        fn enable_extension(&self, uuid: &str) -> zbus::Result<bool> {
            self.record(format!("EnableExtension({uuid})"));
            Ok(self.installed.iter().any(|installed| *installed == uuid))
        }

        fn disable_extension(&self, uuid: &str) -> zbus::Result<bool> {
            self.record(format!("DisableExtension({uuid})"));
            Ok(self.installed.iter().any(|installed| *installed == uuid))
        }
    }

    impl ExtensionCalls for &FakeShell {
        fn list_extensions(&self) -> zbus::Result<HashMap<String, ExtensionDict>> {
            (*self).list_extensions()
        }

        fn install_remote_extension(&self, uuid: &str) -> zbus::Result<String> {
            (*self).install_remote_extension(uuid)
        }

        fn get_extension_info(&self, uuid: &str) -> zbus::Result<ExtensionDict> {
            (*self).get_extension_info(uuid)
        }

        fn enable_extension(&self, uuid: &str) -> zbus::Result<bool> {
            (*self).enable_extension(uuid)
        }

        fn disable_extension(&self, uuid: &str) -> zbus::Result<bool> {
            (*self).disable_extension(uuid)
        }
    }

    const UUID: &str = "window-calls@domandoman.xyz";

    #[test]
    fn already_installed_is_not_reinstalled() {
        let shell = FakeShell::new(vec!["dash-to-dock@micxgx.gmail.com", UUID], "successful");
        let ext = ExtensionManager::connected(&shell);

        assert_eq!(ext.ensure_installed(UUID).unwrap(), InstallOutcome::AlreadyInstalled);
        assert_eq!(*shell.calls.borrow(), vec!["ListExtensions".to_owned()]);
    }

    #[test]
    fn missing_extension_is_requested() {
        let shell = FakeShell::new(vec![], "successful");
        let ext = ExtensionManager::connected(&shell);

        assert_eq!(ext.ensure_installed(UUID).unwrap(), InstallOutcome::Successful);
        assert_eq!(
            shell.calls.borrow().last().unwrap(),
            &format!("InstallRemoteExtension({UUID})")
        );
    }

    #[test]
    fn install_replies() {
        let cancelled = FakeShell::new(vec![], "cancelled");
        assert_eq!(
            ExtensionManager::connected(&cancelled).install_extension(UUID).unwrap(),
            InstallOutcome::Cancelled
        );

        let odd = FakeShell::new(vec![], "error");
        assert_eq!(
            ExtensionManager::connected(&odd).install_extension(UUID).unwrap(),
            InstallOutcome::Other("error".to_owned())
        );
    }

    #[test]
    fn installed_extensions_are_sorted() {
        let shell = FakeShell::new(vec![UUID, "appindicatorsupport@rgcjonas.gmail.com"], "");
        let ext = ExtensionManager::connected(&shell);

        assert_eq!(
            ext.installed_extensions().unwrap(),
            vec!["appindicatorsupport@rgcjonas.gmail.com", UUID]
        );
    }

    #[test]
    fn info_and_toggling() {
        let shell = FakeShell::new(vec![UUID], "");
        let ext = ExtensionManager::connected(&shell);

        assert!(ext.extension_info(UUID).unwrap().unwrap().is_enabled());
        assert_eq!(ext.extension_info("nope@example.com").unwrap(), None);

        ext.enable_extension(UUID).unwrap();
        ext.disable_extension(UUID).unwrap();
        assert!(matches!(ext.enable_extension("nope@example.com"), Err(Error::Shell(_))));
    }

    #[test]
    fn disconnected_requests_nothing() {
        let ext: ExtensionManager<FakeShell> = ExtensionManager::disconnected();

        assert!(ext.installed_extensions().unwrap().is_empty());
        assert_eq!(ext.install_extension(UUID).unwrap(), InstallOutcome::Unavailable);
        assert_eq!(ext.ensure_installed(UUID).unwrap(), InstallOutcome::Unavailable);
        assert_eq!(ext.extension_info(UUID).unwrap(), None);
        ext.enable_extension(UUID).unwrap();
        ext.disable_extension(UUID).unwrap();
    }
}

use thiserror::Error;
use tracing::debug;
use zbus::blocking::fdo::{DBusProxy, IntrospectableProxy};
use zbus::blocking::Connection;
use zbus::names::BusName;

use crate::dbus::GNOME_SHELL_DEST;

pub mod extensions;
pub mod window;
pub mod windows;

pub use window::{WindowCommand, WindowDetails, WindowId, WindowSummary};

#[derive(Debug, Error)]
pub enum Error {
    #[error("dbus error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("dbus error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    #[error("invalid bus name: {0}")]
    Names(#[from] zbus::names::Error),

    #[error("shell error: {0}")]
    Shell(String),

    #[error("failed to deserialize reply: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Checks that gnome shell is on the bus and that it exports `interface` at `path`.
///
/// Installing a shell extension does not change the bus name, so the presence
/// of `org.gnome.Shell` alone says nothing about the extension's object.
pub(crate) fn shell_exports(conn: &Connection, path: &str, interface: &str) -> Result<bool> {
    let bus = DBusProxy::new(conn)?;

    if !bus.name_has_owner(BusName::try_from(GNOME_SHELL_DEST)?)? {
        debug!("{} has no owner on this bus", GNOME_SHELL_DEST);
        return Ok(false);
    }

    let introspectable = IntrospectableProxy::builder(conn)
        .destination(GNOME_SHELL_DEST)?
        .path(path)?
        .build()?;

    let xml = introspectable.introspect()?;

    Ok(xml.contains(&format!("\"{interface}\"")))
}

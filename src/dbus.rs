use std::collections::HashMap;
use zbus::proxy;
use zbus::zvariant::OwnedValue;

pub const GNOME_SHELL_DEST: &str = "org.gnome.Shell";

pub const WINDOWS_PATH: &str = "/org/gnome/Shell/Extensions/Windows";
pub const WINDOWS_INTERFACE: &str = "org.gnome.Shell.Extensions.Windows";

/// Interface exported by the `window-calls` shell extension.
#[proxy(
    interface = "org.gnome.Shell.Extensions.Windows",
    default_service = "org.gnome.Shell",
    default_path = "/org/gnome/Shell/Extensions/Windows"
)]
pub trait Windows {
    fn list(&self) -> zbus::Result<String>;
    fn details(&self, winid: &str) -> zbus::Result<String>;
    fn get_title(&self, winid: &str) -> zbus::Result<String>;

    #[zbus(name = "Move")]
    fn move_to(&self, winid: &str, x: i32, y: i32) -> zbus::Result<()>;
    fn resize(&self, winid: &str, width: i32, height: i32) -> zbus::Result<()>;
    fn move_resize(&self, winid: &str, x: i32, y: i32, width: i32, height: i32) -> zbus::Result<()>;

    fn maximize(&self, winid: &str) -> zbus::Result<()>;
    fn minimize(&self, winid: &str) -> zbus::Result<()>;
    fn unmaximize(&self, winid: &str) -> zbus::Result<()>;
    fn unminimize(&self, winid: &str) -> zbus::Result<()>;
    fn activate(&self, winid: &str) -> zbus::Result<()>;
    fn close(&self, winid: &str) -> zbus::Result<()>;
}

/// The shell's own extension registry.
#[proxy(
    interface = "org.gnome.Shell.Extensions",
    default_service = "org.gnome.Shell",
    default_path = "/org/gnome/Shell"
)]
pub trait ShellExtensions {
    fn list_extensions(&self) -> zbus::Result<HashMap<String, HashMap<String, OwnedValue>>>;
    fn install_remote_extension(&self, uuid: &str) -> zbus::Result<String>;
    fn get_extension_info(&self, uuid: &str) -> zbus::Result<HashMap<String, OwnedValue>>;
    fn enable_extension(&self, uuid: &str) -> zbus::Result<bool>;
    fn disable_extension(&self, uuid: &str) -> zbus::Result<bool>;
}

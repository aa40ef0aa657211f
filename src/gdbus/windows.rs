use tracing::{debug, warn};
use zbus::blocking::Connection;

use super::window::{WindowCommand, WindowDetails, WindowId, WindowSummary};
use super::{shell_exports, Result};
use crate::dbus::{WindowsProxyBlocking, WINDOWS_INTERFACE, WINDOWS_PATH};
use crate::find_window::WindowFilter;

/// Raw method set of the window-calls extension.
///
/// Replies are passed through untouched; decoding and filtering happen in
/// [`WindowManager`].
pub trait WindowCalls {
    fn list(&self) -> zbus::Result<String>;
    fn details(&self, winid: &str) -> zbus::Result<String>;
    fn get_title(&self, winid: &str) -> zbus::Result<String>;
    fn command(&self, winid: &str, command: WindowCommand) -> zbus::Result<()>;
}

impl WindowCalls for WindowsProxyBlocking<'_> {
    fn list(&self) -> zbus::Result<String> {
        WindowsProxyBlocking::list(self)
    }

    fn details(&self, winid: &str) -> zbus::Result<String> {
        WindowsProxyBlocking::details(self, winid)
    }

    fn get_title(&self, winid: &str) -> zbus::Result<String> {
        WindowsProxyBlocking::get_title(self, winid)
    }

    fn command(&self, winid: &str, command: WindowCommand) -> zbus::Result<()> {
        use WindowCommand::*;

        match command {
            Move { x, y } => self.move_to(winid, x, y),
            Resize { width, height } => self.resize(winid, width, height),
            MoveResize { x, y, width, height } => self.move_resize(winid, x, y, width, height),
            Maximize => self.maximize(winid),
            Minimize => self.minimize(winid),
            Unmaximize => self.unmaximize(winid),
            Unminimize => self.unminimize(winid),
            Activate => self.activate(winid),
            Close => self.close(winid),
        }
    }
}

/// Window operations on top of the window-calls extension.
///
/// The manager binds once. If binding fails it stays disconnected for good and
/// every operation returns its neutral value without touching the bus.
pub struct WindowManager<C = WindowsProxyBlocking<'static>> {
    calls: Option<C>,
}

impl WindowManager {
    pub fn connect(connection: &Connection) -> Self {
        match bind(connection) {
            Ok(Some(proxy)) => WindowManager::connected(proxy),
            Ok(None) => {
                warn!(
                    "{} is not exported by gnome shell, is the window-calls extension enabled?",
                    WINDOWS_INTERFACE
                );
                WindowManager::disconnected()
            }
            Err(e) => {
                warn!("failed to bind to {}: {e}", WINDOWS_INTERFACE);
                WindowManager::disconnected()
            }
        }
    }
}

fn bind(connection: &Connection) -> Result<Option<WindowsProxyBlocking<'static>>> {
    if shell_exports(connection, WINDOWS_PATH, WINDOWS_INTERFACE)? {
        Ok(Some(WindowsProxyBlocking::new(connection)?))
    } else {
        Ok(None)
    }
}

impl<C: WindowCalls> WindowManager<C> {
    pub fn connected(calls: C) -> Self {
        WindowManager { calls: Some(calls) }
    }

    pub fn disconnected() -> Self {
        WindowManager { calls: None }
    }

    pub fn is_connected(&self) -> bool {
        self.calls.is_some()
    }

    pub fn list_windows(&self) -> Result<Vec<WindowSummary>> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(Vec::new()),
        };

        debug!("List");
        let reply = calls.list().map_err(|e| {
            warn!("failed to list windows: {e}");
            e
        })?;

        serde_json::from_str(&reply).map_err(|e| {
            warn!("failed to decode window list: {e}");
            e.into()
        })
    }

    /// `Ok(None)` only when disconnected.
    pub fn window_details(&self, id: WindowId) -> Result<Option<WindowDetails>> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(None),
        };

        debug!("Details({id})");
        let reply = calls.details(&id.to_wire()).map_err(|e| {
            warn!("failed to get details of window {id}: {e}");
            e
        })?;

        let details = serde_json::from_str(&reply).map_err(|e| {
            warn!("failed to decode details of window {id}: {e}");
            e
        })?;

        Ok(Some(details))
    }

    pub fn title(&self, id: WindowId) -> Result<String> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(String::new()),
        };

        debug!("GetTitle({id})");
        calls.get_title(&id.to_wire()).map_err(|e| {
            warn!("failed to get title of window {id}: {e}");
            e.into()
        })
    }

    pub fn all_wm_classes(&self) -> Result<Vec<Option<String>>> {
        Ok(self.list_windows()?.into_iter().map(|w| w.wm_class).collect())
    }

    pub fn all_titles(&self) -> Result<Vec<String>> {
        self.list_windows()?.into_iter().map(|w| self.title(w.id)).collect()
    }

    /// Ids of all windows whose class and title both match, in listing order.
    ///
    /// Both patterns are compiled before anything is sent, so a malformed
    /// pattern fails the whole query without a single remote call.
    pub fn find_windows(
        &self,
        wm_class_pattern: &str,
        title_pattern: &str,
    ) -> Result<Vec<WindowId>> {
        if !self.is_connected() {
            return Ok(Vec::new());
        }

        let filter = WindowFilter::new(wm_class_pattern, title_pattern)?;
        self.find_windows_with(&filter)
    }

    pub fn find_windows_with(&self, filter: &WindowFilter) -> Result<Vec<WindowId>> {
        if !self.is_connected() {
            return Ok(Vec::new());
        }

        debug!(
            "looking up windows with class /{}/ and title /{}/",
            filter.wm_class_pattern(),
            filter.title_pattern()
        );

        let mut matching = Vec::new();

        for window in self.list_windows()? {
            let wm_class = match &window.wm_class {
                Some(wm_class) => wm_class,
                None => continue,
            };

            // the title is fetched now, it may be newer than the class from the listing
            let title = match self.title(window.id) {
                Ok(title) => title,
                Err(_) => continue,
            };

            if filter.is_match(wm_class, &title) {
                matching.push(window.id);
            }
        }

        Ok(matching)
    }

    pub fn move_window_to(&self, id: WindowId, x: i32, y: i32) -> Result<()> {
        self.send(id, WindowCommand::Move { x, y })
    }

    pub fn resize_window_to(&self, id: WindowId, width: i32, height: i32) -> Result<()> {
        self.send(id, WindowCommand::Resize { width, height })
    }

    pub fn move_resize_window(
        &self,
        id: WindowId,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        self.send(id, WindowCommand::MoveResize { x, y, width, height })
    }

    pub fn maximize_window(&self, id: WindowId) -> Result<()> {
        self.send(id, WindowCommand::Maximize)
    }

    pub fn minimize_window(&self, id: WindowId) -> Result<()> {
        self.send(id, WindowCommand::Minimize)
    }

    pub fn unmaximize_window(&self, id: WindowId) -> Result<()> {
        self.send(id, WindowCommand::Unmaximize)
    }

    pub fn unminimize_window(&self, id: WindowId) -> Result<()> {
        self.send(id, WindowCommand::Unminimize)
    }

    pub fn activate_window(&self, id: WindowId) -> Result<()> {
        self.send(id, WindowCommand::Activate)
    }

    pub fn close_window(&self, id: WindowId) -> Result<()> {
        self.send(id, WindowCommand::Close)
    }

    /// Issues exactly one remote call. The id is not checked against the
    /// current window list; a stale id is rejected by the extension.
    pub fn send(&self, id: WindowId, command: WindowCommand) -> Result<()> {
        let calls = match &self.calls {
            Some(calls) => calls,
            None => return Ok(()),
        };

        debug!("{}({id}) {:?}", command.method(), command);
        calls.command(&id.to_wire(), command).map_err(|e| {
            warn!("{} on window {id} failed: {e}", command.method());
            e.into()
        })
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of an open window as handed out by the window-calls extension.
///
/// Handles are only unique among the currently open windows. After a window
/// closes its handle may be reused, so a handle seen in one listing may refer
/// to another window (or none) by the next call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl WindowId {
    /// The extension expects window ids as strings on the wire.
    pub fn to_wire(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for WindowId {
    fn from(id: u64) -> Self {
        WindowId(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowGeom {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// One entry of the `List` reply. Carries no title.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WindowSummary {
    pub id: WindowId,

    #[serde(default)]
    pub wm_class: Option<String>,

    #[serde(flatten)]
    pub geom: Option<WindowGeom>,
}

/// The `Details` reply for a single window.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct WindowDetails {
    pub id: WindowId,

    #[serde(default)]
    pub wm_class: Option<String>,

    #[serde(default)]
    pub title: String,

    #[serde(flatten)]
    pub geom: Option<WindowGeom>,
}

/// A one-shot control request for a single window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowCommand {
    Move { x: i32, y: i32 },
    Resize { width: i32, height: i32 },
    MoveResize { x: i32, y: i32, width: i32, height: i32 },
    Maximize,
    Minimize,
    Unmaximize,
    Unminimize,
    Activate,
    Close,
}

impl WindowCommand {
    /// Name of the remote method this command maps to.
    pub fn method(&self) -> &'static str {
        use WindowCommand::*;

        match self {
            Move { .. } => "Move",
            Resize { .. } => "Resize",
            MoveResize { .. } => "MoveResize",
            Maximize => "Maximize",
            Minimize => "Minimize",
            Unmaximize => "Unmaximize",
            Unminimize => "Unminimize",
            Activate => "Activate",
            Close => "Close",
        }
    }
}

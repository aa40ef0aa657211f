pub mod settings;
pub mod status;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::find_window::MATCH_ANY;
use crate::gdbus::windows::{WindowCalls, WindowManager};
use crate::gdbus::{Error, Result, WindowCommand, WindowDetails, WindowId};
pub use settings::{ActionSettings, Position, Size};
pub use status::HostFacade;

const ACTION_ID_PREFIX: &str = "com_core447_GnomeWindowCalls";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Move,
    Resize,
    MoveResize,
    Status,
}

/// Values the configuration rows of an action show, with every default filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionConfig {
    pub wm_class: String,
    pub title: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub applied: Vec<WindowId>,
    pub failed: Vec<(WindowId, Error)>,
}

#[derive(Debug)]
pub enum KeyDown {
    /// Required settings were missing, nothing was sent.
    Skipped { missing: Vec<&'static str> },
    Dispatched(DispatchReport),
    Status(Vec<WindowDetails>),
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] =
        [ActionKind::Move, ActionKind::Status, ActionKind::Resize, ActionKind::MoveResize];

    /// Identifier the host registers the action under.
    pub fn id(self) -> String {
        let suffix = match self {
            ActionKind::Move => "Move",
            ActionKind::Resize => "Resize",
            ActionKind::MoveResize => "MoveResize",
            ActionKind::Status => "Status",
        };

        format!("{ACTION_ID_PREFIX}::{suffix}")
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Move => "Move",
            ActionKind::Resize => "Resize",
            ActionKind::MoveResize => "Move & Resize",
            ActionKind::Status => "Status",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            ActionKind::Move => "move.png",
            ActionKind::Resize => "resize.png",
            ActionKind::MoveResize => "move-resize.png",
            ActionKind::Status => "info.png",
        }
    }

    fn has_position(self) -> bool {
        matches!(self, ActionKind::Move | ActionKind::MoveResize)
    }

    fn has_size(self) -> bool {
        matches!(self, ActionKind::Resize | ActionKind::MoveResize)
    }

    /// Media the button shows once the action is placed.
    pub fn on_ready(self, plugin_dir: &Path) -> PathBuf {
        plugin_dir.join("assets").join(self.icon())
    }

    pub fn load_config(self, settings: &ActionSettings) -> ActionConfig {
        ActionConfig {
            wm_class: settings.wm_class.clone().unwrap_or_else(|| MATCH_ANY.to_owned()),
            title: settings.title.clone().unwrap_or_else(|| MATCH_ANY.to_owned()),
            x: settings.x().unwrap_or(0),
            y: settings.y().unwrap_or(0),
            width: settings.width().unwrap_or(0),
            height: settings.height().unwrap_or(0),
        }
    }

    /// Writes back only the fields this action has rows for.
    pub fn save_config(self, settings: &mut ActionSettings, config: &ActionConfig) {
        settings.wm_class = Some(config.wm_class.clone());
        settings.title = Some(config.title.clone());

        if self.has_position() {
            settings.position = Some(Position { x: Some(config.x), y: Some(config.y) });
        }

        if self.has_size() {
            settings.size = Some(Size { width: Some(config.width), height: Some(config.height) });
        }
    }

    fn command(
        self,
        settings: &ActionSettings,
    ) -> std::result::Result<Option<WindowCommand>, Vec<&'static str>> {
        let fields = [
            ("x", settings.x(), self.has_position()),
            ("y", settings.y(), self.has_position()),
            ("width", settings.width(), self.has_size()),
            ("height", settings.height(), self.has_size()),
        ];

        let missing: Vec<_> = fields
            .iter()
            .filter(|(_, value, required)| *required && value.is_none())
            .map(|(name, _, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(missing);
        }

        let [x, y, width, height] = fields.map(|(_, value, _)| value.unwrap_or_default());

        Ok(match self {
            ActionKind::Move => Some(WindowCommand::Move { x, y }),
            ActionKind::Resize => Some(WindowCommand::Resize { width, height }),
            ActionKind::MoveResize => Some(WindowCommand::MoveResize { x, y, width, height }),
            ActionKind::Status => None,
        })
    }

    /// Runs the action for a button press.
    ///
    /// Commands go to the matching windows one after another. A window that
    /// rejects its command does not stop the others; there is no rollback.
    pub fn on_key_down<C: WindowCalls>(
        self,
        windows: &WindowManager<C>,
        host: &mut dyn HostFacade,
        settings: &ActionSettings,
    ) -> Result<KeyDown> {
        let command = match self.command(settings) {
            Ok(command) => command,
            Err(missing) => {
                info!("{} is missing {:?}, ignoring key press", self.name(), missing);
                return Ok(KeyDown::Skipped { missing });
            }
        };

        let command = match command {
            Some(command) => command,
            None => {
                status::reveal_configurator(host, self);
                let details = status::matching_window_details(
                    windows,
                    settings.wm_class_pattern(),
                    settings.title_pattern(),
                )
                .map_err(|e| {
                    warn!("{} could not look up windows: {}", self.name(), e);
                    e
                })?;

                return Ok(KeyDown::Status(details));
            }
        };

        let mut report = DispatchReport::default();

        let targets = windows
            .find_windows(settings.wm_class_pattern(), settings.title_pattern())
            .map_err(|e| {
                warn!("{} could not look up windows: {}", self.name(), e);
                e
            })?;

        for id in targets {
            match windows.send(id, command) {
                Ok(()) => report.applied.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }

        if report.failed.is_empty() {
            debug!("{} applied to {} window(s)", self.name(), report.applied.len());
        } else {
            warn!(
                "{} applied to {} window(s), failed on {}",
                self.name(),
                report.applied.len(),
                report.failed.len()
            );
        }

        Ok(KeyDown::Dispatched(report))
    }
}

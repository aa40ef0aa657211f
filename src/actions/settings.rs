use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

use super::ActionKind;
use crate::find_window::MATCH_ANY;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Size {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

/// What the host stores for one button. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wm_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl ActionSettings {
    pub fn wm_class_pattern(&self) -> &str {
        self.wm_class.as_deref().unwrap_or(MATCH_ANY)
    }

    pub fn title_pattern(&self) -> &str {
        self.title.as_deref().unwrap_or(MATCH_ANY)
    }

    pub fn x(&self) -> Option<i32> {
        self.position.and_then(|p| p.x)
    }

    pub fn y(&self) -> Option<i32> {
        self.position.and_then(|p| p.y)
    }

    pub fn width(&self) -> Option<i32> {
        self.size.and_then(|s| s.width)
    }

    pub fn height(&self) -> Option<i32> {
        self.size.and_then(|s| s.height)
    }
}

/// A named button: which action it runs and that action's settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Binding {
    pub action: ActionKind,

    #[serde(flatten)]
    pub settings: ActionSettings,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value access to the per-button settings owned by the host.
pub trait SettingsStore {
    fn binding(&self, name: &str) -> Option<&Binding>;
    fn set_binding(&mut self, name: &str, binding: Binding) -> Result<(), SettingsError>;
    fn remove_binding(&mut self, name: &str) -> Result<Option<Binding>, SettingsError>;
    fn names(&self) -> Vec<&str>;
}

/// Bindings kept in a single json file, written through on every change.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    bindings: BTreeMap<String, Binding>,
}

impl JsonSettingsStore {
    /// A file that does not exist yet is an empty store.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, SettingsError> {
        let path = path.into();

        let bindings = match File::open(&path) {
            Ok(f) => serde_json::from_reader(BufReader::new(f))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{path:?} does not exist yet, starting without bindings");
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(JsonSettingsStore { path, bindings })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &self.bindings)?;
        writer.flush()?;

        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    fn set_binding(&mut self, name: &str, binding: Binding) -> Result<(), SettingsError> {
        self.bindings.insert(name.to_owned(), binding);
        self.save()
    }

    fn remove_binding(&mut self, name: &str) -> Result<Option<Binding>, SettingsError> {
        let removed = self.bindings.remove(name);

        if removed.is_some() {
            self.save()?;
        }

        Ok(removed)
    }

    fn names(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }
}

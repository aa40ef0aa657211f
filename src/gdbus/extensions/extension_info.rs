use std::collections::HashMap;
use zbus::zvariant::{OwnedValue, Value};

/// Property dictionary the shell hands out per extension (`a{sv}`).
pub type ExtensionDict = HashMap<String, OwnedValue>;

fn f64_try_into_i32(v: f64) -> Result<i32, ()> {
    if v.trunc() == v && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
        Ok(v as i32)
    } else {
        Err(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExtensionState {
    Enabled,
    Disabled,
    Error,
    OutOfDate,
    Downloading,
    Initialized,
    Disabling,
    Enabling,
    Uninstalled,
}

impl TryFrom<f64> for ExtensionState {
    type Error = f64;

    fn try_from(v: f64) -> Result<Self, f64> {
        use ExtensionState::*;

        match f64_try_into_i32(v) {
            Ok(1) => Ok(Enabled),
            Ok(2) => Ok(Disabled),
            Ok(3) => Ok(Error),
            Ok(4) => Ok(OutOfDate),
            Ok(5) => Ok(Downloading),
            Ok(6) => Ok(Initialized),
            Ok(7) => Ok(Disabling),
            Ok(8) => Ok(Enabling),
            Ok(99) => Ok(Uninstalled),
            _ => Err(v),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExtensionType {
    System,
    PerUser,
}

impl TryFrom<f64> for ExtensionType {
    type Error = f64;

    fn try_from(v: f64) -> Result<Self, f64> {
        match f64_try_into_i32(v) {
            Ok(1) => Ok(ExtensionType::System),
            Ok(2) => Ok(ExtensionType::PerUser),
            _ => Err(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionInfo {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub state: Option<ExtensionState>,
    pub exttype: Option<ExtensionType>,
    pub error: String,
    pub has_prefs: bool,
}

fn string(dict: &ExtensionDict, key: &str) -> Option<String> {
    match dict.get(key).map(|v| &**v) {
        Some(Value::Str(s)) => Some(s.as_str().to_owned()),
        _ => None,
    }
}

fn number(dict: &ExtensionDict, key: &str) -> Option<f64> {
    match dict.get(key).map(|v| &**v) {
        Some(Value::F64(v)) => Some(*v),
        Some(Value::U32(v)) => Some(f64::from(*v)),
        Some(Value::I32(v)) => Some(f64::from(*v)),
        _ => None,
    }
}

fn flag(dict: &ExtensionDict, key: &str) -> bool {
    matches!(dict.get(key).map(|v| &**v), Some(Value::Bool(true)))
}

impl ExtensionInfo {
    /// The shell answers with an empty dictionary for unknown uuids, which
    /// yields `None` here.
    pub fn from_dict(dict: &ExtensionDict) -> Option<Self> {
        let uuid = string(dict, "uuid")?;

        Some(ExtensionInfo {
            uuid,
            name: string(dict, "name").unwrap_or_default(),
            description: string(dict, "description").unwrap_or_default(),
            url: string(dict, "url").unwrap_or_default(),
            state: number(dict, "state").and_then(|v| ExtensionState::try_from(v).ok()),
            exttype: number(dict, "type").and_then(|v| ExtensionType::try_from(v).ok()),
            error: string(dict, "error").unwrap_or_default(),
            has_prefs: flag(dict, "hasPrefs"),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.state == Some(ExtensionState::Enabled)
    }
}

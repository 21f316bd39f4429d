use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

const SETTINGS_VERSION: u32 = 1;

/// Presentation settings for the debug command panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "ts-export", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts-export", ts(export))]
#[serde(default)]
pub struct PanelSettings {
    pub version: u32,
    /// Foldout header text.
    pub title: String,
    /// Whether the foldout starts open.
    pub expanded: bool,
    /// Label on each command's invoke button.
    pub invoke_label: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            title: "Debug Commands".to_string(),
            expanded: true,
            invoke_label: "Invoke".to_string(),
        }
    }
}

impl PanelSettings {
    /// Parse settings JSON. Missing fields take their defaults; settings written by
    /// a newer version are refused.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let settings: PanelSettings =
            serde_json::from_str(json).map_err(|e| RegistryError::InvalidSettings {
                message: e.to_string(),
            })?;
        if settings.version > SETTINGS_VERSION {
            return Err(RegistryError::InvalidSettings {
                message: format!(
                    "settings version {} is newer than supported version {SETTINGS_VERSION}",
                    settings.version
                ),
            });
        }
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(self).map_err(|e| RegistryError::InvalidSettings {
            message: e.to_string(),
        })
    }
}

//! Server settings.
//!
//! Two settings drive the server, named as in the qooxdoo editor package:
//!
//! - `autocomplete_api_paths`: directories holding `apiindex.json` and the
//!   per-class `<ClassName>.json` documents, searched in order;
//! - `autocomplete_debug`: emit per-lookup and per-candidate diagnostics.
//!
//! Settings are assembled from layers, later layers overriding earlier
//! ones: a TOML config file, command-line flags, the client's
//! `initializationOptions`, and `workspace/didChangeConfiguration`.  Each
//! layer is a [`SettingsPatch`] in which only the keys it mentions are set.
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigError;

/// Directory under the user config dir holding [`CONFIG_FILE_NAME`].
pub const CONFIG_DIR_NAME: &str = "qxcomplete";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Section name under which clients may nest the settings in JSON
/// payloads (`{ "qxcomplete": { ... } }`).
pub const SETTINGS_SECTION: &str = "qxcomplete";

/// Effective settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub autocomplete_api_paths: Vec<PathBuf>,
    pub autocomplete_debug: bool,
}

/// A partial set of settings from one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub autocomplete_api_paths: Option<Vec<PathBuf>>,
    #[serde(default)]
    pub autocomplete_debug: Option<bool>,
}

impl Settings {
    /// Overlay the keys present in `patch`.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(paths) = patch.autocomplete_api_paths {
            self.autocomplete_api_paths = paths;
        }
        if let Some(debug) = patch.autocomplete_debug {
            self.autocomplete_debug = debug;
        }
    }

    /// API paths with relative entries resolved against `workspace_root`.
    ///
    /// Without a workspace root, relative paths are returned unchanged and
    /// resolve against the server's working directory.
    pub fn resolved_api_paths(&self, workspace_root: Option<&Path>) -> Vec<PathBuf> {
        self.autocomplete_api_paths
            .iter()
            .map(|path| match workspace_root {
                Some(root) if path.is_relative() => root.join(path),
                _ => path.clone(),
            })
            .collect()
    }
}

impl SettingsPatch {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Read settings from a JSON payload sent by the client.
    ///
    /// The keys may sit at the top level or inside a
    /// [`SETTINGS_SECTION`] object.  `null` is an empty patch.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        let value = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map.get(SETTINGS_SECTION).unwrap_or(value),
            _ => value,
        };
        Ok(serde_json::from_value(value.clone())?)
    }

    pub fn is_empty(&self) -> bool {
        self.autocomplete_api_paths.is_none() && self.autocomplete_debug.is_none()
    }
}

/// `<user config dir>/qxcomplete/config.toml`, when a home directory can
/// be determined.
pub fn default_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the config-file layer.
///
/// An explicitly given file must exist and parse.  The default file is
/// optional: when it is absent the layer is empty.
pub fn load_config_file(explicit: Option<&Path>) -> Result<SettingsPatch, ConfigError> {
    if let Some(path) = explicit {
        return SettingsPatch::from_file(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => SettingsPatch::from_file(&path),
        _ => Ok(SettingsPatch::default()),
    }
}

use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::core::{
    errors::SpendError,
    utils::{ensure_dir, PathResolver},
};
use crate::domain::UserId;
use crate::storage::json_backend::{save_atomic, DEFAULT_RETENTION};

/// Keys accepted by [`Config::set`].
pub const CONFIG_KEYS: [&str; 6] = [
    "user",
    "currency",
    "locale",
    "color",
    "data_root",
    "backup_retention",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub currency: String,
    pub locale: String,
    pub ui_color_enabled: bool,
    /// Overrides `<app_dir>/data` when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_root: Option<PathBuf>,
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: None,
            currency: "USD".into(),
            locale: "en-US".into(),
            ui_color_enabled: true,
            data_root: None,
            backup_retention: DEFAULT_RETENTION,
        }
    }
}

impl Config {
    /// Active user, if one has been selected.
    pub fn user(&self) -> Result<Option<UserId>, SpendError> {
        self.user_id.as_deref().map(UserId::new).transpose()
    }

    pub fn data_dir(&self, base: &Path) -> PathBuf {
        self.data_root
            .clone()
            .unwrap_or_else(|| PathResolver::data_dir_in(base))
    }

    /// Updates one setting from its textual form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), SpendError> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "user" | "user_id" => {
                self.user_id = Some(UserId::new(value)?.as_str().to_string());
            }
            "currency" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(SpendError::ConfigError(format!(
                        "currency `{value}` must be a three-letter code"
                    )));
                }
                self.currency = value.to_ascii_uppercase();
            }
            "locale" => {
                if value.is_empty() {
                    return Err(SpendError::ConfigError("locale must not be empty".into()));
                }
                self.locale = value.to_string();
            }
            "color" | "ui_color_enabled" => {
                self.ui_color_enabled = parse_toggle(value)?;
            }
            "data_root" => {
                self.data_root = match value {
                    "" | "default" => None,
                    path => Some(PathBuf::from(path)),
                };
            }
            "backup_retention" => {
                let retention: usize = value.parse().map_err(|_| {
                    SpendError::ConfigError(format!("`{value}` is not a whole number"))
                })?;
                if retention == 0 {
                    return Err(SpendError::ConfigError(
                        "backup retention must keep at least one backup".into(),
                    ));
                }
                self.backup_retention = retention;
            }
            other => {
                return Err(SpendError::ConfigError(format!(
                    "unknown setting `{other}` (expected one of: {})",
                    CONFIG_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Settings as displayable key/value pairs.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("user", self.user_id.clone().unwrap_or_else(|| "(unset)".into())),
            ("currency", self.currency.clone()),
            ("locale", self.locale.clone()),
            ("color", if self.ui_color_enabled { "on" } else { "off" }.into()),
            (
                "data_root",
                self.data_root
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(default)".into()),
            ),
            ("backup_retention", self.backup_retention.to_string()),
        ]
    }
}

fn parse_toggle(value: &str) -> Result<bool, SpendError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(SpendError::ConfigError(format!(
            "`{other}` is not a toggle (use on/off)"
        ))),
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, SpendError> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, SpendError> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<Config, SpendError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            SpendError::ConfigError(format!("{} is unreadable: {err}", self.path.display()))
        })
    }

    pub fn save(&self, config: &Config) -> Result<(), SpendError> {
        let json = serde_json::to_string_pretty(config)?;
        save_atomic(&self.path, &json)?;
        tracing::debug!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

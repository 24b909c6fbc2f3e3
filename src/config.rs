//! Host configuration file and the Prowl platform block inside it.
//!
//! The host owns a JSON file with a top-level `platforms` array. Only the entry
//! whose `platform` field matches ours is interpreted; every other entry is kept
//! as raw JSON and ignored.

use crate::error::{PluginError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fallback notification text. The `%` is replaced by the resolved subject.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "% has been triggered.";

/// Whole configuration file as written by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub platforms: Vec<serde_json::Value>,
}

/// The `ProwlNotification` platform block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub apikey: String,
    /// Message template with a single `%` placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaultmsg: Option<String>,
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
}

/// One configured switch.
///
/// `priority` is documented as -2..=2 by Prowl but is passed through unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SwitchConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: None,
            subject: None,
            message: None,
        }
    }

    /// Priority stored on the accessory context; 0 when not configured.
    pub fn effective_priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }
}

impl PlatformConfig {
    /// Template used when a switch has no explicit message.
    pub fn message_template(&self) -> &str {
        self.defaultmsg.as_deref().unwrap_or(DEFAULT_MESSAGE_TEMPLATE)
    }

    /// Switch entry by name. Later duplicates shadow earlier ones.
    pub fn switch(&self, name: &str) -> Option<&SwitchConfig> {
        self.switches.iter().rev().find(|s| s.name == name)
    }
}

impl HostConfig {
    /// Parse a configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Platform block with the given identifier.
    ///
    /// When several blocks match, the last one wins. Returns `Ok(None)` when there
    /// is no matching block and an error when the matching block is malformed.
    pub fn platform(&self, identifier: &str) -> Result<Option<PlatformConfig>> {
        match self.block(identifier) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn block(&self, identifier: &str) -> Option<&serde_json::Value> {
        self.platforms.iter().rev().find(|p| {
            p.get("platform").and_then(serde_json::Value::as_str) == Some(identifier)
        })
    }

    /// Like [`HostConfig::platform`] but a missing block is an error.
    pub fn require_platform(&self, identifier: &str) -> Result<PlatformConfig> {
        self.platform(identifier)?
            .ok_or_else(|| PluginError::PlatformNotFound(identifier.to_string()))
    }

    /// Platform block for a send. Unlike startup, the block must carry a
    /// `switches` key; an absent list is an error rather than an empty one.
    pub fn require_switch_list(&self, identifier: &str) -> Result<PlatformConfig> {
        let platform = self.require_platform(identifier)?;
        let listed = self
            .block(identifier)
            .is_some_and(|block| block.get("switches").is_some());
        if !listed {
            return Err(PluginError::MissingSwitchList(identifier.to_string()));
        }
        Ok(platform)
    }
}

/// Read and parse the host configuration file.
///
/// No caching: every call hits the filesystem.
pub fn load_host_config(path: &Path) -> Result<HostConfig> {
    let content = fs::read_to_string(path).map_err(|source| PluginError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    HostConfig::from_json(&content)
}

/// Default location of the host configuration: `~/.homebridge/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".homebridge")
        .join("config.json")
}

/// Default accessory cache next to the configuration file.
pub fn default_cache_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
        .join("accessories")
        .join("cachedAccessories")
}

//! File-backed host used by the standalone runner.
//!
//! Keeps the registered accessory catalog in memory and mirrors it to an
//! accessory cache file on every change, so the next start can hand the cached
//! accessories back to the platform.
//!
//! The cache file is shared with other plugins. Entries that do not belong to a
//! restored platform are kept as raw JSON and written back untouched, and a
//! file that could not be read is never overwritten.

use super::AccessoryHost;
use crate::accessory::{CachedAccessory, PlatformAccessory};
use crate::error::{PluginError, Result};
use log::{error, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Contents of the accessory cache file, one raw entry per accessory.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessoryCache {
    pub entries: Vec<Value>,
}

impl AccessoryCache {
    /// Load from file. A missing cache is an empty cache (first run); read and
    /// parse failures are errors.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read(path) {
            Ok(bytes) => {
                let cache = serde_json::from_slice::<AccessoryCache>(&bytes)?;
                info!(
                    "Loaded {} cached accessories from {:?}",
                    cache.entries.len(),
                    path
                );
                Ok(cache)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No accessory cache found (first run)");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Value of the `uuid` key of a cache entry, if it has one.
fn entry_uuid(entry: &Value) -> Option<&str> {
    entry.get("uuid").and_then(Value::as_str)
}

/// Registered accessory plus the plugin/platform it was registered under.
struct Registration {
    plugin: String,
    platform: String,
    accessory: Arc<PlatformAccessory>,
}

pub struct FileHost {
    config_path: PathBuf,
    cache_path: PathBuf,
    /// Cache entries not (yet) claimed by a restored platform.
    foreign: RwLock<Vec<Value>>,
    catalog: RwLock<Vec<Registration>>,
    /// False when the existing cache file could not be read.
    writable: AtomicBool,
}

impl FileHost {
    /// Create the host and read the existing accessory cache.
    pub fn new(config_path: PathBuf, cache_path: PathBuf) -> Self {
        let (entries, writable) = match AccessoryCache::load(&cache_path) {
            Ok(cache) => (cache.entries, true),
            Err(e) => {
                error!(
                    "Failed to load accessory cache {:?}: {}; it will not be overwritten",
                    cache_path, e
                );
                (Vec::new(), false)
            }
        };

        Self {
            config_path,
            cache_path,
            foreign: RwLock::new(entries),
            catalog: RwLock::new(Vec::new()),
            writable: AtomicBool::new(writable),
        }
    }

    /// Rebuild the cached accessories of one platform and take them into the
    /// catalog. The caller hands them to the platform's `configure_accessory`.
    pub fn restore_cached_accessories(
        &self,
        plugin: &str,
        platform: &str,
    ) -> Vec<Arc<PlatformAccessory>> {
        let mut foreign = self.foreign.write();
        let mut catalog = self.catalog.write();
        let mut restored = Vec::new();

        foreign.retain(|entry| {
            match serde_json::from_value::<CachedAccessory>(entry.clone()) {
                Ok(cached) if cached.plugin == plugin && cached.platform == platform => {
                    let accessory = Arc::new(PlatformAccessory::from_cached(cached));
                    catalog.push(Registration {
                        plugin: plugin.to_string(),
                        platform: platform.to_string(),
                        accessory: accessory.clone(),
                    });
                    restored.push(accessory);
                    false
                }
                _ => true,
            }
        });

        restored
    }

    pub fn accessories(&self) -> Vec<Arc<PlatformAccessory>> {
        self.catalog
            .read()
            .iter()
            .map(|r| r.accessory.clone())
            .collect()
    }

    /// Write the untouched foreign entries followed by the current catalog.
    pub fn save(&self) -> Result<()> {
        if !self.writable.load(Ordering::SeqCst) {
            return Err(PluginError::CacheUnreadable(self.cache_path.clone()));
        }

        let foreign = self.foreign.read();
        let catalog = self.catalog.read();
        let mut entries = foreign.clone();
        for registration in catalog.iter() {
            let cached = registration
                .accessory
                .to_cached(&registration.plugin, &registration.platform);
            entries.push(serde_json::to_value(cached)?);
        }

        let cache = AccessoryCache { entries };
        cache.save(&self.cache_path)?;
        info!(
            "Saved {} accessories ({} from other platforms) to {:?}",
            cache.entries.len(),
            foreign.len(),
            self.cache_path
        );
        Ok(())
    }

    fn save_or_log(&self) {
        if let Err(e) = self.save() {
            error!("Failed to save accessory cache: {}", e);
        }
    }

    /// Drop entries for the given accessories from the raw list and the catalog.
    fn forget(&self, accessories: &[Arc<PlatformAccessory>]) {
        let uuids: Vec<String> = accessories.iter().map(|a| a.uuid().to_string()).collect();
        self.foreign
            .write()
            .retain(|entry| !entry_uuid(entry).is_some_and(|u| uuids.iter().any(|id| id == u)));
        self.catalog
            .write()
            .retain(|r| !accessories.iter().any(|a| a.uuid() == r.accessory.uuid()));
    }
}

impl AccessoryHost for FileHost {
    fn register_platform_accessories(
        &self,
        plugin: &str,
        platform: &str,
        accessories: &[Arc<PlatformAccessory>],
    ) {
        self.forget(accessories);
        {
            let mut catalog = self.catalog.write();
            for accessory in accessories {
                catalog.push(Registration {
                    plugin: plugin.to_string(),
                    platform: platform.to_string(),
                    accessory: accessory.clone(),
                });
            }
        }
        self.save_or_log();
    }

    fn unregister_platform_accessories(
        &self,
        _plugin: &str,
        _platform: &str,
        accessories: &[Arc<PlatformAccessory>],
    ) {
        self.forget(accessories);
        self.save_or_log();
    }

    fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }
}

//! Host framework capability consumed by the platform.
//!
//! The platform never reaches for global host state; whatever owns the
//! accessory catalog is handed in as an [`AccessoryHost`].

mod file_host;

pub use file_host::{AccessoryCache, FileHost};

use crate::accessory::PlatformAccessory;
use std::path::PathBuf;
use std::sync::Arc;

/// Operations the platform needs from its host.
pub trait AccessoryHost: Send + Sync + 'static {
    /// Publish newly created accessories.
    fn register_platform_accessories(
        &self,
        plugin: &str,
        platform: &str,
        accessories: &[Arc<PlatformAccessory>],
    );

    /// Withdraw accessories that are no longer configured.
    fn unregister_platform_accessories(
        &self,
        plugin: &str,
        platform: &str,
        accessories: &[Arc<PlatformAccessory>],
    );

    /// Location of the persisted host configuration file.
    fn config_path(&self) -> PathBuf;
}

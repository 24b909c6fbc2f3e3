//! Platform accessory record.
//!
//! An explicit replacement for the host-owned accessory object: display name,
//! stable UUID, category, the context record the platform attaches, a
//! reachability flag, and the services the host exposes.

use super::services::{AccessoryInformation, SwitchService};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

/// Handler for identify requests. The argument is the `paired` flag.
pub type IdentifyHandler = Arc<dyn Fn(bool) + Send + Sync>;

/// Namespace for name-derived accessory UUIDs.
const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x9c3c_5a54_7d1b_4f3e_8a62_1b0e_6f4d_2a71);

/// Accessory category advertised to the host, stored as its HAP number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AccessoryCategory {
    Switch = 8,
}

impl From<AccessoryCategory> for u8 {
    fn from(category: AccessoryCategory) -> u8 {
        category as u8
    }
}

impl TryFrom<u8> for AccessoryCategory {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            8 => Ok(Self::Switch),
            other => Err(format!("unsupported accessory category {other}")),
        }
    }
}

/// Context the platform attaches to each accessory.
///
/// `manufacturer`, `model` and `serial` are only read: when a cached accessory
/// carries them they take precedence over the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryContext {
    pub name: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
}

impl AccessoryContext {
    pub fn new(name: impl Into<String>, priority: i64) -> Self {
        Self {
            name: name.into(),
            priority,
            ..Self::default()
        }
    }
}

/// Serialized form of an accessory in the host's cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAccessory {
    pub plugin: String,
    pub platform: String,
    pub display_name: String,
    pub uuid: Uuid,
    pub category: AccessoryCategory,
    pub context: AccessoryContext,
}

pub struct PlatformAccessory {
    display_name: String,
    uuid: Uuid,
    category: AccessoryCategory,
    context: Arc<RwLock<AccessoryContext>>,
    reachable: AtomicBool,
    information: AccessoryInformation,
    switch_service: RwLock<Option<Arc<SwitchService>>>,
    identify_handler: RwLock<Option<IdentifyHandler>>,
}

impl PlatformAccessory {
    /// Create an accessory with an empty context and no switch service.
    ///
    /// New accessories start unreachable; the platform flips the flag.
    pub fn new(display_name: impl Into<String>, uuid: Uuid, category: AccessoryCategory) -> Self {
        let display_name = display_name.into();
        let context = AccessoryContext::new(display_name.clone(), 0);
        Self {
            display_name,
            uuid,
            category,
            context: Arc::new(RwLock::new(context)),
            reachable: AtomicBool::new(false),
            information: AccessoryInformation::default(),
            switch_service: RwLock::new(None),
            identify_handler: RwLock::new(None),
        }
    }

    /// Rebuild an accessory from its cache entry.
    ///
    /// The switch service is recreated under the display name; handlers are not
    /// bound and the accessory is unreachable until the platform configures it.
    pub fn from_cached(cached: CachedAccessory) -> Self {
        let accessory = Self::new(cached.display_name, cached.uuid, cached.category);
        *accessory.context.write() = cached.context;
        accessory.add_switch_service(accessory.display_name.clone());
        accessory
    }

    pub fn to_cached(&self, plugin: &str, platform: &str) -> CachedAccessory {
        CachedAccessory {
            plugin: plugin.to_string(),
            platform: platform.to_string(),
            display_name: self.display_name.clone(),
            uuid: self.uuid,
            category: self.category,
            context: self.context(),
        }
    }

    /// Stable UUID for a name. The same name always maps to the same id.
    pub fn uuid_for(name: &str) -> Uuid {
        Uuid::new_v5(&ACCESSORY_NAMESPACE, name.as_bytes())
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn category(&self) -> AccessoryCategory {
        self.category
    }

    /// Snapshot of the context.
    pub fn context(&self) -> AccessoryContext {
        self.context.read().clone()
    }

    /// Shared handle on the context, for handlers that must see later updates.
    pub fn context_handle(&self) -> Arc<RwLock<AccessoryContext>> {
        self.context.clone()
    }

    pub fn update_context(&self, update: impl FnOnce(&mut AccessoryContext)) {
        update(&mut self.context.write());
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    pub fn update_reachability(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn information(&self) -> &AccessoryInformation {
        &self.information
    }

    /// Add a switch service, replacing any previous one.
    pub fn add_switch_service(&self, name: impl Into<String>) -> Arc<SwitchService> {
        let service = Arc::new(SwitchService::new(name));
        *self.switch_service.write() = Some(service.clone());
        service
    }

    pub fn switch_service(&self) -> Option<Arc<SwitchService>> {
        self.switch_service.read().clone()
    }

    pub fn on_identify(&self, handler: IdentifyHandler) {
        *self.identify_handler.write() = Some(handler);
    }

    /// Host identify request. Returns false when no handler is bound.
    pub fn identify(&self, paired: bool) -> bool {
        let handler = self.identify_handler.read().clone();
        match handler {
            Some(handler) => {
                handler(paired);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for PlatformAccessory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformAccessory")
            .field("display_name", &self.display_name)
            .field("uuid", &self.uuid)
            .field("category", &self.category)
            .field("context", &self.context())
            .field("reachable", &self.is_reachable())
            .finish()
    }
}

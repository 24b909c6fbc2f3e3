//! Prowl notification platform: accessory registry and switch handlers.
//!
//! Keeps one accessory per configured switch, keyed by switch name. The host
//! hands back cached accessories through [`ProwlPlatform::configure_accessory`]
//! and then calls [`ProwlPlatform::did_finish_launching`], which creates or
//! refreshes every configured switch and drops cached ones that are no longer
//! configured.
//!
//! Switches are momentary: turning one on sends a notification and a reset
//! task turns it off again after [`RESET_DELAY`].

use crate::accessory::{AccessoryCategory, AccessoryContext, PlatformAccessory};
use crate::config::{PlatformConfig, SwitchConfig};
use crate::error::{PluginError, Result};
use crate::host::AccessoryHost;
use crate::notification::{Dispatcher, NotificationTransport};
use crate::reset::{RESET_DELAY, ResetTimers};
use log::{debug, error, info};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

pub const PLUGIN_NAME: &str = "homebridge-prowl-notification";
pub const PLATFORM_NAME: &str = "ProwlNotification";

pub const DEFAULT_MANUFACTURER: &str = "Simone Karin Lehmann";
pub const DEFAULT_MODEL: &str = "Prowl Notification Switch";
pub const DEFAULT_SERIAL: &str = env!("CARGO_PKG_VERSION");

pub struct ProwlPlatform {
    switches: Vec<SwitchConfig>,
    host: Arc<dyn AccessoryHost>,
    dispatcher: Dispatcher,
    accessories: RwLock<HashMap<String, Arc<PlatformAccessory>>>,
    resets: ResetTimers,
}

impl ProwlPlatform {
    pub fn new(
        config: PlatformConfig,
        host: Arc<dyn AccessoryHost>,
        transport: Arc<dyn NotificationTransport>,
    ) -> Arc<Self> {
        let dispatcher = Dispatcher::new(config.apikey, host.config_path(), transport);
        Arc::new(Self {
            switches: config.switches,
            host,
            dispatcher,
            accessories: RwLock::new(HashMap::new()),
            resets: ResetTimers::new(),
        })
    }

    /// Host callback once all cached accessories have been restored.
    pub fn did_finish_launching(self: &Arc<Self>) {
        self.reconcile(&self.switches);
    }

    /// Create or refresh every configured switch, then remove the rest.
    ///
    /// Idempotent for the same input.
    pub fn reconcile(self: &Arc<Self>, switches: &[SwitchConfig]) {
        for switch in switches {
            self.add_accessory(switch);
        }

        let configured: HashSet<&str> = switches.iter().map(|s| s.name.as_str()).collect();
        let stale: Vec<Arc<PlatformAccessory>> = {
            let accessories = self.accessories.read();
            accessories
                .iter()
                .filter(|(name, _)| !configured.contains(name.as_str()))
                .map(|(_, accessory)| accessory.clone())
                .collect()
        };
        for accessory in &stale {
            accessory.update_reachability(false);
        }

        let unreachable: Vec<Arc<PlatformAccessory>> = self
            .accessories
            .read()
            .values()
            .filter(|a| !a.is_reachable())
            .cloned()
            .collect();
        for accessory in unreachable {
            self.remove_accessory(&accessory);
        }
    }

    /// Host callback for each accessory restored from its cache.
    pub fn configure_accessory(self: &Arc<Self>, accessory: Arc<PlatformAccessory>) {
        info!("Configure cached accessory: {}", accessory.display_name());

        self.bind_services(&accessory);
        let name = accessory.context().name;
        self.accessories.write().insert(name, accessory);
    }

    /// Create the accessory for a switch if needed and refresh its metadata.
    pub fn add_accessory(self: &Arc<Self>, switch: &SwitchConfig) -> Arc<PlatformAccessory> {
        let existing = self.accessories.read().get(&switch.name).cloned();
        let accessory = match existing {
            Some(accessory) => accessory,
            None => {
                info!("Add new accessory: {}", switch.name);
                let accessory = Arc::new(PlatformAccessory::new(
                    switch.name.clone(),
                    PlatformAccessory::uuid_for(&switch.name),
                    AccessoryCategory::Switch,
                ));
                accessory.add_switch_service(switch.name.clone());
                accessory.update_reachability(true);
                self.bind_services(&accessory);
                self.host.register_platform_accessories(
                    PLUGIN_NAME,
                    PLATFORM_NAME,
                    std::slice::from_ref(&accessory),
                );
                accessory
            }
        };

        accessory.update_context(|ctx| {
            ctx.name = switch.name.clone();
            ctx.priority = switch.effective_priority();
        });

        let context = accessory.context();
        accessory
            .information()
            .set_manufacturer(context.manufacturer.as_deref().unwrap_or(DEFAULT_MANUFACTURER))
            .set_model(context.model.as_deref().unwrap_or(DEFAULT_MODEL))
            .set_serial_number(context.serial.as_deref().unwrap_or(DEFAULT_SERIAL));

        self.accessories
            .write()
            .insert(switch.name.clone(), accessory.clone());
        accessory.update_reachability(true);
        accessory
    }

    pub fn remove_accessory(&self, accessory: &Arc<PlatformAccessory>) {
        let name = accessory.context().name;
        info!("Remove accessory: {}", name);
        self.host.unregister_platform_accessories(
            PLUGIN_NAME,
            PLATFORM_NAME,
            std::slice::from_ref(accessory),
        );
        self.accessories.write().remove(&name);
    }

    /// Wire get/set on the switch's `On` characteristic and identify.
    ///
    /// Used for both new and restored accessories so they behave the same.
    fn bind_services(self: &Arc<Self>, accessory: &PlatformAccessory) {
        let context = accessory.context_handle();

        if let Some(service) = accessory.switch_service() {
            let platform = Arc::downgrade(self);
            let ctx = context.clone();
            service.on().on_get(Arc::new(move || match platform.upgrade() {
                Some(platform) => platform.get_state(&ctx.read()),
                None => false,
            }));

            let platform = Arc::downgrade(self);
            let ctx = context.clone();
            service.on().on_set(Arc::new(move |value: bool| -> Result<()> {
                let Some(platform) = platform.upgrade() else {
                    return Ok(());
                };
                let snapshot = ctx.read().clone();
                platform.set_state(&snapshot, value)
            }));
        }

        let platform: Weak<Self> = Arc::downgrade(self);
        accessory.on_identify(Arc::new(move |paired: bool| {
            if let Some(platform) = platform.upgrade() {
                platform.identify(&context.read(), paired);
            }
        }));
    }

    pub fn identify(&self, switch: &AccessoryContext, _paired: bool) {
        info!("{} identify requested!", switch.name);
    }

    /// Reads always report off.
    pub fn get_state(&self, _switch: &AccessoryContext) -> bool {
        false
    }

    /// Handle a write to a switch.
    ///
    /// On `true`: schedule the reset, then send the notification. The reset is
    /// scheduled even when sending fails, and the error is returned to the writer.
    /// On `false`: nothing.
    pub fn set_state(self: &Arc<Self>, switch: &AccessoryContext, value: bool) -> Result<()> {
        if value {
            let platform = Arc::downgrade(self);
            let name = switch.name.clone();
            self.resets.schedule(&switch.name, RESET_DELAY, move || {
                if let Some(platform) = platform.upgrade() {
                    platform.reset_switch(&name);
                }
            });
            self.dispatcher.send(switch)?;
        }
        Ok(())
    }

    fn reset_switch(&self, name: &str) {
        let Some(service) = self.accessory(name).and_then(|a| a.switch_service()) else {
            debug!("Reset skipped, accessory {} is gone", name);
            return;
        };
        if let Err(e) = service.on().set(false) {
            error!("Failed to reset {}: {}", name, e);
        }
    }

    /// Turn a switch on as if the host had written `true`.
    pub fn trigger(&self, name: &str) -> Result<()> {
        let accessory = self
            .accessory(name)
            .ok_or_else(|| PluginError::UnknownAccessory(name.to_string()))?;
        let service = accessory
            .switch_service()
            .ok_or_else(|| PluginError::MissingSwitchService(name.to_string()))?;
        service.on().set(true)
    }

    pub fn accessory(&self, name: &str) -> Option<Arc<PlatformAccessory>> {
        self.accessories.read().get(name).cloned()
    }

    pub fn accessories(&self) -> Vec<Arc<PlatformAccessory>> {
        self.accessories.read().values().cloned().collect()
    }

    /// Resets scheduled for a switch that have not fired yet.
    pub fn pending_resets(&self, name: &str) -> usize {
        self.resets.pending(name)
    }
}

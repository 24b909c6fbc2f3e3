//! The `On` characteristic of a switch service.
//!
//! Holds the exposed boolean value and the get/set handlers bound by the
//! platform. Host reads go through the get handler, host writes store the value
//! and then run the set handler.

use crate::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Handler answering a host read.
pub type GetHandler = Arc<dyn Fn() -> bool + Send + Sync>;

/// Handler invoked after a host write. An error is returned to the writer.
pub type SetHandler = Arc<dyn Fn(bool) -> Result<()> + Send + Sync>;

/// Thread-safe on/off characteristic.
///
/// The version is incremented each time the stored value changes, so callers
/// can observe writes that happened while they were not looking.
pub struct OnCharacteristic {
    value: AtomicBool,
    version: AtomicU32,
    get_handler: RwLock<Option<GetHandler>>,
    set_handler: RwLock<Option<SetHandler>>,
}

impl OnCharacteristic {
    pub fn new(initial: bool) -> Self {
        Self {
            value: AtomicBool::new(initial),
            version: AtomicU32::new(0),
            get_handler: RwLock::new(None),
            set_handler: RwLock::new(None),
        }
    }

    /// Stored value, bypassing the get handler.
    pub fn value(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }

    /// Number of value changes. A trigger followed by its reset adds two, so
    /// the count tells how many on/off cycles actually reached the switch.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn on_get(&self, handler: GetHandler) {
        *self.get_handler.write() = Some(handler);
    }

    pub fn on_set(&self, handler: SetHandler) {
        *self.set_handler.write() = Some(handler);
    }

    pub fn has_handlers(&self) -> bool {
        self.get_handler.read().is_some() && self.set_handler.read().is_some()
    }

    /// Host read. Falls back to the stored value when nothing is bound.
    pub fn get(&self) -> bool {
        let handler = self.get_handler.read().clone();
        match handler {
            Some(handler) => handler(),
            None => self.value(),
        }
    }

    /// Host write: store the value, then run the set handler.
    pub fn set(&self, value: bool) -> Result<()> {
        let old = self.value.swap(value, Ordering::SeqCst);
        if old != value {
            self.version.fetch_add(1, Ordering::SeqCst);
        }

        // Clone out so the handler may rebind or write again without deadlocking.
        let handler = self.set_handler.read().clone();
        match handler {
            Some(handler) => handler(value),
            None => Ok(()),
        }
    }
}

impl Default for OnCharacteristic {
    fn default() -> Self {
        Self::new(false)
    }
}

//! Services attached to a platform accessory.

use super::characteristic::OnCharacteristic;
use parking_lot::RwLock;

/// Switch service exposing a single `On` characteristic.
pub struct SwitchService {
    name: String,
    on: OnCharacteristic,
}

impl SwitchService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on: OnCharacteristic::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn on(&self) -> &OnCharacteristic {
        &self.on
    }
}

/// Static descriptive fields shown by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InformationFields {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

/// Accessory information service.
///
/// Setters return `&Self` so updates can be chained.
#[derive(Default)]
pub struct AccessoryInformation {
    fields: RwLock<InformationFields>,
}

impl AccessoryInformation {
    pub fn set_manufacturer(&self, value: impl Into<String>) -> &Self {
        self.fields.write().manufacturer = value.into();
        self
    }

    pub fn set_model(&self, value: impl Into<String>) -> &Self {
        self.fields.write().model = value.into();
        self
    }

    pub fn set_serial_number(&self, value: impl Into<String>) -> &Self {
        self.fields.write().serial_number = value.into();
        self
    }

    pub fn fields(&self) -> InformationFields {
        self.fields.read().clone()
    }
}

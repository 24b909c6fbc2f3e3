//! Accessory model exposed to the host: accessories, their services and the
//! switch `On` characteristic.

mod characteristic;
mod platform_accessory;
mod services;

pub use characteristic::{GetHandler, OnCharacteristic, SetHandler};
pub use platform_accessory::{
    AccessoryCategory, AccessoryContext, CachedAccessory, IdentifyHandler, PlatformAccessory,
};
pub use services::{AccessoryInformation, InformationFields, SwitchService};

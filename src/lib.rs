//! Prowl notification switches.
//!
//! Exposes configured switches as momentary accessories to a home-automation
//! host. Turning a switch on sends a Prowl push notification and the switch
//! turns itself off again after a short delay.

pub mod accessory;
pub mod config;
pub mod error;
pub mod host;
pub mod notification;
pub mod platform;
pub mod reset;

#[cfg(test)]
mod test_support;

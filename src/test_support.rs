//! Recording doubles shared by the unit tests.

use crate::accessory::PlatformAccessory;
use crate::error::{PluginError, Result};
use crate::host::AccessoryHost;
use crate::notification::NotificationTransport;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Write `json` to `<dir>/config.json` and return the path.
pub fn write_config(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("config.json");
    std::fs::write(&path, json).unwrap();
    path
}

/// Let spawned tasks run to completion.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Transport that records every body and forwards it to a channel.
pub struct RecordingTransport {
    bodies: Mutex<Vec<String>>,
    tx: UnboundedSender<String>,
    fail: bool,
}

impl RecordingTransport {
    pub fn new() -> (Arc<Self>, UnboundedReceiver<String>) {
        Self::build(false)
    }

    /// Records the attempt, then fails like an unreachable server.
    pub fn failing() -> (Arc<Self>, UnboundedReceiver<String>) {
        Self::build(true)
    }

    fn build(fail: bool) -> (Arc<Self>, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            bodies: Mutex::new(Vec::new()),
            tx,
            fail,
        });
        (transport, rx)
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().clone()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn post_form(&self, body: String) -> Result<u16> {
        self.bodies.lock().push(body.clone());
        let _ = self.tx.send(body);
        if self.fail {
            return Err(PluginError::IoError(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(200)
    }
}

/// Host that records registrations by display name.
pub struct RecordingHost {
    config_path: PathBuf,
    registered: Mutex<Vec<String>>,
    unregistered: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new(config_path: PathBuf) -> Arc<Self> {
        Arc::new(Self {
            config_path,
            registered: Mutex::new(Vec::new()),
            unregistered: Mutex::new(Vec::new()),
        })
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().clone()
    }

    pub fn unregistered(&self) -> Vec<String> {
        self.unregistered.lock().clone()
    }
}

impl AccessoryHost for RecordingHost {
    fn register_platform_accessories(
        &self,
        _plugin: &str,
        _platform: &str,
        accessories: &[Arc<PlatformAccessory>],
    ) {
        self.registered
            .lock()
            .extend(accessories.iter().map(|a| a.display_name().to_string()));
    }

    fn unregister_platform_accessories(
        &self,
        _plugin: &str,
        _platform: &str,
        accessories: &[Arc<PlatformAccessory>],
    ) {
        self.unregistered
            .lock()
            .extend(accessories.iter().map(|a| a.display_name().to_string()));
    }

    fn config_path(&self) -> PathBuf {
        self.config_path.clone()
    }
}

//! Notification dispatcher.
//!
//! Turns a switch trigger into one Prowl request. The configuration file is
//! re-read on every send, so edits apply to the next trigger without a restart.
//! The request itself runs on a spawned task; its outcome is only logged.

use super::request::{NotificationRequest, resolve_text};
use super::transport::NotificationTransport;
use crate::accessory::AccessoryContext;
use crate::config::load_host_config;
use crate::error::Result;
use crate::platform::PLATFORM_NAME;
use log::{debug, error};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Dispatcher {
    /// API key from the startup configuration; the reloaded file's key is ignored.
    apikey: String,
    config_path: PathBuf,
    transport: Arc<dyn NotificationTransport>,
}

impl Dispatcher {
    pub fn new(
        apikey: impl Into<String>,
        config_path: PathBuf,
        transport: Arc<dyn NotificationTransport>,
    ) -> Self {
        Self {
            apikey: apikey.into(),
            config_path,
            transport,
        }
    }

    /// Build the request for a switch from a fresh read of the configuration.
    ///
    /// Read or parse failures, a missing platform block and a block without a
    /// `switches` list are errors. A switch missing from the reloaded list is
    /// not: its text fields stay empty.
    pub fn prepare(&self, switch: &AccessoryContext) -> Result<NotificationRequest> {
        let platform =
            load_host_config(&self.config_path)?.require_switch_list(PLATFORM_NAME)?;
        let (application, description) = resolve_text(&platform, &switch.name);

        Ok(NotificationRequest {
            apikey: self.apikey.clone(),
            application,
            description,
            priority: switch.priority,
            // Never populated: Prowl receives an empty url.
            url: None,
        })
    }

    /// Prepare the request and fire it without waiting for the response.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn send(&self, switch: &AccessoryContext) -> Result<()> {
        debug!("send notification from {}", switch.name);

        let body = self.prepare(switch)?.encode();
        let transport = self.transport.clone();
        tokio::spawn(async move {
            match transport.post_form(body).await {
                Ok(status) => debug!("sendNotification statusCode: {}", status),
                Err(e) => error!("sendNotification: {}", e),
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::test_support::{RecordingTransport, write_config};

    #[tokio::test]
    async fn test_apikey_comes_from_startup_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","apikey":"FROM_FILE",
                "switches":[{"name":"Door"}]}]}"#,
        );
        let (transport, _rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport);

        let request = dispatcher.prepare(&AccessoryContext::new("Door", 0)).unwrap();
        assert_eq!(request.apikey, "K");
        assert_eq!(request.url, None);
    }

    #[tokio::test]
    async fn test_priority_comes_from_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","switches":[{"name":"Gate","priority":1}]}]}"#,
        );
        let (transport, _rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport);

        let request = dispatcher.prepare(&AccessoryContext::new("Gate", 2)).unwrap();
        assert_eq!(request.priority, 2);
    }

    #[tokio::test]
    async fn test_send_posts_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","switches":[{"name":"Door"}]}]}"#,
        );
        let (transport, mut rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport.clone());

        dispatcher.send(&AccessoryContext::new("Door", 0)).unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(
            body,
            "apikey=K&application=Door&description=Door%20has%20been%20triggered.&priority=0&url="
        );
        assert_eq!(transport.bodies().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_is_honored_on_next_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","switches":[{"name":"Door"}]}]}"#,
        );
        let (transport, mut rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport);
        let door = AccessoryContext::new("Door", 0);

        dispatcher.send(&door).unwrap();
        assert!(rx.recv().await.unwrap().contains("application=Door&"));

        write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","switches":[{"name":"Door","subject":"Front"}]}]}"#,
        );
        dispatcher.send(&door).unwrap();
        assert!(rx.recv().await.unwrap().contains("application=Front&"));
    }

    #[tokio::test]
    async fn test_switch_missing_from_reloaded_config_still_sends() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","switches":[]}]}"#,
        );
        let (transport, mut rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport);

        dispatcher.send(&AccessoryContext::new("Door", 1)).unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            "apikey=K&application=&description=&priority=1&url="
        );
    }

    #[tokio::test]
    async fn test_malformed_config_fails_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"platforms":[{"platform""#);
        let (transport, _rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport.clone());

        let result = dispatcher.send(&AccessoryContext::new("Door", 0));
        assert!(matches!(result, Err(PluginError::SerdeJsonError(_))));
        tokio::task::yield_now().await;
        assert!(transport.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_missing_platform_block_fails_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), r#"{"platforms":[{"platform":"Other"}]}"#);
        let (transport, _rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport);

        let result = dispatcher.send(&AccessoryContext::new("Door", 0));
        assert!(matches!(result, Err(PluginError::PlatformNotFound(_))));
    }

    #[tokio::test]
    async fn test_block_without_switches_fails_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","apikey":"K"}]}"#,
        );
        let (transport, _rx) = RecordingTransport::new();
        let dispatcher = Dispatcher::new("K", path, transport.clone());

        let result = dispatcher.send(&AccessoryContext::new("Door", 0));
        assert!(matches!(result, Err(PluginError::MissingSwitchList(_))));
        tokio::task::yield_now().await;
        assert!(transport.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"{"platforms":[{"platform":"ProwlNotification","switches":[{"name":"Door"}]}]}"#,
        );
        let (transport, mut rx) = RecordingTransport::failing();
        let dispatcher = Dispatcher::new("K", path, transport);

        tokio_test::assert_ok!(dispatcher.send(&AccessoryContext::new("Door", 0)));
        // The attempt still happened; the error only reached the log.
        assert!(rx.recv().await.is_some());
    }
}

//! Outbound transport for notification requests.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

/// Prowl public API endpoint for adding a notification.
pub const PROWL_ADD_URL: &str = "https://api.prowlapp.com:443/publicapi/add";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Sends an encoded form body and reports the HTTP status code.
#[async_trait]
pub trait NotificationTransport: Send + Sync + 'static {
    async fn post_form(&self, body: String) -> Result<u16>;
}

/// HTTPS transport to the Prowl API.
///
/// No timeout or retry beyond the client's defaults; the response body is never
/// read.
pub struct ProwlClient {
    client: reqwest::Client,
    url: String,
}

impl ProwlClient {
    pub fn new() -> Result<Self> {
        Self::with_url(PROWL_ADD_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl NotificationTransport for ProwlClient {
    async fn post_form(&self, body: String) -> Result<u16> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_default_endpoint() {
        let client = ProwlClient::new().unwrap();
        assert_eq!(client.url(), "https://api.prowlapp.com:443/publicapi/add");
    }

    #[tokio::test]
    async fn test_posts_form_and_reports_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if received.ends_with(b"priority=0&url=") {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await
                .unwrap();
            String::from_utf8(received).unwrap()
        });

        let client = ProwlClient::with_url(format!("http://{addr}/publicapi/add")).unwrap();
        let body = "apikey=K&application=Door&description=x&priority=0&url=".to_string();
        let status = client.post_form(body.clone()).await.unwrap();
        assert_eq!(status, 401);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /publicapi/add http/1.1"));
        assert!(request.contains("content-type: application/x-www-form-urlencoded"));
        assert!(request.contains(&format!("content-length: {}", body.len())));
        assert!(request.ends_with(&body.to_lowercase()));
    }

    #[tokio::test]
    async fn test_connection_failure_is_an_error() {
        // Bind then drop to get a port nothing listens on.
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let client = ProwlClient::with_url(format!("http://{addr}/publicapi/add")).unwrap();

        let result = client.post_form(String::new()).await;
        assert!(matches!(result, Err(PluginError::Http(_))));
    }
}

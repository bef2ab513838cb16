//! Mail relay client
//!
//! Posts `{"to": ..., "message": ...}` to an HTTP endpoint that forwards the
//! notification by email.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::Notifier;
use crate::core::error::AppError;

pub struct WebhookNotifier {
    client: Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct NotificationPayload<'a> {
    to: &'a str,
    message: &'a str,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, address: &str, message: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&NotificationPayload {
                to: address,
                message,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to send notification: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalServiceError(format!(
                "Notification relay returned {}: {}",
                status, body
            )));
        }

        debug!("Notification delivered to {}", address);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_relay_is_external_error() {
        let notifier = WebhookNotifier::new(
            "http://127.0.0.1:9/notify".to_string(),
            Duration::from_millis(500),
        )
        .unwrap();

        let result = notifier.notify("owner@example.com", "done").await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[test]
    fn test_payload_shape() {
        let payload = NotificationPayload {
            to: "owner@example.com",
            message: "done",
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({"to": "owner@example.com", "message": "done"})
        );
    }
}

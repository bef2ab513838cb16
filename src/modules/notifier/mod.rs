//! Outbound notifications to user email addresses
//!
//! Delivery is fire-and-forget from the caller's point of view: errors are
//! returned so they can be logged, never retried.

mod log_notifier;
mod webhook_notifier;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::config::NotifierConfig;
use crate::core::error::AppError;

pub use log_notifier::LogNotifier;
pub use webhook_notifier::WebhookNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `message` to `address`
    async fn notify(&self, address: &str, message: &str) -> Result<(), AppError>;
}

/// Pick the notifier backend from configuration
pub fn from_config(config: &NotifierConfig) -> Result<Arc<dyn Notifier>, AppError> {
    match &config.webhook_url {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(url.clone(), config.timeout)?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}

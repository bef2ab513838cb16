use async_trait::async_trait;

use super::Notifier;
use crate::core::error::AppError;

/// Writes notifications to the log instead of sending them
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, address: &str, message: &str) -> Result<(), AppError> {
        tracing::info!(to = %address, "Notification: {}", message);
        Ok(())
    }
}

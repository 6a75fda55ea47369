pub mod smtp;

use crate::error::AppResult;
use async_trait::async_trait;

pub use smtp::SmtpNotifier;

/// Delivery channel for the daily digest.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an HTML message to the digest recipient.
    async fn send_html(&self, subject: &str, html: &str) -> AppResult<()>;
}

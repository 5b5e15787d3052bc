use async_trait::async_trait;

use crate::{decision::Report, domain::MessageRef, Result};

/// Outbound actions the bot takes in a chat.
///
/// Implementations do not retry; a failed call surfaces immediately.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    /// Reply to `msg` with the classification report, silently.
    ///
    /// Must succeed even when `msg` was deleted in the meantime.
    async fn send_report(&self, msg: MessageRef, report: &Report) -> Result<()>;

    /// Plain-text reply (command responses).
    async fn reply_text(&self, msg: MessageRef, text: &str) -> Result<()>;
}

//! Mailbox access — listing, fetching and sending, behind a narrow trait.
//!
//! The trait is pure I/O; classification, summarization and assembly live
//! in the pipeline. `GmailClient` is the production implementation over
//! the Gmail REST API.

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{AuthConfig, TokenManager};
pub use client::{GmailClient, compose_digest_email};
pub use types::RawMessage;

use async_trait::async_trait;

use crate::error::MailboxError;

/// A time-bounded mailbox: list message ids, fetch full messages, send
/// a composed MIME message.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Ids of messages in the configured window, in fetch order.
    async fn list_message_ids(&self) -> Result<Vec<String>, MailboxError>;

    /// Fetch one full raw message by id.
    async fn fetch_message(&self, id: &str) -> Result<RawMessage, MailboxError>;

    /// Send a fully composed MIME message.
    async fn send_raw(&self, mime: &[u8]) -> Result<(), MailboxError>;
}

mod client;
mod types;

pub use client::TelegramClient;
pub use types::{Chat, Contact, Message, PhotoSize, TelegramUser, Update};

use anyhow::Result;

/// Outbound side of the chat platform.
///
/// A trait so the pipeline can run against a recording implementation in
/// tests; [`TelegramClient`] is the production one.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// Send a Markdown-formatted message.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Send a message with the platform's native contact-request keyboard.
    async fn send_contact_request(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Resolve a photo `file_id` to a fetchable URL.
    async fn file_url(&self, file_id: &str) -> Result<String>;
}

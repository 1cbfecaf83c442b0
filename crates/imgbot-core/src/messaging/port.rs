use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::ChatAction,
    Result,
};

/// Outbound side of the messenger.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;
}

/// Retrieval of attachments referenced by an inbound message.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Download the file behind a messenger file id.
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;
}

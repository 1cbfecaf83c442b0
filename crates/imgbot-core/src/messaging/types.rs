use crate::domain::{ChatId, UserId};

/// Messenger-agnostic inbound update.
///
/// Telegram-specific fields stay in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    /// Explicit greeting (`/start`).
    Start(Sender),
    Help(Sender),
    Image(ImageMessage),
    /// Anything that is neither a command we know nor an image.
    Unsupported(Sender),
}

impl IncomingUpdate {
    pub fn sender(&self) -> &Sender {
        match self {
            Self::Start(s) | Self::Help(s) | Self::Unsupported(s) => s,
            Self::Image(m) => &m.sender,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Sender {
    pub chat_id: ChatId,
    /// `None` for anonymous senders (channel posts, anonymous admins).
    pub user_id: Option<UserId>,
    pub display_name: String,
}

/// A photo, or a document whose mime type is `image/*`.
#[derive(Clone, Debug)]
pub struct ImageMessage {
    pub sender: Sender,
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Outgoing "chat action" (upload indicator, etc).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAction {
    UploadPhoto,
}

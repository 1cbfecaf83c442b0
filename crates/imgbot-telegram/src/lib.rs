//! Telegram adapter (teloxide).
//!
//! This crate implements the `imgbot-core` messaging ports over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{net::Download, prelude::*, types::ParseMode};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use imgbot_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::{MediaSource, MessagingPort},
        types::ChatAction,
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }
}

fn map_err(e: teloxide::RequestError) -> Error {
    Error::External(format!("telegram error: {e}"))
}

/// Retry once when Telegram asks us to back off (429 RetryAfter).
async fn with_retry<T, Fut>(mut op: impl FnMut() -> Fut) -> Result<T>
where
    Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
    Fut::IntoFuture: Send,
{
    const MAX_RETRIES: usize = 1;
    let mut attempts = 0usize;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => match e {
                teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    sleep(d).await;
                    continue;
                }
                other => return Err(map_err(other)),
            },
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = with_retry(|| {
            self.bot
                .send_message(Self::tg_chat(chat_id), html.to_string())
                .parse_mode(ParseMode::Html)
        })
        .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        let tg_action = match action {
            ChatAction::UploadPhoto => teloxide::types::ChatAction::UploadPhoto,
        };
        with_retry(|| self.bot.send_chat_action(Self::tg_chat(chat_id), tg_action)).await?;
        Ok(())
    }
}

/// Downloads attachments into memory.
#[derive(Clone)]
pub struct TelegramMedia {
    bot: Bot,
}

impl TelegramMedia {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MediaSource for TelegramMedia {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = with_retry(|| self.bot.get_file(file_id.to_string())).await?;

        let mut buf: Vec<u8> = Vec::new();
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .map_err(|e| Error::External(format!("telegram download error: {e}")))?;

        Ok(buf)
    }
}

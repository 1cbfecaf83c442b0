//! Inbound update → reply orchestration.
//!
//! Every update is checked against the access policy first. Failures past that
//! point are turned into a reply to the requester; only a failing messenger
//! bubbles up as an error.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    formatting,
    host::{ImageFile, UploadResult},
    messaging::{
        port::{MediaSource, MessagingPort},
        types::{ChatAction, ImageMessage, IncomingUpdate},
    },
    security::AccessPolicy,
    upload::Uploader,
    utils::truncate_text,
    Result,
};

const MAX_ERROR_LEN: usize = 300;

pub struct Relay {
    access: AccessPolicy,
    uploader: Arc<Uploader>,
    messenger: Arc<dyn MessagingPort>,
    media: Arc<dyn MediaSource>,
}

impl Relay {
    pub fn new(
        access: AccessPolicy,
        uploader: Arc<Uploader>,
        messenger: Arc<dyn MessagingPort>,
        media: Arc<dyn MediaSource>,
    ) -> Self {
        Self {
            access,
            uploader,
            messenger,
            media,
        }
    }

    pub async fn handle(&self, update: IncomingUpdate) -> Result<()> {
        let sender = update.sender().clone();
        let identity = sender.user_id.map(|u| u.identity());

        if !self.access.is_allowed(identity.as_deref()) {
            warn!(
                user_id = identity.as_deref().unwrap_or("<anonymous>"),
                "access denied"
            );
            self.messenger
                .send_html(sender.chat_id, formatting::ACCESS_DENIED)
                .await?;
            return Ok(());
        }

        let reply = match &update {
            IncomingUpdate::Start(s) => formatting::welcome(&s.display_name),
            IncomingUpdate::Help(_) => formatting::help(),
            IncomingUpdate::Image(msg) => self.relay_image(msg).await,
            IncomingUpdate::Unsupported(_) => {
                info!("non-image message, asking for an image");
                formatting::UNSUPPORTED_TYPE.to_string()
            }
        };

        self.messenger.send_html(sender.chat_id, &reply).await?;
        Ok(())
    }

    async fn relay_image(&self, msg: &ImageMessage) -> String {
        info!(
            chat_id = msg.sender.chat_id.0,
            file_name = msg.file_name.as_deref().unwrap_or("<photo>"),
            "image received"
        );

        if let Err(e) = self
            .messenger
            .send_chat_action(msg.sender.chat_id, ChatAction::UploadPhoto)
            .await
        {
            warn!(error = %e, "failed to send chat action");
        }

        match self.upload(msg).await {
            Ok(result) => formatting::upload_reply(&result).unwrap_or_else(|| {
                warn!("image host returned no URL");
                formatting::NO_URL_RETURNED.to_string()
            }),
            Err(e) => {
                error!(error = %e, "image upload failed");
                formatting::upload_error(&truncate_text(&e.to_string(), MAX_ERROR_LEN))
            }
        }
    }

    async fn upload(&self, msg: &ImageMessage) -> Result<UploadResult> {
        let bytes = self.media.fetch(&msg.file_id).await?;
        let image = ImageFile::jpeg(bytes).with_name(msg.file_name.clone(), msg.mime_type.clone());
        self.uploader.upload_image(&image).await
    }
}

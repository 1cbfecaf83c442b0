//! Telegram update handlers.
//!
//! Each update is mapped into a messenger-agnostic `IncomingUpdate` and handed
//! to the core relay, which owns the access check and every reply.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::error;

use imgbot_core::{
    domain::{ChatId, UserId},
    messaging::types::{IncomingUpdate, Sender},
};

use crate::router::AppState;

mod commands;
mod photo;

pub use commands::Command;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let update = classify(&msg);

    if let Err(e) = state.relay.handle(update).await {
        error!(chat_id, error = %e, "failed to answer message");
    }

    Ok(())
}

fn classify(msg: &Message) -> IncomingUpdate {
    let sender = sender_of(msg);

    if let Some(cmd) = msg.text().and_then(Command::parse) {
        return match cmd {
            Command::Start => IncomingUpdate::Start(sender),
            Command::Help => IncomingUpdate::Help(sender),
        };
    }

    match photo::image_from_message(msg, sender.clone()) {
        Some(image) => IncomingUpdate::Image(image),
        None => IncomingUpdate::Unsupported(sender),
    }
}

fn sender_of(msg: &Message) -> Sender {
    let user = msg.from();
    Sender {
        chat_id: ChatId(msg.chat.id.0),
        user_id: user.map(|u| UserId(u.id.0 as i64)),
        display_name: user
            .map(|u| u.full_name())
            .unwrap_or_else(|| "there".to_string()),
    }
}

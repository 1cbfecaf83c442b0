use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::{info, warn};

use imgbot_core::{
    config::Config,
    messaging::port::{MediaSource, MessagingPort},
    relay::Relay,
    upload::Uploader,
};

use crate::handlers;
use crate::{TelegramMedia, TelegramMessenger};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

pub async fn run_polling(cfg: Arc<Config>, uploader: Arc<Uploader>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "bot started"),
        Err(e) => warn!(error = %e, "get_me failed, continuing"),
    }
    info!(base_url = %cfg.api_base_url, strategy_id = cfg.strategy_id, "image host");
    if cfg.allowed_users.is_open() {
        warn!("TELEGRAM_ALLOWED_USERS is empty: every Telegram user may upload");
    } else {
        info!(allowed = cfg.allowed_users.len(), "allow-list active");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let media: Arc<dyn MediaSource> = Arc::new(TelegramMedia::new(bot.clone()));
    let relay = Arc::new(Relay::new(
        cfg.allowed_users.clone(),
        uploader,
        messenger,
        media,
    ));
    let state = Arc::new(AppState { relay });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}

use std::sync::Arc;

use tracing::info;

use imgbot_core::{
    config::Config,
    credential::{CredentialProvider, FileCredentialStore},
    upload::Uploader,
};
use imgbot_host::{HostClient, HostConfig};

#[tokio::main]
async fn main() -> Result<(), imgbot_core::Error> {
    imgbot_core::logging::init("imgbot")?;

    let cfg = Arc::new(Config::load()?);
    info!(token_file = %cfg.token_file.display(), "starting imgbot");

    let host = Arc::new(HostClient::new(HostConfig::from(cfg.as_ref()))?);
    let store = Arc::new(FileCredentialStore::new(cfg.token_file.clone()));
    let credentials = Arc::new(CredentialProvider::new(store, host.clone()));
    let uploader = Arc::new(Uploader::new(host, credentials));

    imgbot_telegram::router::run_polling(cfg, uploader)
        .await
        .map_err(|e| imgbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}

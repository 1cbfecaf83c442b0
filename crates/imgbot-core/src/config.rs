use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, security::AccessPolicy, Result};

/// Typed configuration for the relay.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,
    pub allowed_users: AccessPolicy,

    // Image host
    pub api_base_url: String,
    pub api_email: String,
    pub api_password: String,
    pub strategy_id: u32,
    pub request_timeout: Duration,

    // Local state
    pub token_file: PathBuf,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .and_then(non_empty)
                .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
        };

        // Required env vars
        let telegram_bot_token = required("TELEGRAM_BOT_TOKEN")?;
        let api_base_url = required("API_BASE_URL")?
            .trim()
            .trim_end_matches('/')
            .to_string();
        let api_email = match lookup("API_EMAIL").and_then(non_empty) {
            Some(v) => v,
            None => required("API_USERNAME").map_err(|_| {
                Error::Config("API_EMAIL environment variable is required".to_string())
            })?,
        };
        let api_password = required("API_PASSWORD")?;

        let strategy_id = match lookup("STRATEGY_ID").and_then(non_empty) {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                Error::Config(format!("STRATEGY_ID must be an integer, got {raw:?}"))
            })?,
            None => 1,
        };

        let allowed_users =
            AccessPolicy::from_csv(&lookup("TELEGRAM_ALLOWED_USERS").unwrap_or_default());

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS").and_then(non_empty) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::Config(format!(
                        "REQUEST_TIMEOUT_SECS must be a positive integer, got {raw:?}"
                    )))
                }
            },
            None => Duration::from_secs(30),
        };
        let token_file = PathBuf::from(
            lookup("TOKEN_FILE")
                .and_then(non_empty)
                .unwrap_or_else(|| "token.json".to_string()),
        );

        Ok(Self {
            telegram_bot_token,
            allowed_users,
            api_base_url,
            api_email,
            api_password,
            strategy_id,
            request_timeout,
            token_file,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

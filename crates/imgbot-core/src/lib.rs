//! Core domain + application logic for the image-host relay bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and the image-host
//! HTTP API live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod credential;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod host;
pub mod logging;
pub mod messaging;
pub mod relay;
pub mod security;
pub mod upload;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};

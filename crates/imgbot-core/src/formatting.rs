//! Reply texts (Telegram HTML parse mode).

use crate::host::UploadResult;

pub const ACCESS_DENIED: &str = "⛔ You are not allowed to use this bot.";
pub const UNSUPPORTED_TYPE: &str = "Unsupported file type, please send an image.";
pub const NO_URL_RETURNED: &str = "❌ Upload failed: the server returned no URL data.";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn welcome(display_name: &str) -> String {
    format!(
        "👋 Hi {}! Send me a photo and I will upload it and reply with its link.",
        escape_html(display_name)
    )
}

pub fn help() -> String {
    [
        "<b>How to use</b>",
        "Send a photo (or an image as a file) and I reply with:",
        "• the direct URL",
        "• a Markdown snippet ready to paste",
    ]
    .join("\n")
}

/// Success reply, or `None` when the host returned no URL.
pub fn upload_reply(result: &UploadResult) -> Option<String> {
    let url = result.url.as_deref()?;
    let markdown = result.markdown.as_deref().unwrap_or("");
    Some(format!(
        "🌐 <b>URL:</b> {}\n📝 <b>Markdown:</b> <code>{}</code>",
        escape_html(url),
        escape_html(markdown)
    ))
}

pub fn upload_error(error: &str) -> String {
    format!("❌ Upload failed: {}", escape_html(error))
}

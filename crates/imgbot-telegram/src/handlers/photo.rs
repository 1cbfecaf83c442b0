use teloxide::types::Message;

use imgbot_core::messaging::types::{ImageMessage, Sender};

/// Extract an uploadable image: a photo (largest size) or an image document.
pub fn image_from_message(msg: &Message, sender: Sender) -> Option<ImageMessage> {
    if let Some(best) = msg.photo().and_then(|sizes| sizes.last()) {
        return Some(ImageMessage {
            sender,
            file_id: best.file.id.clone(),
            file_name: None,
            mime_type: None,
        });
    }

    let doc = msg.document()?;
    let mime = doc.mime_type.as_ref().map(|m| m.essence_str().to_string());
    if !mime.as_deref().is_some_and(is_image_mime) {
        return None;
    }

    Some(ImageMessage {
        sender,
        file_id: doc.file.id.clone(),
        file_name: doc.file_name.clone(),
        mime_type: mime,
    })
}

fn is_image_mime(mime: &str) -> bool {
    mime.to_ascii_lowercase().starts_with("image/")
}

//! teloxide `Message` → core `IncomingMessage`.

use teloxide::types::{Message, PhotoSize};

use modesty_core::{
    domain::{ChatId, IncomingMessage, MessageId, MessageRef},
    media::{MediaAttachment, MediaKind},
};

pub fn to_incoming(msg: &Message) -> IncomingMessage {
    let r = message_ref(msg);
    IncomingMessage {
        chat_id: r.chat_id,
        message_id: r.message_id,
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        media: attachment(msg),
        has_voice: msg.voice().is_some(),
        reply_to: msg
            .reply_to_message()
            .map(|parent| Box::new(to_incoming(parent))),
    }
}

pub fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    }
}

/// Largest photo size, or the thumbnail of a video-like attachment.
fn attachment(msg: &Message) -> Option<MediaAttachment> {
    if let Some(photos) = msg.photo() {
        return Some(frame(MediaKind::Photo, photos.last()));
    }
    if let Some(video) = msg.video() {
        return Some(frame(MediaKind::Video, video.thumb.as_ref()));
    }
    if let Some(note) = msg.video_note() {
        return Some(frame(MediaKind::VideoNote, note.thumb.as_ref()));
    }
    if let Some(animation) = msg.animation() {
        return Some(frame(MediaKind::Animation, animation.thumb.as_ref()));
    }
    None
}

fn frame(kind: MediaKind, size: Option<&PhotoSize>) -> MediaAttachment {
    match size {
        Some(s) => MediaAttachment::new(kind, s.file.id.clone()),
        None => MediaAttachment::without_frame(kind),
    }
}

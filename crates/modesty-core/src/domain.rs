use crate::media::MediaAttachment;

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Messenger-agnostic view of an inbound message.
///
/// Only the parts moderation looks at are kept: text/caption, the visual
/// attachment (if any) and the replied-to message.
#[derive(Clone, Debug)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub media: Option<MediaAttachment>,
    /// Voice notes are not classified but still count as media for redirection.
    pub has_voice: bool,
    pub reply_to: Option<Box<IncomingMessage>>,
}

impl IncomingMessage {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id,
            message_id: self.message_id,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Text for text messages, caption for media messages.
    pub fn text_or_caption(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .unwrap_or("")
    }
}

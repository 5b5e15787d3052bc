//! Telegram adapter (teloxide).
//!
//! Implements the `modesty-core` messaging and media ports over the Telegram
//! Bot API and wires the moderation pipeline into a dispatcher.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode, utils::markdown};

pub mod convert;
pub mod handlers;
pub mod media;
pub mod router;

use modesty_core::{
    decision::Report,
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::PlatformAction(format!("telegram error: {e}"))
    }
}

/// MarkdownV2 body of a classification report.
pub fn render_report(report: &Report) -> String {
    markdown::code_block_with_lang(&report.to_string(), "yaml")
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.bot
            .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_report(&self, msg: MessageRef, report: &Report) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(msg.chat_id), render_report(report))
            .parse_mode(ParseMode::MarkdownV2)
            .reply_to_message_id(Self::tg_msg_id(msg.message_id))
            .allow_sending_without_reply(true)
            .disable_notification(true)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn reply_text(&self, msg: MessageRef, text: &str) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(msg.chat_id), text.to_string())
            .reply_to_message_id(Self::tg_msg_id(msg.message_id))
            .allow_sending_without_reply(true)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use modesty_core::classifier::Verdict;

    #[test]
    fn report_is_a_yaml_code_block() {
        let report = Report::new(
            &Verdict {
                is_nsfw: true,
                certainty: 0.95,
            },
            Duration::from_millis(250),
        );
        assert_eq!(
            render_report(&report),
            "```yaml\nnsfw: true\ncert: 0.950\ntook: 250ms\n```"
        );
    }
}

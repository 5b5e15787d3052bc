//! Telegram update handlers.
//!
//! Commands (`/start`, `/activate`) are answered directly; every other
//! message goes through the moderation pipeline.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use crate::router::AppState;

mod commands;
mod moderation;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(msg, state).await;
        }
    }

    moderation::handle_moderation(msg, state).await
}

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, error};

use crate::{convert::to_incoming, router::AppState};

/// Run a message through the moderation pipeline.
///
/// Internal failures are logged, never reported to the chat.
pub async fn handle_moderation(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let incoming = to_incoming(&msg);
    let chat_id = incoming.chat_id.0;
    let message_id = incoming.message_id.0;

    match state.moderator.handle(incoming, &state.shutdown).await {
        Ok(outcome) => {
            debug!(chat_id, message_id, ?outcome, "moderation finished");
        }
        Err(e) => {
            error!(chat_id, message_id, error = %e, "moderation failed");
        }
    }
    Ok(())
}

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{error, warn};

use modesty_core::{activation::activate, audit::AuditEvent};

use crate::{convert::message_ref, router::AppState};

const START_GREETING: &str = "modesty is virtue";

/// Commands this bot answers. Anything else parses as `None`.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Start,
    Activate { args: &'a str },
}

/// Parse `/name[@bot] [args]`; the bot suffix and name case are ignored.
fn parse_command(text: &str) -> Option<Command<'_>> {
    let body = text.trim().strip_prefix('/')?;
    let (head, args) = body
        .split_once(char::is_whitespace)
        .map_or((body, ""), |(h, a)| (h, a.trim()));
    let name = head.split_once('@').map_or(head, |(n, _)| n);

    if name.eq_ignore_ascii_case("start") {
        Some(Command::Start)
    } else if name.eq_ignore_ascii_case("activate") {
        Some(Command::Activate { args })
    } else {
        None
    }
}

pub async fn handle_command(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Other bots' commands are common in groups; stay quiet.
    let Some(cmd) = parse_command(text) else {
        return Ok(());
    };
    let target = message_ref(&msg);

    match cmd {
        Command::Start => {
            if let Err(e) = state.messenger.reply_text(target, START_GREETING).await {
                warn!(chat_id = target.chat_id.0, error = %e, "failed to greet");
            }
        }
        Command::Activate { args } => {
            match activate(
                state.store.as_ref(),
                state.messenger.as_ref(),
                target,
                args,
            )
            .await
            {
                Ok(Some(policy)) => {
                    if let Some(audit) = &state.audit {
                        if let Err(e) = audit.write(AuditEvent::activate(&policy)) {
                            warn!(error = %e, "failed to write audit event");
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!(chat_id = target.chat_id.0, error = %e, "activation failed");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_with_bot_suffix_keeps_args() {
        assert_eq!(
            parse_command("/Activate@modesty_bot 0.8 true   false"),
            Some(Command::Activate {
                args: "0.8 true   false"
            })
        );
    }

    #[test]
    fn bare_commands() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("  /activate  "), Some(Command::Activate { args: "" }));
    }

    #[test]
    fn foreign_commands_and_plain_text_are_ignored() {
        assert_eq!(parse_command("/help"), None);
        assert_eq!(parse_command("/startle"), None);
        assert_eq!(parse_command("activate 0.9"), None);
    }
}

//! `/activate <threshold> [commentsOnly] [debug]`: opting a chat into moderation.

use crate::{
    domain::{ChatId, MessageRef},
    messaging::port::MessagingPort,
    policy::{ChatPolicy, PolicyStore},
    Result,
};

pub const ACTIVATE_USAGE: &str = "usage: /activate 0.9";

/// Handle `/activate` sent as `msg`.
///
/// On bad arguments replies with [`ACTIVATE_USAGE`] and leaves the store
/// untouched. On success stores the policy (replacing any previous one) and
/// returns it; no reply is sent.
pub async fn activate(
    store: &dyn PolicyStore,
    messenger: &dyn MessagingPort,
    msg: MessageRef,
    args: &str,
) -> Result<Option<ChatPolicy>> {
    let Some(policy) = parse_activation(msg.chat_id, args) else {
        messenger.reply_text(msg, ACTIVATE_USAGE).await?;
        return Ok(None);
    };
    store.set(msg.chat_id, policy.clone()).await?;
    tracing::info!(
        chat_id = msg.chat_id.0,
        threshold = policy.threshold,
        comments_only = policy.comments_only,
        debug = policy.debug,
        "chat activated"
    );
    Ok(Some(policy))
}

/// Build the policy for `chat_id` from the command arguments (without the
/// command itself).
///
/// Returns `None` when the threshold is missing, unparsable or outside
/// `[0, 1]`. Malformed boolean flags are ignored and stay `false`.
pub fn parse_activation(chat_id: ChatId, args: &str) -> Option<ChatPolicy> {
    let mut fields = args.split_whitespace();

    let threshold = fields.next()?.parse::<f64>().ok()?;
    if !ChatPolicy::threshold_in_range(threshold) {
        return None;
    }

    let mut policy = ChatPolicy::new(chat_id, threshold);
    if let Some(comments_only) = fields.next().and_then(parse_bool) {
        policy.comments_only = comments_only;
    }
    if let Some(debug) = fields.next().and_then(parse_bool) {
        policy.debug = debug;
    }
    Some(policy)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::{decision::Report, domain::MessageId};

    #[derive(Default)]
    struct MemoryStore {
        policies: Mutex<HashMap<i64, ChatPolicy>>,
    }

    #[async_trait]
    impl PolicyStore for MemoryStore {
        async fn get(&self, chat_id: ChatId) -> Result<Option<ChatPolicy>> {
            Ok(self.policies.lock().unwrap().get(&chat_id.0).cloned())
        }

        async fn set(&self, chat_id: ChatId, policy: ChatPolicy) -> Result<()> {
            self.policies.lock().unwrap().insert(chat_id.0, policy);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Replies(Mutex<Vec<String>>);

    #[async_trait]
    impl MessagingPort for Replies {
        async fn delete_message(&self, _msg: MessageRef) -> Result<()> {
            Ok(())
        }

        async fn send_report(&self, _msg: MessageRef, _report: &Report) -> Result<()> {
            Ok(())
        }

        async fn reply_text(&self, _msg: MessageRef, text: &str) -> Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn command(chat: i64) -> MessageRef {
        MessageRef {
            chat_id: ChatId(chat),
            message_id: MessageId(1),
        }
    }

    #[tokio::test]
    async fn out_of_range_activation_replies_usage_and_keeps_store() {
        let store = MemoryStore::default();
        let replies = Replies::default();
        store
            .set(ChatId(5), ChatPolicy::new(ChatId(5), 0.4))
            .await
            .unwrap();

        for bad in ["1.5", "-0.1", ""] {
            let res = activate(&store, &replies, command(5), bad).await.unwrap();
            assert!(res.is_none());
        }

        assert_eq!(replies.0.lock().unwrap().len(), 3);
        assert!(replies.0.lock().unwrap().iter().all(|r| r == ACTIVATE_USAGE));
        assert_eq!(store.get(ChatId(5)).await.unwrap().unwrap().threshold, 0.4);
    }

    #[tokio::test]
    async fn valid_activation_stores_policy_silently() {
        let store = MemoryStore::default();
        let replies = Replies::default();

        let policy = activate(&store, &replies, command(6), "0.9")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(store.get(ChatId(6)).await.unwrap(), Some(policy));

        let stored = store.get(ChatId(6)).await.unwrap().unwrap();
        assert_eq!(stored.threshold, 0.9);
        assert!(!stored.comments_only);
        assert!(!stored.debug);
        assert!(replies.0.lock().unwrap().is_empty());
    }

    #[test]
    fn threshold_only_defaults_flags_to_false() {
        let p = parse_activation(ChatId(1), "0.9").unwrap();
        assert_eq!(p.threshold, 0.9);
        assert!(!p.comments_only);
        assert!(!p.debug);
    }

    #[test]
    fn rejects_out_of_range_and_garbage_thresholds() {
        for bad in ["1.5", "-0.1", "abc", "NaN", "inf", ""] {
            assert!(parse_activation(ChatId(1), bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(parse_activation(ChatId(1), "0").is_some());
        assert!(parse_activation(ChatId(1), "1").is_some());
    }

    #[test]
    fn flags_are_read_from_their_own_positions() {
        let p = parse_activation(ChatId(1), "0.7 true false").unwrap();
        assert!(p.comments_only);
        assert!(!p.debug);

        let p = parse_activation(ChatId(1), "0.7 0 T").unwrap();
        assert!(!p.comments_only);
        assert!(p.debug);
    }

    #[test]
    fn malformed_flags_are_ignored() {
        let p = parse_activation(ChatId(1), "0.7 yes maybe").unwrap();
        assert!(!p.comments_only);
        assert!(!p.debug);
    }
}

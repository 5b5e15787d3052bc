//! Per-chat moderation policies and their store.

use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{domain::ChatId, errors::Error, Result};

/// Moderation profile of a chat that opted in via `/activate`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatPolicy {
    #[serde(rename = "id")]
    pub chat_id: i64,
    /// Certainty at or above this deletes the message.
    pub threshold: f64,
    /// Only replies are moderated.
    #[serde(rename = "comments", default, skip_serializing_if = "is_false")]
    pub comments_only: bool,
    /// Report instead of delete.
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ChatPolicy {
    pub fn new(chat_id: ChatId, threshold: f64) -> Self {
        Self {
            chat_id: chat_id.0,
            threshold,
            comments_only: false,
            debug: false,
        }
    }

    pub fn threshold_in_range(threshold: f64) -> bool {
        (0.0..=1.0).contains(&threshold)
    }
}

/// Durable chat id → policy mapping.
///
/// `Ok(None)` means the chat is not moderated. Callers on the moderation path
/// treat lookup errors the same way.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<ChatPolicy>>;
    async fn set(&self, chat_id: ChatId, policy: ChatPolicy) -> Result<()>;
}

/// JSON-file backed store with an in-memory cache.
///
/// The file holds one object keyed by the chat id as a string. Every `set`
/// rewrites the file (temp file + rename) before the cache is updated.
pub struct JsonPolicyStore {
    path: PathBuf,
    cache: RwLock<HashMap<String, ChatPolicy>>,
}

impl JsonPolicyStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = load_policy_file(&path)?;
        tracing::info!(path = %path.display(), chats = cache.len(), "policy store opened");
        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    async fn persist(&self, data: &HashMap<String, ChatPolicy>) -> Result<()> {
        let txt = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, txt).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for JsonPolicyStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<ChatPolicy>> {
        Ok(self.cache.read().await.get(&chat_id.0.to_string()).cloned())
    }

    async fn set(&self, chat_id: ChatId, policy: ChatPolicy) -> Result<()> {
        if !ChatPolicy::threshold_in_range(policy.threshold) {
            return Err(Error::Config(format!(
                "threshold {} is outside [0, 1]",
                policy.threshold
            )));
        }

        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        next.insert(chat_id.0.to_string(), policy);
        self.persist(&next).await?;
        *cache = next;
        Ok(())
    }
}

fn load_policy_file(path: &std::path::Path) -> Result<HashMap<String, ChatPolicy>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let txt = std::fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(serde_json::from_str(&txt)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_chat_is_not_moderated() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonPolicyStore::open(dir.path().join("chats.json")).unwrap();
        assert_eq!(store.get(ChatId(-100)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = JsonPolicyStore::open(&path).unwrap();

        let mut policy = ChatPolicy::new(ChatId(-42), 0.8);
        policy.debug = true;
        store.set(ChatId(-42), policy.clone()).await.unwrap();
        assert_eq!(store.get(ChatId(-42)).await.unwrap(), Some(policy.clone()));

        let reopened = JsonPolicyStore::open(&path).unwrap();
        assert_eq!(reopened.get(ChatId(-42)).await.unwrap(), Some(policy));
    }

    #[tokio::test]
    async fn set_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = JsonPolicyStore::open(&path).unwrap();

        let mut first = ChatPolicy::new(ChatId(7), 0.5);
        first.comments_only = true;
        first.debug = true;
        store.set(ChatId(7), first).await.unwrap();

        let second = ChatPolicy::new(ChatId(7), 0.9);
        store.set(ChatId(7), second.clone()).await.unwrap();
        assert_eq!(store.get(ChatId(7)).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn out_of_range_threshold_is_rejected_at_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = JsonPolicyStore::open(&path).unwrap();

        assert!(store
            .set(ChatId(1), ChatPolicy::new(ChatId(1), 1.5))
            .await
            .is_err());
        assert!(store
            .set(ChatId(1), ChatPolicy::new(ChatId(1), f64::NAN))
            .await
            .is_err());
        assert_eq!(store.get(ChatId(1)).await.unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn file_format_omits_false_flags() {
        let policy = ChatPolicy::new(ChatId(5), 0.9);
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json, serde_json::json!({"id": 5, "threshold": 0.9}));

        let parsed: ChatPolicy =
            serde_json::from_str(r#"{"id":5,"threshold":0.3,"comments":true}"#).unwrap();
        assert!(parsed.comments_only);
        assert!(!parsed.debug);
    }

    #[test]
    fn stale_out_of_range_values_are_not_normalized_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.json");
        std::fs::write(&path, r#"{"3":{"id":3,"threshold":2.0}}"#).unwrap();

        let cache = load_policy_file(&path).unwrap();
        assert_eq!(cache["3"].threshold, 2.0);
    }

    #[tokio::test]
    async fn concurrent_sets_across_chats_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chats.json");
        let store = std::sync::Arc::new(JsonPolicyStore::open(&path).unwrap());

        let mut tasks = Vec::new();
        for id in 0..16i64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .set(ChatId(id), ChatPolicy::new(ChatId(id), 0.5))
                    .await
                    .unwrap();
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        let reopened = JsonPolicyStore::open(&path).unwrap();
        for id in 0..16i64 {
            assert!(reopened.get(ChatId(id)).await.unwrap().is_some());
        }
    }
}

//! Append-only log of moderation actions.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Utc;
use serde::Serialize;

use crate::{
    classifier::Verdict, domain::MessageRef, errors::Error, policy::ChatPolicy, Result,
};

const AUDIT_MAX_TEXT: usize = 500;

#[derive(Clone, Debug, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub event: String,
    pub chat_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certainty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditEvent {
    fn base(event: &str, chat_id: i64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            event: event.to_string(),
            chat_id,
            message_id: None,
            threshold: None,
            comments_only: None,
            debug: None,
            nsfw: None,
            certainty: None,
            redirected: None,
            error: None,
        }
    }

    pub fn activate(policy: &ChatPolicy) -> Self {
        Self {
            threshold: Some(policy.threshold),
            comments_only: Some(policy.comments_only),
            debug: Some(policy.debug),
            ..Self::base("activate", policy.chat_id)
        }
    }

    /// `deleted` picks between the `delete` and `report` event names.
    pub fn moderation(msg: MessageRef, verdict: &Verdict, deleted: bool, redirected: bool) -> Self {
        let event = if deleted { "delete" } else { "report" };
        Self {
            message_id: Some(msg.message_id.0),
            nsfw: Some(verdict.is_nsfw),
            certainty: Some(verdict.certainty),
            redirected: Some(redirected),
            ..Self::base(event, msg.chat_id.0)
        }
    }

    pub fn error(msg: MessageRef, error: &str) -> Self {
        Self {
            message_id: Some(msg.message_id.0),
            error: Some(error.to_string()),
            ..Self::base("error", msg.chat_id.0)
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditLogger {
    path: PathBuf,
    json: bool,
}

impl AuditLogger {
    pub fn new(path: impl Into<PathBuf>, json: bool) -> Self {
        Self {
            path: path.into(),
            json,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, mut event: AuditEvent) -> Result<()> {
        if let Some(s) = &event.error {
            event.error = Some(truncate_text(s, AUDIT_MAX_TEXT));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        if self.json {
            let line = serde_json::to_string(&event)?;
            writeln!(file, "{line}")?;
            return Ok(());
        }

        let mut out = String::new();
        out.push('\n');
        out.push_str(&"=".repeat(60));

        let value = serde_json::to_value(&event)?;
        let Some(obj) = value.as_object() else {
            return Err(Error::External(
                "audit event is not a JSON object".to_string(),
            ));
        };
        for (k, v) in obj {
            out.push('\n');
            out.push_str(k);
            out.push_str(": ");
            match v {
                serde_json::Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
        }
        out.push('\n');

        file.write_all(out.as_bytes())?;
        Ok(())
    }
}

pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}

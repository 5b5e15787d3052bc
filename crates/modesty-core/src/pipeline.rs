//! Per-message moderation pipeline.
//!
//! redirect → policy lookup/filter → resolve media (temp file acquired) →
//! classify → decide → delete/report → temp file released.
//!
//! The temp file is released exactly once on every path that acquired it.
//! Failures after acquisition are annotated with the resolution strategy tag
//! and joined with the release failure, if any.

use std::{future::Future, path::Path, sync::Arc};

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    audit::{AuditEvent, AuditLogger},
    classifier::Classifier,
    decision::{decide, is_eligible, Report},
    domain::IncomingMessage,
    errors::Error,
    media::MediaResolver,
    messaging::port::MessagingPort,
    policy::{ChatPolicy, PolicyStore},
    redirect::{is_evaluation_request, redirect},
    Result,
};

/// Strategy tag used when an evaluation request points at a message without
/// visual media.
const EVALUATION_STRATEGY: &str = "evaluation_request";

/// How a message left the pipeline without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Chat has no policy (or the lookup failed).
    NotModerated,
    /// Comments-only chat, message is not a reply.
    Filtered,
    /// Nothing visual to classify.
    NoMedia,
    /// Clean verdict, nothing sent.
    Passed,
    Reported { deleted: bool },
}

pub struct Moderator {
    store: Arc<dyn PolicyStore>,
    classifier: Arc<dyn Classifier>,
    resolver: Arc<dyn MediaResolver>,
    messenger: Arc<dyn MessagingPort>,
    audit: Option<Arc<AuditLogger>>,
}

impl Moderator {
    pub fn new(
        store: Arc<dyn PolicyStore>,
        classifier: Arc<dyn Classifier>,
        resolver: Arc<dyn MediaResolver>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            store,
            classifier,
            resolver,
            messenger,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Run one inbound message through the pipeline.
    ///
    /// `cancel` aborts in-flight network calls; the temp file is still released
    /// before this returns.
    pub async fn handle(
        &self,
        msg: IncomingMessage,
        cancel: &CancellationToken,
    ) -> Result<Outcome> {
        let (msg, redirected) = redirect(msg);
        let target = msg.message_ref();

        let res = self.run(&msg, redirected, cancel).await;
        if let (Err(e), Some(audit)) = (&res, &self.audit) {
            if let Err(ae) = audit.write(AuditEvent::error(target, &e.to_string())) {
                warn!(error = %ae, "failed to write audit event");
            }
        }
        res
    }

    async fn run(
        &self,
        msg: &IncomingMessage,
        redirected: bool,
        cancel: &CancellationToken,
    ) -> Result<Outcome> {
        let policy = match self.store.get(msg.chat_id).await {
            Ok(Some(p)) => p,
            Ok(None) => return Ok(Outcome::NotModerated),
            Err(e) => {
                warn!(chat_id = msg.chat_id.0, error = %e, "policy lookup failed, skipping");
                return Ok(Outcome::NotModerated);
            }
        };

        // A redirect only happens for replies, so the request itself passes.
        if !redirected && !is_eligible(&policy, msg) {
            debug!(chat_id = msg.chat_id.0, "comments-only chat, skipping non-reply");
            return Ok(Outcome::Filtered);
        }

        let Some(media) = msg.media.as_ref() else {
            if redirected {
                return Err(Error::MediaUnresolvable(
                    "replied-to message has no visual media".to_string(),
                )
                .at_stage(EVALUATION_STRATEGY, None));
            }
            return Ok(Outcome::NoMedia);
        };

        let strategy = media.kind.strategy();
        let temp = cancellable(cancel, self.resolver.resolve(media))
            .await
            .map_err(|e| e.at_stage(strategy, None))?;

        let res = self
            .moderate(msg, &policy, redirected, temp.path(), cancel)
            .await;
        let cleanup = temp.release().err();

        match (res, cleanup) {
            (Ok(outcome), None) => Ok(outcome),
            (Ok(_), Some(e)) => Err(Error::Cleanup(e).at_stage(strategy, None)),
            (Err(e), cleanup) => Err(e.at_stage(strategy, cleanup)),
        }
    }

    async fn moderate(
        &self,
        msg: &IncomingMessage,
        policy: &ChatPolicy,
        redirected: bool,
        image_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Outcome> {
        let image = tokio::fs::read(image_path).await?;
        if image.is_empty() {
            return Err(Error::MediaUnresolvable("media file is empty".to_string()));
        }

        let start = Instant::now();
        let verdict = cancellable(cancel, self.classifier.classify(&image)).await?;
        let took = start.elapsed();

        let decision = decide(&verdict, policy, is_evaluation_request(msg));
        if decision.is_noop() {
            debug!(
                chat_id = msg.chat_id.0,
                message_id = msg.message_id.0,
                certainty = verdict.certainty,
                "clean verdict"
            );
            return Ok(Outcome::Passed);
        }

        let target = msg.message_ref();
        if decision.delete {
            cancellable(cancel, self.messenger.delete_message(target)).await?;
        }
        cancellable(
            cancel,
            self.messenger
                .send_report(target, &Report::new(&verdict, took)),
        )
        .await?;

        info!(
            chat_id = target.chat_id.0,
            message_id = target.message_id.0,
            nsfw = verdict.is_nsfw,
            certainty = verdict.certainty,
            deleted = decision.delete,
            redirected,
            "moderated message"
        );
        if let Some(audit) = &self.audit {
            let ev = AuditEvent::moderation(target, &verdict, decision.delete, redirected);
            if let Err(e) = audit.write(ev) {
                warn!(error = %e, "failed to write audit event");
            }
        }

        Ok(Outcome::Reported {
            deleted: decision.delete,
        })
    }
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}

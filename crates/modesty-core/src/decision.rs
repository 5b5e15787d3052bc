//! Verdict + policy → delete / report / ignore.

use std::{fmt, time::Duration};

use crate::{classifier::Verdict, domain::IncomingMessage, policy::ChatPolicy};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Decision {
    pub delete: bool,
    pub report: bool,
}

impl Decision {
    pub fn is_noop(&self) -> bool {
        !self.delete && !self.report
    }
}

/// Whether `msg` is moderated at all under `policy`.
///
/// Checked before classification so comments-only chats never pay for
/// classifying top-level posts.
pub fn is_eligible(policy: &ChatPolicy, msg: &IncomingMessage) -> bool {
    !policy.comments_only || msg.is_reply()
}

/// Decide what to do with a classified message.
///
/// A clean verdict is ignored unless the message is an explicit evaluation
/// request, which always gets a report. Certainty equal to the threshold
/// deletes.
pub fn decide(verdict: &Verdict, policy: &ChatPolicy, evaluation_request: bool) -> Decision {
    if !verdict.is_nsfw && !evaluation_request {
        return Decision::default();
    }
    Decision {
        delete: !policy.debug && verdict.certainty >= policy.threshold,
        report: true,
    }
}

/// Body of the reply sent after classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Report {
    pub is_nsfw: bool,
    pub certainty: f64,
    pub took: Duration,
}

impl Report {
    pub fn new(verdict: &Verdict, took: Duration) -> Self {
        Self {
            is_nsfw: verdict.is_nsfw,
            certainty: verdict.certainty,
            took,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nsfw: {}\ncert: {:.3}\ntook: {:?}",
            self.is_nsfw, self.certainty, self.took
        )
    }
}

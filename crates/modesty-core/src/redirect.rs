//! Explicit re-evaluation requests: replying "nsfw?" to an older message makes
//! that message the one to moderate.

use crate::domain::IncomingMessage;

const TRIGGERS: [&str; 2] = ["nsfw", "нсфв"];

/// Appended to the caption of a message substituted by [`redirect`].
///
/// Contains a trigger token, so the substituted message is itself an
/// evaluation request for the decision step.
pub const EVALUATION_MARKER: &str = "#nsfw_request";

/// Case-insensitive trigger match on the text and caption of `msg`.
pub fn is_evaluation_request(msg: &IncomingMessage) -> bool {
    [msg.text.as_deref(), msg.caption.as_deref()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|s| TRIGGERS.iter().any(|t| s.contains(t)))
}

/// A message with any attachment is moderated on its own and never redirects.
fn carries_own_media(msg: &IncomingMessage) -> bool {
    msg.has_voice || msg.media.is_some()
}

/// Pick the message to moderate.
///
/// Returns the replied-to message (with [`EVALUATION_MARKER`] appended to its
/// caption) when `msg` is a reply without media of its own that carries a
/// trigger phrase; returns `msg` unchanged otherwise. The flag tells whether a
/// substitution happened.
pub fn redirect(mut msg: IncomingMessage) -> (IncomingMessage, bool) {
    if carries_own_media(&msg) || !is_evaluation_request(&msg) {
        return (msg, false);
    }
    let Some(parent) = msg.reply_to.take() else {
        return (msg, false);
    };

    let mut parent = *parent;
    parent.caption = Some(match parent.caption.take() {
        Some(c) if !c.is_empty() => format!("{c}\n{EVALUATION_MARKER}"),
        _ => EVALUATION_MARKER.to_string(),
    });
    (parent, true)
}

//! Messenger abstraction used by the moderation pipeline and command handlers.

pub mod port;

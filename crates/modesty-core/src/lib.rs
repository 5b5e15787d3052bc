//! Core domain + moderation pipeline for the modesty bot.
//!
//! This crate is framework-agnostic. Telegram and the classification service
//! live behind ports (traits) implemented in adapter crates.

pub mod activation;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod media;
pub mod messaging;
pub mod pipeline;
pub mod policy;
pub mod redirect;

pub use errors::{Error, Result};

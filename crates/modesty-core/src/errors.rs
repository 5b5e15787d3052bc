/// Core error type for the moderation bot.
///
/// Adapter crates map their specific errors (HTTP client, Telegram API) into
/// this type so the pipeline can annotate and log failures uniformly.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("media unresolvable: {0}")]
    MediaUnresolvable(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("platform action failed: {0}")]
    PlatformAction(String),

    #[error("cleanup failed: {0}")]
    Cleanup(std::io::Error),

    #[error("cancelled")]
    Cancelled,

    #[error("external error: {0}")]
    External(String),

    /// A pipeline failure annotated with the media-resolution strategy that was
    /// active, joined with the temp-file cleanup failure if one happened too.
    #[error("{strategy}: {source}{}", cleanup_suffix(.cleanup))]
    Stage {
        strategy: &'static str,
        source: Box<Error>,
        cleanup: Option<std::io::Error>,
    },
}

fn cleanup_suffix(cleanup: &Option<std::io::Error>) -> String {
    match cleanup {
        Some(e) => format!("; cleanup failed: {e}"),
        None => String::new(),
    }
}

impl Error {
    /// Wrap `self` with the strategy tag, merging an optional cleanup failure.
    ///
    /// A cleanup failure never replaces the primary error.
    pub fn at_stage(self, strategy: &'static str, cleanup: Option<std::io::Error>) -> Self {
        Error::Stage {
            strategy,
            source: Box::new(self),
            cleanup,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

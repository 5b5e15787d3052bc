use async_trait::async_trait;
use serde::Deserialize;

use crate::Result;

/// Classifier output for one image.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Verdict {
    #[serde(rename = "nsfw")]
    pub is_nsfw: bool,
    /// Service-defined magnitude; not guaranteed to be within `[0, 1]`.
    pub certainty: f64,
}

/// Port for the external content-classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify raw image bytes.
    async fn classify(&self, image: &[u8]) -> Result<Verdict>;

    /// Startup health probe. An error here is fatal.
    async fn healthy(&self) -> Result<()>;
}

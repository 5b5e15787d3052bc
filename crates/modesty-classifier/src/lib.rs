//! HTTP adapter for the NSFW classification service.
//!
//! `POST {endpoint}/v1/image_nsfw` with `{"image_data": "<base64>"}` answers
//! `{"nsfw": bool, "certainty": float}`; `GET {endpoint}/health` answers 200
//! when the model is loaded.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde::Serialize;

use modesty_core::{
    classifier::{Classifier, Verdict},
    errors::Error,
    Result,
};

const IMAGE_NSFW_PATH: &str = "/v1/image_nsfw";
const HEALTH_PATH: &str = "/health";

#[derive(Serialize)]
struct ClassifyRequest {
    image_data: String,
}

#[derive(Clone, Debug)]
pub struct HttpClassifier {
    endpoint: String,
    health_timeout: Duration,
    http: reqwest::Client,
}

impl HttpClassifier {
    /// No request timeout is set for classification; callers cancel through
    /// their own context. The health probe uses `health_timeout`.
    pub fn new(endpoint: impl Into<String>, health_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            health_timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &[u8]) -> Result<Verdict> {
        let body = ClassifyRequest {
            image_data: STANDARD.encode(image),
        };

        let resp = self
            .http
            .post(format!("{}{IMAGE_NSFW_PATH}", self.endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Classification(format!("request error: {e}")))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Classification(status.to_string()));
        }

        let verdict: Verdict = resp
            .json()
            .await
            .map_err(|e| Error::Classification(format!("malformed response: {e}")))?;

        tracing::debug!(
            nsfw = verdict.is_nsfw,
            certainty = verdict.certainty,
            bytes = image.len(),
            "classified image"
        );
        Ok(verdict)
    }

    async fn healthy(&self) -> Result<()> {
        let resp = self
            .http
            .get(format!("{}{HEALTH_PATH}", self.endpoint))
            .timeout(self.health_timeout)
            .send()
            .await
            .map_err(|e| Error::Classification(format!("health check error: {e}")))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::Classification(format!(
                "health check failed: {status}"
            )));
        }
        Ok(())
    }
}

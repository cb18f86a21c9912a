//! Photo verification seam.
//!
//! The server only knows the contract: an image and the subject it should
//! show go in, a match verdict comes out. Whatever model sits behind the
//! endpoint is someone else's concern.

use std::future::Future;
use std::pin::Pin;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("verifier answered with status {0}")]
    Status(u16),
}

pub struct PhotoCheck {
    pub image: Vec<u8>,
    pub subject: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhotoVerdict {
    pub matches: bool,
    #[serde(default)]
    pub confidence: f64,
}

pub trait PhotoVerifier: Send + Sync {
    fn verify<'a>(
        &'a self,
        check: &'a PhotoCheck,
    ) -> Pin<Box<dyn Future<Output = Result<PhotoVerdict, VerifyError>> + Send + 'a>>;
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    image: String,
    subject: &'a str,
}

/// Posts `{ image, subject }` as JSON and expects a [`PhotoVerdict`] back.
pub struct HttpPhotoVerifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPhotoVerifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl PhotoVerifier for HttpPhotoVerifier {
    fn verify<'a>(
        &'a self,
        check: &'a PhotoCheck,
    ) -> Pin<Box<dyn Future<Output = Result<PhotoVerdict, VerifyError>> + Send + 'a>> {
        Box::pin(async move {
            let body = VerifyRequest {
                image: STANDARD.encode(&check.image),
                subject: &check.subject,
            };

            let response = self.client.post(&self.endpoint).json(&body).send().await?;
            if !response.status().is_success() {
                return Err(VerifyError::Status(response.status().as_u16()));
            }

            Ok(response.json::<PhotoVerdict>().await?)
        })
    }
}

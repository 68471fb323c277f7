use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use super::message::WebhookPayload;

#[derive(Debug, Clone, Error)]
pub enum DispatchFailure {
    #[error("webhook request failed: {0}")]
    Transport(String),
    #[error("webhook responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Performs the single POST of a dispatch.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, url: &Url, payload: &WebhookPayload) -> Result<(), DispatchFailure>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, DispatchFailure> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .build()
            .map_err(|err| DispatchFailure::Transport(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn user_agent() -> &'static str {
        concat!("folio/", env!("CARGO_PKG_VERSION"))
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post(&self, url: &Url, payload: &WebhookPayload) -> Result<(), DispatchFailure> {
        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|err| DispatchFailure::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DispatchFailure::Status {
            status: status.as_u16(),
            body,
        })
    }
}

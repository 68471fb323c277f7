use std::sync::Arc;

use metrics::counter;
use time::OffsetDateTime;
use tracing::{error, info, warn};
use url::Url;

use super::{
    NotifyError,
    events::NotificationEvent,
    git::{CommitMetadata, RepositoryInspector},
    message::{MessageLinks, WebhookPayload, build_message, test_message},
    transport::{DispatchFailure, WebhookTransport},
};

const METRIC_SENT: &str = "folio_notifications_sent_total";
const METRIC_FAILED: &str = "folio_notifications_failed_total";

/// Formats notifications and posts them to the configured webhook.
///
/// The webhook URL is fixed at construction. A notifier without one reports
/// [`NotifyError::Configuration`] for every call and never touches the network.
#[derive(Clone)]
pub struct Notifier {
    webhook_url: Option<Url>,
    links: MessageLinks,
    transport: Arc<dyn WebhookTransport>,
    inspector: Arc<dyn RepositoryInspector>,
}

impl Notifier {
    pub fn new(
        webhook_url: Option<Url>,
        links: MessageLinks,
        transport: Arc<dyn WebhookTransport>,
        inspector: Arc<dyn RepositoryInspector>,
    ) -> Self {
        Self {
            webhook_url,
            links,
            transport,
            inspector,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Format `event` as an embed and post it once.
    pub async fn dispatch(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let url = self.require_url(event.name())?;
        event
            .validate()
            .and_then(|()| self.links.check(event))
            .inspect_err(|err| {
                record_failure(event.name(), "validation");
                warn!(
                    target = "folio::notify",
                    event = event.name(),
                    error = %err,
                    "notification rejected"
                );
            })?;

        let metadata = if event.is_deployment() {
            self.commit_metadata().await
        } else {
            CommitMetadata::unavailable()
        };

        let message = build_message(event, &metadata, &self.links, OffsetDateTime::now_utc());
        self.deliver(url, event.name(), &WebhookPayload::embed(message))
            .await
    }

    /// Forward free-form text as a plain `content` message.
    pub async fn relay(&self, content: &str) -> Result<(), NotifyError> {
        const EVENT: &str = "relay";

        let url = self.require_url(EVENT)?;
        if content.trim().is_empty() {
            record_failure(EVENT, "validation");
            return Err(NotifyError::Validation("message is required".to_string()));
        }

        let payload = WebhookPayload::Content {
            content: content.to_string(),
        };
        self.deliver(url, EVENT, &payload).await
    }

    /// Post a fixed test embed to check the webhook end to end.
    pub async fn send_test(&self) -> Result<(), NotifyError> {
        const EVENT: &str = "test";

        let url = self.require_url(EVENT)?;
        let payload = WebhookPayload::embed(test_message(OffsetDateTime::now_utc()));
        self.deliver(url, EVENT, &payload).await
    }

    fn require_url(&self, event: &'static str) -> Result<&Url, NotifyError> {
        self.webhook_url.as_ref().ok_or_else(|| {
            record_failure(event, "configuration");
            error!(
                target = "folio::notify",
                event,
                "webhook URL is not configured"
            );
            NotifyError::Configuration
        })
    }

    async fn commit_metadata(&self) -> CommitMetadata {
        let inspector = Arc::clone(&self.inspector);
        match tokio::task::spawn_blocking(move || CommitMetadata::gather(inspector.as_ref())).await
        {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!(
                    target = "folio::notify::git",
                    error = %err,
                    "commit metadata lookup did not complete; using placeholders"
                );
                CommitMetadata::unavailable()
            }
        }
    }

    async fn deliver(
        &self,
        url: &Url,
        event: &'static str,
        payload: &WebhookPayload,
    ) -> Result<(), NotifyError> {
        match self.transport.post(url, payload).await {
            Ok(()) => {
                counter!(METRIC_SENT, "event" => event).increment(1);
                info!(target = "folio::notify", event, "notification sent");
                Ok(())
            }
            Err(failure) => {
                let reason = match &failure {
                    DispatchFailure::Transport(_) => "transport",
                    DispatchFailure::Status { .. } => "status",
                };
                record_failure(event, reason);
                error!(
                    target = "folio::notify",
                    event,
                    error = %failure,
                    "notification dispatch failed"
                );
                Err(NotifyError::Dispatch(failure))
            }
        }
    }
}

fn record_failure(event: &'static str, reason: &'static str) {
    counter!(METRIC_FAILED, "event" => event, "reason" => reason).increment(1);
}

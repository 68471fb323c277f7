//! Webhook notifications: deployment lifecycle, new posts and contact form
//! submissions, each posted as a single embed.

mod events;
mod git;
mod message;
mod service;
mod transport;

use thiserror::Error;

pub use events::{ContactSubmission, NewPostDetails, NotificationEvent};
pub use git::{
    CommitMetadata, GitCli, MetadataField, MetadataUnavailable, PLACEHOLDER, RepositoryInspector,
};
pub use message::{
    EmbedField, MessageLinks, OutboundMessage, WebhookPayload, build_message, test_message,
};
pub use service::Notifier;
pub use transport::{DispatchFailure, ReqwestTransport, WebhookTransport};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook URL is not configured")]
    Configuration,
    #[error("notification is invalid: {0}")]
    Validation(String),
    #[error(transparent)]
    Dispatch(#[from] DispatchFailure),
}

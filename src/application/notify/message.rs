use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use super::{
    NotifyError,
    events::{ContactSubmission, NewPostDetails, NotificationEvent},
    git::CommitMetadata,
};

pub const COLOR_STARTED: u32 = 0x3498db;
pub const COLOR_SUCCEEDED: u32 = 0x2ecc71;
pub const COLOR_FAILED: u32 = 0xe74c3c;
pub const COLOR_NEW_POST: u32 = 0xf1c40f;
pub const COLOR_NEUTRAL: u32 = 0x7289da;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<bool>,
}

impl EmbedField {
    fn block(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: None,
        }
    }

    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self {
            inline: Some(true),
            ..Self::block(name, value)
        }
    }
}

/// One embed as posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    pub timestamp: String,
}

/// Request body of a webhook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WebhookPayload {
    Content { content: String },
    Embeds { embeds: Vec<OutboundMessage> },
}

impl WebhookPayload {
    pub fn embed(message: OutboundMessage) -> Self {
        Self::Embeds {
            embeds: vec![message],
        }
    }
}

/// Base URLs used when messages link back to commits or posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLinks {
    pub commit_base_url: Option<String>,
    pub post_base_url: Option<String>,
}

impl MessageLinks {
    pub fn new(commit_base_url: Option<String>, post_base_url: Option<String>) -> Self {
        let trim = |value: String| value.trim_end_matches('/').to_string();
        Self {
            commit_base_url: commit_base_url.map(trim),
            post_base_url: post_base_url.map(trim),
        }
    }

    /// New posts are announced with an absolute link, so they need a base URL.
    pub fn check(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        match event {
            NotificationEvent::NewPost(_) if self.post_base_url.is_none() => Err(
                NotifyError::Validation("post_base_url is required to link new posts".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

pub fn timestamp(now: OffsetDateTime) -> String {
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Build the embed for `event`. `metadata` is only read for deployment events.
/// Fields with a blank value are left out; chat webhooks reject them.
pub fn build_message(
    event: &NotificationEvent,
    metadata: &CommitMetadata,
    links: &MessageLinks,
    now: OffsetDateTime,
) -> OutboundMessage {
    let (title, description, color, mut fields) = match event {
        NotificationEvent::DeploymentStarted => (
            "🚀 Deployment Started",
            "A new deployment has been initiated.",
            COLOR_STARTED,
            deployment_fields(metadata, links),
        ),
        NotificationEvent::DeploymentSucceeded => (
            "✅ Deployment Successful",
            "The deployment has completed successfully.",
            COLOR_SUCCEEDED,
            deployment_fields(metadata, links),
        ),
        NotificationEvent::DeploymentFailed => (
            "❌ Deployment Failed",
            "The deployment has failed.",
            COLOR_FAILED,
            deployment_fields(metadata, links),
        ),
        NotificationEvent::NewPost(post) => (
            "🎉 New Blog Post Published",
            "A new blog post has been published.",
            COLOR_NEW_POST,
            new_post_fields(post, links),
        ),
        NotificationEvent::ContactFormSubmitted(contact) => (
            "📬 New Contact Form Submission",
            "Someone reached out through the contact form.",
            COLOR_NEUTRAL,
            contact_fields(contact),
        ),
    };
    fields.retain(|field| !field.value.trim().is_empty());

    OutboundMessage {
        title: title.to_string(),
        description: description.to_string(),
        color,
        fields,
        timestamp: timestamp(now),
    }
}

pub fn test_message(now: OffsetDateTime) -> OutboundMessage {
    OutboundMessage {
        title: "Webhook Test".to_string(),
        description: "This is a test message from folio.".to_string(),
        color: COLOR_NEUTRAL,
        fields: Vec::new(),
        timestamp: timestamp(now),
    }
}

fn deployment_fields(metadata: &CommitMetadata, links: &MessageLinks) -> Vec<EmbedField> {
    let commit = match &links.commit_base_url {
        Some(base) if metadata.commit_hash != super::git::PLACEHOLDER => format!(
            "[{hash}]({base}/{hash})",
            hash = metadata.commit_hash
        ),
        _ => metadata.commit_hash.clone(),
    };

    vec![
        EmbedField::inline("Branch", metadata.branch.as_str()),
        EmbedField::inline("Commit", commit),
        EmbedField::inline("Author", metadata.author.as_str()),
        EmbedField::block("Commit Message", metadata.commit_message.as_str()),
    ]
}

fn new_post_fields(post: &NewPostDetails, links: &MessageLinks) -> Vec<EmbedField> {
    let mut fields = vec![
        EmbedField::block("Title", post.title.trim()),
        EmbedField::block("Excerpt", post.excerpt.trim()),
    ];
    if let Some(base) = &links.post_base_url {
        fields.push(EmbedField::block(
            "Link",
            format!("[Read more]({base}/{})", post.slug.trim()),
        ));
    }
    fields
}

fn contact_fields(contact: &ContactSubmission) -> Vec<EmbedField> {
    vec![
        EmbedField::inline("Name", contact.name.trim()),
        EmbedField::inline("Email", contact.email.trim()),
        EmbedField::block("Message", contact.message.trim()),
    ]
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::datetime;

    use super::*;

    fn metadata() -> CommitMetadata {
        CommitMetadata {
            commit_hash: "abc1234".to_string(),
            commit_message: "Fix footer links".to_string(),
            branch: "main".to_string(),
            author: "Ada".to_string(),
        }
    }

    fn links() -> MessageLinks {
        MessageLinks::new(
            Some("https://github.com/example/site/commit/".to_string()),
            Some("https://example.com/blog".to_string()),
        )
    }

    const NOW: OffsetDateTime = datetime!(2024-05-01 12:30:00 UTC);

    #[test]
    fn deployment_started_serialises_as_embed() {
        let message = build_message(&NotificationEvent::DeploymentStarted, &metadata(), &links(), NOW);
        let payload = serde_json::to_value(WebhookPayload::embed(message)).expect("json");

        assert_eq!(
            payload,
            json!({
                "embeds": [{
                    "title": "🚀 Deployment Started",
                    "description": "A new deployment has been initiated.",
                    "color": 0x3498db,
                    "fields": [
                        { "name": "Branch", "value": "main", "inline": true },
                        {
                            "name": "Commit",
                            "value": "[abc1234](https://github.com/example/site/commit/abc1234)",
                            "inline": true
                        },
                        { "name": "Author", "value": "Ada", "inline": true },
                        { "name": "Commit Message", "value": "Fix footer links" }
                    ],
                    "timestamp": "2024-05-01T12:30:00Z"
                }]
            })
        );
    }

    #[test]
    fn deployment_outcomes_use_distinct_colours() {
        let success =
            build_message(&NotificationEvent::DeploymentSucceeded, &metadata(), &links(), NOW);
        let failure = build_message(&NotificationEvent::DeploymentFailed, &metadata(), &links(), NOW);

        assert_eq!(success.title, "✅ Deployment Successful");
        assert_eq!(success.color, COLOR_SUCCEEDED);
        assert_eq!(failure.title, "❌ Deployment Failed");
        assert_eq!(failure.color, COLOR_FAILED);
    }

    #[test]
    fn placeholder_commit_is_not_linked() {
        let message = build_message(
            &NotificationEvent::DeploymentStarted,
            &CommitMetadata::unavailable(),
            &links(),
            NOW,
        );
        assert!(message.fields.iter().all(|field| field.value == "N/A"));
    }

    #[test]
    fn new_post_links_to_the_post() {
        let event = NotificationEvent::NewPost(NewPostDetails {
            title: "Hello".to_string(),
            excerpt: "First words".to_string(),
            slug: "hello".to_string(),
        });
        let message = build_message(&event, &metadata(), &links(), NOW);

        assert_eq!(message.title, "🎉 New Blog Post Published");
        assert_eq!(message.color, COLOR_NEW_POST);
        assert_eq!(
            message.fields,
            vec![
                EmbedField::block("Title", "Hello"),
                EmbedField::block("Excerpt", "First words"),
                EmbedField::block("Link", "[Read more](https://example.com/blog/hello)"),
            ]
        );
    }

    #[test]
    fn new_post_without_excerpt_omits_the_blank_field() {
        let event = NotificationEvent::NewPost(NewPostDetails {
            title: "Hello".to_string(),
            excerpt: String::new(),
            slug: "hello".to_string(),
        });
        let message = build_message(&event, &metadata(), &links(), NOW);
        let payload = serde_json::to_value(&message).expect("json");

        assert_eq!(
            payload["fields"],
            json!([
                { "name": "Title", "value": "Hello" },
                { "name": "Link", "value": "[Read more](https://example.com/blog/hello)" }
            ])
        );
    }

    #[test]
    fn new_post_requires_a_post_base_url() {
        let event = NotificationEvent::NewPost(NewPostDetails {
            title: "Hello".to_string(),
            excerpt: "First words".to_string(),
            slug: "hello".to_string(),
        });

        assert!(links().check(&event).is_ok());
        assert!(matches!(
            MessageLinks::default().check(&event),
            Err(NotifyError::Validation(_))
        ));
        assert!(
            MessageLinks::default()
                .check(&NotificationEvent::DeploymentStarted)
                .is_ok()
        );
    }

    #[test]
    fn contact_submission_lists_sender() {
        let event = NotificationEvent::ContactFormSubmitted(ContactSubmission {
            name: " Ada ".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hi there".to_string(),
        });
        let message = build_message(&event, &metadata(), &MessageLinks::default(), NOW);

        assert_eq!(message.fields[0], EmbedField::inline("Name", "Ada"));
        assert_eq!(message.fields[2], EmbedField::block("Message", "Hi there"));
    }

    #[test]
    fn content_payload_and_test_message_shapes() {
        let content = serde_json::to_value(WebhookPayload::Content {
            content: "hi".to_string(),
        })
        .expect("json");
        assert_eq!(content, json!({ "content": "hi" }));

        let test = serde_json::to_value(test_message(NOW)).expect("json");
        assert_eq!(test["title"], "Webhook Test");
        assert_eq!(test["color"], 0x7289da);
        assert!(test.get("fields").is_none());
    }
}

use super::NotifyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPostDetails {
    pub title: String,
    pub excerpt: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Something worth telling the webhook channel about.
///
/// Deployment events carry no data of their own; branch, commit and author
/// are looked up from the working copy when the message is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    DeploymentStarted,
    DeploymentSucceeded,
    DeploymentFailed,
    NewPost(NewPostDetails),
    ContactFormSubmitted(ContactSubmission),
}

impl NotificationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeploymentStarted => "deployment_started",
            Self::DeploymentSucceeded => "deployment_succeeded",
            Self::DeploymentFailed => "deployment_failed",
            Self::NewPost(_) => "new_post",
            Self::ContactFormSubmitted(_) => "contact_form_submitted",
        }
    }

    pub fn is_deployment(&self) -> bool {
        matches!(
            self,
            Self::DeploymentStarted | Self::DeploymentSucceeded | Self::DeploymentFailed
        )
    }

    /// Reject events whose required fields are blank.
    pub fn validate(&self) -> Result<(), NotifyError> {
        match self {
            Self::NewPost(post) => {
                require("title", &post.title)?;
                require("slug", &post.slug)
            }
            Self::ContactFormSubmitted(contact) => {
                require("name", &contact.name)?;
                require("email", &contact.email)?;
                require("message", &contact.message)
            }
            _ => Ok(()),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), NotifyError> {
    if value.trim().is_empty() {
        return Err(NotifyError::Validation(format!("{field} is required")));
    }
    Ok(())
}

//! Repository traits describing content adapters.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{error::DomainError, pages::StaticPage, posts::BlogPost};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read `{path}`: {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed content in `{path}`: {source}", path = path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: DomainError,
    },
}

impl ContentError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, source: DomainError) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// All posts, newest first.
    async fn list_posts(&self) -> Result<Vec<BlogPost>, ContentError>;

    async fn find_post(&self, slug: &str) -> Result<Option<BlogPost>, ContentError>;

    async fn find_page(&self, slug: &str) -> Result<Option<StaticPage>, ContentError>;
}

//! Version-control metadata for deployment messages.

use std::{
    fmt,
    path::PathBuf,
    process::Command,
};

use thiserror::Error;
use tracing::warn;

/// Value used for any field that could not be looked up.
pub const PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataField {
    CommitHash,
    CommitMessage,
    Branch,
    Author,
}

impl MetadataField {
    fn git_args(self) -> &'static [&'static str] {
        match self {
            MetadataField::CommitHash => &["rev-parse", "--short", "HEAD"],
            MetadataField::CommitMessage => &["log", "-1", "--pretty=%B"],
            MetadataField::Branch => &["rev-parse", "--abbrev-ref", "HEAD"],
            MetadataField::Author => &["log", "-1", "--pretty=%an"],
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataField::CommitHash => "commit hash",
            MetadataField::CommitMessage => "commit message",
            MetadataField::Branch => "branch",
            MetadataField::Author => "author",
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("{field} unavailable: {reason}")]
pub struct MetadataUnavailable {
    pub field: MetadataField,
    pub reason: String,
}

/// Source of commit metadata. Lookups are blocking.
pub trait RepositoryInspector: Send + Sync {
    fn lookup(&self, field: MetadataField) -> Result<String, MetadataUnavailable>;
}

/// Asks the `git` executable about the repository at `workdir`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    workdir: Option<PathBuf>,
}

impl GitCli {
    pub fn new(program: impl Into<PathBuf>, workdir: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir,
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git", None)
    }
}

impl RepositoryInspector for GitCli {
    fn lookup(&self, field: MetadataField) -> Result<String, MetadataUnavailable> {
        let unavailable = |reason: String| MetadataUnavailable { field, reason };

        let mut command = Command::new(&self.program);
        command.args(field.git_args());
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|err| unavailable(format!("failed to run {}: {err}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(unavailable(format!(
                "git exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            return Err(unavailable("git printed nothing".to_string()));
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMetadata {
    pub commit_hash: String,
    pub commit_message: String,
    pub branch: String,
    pub author: String,
}

impl CommitMetadata {
    /// Look up every field, substituting [`PLACEHOLDER`] for those that fail.
    pub fn gather(inspector: &dyn RepositoryInspector) -> Self {
        let lookup = |field: MetadataField| match inspector.lookup(field) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    target = "folio::notify::git",
                    field = %field,
                    error = %err,
                    "commit metadata unavailable; using placeholder"
                );
                PLACEHOLDER.to_string()
            }
        };

        Self {
            commit_hash: lookup(MetadataField::CommitHash),
            commit_message: lookup(MetadataField::CommitMessage),
            branch: lookup(MetadataField::Branch),
            author: lookup(MetadataField::Author),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            commit_hash: PLACEHOLDER.to_string(),
            commit_message: PLACEHOLDER.to_string(),
            branch: PLACEHOLDER.to_string(),
            author: PLACEHOLDER.to_string(),
        }
    }
}

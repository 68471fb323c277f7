//! Blog posts as stored on disk: markdown bodies with a YAML front matter block.

use std::cmp::Ordering;

use serde::{Deserialize, de::DeserializeOwned};
use time::{Date, format_description::FormatItem, macros::format_description};

use super::error::DomainError;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
pub const ISO_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

const FRONT_MATTER_DELIMITER: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMetadata {
    pub title: String,
    pub published_at: Date,
    pub summary: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogPost {
    pub slug: String,
    pub metadata: PostMetadata,
    /// Markdown body with the front matter removed.
    pub content: String,
}

impl BlogPost {
    /// Build a post from the raw file contents. `slug` is usually the file stem.
    pub fn from_source(slug: impl Into<String>, source: &str) -> Result<Self, DomainError> {
        let slug = slug.into();
        let document = FrontMatter::split(source)?;
        let raw: RawPostMetadata = document.parse()?;

        let title = require("title", raw.title)?;
        let published_raw = require("publishedAt", raw.published_at)?;
        let published_at = parse_published_at(&published_raw)?;
        let summary = present(raw.summary).unwrap_or_default();
        let image = present(raw.image);

        Ok(Self {
            slug,
            metadata: PostMetadata {
                title,
                published_at,
                summary,
                image,
            },
            content: document.body,
        })
    }
}

/// Sort posts newest first. Posts sharing a date keep a stable title order so
/// listings do not shuffle between requests.
pub fn sort_newest_first(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| match b.metadata.published_at.cmp(&a.metadata.published_at) {
        Ordering::Equal => a.metadata.title.cmp(&b.metadata.title),
        other => other,
    });
}

/// Format a publication date as `January 1, 2024`, optionally followed by a
/// coarse relative age such as `(3d ago)`.
pub fn format_date(date: Date, today: Date, include_relative: bool) -> String {
    let full = date
        .format(HUMAN_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string());

    if !include_relative {
        return full;
    }

    format!("{full} ({})", relative_age(date, today))
}

fn relative_age(date: Date, today: Date) -> String {
    let years = today.year() - date.year();
    let months = i32::from(u8::from(today.month())) - i32::from(u8::from(date.month()));
    let days = i32::from(today.day()) - i32::from(date.day());

    if years > 0 {
        format!("{years}y ago")
    } else if months > 0 {
        format!("{months}mo ago")
    } else if days > 0 {
        format!("{days}d ago")
    } else {
        "Today".to_string()
    }
}

fn parse_published_at(raw: &str) -> Result<Date, DomainError> {
    // Timestamps such as `2024-01-01T09:30:00` only contribute their date.
    let date_part = raw.split('T').next().unwrap_or(raw).trim();
    Date::parse(date_part, ISO_DATE_FORMAT).map_err(|err| {
        DomainError::validation(format!("publishedAt `{raw}` is not a valid date: {err}"))
    })
}

/// The YAML block between two `---` lines at the top of a content file, and
/// the markdown that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub yaml: String,
    pub body: String,
}

impl FrontMatter {
    /// Split `source` into its front matter block and the remaining body.
    ///
    /// Files without a leading delimiter are all body. An opening delimiter
    /// without a closing one is malformed.
    pub fn split(source: &str) -> Result<Self, DomainError> {
        let trimmed = source.trim_start_matches('\u{feff}');
        let mut lines = trimmed.lines();

        match lines.next() {
            Some(first) if first.trim() == FRONT_MATTER_DELIMITER => {}
            _ => {
                return Ok(Self {
                    yaml: String::new(),
                    body: trimmed.to_string(),
                });
            }
        }

        let mut yaml = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line.trim() == FRONT_MATTER_DELIMITER {
                closed = true;
                break;
            }
            yaml.push(line);
        }

        if !closed {
            return Err(DomainError::validation(
                "front matter is missing its closing `---` line",
            ));
        }

        let body = lines.collect::<Vec<_>>().join("\n");

        Ok(Self {
            yaml: yaml.join("\n"),
            body: body.trim_start_matches('\n').to_string(),
        })
    }

    /// Deserialize the front matter block. An empty block yields `T::default()`.
    pub fn parse<T>(&self) -> Result<T, DomainError>
    where
        T: DeserializeOwned + Default,
    {
        if self.yaml.trim().is_empty() {
            return Ok(T::default());
        }

        serde_yaml::from_str(&self.yaml).map_err(|err| {
            DomainError::validation(format!("front matter is not valid YAML: {err}"))
        })
    }
}

/// Post front matter as written by authors.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPostMetadata {
    title: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    summary: Option<String>,
    image: Option<String>,
}

/// Trimmed value of an optional field; blank counts as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn require(field: &str, value: Option<String>) -> Result<String, DomainError> {
    present(value)
        .ok_or_else(|| DomainError::validation(format!("front matter field `{field}` is required")))
}

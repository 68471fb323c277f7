use serde::Deserialize;

use super::{
    error::DomainError,
    posts::{FrontMatter, present},
};

/// Identifier of a content file, as it appears in a URL path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContentSlug(String);

impl ContentSlug {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(DomainError::validation("slug must not be empty"));
        }
        if !raw
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || ch == '_')
        {
            return Err(DomainError::validation(format!(
                "slug `{raw}` may only contain a-z, 0-9, `-` and `_`"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A standalone page such as `about` or `portfolio`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticPage {
    pub slug: String,
    pub title: String,
    pub content: String,
}

impl StaticPage {
    /// Pages without a `title` field fall back to their capitalised slug.
    pub fn from_source(slug: impl Into<String>, source: &str) -> Result<Self, DomainError> {
        let slug = slug.into();
        let matter = FrontMatter::split(source)?;
        let raw: RawPageMetadata = matter.parse()?;
        let title = present(raw.title).unwrap_or_else(|| title_from_slug(&slug));

        Ok(Self {
            slug,
            title,
            content: matter.body,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPageMetadata {
    title: Option<String>,
}

fn title_from_slug(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

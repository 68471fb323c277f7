use std::sync::Arc;

use axum::http::StatusCode;

use crate::application::error::HttpError;
use crate::application::render::{Attributes, DocumentRenderer, RendererOverrides};
use crate::application::repos::{ContentError, ContentRepo};
use crate::presentation::views::PageView;

const SOURCE: &str = "application::page::PageService";

/// Slug of the page whose body introduces the home page.
pub const HOME_SLUG: &str = "home";

#[derive(Clone)]
pub struct PageService {
    content: Arc<dyn ContentRepo>,
    renderer: Arc<DocumentRenderer>,
}

impl PageService {
    pub fn new(content: Arc<dyn ContentRepo>, renderer: Arc<DocumentRenderer>) -> Self {
        Self { content, renderer }
    }

    pub async fn page_view(&self, slug: &str) -> Result<Option<PageView>, HttpError> {
        let page = self
            .content
            .find_page(slug)
            .await
            .map_err(|err| repo_failure("find_page", err))?;

        let Some(page) = page else {
            return Ok(None);
        };

        let attributes = Attributes::new().with("class", "prose");
        let rendered = self
            .renderer
            .render(&page.content, &RendererOverrides::new(), &attributes)?;

        Ok(Some(PageView {
            title: page.title,
            content_html: rendered.html,
        }))
    }

    /// Rendered home introduction; empty when no `home` page exists.
    pub async fn home_intro(&self) -> Result<String, HttpError> {
        Ok(self
            .page_view(HOME_SLUG)
            .await?
            .map(|view| view.content_html)
            .unwrap_or_default())
    }
}

fn repo_failure(operation: &'static str, err: ContentError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load page content",
        format!("{operation} failed: {err}"),
    )
}

use std::sync::Arc;

use axum::http::StatusCode;
use time::Date;

use crate::application::error::HttpError;
use crate::application::render::{Attributes, DocumentRenderer, RendererOverrides};
use crate::application::repos::{ContentError, ContentRepo};
use crate::domain::posts::{BlogPost, ISO_DATE_FORMAT, format_date};
use crate::presentation::views::{PostCard, PostDetailContext, TocEntry};

const SOURCE: &str = "application::blog::BlogService";
const PROSE_CLASS: &str = "prose";

#[derive(Clone)]
pub struct BlogService {
    content: Arc<dyn ContentRepo>,
    renderer: Arc<DocumentRenderer>,
}

impl BlogService {
    pub fn new(content: Arc<dyn ContentRepo>, renderer: Arc<DocumentRenderer>) -> Self {
        Self { content, renderer }
    }

    /// Newest posts first, truncated to `limit` when given.
    pub async fn post_cards(
        &self,
        limit: Option<usize>,
        today: Date,
    ) -> Result<Vec<PostCard>, HttpError> {
        let posts = self
            .content
            .list_posts()
            .await
            .map_err(|err| repo_failure("list_posts", err))?;

        let take = limit.unwrap_or(posts.len());
        Ok(posts
            .iter()
            .take(take)
            .map(|post| post_card(post, today))
            .collect())
    }

    pub async fn post_view(
        &self,
        slug: &str,
        today: Date,
    ) -> Result<Option<PostDetailContext>, HttpError> {
        let post = self
            .content
            .find_post(slug)
            .await
            .map_err(|err| repo_failure("find_post", err))?;

        let Some(post) = post else {
            return Ok(None);
        };

        let attributes = Attributes::new().with("class", PROSE_CLASS);
        let rendered = self
            .renderer
            .render(&post.content, &RendererOverrides::new(), &attributes)?;

        let toc = rendered
            .headings
            .iter()
            .filter(|heading| (2..=3).contains(&heading.level))
            .map(|heading| TocEntry {
                anchor: heading.slug.clone(),
                title: heading.text.clone(),
                level: heading.level,
            })
            .collect();

        let date = post.metadata.published_at;
        Ok(Some(PostDetailContext {
            slug: post.slug,
            title: post.metadata.title,
            summary: post.metadata.summary,
            image: post.metadata.image,
            published: format_date(date, today, true),
            iso_date: iso_date(date),
            content_html: rendered.html,
            toc,
        }))
    }
}

fn post_card(post: &BlogPost, today: Date) -> PostCard {
    let date = post.metadata.published_at;
    PostCard {
        slug: post.slug.clone(),
        title: post.metadata.title.clone(),
        summary: post.metadata.summary.clone(),
        iso_date: iso_date(date),
        published: format_date(date, today, false),
    }
}

fn iso_date(date: Date) -> String {
    date.format(ISO_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

fn repo_failure(operation: &'static str, err: ContentError) -> HttpError {
    HttpError::new(
        SOURCE,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to load blog content",
        format!("{operation} failed: {err}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pages::StaticPage;
    use async_trait::async_trait;
    use time::macros::date;

    struct StubContent {
        posts: Vec<BlogPost>,
    }

    #[async_trait]
    impl ContentRepo for StubContent {
        async fn list_posts(&self) -> Result<Vec<BlogPost>, ContentError> {
            Ok(self.posts.clone())
        }

        async fn find_post(&self, slug: &str) -> Result<Option<BlogPost>, ContentError> {
            Ok(self.posts.iter().find(|post| post.slug == slug).cloned())
        }

        async fn find_page(&self, _slug: &str) -> Result<Option<StaticPage>, ContentError> {
            Ok(None)
        }
    }

    struct BrokenContent;

    #[async_trait]
    impl ContentRepo for BrokenContent {
        async fn list_posts(&self) -> Result<Vec<BlogPost>, ContentError> {
            Err(ContentError::io(
                "content/posts",
                std::io::Error::other("unreadable"),
            ))
        }

        async fn find_post(&self, _slug: &str) -> Result<Option<BlogPost>, ContentError> {
            Ok(None)
        }

        async fn find_page(&self, _slug: &str) -> Result<Option<StaticPage>, ContentError> {
            Ok(None)
        }
    }

    fn post(slug: &str, published: &str, body: &str) -> BlogPost {
        let source = format!(
            "---\ntitle: {slug} title\npublishedAt: {published}\nsummary: About {slug}\n---\n{body}"
        );
        BlogPost::from_source(slug, &source).expect("valid post")
    }

    fn service(posts: Vec<BlogPost>) -> BlogService {
        BlogService::new(
            Arc::new(StubContent { posts }),
            Arc::new(DocumentRenderer::default()),
        )
    }

    #[tokio::test]
    async fn cards_respect_limit_and_format_dates() {
        let service = service(vec![
            post("newer", "2024-03-05", "body"),
            post("older", "2024-01-01", "body"),
        ]);

        let cards = service
            .post_cards(Some(1), date!(2024 - 06 - 01))
            .await
            .expect("cards");

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].slug, "newer");
        assert_eq!(cards[0].published, "March 5, 2024");
        assert_eq!(cards[0].iso_date, "2024-03-05");
    }

    #[tokio::test]
    async fn post_view_renders_prose_and_toc() {
        let service = service(vec![post(
            "hello",
            "2024-01-01",
            "# Hello\n\n## First Part\n\ntext\n\n### Detail\n\n#### Too deep\n",
        )]);

        let view = service
            .post_view("hello", date!(2024 - 01 - 04))
            .await
            .expect("render")
            .expect("post exists");

        assert!(view.content_html.starts_with("<div class=\"prose\">"));
        assert!(view.content_html.contains("<h2 id=\"first-part\">"));
        assert_eq!(view.published, "January 1, 2024 (3d ago)");
        let anchors: Vec<_> = view.toc.iter().map(|entry| entry.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["first-part", "detail"]);
    }

    #[tokio::test]
    async fn missing_post_is_none() {
        let service = service(Vec::new());
        let view = service
            .post_view("nope", date!(2024 - 01 - 01))
            .await
            .expect("lookup");
        assert!(view.is_none());
    }

    #[tokio::test]
    async fn repository_failure_maps_to_internal_error() {
        let service = BlogService::new(
            Arc::new(BrokenContent),
            Arc::new(DocumentRenderer::default()),
        );
        let err = service
            .post_cards(None, date!(2024 - 01 - 01))
            .await
            .expect_err("failure");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Failed to load blog content");
    }
}

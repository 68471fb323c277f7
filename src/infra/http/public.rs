use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    application::{
        blog::BlogService,
        chrome::ChromeService,
        error::ErrorReport,
        notify::{ContactSubmission, NotificationEvent, Notifier, NotifyError},
        page::PageService,
    },
    presentation::views::{
        BlogIndexContext, BlogIndexTemplate, ContactStatus, ContactTemplate, ContactView,
        HomeContext, IndexTemplate, LayoutChrome, LayoutContext, PageMetaView, PageTemplate,
        PostDetailContext, PostTemplate, render_not_found_response, render_template_response,
    },
};

const HOME_POST_LIMIT: usize = 5;
const CONTACT_SENT: &str = "Message sent successfully!";
const CONTACT_FAILED: &str = "Failed to send message. Please try again later.";

#[derive(Clone)]
pub struct HttpState {
    pub blog: Arc<BlogService>,
    pub pages: Arc<PageService>,
    pub chrome: Arc<ChromeService>,
    pub notifier: Arc<Notifier>,
}

fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

pub(super) async fn index(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load();

    let intro_html = match state.pages.home_intro().await {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    match state.blog.post_cards(Some(HOME_POST_LIMIT), today()).await {
        Ok(posts) => {
            let view = LayoutContext::new(chrome, HomeContext { intro_html, posts });
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => err.into_response(),
    }
}

pub(super) async fn blog_index(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load().with_page_title("Blog");

    match state.blog.post_cards(None, today()).await {
        Ok(posts) => {
            let view = LayoutContext::new(chrome, BlogIndexContext { posts });
            render_template_response(BlogIndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => err.into_response(),
    }
}

pub(super) async fn post_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Response {
    let chrome = state.chrome.load();

    match state.blog.post_view(&slug, today()).await {
        Ok(Some(content)) => {
            let meta = post_meta(&chrome, &content);
            let view = LayoutContext::new(LayoutChrome { meta, ..chrome }, content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn about(State(state): State<HttpState>) -> Response {
    static_page(&state, "about").await
}

pub(super) async fn portfolio(State(state): State<HttpState>) -> Response {
    static_page(&state, "portfolio").await
}

async fn static_page(state: &HttpState, slug: &str) -> Response {
    let chrome = state.chrome.load();

    match state.pages.page_view(slug).await {
        Ok(Some(content)) => {
            let chrome = chrome.with_page_title(&content.title);
            let view = LayoutContext::new(chrome, content);
            render_template_response(PageTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn contact_form(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load().with_page_title("Contact");
    let view = LayoutContext::new(chrome, ContactView::default());
    render_template_response(ContactTemplate { view }, StatusCode::OK)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct ContactForm {
    name: String,
    email: String,
    message: String,
}

pub(super) async fn contact_submit(
    State(state): State<HttpState>,
    Form(form): Form<ContactForm>,
) -> Response {
    const SOURCE: &str = "infra::http::public::contact_submit";

    let chrome = state.chrome.load().with_page_title("Contact");
    let event = NotificationEvent::ContactFormSubmitted(ContactSubmission {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        message: form.message.trim().to_string(),
    });

    match state.notifier.dispatch(&event).await {
        Ok(()) => {
            info!(target = "folio::http::contact", "contact message forwarded");
            let content = ContactView {
                status: Some(ContactStatus {
                    success: true,
                    message: CONTACT_SENT.to_string(),
                }),
                ..ContactView::default()
            };
            render_template_response(
                ContactTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                StatusCode::OK,
            )
        }
        Err(err) => {
            let status = match &err {
                NotifyError::Validation(_) => StatusCode::BAD_REQUEST,
                NotifyError::Configuration => StatusCode::SERVICE_UNAVAILABLE,
                NotifyError::Dispatch(_) => StatusCode::BAD_GATEWAY,
            };
            warn!(
                target = "folio::http::contact",
                error = %err,
                "contact message not forwarded"
            );
            let content = ContactView {
                name: form.name,
                email: form.email,
                message: form.message,
                status: Some(ContactStatus {
                    success: false,
                    message: CONTACT_FAILED.to_string(),
                }),
            };
            let mut response = render_template_response(
                ContactTemplate {
                    view: LayoutContext::new(chrome, content),
                },
                status,
            );
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            response
        }
    }
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub(super) async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.load())
}

fn post_meta(chrome: &LayoutChrome, post: &PostDetailContext) -> PageMetaView {
    let description = if post.summary.trim().is_empty() {
        chrome.meta.description.clone()
    } else {
        post.summary.clone()
    };

    PageMetaView {
        title: format!("{} | {}", post.title, chrome.brand.title),
        description,
    }
}

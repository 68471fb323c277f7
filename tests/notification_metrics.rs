use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use folio::application::{
    blog::BlogService,
    chrome::{ChromeService, SiteProfile},
    notify::{
        ContactSubmission, DispatchFailure, MessageLinks, MetadataField, MetadataUnavailable,
        NotificationEvent, Notifier, RepositoryInspector, WebhookPayload, WebhookTransport,
    },
    page::PageService,
    render::{Attributes, DocumentRenderer, RendererOverrides},
};
use folio::infra::{content::FsContentStore, http::HttpState};
use metrics_util::debugging::DebuggingRecorder;
use tower::ServiceExt;
use url::Url;

struct AcceptAll;

#[async_trait]
impl WebhookTransport for AcceptAll {
    async fn post(&self, _url: &Url, _payload: &WebhookPayload) -> Result<(), DispatchFailure> {
        Ok(())
    }
}

struct NoRepository;

impl RepositoryInspector for NoRepository {
    fn lookup(&self, field: MetadataField) -> Result<String, MetadataUnavailable> {
        Err(MetadataUnavailable {
            field,
            reason: "not a repository".to_string(),
        })
    }
}

fn notifier(webhook: Option<&str>) -> Notifier {
    Notifier::new(
        webhook.map(|raw| Url::parse(raw).expect("url")),
        MessageLinks::default(),
        Arc::new(AcceptAll),
        Arc::new(NoRepository),
    )
}

fn router() -> axum::Router {
    let content = Arc::new(FsContentStore::new("does-not-exist"));
    let renderer = Arc::new(DocumentRenderer::default());
    folio::infra::http::build_router(HttpState {
        blog: Arc::new(BlogService::new(content.clone(), renderer.clone())),
        pages: Arc::new(PageService::new(content, renderer)),
        chrome: Arc::new(ChromeService::new(SiteProfile {
            title: "Test".to_string(),
            owner: "Test".to_string(),
            description: String::new(),
            social: Vec::new(),
            source_url: None,
        })),
        notifier: Arc::new(notifier(None)),
    })
}

#[tokio::test]
async fn pipelines_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let configured = notifier(Some("https://chat.example/hook"));
    configured
        .dispatch(&NotificationEvent::DeploymentSucceeded)
        .await
        .expect("dispatch succeeds");

    let invalid = NotificationEvent::ContactFormSubmitted(ContactSubmission {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        message: String::new(),
    });
    assert!(configured.dispatch(&invalid).await.is_err());
    assert!(notifier(None).relay("hello").await.is_err());

    DocumentRenderer::default()
        .render("# Title", &RendererOverrides::new(), &Attributes::new())
        .expect("render");

    let request = Request::builder()
        .uri("/_health")
        .body(Body::empty())
        .expect("request should build");
    let response = router().oneshot(request).await.expect("router should respond");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let snapshot = snapshotter.snapshot().into_vec();
    let names: HashSet<String> = snapshot
        .iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        "folio_notifications_sent_total",
        "folio_notifications_failed_total",
        "folio_documents_rendered_total",
        "folio_http_requests_total",
        "folio_http_request_duration_seconds",
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }

    let failure_reasons: HashSet<String> = snapshot
        .iter()
        .filter(|(key, _, _, _)| key.key().name() == "folio_notifications_failed_total")
        .flat_map(|(key, _, _, _)| {
            key.key()
                .labels()
                .filter(|label| label.key() == "reason")
                .map(|label| label.value().to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(failure_reasons.contains("validation"));
    assert!(failure_reasons.contains("configuration"));

    let request_labels: HashSet<(String, String)> = snapshot
        .iter()
        .filter(|(key, _, _, _)| key.key().name() == "folio_http_requests_total")
        .flat_map(|(key, _, _, _)| {
            key.key()
                .labels()
                .map(|label| (label.key().to_string(), label.value().to_string()))
                .collect::<Vec<_>>()
        })
        .collect();
    assert!(request_labels.contains(&("area".to_string(), "health".to_string())));
    assert!(request_labels.contains(&("status".to_string(), "2xx".to_string())));
}

use std::time::Instant;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub(crate) const METRIC_REQUESTS: &str = "folio_http_requests_total";
pub(crate) const METRIC_DURATION: &str = "folio_http_request_duration_seconds";

#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let ctx = RequestContext {
        request_id: request_id.clone(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// Part of the site a request belongs to. Keeps metric labels bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteArea {
    Page,
    Relay,
    Asset,
    Health,
}

impl RouteArea {
    pub(crate) fn of(path: &str) -> Self {
        if path.starts_with("/api/") {
            Self::Relay
        } else if path.starts_with("/static/") || path == "/syntax.css" {
            Self::Asset
        } else if path == "/_health" {
            Self::Health
        } else {
            Self::Page
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Relay => "relay",
            Self::Asset => "asset",
            Self::Health => "health",
        }
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        _ => "5xx",
    }
}

/// Count and time every request; log failures with the diagnostic chain
/// attached by handlers.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let area = RouteArea::of(uri.path());
    let start = Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let status = response.status();
    let elapsed = start.elapsed();

    counter!(
        METRIC_REQUESTS,
        "area" => area.as_str(),
        "status" => status_class(status)
    )
    .increment(1);
    histogram!(METRIC_DURATION, "area" => area.as_str()).record(elapsed.as_secs_f64());

    let elapsed_ms = elapsed.as_millis();
    if !(status.is_client_error() || status.is_server_error()) {
        debug!(
            target = "folio::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            area = area.as_str(),
            elapsed_ms,
            request_id,
            "request served",
        );
        return response;
    }

    let (source, messages) = match response.extensions_mut().remove::<ErrorReport>() {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");

    if status.is_server_error() {
        error!(
            target = "folio::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            area = area.as_str(),
            elapsed_ms,
            source,
            detail,
            chain = ?messages,
            request_id,
            "request failed",
        );
    } else {
        warn!(
            target = "folio::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            area = area.as_str(),
            elapsed_ms,
            source,
            detail,
            chain = ?messages,
            request_id,
            "client request error",
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_map_to_areas() {
        assert_eq!(RouteArea::of("/api/notify"), RouteArea::Relay);
        assert_eq!(RouteArea::of("/static/site.css"), RouteArea::Asset);
        assert_eq!(RouteArea::of("/syntax.css"), RouteArea::Asset);
        assert_eq!(RouteArea::of("/_health"), RouteArea::Health);
        assert_eq!(RouteArea::of("/blog/hello"), RouteArea::Page);
        assert_eq!(RouteArea::of("/api"), RouteArea::Page);
    }

    #[test]
    fn statuses_group_by_class() {
        assert_eq!(status_class(StatusCode::NO_CONTENT), "2xx");
        assert_eq!(status_class(StatusCode::NOT_FOUND), "4xx");
        assert_eq!(status_class(StatusCode::BAD_GATEWAY), "5xx");
    }
}

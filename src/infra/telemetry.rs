use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_documents_rendered_total",
            Unit::Count,
            "Total number of markdown documents rendered to HTML."
        );
        describe_counter!(
            "folio_notifications_sent_total",
            Unit::Count,
            "Total number of webhook notifications delivered, by event."
        );
        describe_counter!(
            "folio_notifications_failed_total",
            Unit::Count,
            "Total number of webhook notifications that failed, by event and reason."
        );
        describe_counter!(
            "folio_http_requests_total",
            Unit::Count,
            "Total number of HTTP requests served, by site area and status class."
        );
        describe_histogram!(
            "folio_http_request_duration_seconds",
            Unit::Seconds,
            "Time spent serving HTTP requests, by site area."
        );
    });
}

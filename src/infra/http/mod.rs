mod api;
mod middleware;
mod public;

pub use api::RelayError;
pub use middleware::RequestContext;
pub use public::HttpState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::infra::assets;

/// Public site plus the JSON relay, wrapped in request-id and logging layers.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(public::index))
        .route("/blog", get(public::blog_index))
        .route("/blog/{slug}", get(public::post_detail))
        .route("/about", get(public::about))
        .route("/portfolio", get(public::portfolio))
        .route(
            "/contact",
            get(public::contact_form).post(public::contact_submit),
        )
        .route("/api/notify", post(api::relay_message))
        .route("/_health", get(public::health))
        .route("/syntax.css", get(assets::serve_syntax_css))
        .route("/static/{*path}", get(assets::serve_public))
        .fallback(public::fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

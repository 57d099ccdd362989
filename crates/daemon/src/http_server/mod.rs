//! HTTP surface of the document service.
//!
//! - `GET /document/:key` returns the document and its metadata
//! - `POST /document` stores a document under a generated key
//! - `POST /document/:key` stores a document under `key`
//! - `DELETE /document/:key` removes a document
//! - `GET /_status/{livez,readyz,version}` health probes
//!
//! Trailing slashes are trimmed before routing.

use axum::extract::{DefaultBodyLimit, Request};
use axum::routing::get;
use axum::Router;
use tower::Layer;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::service_config::Config;
use crate::ServiceState;

pub mod api;
pub mod health;

/// The routed service with trailing-slash normalization in front.
pub type App = NormalizePath<Router>;

pub fn router(state: ServiceState, config: &Config) -> Router {
    let router = Router::new()
        .merge(api::document::router(state.clone()))
        .route("/_status/livez", get(health::liveness::handler))
        .route("/_status/readyz", get(health::readiness::handler))
        .route("/_status/version", get(health::version::handler))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_size))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(CatchPanicLayer::new());

    let router = if config.gzip {
        router.layer(CompressionLayer::new())
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http())
}

/// Full application service; path normalization has to wrap the router
/// because it must run before route matching.
pub fn app(state: ServiceState, config: &Config) -> App {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, config))
}

pub fn into_make_service(app: App) -> axum::routing::IntoMakeService<App> {
    axum::ServiceExt::<Request>::into_make_service(app)
}

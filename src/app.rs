use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, get_service, post},
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use std::sync::Arc;

use crate::{config::Config, handler, service::EmailService};

pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        // Wildcard origins cannot be combined with credentials
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn build_router(service: Arc<EmailService>, cfg: &Config) -> Router {
    let index = cfg.static_dir.join("index.html");

    Router::new()
        .route("/", get_service(ServeFile::new(index)))
        .route("/api/health", get(handler::health_check))
        .route("/api/generate-email", post(handler::generate_email))
        .route("/api/send-email", post(handler::send_email))
        .route("/api-doc/openapi.json", get(handler::openapi_json))
        .fallback_service(ServeDir::new(&cfg.static_dir))
        .with_state(service)
        .layer(cors_layer(&cfg.cors_origins))
        .layer(TraceLayer::new_for_http())
}

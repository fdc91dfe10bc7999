//! Origin policy for HTTP and WebSocket requests

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{headers::Origin, TypedHeader};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app::AppState;
use crate::config::Config;

/// CORS for plain HTTP routes: anything in development, only the public
/// base URL in production
pub fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if !config.is_production() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = config
        .public_base_url
        .iter()
        .filter_map(|url| url.parse::<HeaderValue>().ok())
        .collect();
    cors.allow_origin(allowed)
}

/// Whether a request carrying `origin` may open a game connection
pub fn origin_allowed(config: &Config, origin: Option<&str>) -> bool {
    if !config.is_production() {
        return true;
    }

    match (origin, config.public_base_url.as_deref()) {
        // Non-browser clients send no Origin header
        (None, _) => true,
        (Some(origin), Some(allowed)) => origin.trim_end_matches('/') == allowed,
        (Some(_), None) => false,
    }
}

/// Origin rejection
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("Origin not allowed: {0}")]
    Forbidden(String),
}

impl IntoResponse for OriginError {
    fn into_response(self) -> Response {
        (StatusCode::FORBIDDEN, self.to_string()).into_response()
    }
}

/// Middleware rejecting game connections from disallowed origins
pub async fn require_allowed_origin(
    State(state): State<AppState>,
    origin: Option<TypedHeader<Origin>>,
    request: Request,
    next: Next,
) -> Result<Response, OriginError> {
    let origin = origin.map(|TypedHeader(origin)| origin.to_string());

    if !origin_allowed(&state.config, origin.as_deref()) {
        let origin = origin.unwrap_or_default();
        warn!(origin = %origin, "Rejected connection from disallowed origin");
        return Err(OriginError::Forbidden(origin));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn config(environment: Environment, base: Option<&str>) -> Config {
        Config {
            server_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "info".into(),
            environment,
            public_base_url: base.map(str::to_string),
        }
    }

    #[test]
    fn development_allows_everything() {
        let dev = config(Environment::Development, None);
        assert!(origin_allowed(&dev, Some("http://localhost:5173")));
        assert!(origin_allowed(&dev, None));
    }

    #[test]
    fn production_allows_only_public_base_url() {
        let prod = config(Environment::Production, Some("https://arena.example.com"));
        assert!(origin_allowed(&prod, Some("https://arena.example.com")));
        assert!(!origin_allowed(&prod, Some("https://evil.example.com")));
        assert!(origin_allowed(&prod, None));
    }

    #[test]
    fn production_without_base_url_rejects_browsers() {
        let prod = config(Environment::Production, None);
        assert!(!origin_allowed(&prod, Some("https://arena.example.com")));
        assert!(origin_allowed(&prod, None));
    }
}

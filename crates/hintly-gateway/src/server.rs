// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware as axum_middleware,
    routing::{get, post},
};
use hintly_config::model::ServerConfig;
use hintly_core::HintlyError;
use hintly_core::traits::AuthAdapter;
use hintly_tutor::ConversationOrchestrator;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub auth: Arc<dyn AuthAdapter>,
}

/// Build the application router.
///
/// - GET /health (public)
/// - POST /query, GET /sessions, GET /sessions/{session_id}, GET /me (bearer auth)
pub fn build_router(config: &ServerConfig, state: GatewayState) -> Result<Router, HintlyError> {
    let public_routes = Router::new().route("/health", get(handlers::get_health));

    let api_routes = Router::new()
        .route("/query", post(handlers::post_query))
        .route("/sessions", get(handlers::get_sessions))
        .route("/sessions/{session_id}", get(handlers::get_session_history))
        .route("/me", get(handlers::get_me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Ok(Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http()))
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, HintlyError> {
    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o)
                .map_err(|e| HintlyError::Config(format!("invalid CORS origin '{o}': {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]))
}

/// Bind to the configured host:port and serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), HintlyError> {
    let app = build_router(config, state)?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HintlyError::Config(format!("failed to bind to {addr}: {e}")))?;

    tracing::info!("API server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| HintlyError::Internal(format!("server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_origin_is_a_config_error() {
        let err = cors_layer(&["http://ok.example".into(), "bad\norigin".into()]).unwrap_err();
        assert!(matches!(err, HintlyError::Config(_)), "{err}");
    }
}

// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token authentication for the API.
//!
//! Tokens are static and come from the `[[auth.users]]` config entries.
//! With no users configured every request is rejected.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hintly_config::model::AuthConfig;
use hintly_core::traits::{AuthAdapter, PluginAdapter};
use hintly_core::types::{AdapterType, AuthIdentity, AuthToken, HealthStatus};
use hintly_core::HintlyError;

use crate::handlers::ApiError;

/// Maps configured API tokens to user ids.
pub struct StaticTokenAuth {
    users_by_token: HashMap<String, String>,
}

impl StaticTokenAuth {
    pub fn new<I, U, T>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, T)>,
        U: Into<String>,
        T: Into<String>,
    {
        Self {
            users_by_token: users
                .into_iter()
                .map(|(user, token)| (token.into(), user.into()))
                .collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config
                .users
                .iter()
                .map(|u| (u.user_id.clone(), u.token.clone())),
        )
    }
}

impl std::fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAuth")
            .field("users", &self.users_by_token.len())
            .finish()
    }
}

#[async_trait]
impl PluginAdapter for StaticTokenAuth {
    fn name(&self) -> &str {
        "static-token"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Auth
    }

    async fn health_check(&self) -> Result<HealthStatus, HintlyError> {
        Ok(if self.users_by_token.is_empty() {
            HealthStatus::Degraded("no API users configured".into())
        } else {
            HealthStatus::Healthy
        })
    }

    async fn shutdown(&self) -> Result<(), HintlyError> {
        Ok(())
    }
}

#[async_trait]
impl AuthAdapter for StaticTokenAuth {
    async fn authenticate(&self, token: AuthToken) -> Result<AuthIdentity, HintlyError> {
        self.users_by_token
            .get(&token.0)
            .map(|user_id| AuthIdentity {
                user_id: user_id.clone(),
            })
            .ok_or_else(|| HintlyError::Unauthorized("invalid API token".into()))
    }
}

/// Middleware that resolves the bearer token to an [`AuthIdentity`] and
/// stores it in the request extensions.
pub async fn auth_middleware(
    State(auth): State<Arc<dyn AuthAdapter>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let Some(token) = token else {
        return ApiError::from(HintlyError::Unauthorized("missing bearer token".into()))
            .into_response();
    };

    match auth.authenticate(AuthToken(token)).await {
        Ok(identity) => {
            tracing::debug!(user_id = %identity.user_id, "request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

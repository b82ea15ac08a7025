// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for the Hintly tutoring backend.
//!
//! Exposes the orchestrator over axum with bearer token authentication and a
//! CORS allow-list for the web front-end.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{StaticTokenAuth, auth_middleware};
pub use handlers::{ApiError, ErrorResponse};
pub use server::{GatewayState, build_router, start_server};

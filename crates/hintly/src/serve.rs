// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `hintly serve` implementation.
//!
//! Wires storage, the Gemini provider, the optional classifier, token auth
//! and the orchestrator together, then serves the HTTP API until SIGINT or
//! SIGTERM.

use std::sync::Arc;

use hintly_classifier::HttpClassifier;
use hintly_config::HintlyConfig;
use hintly_config::model::LoggingConfig;
use hintly_core::traits::{AuthAdapter, ClassifierAdapter, PluginAdapter, StorageAdapter};
use hintly_core::{HealthStatus, HintlyError};
use hintly_gateway::{GatewayState, StaticTokenAuth};
use hintly_gemini::GeminiProvider;
use hintly_storage::SqliteStorage;
use hintly_tutor::{ConversationOrchestrator, TutorSettings};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// Runs the server until a shutdown signal arrives.
pub async fn run_serve(config: HintlyConfig) -> Result<(), HintlyError> {
    let _log_guard = init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting hintly");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;
    info!(path = %config.storage.database_path, "storage initialized");

    let generator = Arc::new(GeminiProvider::new(&config.gemini)?);
    if let HealthStatus::Unhealthy(reason) = generator.health_check().await? {
        warn!(%reason, "generation provider unavailable, turns will fail until configured");
    }

    let classifier: Option<Arc<dyn ClassifierAdapter>> = match HttpClassifier::from_config(&config.classifier)? {
        Some(classifier) => Some(Arc::new(classifier)),
        None => {
            info!("no classifier endpoint configured, frustration fusion disabled");
            None
        }
    };

    let auth: Arc<dyn AuthAdapter> = Arc::new(StaticTokenAuth::from_config(&config.auth));
    if let HealthStatus::Degraded(reason) = auth.health_check().await? {
        warn!(%reason, "every API request will be rejected");
    }

    let orchestrator = Arc::new(ConversationOrchestrator::new(
        generator,
        classifier,
        storage.clone(),
        TutorSettings::from_config(&config),
    ));

    let state = GatewayState { orchestrator, auth };
    let result = hintly_gateway::start_server(&config.server, state, shutdown_signal()).await;

    if let Err(e) = storage.close().await {
        warn!(error = %e, "failed to close storage cleanly");
    }
    info!("hintly stopped");
    result
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
        _ = terminate => info!("received SIGTERM, initiating shutdown"),
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. With a log directory, events
/// also go to a daily rolling `api.log.YYYY-MM-DD`; the returned guard
/// flushes that file and must be held until exit.
fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>, HintlyError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&logging.level)));

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|e| {
                HintlyError::Config(format!("cannot create log directory {directory}: {e}"))
            })?;
            let appender = tracing_appender::rolling::daily(directory, "api.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| HintlyError::Internal(format!("failed to install tracing subscriber: {e}")))?;

    Ok(guard)
}

fn default_directives(level: &str) -> String {
    // Target directives match by prefix, so `hintly` also covers `hintly_tutor` etc.
    format!("hintly={level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn default_filter_uses_configured_level() {
        let directives = default_directives("debug");
        assert_eq!(directives, "hintly=debug,warn");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}

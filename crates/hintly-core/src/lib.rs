// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Hintly tutoring backend.
//!
//! This crate provides the trait definitions, error type, and domain types
//! shared by every other crate in the workspace. Collaborators (generation,
//! classification, storage, auth) implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::HintlyError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{
    AuthAdapter, ClassifierAdapter, GenerationAdapter, PluginAdapter, StorageAdapter,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hintly_error_messages_are_descriptive() {
        let forbidden = HintlyError::Forbidden {
            session_id: "abc".into(),
        };
        assert_eq!(
            forbidden.to_string(),
            "session abc does not belong to the requesting user"
        );

        let provider = HintlyError::provider("quota exhausted");
        assert_eq!(provider.to_string(), "provider error: quota exhausted");

        let storage = HintlyError::storage(std::io::Error::other("disk full"));
        assert_eq!(storage.to_string(), "storage error: disk full");

        let timeout = HintlyError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        assert!(timeout.to_string().contains("30s"));
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [
            AdapterType::Generation,
            AdapterType::Classifier,
            AdapterType::Storage,
            AdapterType::Auth,
        ] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn health_status_variants() {
        assert_eq!(HealthStatus::Healthy, HealthStatus::Healthy);
        assert_ne!(HealthStatus::Degraded("slow".into()), HealthStatus::Healthy);
        assert_ne!(HealthStatus::Unhealthy("down".into()), HealthStatus::Healthy);
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_generation_adapter<T: GenerationAdapter>() {}
        fn _assert_classifier_adapter<T: ClassifierAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_auth_adapter<T: AuthAdapter>() {}
    }
}

// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators the tutor depends on.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod auth;
pub mod classifier;
pub mod generation;
pub mod storage;

pub use adapter::PluginAdapter;
pub use auth::AuthAdapter;
pub use classifier::ClassifierAdapter;
pub use generation::GenerationAdapter;
pub use storage::StorageAdapter;

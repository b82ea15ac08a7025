// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Hintly tutoring backend.
//!
//! WAL-mode SQLite with embedded migrations and a single-writer model via
//! `tokio-rusqlite`. Sessions and messages are only ever appended or
//! touched through [`queries::turns::commit_turn`], which writes a whole
//! turn in one transaction.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

#[cfg(test)]
mod testing;

pub use adapter::SqliteStorage;
pub use database::Database;

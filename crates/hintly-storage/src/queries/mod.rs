// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules for each storage entity.

pub mod messages;
pub mod sessions;
pub mod turns;

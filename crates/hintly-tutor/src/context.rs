// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text assembly for the user turn and the conversation sent to the model.

use hintly_core::types::{Message, Role, SyntaxDiagnostic};

/// The stored content of a user turn.
///
/// The code section is omitted for blank code.
pub fn format_user_turn(problem: &str, code: &str) -> String {
    if code.trim().is_empty() {
        format!("Problem:\n{problem}")
    } else {
        format!("Code:\n{code}\n\nProblem:\n{problem}")
    }
}

/// Append a `Syntax Errors:` block describing `diagnostic`.
pub fn with_syntax_errors(turn: &str, diagnostic: Option<&SyntaxDiagnostic>) -> String {
    let Some(d) = diagnostic else {
        return turn.to_string();
    };
    let mut block = format!("{turn}\n\nSyntax Errors:\nLine {}", d.lineno);
    if let Some(col) = d.col {
        block.push_str(&format!(", column {col}"));
    }
    block.push_str(&format!(": {}", d.msg));
    if let Some(text) = d.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        block.push_str(&format!("\n    {text}"));
    }
    block
}

/// Prior messages in order, followed by the new user turn.
pub fn build_conversation(history: &[Message], current_turn: &str) -> String {
    if history.is_empty() {
        return current_turn.to_string();
    }
    let previous = history
        .iter()
        .map(|m| match m.role {
            Role::User => format!("User: {}", m.content),
            Role::Assistant => format!("Assistant: {}", m.content),
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{previous}\n\nUser: {current_turn}")
}

// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static syntax check of submitted Python code.
//!
//! The diagnostic is informational: it is stored with the user message and
//! shown to the model, never used to reject a request. Parsing follows the
//! CPython grammar, so indentation errors and Python 2 statements are
//! reported. Assignment targets are checked after parsing, as CPython does
//! before compiling.

use hintly_core::types::SyntaxDiagnostic;
use rustpython_parser::text_size::TextRange;
use rustpython_parser::{Mode, ast, parse};

/// Parse `source` and describe the first syntax error, if any.
pub fn diagnose(source: &str) -> Option<SyntaxDiagnostic> {
    if source.trim().is_empty() {
        return None;
    }

    let module = match parse(source, Mode::Module, "<string>") {
        Ok(ast::Mod::Module(module)) => module,
        Ok(_) => return None,
        Err(err) => {
            let offset = usize::from(err.offset);
            let (lineno, col) = position(source, offset);
            return Some(SyntaxDiagnostic {
                msg: err.error.to_string(),
                lineno,
                col: Some(col),
                end_line: Some(lineno),
                end_col: Some(col),
                text: line_text(source, offset),
            });
        }
    };

    let (msg, range) = check_block(&module.body)?;
    let start = usize::from(range.start());
    let end = usize::from(range.end());
    let (lineno, col) = position(source, start);
    let (end_line, end_col) = position(source, end);
    Some(SyntaxDiagnostic {
        msg,
        lineno,
        col: Some(col),
        end_line: Some(end_line),
        end_col: Some(end_col),
        text: line_text(source, start),
    })
}

type Violation = (String, TextRange);

fn check_block(body: &[ast::Stmt]) -> Option<Violation> {
    body.iter().find_map(check_stmt)
}

fn check_stmt(stmt: &ast::Stmt) -> Option<Violation> {
    use ast::Stmt;

    match stmt {
        Stmt::Assign(s) => s
            .targets
            .iter()
            .find_map(|t| invalid_target(t, "assign to", s.range)),
        Stmt::AugAssign(s) => single_target(&s.target, "augmented assignment", s.range),
        Stmt::AnnAssign(s) => single_target(&s.target, "annotated assignment", s.range),
        Stmt::Delete(s) => s
            .targets
            .iter()
            .find_map(|t| invalid_target(t, "delete", s.range)),
        Stmt::For(s) => invalid_target(&s.target, "assign to", s.range)
            .or_else(|| check_block(&s.body))
            .or_else(|| check_block(&s.orelse)),
        Stmt::AsyncFor(s) => invalid_target(&s.target, "assign to", s.range)
            .or_else(|| check_block(&s.body))
            .or_else(|| check_block(&s.orelse)),
        Stmt::With(s) => with_targets(&s.items, s.range).or_else(|| check_block(&s.body)),
        Stmt::AsyncWith(s) => with_targets(&s.items, s.range).or_else(|| check_block(&s.body)),
        Stmt::FunctionDef(s) => check_block(&s.body),
        Stmt::AsyncFunctionDef(s) => check_block(&s.body),
        Stmt::ClassDef(s) => check_block(&s.body),
        Stmt::While(s) => check_block(&s.body).or_else(|| check_block(&s.orelse)),
        Stmt::If(s) => check_block(&s.body).or_else(|| check_block(&s.orelse)),
        Stmt::Match(s) => s.cases.iter().find_map(|case| check_block(&case.body)),
        Stmt::Try(s) => check_block(&s.body)
            .or_else(|| check_handlers(&s.handlers))
            .or_else(|| check_block(&s.orelse))
            .or_else(|| check_block(&s.finalbody)),
        Stmt::TryStar(s) => check_block(&s.body)
            .or_else(|| check_handlers(&s.handlers))
            .or_else(|| check_block(&s.orelse))
            .or_else(|| check_block(&s.finalbody)),
        _ => None,
    }
}

fn check_handlers(handlers: &[ast::ExceptHandler]) -> Option<Violation> {
    handlers.iter().find_map(|handler| match handler {
        ast::ExceptHandler::ExceptHandler(h) => check_block(&h.body),
    })
}

fn with_targets(items: &[ast::WithItem], range: TextRange) -> Option<Violation> {
    items
        .iter()
        .filter_map(|item| item.optional_vars.as_deref())
        .find_map(|target| invalid_target(target, "assign to", range))
}

/// Targets of `=`, `del`, `for` and `with ... as`. `fallback` locates
/// expressions whose own range is not matched here.
fn invalid_target(expr: &ast::Expr, verb: &str, fallback: TextRange) -> Option<Violation> {
    use ast::Expr;

    match expr {
        Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => None,
        Expr::Starred(e) => invalid_target(&e.value, verb, e.range),
        Expr::Tuple(e) => e.elts.iter().find_map(|elt| invalid_target(elt, verb, e.range)),
        Expr::List(e) => e.elts.iter().find_map(|elt| invalid_target(elt, verb, e.range)),
        Expr::Constant(e) => Some((format!("cannot {verb} literal"), e.range)),
        Expr::Call(e) => Some((format!("cannot {verb} function call"), e.range)),
        _ => Some((format!("cannot {verb} expression"), fallback)),
    }
}

/// Targets of `+=` and `x: T = ...` accept a single name, attribute or
/// subscript only.
fn single_target(expr: &ast::Expr, what: &str, range: TextRange) -> Option<Violation> {
    match expr {
        ast::Expr::Name(_) | ast::Expr::Attribute(_) | ast::Expr::Subscript(_) => None,
        ast::Expr::Constant(e) => Some((format!("illegal target for {what}: literal"), e.range)),
        _ => Some((format!("illegal target for {what}"), range)),
    }
}

/// 1-based line and character column of a byte offset.
fn position(source: &str, offset: usize) -> (usize, usize) {
    let offset = floor_boundary(source, offset);
    let before = &source[..offset];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let lineno = before.matches('\n').count() + 1;
    let col = source[line_start..offset].chars().count() + 1;
    (lineno, col)
}

/// The source line containing `offset`, without its line terminator.
fn line_text(source: &str, offset: usize) -> Option<String> {
    let offset = floor_boundary(source, offset);
    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[line_start..]
        .lines()
        .next()
        .map(|line| line.trim_end_matches('\r').to_string())
        .filter(|line| !line.is_empty())
}

fn floor_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_code_has_no_diagnostic() {
        for source in [
            "while True: pass",
            "def add(a, b):\n    return a + b\n\nprint(add(1, 2))\n",
            "x = [i * i for i in range(10) if i % 2]\n",
            "if (n := len(data)) > 3:\n    print(n)\n",
            "a, *rest = items\nobj.attr = 1\ntable[key] += 2\n",
            "greeting = 'héllo'\nprint(f\"{greeting}!\")\n",
            "class Stack:\n    def __init__(self):\n        self.items = []\n",
            "try:\n    risky()\nexcept ValueError as err:\n    print(err)\nfinally:\n    done()\n",
        ] {
            assert!(diagnose(source).is_none(), "unexpected diagnostic for {source:?}");
        }
    }

    #[test]
    fn blank_code_has_no_diagnostic() {
        assert!(diagnose("").is_none());
        assert!(diagnose("  \n\t").is_none());
    }

    #[test]
    fn code_rejected_by_cpython_always_gets_a_located_diagnostic() {
        for source in [
            "while True pass",
            "def f():\nreturn 1",
            "if x:\npass",
            "for i in range(3):\n    a = i\n  b = i\n",
            "  x = 1",
            "x = 1\n    y = 2\n",
            "print \"hello\"",
            "exec \"x = 1\"",
            "1 = x",
            "f() = 3",
            "x + 1 += 2",
            "del 1",
            "x := 1",
            "def ok():\n    return 1\n\nprint('unclosed'\n",
        ] {
            let diag = diagnose(source)
                .unwrap_or_else(|| panic!("expected a diagnostic for {source:?}"));
            assert!(diag.lineno >= 1, "{source:?}: {diag:?}");
            assert!(diag.col.unwrap() >= 1, "{source:?}: {diag:?}");
            assert!(!diag.msg.is_empty(), "{source:?}");
        }
    }

    #[test]
    fn missing_indentation_points_at_the_body() {
        let diag = diagnose("def f():\nreturn 1").unwrap();
        assert_eq!(diag.lineno, 2);
        assert_eq!(diag.text.as_deref(), Some("return 1"));
    }

    #[test]
    fn literal_target_is_reported_at_the_literal() {
        let diag = diagnose("total = 0\n1 = total\n").unwrap();
        assert_eq!(diag.msg, "cannot assign to literal");
        assert_eq!(diag.lineno, 2);
        assert_eq!(diag.col, Some(1));
        assert_eq!(diag.end_col, Some(2));
        assert_eq!(diag.text.as_deref(), Some("1 = total"));
    }

    #[test]
    fn nested_invalid_target_is_found() {
        let diag = diagnose("def f(xs):\n    for i in xs:\n        a, g() = i\n").unwrap();
        assert_eq!(diag.msg, "cannot assign to function call");
        assert_eq!(diag.lineno, 3);
        assert_eq!(diag.col, Some(12));
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        // "ñ" and "é" are two bytes each in UTF-8.
        let diag = diagnose("ñ = \"é\"; 1 = 2").unwrap();
        assert_eq!(diag.lineno, 1);
        assert_eq!(diag.col, Some(10));
        assert_eq!(diag.end_col, Some(11));
    }

    #[test]
    fn position_maps_byte_offsets() {
        let source = "ab\nçd\n";
        assert_eq!(position(source, 0), (1, 1));
        assert_eq!(position(source, 3), (2, 1));
        assert_eq!(position(source, 5), (2, 2));
        // Inside a multi-byte character: floors to its start.
        assert_eq!(position(source, 4), (2, 1));
        assert_eq!(position(source, 99), (3, 1));
    }

    #[test]
    fn error_after_valid_prefix_points_past_it() {
        let source = "def ok():\n    return 1\n\nprint('unclosed'\n";
        let diag = diagnose(source).unwrap();
        assert!(diag.lineno >= 2, "got line {}", diag.lineno);
        assert!(diag.end_line.unwrap() >= diag.lineno);
    }
}

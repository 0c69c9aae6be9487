//! Enclosing class/function name resolution.
//!
//! Walks backward line-by-line from the selection, testing each candidate
//! declaration with a forward brace-balance to decide whether the selection
//! line actually falls inside its body. Only the nearest enclosing class
//! and nearest enclosing function are reported; there is no scope chain.
//! Functions include their own declaration line (a parameter reference
//! counts as inside), classes do not.

use core_classify::patterns::{
    ARROW_ASSIGNMENT_RE, CLASS_DECL_RE, FUNCTION_DECL_RE, METHOD_DEF_RE,
};
use core_scan::{DelimiterPair, Direction, balance_line};
use core_source::Document;
use tracing::trace;

/// Nearest enclosing names for one selection line. Empty string = none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnclosingContext {
    pub class_name: String,
    pub function_name: String,
}

/// Control-flow keywords whose statement headers look like method
/// definitions and must not be reported as functions.
const NON_FUNCTION_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "try", "finally",
];

pub fn enclosing_names(doc: &Document, line: usize) -> EnclosingContext {
    let mut ctx = EnclosingContext::default();
    if doc.line_count() == 0 {
        return ctx;
    }
    let top = line.min(doc.line_count() - 1);
    for j in (0..=top).rev() {
        let Some(text) = doc.line_text(j) else {
            continue;
        };
        if ctx.class_name.is_empty()
            && let Some(c) = CLASS_DECL_RE.captures(&text)
            && declaration_contains(doc, j, line, false)
        {
            ctx.class_name = c[1].to_string();
        }
        if ctx.function_name.is_empty()
            && let Some(name) = function_declaration_name(&text)
            && declaration_contains(doc, j, line, true)
        {
            ctx.function_name = name;
        }
        if !ctx.class_name.is_empty() && !ctx.function_name.is_empty() {
            break;
        }
    }
    trace!(
        target: "resolve.scope",
        line,
        class = ctx.class_name.as_str(),
        function = ctx.function_name.as_str(),
        "enclosing_names"
    );
    ctx
}

/// Name of a function-like declaration on this line, if any.
fn function_declaration_name(text: &str) -> Option<String> {
    if let Some(c) = FUNCTION_DECL_RE.captures(text) {
        return Some(c[1].to_string());
    }
    if let Some(c) = ARROW_ASSIGNMENT_RE.captures(text) {
        return Some(c[1].to_string());
    }
    if let Some(c) = METHOD_DEF_RE.captures(text) {
        let name = c[1].to_string();
        if !NON_FUNCTION_KEYWORDS.contains(&name.as_str()) {
            return Some(name);
        }
    }
    None
}

/// Whether `target` falls inside the body of the declaration on
/// `decl_line`. `include_decl_line` widens the interval for functions.
fn declaration_contains(
    doc: &Document,
    decl_line: usize,
    target: usize,
    include_decl_line: bool,
) -> bool {
    // a declaration without a body brace nearby is a false candidate
    // (a bare call statement can match the method pattern)
    let opens_body = (decl_line..=decl_line + 2)
        .any(|j| doc.line_text(j).is_some_and(|t| t.contains('{')));
    if !opens_body {
        return false;
    }
    let lower_ok = if include_decl_line {
        decl_line <= target
    } else {
        decl_line < target
    };
    if !lower_ok {
        return false;
    }
    match balance_line(doc, decl_line, DelimiterPair::Braces, Direction::Forward) {
        Some(closing) => target < closing,
        // unterminated at document end: treat the remainder as the body
        None => true,
    }
}

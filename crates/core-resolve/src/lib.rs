//! Insertion-line resolution.
//!
//! Maps a `ClassificationResult` to the line index immediately after the
//! full syntactic construct the selection belongs to (or, for return and
//! guard shapes, the line the statement starts on, since the breadcrumb
//! must precede those). One strategy per shape, all built on the scanner.
//!
//! The resolver cannot fail: whenever a balance point or lookahead target
//! is missing — truncated source, unterminated literal, document edge —
//! the strategy degrades to `selection_line + 1`. A best-effort placement
//! beats an error in every caller we have.

use core_classify::{ClassificationResult, ExpressionShape, ShapeDetail};
use core_scan::{DelimiterPair, Direction, balance_line};
use core_source::{Document, Selection};
use tracing::debug;

pub mod indent;
pub mod scope;

pub use indent::indentation_for;
pub use scope::{EnclosingContext, enclosing_names};

/// Resolve the line index at which the generated statement is inserted.
/// The result is clamped to `doc.line_count()`; an index equal to the line
/// count means "append after the last line."
pub fn resolve_line(
    doc: &Document,
    selection: &Selection,
    classification: &ClassificationResult,
) -> usize {
    let fallback = selection.line + 1;
    let resolved = match classification.shape {
        ExpressionShape::Decorator => decorator_target(doc, selection.line),
        ExpressionShape::ConditionGuard | ExpressionShape::ReturnSubExpression => {
            match classification.detail {
                ShapeDetail::StatementStart { line } => Some(line),
                _ => None,
            }
        }
        ExpressionShape::ObjectLiteralAssignment => {
            span_close(doc, &classification.detail, DelimiterPair::Braces)
        }
        ExpressionShape::ArrayLiteralAssignment => {
            span_close(doc, &classification.detail, DelimiterPair::Brackets)
        }
        ExpressionShape::TemplateString => balance_line(
            doc,
            selection.line,
            DelimiterPair::Backticks,
            Direction::Forward,
        )
        .map(|l| l + 1),
        ExpressionShape::TernaryAssignment | ExpressionShape::BinaryExpressionAssignment => {
            expression_end(doc, selection.line).map(|l| l + 1)
        }
        ExpressionShape::PropertyChainAccess
        | ExpressionShape::MethodCallSubExpression
        | ExpressionShape::ObjectMethodCallAssignment
        | ExpressionShape::FunctionCallAssignment => balance_line(
            doc,
            selection.line,
            DelimiterPair::Parentheses,
            Direction::Forward,
        )
        .map(|l| l + 1),
        ExpressionShape::NamedFunctionAssignment => function_end(doc, &classification.detail),
        ExpressionShape::FunctionParameter => match classification.detail {
            ShapeDetail::Span { opening_line, .. } => Some(opening_line + 1),
            _ => None,
        },
        ExpressionShape::PrimitiveAssignment | ExpressionShape::PropertyAccessAssignment => {
            Some(fallback)
        }
    };
    let line = resolved.unwrap_or(fallback).min(doc.line_count());
    debug!(
        target: "resolve",
        selection_line = selection.line,
        shape = ?classification.shape,
        line,
        "insertion_line"
    );
    line
}

/// Close a multi-line bracketed construct from its opening line.
fn span_close(doc: &Document, detail: &ShapeDetail, pair: DelimiterPair) -> Option<usize> {
    let opening = match detail {
        ShapeDetail::Span {
            opening_line,
            closing_line,
        } => {
            if let Some(close) = closing_line {
                return Some(close + 1);
            }
            *opening_line
        }
        ShapeDetail::NestedProperty { opening_line, .. } => *opening_line,
        _ => return None,
    };
    balance_line(doc, opening, pair, Direction::Forward).map(|l| l + 1)
}

/// Line after the closing brace of a function body whose opening line is in
/// the detail. An expression-bodied arrow carries no span and falls back to
/// the statement-end walk.
fn function_end(doc: &Document, detail: &ShapeDetail) -> Option<usize> {
    match detail {
        ShapeDetail::Span { opening_line, .. } => {
            balance_line(doc, *opening_line, DelimiterPair::Braces, Direction::Forward)
                .map(|l| l + 1)
        }
        _ => None,
    }
}

/// Skip past the decorator stack to the decorated declaration, then into
/// its body: the line after the declaration's opening brace.
fn decorator_target(doc: &Document, decorator_line: usize) -> Option<usize> {
    let mut j = decorator_line;
    while let Some(text) = doc.line_text(j) {
        if !text.trim_start().starts_with('@') {
            break;
        }
        // a decorator with multi-line arguments ends at its paren balance
        j = match balance_line(doc, j, DelimiterPair::Parentheses, Direction::Forward) {
            Some(close) => close + 1,
            None => j + 1,
        };
    }
    // declaration line, then its opening brace within a short window
    for k in j..=j + 4 {
        let text = doc.line_text(k)?;
        if text.contains('{') {
            return Some(k + 1);
        }
    }
    None
}

const CONTINUATION_ENDINGS: &[&str] = &["?", ":", "&&", "||", "+", "-", "*", "/", "=", "(", ","];
const CONTINUATION_STARTS: &[&str] = &["?", ":", "&&", "||", "+", "-", "*", "/", "."];

/// Last line touched by an expression that starts on `start`: walk forward
/// while lines end (or the next line starts) with an operator, bounded so a
/// miscount cannot run away.
fn expression_end(doc: &Document, start: usize) -> Option<usize> {
    const CAP: usize = 8;
    let mut j = start;
    loop {
        let text = doc.line_text(j)?;
        let trimmed = text.trim_end();
        if trimmed.ends_with(';') {
            return Some(j);
        }
        if j + 1 >= doc.line_count() || j >= start + CAP {
            return Some(j);
        }
        let next = doc.line_text(j + 1)?;
        let next_trim = next.trim_start();
        let continues = CONTINUATION_ENDINGS.iter().any(|op| trimmed.ends_with(op))
            || CONTINUATION_STARTS.iter().any(|op| next_trim.starts_with(op));
        if !continues {
            return Some(j);
        }
        j += 1;
    }
}

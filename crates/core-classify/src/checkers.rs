//! Shape checker predicates.
//!
//! Each checker answers for exactly one `ExpressionShape`: `Some(detail)` on
//! a positive match, `None` to let the next entry in the priority table run.
//! Checkers read the selection line, a short bounded lookahead/lookbehind
//! window, or the parsed tree when one is available; none of them mutate
//! anything or look at another checker's result.

use core_scan::{DelimiterPair, Direction, balance_line, net_balance};
use core_source::Document;

use crate::ShapeDetail;
use crate::patterns::{
    ARROW_ASSIGNMENT_RE, DECORATOR_RE, FUNCTION_DECL_RE, GUARD_OPENER_RE, KEY_OPENS_BLOCK_RE,
    KEY_RE, METHOD_DEF_RE, METHOD_INVOKE_RE, RETURN_RE, RHS_FUNCTION_CALL_RE, RHS_FUNCTION_RE,
    RHS_OBJECT_METHOD_CALL_RE, RHS_PRIMITIVE_RE, RHS_PROPERTY_ACCESS_RE, assignment_split,
    has_top_level_binary_op, has_top_level_ternary,
};
use crate::tree::TreeIndex;

/// Everything a checker may look at.
pub(crate) struct Ctx<'a> {
    pub doc: &'a Document,
    pub line: usize,
    pub text: String,
    pub selected: &'a str,
    pub tree: Option<&'a TreeIndex>,
}

impl Ctx<'_> {
    /// The assignment RHS joined with up to `ahead` following lines, for
    /// expressions that continue past the selection line. Joined with a
    /// single space so operators split across lines stay detectable.
    fn rhs_window(&self, rhs: &str, ahead: usize) -> String {
        let mut window = rhs.to_string();
        for j in self.line + 1..=self.line + ahead {
            match self.doc.line_text(j) {
                Some(t) => {
                    window.push(' ');
                    window.push_str(t.trim());
                }
                None => break,
            }
        }
        window
    }
}

/// First line at or after `from` (within `cap` lines) containing `{`.
fn find_brace_line(doc: &Document, from: usize, cap: usize) -> Option<usize> {
    (from..=from + cap).find(|&j| doc.line_text(j).is_some_and(|t| t.contains('{')))
}

const CONTROL_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "else"];

fn is_control_line(text: &str) -> bool {
    let trimmed = text.trim_start().trim_start_matches('}').trim_start();
    CONTROL_KEYWORDS
        .iter()
        .any(|k| trimmed.starts_with(k) && !trimmed[k.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '$'))
}

// ---------------------------------------------------------------------------
// Special cases evaluated ahead of the priority table
// ---------------------------------------------------------------------------

/// Decorator line: placement skips to the decorated declaration's body.
pub(crate) fn check_decorator(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    DECORATOR_RE.is_match(&ctx.text).then_some(ShapeDetail::Plain)
}

/// Condition guard: the selection sits inside the parenthesized condition
/// of an `if`/`while`/`switch`/`catch`, so the breadcrumb must land before
/// the guarded block.
pub(crate) fn check_condition_guard(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    if GUARD_OPENER_RE.is_match(&ctx.text) {
        return Some(ShapeDetail::StatementStart { line: ctx.line });
    }
    // a multi-line condition: the opener sits a few lines up and its
    // parentheses stay open through the selection line
    for j in (ctx.line.saturating_sub(4)..ctx.line).rev() {
        let t = ctx.doc.line_text(j)?;
        if GUARD_OPENER_RE.is_match(&t) {
            return match balance_line(ctx.doc, j, DelimiterPair::Parentheses, Direction::Forward) {
                Some(close) if close >= ctx.line => Some(ShapeDetail::StatementStart { line: j }),
                None => Some(ShapeDetail::StatementStart { line: j }),
                _ => None,
            };
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Priority-table checkers, highest priority first
// ---------------------------------------------------------------------------

/// 1. Selection inside a `return` expression.
pub(crate) fn check_return(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    if let Some(tree) = ctx.tree {
        return tree
            .return_span(ctx.line)
            .map(|(start, _)| ShapeDetail::StatementStart { line: start });
    }
    if RETURN_RE.is_match(&ctx.text) {
        return Some(ShapeDetail::StatementStart { line: ctx.line });
    }
    for j in (ctx.line.saturating_sub(3)..ctx.line).rev() {
        let t = ctx.doc.line_text(j)?;
        if RETURN_RE.is_match(&t) && !t.trim_end().ends_with(';') {
            return Some(ShapeDetail::StatementStart { line: j });
        }
        if t.trim_end().ends_with(';') {
            break;
        }
    }
    None
}

/// 2. Object literal assignment, including a selection that is a property
/// key nested inside a multi-line literal (which yields a dotted path).
pub(crate) fn check_object_literal(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    if let Some((_, rhs)) = assignment_split(&ctx.text) {
        if rhs.starts_with('{') {
            return Some(ShapeDetail::Span {
                opening_line: ctx.line,
                closing_line: None,
            });
        }
        if rhs.is_empty() {
            // `const obj =` with the literal opening on a following line
            for j in ctx.line + 1..=ctx.line + 3 {
                let t = ctx.doc.line_text(j)?;
                if t.trim().is_empty() {
                    continue;
                }
                if t.trim_start().starts_with('{') {
                    return Some(ShapeDetail::Span {
                        opening_line: j,
                        closing_line: None,
                    });
                }
                break;
            }
        }
        return None;
    }
    nested_object_context(ctx)
}

/// Walk upward from a non-assignment selection line looking for the object
/// literal assignment that left a brace open over it, collecting nested key
/// names on the way for the dotted path.
fn nested_object_context(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let mut depth = 0isize;
    let mut keys: Vec<String> = Vec::new();
    let floor = ctx.line.saturating_sub(40);
    for j in (floor..ctx.line).rev() {
        let text = ctx.doc.line_text(j)?;
        depth += net_balance(&text, DelimiterPair::Braces);
        if depth <= 0 {
            continue;
        }
        if let Some((lhs, rhs)) = assignment_split(&text) {
            if !rhs.starts_with('{') {
                return None;
            }
            // only a selection that is itself a property key earns a path
            let selection_is_key = KEY_RE
                .captures(&ctx.text)
                .is_some_and(|c| &c[1] == ctx.selected);
            if !selection_is_key {
                return Some(ShapeDetail::Span {
                    opening_line: j,
                    closing_line: None,
                });
            }
            keys.reverse();
            let mut path = lhs;
            for k in &keys {
                path.push('.');
                path.push_str(k);
            }
            path.push('.');
            path.push_str(ctx.selected);
            return Some(ShapeDetail::NestedProperty {
                opening_line: j,
                path,
            });
        }
        if let Some(c) = KEY_OPENS_BLOCK_RE.captures(&text) {
            // a nested `key: {` opened this level; absorb it and keep climbing
            keys.push(c[1].to_string());
            depth -= 1;
            continue;
        }
        return None;
    }
    None
}

/// 3. Function-parameter occurrence (direct or destructured).
pub(crate) fn check_function_parameter(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    if let Some(tree) = ctx.tree {
        // a successful parse is authoritative either way
        return tree
            .parameter_body_line(ctx.line, ctx.selected)
            .map(|body| ShapeDetail::Span {
                opening_line: body,
                closing_line: None,
            });
    }
    text_parameter_check(ctx)
}

fn text_parameter_check(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let text = &ctx.text;
    let signature = FUNCTION_DECL_RE.is_match(text)
        || ARROW_ASSIGNMENT_RE.is_match(text)
        || (METHOD_DEF_RE.is_match(text) && !is_control_line(text));
    if !signature {
        return None;
    }
    let open = text.find('(')?;
    let close = text[open..].find(')').map(|i| open + i).unwrap_or(text.len());
    let params = &text[open + 1..close.max(open + 1)];
    let named = params.split(',').any(|p| {
        let name = p
            .trim()
            .trim_matches(['{', '}', '[', ']'])
            .split(['=', ':'])
            .next()
            .unwrap_or("")
            .trim()
            .trim_start_matches("...");
        name == ctx.selected
    });
    if !named {
        return None;
    }
    let brace = if text[close.min(text.len())..].contains('{') {
        ctx.line
    } else {
        find_brace_line(ctx.doc, ctx.line + 1, 3)?
    };
    Some(ShapeDetail::Span {
        opening_line: brace,
        closing_line: None,
    })
}

/// 4. Array literal assignment.
pub(crate) fn check_array_literal(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    if rhs.starts_with('[') {
        return Some(ShapeDetail::Span {
            opening_line: ctx.line,
            closing_line: None,
        });
    }
    if rhs.is_empty() {
        for j in ctx.line + 1..=ctx.line + 3 {
            let t = ctx.doc.line_text(j)?;
            if t.trim().is_empty() {
                continue;
            }
            if t.trim_start().starts_with('[') {
                return Some(ShapeDetail::Span {
                    opening_line: j,
                    closing_line: None,
                });
            }
            break;
        }
    }
    None
}

/// 5. Template string on the line or its continuation.
pub(crate) fn check_template_string(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    ctx.text.contains('`').then_some(ShapeDetail::Plain)
}

/// 6. Ternary bound to an assignment.
pub(crate) fn check_ternary(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    has_top_level_ternary(&ctx.rhs_window(&rhs, 2)).then_some(ShapeDetail::Plain)
}

/// 7. Binary operator at the RHS root.
pub(crate) fn check_binary(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    if rhs.is_empty() {
        return None;
    }
    has_top_level_binary_op(&ctx.rhs_window(&rhs, 1)).then_some(ShapeDetail::Plain)
}

/// 8. Raw/chained property access without assignment or invocation.
pub(crate) fn check_property_chain(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    if assignment_split(&ctx.text).is_some() || METHOD_INVOKE_RE.is_match(&ctx.text) {
        return None;
    }
    let trimmed = ctx.text.trim_start();
    let chained = ctx.selected.contains('.')
        || trimmed.starts_with(&format!("{}.", ctx.selected))
        || trimmed.starts_with(&format!("{}[", ctx.selected));
    chained.then_some(ShapeDetail::Plain)
}

/// 9. Method call used as a sub-expression (`recv.then(...)`).
pub(crate) fn check_method_call_sub(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    if assignment_split(&ctx.text).is_some() {
        return None;
    }
    METHOD_INVOKE_RE
        .is_match(&ctx.text)
        .then_some(ShapeDetail::Plain)
}

/// 10. Object-method-call assignment.
pub(crate) fn check_object_method_call(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    RHS_OBJECT_METHOD_CALL_RE
        .is_match(&rhs)
        .then_some(ShapeDetail::Plain)
}

/// 11. Bare function-call assignment.
pub(crate) fn check_function_call(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    RHS_FUNCTION_CALL_RE
        .is_match(&rhs)
        .then_some(ShapeDetail::Plain)
}

/// 12. Named function or arrow-function assignment (and plain function
/// declarations, for a selection on the declaration name).
pub(crate) fn check_named_function(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let matched = FUNCTION_DECL_RE.is_match(&ctx.text)
        || ARROW_ASSIGNMENT_RE.is_match(&ctx.text)
        || assignment_split(&ctx.text).is_some_and(|(_, rhs)| RHS_FUNCTION_RE.is_match(&rhs));
    if !matched {
        return None;
    }
    if ctx.text.contains('{') {
        return Some(ShapeDetail::Span {
            opening_line: ctx.line,
            closing_line: None,
        });
    }
    if let Some(b) = find_brace_line(ctx.doc, ctx.line + 1, 3) {
        return Some(ShapeDetail::Span {
            opening_line: b,
            closing_line: None,
        });
    }
    // expression-bodied arrow: no block to skip
    Some(ShapeDetail::Plain)
}

/// 13. Primitive literal or bare identifier RHS.
pub(crate) fn check_primitive(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    RHS_PRIMITIVE_RE.is_match(&rhs).then_some(ShapeDetail::Plain)
}

/// 14. Safe dotted/bracketed access-chain assignment.
pub(crate) fn check_property_access_assignment(ctx: &Ctx<'_>) -> Option<ShapeDetail> {
    let (_, rhs) = assignment_split(&ctx.text)?;
    RHS_PROPERTY_ACCESS_RE
        .is_match(&rhs)
        .then_some(ShapeDetail::Plain)
}

//! Operation planning over a document snapshot.
//!
//! Each operation is a pure function from `(document, parameters)` to a
//! sequence of edits; nothing here touches a file or an editor buffer. The
//! caller applies the plan through its own edit machinery (`apply_plan`
//! covers the in-memory case used by the binary and the tests) and re-reads
//! the document before planning anything else.
//!
//! Single insertion composes the whole resolution pipeline; the bulk
//! operations (comment/uncomment/delete/correct) ride on the detector and
//! never consult the classifier.

use core_classify::{ShapeDetail, classify};
use core_config::LogConfig;
use core_detect::{DetectedStatement, detect_all};
use core_format::{StatementContext, build_lines, location_segment};
use core_resolve::{enclosing_names, indentation_for, resolve_line};
use core_source::{Document, LineRange, Selection};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

/// One edit against the caller's document. `Insert` text may span several
/// lines (joined with `\n`); `Replace` text substitutes the whole range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    Insert { line: usize, text: String },
    Replace { range: LineRange, text: String },
    Delete { range: LineRange },
}

/// Invalid inputs the operations layer rejects before resolution starts.
/// The resolution crates themselves cannot fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperationError {
    #[error("selection is empty")]
    EmptySelection,
    #[error("selection {0:?} carries surrounding whitespace")]
    UntrimmedSelection(String),
    #[error("selection line {line} is outside the document ({lines} lines)")]
    LineOutOfRange { line: usize, lines: usize },
}

static FILE_LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"file: [^\s~]+:\d+").expect("file location regex should be valid")
});
static LINE_LOCATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"line: \d+").expect("line location regex should be valid"));

/// Plan the single-statement insertion for `selection`.
pub fn insert_plan(
    doc: &Document,
    selection: &Selection,
    cfg: &LogConfig,
    tab_width: usize,
) -> Result<Vec<EditOp>, OperationError> {
    validate(doc, selection)?;

    let classification = classify(doc, selection);
    let line = resolve_line(doc, selection, &classification);
    let scope = enclosing_names(doc, selection.line);
    let indentation = indentation_for(doc, selection.line, tab_width);

    // a nested object property logs its full dotted path
    let selected = match &classification.detail {
        ShapeDetail::NestedProperty { path, .. } => path.clone(),
        _ => selection.text.clone(),
    };

    let ctx = StatementContext {
        selected: &selected,
        file_name: Some(doc.name.as_str()),
        insertion_line: line,
        scope: &scope,
        indentation: &indentation,
    };
    let text = build_lines(&ctx, cfg).join("\n");
    debug!(
        target: "edit",
        selection_line = selection.line,
        insertion_line = line,
        shape = ?classification.shape,
        "insert_planned"
    );
    Ok(vec![EditOp::Insert { line, text }])
}

/// Comment out every active own-tag statement.
pub fn comment_plan(doc: &Document, cfg: &LogConfig) -> Vec<EditOp> {
    own_statements(doc, cfg)
        .into_iter()
        .filter(|s| !s.is_commented(doc))
        .flat_map(|s| {
            s.ranges
                .iter()
                .filter_map(|r| {
                    let text = doc.line_text(r.start)?;
                    let ws_len = text.len() - text.trim_start().len();
                    Some(EditOp::Replace {
                        range: *r,
                        text: format!("{}// {}", &text[..ws_len], text.trim_start()),
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Reactivate every commented own-tag statement.
pub fn uncomment_plan(doc: &Document, cfg: &LogConfig) -> Vec<EditOp> {
    own_statements(doc, cfg)
        .into_iter()
        .filter(|s| s.is_commented(doc))
        .flat_map(|s| {
            s.ranges
                .iter()
                .filter_map(|r| {
                    let text = doc.line_text(r.start)?;
                    let ws_len = text.len() - text.trim_start().len();
                    Some(EditOp::Replace {
                        range: *r,
                        text: format!("{}{}", &text[..ws_len], strip_comment_slashes(&text)),
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Delete detected statements. Foreign blocks (same invocation name, no
/// marker pair) are included only on request.
pub fn delete_plan(doc: &Document, cfg: &LogConfig, include_foreign: bool) -> Vec<EditOp> {
    detect_all(
        doc,
        &cfg.log_function,
        &cfg.log_message_prefix,
        &cfg.delimiter_inside_message,
    )
    .into_iter()
    .filter(|s| include_foreign || s.is_own_tag)
    .map(|s| EditOp::Delete {
        range: LineRange::new(s.start_line(), s.end_line()),
    })
    .collect()
}

/// Refresh the `file:`/`line:` location segments of own-tag statements so
/// they match where the statements sit now. Foreign blocks are skipped.
pub fn correct_plan(doc: &Document, cfg: &LogConfig) -> Vec<EditOp> {
    let mut edits = Vec::new();
    for s in own_statements(doc, cfg) {
        let first = s.start_line();
        let Some(text) = doc.line_text(first) else {
            continue;
        };
        let mut updated = text.clone();
        if let Some(loc) = location_segment(Some(doc.name.as_str()), first, cfg) {
            if FILE_LOCATION_RE.is_match(&updated) {
                updated = FILE_LOCATION_RE.replace(&updated, loc.as_str()).into_owned();
            } else if LINE_LOCATION_RE.is_match(&updated) {
                updated = LINE_LOCATION_RE.replace(&updated, loc.as_str()).into_owned();
            }
        }
        if updated != text {
            edits.push(EditOp::Replace {
                range: LineRange::single(first),
                text: updated,
            });
        }
    }
    info!(target: "edit", corrections = edits.len(), "correct_planned");
    edits
}

/// Apply a plan to an in-memory document, producing the edited snapshot.
/// Edits are applied bottom-up so earlier line indices stay valid.
pub fn apply_plan(doc: &Document, ops: &[EditOp]) -> Document {
    let mut lines: Vec<String> = (0..doc.line_count())
        .filter_map(|i| doc.line_text(i))
        .collect();

    let mut ordered: Vec<&EditOp> = ops.iter().collect();
    ordered.sort_by_key(|op| {
        std::cmp::Reverse(match op {
            EditOp::Insert { line, .. } => *line,
            EditOp::Replace { range, .. } => range.start,
            EditOp::Delete { range } => range.start,
        })
    });

    for op in ordered {
        match op {
            EditOp::Insert { line, text } => {
                let at = (*line).min(lines.len());
                for (offset, part) in text.split('\n').enumerate() {
                    lines.insert(at + offset, part.to_string());
                }
            }
            EditOp::Replace { range, text } => {
                let start = range.start.min(lines.len());
                let end = (range.end + 1).min(lines.len());
                lines.drain(start..end);
                for (offset, part) in text.split('\n').enumerate() {
                    lines.insert(start + offset, part.to_string());
                }
            }
            EditOp::Delete { range } => {
                let start = range.start.min(lines.len());
                let end = (range.end + 1).min(lines.len());
                lines.drain(start..end);
            }
        }
    }

    Document::from_str(doc.name.clone(), &lines.join("\n"))
        .expect("rebuilding a document from lines cannot fail")
}

fn validate(doc: &Document, selection: &Selection) -> Result<(), OperationError> {
    if selection.text.is_empty() {
        return Err(OperationError::EmptySelection);
    }
    if !selection.is_resolvable() {
        return Err(OperationError::UntrimmedSelection(selection.text.clone()));
    }
    if selection.line >= doc.line_count() {
        return Err(OperationError::LineOutOfRange {
            line: selection.line,
            lines: doc.line_count(),
        });
    }
    Ok(())
}

fn own_statements(doc: &Document, cfg: &LogConfig) -> Vec<DetectedStatement> {
    detect_all(
        doc,
        &cfg.log_function,
        &cfg.log_message_prefix,
        &cfg.delimiter_inside_message,
    )
    .into_iter()
    .filter(|s| s.is_own_tag)
    .collect()
}

/// Drop the leading comment slash runs (and the whitespace between them)
/// from an already-trimmed line start.
fn strip_comment_slashes(text: &str) -> String {
    let mut rest = text.trim_start();
    while rest.starts_with('/') {
        rest = rest.trim_start_matches('/').trim_start();
    }
    rest.to_string()
}

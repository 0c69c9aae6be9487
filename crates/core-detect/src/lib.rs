//! Whole-document detection of previously inserted statements.
//!
//! Scans every line for the configured invocation signature (optionally
//! commented out), then extends each hit forward on parenthesis balance so
//! multi-line calls come back as one logical statement. Detection is a
//! two-state machine per line cursor: SCANNING until a signature matches,
//! CAPTURING while the parenthesis balance stays open, back to SCANNING.
//! Reaching the document end while capturing keeps the open block — a
//! truncated trailing statement is still reported rather than lost.
//!
//! Ownership of a block is decided independently of detection: the
//! concatenated, whitespace-stripped block text must contain the marker
//! prefix followed (order-sensitive) by the marker delimiter. Blocks that
//! merely share the invocation name are reported with `is_own_tag = false`
//! so "delete" can offer them while "correct" skips them.

use core_scan::{DelimiterPair, net_balance};
use core_source::{Document, LineRange};
use regex::Regex;
use tracing::{trace, warn};

/// One logical (possibly multi-line, possibly commented) statement found in
/// a document scan. `ranges` holds one entry per captured line, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedStatement {
    pub indentation: String,
    pub ranges: Vec<LineRange>,
    pub is_own_tag: bool,
}

impl DetectedStatement {
    /// First captured line.
    pub fn start_line(&self) -> usize {
        self.ranges[0].start
    }

    /// Last captured line.
    pub fn end_line(&self) -> usize {
        self.ranges[self.ranges.len() - 1].end
    }

    /// Whether every captured line is commented out.
    pub fn is_commented(&self, doc: &Document) -> bool {
        self.ranges.iter().all(|r| {
            doc.line_text(r.start)
                .is_some_and(|t| t.trim_start().starts_with("//"))
        })
    }
}

/// Find every statement in `doc` whose call expression matches
/// `invocation_signature` (exact name, regex-escaped), commented or not.
pub fn detect_all(
    doc: &Document,
    invocation_signature: &str,
    marker_prefix: &str,
    marker_delimiter: &str,
) -> Vec<DetectedStatement> {
    let pattern = format!(
        r"^\s*(?:/+\s*)*{}\s*\(",
        regex::escape(invocation_signature)
    );
    let signature = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(err) => {
            // an unusable signature yields an empty result, not a failure
            warn!(target: "detect", %err, "invalid invocation signature");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    let mut i = 0;
    while i < doc.line_count() {
        let Some(line) = doc.line(i) else {
            break;
        };
        if !signature.is_match(&line.text) {
            i += 1;
            continue;
        }

        // CAPTURING: extend on parenthesis balance
        let indentation = line.indentation().to_string();
        let mut ranges = vec![LineRange::single(i)];
        let mut depth = net_balance(&line.text, DelimiterPair::Parentheses);
        let mut j = i;
        while depth > 0 {
            j += 1;
            let Some(text) = doc.line_text(j) else {
                // document ended mid-capture: keep what we have
                break;
            };
            ranges.push(LineRange::single(j));
            depth += net_balance(&text, DelimiterPair::Parentheses);
        }

        let is_own_tag = block_carries_markers(doc, &ranges, marker_prefix, marker_delimiter);
        trace!(
            target: "detect",
            start = i,
            lines = ranges.len(),
            is_own_tag,
            "statement"
        );
        found.push(DetectedStatement {
            indentation,
            ranges,
            is_own_tag,
        });
        i = j + 1;
    }
    found
}

/// Order-sensitive marker test over the whitespace-stripped block text:
/// the prefix must appear, and the delimiter must appear after it.
fn block_carries_markers(
    doc: &Document,
    ranges: &[LineRange],
    marker_prefix: &str,
    marker_delimiter: &str,
) -> bool {
    let stripped: String = ranges
        .iter()
        .filter_map(|r| doc.line_text(r.start))
        .collect::<String>()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    match stripped.find(marker_prefix) {
        Some(at) => stripped[at + marker_prefix.len()..].contains(marker_delimiter),
        None => false,
    }
}

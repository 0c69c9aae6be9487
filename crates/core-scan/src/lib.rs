//! Delimiter balance scanning.
//!
//! One generic routine serves every multi-line construct the resolver cares
//! about: object literals (braces), array literals (brackets), call
//! arguments (parentheses), and template strings (backticks). The scan is a
//! pure fold over a run of lines — counts live in locals, nothing is shared
//! across calls — returning the line index where balance is reached or
//! `None` when the document ends first.
//!
//! Counting is line-granular and textual. Delimiters inside string literals
//! are not excluded; the resolver's degrade-to-next-line fallback absorbs
//! the rare miscount on pathological input.

use core_source::Document;
use tracing::trace;

/// A delimiter pair the scanner can balance.
///
/// `Backticks` is the odd one out: the same character both opens and
/// closes, so balance means "an even, non-zero number seen" rather than
/// "opens == closes."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterPair {
    Parentheses,
    Braces,
    Brackets,
    Backticks,
}

impl DelimiterPair {
    pub fn open(self) -> char {
        match self {
            DelimiterPair::Parentheses => '(',
            DelimiterPair::Braces => '{',
            DelimiterPair::Brackets => '[',
            DelimiterPair::Backticks => '`',
        }
    }

    pub fn close(self) -> char {
        match self {
            DelimiterPair::Parentheses => ')',
            DelimiterPair::Braces => '}',
            DelimiterPair::Brackets => ']',
            DelimiterPair::Backticks => '`',
        }
    }
}

/// Scan direction relative to the starting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Count opening and closing occurrences of `pair` in a single line.
/// For `Backticks` both counts receive every backtick seen.
pub fn count_in_line(text: &str, pair: DelimiterPair) -> (usize, usize) {
    let (open, close) = (pair.open(), pair.close());
    let mut opens = 0;
    let mut closes = 0;
    for c in text.chars() {
        if c == open {
            opens += 1;
        }
        // separate branch so backticks land in both counters
        if c == close {
            closes += 1;
        }
    }
    (opens, closes)
}

/// Net surplus of openings over closings in a single line. Used by callers
/// that track their own running depth (the statement detector).
pub fn net_balance(text: &str, pair: DelimiterPair) -> isize {
    let (opens, closes) = count_in_line(text, pair);
    opens as isize - closes as isize
}

/// Find the line at which `pair` reaches balance, starting at `start_line`
/// and walking in `direction`.
///
/// The starting line seeds the counts before any advance, so a selection
/// line that already carries unbalanced delimiters is handled without a
/// special case. A balance point is only reported once at least one
/// delimiter has been seen; a run of delimiter-free lines never "balances"
/// at zero. Returns `None` when the document edge is reached first.
pub fn balance_line(
    doc: &Document,
    start_line: usize,
    pair: DelimiterPair,
    direction: Direction,
) -> Option<usize> {
    if start_line >= doc.line_count() {
        return None;
    }
    let result = match direction {
        Direction::Forward => fold_lines(doc, (start_line..doc.line_count()).collect(), pair),
        Direction::Backward => fold_lines(doc, (0..=start_line).rev().collect(), pair),
    };
    trace!(
        target: "scan.balance",
        start_line,
        ?pair,
        ?direction,
        balance = ?result,
        "balance_line"
    );
    result
}

fn fold_lines(doc: &Document, order: Vec<usize>, pair: DelimiterPair) -> Option<usize> {
    let mut opens = 0usize;
    let mut closes = 0usize;
    for idx in order {
        let text = doc.line_text(idx)?;
        let (o, c) = count_in_line(&text, pair);
        opens += o;
        closes += c;
        let balanced = match pair {
            // parity, not pairing: the same character toggles open/closed
            DelimiterPair::Backticks => opens > 0 && opens % 2 == 0,
            _ => opens > 0 && opens == closes,
        };
        if balanced {
            return Some(idx);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_source::Document;

    fn doc(content: &str) -> Document {
        Document::from_str("t.js", content).unwrap()
    }

    #[test]
    fn single_line_already_balanced() {
        let d = doc("const x = { a: 1 };\nnext");
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Braces, Direction::Forward),
            Some(0)
        );
    }

    #[test]
    fn multi_line_object_closes_on_last_brace_line() {
        let d = doc("const obj = {\n  a: 1,\n  b: 2\n};\nafter");
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Braces, Direction::Forward),
            Some(3)
        );
    }

    #[test]
    fn nested_brackets_ignore_inner_closures() {
        let d = doc("const m = [\n  [1, 2],\n  [3, [4]],\n];");
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Brackets, Direction::Forward),
            Some(3)
        );
    }

    #[test]
    fn synthetic_nested_sequences_balance_on_final_line() {
        // Properly nested sequence over N lines must balance exactly at N-1.
        for depth in 1..=8 {
            let mut lines: Vec<String> = Vec::new();
            for i in 0..depth {
                lines.push(format!("{}call(", "  ".repeat(i)));
            }
            for i in (0..depth).rev() {
                lines.push(format!("{})", "  ".repeat(i)));
            }
            let content = lines.join("\n");
            let n = lines.len();
            let d = doc(&content);
            assert_eq!(
                balance_line(&d, 0, DelimiterPair::Parentheses, Direction::Forward),
                Some(n - 1),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn truncated_sequence_reports_no_balance() {
        let d = doc("open({\n  a: [1,\n");
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Braces, Direction::Forward),
            None
        );
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Brackets, Direction::Forward),
            None
        );
    }

    #[test]
    fn delimiter_free_lines_never_balance_at_zero() {
        let d = doc("plain text\nmore text\n");
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Braces, Direction::Forward),
            None
        );
    }

    #[test]
    fn backtick_parity_balances_on_even_count() {
        let d = doc("const t = `hello\nworld ${x}\nend`;\nafter");
        assert_eq!(
            balance_line(&d, 0, DelimiterPair::Backticks, Direction::Forward),
            Some(2)
        );
        // single line with both backticks
        let d2 = doc("const t = `one liner`;");
        assert_eq!(
            balance_line(&d2, 0, DelimiterPair::Backticks, Direction::Forward),
            Some(0)
        );
    }

    #[test]
    fn backward_scan_finds_opening_line() {
        let d = doc("function f() {\n  const a = 1;\n  return a;\n}");
        // From the closing line walking backward, the brace count balances
        // on the declaration line.
        assert_eq!(
            balance_line(&d, 3, DelimiterPair::Braces, Direction::Backward),
            Some(0)
        );
    }

    #[test]
    fn out_of_range_start_line() {
        let d = doc("x");
        assert_eq!(
            balance_line(&d, 9, DelimiterPair::Braces, Direction::Forward),
            None
        );
    }

    #[test]
    fn net_balance_signed_counts() {
        assert_eq!(net_balance("f(a, g(b)", DelimiterPair::Parentheses), 1);
        assert_eq!(net_balance("))", DelimiterPair::Parentheses), -2);
        assert_eq!(net_balance("()", DelimiterPair::Parentheses), 0);
    }
}

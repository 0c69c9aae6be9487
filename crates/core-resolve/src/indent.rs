//! Indentation derivation for the inserted line.
//!
//! Default: mirror the selection line's leading whitespace, expanding tabs
//! to the configured width. When the selection line itself opens the block
//! that will receive the statement (a declaration or control opener), the
//! deeper of the current and following lines wins, so the insert aligns
//! with the block's sibling statements instead of its opening line.

use core_source::Document;

/// Leading-whitespace string for a statement inserted at `line`'s level.
pub fn indentation_for(doc: &Document, line: usize, tab_width: usize) -> String {
    let Some(current) = doc.line(line) else {
        return String::new();
    };
    let chosen = if opens_block(&current.text) {
        match doc.line(line + 1) {
            Some(next)
                if !next.is_blank()
                    && next.first_non_whitespace > current.first_non_whitespace =>
            {
                next
            }
            _ => current,
        }
    } else {
        current
    };
    expand_tabs(chosen.indentation(), tab_width)
}

/// Whether this line opens a block whose body receives the insert.
fn opens_block(text: &str) -> bool {
    let trimmed = text.trim_end();
    trimmed.ends_with('{') || trimmed.ends_with('(') || trimmed.ends_with("=>")
}

fn expand_tabs(ws: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(ws.len());
    for c in ws.chars() {
        if c == '\t' {
            for _ in 0..tab_width {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indent(content: &str, line: usize, tab_width: usize) -> String {
        let doc = Document::from_str("t.js", content).unwrap();
        indentation_for(&doc, line, tab_width)
    }

    #[test]
    fn mirrors_current_line_whitespace() {
        assert_eq!(indent("    const x = 5;", 0, 4), "    ");
        assert_eq!(indent("const x = 5;", 0, 4), "");
    }

    #[test]
    fn tabs_expand_to_configured_width() {
        assert_eq!(indent("\t\tconst x = 5;", 0, 2), "    ");
        assert_eq!(indent("\tconst x = 5;", 0, 8), "        ");
    }

    #[test]
    fn block_opener_takes_deeper_following_line() {
        let content = "function foo(a) {\n    const y = 1;\n}";
        assert_eq!(indent(content, 0, 4), "    ");
    }

    #[test]
    fn block_opener_with_blank_next_line_keeps_own_indent() {
        let content = "  function foo(a) {\n\n  }";
        assert_eq!(indent(content, 0, 4), "  ");
    }

    #[test]
    fn non_opener_ignores_following_line() {
        let content = "  const x = 5;\n      deeper();";
        assert_eq!(indent(content, 0, 4), "  ");
    }

    #[test]
    fn past_end_yields_empty() {
        assert_eq!(indent("x", 5, 4), "");
    }
}

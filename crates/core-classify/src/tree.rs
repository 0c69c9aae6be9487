//! Syntax-tree refinement for the ambiguous checkers.
//!
//! Bracket counting alone cannot separate a destructured function parameter
//! from an object literal, or tell whether a selection line sits inside a
//! multi-line `return` expression. When the file parses, those two checks
//! consult the tree; when it does not (or the answer is inconclusive), the
//! text checkers stand on their own. The tree is parsed at most once per
//! classification call and discarded with it.

use core_source::Document;
use tracing::trace;
use tree_sitter::{Node, Parser, Tree};

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "function",
    "generator_function",
    "generator_function_declaration",
    "arrow_function",
    "method_definition",
];

/// A parsed file plus its source text, queried by row.
pub struct TreeIndex {
    tree: Tree,
    source: String,
}

impl TreeIndex {
    /// Parse the whole document. `None` when the grammar fails to load or
    /// the parse is aborted; callers fall back to text checkers.
    pub fn parse(doc: &Document) -> Option<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .ok()?;
        let source = doc.text();
        let tree = parser.parse(&source, None)?;
        trace!(target: "classify.tree", lines = doc.line_count(), "parsed");
        Some(Self { tree, source })
    }

    fn node_text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn nodes(&self) -> Vec<Node<'_>> {
        let mut out = Vec::new();
        let mut stack = vec![self.tree.root_node()];
        while let Some(n) = stack.pop() {
            for i in 0..n.child_count() {
                if let Some(c) = n.child(i) {
                    stack.push(c);
                }
            }
            out.push(n);
        }
        out
    }

    fn spans_row(node: Node<'_>, row: usize) -> bool {
        node.start_position().row <= row && row <= node.end_position().row
    }

    /// Row range `(start, end)` of the innermost `return` statement whose
    /// span covers `line`.
    pub fn return_span(&self, line: usize) -> Option<(usize, usize)> {
        self.nodes()
            .into_iter()
            .filter(|n| n.kind() == "return_statement" && Self::spans_row(*n, line))
            .max_by_key(|n| n.start_position().row)
            .map(|n| (n.start_position().row, n.end_position().row))
    }

    /// When `name` is a parameter (direct or destructured) of the nearest
    /// function whose span covers `line`, returns the row of that
    /// function's body opening. `None` otherwise.
    pub fn parameter_body_line(&self, line: usize, name: &str) -> Option<usize> {
        let functions: Vec<Node<'_>> = self
            .nodes()
            .into_iter()
            .filter(|n| FUNCTION_KINDS.contains(&n.kind()) && Self::spans_row(*n, line))
            .collect();
        // nearest enclosing function first
        let mut ordered = functions;
        ordered.sort_by_key(|n| std::cmp::Reverse(n.start_position().row));
        for func in ordered {
            let params = func
                .child_by_field_name("parameters")
                .or_else(|| func.child_by_field_name("parameter"));
            let Some(params) = params else { continue };
            if !self.subtree_names_identifier(params, name) {
                continue;
            }
            let body_row = func
                .child_by_field_name("body")
                .map(|b| b.start_position().row)
                .unwrap_or_else(|| func.start_position().row);
            return Some(body_row);
        }
        None
    }

    fn subtree_names_identifier(&self, root: Node<'_>, name: &str) -> bool {
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if n.kind().contains("identifier") && self.node_text(n) == name {
                return true;
            }
            for i in 0..n.child_count() {
                if let Some(c) = n.child(i) {
                    stack.push(c);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_source::Document;

    fn index(content: &str) -> TreeIndex {
        TreeIndex::parse(&Document::from_str("t.js", content).unwrap()).expect("parse")
    }

    #[test]
    fn return_span_covers_multi_line_expression() {
        let t = index("function f(a) {\n  return {\n    value: a,\n  };\n}\n");
        assert_eq!(t.return_span(2), Some((1, 3)));
        assert_eq!(t.return_span(0), None);
    }

    #[test]
    fn direct_parameter_resolves_to_body_row() {
        let t = index("function foo(a, b) {\n  return a;\n}\n");
        assert_eq!(t.parameter_body_line(0, "a"), Some(0));
        assert_eq!(t.parameter_body_line(0, "missing"), None);
    }

    #[test]
    fn destructured_parameter_is_recognized() {
        let t = index("function handle({ id, name }, extra) {\n  use(id);\n}\n");
        assert_eq!(t.parameter_body_line(0, "id"), Some(0));
        assert_eq!(t.parameter_body_line(0, "name"), Some(0));
        assert_eq!(t.parameter_body_line(0, "extra"), Some(0));
    }

    #[test]
    fn nearest_function_wins_for_nested_scopes() {
        let t = index(
            "function outer(a) {\n  const inner = (b) => {\n    use(b);\n  };\n}\n",
        );
        // `b` is a parameter of the arrow, whose body opens on row 1
        assert_eq!(t.parameter_body_line(2, "b"), Some(1));
        // `a` belongs to the outer function
        assert_eq!(t.parameter_body_line(2, "a"), Some(0));
    }

    #[test]
    fn object_literal_is_not_a_parameter() {
        let t = index("const cfg = {\n  id: 1,\n};\n");
        assert_eq!(t.parameter_body_line(0, "id"), None);
        assert_eq!(t.parameter_body_line(1, "id"), None);
    }
}

//! Expression-shape classification.
//!
//! Given a selection (a variable/expression name plus the line it sits on),
//! decide how that value is produced syntactically. The decision drives the
//! insertion-line strategy downstream, so the contract is deliberately
//! rigid: checkers run in one fixed priority order, the first positive match
//! wins, and a selection that matches nothing still classifies as a
//! primitive assignment. Classification never fails.
//!
//! The priority order lives in a single table rather than a chain of
//! conditionals so it can be read, reordered, and tested in one place.
//! Decorator lines and condition-guard occurrences are special-cased ahead
//! of the table; each forces a fixed placement decision.

use core_source::{Document, Selection};
use tracing::debug;

mod checkers;
pub mod patterns;
mod tree;

pub use tree::TreeIndex;

use checkers::Ctx;

/// How the selected value is produced. Closed set; variants are ordered by
/// classification priority (highest first, after the two special cases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionShape {
    /// `@Decorator(...)` line; placement skips into the decorated body.
    Decorator,
    /// Selection inside an `if`/`while`/`switch`/`catch` condition.
    ConditionGuard,
    ReturnSubExpression,
    ObjectLiteralAssignment,
    FunctionParameter,
    ArrayLiteralAssignment,
    TemplateString,
    TernaryAssignment,
    BinaryExpressionAssignment,
    PropertyChainAccess,
    MethodCallSubExpression,
    ObjectMethodCallAssignment,
    FunctionCallAssignment,
    NamedFunctionAssignment,
    PrimitiveAssignment,
    PropertyAccessAssignment,
}

/// Shape-specific context handed to the matching insertion-line strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeDetail {
    /// Nothing beyond the shape itself.
    Plain,
    /// A multi-line construct's opening line (closing discovered by the
    /// scanner when the strategy runs).
    Span {
        opening_line: usize,
        closing_line: Option<usize>,
    },
    /// A statement the breadcrumb must precede; insertion targets this line.
    StatementStart { line: usize },
    /// Selection is a property key nested in an object literal: the
    /// literal's opening line plus the dotted path down to the selection.
    NestedProperty { opening_line: usize, path: String },
}

/// Outcome of one classification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub shape: ExpressionShape,
    pub detail: ShapeDetail,
}

type CheckFn = fn(&Ctx<'_>) -> Option<ShapeDetail>;

/// The priority table. Order is semantic: earlier entries win ties, and the
/// tests pin adversarial snippets to the entry that must claim them.
const CHECKERS: &[(ExpressionShape, CheckFn)] = &[
    (ExpressionShape::ReturnSubExpression, checkers::check_return),
    (
        ExpressionShape::ObjectLiteralAssignment,
        checkers::check_object_literal,
    ),
    (
        ExpressionShape::FunctionParameter,
        checkers::check_function_parameter,
    ),
    (
        ExpressionShape::ArrayLiteralAssignment,
        checkers::check_array_literal,
    ),
    (
        ExpressionShape::TemplateString,
        checkers::check_template_string,
    ),
    (ExpressionShape::TernaryAssignment, checkers::check_ternary),
    (
        ExpressionShape::BinaryExpressionAssignment,
        checkers::check_binary,
    ),
    (
        ExpressionShape::PropertyChainAccess,
        checkers::check_property_chain,
    ),
    (
        ExpressionShape::MethodCallSubExpression,
        checkers::check_method_call_sub,
    ),
    (
        ExpressionShape::ObjectMethodCallAssignment,
        checkers::check_object_method_call,
    ),
    (
        ExpressionShape::FunctionCallAssignment,
        checkers::check_function_call,
    ),
    (
        ExpressionShape::NamedFunctionAssignment,
        checkers::check_named_function,
    ),
    (
        ExpressionShape::PrimitiveAssignment,
        checkers::check_primitive,
    ),
    (
        ExpressionShape::PropertyAccessAssignment,
        checkers::check_property_access_assignment,
    ),
];

/// Classify `selection` against `doc`, parsing the file once for the
/// tree-refined checkers. Parse failure silently degrades to the text path.
pub fn classify(doc: &Document, selection: &Selection) -> ClassificationResult {
    let tree = TreeIndex::parse(doc);
    classify_with(doc, selection, tree.as_ref())
}

/// Classification against an optional pre-parsed tree; `classify` is the
/// convenience wrapper. Callers resolving several selections against one
/// snapshot parse once and reuse the index.
pub fn classify_with(
    doc: &Document,
    selection: &Selection,
    tree: Option<&TreeIndex>,
) -> ClassificationResult {
    let text = doc.line_text(selection.line).unwrap_or_default();
    let ctx = Ctx {
        doc,
        line: selection.line,
        text,
        selected: &selection.text,
        tree,
    };

    if let Some(detail) = checkers::check_decorator(&ctx) {
        return finish(ExpressionShape::Decorator, detail, selection);
    }
    if let Some(detail) = checkers::check_condition_guard(&ctx) {
        return finish(ExpressionShape::ConditionGuard, detail, selection);
    }
    for (shape, check) in CHECKERS {
        if let Some(detail) = check(&ctx) {
            return finish(*shape, detail, selection);
        }
    }
    // nothing claimed the selection: the fixed fallback
    finish(
        ExpressionShape::PrimitiveAssignment,
        ShapeDetail::Plain,
        selection,
    )
}

fn finish(
    shape: ExpressionShape,
    detail: ShapeDetail,
    selection: &Selection,
) -> ClassificationResult {
    debug!(
        target: "classify",
        line = selection.line,
        selected = selection.text.as_str(),
        ?shape,
        "classified"
    );
    ClassificationResult { shape, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape_of(content: &str, line: usize, selected: &str) -> ExpressionShape {
        let doc = Document::from_str("t.js", content).unwrap();
        classify(&doc, &Selection::new(line, selected)).shape
    }

    #[test]
    fn primitive_assignment_is_default_and_direct() {
        assert_eq!(
            shape_of("const x = 5;", 0, "x"),
            ExpressionShape::PrimitiveAssignment
        );
        assert_eq!(
            shape_of("const x = other;", 0, "x"),
            ExpressionShape::PrimitiveAssignment
        );
        // unmatched junk still classifies
        assert_eq!(
            shape_of("???", 0, "x"),
            ExpressionShape::PrimitiveAssignment
        );
    }

    #[test]
    fn object_literal_assignment_single_and_multi_line() {
        assert_eq!(
            shape_of("const obj = { a: 1 };", 0, "obj"),
            ExpressionShape::ObjectLiteralAssignment
        );
        let r = {
            let doc = Document::from_str("t.js", "const obj = {\n  a: 1\n};").unwrap();
            classify(&doc, &Selection::new(0, "obj"))
        };
        assert_eq!(r.shape, ExpressionShape::ObjectLiteralAssignment);
        assert_eq!(
            r.detail,
            ShapeDetail::Span {
                opening_line: 0,
                closing_line: None
            }
        );
    }

    #[test]
    fn nested_property_selection_builds_dotted_path() {
        let doc = Document::from_str(
            "t.js",
            "const cfg = {\n  server: {\n    port: 8080,\n  },\n};\n",
        )
        .unwrap();
        let r = classify(&doc, &Selection::new(2, "port"));
        assert_eq!(r.shape, ExpressionShape::ObjectLiteralAssignment);
        assert_eq!(
            r.detail,
            ShapeDetail::NestedProperty {
                opening_line: 0,
                path: "cfg.server.port".into()
            }
        );
    }

    #[test]
    fn array_literal_assignment() {
        assert_eq!(
            shape_of("const xs = [1, 2, 3];", 0, "xs"),
            ExpressionShape::ArrayLiteralAssignment
        );
        assert_eq!(
            shape_of("const xs = [\n  1,\n];", 0, "xs"),
            ExpressionShape::ArrayLiteralAssignment
        );
    }

    #[test]
    fn function_parameter_direct_and_destructured() {
        assert_eq!(
            shape_of("function foo(a, b) {\n  return a;\n}", 0, "a"),
            ExpressionShape::FunctionParameter
        );
        assert_eq!(
            shape_of("function handle({ id, name }) {\n  use(id);\n}", 0, "id"),
            ExpressionShape::FunctionParameter
        );
    }

    #[test]
    fn destructured_variable_is_not_a_parameter() {
        // adversarial for the parameter checker: object pattern, no function
        assert_ne!(
            shape_of("const { id } = payload;", 0, "id"),
            ExpressionShape::FunctionParameter
        );
    }

    #[test]
    fn return_wins_over_parameter_inside_return_expression() {
        let content = "function wrap(v) {\n  return v + 1;\n}";
        assert_eq!(
            shape_of(content, 1, "v"),
            ExpressionShape::ReturnSubExpression
        );
        // on the signature line the same name is a parameter
        assert_eq!(shape_of(content, 0, "v"), ExpressionShape::FunctionParameter);
    }

    #[test]
    fn template_string_beats_ternary_and_binary() {
        assert_eq!(
            shape_of("const msg = `total: ${a + b}`;", 0, "msg"),
            ExpressionShape::TemplateString
        );
        assert_eq!(
            shape_of("const msg = `state: ${ok ? 'y' : 'n'}`;", 0, "msg"),
            ExpressionShape::TemplateString
        );
    }

    #[test]
    fn ternary_assignment() {
        assert_eq!(
            shape_of("const v = cond ? left : right;", 0, "v"),
            ExpressionShape::TernaryAssignment
        );
        // optional chaining is not a ternary
        assert_ne!(
            shape_of("const v = obj?.field;", 0, "v"),
            ExpressionShape::TernaryAssignment
        );
    }

    #[test]
    fn binary_expression_assignment() {
        assert_eq!(
            shape_of("const sum = a + b;", 0, "sum"),
            ExpressionShape::BinaryExpressionAssignment
        );
        // operator buried in call arguments does not make the RHS binary
        assert_eq!(
            shape_of("const r = foo(a + b);", 0, "r"),
            ExpressionShape::FunctionCallAssignment
        );
    }

    #[test]
    fn property_chain_without_assignment() {
        assert_eq!(
            shape_of("user.profile.name;", 0, "user.profile.name"),
            ExpressionShape::PropertyChainAccess
        );
    }

    #[test]
    fn method_call_sub_expression() {
        assert_eq!(
            shape_of("fetchData().then(handleResult);", 0, "handleResult"),
            ExpressionShape::MethodCallSubExpression
        );
    }

    #[test]
    fn callback_parameter_beats_method_call() {
        // the priority order sends an arrow parameter to the parameter
        // checker even inside a `.then(...)` chain
        assert_eq!(
            shape_of("promise.then((res) => {\n  use(res);\n});", 0, "res"),
            ExpressionShape::FunctionParameter
        );
    }

    #[test]
    fn call_assignments_split_on_receiver() {
        assert_eq!(
            shape_of("const r = api.users.fetch(id);", 0, "r"),
            ExpressionShape::ObjectMethodCallAssignment
        );
        assert_eq!(
            shape_of("const r = fetch(id);", 0, "r"),
            ExpressionShape::FunctionCallAssignment
        );
    }

    #[test]
    fn named_function_assignment_forms() {
        assert_eq!(
            shape_of("const f = function build() {\n  return 1;\n};", 0, "f"),
            ExpressionShape::NamedFunctionAssignment
        );
        assert_eq!(
            shape_of("const f = (a) => {\n  return a;\n};", 0, "f"),
            ExpressionShape::NamedFunctionAssignment
        );
    }

    #[test]
    fn property_access_assignment_is_reachable() {
        assert_eq!(
            shape_of("const name = user.name;", 0, "name"),
            ExpressionShape::PropertyAccessAssignment
        );
        assert_eq!(
            shape_of("const first = items[0].label;", 0, "first"),
            ExpressionShape::PropertyAccessAssignment
        );
    }

    #[test]
    fn decorator_line() {
        assert_eq!(
            shape_of("@Injectable()\nclass Service {}", 0, "Injectable"),
            ExpressionShape::Decorator
        );
    }

    #[test]
    fn condition_guard_forms() {
        assert_eq!(
            shape_of("if (count > 0) {\n  work();\n}", 0, "count"),
            ExpressionShape::ConditionGuard
        );
        // binary operator inside the guard must not reach the binary checker
        assert_ne!(
            shape_of("if (a + b) {\n}", 0, "a"),
            ExpressionShape::BinaryExpressionAssignment
        );
        // body lines are not guard occurrences
        assert_ne!(
            shape_of("if (ok) {\n  const x = 1;\n}", 1, "x"),
            ExpressionShape::ConditionGuard
        );
    }

    #[test]
    fn multi_line_guard_condition() {
        let content = "if (\n  ready &&\n  count > 0\n) {\n  go();\n}";
        let doc = Document::from_str("t.js", content).unwrap();
        let r = classify(&doc, &Selection::new(2, "count"));
        assert_eq!(r.shape, ExpressionShape::ConditionGuard);
        assert_eq!(r.detail, ShapeDetail::StatementStart { line: 0 });
    }
}

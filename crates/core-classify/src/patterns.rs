//! Compiled-once regex patterns and small text predicates shared by the
//! shape checkers. Compilation happens lazily on first use; the statics are
//! the single place pattern syntax lives.

use once_cell::sync::Lazy;
use regex::Regex;

/// Declaration-keyword assignment: `const x = ...`, `let x = ...`.
pub static DECL_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:const|let|var)\s+([\w$]+)\s*=\s*(.*)$")
        .expect("decl assignment regex should be valid")
});

/// Bare reassignment or member assignment: `x = ...`, `this.x = ...`,
/// `obj[k] = ...`. The `=` must not be part of `==`, `=>`, `<=`, `>=`, `!=`.
pub static BARE_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*([\w$][\w$.\[\]'"]*)\s*=\s*([^=>].*)$"#)
        .expect("bare assignment regex should be valid")
});

/// Decorator line: `@Component({ ... })`, `@Injectable()`.
pub static DECORATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*@[\w$.]+").expect("decorator regex should be valid"));

/// Condition-guard opener: `if (`, `} else if (`, `while (`, `switch (`,
/// `catch (`.
pub static GUARD_OPENER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\}?\s*(?:else\s+)?(if|while|switch|catch)\s*\(")
        .expect("guard opener regex should be valid")
});

/// `return` statement opener.
pub static RETURN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*return\b").expect("return regex should be valid"));

/// Named function declaration: `function foo(`, `async function* gen(`.
pub static FUNCTION_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([\w$]+)\s*\(")
        .expect("function decl regex should be valid")
});

/// Class declaration.
pub static CLASS_DECL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([\w$]+)")
        .expect("class decl regex should be valid")
});

/// Method definition header inside a class/object: `name(args) {`.
/// Control-flow keywords are filtered by the caller, not the pattern.
pub static METHOD_DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:public\s+|private\s+|protected\s+|static\s+|async\s+|get\s+|set\s+)*\*?\s*([\w$]+)\s*\([^)]*\)?\s*\{?\s*$")
        .expect("method def regex should be valid")
});

/// Arrow-function assignment: `const f = (a, b) => ...`, `let g = x => ...`.
pub static ARROW_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:const|let|var)\s+([\w$]+)\s*=\s*(?:async\s+)?(?:\([^)]*\)?|[\w$]+)\s*=>",
    )
    .expect("arrow assignment regex should be valid")
});

/// RHS shapes, anchored at the start of the right-hand side.
pub static RHS_OBJECT_METHOD_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:await\s+)?[\w$]+(?:\.[\w$]+|\[[^\]]*\])*\.[\w$]+\s*\(")
        .expect("object method call regex should be valid")
});

pub static RHS_FUNCTION_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:await\s+|new\s+)?[\w$]+\s*\(")
        .expect("function call regex should be valid")
});

pub static RHS_FUNCTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:async\s+)?function\b").expect("function rhs regex should be valid")
});

pub static RHS_PRIMITIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:-?[\d_]+(?:\.\d+)?|true|false|null|undefined|'[^']*'|"[^"]*"|[\w$]+)\s*[;,]?\s*$"#)
        .expect("primitive rhs regex should be valid")
});

pub static RHS_PROPERTY_ACCESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w$]+(?:\?\.[\w$]+|\.[\w$]+|\[[^\]]+\])+\s*[;,]?\s*$")
        .expect("property access rhs regex should be valid")
});

/// Method invocation used as a statement/sub-expression: `recv.then(`.
pub static METHOD_INVOKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w$\)\]]\s*\.\s*[\w$]+\s*\(").expect("method invoke regex should be valid")
});

/// Object-literal key that opens a nested block: `key: {`.
pub static KEY_OPENS_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*['"]?([\w$]+)['"]?\s*:\s*\{"#).expect("key block regex should be valid")
});

/// Object-literal key line (block-opening or not): `key: ...`.
pub static KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*['"]?([\w$]+)['"]?\s*:"#).expect("key regex should be valid")
});

/// Split a line into (lhs, rhs) at its assignment operator, if it has one.
/// Declaration-keyword assignments win over bare ones so `const a = b` maps
/// `a` (not `const a`) to the left-hand side.
pub fn assignment_split(line: &str) -> Option<(String, String)> {
    if let Some(c) = DECL_ASSIGNMENT_RE.captures(line) {
        return Some((c[1].to_string(), c[2].trim_start().to_string()));
    }
    if let Some(c) = BARE_ASSIGNMENT_RE.captures(line) {
        return Some((c[1].to_string(), c[2].trim_start().to_string()));
    }
    None
}

/// Replace quoted string contents with spaces so operator scans do not trip
/// over characters inside literals. Quote characters themselves survive.
fn blank_strings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut prev_escape = false;
    for c in text.chars() {
        match quote {
            Some(q) => {
                if c == q && !prev_escape {
                    quote = None;
                    out.push(c);
                } else {
                    prev_escape = c == '\\' && !prev_escape;
                    out.push(' ');
                }
                continue;
            }
            None => {
                if c == '\'' || c == '"' || c == '`' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
        prev_escape = false;
    }
    out
}

const BINARY_OPS: &[&str] = &[
    "&&", "||", "??", "===", "!==", "==", "!=", ">=", "<=", " + ", " - ", " * ", " / ", " % ",
    " < ", " > ",
];

/// True when `rhs` carries a binary operator at bracket depth zero, i.e. the
/// operator belongs to the expression root rather than to a call argument or
/// nested literal.
pub fn has_top_level_binary_op(rhs: &str) -> bool {
    let blanked = blank_strings(rhs);
    let bytes = blanked.as_bytes();
    let mut depth = 0i32;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            _ => {
                if depth == 0 {
                    if bytes[i..].starts_with(b"=>") {
                        // skip the arrow so `>` is not read as a comparison
                        i += 2;
                        continue;
                    }
                    for op in BINARY_OPS {
                        if bytes[i..].starts_with(op.as_bytes()) {
                            return true;
                        }
                    }
                }
            }
        }
        i += 1;
    }
    false
}

/// True when `window` (an assignment RHS plus bounded lookahead) contains a
/// ternary at bracket depth zero: a `?` that is neither optional chaining
/// (`?.`) nor nullish coalescing (`??`), with a later top-level `:`.
pub fn has_top_level_ternary(window: &str) -> bool {
    let blanked = blank_strings(window);
    let bytes = blanked.as_bytes();
    let mut depth = 0i32;
    let mut saw_question = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'?' if depth == 0 => {
                let next = bytes.get(i + 1).copied();
                if next == Some(b'.') || next == Some(b'?') {
                    i += 2;
                    continue;
                }
                saw_question = true;
            }
            b':' if depth == 0 && saw_question => return true,
            _ => {}
        }
        i += 1;
    }
    false
}

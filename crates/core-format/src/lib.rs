//! Generated-statement text assembly.
//!
//! Turns resolution outputs (selection, breadcrumb, indentation, target
//! line) plus the `[log]` options into the exact line(s) handed to the
//! editor collaborator. Pure string work; placement decisions never happen
//! here.
//!
//! Message layout, segments separated by the configured delimiter:
//!
//! ```text
//! <prefix> ~ file: app.js:12 ~ ClassName ~ functionName ~ selected:
//! ```
//!
//! The prefix and the delimiter double as the marker pair the detector
//! later uses to recognize our statements, so every emitted form (wrapped
//! included) carries both.

use core_config::LogConfig;
use core_resolve::EnclosingContext;

/// Inputs for one statement, all produced by the resolution crates.
#[derive(Debug, Clone)]
pub struct StatementContext<'a> {
    /// Expression to log; a plain name or a dotted property path.
    pub selected: &'a str,
    pub file_name: Option<&'a str>,
    /// Line index the statement is inserted at (0-based).
    pub insertion_line: usize,
    pub scope: &'a EnclosingContext,
    pub indentation: &'a str,
}

/// Build the inserted line(s): one statement, or three when wrapping is on.
/// Every returned line already carries the indentation.
pub fn build_lines(ctx: &StatementContext<'_>, cfg: &LogConfig) -> Vec<String> {
    let statement = build_statement(ctx, cfg);
    if !cfg.wrap_log_message {
        return vec![statement];
    }
    let border = wrap_border(ctx, cfg);
    vec![border.clone(), statement, border]
}

/// The single log statement for `ctx`.
pub fn build_statement(ctx: &StatementContext<'_>, cfg: &LogConfig) -> String {
    let quote = choose_quote(cfg, ctx.selected);
    let delim = format!(" {} ", cfg.delimiter_inside_message);

    let mut segments: Vec<String> = vec![cfg.log_message_prefix.clone()];
    if let Some(loc) = location_segment(ctx.file_name, ctx.insertion_line, cfg) {
        segments.push(loc);
    }
    if cfg.insert_enclosing_class && !ctx.scope.class_name.is_empty() {
        segments.push(ctx.scope.class_name.clone());
    }
    if cfg.insert_enclosing_function && !ctx.scope.function_name.is_empty() {
        segments.push(ctx.scope.function_name.clone());
    }
    segments.push(format!("{}{}", ctx.selected, cfg.log_message_suffix));

    let message = segments.join(&delim);
    let semicolon = if cfg.add_semicolon_in_the_end { ";" } else { "" };
    format!(
        "{}{}({q}{message}{q}, {}){semicolon}",
        ctx.indentation,
        cfg.log_function,
        ctx.selected,
        q = quote,
    )
}

/// The `file: name:line` segment (1-based line as displayed), honoring the
/// two include flags. `None` when both are off.
pub fn location_segment(
    file_name: Option<&str>,
    insertion_line: usize,
    cfg: &LogConfig,
) -> Option<String> {
    let display_line = insertion_line + 1;
    match (cfg.include_filename, cfg.include_line_num) {
        (true, true) => Some(format!(
            "file: {}:{display_line}",
            file_name.unwrap_or("unknown")
        )),
        (true, false) => Some(format!("file: {}", file_name.unwrap_or("unknown"))),
        (false, true) => Some(format!("line: {display_line}")),
        (false, false) => None,
    }
}

fn wrap_border(ctx: &StatementContext<'_>, cfg: &LogConfig) -> String {
    let quote = choose_quote(cfg, ctx.selected);
    let semicolon = if cfg.add_semicolon_in_the_end { ";" } else { "" };
    format!(
        "{}{}({q}{} {} {}{q}){semicolon}",
        ctx.indentation,
        cfg.log_function,
        cfg.log_message_prefix,
        cfg.delimiter_inside_message,
        "-".repeat(24),
        q = quote,
    )
}

/// The configured quote unless the selection contains it; then the first
/// non-colliding alternative.
fn choose_quote<'a>(cfg: &'a LogConfig, selected: &str) -> &'a str {
    if !selected.contains(cfg.quote.as_str()) {
        return cfg.quote.as_str();
    }
    for candidate in ["\"", "'", "`"] {
        if !selected.contains(candidate) {
            return candidate;
        }
    }
    cfg.quote.as_str()
}

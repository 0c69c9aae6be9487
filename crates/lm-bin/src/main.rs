//! Logmark entrypoint.
//!
//! Thin collaborator around the library crates: argument parsing, logging
//! bootstrap, file I/O, and plan application. Placement and detection logic
//! all live below; this binary only moves bytes in and out.

use anyhow::{Context, Result, bail};
use clap::Parser;
use core_edit::{apply_plan, comment_plan, correct_plan, delete_plan, insert_plan, uncomment_plan};
use core_source::{Document, Selection};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "logmark", version, about = "Insert and manage generated log statements")]
struct Args {
    /// Source file to operate on (UTF-8 text).
    pub path: PathBuf,
    /// Operation to perform.
    #[arg(long, value_enum, default_value = "insert")]
    pub action: Action,
    /// Selection line, 0-based (insert only).
    #[arg(long)]
    pub line: Option<usize>,
    /// Selected variable/expression name (insert only).
    #[arg(long)]
    pub word: Option<String>,
    /// Optional configuration file path (overrides discovery of `logmark.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Tab width used when mirroring indentation.
    #[arg(long = "tab-width", default_value_t = 4)]
    pub tab_width: usize,
    /// Also delete statements that share the invocation name but carry no
    /// marker pair.
    #[arg(long = "include-foreign", default_value_t = false)]
    pub include_foreign: bool,
    /// Rewrite the file instead of printing the edited text to stdout.
    #[arg(long = "in-place", default_value_t = false)]
    pub in_place: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Action {
    Insert,
    Comment,
    Uncomment,
    Delete,
    Correct,
}

fn configure_logging() -> Option<WorkerGuard> {
    let file_appender = tracing_appender::rolling::never(Path::new("."), "logmark.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        // Global subscriber already installed; drop guard so the writer
        // shuts down.
        Err(_err) => None,
    }
}

fn load_document(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Document::from_str(name, &content)
}

fn main() -> Result<()> {
    let _log_guard = configure_logging();
    let args = Args::parse();

    let config = core_config::load_from(args.config.clone())?;
    let log_cfg = config.log();

    let doc = match load_document(&args.path) {
        Ok(doc) => doc,
        Err(err) => {
            // bulk operations degrade to an empty result; insert needs the file
            if matches!(args.action, Action::Insert) {
                return Err(err);
            }
            warn!(target: "io", path = %args.path.display(), %err, "load_failed");
            return Ok(());
        }
    };

    info!(
        target: "runtime",
        path = %args.path.display(),
        action = ?args.action,
        lines = doc.line_count(),
        "startup"
    );

    let plan = match args.action {
        Action::Insert => {
            let (Some(line), Some(word)) = (args.line, args.word.clone()) else {
                bail!("--action insert requires --line and --word");
            };
            let selection = Selection::new(line, word.trim());
            insert_plan(&doc, &selection, log_cfg, args.tab_width)
                .with_context(|| format!("planning insert at line {line}"))?
        }
        Action::Comment => comment_plan(&doc, log_cfg),
        Action::Uncomment => uncomment_plan(&doc, log_cfg),
        Action::Delete => delete_plan(&doc, log_cfg, args.include_foreign),
        Action::Correct => correct_plan(&doc, log_cfg),
    };

    if plan.is_empty() {
        info!(target: "runtime", "nothing_to_do");
        if !args.in_place {
            print!("{}", doc.text());
        }
        return Ok(());
    }

    let edited = apply_plan(&doc, &plan);
    if args.in_place {
        std::fs::write(&args.path, edited.text())
            .with_context(|| format!("writing {}", args.path.display()))?;
        info!(target: "runtime", edits = plan.len(), "file_updated");
    } else {
        print!("{}", edited.text());
    }
    Ok(())
}

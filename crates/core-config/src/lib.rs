//! Configuration loading and parsing.
//!
//! Parses `logmark.toml` (or an override path provided by the binary),
//! extracting the `[log]` table that controls how generated statements are
//! formatted. None of these options influence placement — the resolution
//! crates never see them; the formatter and operations layer consume them
//! verbatim.
//!
//! Unknown fields are ignored (TOML deserialization tolerance) to allow
//! forward evolution without immediate warnings, and a file that fails to
//! parse falls back to defaults rather than aborting the command.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Formatting options for generated statements. Field names mirror the
/// `[log]` table keys.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Wrap the statement in a decorative top/bottom statement pair.
    pub wrap_log_message: bool,
    /// Marker token identifying our statements (first of the two).
    pub log_message_prefix: String,
    /// Appended to the message text, before the closing quote.
    pub log_message_suffix: String,
    pub add_semicolon_in_the_end: bool,
    pub insert_enclosing_class: bool,
    pub insert_enclosing_function: bool,
    /// Quote character: `"`, `'`, or a backtick.
    pub quote: String,
    /// Separator between message segments (second marker token).
    pub delimiter_inside_message: String,
    pub include_line_num: bool,
    pub include_filename: bool,
    /// Call expression name, e.g. `console.log` or `logger.debug`.
    pub log_function: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            wrap_log_message: false,
            log_message_prefix: "🚀".into(),
            log_message_suffix: ":".into(),
            add_semicolon_in_the_end: true,
            insert_enclosing_class: true,
            insert_enclosing_function: true,
            quote: "\"".into(),
            delimiter_inside_message: "~".into(),
            include_line_num: false,
            include_filename: false,
            log_function: "console.log".into(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

impl Config {
    pub fn log(&self) -> &LogConfig {
        &self.file.log
    }
}

/// Best-effort config path following platform conventions: prefer a local
/// `logmark.toml` before the platform config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("logmark.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("logmark").join("logmark.toml");
    }
    // Final fallback relative filename.
    PathBuf::from("logmark.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => {
                info!(
                    target: "config",
                    path = %path.display(),
                    log_function = file.log.log_function.as_str(),
                    "config_loaded"
                );
                Ok(Config {
                    raw: Some(content),
                    file,
                })
            }
            Err(err) => {
                // On parse error fall back to defaults; the command still runs.
                warn!(target: "config", path = %path.display(), %err, "config_parse_failed");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.log().log_function, "console.log");
        assert_eq!(cfg.log().log_message_prefix, "🚀");
        assert_eq!(cfg.log().delimiter_inside_message, "~");
        assert!(cfg.log().add_semicolon_in_the_end);
        assert!(!cfg.log().wrap_log_message);
    }

    #[test]
    fn parses_log_table_values() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[log]\nlog_function = \"logger.debug\"\nquote = \"'\"\ninclude_line_num = true\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.log().log_function, "logger.debug");
        assert_eq!(cfg.log().quote, "'");
        assert!(cfg.log().include_line_num);
        // untouched keys keep their defaults
        assert_eq!(cfg.log().log_message_prefix, "🚀");
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[log\nbroken =").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.log().log_function, "console.log");
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[log]\nfuture_option = 3\n[other]\nx = 1\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.log().log_function, "console.log");
        assert!(cfg.raw.is_some());
    }
}

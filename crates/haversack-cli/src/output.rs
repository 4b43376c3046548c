//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, bare values for pipes, or stable
//! JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--json` flag
//! 2. `HAVERSACK_FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `[output] format` in `haversack.toml`
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.
//!
//! The precedence itself lives in [`haversack_core::config::resolve_output`].

use std::io::{self, Write};

use haversack_core::config::ConfigError;
use haversack_core::error::ErrorCode;
use haversack_core::graph::GraphError;
use haversack_core::rules::RuleError;
use serde::Serialize;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 48;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-optimized output (sections, labels).
    Pretty,
    /// Bare values, one per line, for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    /// Map a resolved mode name to a mode. Unknown names fall back to text.
    pub fn from_name(name: &str) -> Self {
        match name {
            "pretty" => Self::Pretty,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_mode_to(&mut out, mode, value, text_fn, pretty_fn)
}

/// [`render_mode`] into an arbitrary writer.
pub fn render_mode_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, out)?,
        OutputMode::Pretty => pretty_fn(value, out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E1001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    fn with_code(message: String, code: ErrorCode) -> Self {
        Self {
            message,
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Classify an error chain by the first typed error found in it.
fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<RuleError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<GraphError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.code())
        } else if cause.is::<io::Error>() {
            Some(ErrorCode::InputUnreadable)
        } else {
            None
        }
    })
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        match error_code(err) {
            Some(code) => Self::with_code(message, code),
            None => Self::new(message),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    render_error_to(&mut out, mode, error)
}

/// [`render_error`] into an arbitrary writer.
pub fn render_error_to(
    out: &mut dyn Write,
    mode: OutputMode,
    error: &CliError,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match error.error_code {
                Some(ref code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use haversack_core::rules::parse;

    #[derive(Serialize)]
    struct Sample {
        total: u64,
    }

    fn render_to_string(mode: OutputMode) -> String {
        let mut buf = Vec::new();
        render_mode_to(
            &mut buf,
            mode,
            &Sample { total: 32 },
            |s, w| writeln!(w, "{}", s.total),
            |s, w| pretty_kv(w, "Total", s.total.to_string()),
        )
        .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn from_name_maps_modes() {
        assert_eq!(OutputMode::from_name("pretty"), OutputMode::Pretty);
        assert_eq!(OutputMode::from_name("json"), OutputMode::Json);
        assert_eq!(OutputMode::from_name("text"), OutputMode::Text);
        assert!(OutputMode::from_name("json").is_json());
    }

    #[test]
    fn render_text_is_bare_value() {
        assert_eq!(render_to_string(OutputMode::Text), "32\n");
    }

    #[test]
    fn render_pretty_uses_labels() {
        assert_eq!(render_to_string(OutputMode::Pretty), "Total:       32\n");
    }

    #[test]
    fn render_json_output() {
        let json: serde_json::Value =
            serde_json::from_str(&render_to_string(OutputMode::Json)).expect("valid json");
        assert_eq!(json["total"], 32);
    }

    #[test]
    fn pretty_section_draws_rule() {
        let mut buf = Vec::new();
        pretty_section(&mut buf, "Heading").expect("render");
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(rendered.starts_with("Heading\n"));
        assert!(rendered.contains(&"-".repeat(PRETTY_RULE_WIDTH)));
    }

    #[test]
    fn cli_error_simple() {
        let err = CliError::new("something went wrong");
        assert_eq!(err.message, "something went wrong");
        assert!(err.suggestion.is_none());
        assert!(err.error_code.is_none());
    }

    #[test]
    fn rule_error_gets_code_and_hint() {
        let err = parse("a bags contain 1 b bag")
            .context("failed to parse rules.txt")
            .expect_err("missing period");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1001"));
        assert!(cli.suggestion.is_some());
        assert!(cli.message.starts_with("failed to parse rules.txt: line 1:"));
    }

    #[test]
    fn io_error_is_input_unreadable() {
        let err = anyhow::Error::new(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E1003"));
    }

    #[test]
    fn every_catalogued_code_is_raised_by_some_error() {
        use haversack_core::graph::{ContainmentGraph, total_contained};
        use std::collections::HashSet;

        let overflow = ContainmentGraph::from_rules(
            "a bags contain 4294967295 b bags.\n\
             b bags contain 4294967295 c bags.\n\
             c bags contain 4294967295 d bags.\n",
        )
        .expect("rules parse");
        let cyclic = ContainmentGraph::from_rules("a bags contain 1 a bag.\n").expect("rules parse");

        let errors = [
            anyhow::Error::new(parse("nonsense").expect_err("malformed")),
            anyhow::Error::new(ConfigError::UnknownFormat("yaml".to_string())),
            anyhow::Error::new(io::Error::new(io::ErrorKind::NotFound, "gone")),
            anyhow::Error::new(total_contained(&cyclic, "a").expect_err("cycle")),
            anyhow::Error::new(total_contained(&overflow, "a").expect_err("overflow")),
        ];

        let raised: HashSet<String> = errors
            .iter()
            .filter_map(|err| CliError::from(err).error_code)
            .collect();
        let catalogued: HashSet<String> = ErrorCode::ALL
            .iter()
            .map(|code| code.code().to_string())
            .collect();
        assert_eq!(raised, catalogued);
    }

    #[test]
    fn untyped_error_has_no_code() {
        let err = anyhow::anyhow!("plain failure");
        let cli = CliError::from(&err);
        assert!(cli.error_code.is_none());
    }

    #[test]
    fn render_error_json() {
        let mut buf = Vec::new();
        let err = CliError::new("bad input");
        render_error_to(&mut buf, OutputMode::Json, &err).expect("render");
        let json: serde_json::Value = serde_json::from_slice(&buf).expect("valid json");
        assert_eq!(json["error"]["message"], "bad input");
        assert!(json["error"].get("error_code").is_none());
    }

    #[test]
    fn render_error_human_includes_code_and_suggestion() {
        let mut buf = Vec::new();
        let err = CliError::with_code("cycle".to_string(), ErrorCode::CyclicContainment);
        render_error_to(&mut buf, OutputMode::Pretty, &err).expect("render");
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(rendered.starts_with("error[E2001]: cycle\n"));
        assert!(rendered.contains("  suggestion: "));
    }
}

use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::DEFAULT_TARGET;
use crate::error::ErrorCode;
use crate::rules::MalformedPolicy;

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "haversack.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaversackConfig {
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_target")]
    pub target: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseConfig {
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: Option<String>,
}

/// Errors raised while loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown output format '{0}': expected pretty, text, or json")]
    UnknownFormat(String),
}

impl ConfigError {
    /// Stable machine code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ConfigParseError
    }
}

/// Load a config file. A missing file yields the defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<HaversackConfig, ConfigError> {
    if !path.exists() {
        return Ok(HaversackConfig::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config = toml::from_str::<HaversackConfig>(&content).map_err(|source| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if let Some(format) = config
        .output
        .format
        .as_deref()
        .filter(|format| normalize_output_mode(format).is_none())
    {
        return Err(ConfigError::UnknownFormat(format.to_string()));
    }

    Ok(config)
}

/// Load `haversack.toml` from `project_root`, or an explicit path if given.
///
/// # Errors
///
/// See [`load_config`].
pub fn discover_config(
    project_root: &Path,
    explicit: Option<&Path>,
) -> Result<HaversackConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => load_config(&project_root.join(CONFIG_FILE_NAME)),
    }
}

/// Resolve the output mode name: `"pretty"`, `"text"` or `"json"`.
///
/// Precedence (highest wins): `--json`, the `HAVERSACK_FORMAT` env value,
/// the config file, then pretty on a terminal and text when piped.
pub fn resolve_output(
    cli_json: bool,
    config_output: Option<&str>,
    env_format: Option<&str>,
) -> &'static str {
    if cli_json {
        return "json";
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode;
    }

    if let Some(mode) = config_output.and_then(normalize_output_mode) {
        return mode;
    }

    if std::io::stdout().is_terminal() {
        "pretty"
    } else {
        "text"
    }
}

fn normalize_output_mode(raw: &str) -> Option<&'static str> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "human" => Some("pretty"),
        "text" | "plain" => Some("text"),
        "json" => Some("json"),
        _ => None,
    }
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = discover_config(dir.path(), None).expect("load should succeed");
        assert_eq!(cfg, HaversackConfig::default());
        assert_eq!(cfg.query.target, "shiny gold");
        assert_eq!(cfg.parse.on_malformed, MalformedPolicy::Fail);
        assert!(cfg.output.format.is_none());
    }

    #[test]
    fn full_config_parses() {
        let dir = tempfile::tempdir().expect("temp dir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
[query]
target = "dark olive"

[parse]
on_malformed = "skip"

[output]
format = "json"
"#,
        )
        .expect("write config");

        let cfg = discover_config(dir.path(), None).expect("load should succeed");
        assert_eq!(cfg.query.target, "dark olive");
        assert_eq!(cfg.parse.on_malformed, MalformedPolicy::Skip);
        assert_eq!(cfg.output.format.as_deref(), Some("json"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[parse]\non_malformed = \"skip\"\n").expect("write config");

        let cfg = discover_config(dir.path(), Some(&path)).expect("load should succeed");
        assert_eq!(cfg.query.target, "shiny gold");
        assert_eq!(cfg.parse.on_malformed, MalformedPolicy::Skip);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[parse]\non_malformed = \"ignore\"\n").expect("write config");

        let err = load_config(&path).expect_err("unknown policy");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn unknown_output_format_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[output]\nformat = \"yaml\"\n").expect("write config");

        let err = load_config(&path).expect_err("unknown format");
        assert!(matches!(err, ConfigError::UnknownFormat(ref f) if f == "yaml"));
    }

    #[test]
    fn cli_json_overrides_env_and_config() {
        assert_eq!(resolve_output(true, Some("pretty"), Some("text")), "json");
    }

    #[test]
    fn env_overrides_config() {
        assert_eq!(resolve_output(false, Some("json"), Some("text")), "text");
    }

    #[test]
    fn aliases_are_normalized() {
        assert_eq!(resolve_output(false, Some("plain"), Some("human")), "pretty");
        assert_eq!(resolve_output(false, Some("plain"), Some("bogus")), "text");
    }
}

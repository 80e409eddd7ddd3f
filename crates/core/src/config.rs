//! Configuration loading and persistence.
//!
//! The config store is a newline-delimited `key: value` file of scalars
//! (`.merge-resolver.yaml` at the repo root): `#` starts a comment, string
//! values may be quoted, and `true`/`false`/numeric literals are coerced.
//! The effective configuration layers built-in defaults under file values,
//! with the `GOOGLE_API_KEY` environment variable strictly overriding the
//! file for the credential field only.
//!
//! Configuration is reloaded fresh on every invocation and never cached.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::ConfigError;

/// Name of the config store at the repo root.
pub const CONFIG_FILENAME: &str = ".merge-resolver.yaml";

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_TEMPERATURE: f64 = 0.2;

// ---------------------------------------------------------------------------
// Scalar values
// ---------------------------------------------------------------------------

/// A coerced scalar value from the config store.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Parse a raw value: unwrap matching quotes, then coerce booleans and
    /// numbers. Everything else stays a string.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        for quote in ['"', '\''] {
            if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
                return Self::String(raw[1..raw.len() - 1].to_string());
            }
        }
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if !raw.is_empty() {
            if let Ok(n) = raw.parse::<f64>() {
                return Self::Number(n);
            }
        }
        Self::String(raw.to_string())
    }

    /// The value as plain text, without quoting.
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    /// Store representation: strings are quoted, other scalars literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
        }
    }
}

/// Render a number without a trailing `.0` for integral values.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Parse a `key: value` scalar document. Blank lines, comments, and lines
/// without a colon are skipped.
pub fn parse_scalar_document(text: &str) -> BTreeMap<String, Scalar> {
    let mut values = BTreeMap::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once(':') {
            values.insert(key.trim().to_string(), Scalar::parse(value));
        }
    }
    values
}

/// Render a scalar document back to text.
pub fn render_scalar_document(values: &BTreeMap<String, Scalar>) -> String {
    let mut out = String::new();
    for (key, value) in values {
        out.push_str(&format!("{key}: {value}\n"));
    }
    out
}

// ---------------------------------------------------------------------------
// Effective configuration
// ---------------------------------------------------------------------------

/// The effective configuration consumed by the resolution provider.
#[derive(Debug, Clone)]
pub struct Config {
    /// Generative model identifier.
    pub model: String,
    /// Sampling temperature for resolution requests.
    pub temperature: f64,
    /// Effective credential, environment winning over the file.
    pub api_key: Option<String>,
    /// Where the config store lives (whether or not the file exists).
    pub source_path: PathBuf,
    /// File keys other than the recognized fields, preserved for display.
    extras: BTreeMap<String, Scalar>,
}

impl Config {
    /// Load the effective configuration for a repo root, reading
    /// `GOOGLE_API_KEY` from the process environment.
    pub fn load(repo_root: &Path) -> Result<Self, ConfigError> {
        let env_key = std::env::var(API_KEY_ENV).ok();
        Self::load_with_env(repo_root, env_key)
    }

    /// Load with an explicit environment credential, the seam used by
    /// tests to avoid process-global state.
    pub fn load_with_env(
        repo_root: &Path,
        env_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let source_path = repo_root.join(CONFIG_FILENAME);
        let mut values = match std::fs::read_to_string(&source_path) {
            Ok(text) => parse_scalar_document(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: source_path.display().to_string(),
                    source: e,
                })
            }
        };

        let model = values
            .remove("model")
            .map(|v| v.as_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let temperature = values
            .remove("temperature")
            .and_then(|v| v.as_number())
            .unwrap_or(DEFAULT_TEMPERATURE);

        // Environment strictly wins for the credential field.
        let file_key = values
            .remove("apiKey")
            .map(|v| v.as_string())
            .filter(|v| !v.is_empty());
        let api_key = env_api_key.filter(|v| !v.is_empty()).or(file_key);

        debug!(
            path = %source_path.display(),
            model = %model,
            has_key = api_key.is_some(),
            "loaded configuration"
        );

        Ok(Self {
            model,
            temperature,
            api_key,
            source_path,
            extras: values,
        })
    }

    /// The credential, or the batch-fatal error when absent.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    /// Persist a single `key: value` pair to the store, preserving all
    /// other stored keys. Environment overrides are never written back.
    pub fn set_value(repo_root: &Path, key: &str, raw_value: &str) -> Result<PathBuf, ConfigError> {
        let path = repo_root.join(CONFIG_FILENAME);
        let mut values = match std::fs::read_to_string(&path) {
            Ok(text) => parse_scalar_document(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        values.insert(key.to_string(), Scalar::parse(raw_value));
        std::fs::write(&path, render_scalar_document(&values)).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        info!(key, path = %path.display(), "persisted config value");
        Ok(path)
    }

    /// Key/value pairs of the effective configuration for display, with
    /// credential-bearing values redacted.
    pub fn display_entries(&self) -> Vec<(String, String)> {
        let mut entries = vec![
            ("model".to_string(), self.model.clone()),
            ("temperature".to_string(), format_number(self.temperature)),
            (
                "apiKey".to_string(),
                redact("apiKey", self.api_key.as_deref().unwrap_or("")),
            ),
        ];
        for (key, value) in &self.extras {
            entries.push((key.clone(), redact(key, &value.as_string())));
        }
        entries
    }
}

/// Redact a value when its key looks credential-bearing: keep the first
/// five characters and mask the rest.
pub fn redact(key: &str, value: &str) -> String {
    if key.to_lowercase().contains("key") && !value.is_empty() {
        let head: String = value.chars().take(5).collect();
        format!("{head}***")
    } else {
        value.to_string()
    }
}

//! Error types for the merge-resolve core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them all for callers that want a
//! single error type.
//!
//! Two fault classes are deliberately absent: malformed trailing conflict
//! markers (the parser truncates silently, see `conflict::parser`), and an
//! operator quit during interactive review (reported as a batch outcome,
//! not an error).

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and persistence.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No API key in the environment or the config file. Fatal to the
    /// whole batch; there is nothing useful to do per file without one.
    #[error(
        "missing Google API key: set the GOOGLE_API_KEY environment variable \
         or run `merge-resolve config apiKey=YOUR_KEY`"
    )]
    MissingApiKey,

    /// The config store could not be read or written.
    #[error("configuration I/O error at '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Provider errors
// ---------------------------------------------------------------------------

/// Errors from the external resolution provider.
///
/// A provider fault aborts resolution of the current file only; earlier
/// files already written are unaffected and later files are still tried.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP-level transport error (network, TLS, etc.).
    #[error("provider HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("provider API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The API key was rejected.
    #[error("provider authentication rejected: {0}")]
    AuthenticationFailed(String),

    /// The response carried no usable text once code fences and blank
    /// edges were stripped.
    #[error("provider returned an empty resolution")]
    EmptyResponse,

    /// The response body did not have the expected shape.
    #[error("provider response parse error: {0}")]
    ParseError(String),
}

// ---------------------------------------------------------------------------
// Git errors
// ---------------------------------------------------------------------------

/// Errors from local git operations (conflict detection).
#[derive(Debug, Error)]
pub enum GitError {
    /// The path is not inside a git repository.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),
}

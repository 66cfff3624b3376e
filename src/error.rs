use thiserror::Error;

/// Errors raised while building engines, queries or configuration.
///
/// Running sessions never surface errors: per-entry failures are counted in
/// the session statistics and skipped.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The engine was constructed outside of a tokio runtime
    #[error("no tokio runtime available: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),

    /// A MIME filter pattern failed to compile
    #[error("invalid MIME pattern '{pattern}': {source}")]
    InvalidMimePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// A configuration value is out of range or unparseable
    #[error("invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },
}

//! Error taxonomy for the core pipeline.
//!
//! The transformer and analyzer either return valid output or one of these
//! typed errors; skip-and-continue policy belongs to batch callers.

/// Errors produced by the core pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be parsed under the requested dialect.
    /// Fatal for the file, non-fatal for a batch.
    #[error("{file}:{line}:{col}: parse error: {message}")]
    Parse {
        file: String,
        line: usize,
        col: usize,
        message: String,
    },

    /// The caller requested a dialect or extension the core does not
    /// recognise. Signals misconfiguration and is never downgraded.
    #[error("unsupported dialect `{0}`")]
    UnsupportedDialect(String),
}

pub type Result<T> = std::result::Result<T, Error>;

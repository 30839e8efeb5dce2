//! Error types for GridPulse

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// GridPulse error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Client address string failed to parse
    #[error("Invalid client address '{addr}': {source}")]
    InvalidClientAddress {
        /// The offending address string
        addr: String,
        /// Parser failure detail
        source: std::net::AddrParseError,
    },

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MirrorError {
    #[error("invalid ISO standards URL: {0}")]
    #[diagnostic(help("Enter a valid ISO Standards URL starting with: https://standards.iso.org"))]
    InvalidInput(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("response is missing the {0} header")]
    MissingHeader(&'static str),

    #[error("unreadable directory listing: {0}")]
    Listing(String),

    #[error("{url} is not below the mirrored root {base}")]
    OutsideBase { url: String, base: String },

    #[error("expected {expected} bytes but received {actual}")]
    LengthMismatch { expected: u64, actual: u64 },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

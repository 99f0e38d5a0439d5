/// Unified error types for PLC genesis operations
use thiserror::Error;

/// Main error type for building, signing and submitting PLC operations
#[derive(Error, Debug)]
pub enum PlcError {
    /// Curve selector outside the supported set
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Malformed key material or a key/curve mismatch
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// A document value could not be canonically serialized
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Signature is malformed or does not verify
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Identifier is not a did:plc / did:key of the expected shape
    #[error("Invalid DID: {0}")]
    InvalidDid(String),

    /// Directory rejected the operation or could not be reached
    #[error("Submission failed: {0}")]
    Submission(SubmissionFailure),

    /// Directory lookups (document, audit log)
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a submission to the directory did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFailure {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("transport error: {0}")]
    Transport(String),

    /// The directory answered with a non-2xx status
    #[error("directory returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Result type alias for PLC operations
pub type PlcResult<T> = Result<T, PlcError>;

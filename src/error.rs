use thiserror::Error;

#[derive(Error, Debug)]
pub enum TpvError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The recomputed digest disagrees with the supplied one. Decoded fields
    /// must not be used.
    #[error("Signature mismatch for order {order:?}")]
    SignatureMismatch { order: String },
}

impl From<base64::DecodeError> for TpvError {
    fn from(err: base64::DecodeError) -> Self {
        TpvError::Encoding(format!("Invalid base64: {}", err))
    }
}

impl From<serde_json::Error> for TpvError {
    fn from(err: serde_json::Error) -> Self {
        TpvError::Encoding(format!("Invalid JSON: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, TpvError>;

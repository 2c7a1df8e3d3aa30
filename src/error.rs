//! Errors raised at the crate's fallible boundaries.
//!
//! Extraction itself never fails: malformed cells degrade to zero and
//! missing structure yields an empty record list. These variants cover
//! decoding caller input and encoding results.

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),

    #[error("{0} is null")]
    NullPointer(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("result contains null bytes")]
    NulByte,
}

pub type Result<T> = std::result::Result<T, PricingError>;

//! Error types for the deck service.

use deckstore_store::{ErrorKind, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during deck service operations.
#[derive(Debug, Error)]
pub enum DeckError {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The request was malformed before reaching storage.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Bulk create exceeds the configured deck size.
    #[error("deck would hold {count} slides, limit is {max}")]
    TooManySlides { count: usize, max: usize },

    /// JSON encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Stable error codes reported over the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    PermissionDenied,
    OutOfRange,
    InvariantViolation,
    InvalidRequest,
    Internal,
}

impl DeckError {
    /// The transport code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DeckError::Store(e) => match e.kind() {
                ErrorKind::NotFound => ErrorCode::NotFound,
                ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
                ErrorKind::OutOfRange => ErrorCode::OutOfRange,
                ErrorKind::InvariantViolation => ErrorCode::InvariantViolation,
                ErrorKind::InvalidInput => ErrorCode::InvalidRequest,
                ErrorKind::Storage => ErrorCode::Internal,
            },
            DeckError::InvalidRequest(_)
            | DeckError::TooManySlides { .. }
            | DeckError::Codec(_) => ErrorCode::InvalidRequest,
        }
    }
}

/// Result type for deck service operations.
pub type Result<T> = std::result::Result<T, DeckError>;

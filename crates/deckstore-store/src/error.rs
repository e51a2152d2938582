//! Error types for the store module.

use deckstore_core::{AnchorViolation, Direction, PositionError, SlideId};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced slide or deck does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The title slide was the target of a delete or move.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A move has no neighbour to swap with.
    #[error("slide {id} has no neighbour to move {direction:?} into")]
    OutOfRange { id: SlideId, direction: Direction },

    /// Deck ordering broke inside a transaction. Indicates a bug.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A row write collided with the (deck, position) uniqueness constraint.
    #[error("uniqueness constraint violated: {0}")]
    Constraint(String),

    /// Invalid data in input or storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// A blocking task could not be joined.
    #[error("background task failed: {0}")]
    Task(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of store errors for callers and the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    OutOfRange,
    InvariantViolation,
    InvalidInput,
    /// Durable-store failure surfaced unchanged.
    Storage,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            StoreError::OutOfRange { .. } => ErrorKind::OutOfRange,
            StoreError::InvariantViolation(_) => ErrorKind::InvariantViolation,
            StoreError::InvalidData(_) => ErrorKind::InvalidInput,
            StoreError::Database(_)
            | StoreError::Constraint(_)
            | StoreError::Migration(_)
            | StoreError::LockPoisoned(_)
            | StoreError::Task(_)
            | StoreError::Io(_) => ErrorKind::Storage,
        }
    }
}

impl From<AnchorViolation> for StoreError {
    fn from(e: AnchorViolation) -> Self {
        StoreError::PermissionDenied(e.to_string())
    }
}

impl From<PositionError> for StoreError {
    fn from(e: PositionError) -> Self {
        match e {
            PositionError::UnknownSlide(id) => StoreError::NotFound(format!("slide {}", id)),
            PositionError::NotDense(msg) => StoreError::InvariantViolation(msg),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

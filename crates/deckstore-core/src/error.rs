//! Error types for deckstore core.

use thiserror::Error;

use crate::anchor::Mutation;
use crate::types::SlideId;

/// Errors from pure position planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("slide {0} is not part of this deck")]
    UnknownSlide(SlideId),

    #[error("positions are not dense: {0}")]
    NotDense(String),
}

/// A mutation attempted against the protected title slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the title slide is protected and cannot be {}", .mutation.verb())]
pub struct AnchorViolation {
    pub mutation: Mutation,
}

//! The title-slide exemption.
//!
//! Every mutating operation that could remove or reposition a slide asks
//! this module first, before any write.

use crate::error::AnchorViolation;
use crate::slide::SlideKind;

/// Position held by the title slide for the lifetime of its deck.
pub const ANCHOR_POSITION: u32 = 1;

/// A mutation that the title slide is exempt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Removing the slide.
    Delete,
    /// Moving the slide itself.
    Move,
    /// Swapping another slide into its position.
    Displace,
}

impl Mutation {
    pub fn verb(self) -> &'static str {
        match self {
            Mutation::Delete => "deleted",
            Mutation::Move => "moved",
            Mutation::Displace => "displaced",
        }
    }
}

/// Whether slides of this kind are exempt from deletion and movement.
pub fn is_protected(kind: SlideKind) -> bool {
    match kind {
        SlideKind::Title => true,
        SlideKind::Jep | SlideKind::Example => false,
    }
}

/// Reject `mutation` if it targets a protected slide.
pub fn guard(kind: SlideKind, mutation: Mutation) -> Result<(), AnchorViolation> {
    if is_protected(kind) {
        Err(AnchorViolation { mutation })
    } else {
        Ok(())
    }
}

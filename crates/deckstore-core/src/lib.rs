//! # deckstore core
//!
//! Pure primitives for deckstore: slides, decks, and position planning.
//!
//! This crate contains no I/O and no storage. It describes what a deck looks
//! like and computes the row writes needed to reorder one without ever
//! breaking the `(deck, position)` uniqueness constraint along the way.
//!
//! ## Key Types
//!
//! - [`Slide`] - One ordered record of a deck
//! - [`SlideKind`] - Closed set of slide variants; [`SlideKind::Title`] is the anchor
//! - [`DeckId`] / [`SlideId`] - Owner and record identifiers
//! - [`WritePlan`] - Ordered write phases produced by the [`position`] module
//!
//! ## Invariants
//!
//! For every deck, positions are exactly `1..=N`, and the title slide holds
//! position 1 for the lifetime of the deck. See [`anchor`] and [`position`].

pub mod anchor;
pub mod error;
pub mod position;
pub mod slide;
pub mod types;

pub use anchor::{Mutation, ANCHOR_POSITION};
pub use error::{AnchorViolation, PositionError};
pub use position::{PositionEntry, PositionWrite, WritePlan, SENTINEL};
pub use slide::{Direction, FieldMap, NewSlide, Slide, SlideField, SlideKind, TitleFields};
pub use types::{DeckId, SlideId};

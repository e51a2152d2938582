//! # Deckstore
//!
//! Ordered slide decks with dense positions and a protected title slide.
//!
//! ## Overview
//!
//! A deck is an ordered collection of slides owned by a [`DeckId`]. Its
//! slides always hold positions `1..=N` with no gaps or duplicates, and the
//! title slide always sits at position 1. Decks support:
//!
//! - **Bulk creation** from explicit items or a [`ReleaseOutline`]
//! - **Append child**: insert after a parent's last child, shifting the rest
//! - **Delete** with gap closing
//! - **Move**: swap with the slide directly above or below
//!
//! Every mutation is a single transaction against storage that enforces
//! `UNIQUE(deck_id, position)` per row write.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use deckstore::{DeckConfig, DeckService};
//! use deckstore::core::{DeckId, Direction};
//! use deckstore::outline::{JepOutline, ReleaseOutline};
//! use deckstore::store::SqliteStore;
//!
//! async fn example() {
//!     // Open storage
//!     let store = SqliteStore::open("decks.db").unwrap();
//!
//!     // Create the service
//!     let decks = DeckService::new(store, DeckConfig::default());
//!
//!     // Build a deck from a release outline
//!     let deck = DeckId::from("jdk-25");
//!     let outline = ReleaseOutline::new("25", "2025-09-16", "The Future of Java")
//!         .jep(JepOutline::new("512", "Compact Source Files and Instance Main Methods"));
//!     decks.create_from_outline(&deck, &outline).await.unwrap();
//!
//!     // Add an example slide under the JEP and move it
//!     let slides = decks.list(&deck).await.unwrap();
//!     let child = decks.append_child(&deck, slides[1].id).await.unwrap();
//!     decks.move_slide(child.slide.id, Direction::Up).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `deckstore::core` - Core primitives (Slide, SlideKind, position planning)
//! - `deckstore::store` - Storage abstraction, SQLite and in-memory backends

pub mod error;
pub mod outline;
pub mod service;
pub mod transport;

// Re-export component crates
pub use deckstore_core as core;
pub use deckstore_store as store;

// Re-export main types for convenience
pub use error::{DeckError, ErrorCode, Result};
pub use outline::{ExampleOutline, JepOutline, ReleaseOutline};
pub use service::{DeckConfig, DeckService, WriteOutcome};
pub use transport::{Request, RequestHandler, Response, TransportAdapter};

// Re-export commonly used core types
pub use deckstore_core::{
    DeckId, Direction, FieldMap, NewSlide, Slide, SlideField, SlideId, SlideKind, TitleFields,
};

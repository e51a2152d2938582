//! # Deckstore Store
//!
//! Storage abstraction for deckstore. Provides a trait-based interface
//! for ordered slide persistence with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The store module abstracts slide storage behind the [`Store`] trait,
//! allowing the service layer to be storage-agnostic. The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing. Both run the same
//! deck operations from [`ops`] against their own [`SlideTx`].
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`StoreConfig`] - Busy timeout and pre-commit verification
//! - [`StoreError`] - Failures, classified by [`ErrorKind`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use deckstore_store::{SqliteStore, Store};
//! use deckstore_core::{DeckId, NewSlide, TitleFields};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("decks.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     let deck = DeckId::from("jdk-25");
//!     let title = TitleFields::new("JAVA 25", None);
//!     let items = vec![NewSlide::jep("512", "Compact Source Files", None)];
//!     store.create_deck(&deck, &title, &items).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Per-row uniqueness**: `UNIQUE(deck_id, position)` is checked on every
//!   row write, so multi-row moves go through temporary positions
//! - **All or nothing**: a failed operation leaves the deck exactly as it was
//! - **Protected title slide**: it stays at position 1 for the life of the deck

pub mod config;
pub mod error;
pub mod memory;
pub mod migration;
pub mod ops;
pub mod sqlite;
pub mod traits;
pub mod tx;

pub use config::StoreConfig;
pub use error::{ErrorKind, Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{Store, StoreExt};
pub use tx::{InsertSlide, SlideTx};

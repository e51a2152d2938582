//! # Deckstore Testkit
//!
//! Testing utilities for deckstore.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A store plus a deck id, seeded in one call
//! - **Generators**: Proptest strategies for items and operation sequences
//! - **Invariants**: Density and title-slide checks for a listed deck
//! - **Model**: A reference deck that predicts the outcome of every operation
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use deckstore_testkit::{apply_op, deck_ops, DeckFixture, DeckModel};
//!
//! proptest! {
//!     #[test]
//!     fn store_matches_model(ops in deck_ops(32)) {
//!         let rt = tokio::runtime::Runtime::new().unwrap();
//!         rt.block_on(async {
//!             let fixture = DeckFixture::new();
//!             let mut model = DeckModel::from_slides(&fixture.seed(4).await.unwrap());
//!             for op in &ops {
//!                 apply_op(&fixture.store, &fixture.deck, &mut model, op).await.unwrap();
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,ignore
//! use deckstore_testkit::{assert_dense, DeckFixture};
//!
//! let fixture = DeckFixture::new();
//! let slides = fixture.seed(3).await.unwrap();
//! assert_dense(&slides);
//! ```

pub mod fixtures;
pub mod generators;
pub mod invariants;
pub mod model;

pub use fixtures::{jep_items, sample_items, DeckFixture};
pub use generators::{deck_op, deck_ops, new_slides, DeckOp};
pub use invariants::{assert_dense, check_dense};
pub use model::{apply_op, DeckModel};

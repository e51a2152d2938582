//! Store trait: the abstract interface for deck persistence.
//!
//! This trait allows the service layer to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use deckstore_core::{DeckId, Direction, FieldMap, NewSlide, Slide, SlideId, TitleFields};

use crate::error::Result;

/// The Store trait: async interface for ordered slide persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Atomic mutations**: every mutating method runs in one transaction.
///   On any error nothing it wrote is kept.
/// - **Dense positions**: after every successful call the slides of each
///   deck hold positions `1..=N`, with the title slide at 1.
/// - **No retries**: a busy or failing database surfaces its error as-is.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Deck Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace a deck with a title slide followed by `items`.
    ///
    /// Any slides the deck had before are deleted. Returns the number of
    /// slides created, title slide included.
    async fn create_deck(
        &self,
        deck: &DeckId,
        title: &TitleFields,
        items: &[NewSlide],
    ) -> Result<usize>;

    /// All slides of a deck ordered by position. Unknown decks are empty.
    async fn list_by_deck(&self, deck: &DeckId) -> Result<Vec<Slide>>;

    /// Every deck that currently has slides, sorted.
    async fn list_decks(&self) -> Result<Vec<DeckId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Slide Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a slide by id.
    async fn get_slide(&self, id: SlideId) -> Result<Option<Slide>>;

    /// Create a child slide directly after the last child of `parent`.
    ///
    /// # Errors
    /// - `NotFound` if `parent` is not a slide of `deck`.
    async fn append_child(&self, deck: &DeckId, parent: SlideId) -> Result<Slide>;

    /// Apply the editable subset of `fields`; returns the slide afterwards.
    ///
    /// # Errors
    /// - `NotFound` if `id` does not exist.
    async fn update_fields(&self, id: SlideId, fields: &FieldMap) -> Result<Slide>;

    /// Delete a slide and close the gap. Returns the slide as it was.
    ///
    /// # Errors
    /// - `NotFound` if `id` does not exist.
    /// - `PermissionDenied` if `id` is the title slide.
    async fn delete_slide(&self, id: SlideId) -> Result<Slide>;

    /// Swap a slide with its neighbour. Returns the slide at its new position.
    ///
    /// # Errors
    /// - `NotFound` if `id` does not exist.
    /// - `PermissionDenied` if `id` or the neighbour is the title slide.
    /// - `OutOfRange` if there is no neighbour in `direction`.
    async fn move_slide(&self, id: SlideId, direction: Direction) -> Result<Slide>;
}

/// Extension trait for common read patterns.
pub trait StoreExt: Store {
    /// The slide at `position` in `deck`, if any.
    fn slide_at(
        &self,
        deck: &DeckId,
        position: u32,
    ) -> impl std::future::Future<Output = Result<Option<Slide>>> + Send;
}

impl<S: Store + ?Sized> StoreExt for S {
    async fn slide_at(&self, deck: &DeckId, position: u32) -> Result<Option<Slide>> {
        Ok(self
            .list_by_deck(deck)
            .await?
            .into_iter()
            .find(|s| s.position == position))
    }
}

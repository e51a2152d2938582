//! The deck service: request validation and logging over a [`Store`].
//!
//! The service does no position arithmetic itself. It rejects malformed
//! requests before they reach storage, enforces the deck size limit, and
//! optionally re-reads the deck after each successful write so callers can
//! redraw without a second round trip.

use std::sync::Arc;

use deckstore_core::{DeckId, Direction, FieldMap, NewSlide, Slide, SlideId, TitleFields};
use deckstore_store::{Store, StoreExt};

use crate::error::{DeckError, Result};
use crate::outline::ReleaseOutline;

/// Configuration for the deck service.
#[derive(Debug, Clone)]
pub struct DeckConfig {
    /// Largest deck a bulk create may produce, title slide included.
    pub max_slides: usize,
    /// Return the re-fetched deck alongside every mutation.
    pub refetch_after_write: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            max_slides: 10_000,
            refetch_after_write: true,
        }
    }
}

/// Result of a successful single-slide mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The affected slide: its new state, or its last state for a delete.
    pub slide: Slide,
    /// The whole deck after the write, when `refetch_after_write` is set.
    pub deck: Option<Vec<Slide>>,
}

/// The main service struct.
///
/// Cloning is cheap; clones share the same store.
pub struct DeckService<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Configuration.
    config: DeckConfig,
}

impl<S: Store> Clone for DeckService<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: Store> DeckService<S> {
    /// Create a new service over `store`.
    pub fn new(store: S, config: DeckConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deck Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace `deck` with a title slide followed by `items`.
    ///
    /// Returns the number of slides created, title slide included.
    pub async fn create_deck(
        &self,
        deck: &DeckId,
        title: &TitleFields,
        items: &[NewSlide],
    ) -> Result<usize> {
        check_deck_id(deck)?;

        let count = items.len() + 1;
        if count > self.config.max_slides {
            tracing::warn!(
                deck = %deck,
                count,
                max = self.config.max_slides,
                "Rejected oversized deck"
            );
            return Err(DeckError::TooManySlides {
                count,
                max: self.config.max_slides,
            });
        }

        let created = self.store.create_deck(deck, title, items).await?;
        tracing::info!(deck = %deck, slides = created, "Deck created");
        Ok(created)
    }

    /// Build a deck from a release outline.
    pub async fn create_from_outline(
        &self,
        deck: &DeckId,
        outline: &ReleaseOutline,
    ) -> Result<usize> {
        self.create_deck(deck, &outline.title_fields(), &outline.items())
            .await
    }

    /// All slides of a deck ordered by position.
    pub async fn list(&self, deck: &DeckId) -> Result<Vec<Slide>> {
        check_deck_id(deck)?;
        Ok(self.store.list_by_deck(deck).await?)
    }

    /// Every deck that currently has slides.
    pub async fn decks(&self) -> Result<Vec<DeckId>> {
        Ok(self.store.list_decks().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Slide Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a slide by id.
    pub async fn slide(&self, id: SlideId) -> Result<Option<Slide>> {
        Ok(self.store.get_slide(id).await?)
    }

    /// The slide at `position` in `deck`, if any.
    pub async fn slide_at(&self, deck: &DeckId, position: u32) -> Result<Option<Slide>> {
        check_deck_id(deck)?;
        Ok(self.store.slide_at(deck, position).await?)
    }

    /// Add a child slide after the last existing child of `parent`.
    pub async fn append_child(&self, deck: &DeckId, parent: SlideId) -> Result<WriteOutcome> {
        check_deck_id(deck)?;
        let slide = self.store.append_child(deck, parent).await?;
        self.outcome(slide).await
    }

    /// Apply the editable subset of `fields` to a slide.
    pub async fn update_fields(&self, id: SlideId, fields: &FieldMap) -> Result<WriteOutcome> {
        let slide = self.store.update_fields(id, fields).await?;
        self.outcome(slide).await
    }

    /// Delete a slide and close the gap.
    pub async fn delete_slide(&self, id: SlideId) -> Result<WriteOutcome> {
        let slide = self.store.delete_slide(id).await?;
        self.outcome(slide).await
    }

    /// Swap a slide with its neighbour in `direction`.
    pub async fn move_slide(&self, id: SlideId, direction: Direction) -> Result<WriteOutcome> {
        let slide = self.store.move_slide(id, direction).await?;
        self.outcome(slide).await
    }

    async fn outcome(&self, slide: Slide) -> Result<WriteOutcome> {
        let deck = if self.config.refetch_after_write {
            Some(self.store.list_by_deck(&slide.deck_id).await?)
        } else {
            None
        };
        Ok(WriteOutcome { slide, deck })
    }
}

fn check_deck_id(deck: &DeckId) -> Result<()> {
    if deck.as_str().trim().is_empty() {
        return Err(DeckError::InvalidRequest("deck id must not be empty".into()));
    }
    Ok(())
}

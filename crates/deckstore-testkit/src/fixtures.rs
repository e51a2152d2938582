//! Test fixtures and helpers.
//!
//! Common setup code for store and integration tests.

use deckstore_core::{DeckId, NewSlide, Slide, SlideId, TitleFields};
use deckstore_store::{MemoryStore, Result, SqliteStore, Store};

/// A small release worth of items: two JEPs, the first with an example.
pub const SAMPLE_ITEMS_JSON: &str = r#"[
    {"kind": "jep", "tag": "506", "title": "Scoped Values", "body": "Share immutable data within and across threads."},
    {"kind": "example", "tag": "506", "title": "JEP 506 Example 1", "body": "ScopedValue.where(USER, u).run(task)", "parent": 0},
    {"kind": "jep", "tag": "512", "title": "Compact Source Files and Instance Main Methods"}
]"#;

/// Parse [`SAMPLE_ITEMS_JSON`].
pub fn sample_items() -> serde_json::Result<Vec<NewSlide>> {
    serde_json::from_str(SAMPLE_ITEMS_JSON)
}

/// `count` JEP slides tagged with consecutive numbers starting at 400.
pub fn jep_items(count: usize) -> Vec<NewSlide> {
    (0..count)
        .map(|i| {
            let number = (400 + i).to_string();
            NewSlide::jep(number.clone(), format!("JEP {}", number), None)
        })
        .collect()
}

/// A test fixture with a store and one deck to work on.
pub struct DeckFixture<S: Store = MemoryStore> {
    pub store: S,
    pub deck: DeckId,
}

impl DeckFixture<MemoryStore> {
    /// Create a fixture over an empty memory store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for DeckFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl DeckFixture<SqliteStore> {
    /// Create a fixture over an in-memory SQLite database.
    pub fn sqlite() -> Result<Self> {
        Ok(Self::with_store(SqliteStore::open_memory()?))
    }
}

impl<S: Store> DeckFixture<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            deck: DeckId::from("fixture"),
        }
    }

    /// Title fields used for every seeded deck.
    pub fn title() -> TitleFields {
        TitleFields::new("JAVA 25", Some("Fixture (Release date 2025-09-16)".into()))
    }

    /// (Re)create the deck with a title slide and `count` JEP slides.
    pub async fn seed(&self, count: usize) -> Result<Vec<Slide>> {
        self.seed_with(&jep_items(count)).await
    }

    /// (Re)create the deck from explicit items.
    pub async fn seed_with(&self, items: &[NewSlide]) -> Result<Vec<Slide>> {
        self.store.create_deck(&self.deck, &Self::title(), items).await?;
        self.slides().await
    }

    /// Current slides of the deck.
    pub async fn slides(&self) -> Result<Vec<Slide>> {
        self.store.list_by_deck(&self.deck).await
    }

    /// Current slide ids in position order.
    pub async fn ids(&self) -> Result<Vec<SlideId>> {
        Ok(self.slides().await?.iter().map(|s| s.id).collect())
    }
}

//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite,
//! including a `(deck_id, position)` uniqueness check on every row write,
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use deckstore_core::{
    DeckId, Direction, FieldMap, NewSlide, Slide, SlideField, SlideId, SlideKind, TitleFields,
};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::ops;
use crate::traits::Store;
use crate::tx::{InsertSlide, SlideTx};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Readers share an RwLock.
/// A writer mutates the table in place and journals the prior state of
/// every slide it touches; a failed operation replays the journal.
pub struct MemoryStore {
    inner: RwLock<MemoryTable>,
    config: StoreConfig,
}

/// The slide table plus its uniqueness index.
#[derive(Debug, Default)]
pub(crate) struct MemoryTable {
    /// Slides indexed by ID.
    slides: BTreeMap<SlideId, StoredSlide>,

    /// Uniqueness index: (deck_id, position) -> slide_id.
    positions: HashMap<(DeckId, i64), SlideId>,

    /// Last assigned id. Only a failed write winds it back, so the id of a
    /// slide that was ever visible is never reused.
    last_id: i64,

    /// Prior state of each slide touched by the write in progress.
    journal: HashMap<SlideId, Option<StoredSlide>>,
}

#[derive(Debug, Clone)]
struct StoredSlide {
    slide: Slide,
    /// Raw position; may be a temporary while a write plan is applied.
    position: i64,
}

impl StoredSlide {
    fn to_slide(&self) -> Result<Slide> {
        let position = u32::try_from(self.position).map_err(|_| {
            StoreError::InvalidData(format!(
                "slide {} holds temporary position {}",
                self.slide.id, self.position
            ))
        })?;
        Ok(Slide {
            position,
            ..self.slide.clone()
        })
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty in-memory store with explicit configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: RwLock::new(MemoryTable::default()),
            config,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryTable>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn lock_write(&self) -> Result<RwLockWriteGuard<'_, MemoryTable>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Run `f` against the table, undoing every change it made on error.
    fn write<T>(&self, f: impl FnOnce(&mut MemoryTable, &StoreConfig) -> Result<T>) -> Result<T> {
        let mut table = self.lock_write()?;
        table.journal.clear();
        let last_id = table.last_id;

        match f(&mut table, &self.config) {
            Ok(out) => {
                table.journal.clear();
                Ok(out)
            }
            Err(e) => {
                let restored = table.rollback(last_id);
                tracing::debug!(restored, error = %e, "Rolled back memory write");
                Err(e)
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTable {
    fn stored_mut(&mut self, id: SlideId) -> Result<&mut StoredSlide> {
        self.slides
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("slide {}", id)))
    }

    /// Record the state of `id` before its first change in this write.
    fn touch(&mut self, id: SlideId) {
        if !self.journal.contains_key(&id) {
            let prior = self.slides.get(&id).cloned();
            self.journal.insert(id, prior);
        }
    }

    /// Put every journaled slide back. Returns the number restored.
    fn rollback(&mut self, last_id: i64) -> usize {
        let journal = std::mem::take(&mut self.journal);

        // Release every key the write took before reclaiming the old ones.
        for id in journal.keys() {
            if let Some(current) = self.slides.remove(id) {
                self.positions
                    .remove(&(current.slide.deck_id, current.position));
            }
        }
        for (id, prior) in &journal {
            if let Some(prior) = prior {
                self.positions
                    .insert((prior.slide.deck_id.clone(), prior.position), *id);
                self.slides.insert(*id, prior.clone());
            }
        }

        self.last_id = last_id;
        journal.len()
    }
}

impl SlideTx for MemoryTable {
    fn slide(&self, id: SlideId) -> Result<Option<Slide>> {
        self.slides.get(&id).map(StoredSlide::to_slide).transpose()
    }

    fn deck_slides(&self, deck: &DeckId) -> Result<Vec<Slide>> {
        let mut slides = self
            .slides
            .values()
            .filter(|s| &s.slide.deck_id == deck)
            .map(StoredSlide::to_slide)
            .collect::<Result<Vec<_>>>()?;
        slides.sort_by_key(|s| s.position);
        Ok(slides)
    }

    fn deck_positions(&self, deck: &DeckId) -> Result<Vec<(i64, SlideKind)>> {
        Ok(self
            .slides
            .values()
            .filter(|s| &s.slide.deck_id == deck)
            .map(|s| (s.position, s.slide.kind))
            .collect())
    }

    fn clear_deck(&mut self, deck: &DeckId) -> Result<usize> {
        let doomed: Vec<SlideId> = self
            .slides
            .values()
            .filter(|s| &s.slide.deck_id == deck)
            .map(|s| s.slide.id)
            .collect();
        for id in &doomed {
            self.touch(*id);
            self.slides.remove(id);
        }
        self.positions.retain(|(d, _), _| d != deck);
        Ok(doomed.len())
    }

    fn insert_slide(
        &mut self,
        deck: &DeckId,
        slide: &InsertSlide,
        position: i64,
    ) -> Result<SlideId> {
        let key = (deck.clone(), position);
        if let Some(existing) = self.positions.get(&key) {
            return Err(StoreError::Constraint(format!(
                "deck {} position {} already held by slide {}",
                deck, position, existing
            )));
        }

        self.last_id += 1;
        let id = SlideId::new(self.last_id);
        self.touch(id);
        self.positions.insert(key, id);
        self.slides.insert(
            id,
            StoredSlide {
                slide: Slide {
                    id,
                    deck_id: deck.clone(),
                    kind: slide.kind,
                    position: 0,
                    parent_id: slide.parent_id,
                    tag: slide.tag.clone(),
                    title: slide.title.clone(),
                    subtitle: slide.subtitle.clone(),
                    body: slide.body.clone(),
                },
                position,
            },
        );
        Ok(id)
    }

    fn set_position(&mut self, id: SlideId, position: i64) -> Result<()> {
        let (deck, old) = {
            let stored = self.stored_mut(id)?;
            (stored.slide.deck_id.clone(), stored.position)
        };

        let key = (deck, position);
        match self.positions.get(&key) {
            Some(holder) if *holder != id => {
                return Err(StoreError::Constraint(format!(
                    "deck {} position {} already held by slide {}",
                    key.0, position, holder
                )));
            }
            _ => {}
        }

        self.touch(id);
        self.positions.remove(&(key.0.clone(), old));
        self.positions.insert(key, id);
        self.stored_mut(id)?.position = position;
        Ok(())
    }

    fn set_field(&mut self, id: SlideId, field: SlideField, value: &str) -> Result<()> {
        self.touch(id);
        let slide = &mut self.stored_mut(id)?.slide;
        match field {
            SlideField::Tag => slide.tag = Some(value.to_string()),
            SlideField::Title => slide.title = value.to_string(),
            SlideField::Subtitle => slide.subtitle = Some(value.to_string()),
            SlideField::Body => slide.body = Some(value.to_string()),
        }
        Ok(())
    }

    fn remove_slide(&mut self, id: SlideId) -> Result<()> {
        self.touch(id);
        let stored = self
            .slides
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("slide {}", id)))?;
        self.positions
            .remove(&(stored.slide.deck_id, stored.position));
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_deck(
        &self,
        deck: &DeckId,
        title: &TitleFields,
        items: &[NewSlide],
    ) -> Result<usize> {
        self.write(|table, config| ops::create_deck(table, config, deck, title, items))
    }

    async fn list_by_deck(&self, deck: &DeckId) -> Result<Vec<Slide>> {
        self.read()?.deck_slides(deck)
    }

    async fn list_decks(&self) -> Result<Vec<DeckId>> {
        let inner = self.read()?;
        let mut decks: Vec<DeckId> = inner
            .slides
            .values()
            .map(|s| s.slide.deck_id.clone())
            .collect();
        decks.sort();
        decks.dedup();
        Ok(decks)
    }

    async fn get_slide(&self, id: SlideId) -> Result<Option<Slide>> {
        self.read()?.slide(id)
    }

    async fn append_child(&self, deck: &DeckId, parent_id: SlideId) -> Result<Slide> {
        self.write(|table, config| ops::append_child(table, config, deck, parent_id))
    }

    async fn update_fields(&self, id: SlideId, fields: &FieldMap) -> Result<Slide> {
        self.write(|table, _| ops::update_fields(table, id, fields))
    }

    async fn delete_slide(&self, id: SlideId) -> Result<Slide> {
        self.write(|table, config| ops::delete_slide(table, config, id))
    }

    async fn move_slide(&self, id: SlideId, direction: Direction) -> Result<Slide> {
        self.write(|table, config| ops::move_slide(table, config, id, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jeps(numbers: &[&str]) -> Vec<NewSlide> {
        numbers
            .iter()
            .map(|n| NewSlide::jep(*n, format!("JEP {}", n), None))
            .collect()
    }

    async fn positions(store: &MemoryStore, deck: &DeckId) -> Vec<(SlideId, u32)> {
        store
            .list_by_deck(deck)
            .await
            .unwrap()
            .into_iter()
            .map(|s| (s.id, s.position))
            .collect()
    }

    #[test]
    fn test_table_rejects_colliding_write() {
        let deck = DeckId::from("d");
        let mut table = MemoryTable::default();
        let title = InsertSlide::title(&TitleFields::new("T", None));
        let a = table.insert_slide(&deck, &title, 1).unwrap();
        let b = table.insert_slide(&deck, &title, 2).unwrap();

        assert!(matches!(
            table.set_position(b, 1),
            Err(StoreError::Constraint(_))
        ));
        assert!(matches!(
            table.insert_slide(&deck, &title, 2),
            Err(StoreError::Constraint(_))
        ));

        // Same position in another deck is fine.
        table.insert_slide(&DeckId::from("e"), &title, 1).unwrap();

        // Rewriting a slide's own position is not a collision.
        table.set_position(a, 1).unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_create_and_list() {
        let store = MemoryStore::new();
        let deck = DeckId::from("jdk-25");

        let created = store
            .create_deck(&deck, &TitleFields::new("JAVA 25", None), &jeps(&["502", "506"]))
            .await
            .unwrap();
        assert_eq!(created, 3);

        let slides = store.list_by_deck(&deck).await.unwrap();
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[0].kind, SlideKind::Title);
        assert_eq!(slides[1].tag.as_deref(), Some("502"));
        assert_eq!(slides[2].tag.as_deref(), Some("506"));
        assert_eq!(
            slides.iter().map(|s| s.position).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_memory_store_unknown_deck_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list_by_deck(&DeckId::from("nope")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_operation_leaves_table_untouched() {
        let store = MemoryStore::new();
        let deck = DeckId::from("d");
        store
            .create_deck(&deck, &TitleFields::new("T", None), &jeps(&["1", "2"]))
            .await
            .unwrap();
        let before = positions(&store, &deck).await;
        let title = before[0].0;

        let err = store.delete_slide(title).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));

        let err = store
            .write(|table, _| -> Result<()> {
                table.set_position(before[2].0, -3)?;
                Err(StoreError::Io(std::io::Error::other("disk gone")))
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert_eq!(positions(&store, &deck).await, before);
    }

    #[tokio::test]
    async fn test_failed_write_restores_only_touched_rows() {
        let store = MemoryStore::new();
        let (a, b) = (DeckId::from("a"), DeckId::from("b"));
        for deck in [&a, &b] {
            store
                .create_deck(deck, &TitleFields::new("T", None), &jeps(&["1", "2"]))
                .await
                .unwrap();
        }
        let before_a = store.list_by_deck(&a).await.unwrap();
        let before_b = store.list_by_deck(&b).await.unwrap();

        let err = store
            .write(|table, _| -> Result<()> {
                table.set_field(before_b[1].id, SlideField::Title, "edited")?;
                table.clear_deck(&a)?;
                let child = InsertSlide::child_of(&before_a[1]);
                table.insert_slide(&a, &child, 1)?;
                table.set_position(before_b[2].id, 1)
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));

        assert_eq!(store.list_by_deck(&a).await.unwrap(), before_a);
        assert_eq!(store.list_by_deck(&b).await.unwrap(), before_b);
        assert!(store.read().unwrap().journal.is_empty());

        // The rolled-back insert did not consume an id.
        let child = store.append_child(&a, before_a[1].id).await.unwrap();
        assert_eq!(child.id, SlideId::new(before_b[2].id.get() + 1));
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_recreate() {
        let store = MemoryStore::new();
        let deck = DeckId::from("d");
        store
            .create_deck(&deck, &TitleFields::new("T", None), &jeps(&["1"]))
            .await
            .unwrap();
        let first: Vec<SlideId> = positions(&store, &deck)
            .await
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        store
            .create_deck(&deck, &TitleFields::new("T", None), &jeps(&["1"]))
            .await
            .unwrap();
        let second: Vec<SlideId> = positions(&store, &deck)
            .await
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        assert!(second.iter().all(|id| !first.contains(id)));
    }

    #[tokio::test]
    async fn test_list_decks() {
        let store = MemoryStore::new();
        for name in ["b", "a", "b"] {
            store
                .create_deck(&DeckId::from(name), &TitleFields::new(name, None), &[])
                .await
                .unwrap();
        }
        assert_eq!(
            store.list_decks().await.unwrap(),
            vec![DeckId::from("a"), DeckId::from("b")]
        );
    }
}

//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for deckstore. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking. SQLite checks
//! `UNIQUE(deck_id, position)` per row, which is exactly the constraint the
//! write plans in `deckstore_core::position` are built to respect.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use deckstore_core::{
    DeckId, Direction, FieldMap, NewSlide, Slide, SlideField, SlideId, SlideKind, TitleFields,
};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::migration;
use crate::ops;
use crate::traits::Store;
use crate::tx::{InsertSlide, SlideTx};

const SLIDE_COLUMNS: &str =
    "slide_id, deck_id, kind, position, parent_id, tag, title, subtitle, body";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    config: StoreConfig,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open a SQLite database at the given path with explicit configuration.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        Self::init(Connection::open(path)?, config)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, StoreConfig::default())
    }

    fn init(mut conn: Connection, config: StoreConfig) -> Result<Self> {
        conn.busy_timeout(config.busy_timeout)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Run `f` with the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection, &StoreConfig) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = lock(&conn)?;
            f(&mut conn, &config)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }

    /// Run `f` inside an immediate transaction, committing only on success.
    ///
    /// Dropping the transaction on the error path rolls it back.
    async fn write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Transaction<'_>, &StoreConfig) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.blocking(move |conn, config| {
            let mut tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let out = f(&mut tx, config)?;
            tx.commit()?;
            Ok(out)
        })
        .await
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|e| StoreError::LockPoisoned(format!("mutex poisoned: {}", e)))
}

// Helper to convert a row to Slide
fn row_to_slide(row: &rusqlite::Row<'_>) -> rusqlite::Result<Slide> {
    let kind: u8 = row.get("kind")?;
    let position: i64 = row.get("position")?;

    Ok(Slide {
        id: SlideId::new(row.get("slide_id")?),
        deck_id: DeckId::new(row.get::<_, String>("deck_id")?),
        kind: SlideKind::from_u8(kind).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(2, "kind".into(), rusqlite::types::Type::Integer)
        })?,
        position: u32::try_from(position).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "position".into(), rusqlite::types::Type::Integer)
        })?,
        parent_id: row.get::<_, Option<i64>>("parent_id")?.map(SlideId::new),
        tag: row.get("tag")?,
        title: row.get("title")?,
        subtitle: row.get("subtitle")?,
        body: row.get("body")?,
    })
}

fn query_slide(conn: &Connection, id: SlideId) -> Result<Option<Slide>> {
    conn.query_row(
        &format!("SELECT {} FROM slides WHERE slide_id = ?1", SLIDE_COLUMNS),
        params![id.get()],
        row_to_slide,
    )
    .optional()
    .map_err(StoreError::from)
}

fn query_deck(conn: &Connection, deck: &DeckId) -> Result<Vec<Slide>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM slides WHERE deck_id = ?1 ORDER BY position",
        SLIDE_COLUMNS
    ))?;

    let slides = stmt
        .query_map(params![deck.as_str()], row_to_slide)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(slides)
}

fn field_column(field: SlideField) -> &'static str {
    match field {
        SlideField::Tag => "tag",
        SlideField::Title => "title",
        SlideField::Subtitle => "subtitle",
        SlideField::Body => "body",
    }
}

fn expect_one(changed: usize, id: SlideId) -> Result<()> {
    if changed == 1 {
        Ok(())
    } else {
        Err(StoreError::NotFound(format!("slide {}", id)))
    }
}

impl SlideTx for Transaction<'_> {
    fn slide(&self, id: SlideId) -> Result<Option<Slide>> {
        query_slide(self, id)
    }

    fn deck_slides(&self, deck: &DeckId) -> Result<Vec<Slide>> {
        query_deck(self, deck)
    }

    fn deck_positions(&self, deck: &DeckId) -> Result<Vec<(i64, SlideKind)>> {
        let mut stmt = self.prepare("SELECT position, kind FROM slides WHERE deck_id = ?1")?;

        let rows = stmt
            .query_map(params![deck.as_str()], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, u8>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(position, kind)| {
                SlideKind::from_u8(kind)
                    .map(|kind| (position, kind))
                    .ok_or_else(|| StoreError::InvalidData(format!("unknown slide kind {}", kind)))
            })
            .collect()
    }

    fn clear_deck(&mut self, deck: &DeckId) -> Result<usize> {
        Ok(self.execute("DELETE FROM slides WHERE deck_id = ?1", params![deck.as_str()])?)
    }

    fn insert_slide(
        &mut self,
        deck: &DeckId,
        slide: &InsertSlide,
        position: i64,
    ) -> Result<SlideId> {
        self.execute(
            "INSERT INTO slides (deck_id, kind, position, parent_id, tag, title, subtitle, body)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                deck.as_str(),
                slide.kind.to_u8(),
                position,
                slide.parent_id.map(SlideId::get),
                slide.tag,
                slide.title,
                slide.subtitle,
                slide.body,
            ],
        )?;

        Ok(SlideId::new(self.last_insert_rowid()))
    }

    fn set_position(&mut self, id: SlideId, position: i64) -> Result<()> {
        let changed = self.execute(
            "UPDATE slides SET position = ?2 WHERE slide_id = ?1",
            params![id.get(), position],
        )?;
        expect_one(changed, id)
    }

    fn set_field(&mut self, id: SlideId, field: SlideField, value: &str) -> Result<()> {
        let changed = self.execute(
            &format!("UPDATE slides SET {} = ?2 WHERE slide_id = ?1", field_column(field)),
            params![id.get(), value],
        )?;
        expect_one(changed, id)
    }

    fn remove_slide(&mut self, id: SlideId) -> Result<()> {
        let changed = self.execute("DELETE FROM slides WHERE slide_id = ?1", params![id.get()])?;
        expect_one(changed, id)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_deck(
        &self,
        deck: &DeckId,
        title: &TitleFields,
        items: &[NewSlide],
    ) -> Result<usize> {
        let deck = deck.clone();
        let title = title.clone();
        let items = items.to_vec();

        self.write(move |tx, config| ops::create_deck(tx, config, &deck, &title, &items))
            .await
    }

    async fn list_by_deck(&self, deck: &DeckId) -> Result<Vec<Slide>> {
        let deck = deck.clone();
        self.blocking(move |conn, _| query_deck(conn, &deck)).await
    }

    async fn list_decks(&self) -> Result<Vec<DeckId>> {
        self.blocking(|conn, _| {
            let mut stmt = conn.prepare("SELECT DISTINCT deck_id FROM slides ORDER BY deck_id")?;
            let decks = stmt
                .query_map([], |row| row.get::<_, String>(0).map(DeckId::new))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(decks)
        })
        .await
    }

    async fn get_slide(&self, id: SlideId) -> Result<Option<Slide>> {
        self.blocking(move |conn, _| query_slide(conn, id)).await
    }

    async fn append_child(&self, deck: &DeckId, parent: SlideId) -> Result<Slide> {
        let deck = deck.clone();
        self.write(move |tx, config| ops::append_child(tx, config, &deck, parent))
            .await
    }

    async fn update_fields(&self, id: SlideId, fields: &FieldMap) -> Result<Slide> {
        let fields = fields.clone();
        self.write(move |tx, _| ops::update_fields(tx, id, &fields))
            .await
    }

    async fn delete_slide(&self, id: SlideId) -> Result<Slide> {
        self.write(move |tx, config| ops::delete_slide(tx, config, id))
            .await
    }

    async fn move_slide(&self, id: SlideId, direction: Direction) -> Result<Slide> {
        self.write(move |tx, config| ops::move_slide(tx, config, id, direction))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jeps(numbers: &[&str]) -> Vec<NewSlide> {
        numbers
            .iter()
            .map(|n| NewSlide::jep(*n, format!("JEP {}", n), Some(format!("About {}", n))))
            .collect()
    }

    async fn seeded(numbers: &[&str]) -> (SqliteStore, DeckId, Vec<Slide>) {
        let store = SqliteStore::open_memory().unwrap();
        let deck = DeckId::from("jdk-25");
        let title = TitleFields::new("JAVA 25", Some("Tagline".into()));
        store
            .create_deck(&deck, &title, &jeps(numbers))
            .await
            .unwrap();
        let slides = store.list_by_deck(&deck).await.unwrap();
        (store, deck, slides)
    }

    fn summary(slides: &[Slide]) -> Vec<(SlideId, u32)> {
        slides.iter().map(|s| (s.id, s.position)).collect()
    }

    fn install_trigger(store: &SqliteStore, sql: &str) {
        store.conn.lock().unwrap().execute_batch(sql).unwrap();
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let (store, deck, slides) = seeded(&["502", "506", "512"]).await;

        assert_eq!(slides.len(), 4);
        assert_eq!(slides[0].kind, SlideKind::Title);
        assert_eq!(slides[0].subtitle.as_deref(), Some("Tagline"));
        assert_eq!(slides[3].body.as_deref(), Some("About 512"));

        let fetched = store.get_slide(slides[2].id).await.unwrap().unwrap();
        assert_eq!(fetched, slides[2]);
        assert_eq!(store.list_decks().await.unwrap(), vec![deck]);
    }

    #[tokio::test]
    async fn test_append_child_shifts_later_slides() {
        let (store, deck, slides) = seeded(&["502", "506"]).await;
        let a = slides[1].id;
        let b = slides[2].id;

        let child = store.append_child(&deck, a).await.unwrap();
        assert_eq!(child.position, 3);
        assert_eq!(child.kind, SlideKind::Example);
        assert_eq!(child.tag.as_deref(), Some("502"));
        assert_eq!(child.parent_id, Some(a));

        let after = store.list_by_deck(&deck).await.unwrap();
        assert_eq!(summary(&after)[3], (b, 4));
    }

    #[tokio::test]
    async fn test_move_and_delete() {
        let (store, deck, slides) = seeded(&["502", "506", "512"]).await;
        let (a, b, c) = (slides[1].id, slides[2].id, slides[3].id);

        let moved = store.move_slide(b, Direction::Down).await.unwrap();
        assert_eq!(moved.position, 4);
        assert_eq!(store.get_slide(c).await.unwrap().unwrap().position, 3);

        store.delete_slide(c).await.unwrap();
        let after = store.list_by_deck(&deck).await.unwrap();
        assert_eq!(summary(&after)[1..], [(a, 2), (b, 3)]);

        let err = store.move_slide(b, Direction::Down).await.unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { .. }));
        let err = store.move_slide(a, Direction::Up).await.unwrap_err();
        assert!(matches!(err, StoreError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_update_fields_allow_list() {
        let (store, _deck, slides) = seeded(&["502"]).await;
        let jep = slides[1].id;

        let mut fields = FieldMap::new();
        fields.insert("title".into(), "Compact Source Files".into());
        fields.insert("subtitle".into(), "not editable on jep slides".into());
        fields.insert("unknown".into(), "ignored".into());

        let updated = store.update_fields(jep, &fields).await.unwrap();
        assert_eq!(updated.title, "Compact Source Files");
        assert_eq!(updated.subtitle, None);
        assert_eq!(updated.body.as_deref(), Some("About 502"));

        let err = store.update_fields(SlideId::new(999), &fields).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recreate_fails_atomically() {
        let (store, deck, before) = seeded(&["502", "506"]).await;
        install_trigger(
            &store,
            "CREATE TRIGGER boom BEFORE INSERT ON slides WHEN NEW.title = 'boom'
             BEGIN SELECT RAISE(ABORT, 'boom'); END;",
        );

        let mut items = jeps(&["1", "2"]);
        items[1].title = "boom".into();
        let err = store
            .create_deck(&deck, &TitleFields::new("JAVA 26", None), &items)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));

        assert_eq!(store.list_by_deck(&deck).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_rolls_back_when_gap_close_fails() {
        let (store, deck, before) = seeded(&["502", "506", "512"]).await;
        install_trigger(
            &store,
            "CREATE TRIGGER no_temporaries BEFORE UPDATE OF position ON slides WHEN NEW.position < 0
             BEGIN SELECT RAISE(ABORT, 'no temporaries'); END;",
        );

        assert!(store.delete_slide(before[1].id).await.is_err());
        assert_eq!(store.list_by_deck(&deck).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_move_rolls_back_when_swap_fails() {
        let (store, deck, before) = seeded(&["502", "506"]).await;
        install_trigger(
            &store,
            "CREATE TRIGGER no_landing BEFORE UPDATE OF position ON slides WHEN NEW.position = 3 AND OLD.position = 0
             BEGIN SELECT RAISE(ABORT, 'no landing'); END;",
        );

        assert!(store.move_slide(before[1].id, Direction::Down).await.is_err());
        assert_eq!(store.list_by_deck(&deck).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_append_child_rolls_back_when_insert_fails() {
        let (store, deck, before) = seeded(&["502", "506", "512"]).await;
        install_trigger(
            &store,
            "CREATE TRIGGER no_examples BEFORE INSERT ON slides WHEN NEW.kind = 3
             BEGIN SELECT RAISE(ABORT, 'no examples'); END;",
        );

        // The shift of the two later slides runs before the insert fails.
        let err = store.append_child(&deck, before[1].id).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(store.list_by_deck(&deck).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_fields_rolls_back_when_second_field_fails() {
        let (store, deck, before) = seeded(&["502"]).await;
        install_trigger(
            &store,
            "CREATE TRIGGER no_boom BEFORE UPDATE OF title ON slides WHEN NEW.title = 'boom'
             BEGIN SELECT RAISE(ABORT, 'boom'); END;",
        );

        // Fields apply in name order: body is written, then title aborts.
        let mut fields = FieldMap::new();
        fields.insert("body".into(), "rewritten".into());
        fields.insert("title".into(), "boom".into());

        let err = store.update_fields(before[1].id, &fields).await.unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
        assert_eq!(store.list_by_deck(&deck).await.unwrap(), before);
        assert_eq!(
            store.get_slide(before[1].id).await.unwrap().unwrap().body.as_deref(),
            Some("About 502")
        );
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decks.db");
        let deck = DeckId::from("jdk-25");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .create_deck(&deck, &TitleFields::new("JAVA 25", None), &jeps(&["502"]))
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let slides = store.list_by_deck(&deck).await.unwrap();
        assert_eq!(slides.len(), 2);
        assert_eq!(slides[1].tag.as_deref(), Some("502"));
    }
}

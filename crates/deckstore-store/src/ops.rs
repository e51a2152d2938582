//! Deck mutations, written once against [`SlideTx`].
//!
//! Each function runs inside a transaction opened by the backend. Returning
//! `Err` from any of them makes the backend discard every write made so far;
//! only `Ok` results are committed.

use deckstore_core::anchor::{self, Mutation};
use deckstore_core::position::{self, PositionEntry, WritePlan};
use deckstore_core::{
    DeckId, Direction, FieldMap, NewSlide, Slide, SlideId, SlideKind, TitleFields, ANCHOR_POSITION,
};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::tx::{InsertSlide, SlideTx};

/// Replace a deck with a title slide followed by `items` in order.
///
/// Returns the number of slides created, title slide included.
pub fn create_deck<T: SlideTx + ?Sized>(
    tx: &mut T,
    config: &StoreConfig,
    deck: &DeckId,
    title: &TitleFields,
    items: &[NewSlide],
) -> Result<usize> {
    validate_items(items)?;

    let removed = tx.clear_deck(deck)?;
    tx.insert_slide(deck, &InsertSlide::title(title), i64::from(ANCHOR_POSITION))?;

    let mut ids: Vec<SlideId> = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let parent_id = match item.parent {
            Some(parent) => Some(*ids.get(parent).ok_or_else(|| {
                StoreError::InvalidData(format!("item {} has unresolved parent {}", index, parent))
            })?),
            None => None,
        };
        let position = i64::from(ANCHOR_POSITION) + 1 + index as i64;
        ids.push(tx.insert_slide(deck, &InsertSlide::from_new(item, parent_id), position)?);
    }

    verify(tx, config, deck)?;

    let created = items.len() + 1;
    tracing::debug!(deck = %deck, removed, created, "Created deck");
    Ok(created)
}

/// Insert a child slide after the last existing child of `parent_id`.
pub fn append_child<T: SlideTx + ?Sized>(
    tx: &mut T,
    config: &StoreConfig,
    deck: &DeckId,
    parent_id: SlideId,
) -> Result<Slide> {
    let parent = tx
        .slide(parent_id)?
        .filter(|s| &s.deck_id == deck)
        .ok_or_else(|| StoreError::NotFound(format!("slide {} in deck {}", parent_id, deck)))?;

    let snapshot = snapshot(tx, deck)?;
    let at = position::insertion_point_after_last_child_of(&snapshot, parent.id)?;

    let shift = position::shift_for_insert(&snapshot, at);
    apply(tx, &shift)?;
    let id = tx.insert_slide(deck, &InsertSlide::child_of(&parent), i64::from(at))?;

    verify(tx, config, deck)?;

    tracing::debug!(
        deck = %deck,
        parent = %parent_id,
        slide = %id,
        position = at,
        shifted = shift.final_positions().len(),
        "Appended child slide"
    );
    reload(tx, id)
}

/// Apply the allowed subset of `fields` to a slide.
///
/// Unknown fields and fields not editable for the slide's kind are ignored;
/// an empty result is a successful no-op.
pub fn update_fields<T: SlideTx + ?Sized>(
    tx: &mut T,
    id: SlideId,
    fields: &FieldMap,
) -> Result<Slide> {
    let slide = tx
        .slide(id)?
        .ok_or_else(|| StoreError::NotFound(format!("slide {}", id)))?;

    let updates = slide.kind.filter_fields(fields);
    if updates.is_empty() {
        tracing::debug!(slide = %id, requested = fields.len(), "No editable fields in update");
        return Ok(slide);
    }

    for (field, value) in &updates {
        tx.set_field(id, *field, value)?;
    }

    tracing::debug!(
        slide = %id,
        applied = updates.len(),
        requested = fields.len(),
        "Updated slide fields"
    );
    reload(tx, id)
}

/// Delete a slide and close the gap it leaves.
///
/// Returns the deleted slide as it was before removal.
pub fn delete_slide<T: SlideTx + ?Sized>(
    tx: &mut T,
    config: &StoreConfig,
    id: SlideId,
) -> Result<Slide> {
    let slide = tx
        .slide(id)?
        .ok_or_else(|| StoreError::NotFound(format!("slide {}", id)))?;

    if let Err(violation) = anchor::guard(slide.kind, Mutation::Delete) {
        tracing::warn!(slide = %id, deck = %slide.deck_id, "Rejected delete of title slide");
        return Err(violation.into());
    }

    let snapshot = snapshot(tx, &slide.deck_id)?;
    tx.remove_slide(id)?;
    let close = position::close_gap_for_delete(&snapshot, slide.position);
    apply(tx, &close)?;

    verify(tx, config, &slide.deck_id)?;

    tracing::debug!(
        deck = %slide.deck_id,
        slide = %id,
        position = slide.position,
        shifted = close.final_positions().len(),
        "Deleted slide"
    );
    Ok(slide)
}

/// Swap a slide with its neighbour in `direction`.
pub fn move_slide<T: SlideTx + ?Sized>(
    tx: &mut T,
    config: &StoreConfig,
    id: SlideId,
    direction: Direction,
) -> Result<Slide> {
    let slide = tx
        .slide(id)?
        .ok_or_else(|| StoreError::NotFound(format!("slide {}", id)))?;

    if let Err(violation) = anchor::guard(slide.kind, Mutation::Move) {
        tracing::warn!(slide = %id, deck = %slide.deck_id, "Rejected move of title slide");
        return Err(violation.into());
    }

    let out_of_range = || StoreError::OutOfRange { id, direction };
    let target = direction.neighbour_of(slide.position).ok_or_else(out_of_range)?;
    let slides = tx.deck_slides(&slide.deck_id)?;
    let neighbour = slides
        .iter()
        .find(|s| s.position == target)
        .ok_or_else(out_of_range)?;

    if let Err(violation) = anchor::guard(neighbour.kind, Mutation::Displace) {
        tracing::warn!(
            slide = %id,
            deck = %slide.deck_id,
            ?direction,
            "Rejected move displacing title slide"
        );
        return Err(violation.into());
    }

    let plan = position::swap(&PositionEntry::from(&slide), &PositionEntry::from(neighbour));
    apply(tx, &plan)?;

    verify(tx, config, &slide.deck_id)?;

    tracing::debug!(
        deck = %slide.deck_id,
        slide = %id,
        neighbour = %neighbour.id,
        from = slide.position,
        to = target,
        "Moved slide"
    );
    reload(tx, id)
}

fn validate_items(items: &[NewSlide]) -> Result<()> {
    for (index, item) in items.iter().enumerate() {
        if anchor::is_protected(item.kind) {
            return Err(StoreError::PermissionDenied(format!(
                "item {} is a title slide; a deck has exactly one, created from the title fields",
                index
            )));
        }
        if let Some(parent) = item.parent {
            if parent >= index {
                return Err(StoreError::InvalidData(format!(
                    "item {} names parent {}, which is not an earlier item",
                    index, parent
                )));
            }
        }
    }
    Ok(())
}

fn snapshot<T: SlideTx + ?Sized>(tx: &T, deck: &DeckId) -> Result<Vec<PositionEntry>> {
    Ok(tx.deck_slides(deck)?.iter().map(PositionEntry::from).collect())
}

fn apply<T: SlideTx + ?Sized>(tx: &mut T, plan: &WritePlan) -> Result<()> {
    for write in plan.writes() {
        tx.set_position(write.id, write.position)?;
    }
    Ok(())
}

fn reload<T: SlideTx + ?Sized>(tx: &T, id: SlideId) -> Result<Slide> {
    tx.slide(id)?.ok_or_else(|| {
        StoreError::InvariantViolation(format!("slide {} vanished mid-operation", id))
    })
}

/// Check density and the title slide's position before commit.
fn verify<T: SlideTx + ?Sized>(tx: &T, config: &StoreConfig, deck: &DeckId) -> Result<()> {
    if !config.verify_density {
        return Ok(());
    }

    let rows = tx.deck_positions(deck)?;
    let result = position::check_density(rows.iter().map(|(p, _)| *p))
        .map_err(StoreError::from)
        .and_then(|()| {
            let titles: Vec<i64> = rows
                .iter()
                .filter(|(_, kind)| *kind == SlideKind::Title)
                .map(|(p, _)| *p)
                .collect();
            match titles.as_slice() {
                [] if rows.is_empty() => Ok(()),
                [p] if *p == i64::from(ANCHOR_POSITION) => Ok(()),
                _ => Err(StoreError::InvariantViolation(format!(
                    "title slide positions {:?}, expected exactly one at {}",
                    titles, ANCHOR_POSITION
                ))),
            }
        });

    if let Err(e) = &result {
        tracing::error!(deck = %deck, error = %e, "Deck invariant broken; rolling back");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTable;

    fn items(n: usize) -> Vec<NewSlide> {
        (0..n)
            .map(|i| NewSlide::jep(format!("{}", 400 + i), format!("JEP {}", i), None))
            .collect()
    }

    #[test]
    fn test_validate_rejects_title_item() {
        let mut bad = items(1);
        bad[0].kind = SlideKind::Title;
        assert!(matches!(validate_items(&bad), Err(StoreError::PermissionDenied(_))));
    }

    #[test]
    fn test_validate_rejects_forward_parent() {
        let mut bad = items(2);
        bad[0].parent = Some(1);
        assert!(matches!(validate_items(&bad), Err(StoreError::InvalidData(_))));

        let mut own = items(1);
        own[0].parent = Some(0);
        assert!(matches!(validate_items(&own), Err(StoreError::InvalidData(_))));
    }

    #[test]
    fn test_verify_detects_gap() {
        let config = StoreConfig::default();
        let deck = DeckId::from("d");
        let mut table = MemoryTable::default();
        table
            .insert_slide(&deck, &InsertSlide::title(&TitleFields::new("T", None)), 1)
            .unwrap();
        table
            .insert_slide(&deck, &InsertSlide::from_new(&items(1)[0], None), 3)
            .unwrap();

        assert!(matches!(
            verify(&table, &config, &deck),
            Err(StoreError::InvariantViolation(_))
        ));
        assert!(verify(&table, &StoreConfig { verify_density: false, ..config }, &deck).is_ok());
    }

    #[test]
    fn test_verify_detects_misplaced_title() {
        let deck = DeckId::from("d");
        let mut table = MemoryTable::default();
        table
            .insert_slide(&deck, &InsertSlide::from_new(&items(1)[0], None), 1)
            .unwrap();
        table
            .insert_slide(&deck, &InsertSlide::title(&TitleFields::new("T", None)), 2)
            .unwrap();

        assert!(matches!(
            verify(&table, &StoreConfig::default(), &deck),
            Err(StoreError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_create_deck_links_parents() {
        let deck = DeckId::from("d");
        let mut table = MemoryTable::default();
        let batch = vec![
            NewSlide::jep("444", "Virtual Threads", None),
            NewSlide::example(Some("444".into()), "JEP 444 Example 1", "Thread.ofVirtual()", 0),
        ];

        let created = create_deck(
            &mut table,
            &StoreConfig::default(),
            &deck,
            &TitleFields::new("JAVA 21", None),
            &batch,
        )
        .unwrap();
        assert_eq!(created, 3);

        let slides = table.deck_slides(&deck).unwrap();
        assert_eq!(slides[2].parent_id, Some(slides[1].id));
        assert_eq!(slides[2].position, 3);
    }
}

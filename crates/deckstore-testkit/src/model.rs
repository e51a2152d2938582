//! Reference model of a single deck.
//!
//! [`DeckModel`] is a plain `Vec` in position order. [`apply_op`] runs a
//! [`DeckOp`] against a real store and against the model, then checks that
//! the outcome and the resulting order agree.

use deckstore_core::{DeckId, Direction, FieldMap, Slide, SlideId, SlideKind};
use deckstore_store::{ErrorKind, Store};

use crate::generators::DeckOp;
use crate::invariants::check_dense;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    id: SlideId,
    kind: SlideKind,
    parent_id: Option<SlideId>,
}

/// Expected order of one deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckModel {
    entries: Vec<Entry>,
}

impl DeckModel {
    pub fn from_slides(slides: &[Slide]) -> Self {
        Self {
            entries: slides
                .iter()
                .map(|s| Entry {
                    id: s.id,
                    kind: s.kind,
                    parent_id: s.parent_id,
                })
                .collect(),
        }
    }

    /// Slide ids in expected position order.
    pub fn ids(&self) -> Vec<SlideId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, target: usize) -> Option<usize> {
        (!self.entries.is_empty()).then(|| target % self.entries.len())
    }

    /// Index a new child of `entries[parent]` is inserted at.
    fn child_slot(&self, parent: usize) -> usize {
        let id = self.entries[parent].id;
        let last_child = self
            .entries
            .iter()
            .rposition(|e| e.parent_id == Some(id));
        last_child.unwrap_or(parent) + 1
    }
}

/// Apply `op` to both `store` and `model`.
///
/// Returns a description of the first disagreement, if any. Ops on an empty
/// deck are skipped.
pub async fn apply_op<S: Store>(
    store: &S,
    deck: &DeckId,
    model: &mut DeckModel,
    op: &DeckOp,
) -> Result<(), String> {
    match *op {
        DeckOp::AppendChild { target } => {
            let Some(i) = model.index_of(target) else { return Ok(()) };
            let parent = model.entries[i].id;
            let slot = model.child_slot(i);

            let slide = store
                .append_child(deck, parent)
                .await
                .map_err(|e| format!("append_child({}) failed: {}", parent, e))?;
            if slide.position as usize != slot + 1 {
                return Err(format!(
                    "child of {} landed at {}, expected {}",
                    parent,
                    slide.position,
                    slot + 1
                ));
            }
            model.entries.insert(
                slot,
                Entry {
                    id: slide.id,
                    kind: slide.kind,
                    parent_id: Some(parent),
                },
            );
        }

        DeckOp::Delete { target } => {
            let Some(i) = model.index_of(target) else { return Ok(()) };
            let entry = model.entries[i].clone();
            let result = store.delete_slide(entry.id).await;

            if entry.kind == SlideKind::Title {
                expect_kind(result, ErrorKind::PermissionDenied, "delete of title slide")?;
            } else {
                result.map_err(|e| format!("delete({}) failed: {}", entry.id, e))?;
                model.entries.remove(i);
            }
        }

        DeckOp::Move { target, direction } => {
            let Some(i) = model.index_of(target) else { return Ok(()) };
            let entry = model.entries[i].clone();
            let result = store.move_slide(entry.id, direction).await;

            let neighbour = match direction {
                Direction::Up => i.checked_sub(1),
                Direction::Down => Some(i + 1).filter(|n| *n < model.len()),
            };

            match neighbour {
                _ if entry.kind == SlideKind::Title => {
                    expect_kind(result, ErrorKind::PermissionDenied, "move of title slide")?;
                }
                Some(n) if model.entries[n].kind == SlideKind::Title => {
                    expect_kind(result, ErrorKind::PermissionDenied, "move onto title slide")?;
                }
                None => {
                    expect_kind(result, ErrorKind::OutOfRange, "move past the end")?;
                }
                Some(n) => {
                    let moved = result.map_err(|e| format!("move({}) failed: {}", entry.id, e))?;
                    if moved.position as usize != n + 1 {
                        return Err(format!(
                            "slide {} moved to {}, expected {}",
                            entry.id,
                            moved.position,
                            n + 1
                        ));
                    }
                    model.entries.swap(i, n);
                }
            }
        }

        DeckOp::Update {
            target,
            field,
            ref value,
        } => {
            let Some(i) = model.index_of(target) else { return Ok(()) };
            let entry = &model.entries[i];
            let mut fields = FieldMap::new();
            fields.insert(field.name().to_string(), value.clone());

            let slide = store
                .update_fields(entry.id, &fields)
                .await
                .map_err(|e| format!("update({}) failed: {}", entry.id, e))?;
            let editable = entry.kind.editable_fields().contains(&field);
            if editable && slide.field(field) != Some(value.as_str()) {
                return Err(format!("field {} of {} not applied", field.name(), entry.id));
            }
        }
    }

    let slides = store
        .list_by_deck(deck)
        .await
        .map_err(|e| format!("list failed: {}", e))?;
    check_dense(&slides)?;

    let actual: Vec<SlideId> = slides.iter().map(|s| s.id).collect();
    if actual != model.ids() {
        return Err(format!("order {:?}, expected {:?}", actual, model.ids()));
    }
    Ok(())
}

fn expect_kind<T: std::fmt::Debug>(
    result: deckstore_store::Result<T>,
    kind: ErrorKind,
    what: &str,
) -> Result<(), String> {
    match result {
        Err(e) if e.kind() == kind => Ok(()),
        other => Err(format!("{}: expected {:?}, got {:?}", what, kind, other)),
    }
}

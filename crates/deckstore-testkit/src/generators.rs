//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};

use deckstore_core::{DeckId, Direction, NewSlide, SlideField};

/// One mutation against a deck.
///
/// `target` is reduced modulo the deck length when the op is applied, so any
/// generated value names an existing slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeckOp {
    AppendChild {
        target: usize,
    },
    Delete {
        target: usize,
    },
    Move {
        target: usize,
        direction: Direction,
    },
    Update {
        target: usize,
        field: SlideField,
        value: String,
    },
}

/// Generate a deck id.
pub fn deck_id() -> impl Strategy<Value = DeckId> {
    "[a-z][a-z0-9-]{0,15}".prop_map(DeckId::new)
}

/// Generate a move direction.
pub fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Up), Just(Direction::Down)]
}

/// Generate any payload field, editable or not.
pub fn slide_field() -> impl Strategy<Value = SlideField> {
    prop_oneof![
        Just(SlideField::Tag),
        Just(SlideField::Title),
        Just(SlideField::Subtitle),
        Just(SlideField::Body),
    ]
}

/// Generate a single deck operation.
pub fn deck_op() -> impl Strategy<Value = DeckOp> {
    prop_oneof![
        3 => any::<usize>().prop_map(|target| DeckOp::AppendChild { target }),
        2 => any::<usize>().prop_map(|target| DeckOp::Delete { target }),
        3 => (any::<usize>(), direction())
            .prop_map(|(target, direction)| DeckOp::Move { target, direction }),
        1 => (any::<usize>(), slide_field(), "[A-Za-z0-9 ]{0,12}")
            .prop_map(|(target, field, value)| DeckOp::Update { target, field, value }),
    ]
}

/// Generate a sequence of up to `max_len` deck operations.
pub fn deck_ops(max_len: usize) -> impl Strategy<Value = Vec<DeckOp>> {
    prop::collection::vec(deck_op(), 0..=max_len)
}

/// Generate bulk-create items: JEP slides, with example slides linked to an
/// earlier JEP.
pub fn new_slides(max_len: usize) -> impl Strategy<Value = Vec<NewSlide>> {
    prop::collection::vec((any::<bool>(), any::<usize>()), 0..=max_len).prop_map(|specs| {
        let mut items: Vec<NewSlide> = Vec::with_capacity(specs.len());
        let mut jeps: Vec<usize> = Vec::new();

        for (i, (example, seed)) in specs.into_iter().enumerate() {
            match (example, jeps.is_empty()) {
                (true, false) => {
                    let parent = jeps[seed % jeps.len()];
                    let tag = items.get(parent).and_then(|p| p.tag.clone());
                    items.push(NewSlide::example(tag, format!("Example {}", i), "code", parent));
                }
                _ => {
                    jeps.push(i);
                    items.push(NewSlide::jep(format!("{}", 100 + i), format!("JEP {}", i), None));
                }
            }
        }

        items
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckstore_core::SlideKind;

    proptest! {
        #[test]
        fn generated_items_only_link_backwards_to_jeps(items in new_slides(24)) {
            for (i, item) in items.iter().enumerate() {
                prop_assert_ne!(item.kind, SlideKind::Title);
                if let Some(parent) = item.parent {
                    prop_assert!(parent < i);
                    prop_assert_eq!(items[parent].kind, SlideKind::Jep);
                }
            }
        }
    }

    #[test]
    fn test_deck_op_wire_format() {
        let op = DeckOp::Move { target: 3, direction: Direction::Up };
        let json = serde_json::to_string(&op).unwrap();
        assert_eq!(json, r#"{"op":"move","target":3,"direction":"up"}"#);
        assert_eq!(serde_json::from_str::<DeckOp>(&json).unwrap(), op);
    }
}

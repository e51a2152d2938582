//! Deck invariant checks for tests.

use deckstore_core::{Slide, SlideKind, ANCHOR_POSITION};

/// Check that `slides` (in list order) form a well-formed deck.
///
/// An empty deck is well-formed. Otherwise positions must be exactly
/// `1..=N` in order and the only title slide must sit at position 1.
pub fn check_dense(slides: &[Slide]) -> Result<(), String> {
    for (i, slide) in slides.iter().enumerate() {
        let expected = i as u32 + 1;
        if slide.position != expected {
            return Err(format!(
                "slide {} at index {} has position {}, expected {}",
                slide.id, i, slide.position, expected
            ));
        }
    }

    let titles: Vec<u32> = slides
        .iter()
        .filter(|s| s.kind == SlideKind::Title)
        .map(|s| s.position)
        .collect();

    match (slides.is_empty(), titles.as_slice()) {
        (true, []) => Ok(()),
        (false, [p]) if *p == ANCHOR_POSITION => Ok(()),
        _ => Err(format!("title slide positions {:?}", titles)),
    }
}

/// Panic with a readable message unless `slides` is a well-formed deck.
#[track_caller]
pub fn assert_dense(slides: &[Slide]) {
    if let Err(msg) = check_dense(slides) {
        panic!("deck invariant broken: {}\n{:#?}", msg, slides);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckstore_core::{DeckId, SlideId};

    fn slide(id: i64, kind: SlideKind, position: u32) -> Slide {
        Slide {
            id: SlideId::new(id),
            deck_id: DeckId::from("d"),
            kind,
            position,
            parent_id: None,
            tag: None,
            title: String::new(),
            subtitle: None,
            body: None,
        }
    }

    #[test]
    fn test_accepts_well_formed() {
        assert!(check_dense(&[]).is_ok());
        assert!(check_dense(&[slide(1, SlideKind::Title, 1), slide(2, SlideKind::Jep, 2)]).is_ok());
    }

    #[test]
    fn test_rejects_gap_and_missing_title() {
        let gap = [slide(1, SlideKind::Title, 1), slide(2, SlideKind::Jep, 3)];
        assert!(check_dense(&gap).is_err());
        assert!(check_dense(&[slide(2, SlideKind::Jep, 1)]).is_err());
        let misplaced = [slide(1, SlideKind::Jep, 1), slide(2, SlideKind::Title, 2)];
        assert!(check_dense(&misplaced).is_err());
    }

    #[test]
    #[should_panic(expected = "deck invariant broken")]
    fn test_assert_panics() {
        assert_dense(&[slide(1, SlideKind::Jep, 2)]);
    }
}

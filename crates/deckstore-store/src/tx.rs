//! Row-level access inside one open transaction.
//!
//! Backends expose their transaction through [`SlideTx`]; the deck operations
//! in [`crate::ops`] are written once against it. Every `set_position` and
//! `insert_slide` call is checked against `UNIQUE(deck_id, position)` on its
//! own, not at commit.

use deckstore_core::{DeckId, NewSlide, Slide, SlideField, SlideId, SlideKind, TitleFields};

use crate::error::Result;

/// Column values for a slide about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertSlide {
    pub kind: SlideKind,
    pub parent_id: Option<SlideId>,
    pub tag: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: Option<String>,
}

impl InsertSlide {
    /// The deck's title slide.
    pub fn title(fields: &TitleFields) -> Self {
        Self {
            kind: SlideKind::Title,
            parent_id: None,
            tag: None,
            title: fields.title.clone(),
            subtitle: fields.subtitle.clone(),
            body: None,
        }
    }

    /// An initial slide of a bulk create, with its parent index resolved.
    pub fn from_new(item: &NewSlide, parent_id: Option<SlideId>) -> Self {
        Self {
            kind: item.kind,
            parent_id,
            tag: item.tag.clone(),
            title: item.title.clone(),
            subtitle: item.subtitle.clone(),
            body: item.body.clone(),
        }
    }

    /// A fresh child of `parent`, carrying the parent's tag.
    pub fn child_of(parent: &Slide) -> Self {
        Self {
            kind: SlideKind::CHILD,
            parent_id: Some(parent.id),
            tag: parent.tag.clone(),
            title: String::new(),
            subtitle: None,
            body: None,
        }
    }
}

/// Primitive reads and writes within an open transaction.
pub trait SlideTx {
    /// Look up a slide by id.
    fn slide(&self, id: SlideId) -> Result<Option<Slide>>;

    /// All slides of a deck ordered by position.
    fn deck_slides(&self, deck: &DeckId) -> Result<Vec<Slide>>;

    /// Raw `(position, kind)` pairs of a deck, including temporaries.
    fn deck_positions(&self, deck: &DeckId) -> Result<Vec<(i64, SlideKind)>>;

    /// Delete every slide of a deck. Returns the number removed.
    fn clear_deck(&mut self, deck: &DeckId) -> Result<usize>;

    /// Insert a slide at `position`, returning its new id.
    fn insert_slide(
        &mut self,
        deck: &DeckId,
        slide: &InsertSlide,
        position: i64,
    ) -> Result<SlideId>;

    /// Write a single slide's position.
    fn set_position(&mut self, id: SlideId, position: i64) -> Result<()>;

    /// Overwrite one payload field.
    fn set_field(&mut self, id: SlideId, field: SlideField, value: &str) -> Result<()>;

    /// Delete one slide. Slides referencing it as parent are untouched.
    fn remove_slide(&mut self, id: SlideId) -> Result<()>;
}

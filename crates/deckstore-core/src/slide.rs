//! Slide: the ordered record of a deck.
//!
//! A deck is a dense, 1-based sequence of slides. Exactly one slide per deck
//! is the title slide (the anchor), which always holds position 1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anchor;
use crate::types::{DeckId, SlideId};

/// The kind of slide, determining which payload fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SlideKind {
    /// The deck's title slide. Exactly one per deck, pinned to position 1.
    Title = 1,
    /// A slide describing one enhancement proposal.
    Jep = 2,
    /// A slide attached to another slide via `parent_id`.
    Example = 3,
}

impl SlideKind {
    /// The variant created by `append_child`.
    pub const CHILD: SlideKind = SlideKind::Example;

    /// Convert to u8 for storage.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Title),
            2 => Some(Self::Jep),
            3 => Some(Self::Example),
            _ => None,
        }
    }

    /// Fields a caller may change through a field update.
    pub fn editable_fields(self) -> &'static [SlideField] {
        match self {
            SlideKind::Title => &[SlideField::Title, SlideField::Subtitle],
            SlideKind::Jep => &[SlideField::Tag, SlideField::Title, SlideField::Body],
            SlideKind::Example => &[SlideField::Title, SlideField::Body],
        }
    }

    /// Restrict a raw field map to the fields this kind allows.
    ///
    /// Unknown names and fields outside the allow-list are dropped.
    pub fn filter_fields(self, fields: &FieldMap) -> Vec<(SlideField, String)> {
        fields
            .iter()
            .filter_map(|(name, value)| {
                let field = SlideField::parse(name)?;
                self.editable_fields()
                    .contains(&field)
                    .then(|| (field, value.clone()))
            })
            .collect()
    }
}

/// A named payload field of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideField {
    Tag,
    Title,
    Subtitle,
    Body,
}

impl SlideField {
    /// Parse a field name as used on the wire.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "tag" => Some(Self::Tag),
            "title" => Some(Self::Title),
            "subtitle" => Some(Self::Subtitle),
            "body" => Some(Self::Body),
            _ => None,
        }
    }

    /// The wire name of this field.
    pub fn name(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Title => "title",
            Self::Subtitle => "subtitle",
            Self::Body => "body",
        }
    }
}

/// Raw field updates keyed by wire name.
pub type FieldMap = BTreeMap<String, String>;

/// Direction of a single-step move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards position 1.
    Up,
    /// Towards the end of the deck.
    Down,
}

impl Direction {
    /// The position of the neighbour in this direction, if it can exist.
    pub fn neighbour_of(self, position: u32) -> Option<u32> {
        match self {
            Direction::Up => position.checked_sub(1).filter(|p| *p >= 1),
            Direction::Down => position.checked_add(1),
        }
    }
}

/// A stored slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub deck_id: DeckId,
    pub kind: SlideKind,
    /// 1-based, unique and dense within the deck.
    pub position: u32,
    /// Weak link used only to compute insertion points. The referenced slide
    /// may no longer exist.
    pub parent_id: Option<SlideId>,
    /// Informational tag (the JEP number), inherited by appended children.
    pub tag: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: Option<String>,
}

impl Slide {
    /// Whether this is the deck's protected title slide.
    pub fn is_anchor(&self) -> bool {
        anchor::is_protected(self.kind)
    }

    /// Read a payload field by name.
    pub fn field(&self, field: SlideField) -> Option<&str> {
        match field {
            SlideField::Tag => self.tag.as_deref(),
            SlideField::Title => Some(self.title.as_str()),
            SlideField::Subtitle => self.subtitle.as_deref(),
            SlideField::Body => self.body.as_deref(),
        }
    }
}

/// Fields of the title slide supplied on deck creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleFields {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
}

impl TitleFields {
    pub fn new(title: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            title: title.into(),
            subtitle,
        }
    }
}

/// A slide to be inserted by deck creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSlide {
    pub kind: SlideKind,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// Index of an earlier item in the same batch to link as parent.
    #[serde(default)]
    pub parent: Option<usize>,
}

impl NewSlide {
    /// A slide for one enhancement proposal.
    pub fn jep(
        number: impl Into<String>,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            kind: SlideKind::Jep,
            tag: Some(number.into()),
            title: title.into(),
            subtitle: None,
            body: description,
            parent: None,
        }
    }

    /// An example slide linked to the item at `parent` in the same batch.
    pub fn example(
        tag: Option<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        parent: usize,
    ) -> Self {
        Self {
            kind: SlideKind::Example,
            tag,
            title: title.into(),
            subtitle: None,
            body: Some(content.into()),
            parent: Some(parent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [SlideKind::Title, SlideKind::Jep, SlideKind::Example] {
            assert_eq!(SlideKind::from_u8(kind.to_u8()), Some(kind));
        }
        assert_eq!(SlideKind::from_u8(0), None);
        assert_eq!(SlideKind::from_u8(9), None);
    }

    #[test]
    fn test_filter_fields_respects_allow_list() {
        let mut fields = FieldMap::new();
        fields.insert("title".into(), "New title".into());
        fields.insert("subtitle".into(), "ignored for jep".into());
        fields.insert("colour".into(), "orange".into());

        let filtered = SlideKind::Jep.filter_fields(&fields);
        assert_eq!(filtered, vec![(SlideField::Title, "New title".to_string())]);

        let filtered = SlideKind::Title.filter_fields(&fields);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_filter_fields_empty_map() {
        assert!(SlideKind::Example.filter_fields(&FieldMap::new()).is_empty());
    }

    #[test]
    fn test_neighbour_of() {
        assert_eq!(Direction::Up.neighbour_of(3), Some(2));
        assert_eq!(Direction::Up.neighbour_of(1), None);
        assert_eq!(Direction::Down.neighbour_of(3), Some(4));
    }

    #[test]
    fn test_new_slide_deserializes_with_defaults() {
        let slide: NewSlide =
            serde_json::from_str(r#"{"kind":"jep","title":"Virtual Threads"}"#).unwrap();
        assert_eq!(slide.kind, SlideKind::Jep);
        assert_eq!(slide.parent, None);
        assert_eq!(slide.body, None);
    }
}

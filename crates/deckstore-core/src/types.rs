//! Strong type definitions for deckstore.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A slide identifier, assigned by the store on creation.
///
/// Identifiers are never reused, even after the slide is deleted or its
/// deck is recreated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub i64);

impl SlideId {
    /// Wrap a raw store-assigned identifier.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw identifier.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlideId({})", self.0)
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SlideId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Identifier of a deck: the owner collection that scopes position
/// uniqueness and density.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    /// Create a deck identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeckId({})", self.0)
    }
}

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeckId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeckId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DeckId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

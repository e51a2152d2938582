//! Release outlines: the upstream content a deck is generated from.
//!
//! A [`ReleaseOutline`] describes one JDK release. It expands into the title
//! slide's fields and the ordered items of a bulk create: each JEP slide is
//! followed by its example slides, which link back to it as their parent.

use deckstore_core::{NewSlide, TitleFields};
use serde::{Deserialize, Serialize};

/// One release and its JEPs, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseOutline {
    pub version: String,
    pub release_date: String,
    pub tagline: String,
    #[serde(default)]
    pub jeps: Vec<JepOutline>,
}

/// A single JEP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JepOutline {
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<ExampleOutline>,
}

/// A code example attached to a JEP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleOutline {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl ReleaseOutline {
    pub fn new(
        version: impl Into<String>,
        release_date: impl Into<String>,
        tagline: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            release_date: release_date.into(),
            tagline: tagline.into(),
            jeps: Vec::new(),
        }
    }

    /// Add a JEP at the end of the outline.
    pub fn jep(mut self, jep: JepOutline) -> Self {
        self.jeps.push(jep);
        self
    }

    /// Fields of the deck's title slide.
    pub fn title_fields(&self) -> TitleFields {
        TitleFields::new(
            format!("JAVA {}", self.version),
            Some(format!("{} (Release date {})", self.tagline, self.release_date)),
        )
    }

    /// Items for a bulk create, title slide excluded.
    pub fn items(&self) -> Vec<NewSlide> {
        let mut items = Vec::with_capacity(self.slide_count());

        for jep in &self.jeps {
            let parent = items.len();
            let description = (!jep.description.is_empty()).then(|| jep.description.clone());
            items.push(NewSlide::jep(jep.number.clone(), jep.title.clone(), description));

            for (i, example) in jep.examples.iter().enumerate() {
                items.push(NewSlide::example(
                    Some(jep.number.clone()),
                    format!("JEP {} Example {}", jep.number, i + 1),
                    format!("{}\n\n{}", example.title, example.content),
                    parent,
                ));
            }
        }

        items
    }

    /// Number of items this outline expands to, title slide excluded.
    pub fn slide_count(&self) -> usize {
        self.jeps.iter().map(|j| 1 + j.examples.len()).sum()
    }
}

impl JepOutline {
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            description: String::new(),
            examples: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn example(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.examples.push(ExampleOutline {
            title: title.into(),
            content: content.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckstore_core::SlideKind;

    fn sample() -> ReleaseOutline {
        ReleaseOutline::new("25", "2025-09-16", "The Future of Java")
            .jep(
                JepOutline::new("507", "Primitive Types in Patterns")
                    .description("Allow primitive types in all pattern contexts.")
                    .example("Switch on int", "switch (x) { case int i -> i; }")
                    .example("instanceof", "if (o instanceof int i) {}"),
            )
            .jep(JepOutline::new("506", "Scoped Values"))
    }

    #[test]
    fn test_title_fields() {
        let title = sample().title_fields();
        assert_eq!(title.title, "JAVA 25");
        assert_eq!(
            title.subtitle.as_deref(),
            Some("The Future of Java (Release date 2025-09-16)")
        );
    }

    #[test]
    fn test_items_follow_jep_order() {
        let outline = sample();
        let items = outline.items();

        assert_eq!(items.len(), outline.slide_count());
        let kinds: Vec<_> = items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            [SlideKind::Jep, SlideKind::Example, SlideKind::Example, SlideKind::Jep]
        );

        assert_eq!(
            items[0].body.as_deref(),
            Some("Allow primitive types in all pattern contexts.")
        );
        assert_eq!(items[3].body, None);

        assert_eq!(items[2].title, "JEP 507 Example 2");
        assert_eq!(items[2].body.as_deref(), Some("instanceof\n\nif (o instanceof int i) {}"));
        assert_eq!(items[2].tag.as_deref(), Some("507"));
        assert_eq!(items[1].parent, Some(0));
        assert_eq!(items[2].parent, Some(0));
    }

    #[test]
    fn test_deserialize_minimal_outline() {
        let json = r#"{
            "version": "21",
            "release_date": "2023-09-19",
            "tagline": "LTS",
            "jeps": [{"number": "444", "title": "Virtual Threads"}]
        }"#;
        let outline: ReleaseOutline = serde_json::from_str(json).unwrap();
        assert_eq!(outline.jeps[0].examples.len(), 0);
        assert_eq!(outline.items().len(), 1);
    }
}

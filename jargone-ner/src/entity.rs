//! Entity categories and recognised spans.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The entity categories kept by the recognizer.
///
/// Taggers emit many more labels (dates, places, quantities); only these six
/// describe the kind of jargon worth looking up in the lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Product,
    Organization,
    Person,
    Facility,
    WorkOfArt,
    Event,
}

impl EntityCategory {
    /// All allow-listed categories.
    pub const ALL: [EntityCategory; 6] = [
        Self::Product,
        Self::Organization,
        Self::Person,
        Self::Facility,
        Self::WorkOfArt,
        Self::Event,
    ];

    /// Map a tagger label (`PRODUCT`, `ORG`, `PERSON`, `FAC`, `WORK_OF_ART`,
    /// `EVENT`) onto a category. Any other label returns `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "PRODUCT" => Some(Self::Product),
            "ORG" | "ORGANIZATION" => Some(Self::Organization),
            "PERSON" | "PER" => Some(Self::Person),
            "FAC" | "FACILITY" => Some(Self::Facility),
            "WORK_OF_ART" => Some(Self::WorkOfArt),
            "EVENT" => Some(Self::Event),
            _ => None,
        }
    }

    /// The label a tagger uses for this category.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Product => "PRODUCT",
            Self::Organization => "ORG",
            Self::Person => "PERSON",
            Self::Facility => "FAC",
            Self::WorkOfArt => "WORK_OF_ART",
            Self::Event => "EVENT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Organization => "organization",
            Self::Person => "person",
            Self::Facility => "facility",
            Self::WorkOfArt => "work_of_art",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recognised entity span.
///
/// `start` and `stop` are character offsets into the source text, `stop`
/// exclusive. `text` is the lowercased lemma of the span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanEntity {
    /// Lowercased lemma of the span.
    pub text: String,
    /// The entity category.
    pub category: EntityCategory,
    /// Character offset where the span begins.
    pub start: usize,
    /// Character offset one past the end of the span.
    pub stop: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_categories() {
        for category in EntityCategory::ALL {
            assert_eq!(EntityCategory::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert_eq!(EntityCategory::from_label("GPE"), None);
        assert_eq!(EntityCategory::from_label("DATE"), None);
        assert_eq!(EntityCategory::from_label(""), None);
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(EntityCategory::from_label("org"), Some(EntityCategory::Organization));
        assert_eq!(EntityCategory::from_label("Work_Of_Art"), Some(EntityCategory::WorkOfArt));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&EntityCategory::WorkOfArt).unwrap();
        assert_eq!(json, "\"work_of_art\"");
    }
}

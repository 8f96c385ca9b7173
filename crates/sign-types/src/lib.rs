//! Shared records passed between the sign dictionary and the sequence builder.
//!
//! [`MappingEntry`] mirrors one record of the sign dictionary after its key and
//! synonyms have been canonicalized. [`SequenceItem`] is what a player renders:
//! it carries resolved URLs only, never a reference back into the dictionary.
//!
//! ```rust
//! use sign_types::SequenceItem;
//!
//! let gap = SequenceItem::placeholder("بك");
//! assert!(!gap.is_playable());
//! assert!(gap.missing_sign_message().unwrap().contains("بك"));
//! ```

use std::fmt;

/// One dictionary record keyed by its canonical (normalized) phrase.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingEntry {
    pub key: String,
    pub asset_path: String,
    pub poster_path: Option<String>,
    pub synonyms: Vec<String>,
    pub part_of_speech: Option<String>,
    pub priority: Option<f64>,
}

impl MappingEntry {
    /// Entry with only the required fields set.
    pub fn new(key: impl Into<String>, asset_path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            asset_path: asset_path.into(),
            poster_path: None,
            synonyms: Vec::new(),
            part_of_speech: None,
            priority: None,
        }
    }

    pub fn with_poster(mut self, poster_path: impl Into<String>) -> Self {
        self.poster_path = Some(poster_path.into());
        self
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

/// A single display step in a resolved sign sequence.
///
/// An empty `video_url` marks a gap: the span was kept so callers can show
/// "no sign for X", but there is nothing to play.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceItem {
    pub label: String,
    pub video_url: String,
    pub poster_url: Option<String>,
    pub original_text: String,
}

impl SequenceItem {
    pub fn matched(
        label: impl Into<String>,
        video_url: impl Into<String>,
        poster_url: Option<String>,
    ) -> Self {
        let label = label.into();
        Self {
            original_text: label.clone(),
            label,
            video_url: video_url.into(),
            poster_url,
        }
    }

    pub fn placeholder(label: impl Into<String>) -> Self {
        Self::matched(label, String::new(), None)
    }

    /// True when the item has something the player can load.
    pub fn is_playable(&self) -> bool {
        !self.video_url.trim().is_empty()
    }

    /// User-facing Arabic notice for gaps, `None` for playable items.
    pub fn missing_sign_message(&self) -> Option<String> {
        if self.is_playable() {
            return None;
        }
        Some(format!(
            "لا توجد إشارة مطابقة لكلمة \"{}\"",
            self.original_text
        ))
    }
}

impl fmt::Display for SequenceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_playable() {
            write!(f, "{} -> {}", self.label, self.video_url)
        } else {
            write!(f, "{} -> (no sign)", self.label)
        }
    }
}

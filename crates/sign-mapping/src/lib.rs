//! Load the sign dictionary and resolve Arabic phrases against it.
//!
//! The dictionary is a JSON object keyed by phrase:
//!
//! ```json
//! { "شكرا": { "path": "signs/thanks.mp4", "poster": "posters/thanks.jpg",
//!             "syn": ["متشكر"], "pos": "intj", "prio": 1 } }
//! ```
//!
//! Keys and synonyms are canonicalized with [`arabic_text::prepare`] at load,
//! so every lookup compares canonical forms. Records that fail validation are
//! dropped individually and counted in [`LoadReport`]; only a document that is
//! not a JSON object at all is an error.
//!
//! # Lookups
//! - [`SignMapping::exact_lookup`]: key or synonym equality. Used for phrases.
//! - [`SignMapping::direct_lookup`]: exact plus definite-article stripping.
//! - [`SignMapping::fuzzy_lookup`]: direct plus bidirectional containment.
//! - [`SignMapping::partial_lookup`]: bounded containment fallback.
//!
//! # Example
//! ```
//! use sign_mapping::SignMapping;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mapping = SignMapping::from_json_str(
//!     r#"{ "شكرا": { "path": "v/thanks.mp4", "syn": ["متشكر"] } }"#,
//! )?;
//! let entry = mapping.exact_lookup("مُتشكر").expect("synonym hit");
//! assert_eq!(entry.asset_path, "v/thanks.mp4");
//! # Ok(()) }
//! ```

mod cache;
mod source;

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use arabic_text::{char_len, prepare};
use serde::Deserialize;
use serde_json::Value;
use sign_types::MappingEntry;
use tracing::warn;

pub use cache::{CacheState, MappingCache};
pub use source::{FileSource, InlineSource, MappingSource};

const ARTICLE: &str = "ال";
const MIN_KEY_CHARS: usize = 2;

/// Per-load bookkeeping for dropped and overwritten records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: usize,
    pub overwritten: usize,
}

#[derive(Deserialize)]
struct RawEntry {
    path: String,
    #[serde(default)]
    poster: Option<String>,
    #[serde(default)]
    syn: Option<Vec<String>>,
    #[serde(default)]
    pos: Option<String>,
    #[serde(default)]
    prio: Option<f64>,
}

/// Read-only dictionary of canonical phrase → [`MappingEntry`].
///
/// Iteration order is source order; a record whose key canonicalizes to an
/// existing key replaces it in place.
#[derive(Debug, Default)]
pub struct SignMapping {
    entries: Vec<MappingEntry>,
    by_key: HashMap<String, usize>,
    by_bare_key: HashMap<String, usize>,
    by_synonym: HashMap<String, usize>,
    report: LoadReport,
}

impl SignMapping {
    /// Mapping with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a dictionary document, dropping malformed records.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(json).context("parse sign mapping JSON")?;
        let Value::Object(records) = doc else {
            bail!("sign mapping must be a JSON object keyed by phrase");
        };

        let mut rejected = 0usize;
        let mut entries = Vec::with_capacity(records.len());
        for (raw_key, value) in records {
            match parse_record(&raw_key, value) {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!("dropping sign mapping record {raw_key:?}: {err:#}");
                    rejected += 1;
                }
            }
        }

        let mut mapping = Self::from_entries(entries);
        mapping.report.rejected += rejected;
        Ok(mapping)
    }

    /// Build from already-constructed entries, canonicalizing keys and synonyms.
    pub fn from_entries(entries: impl IntoIterator<Item = MappingEntry>) -> Self {
        let mut report = LoadReport::default();
        let mut ordered: Vec<MappingEntry> = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();

        for mut entry in entries {
            let key = prepare(&entry.key);
            if key.is_empty() || entry.asset_path.trim().is_empty() {
                warn!("dropping sign mapping entry {:?}: empty key or path", entry.key);
                report.rejected += 1;
                continue;
            }
            entry.key = key.clone();
            entry.synonyms = canonical_synonyms(&entry.synonyms);

            if let Some(&idx) = by_key.get(&key) {
                ordered[idx] = entry;
                report.overwritten += 1;
            } else {
                by_key.insert(key, ordered.len());
                ordered.push(entry);
            }
        }
        report.accepted = ordered.len();

        let mut by_bare_key = HashMap::new();
        let mut by_synonym = HashMap::new();
        for (idx, entry) in ordered.iter().enumerate() {
            let bare = strip_article(&entry.key).unwrap_or(entry.key.as_str());
            by_bare_key.entry(bare.to_string()).or_insert(idx);
            for syn in &entry.synonyms {
                by_synonym.entry(syn.clone()).or_insert(idx);
            }
        }

        Self {
            entries: ordered,
            by_key,
            by_bare_key,
            by_synonym,
            report,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    /// Entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> + '_ {
        self.entries.iter()
    }

    /// Fetch an entry by its canonical key.
    pub fn get(&self, key: &str) -> Option<&MappingEntry> {
        self.by_key.get(key).map(|&idx| &self.entries[idx])
    }

    /// Strict equality against keys, then synonyms. Never matches partially.
    pub fn exact_lookup(&self, phrase: &str) -> Option<&MappingEntry> {
        let query = prepare(phrase);
        if query.is_empty() {
            return None;
        }
        self.by_key
            .get(&query)
            .or_else(|| self.by_synonym.get(&query))
            .map(|&idx| &self.entries[idx])
    }

    /// Key, article-stripped key and synonym matches, without containment.
    pub fn direct_lookup(&self, phrase: &str) -> Option<&MappingEntry> {
        let query = prepare(phrase);
        if query.is_empty() {
            return None;
        }
        self.direct_index(&query).map(|idx| &self.entries[idx])
    }

    /// [`direct_lookup`](Self::direct_lookup), falling back to the first key
    /// that contains the phrase or is contained in it.
    pub fn fuzzy_lookup(&self, phrase: &str) -> Option<&MappingEntry> {
        let query = prepare(phrase);
        if query.is_empty() {
            return None;
        }
        if let Some(idx) = self.direct_index(&query) {
            return Some(&self.entries[idx]);
        }
        self.entries.iter().find(|entry| {
            entry.key.contains(query.as_str())
                || (char_len(&entry.key) >= MIN_KEY_CHARS && query.contains(entry.key.as_str()))
        })
    }

    /// First key that contains the phrase while being at most
    /// `max_extra_chars` longer, or that the phrase contains.
    pub fn partial_lookup(&self, phrase: &str, max_extra_chars: usize) -> Option<&MappingEntry> {
        let query = prepare(phrase);
        if query.is_empty() {
            return None;
        }
        let limit = char_len(&query) + max_extra_chars;
        self.entries.iter().find(|entry| {
            let key_len = char_len(&entry.key);
            (entry.key.contains(query.as_str()) && key_len <= limit)
                || (key_len >= MIN_KEY_CHARS && query.contains(entry.key.as_str()))
        })
    }

    fn direct_index(&self, query: &str) -> Option<usize> {
        if let Some(&idx) = self.by_key.get(query) {
            return Some(idx);
        }

        // Alef variants need no extra probe here: keys and queries are both
        // folded to bare alef by canonicalization.
        let bare = strip_article(query).unwrap_or(query);
        self.by_key
            .get(bare)
            .or_else(|| self.by_bare_key.get(bare))
            .or_else(|| self.by_synonym.get(query))
            .or_else(|| self.by_synonym.get(bare))
            .copied()
    }
}

fn parse_record(raw_key: &str, value: Value) -> Result<MappingEntry> {
    let raw: RawEntry = serde_json::from_value(value).context("invalid record shape")?;
    let key = prepare(raw_key);
    if key.is_empty() {
        bail!("key has no Arabic content");
    }
    if raw.path.trim().is_empty() {
        bail!("path is empty");
    }
    Ok(MappingEntry {
        key,
        asset_path: raw.path,
        poster_path: raw.poster.filter(|p| !p.trim().is_empty()),
        synonyms: raw.syn.unwrap_or_default(),
        part_of_speech: raw.pos,
        priority: raw.prio,
    })
}

fn canonical_synonyms(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for syn in raw {
        let canonical = prepare(syn);
        if !canonical.is_empty() && !out.contains(&canonical) {
            out.push(canonical);
        }
    }
    out
}

fn strip_article(text: &str) -> Option<&str> {
    text.strip_prefix(ARTICLE)
        .filter(|rest| char_len(rest) >= MIN_KEY_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(json: &str) -> SignMapping {
        SignMapping::from_json_str(json).expect("valid mapping")
    }

    #[test]
    fn canonicalizes_keys_and_synonyms() {
        let m = mapping(r#"{ "شُكْراً": { "path": "v/thanks.mp4", "syn": ["مُتَشَكِّر", "شكرن", "شكرن"] } }"#);
        let entry = m.get("شكرا").expect("canonical key");
        assert_eq!(entry.synonyms, vec!["متشكر".to_string(), "شكرن".to_string()]);
    }

    #[test]
    fn drops_malformed_records_without_failing() {
        let m = mapping(
            r#"{
                "مرحبا": { "path": "v/hi.mp4" },
                "بلا": { "poster": "p.jpg" },
                "فارغ": { "path": "  " },
                "hello": { "path": "v/en.mp4" },
                "رقم": { "path": 7 },
                "كتاب": { "path": "v/book.mp4", "syn": null, "prio": 2 }
            }"#,
        );
        assert_eq!(m.len(), 2);
        assert_eq!(
            m.report(),
            LoadReport {
                accepted: 2,
                rejected: 4,
                overwritten: 0
            }
        );
        assert_eq!(m.get("كتاب").and_then(|e| e.priority), Some(2.0));
    }

    #[test]
    fn rejects_non_object_documents() {
        assert!(SignMapping::from_json_str("[1, 2]").is_err());
        assert!(SignMapping::from_json_str("{ not json").is_err());
    }

    #[test]
    fn later_duplicate_overwrites_in_place() {
        let m = mapping(
            r#"{
                "أهلا": { "path": "v/first.mp4" },
                "بيت": { "path": "v/house.mp4" },
                "اهلا": { "path": "v/second.mp4" }
            }"#,
        );
        assert_eq!(m.len(), 2);
        assert_eq!(m.report().overwritten, 1);
        let keys: Vec<&str> = m.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["اهلا", "بيت"]);
        assert_eq!(m.get("اهلا").unwrap().asset_path, "v/second.mp4");
    }

    #[test]
    fn exact_lookup_is_strict() {
        let m = mapping(
            r#"{ "اهلا وسهلا": { "path": "v/welcome.mp4", "syn": ["اهلين"] },
                 "مدرسة": { "path": "v/school.mp4" } }"#,
        );
        assert!(m.exact_lookup("أهلاً وسهلاً").is_some());
        assert!(m.exact_lookup("اهلين").is_some());
        assert!(m.exact_lookup("اهلا").is_none());
        assert!(m.exact_lookup("المدرسة").is_none());
        assert!(m.exact_lookup("").is_none());
    }

    #[test]
    fn direct_lookup_strips_article_on_both_sides() {
        let m = mapping(
            r#"{ "الكتاب": { "path": "v/book.mp4" },
                 "مدرسة": { "path": "v/school.mp4" } }"#,
        );
        assert_eq!(m.direct_lookup("كتاب").unwrap().asset_path, "v/book.mp4");
        assert_eq!(m.direct_lookup("المدرسة").unwrap().asset_path, "v/school.mp4");
        assert!(m.direct_lookup("مدرس").is_none());
    }

    #[test]
    fn direct_lookup_matches_article_stripped_synonyms() {
        let m = mapping(r#"{ "سيارة": { "path": "v/car.mp4", "syn": ["عربية"] } }"#);
        assert_eq!(m.direct_lookup("العربية").unwrap().key, "سياره");
    }

    #[test]
    fn fuzzy_lookup_falls_back_to_containment() {
        let m = mapping(
            r#"{ "مدرسة": { "path": "v/school.mp4" },
                 "و": { "path": "v/and.mp4" } }"#,
        );
        assert_eq!(m.fuzzy_lookup("مدرس").unwrap().asset_path, "v/school.mp4");
        assert_eq!(m.fuzzy_lookup("مدرستنا").map(|e| e.key.as_str()), None);
        assert_eq!(m.fuzzy_lookup("المدرسه").unwrap().asset_path, "v/school.mp4");
        assert!(m.fuzzy_lookup("ورد").is_none(), "single-letter keys never contain-match");
    }

    #[test]
    fn partial_lookup_bounds_longer_keys() {
        let m = mapping(r#"{ "مستشفيات": { "path": "v/hospitals.mp4" } }"#);
        assert!(m.partial_lookup("مستشفي", 3).is_some());
        assert!(m.partial_lookup("مستش", 3).is_none());
        assert!(m.partial_lookup("مستش", 5).is_some());
        assert!(m.partial_lookup("المستشفيات", 0).is_some());
    }

    #[test]
    fn empty_mapping_never_matches() {
        let m = SignMapping::empty();
        assert!(m.is_empty());
        assert!(m.exact_lookup("مرحبا").is_none());
        assert!(m.fuzzy_lookup("مرحبا").is_none());
        assert!(m.partial_lookup("مرحبا", 3).is_none());
    }
}

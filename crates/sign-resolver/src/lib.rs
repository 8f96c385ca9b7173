//! Resolve Arabic text into an ordered sequence of sign-language clips.
//!
//! Each sentence is matched independently in two passes:
//! 1. Phrase pass: longest-first, non-overlapping windows of up to six tokens,
//!    accepted only on exact key or synonym equality.
//! 2. Word pass: every unclaimed token goes through fuzzy lookup, bounded
//!    partial lookup, then the same two on its light stem. Tokens with no
//!    match become gaps rather than disappearing.
//!
//! Asset paths of matched entries are turned into URLs by an injected
//! [`AssetResolver`]; the dictionary comes from an injected
//! [`sign_mapping::MappingCache`].
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use sign_mapping::{FileSource, MappingCache};
//! use sign_resolver::{PrefixResolver, SignSequencer};
//!
//! # async fn demo() {
//! let cache = Arc::new(MappingCache::new(FileSource::new("mapping.json")));
//! let sequencer = SignSequencer::new(cache, PrefixResolver::new("/assets"));
//! for item in sequencer.build_sequence("السلام عليكم").await {
//!     println!("{item}");
//! }
//! # }
//! ```
//!
//! For a runnable demo, see `cargo run -p sign-resolver --example translate -- <mapping.json> <text>`.

pub mod assets;
pub mod matcher;
pub mod sequence;

pub use assets::{AssetResolver, CachingResolver, FnResolver, PrefixResolver, ResolveError};
pub use matcher::{
    MatchConfig, MatchKind, PhraseSpan, SpanMatch, Token, find_phrase_matches, match_sentence,
    sentence_tokens,
};
pub use sequence::{SignSequencer, asset_paths, example_sentences};

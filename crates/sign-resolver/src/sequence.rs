use std::sync::Arc;

use arabic_text::split_sentences;
use sign_mapping::{MappingCache, MappingSource};
use sign_types::SequenceItem;
use tracing::{debug, info, warn};

use crate::assets::{AssetResolver, CachingResolver};
use crate::matcher::{MatchConfig, SpanMatch, match_sentence, sentence_tokens};

const EXAMPLE_SENTENCES: &[&str] = &[
    "السلام عليكم",
    "قال صديقي شكراً",
    "أنا أزور الجامعة اليوم",
];

/// Prompt sentences for callers that want to offer a quick start.
pub fn example_sentences() -> &'static [&'static str] {
    EXAMPLE_SENTENCES
}

/// Distinct asset URLs referenced by a built sequence, in playback order.
///
/// Clients prefetch these before starting playback; gaps contribute nothing.
pub fn asset_paths(items: &[SequenceItem]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let urls = std::iter::once(item.video_url.as_str()).chain(item.poster_url.as_deref());
        for url in urls {
            if url.is_empty() || out.iter().any(|seen| seen == url) {
                continue;
            }
            out.push(url.to_string());
        }
    }
    out
}

/// Orchestrates mapping load, per-sentence matching and asset resolution.
pub struct SignSequencer<S, R> {
    mappings: Arc<MappingCache<S>>,
    resolver: R,
    config: MatchConfig,
}

impl<S: MappingSource, R: AssetResolver> SignSequencer<S, R> {
    pub fn new(mappings: Arc<MappingCache<S>>, resolver: R) -> Self {
        Self {
            mappings,
            resolver,
            config: MatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn mappings(&self) -> &Arc<MappingCache<S>> {
        &self.mappings
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolve free-form text into display items, sentence by sentence.
    ///
    /// Blank input gives an empty sequence. Items with an empty `video_url`
    /// are tokens for which no sign was found (or whose asset failed to
    /// resolve); they are never dropped.
    pub async fn build_sequence(&self, text: &str) -> Vec<SequenceItem> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mapping = self.mappings.load().await;
        let mut sequence = Vec::new();
        for sentence in split_sentences(text) {
            let tokens = sentence_tokens(sentence);
            if tokens.is_empty() {
                continue;
            }
            debug!("matching sentence {sentence:?} ({} tokens)", tokens.len());
            for span in match_sentence(&tokens, &mapping, &self.config) {
                sequence.push(self.resolve_span(span).await);
            }
        }

        let playable = sequence.iter().filter(|item| item.is_playable()).count();
        info!(
            "built sign sequence: {} items, {} playable, {} gaps",
            sequence.len(),
            playable,
            sequence.len() - playable
        );
        sequence
    }

    async fn resolve_span(&self, span: SpanMatch<'_>) -> SequenceItem {
        let Some(entry) = span.entry else {
            return SequenceItem::placeholder(span.label);
        };

        let video_url = match self.resolver.resolve(&entry.asset_path).await {
            Ok(url) => url,
            Err(err) => {
                warn!(
                    "could not resolve video {:?} for {:?}: {err}",
                    entry.asset_path, span.label
                );
                return SequenceItem::placeholder(span.label);
            }
        };

        let poster_url = match entry.poster_path.as_deref() {
            Some(poster) => match self.resolver.resolve(poster).await {
                Ok(url) => Some(url),
                Err(err) => {
                    warn!("could not resolve poster {poster:?} for {:?}: {err}", span.label);
                    None
                }
            },
            None => None,
        };

        SequenceItem::matched(span.label, video_url, poster_url)
    }
}

impl<S: MappingSource, R: AssetResolver> SignSequencer<S, CachingResolver<R>> {
    /// Load the mapping and resolve every video and poster path it names,
    /// so later sequences are served from the resolver's memo. Returns how
    /// many paths resolved.
    pub async fn preload_assets(&self) -> usize {
        let mapping = self.mappings.load().await;
        let paths = mapping.iter().flat_map(|entry| {
            std::iter::once(entry.asset_path.as_str()).chain(entry.poster_path.as_deref())
        });
        let resolved = self.resolver.preload(paths).await;
        debug!("preloaded {resolved} asset urls");
        resolved
    }
}

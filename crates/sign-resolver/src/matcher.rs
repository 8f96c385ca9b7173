use arabic_text::{char_len, is_stopword, light_stem, prepare, tokenize};
use bitvec::prelude::*;
use sign_mapping::SignMapping;
use sign_types::MappingEntry;
use tracing::debug;

type Claims = BitVec<usize, Lsb0>;

/// Tuning knobs for the two matching passes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchConfig {
    /// Longest window the phrase pass tries.
    pub max_phrase_len: usize,
    /// How much longer than the query a key may be in the partial pass.
    pub partial_max_extra_chars: usize,
    /// Tokens shorter than this are skipped by the word pass.
    pub min_token_chars: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_phrase_len: 6,
            partial_max_extra_chars: 3,
            min_token_chars: 2,
        }
    }
}

/// A source token and its canonical form, index-aligned within a sentence.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub original: String,
    pub normalized: String,
}

/// Tokenize a sentence, keeping only tokens with Arabic content.
pub fn sentence_tokens(sentence: &str) -> Vec<Token> {
    tokenize(sentence)
        .into_iter()
        .filter_map(|raw| {
            let normalized = prepare(raw);
            (!normalized.is_empty()).then(|| Token {
                original: raw.to_string(),
                normalized,
            })
        })
        .collect()
}

/// Half-open token window `[start, start + len)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PhraseSpan {
    pub start: usize,
    pub len: usize,
}

impl PhraseSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Greedy longest-first, non-overlapping phrase search.
///
/// Window lengths run from `min(max_len, n)` down to 2 and start positions
/// left to right. A window touching any claimed index is skipped; a hit claims
/// its indices and the scan resumes right after it. Results come back in
/// discovery order.
pub fn find_phrase_matches<S, T, F>(tokens: &[S], max_len: usize, mut lookup: F) -> Vec<(PhraseSpan, T)>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Option<T>,
{
    let n = tokens.len();
    let mut claimed: Claims = bitvec![usize, Lsb0; 0; n];
    let mut found = Vec::new();

    for len in (2..=max_len.min(n)).rev() {
        let mut start = 0;
        while start + len <= n {
            if claimed[start..start + len].any() {
                start += 1;
                continue;
            }
            let phrase = join_tokens(&tokens[start..start + len]);
            if let Some(hit) = lookup(&phrase) {
                claimed[start..start + len].fill(true);
                found.push((PhraseSpan { start, len }, hit));
                start += len;
            } else {
                start += 1;
            }
        }
    }

    found
}

/// How a span was resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchKind {
    Phrase,
    Word,
    Partial,
    Stem,
    StemPartial,
    Unmatched,
}

/// One resolved span of a sentence, borrowed from the mapping it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanMatch<'m> {
    pub span: PhraseSpan,
    pub label: String,
    pub entry: Option<&'m MappingEntry>,
    pub kind: MatchKind,
}

/// Run the phrase pass then the word pass over one sentence's tokens.
///
/// Phrase matches come first in discovery order (longest windows first),
/// followed by word-pass spans in token order. Skipped tokens
/// (unmapped stopwords, too-short tokens) produce nothing; any other token
/// without a match produces an [`MatchKind::Unmatched`] span.
pub fn match_sentence<'m>(
    tokens: &[Token],
    mapping: &'m SignMapping,
    config: &MatchConfig,
) -> Vec<SpanMatch<'m>> {
    let normalized: Vec<&str> = tokens.iter().map(|t| t.normalized.as_str()).collect();
    let phrases = find_phrase_matches(&normalized, config.max_phrase_len, |phrase| {
        mapping.exact_lookup(phrase)
    });

    let mut claimed: Claims = bitvec![usize, Lsb0; 0; tokens.len()];
    let mut out = Vec::with_capacity(tokens.len());
    for (span, entry) in phrases {
        claimed[span.start..span.end()].fill(true);
        let originals: Vec<&str> = tokens[span.start..span.end()]
            .iter()
            .map(|t| t.original.as_str())
            .collect();
        let label = originals.join(" ");
        debug!("phrase match {label:?} -> {:?}", entry.key);
        out.push(SpanMatch {
            span,
            label,
            entry: Some(entry),
            kind: MatchKind::Phrase,
        });
    }

    for idx in claimed.iter_zeros() {
        let token = &tokens[idx];
        let span = PhraseSpan { start: idx, len: 1 };
        match resolve_word(&token.normalized, mapping, config) {
            WordOutcome::Skipped => {
                debug!("skipping token {:?}", token.normalized);
            }
            WordOutcome::Matched(entry, kind) => {
                debug!("word match {:?} -> {:?} ({kind:?})", token.original, entry.key);
                out.push(SpanMatch {
                    span,
                    label: token.original.clone(),
                    entry: Some(entry),
                    kind,
                });
            }
            WordOutcome::Unmatched => {
                debug!("no sign for {:?}", token.original);
                out.push(SpanMatch {
                    span,
                    label: token.original.clone(),
                    entry: None,
                    kind: MatchKind::Unmatched,
                });
            }
        }
    }

    out
}

enum WordOutcome<'m> {
    Skipped,
    Matched(&'m MappingEntry, MatchKind),
    Unmatched,
}

fn resolve_word<'m>(token: &str, mapping: &'m SignMapping, config: &MatchConfig) -> WordOutcome<'m> {
    // Dictionary first: a stopword that is itself a sign is still matched.
    let has_direct = mapping.direct_lookup(token).is_some();
    if (is_stopword(token) && !has_direct) || char_len(token) < config.min_token_chars {
        return WordOutcome::Skipped;
    }

    if let Some(entry) = mapping.fuzzy_lookup(token) {
        return WordOutcome::Matched(entry, MatchKind::Word);
    }
    if let Some(entry) = mapping.partial_lookup(token, config.partial_max_extra_chars) {
        return WordOutcome::Matched(entry, MatchKind::Partial);
    }

    let stem = light_stem(token);
    if stem != token {
        if let Some(entry) = mapping.fuzzy_lookup(&stem) {
            return WordOutcome::Matched(entry, MatchKind::Stem);
        }
        if let Some(entry) = mapping.partial_lookup(&stem, config.partial_max_extra_chars) {
            return WordOutcome::Matched(entry, MatchKind::StemPartial);
        }
    }

    WordOutcome::Unmatched
}

fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    let parts: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    parts.join(" ")
}

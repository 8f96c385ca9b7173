//! Arabic text canonicalization for dictionary lookups.
//!
//! Everything here is pure and total: malformed or empty input yields empty
//! output, never an error. Dictionary keys and user text go through the same
//! functions so they meet in one canonical form.
//!
//! # Pipeline
//! 1. [`normalize`] strips tashkeel and tatweel, folds letter variants and
//!    collapses whitespace.
//! 2. [`prepare`] additionally removes anything outside the Arabic blocks.
//! 3. [`split_sentences`] and [`tokenize`] segment the text.
//! 4. [`light_stem`] and [`is_stopword`] support the word-level fallbacks.
//!
//! ```rust
//! use arabic_text::{light_stem, normalize, prepare};
//!
//! assert_eq!(normalize("مَرْحَبًا  بِكُم"), "مرحبا بكم");
//! assert_eq!(prepare("مرحبا hello"), "مرحبا");
//! assert_eq!(light_stem("والكتاب"), "الكتاب");
//! ```

mod stopwords;

use std::collections::HashSet;

pub use stopwords::is_stopword;

const MIN_STEM_CHARS: usize = 2;

/// Prefixes tried in order; the doubled lam comes before its single-letter tail.
const PREFIXES: &[&str] = &["لل", "ال", "و", "ف", "ب", "ك", "ل"];

const SUFFIXES: &[&str] = &["ات", "ون", "ين", "ها", "هم", "كم", "كن", "ة", "يه", "ه"];

const SENTENCE_BREAKS: &[char] = &['.', '!', '؟', '…', '\n'];

const HAMZA: char = '\u{0621}';

/// Canonicalize Arabic text: strip diacritics, fold letter variants, collapse
/// whitespace runs and trim.
pub fn normalize(text: &str) -> String {
    collapse_whitespace(
        text.chars()
            .filter(|c| !is_diacritic(*c))
            .map(fold_letter),
    )
}

/// [`normalize`] and then keep only Arabic-block characters, whitespace and
/// bare hamza.
pub fn prepare(text: &str) -> String {
    let normalized = normalize(text);
    collapse_whitespace(
        normalized
            .chars()
            .filter(|c| is_arabic_char(*c) || c.is_whitespace() || *c == HAMZA),
    )
}

/// Split on sentence punctuation and newlines, dropping blank pieces.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(SENTENCE_BREAKS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Remove at most one known prefix and then at most one known suffix, each
/// only when at least two characters remain.
pub fn light_stem(word: &str) -> String {
    let mut stem = word;

    for prefix in PREFIXES {
        if let Some(rest) = stem.strip_prefix(prefix)
            && char_len(rest) >= MIN_STEM_CHARS
        {
            stem = rest;
            break;
        }
    }

    for suffix in SUFFIXES {
        if let Some(rest) = stem.strip_suffix(suffix)
            && char_len(rest) >= MIN_STEM_CHARS
        {
            stem = rest;
            break;
        }
    }

    stem.to_string()
}

/// True if any character falls in one of the Arabic Unicode blocks.
pub fn is_arabic(text: &str) -> bool {
    text.chars().any(is_arabic_char)
}

/// Up to `max` distinct stems from content words, in first-seen order.
pub fn pick_keywords<S: AsRef<str>>(tokens: &[S], max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for token in tokens {
        if out.len() >= max {
            break;
        }
        let normalized = normalize(token.as_ref());
        if char_len(&normalized) < MIN_STEM_CHARS || is_stopword(&normalized) {
            continue;
        }
        let stem = light_stem(&normalized);
        if char_len(&stem) < MIN_STEM_CHARS {
            continue;
        }
        if seen.insert(stem.clone()) {
            out.push(stem);
        }
    }
    out
}

/// All n-grams from `max_n` down to unigrams, left to right within each size.
pub fn build_ngrams<S: AsRef<str>>(tokens: &[S], max_n: usize) -> Vec<String> {
    let mut out = Vec::new();
    for n in (1..=max_n.min(tokens.len())).rev() {
        for window in tokens.windows(n) {
            let parts: Vec<&str> = window.iter().map(|t| t.as_ref()).collect();
            out.push(parts.join(" "));
        }
    }
    out
}

/// Length in characters, which is what the stemming thresholds count.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn is_diacritic(c: char) -> bool {
    matches!(
        c,
        '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{0640}'
            | '\u{06D6}'..='\u{06DC}'
            | '\u{06DF}'..='\u{06E8}'
            | '\u{06EA}'..='\u{06ED}'
    )
}

fn fold_letter(c: char) -> char {
    match c {
        'أ' | 'إ' | 'آ' => 'ا',
        'ى' => 'ي',
        'ة' => 'ه',
        'ؤ' | 'ئ' => HAMZA,
        other => other,
    }
}

fn is_arabic_char(c: char) -> bool {
    matches!(
        c,
        '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFF}'
    )
}

fn collapse_whitespace(chars: impl Iterator<Item = char>) -> String {
    let mut out = String::new();
    let mut pending_space = false;
    for c in chars {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

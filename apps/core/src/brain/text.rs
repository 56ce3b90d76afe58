//! Text normalization and lexicon matching primitives.
//!
//! Shared by the feature extractor, the semantic matcher, and both intent
//! classifiers so every pipeline stage agrees on what a "word" is.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Stop words removed before keyword ranking.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "i", "you", "he", "she", "it", "we", "they",
];

/// Minimum token length considered for keyword ranking.
pub const MIN_KEYWORD_LENGTH: usize = 3;

/// Inflection suffixes accepted when matching a token against a lexicon term.
const SUFFIXES: &[&str] = &["s", "es", "ed", "ing", "ly"];

/// Stems shorter than this are rejected to keep suffix stripping from
/// collapsing unrelated short words (e.g. "his" must not match "hi").
const MIN_STEM_LENGTH: usize = 3;

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Returns the shared stop-word set.
pub fn stop_words() -> &'static HashSet<&'static str> {
    &STOP_WORD_SET
}

/// Lowercases the text and replaces every non-alphanumeric character with a
/// space, so downstream matching never sees punctuation or case.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Splits normalized text into whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}

/// Tests whether a single token matches a single-word lexicon term, either
/// verbatim or as a common inflected form (plural, -ed, -ing, -ly).
pub fn matches_term(token: &str, term: &str) -> bool {
    if token == term {
        return true;
    }
    SUFFIXES.iter().any(|suffix| {
        token
            .strip_suffix(suffix)
            .is_some_and(|stem| stem.len() >= MIN_STEM_LENGTH && stem == term)
    })
}

/// Tests whether a lexicon term occurs in the token sequence with word
/// boundaries respected. Multi-word terms match as a window of consecutive
/// tokens; each word of the term may appear inflected.
pub fn contains_term(tokens: &[String], term: &str) -> bool {
    let words: Vec<&str> = term.split_whitespace().collect();
    match words.as_slice() {
        [] => false,
        [word] => tokens.iter().any(|t| matches_term(t, word)),
        words => tokens.windows(words.len()).any(|window| {
            window
                .iter()
                .zip(words.iter())
                .all(|(token, word)| matches_term(token, word))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize("Hello, World!"), "hello  world ");
        assert_eq!(tokenize("What's the TACT program?"), vec![
            "what", "s", "the", "tact", "program"
        ]);
    }

    #[test]
    fn test_matches_term_inflections() {
        assert!(matches_term("requirements", "requirement"));
        assert!(matches_term("fees", "fee"));
        assert!(matches_term("urgently", "urgent"));
        assert!(matches_term("classes", "class"));
        assert!(!matches_term("contact", "tact"));
        assert!(!matches_term("his", "hi"));
    }

    #[test]
    fn test_contains_term_phrases() {
        let tokens = tokenize("good morning, how long has MPTI existed");
        assert!(contains_term(&tokens, "good morning"));
        assert!(contains_term(&tokens, "how long"));
        assert!(!contains_term(&tokens, "good afternoon"));
    }

    #[test]
    fn test_stop_words_contains_core_entries() {
        assert!(stop_words().contains("the"));
        assert!(stop_words().contains("can"));
        assert!(!stop_words().contains("program"));
    }
}

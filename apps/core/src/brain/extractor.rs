//! Feature extraction from raw message text.
//!
//! Pure and deterministic: entities, keywords, question type, intent signals,
//! and sentiment from fixed vocabularies. No I/O, no session state; any input
//! string (including empty) yields a well-formed result.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::analysis::{
    AnalysisResult, ExtractedEntities, IntentSignals, QuestionType, Sentiment,
};
use super::text::{matches_term, normalize, stop_words, tokenize, MIN_KEYWORD_LENGTH};

/// Canonical program names recognized as entities.
const PROGRAM_ENTITIES: &[&str] = &[
    "tact",
    "mechanical",
    "electrical",
    "welding",
    "instrumentation",
    "engineering",
];

/// Locations relevant to the institute.
const LOCATION_ENTITIES: &[&str] = &["ghana", "accra", "kumasi", "campus"];

/// Time-period vocabulary.
const TIME_PERIOD_ENTITIES: &[&str] = &["semester", "year", "month", "week", "morning", "evening"];

const URGENCY_WORDS: &[&str] = &["urgent", "asap", "immediately", "now", "quickly", "soon"];
const COMPARISON_WORDS: &[&str] = &["compare", "difference", "better", "best", "versus", "vs", "or"];
const ADVICE_WORDS: &[&str] = &["decide", "choose", "select", "pick", "recommend", "suggest"];
const DETAIL_WORDS: &[&str] = &["detail", "more", "explain", "elaborate", "specific", "exactly"];

const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "love",
    "like",
    "happy",
    "excited",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "hate",
    "dislike",
    "disappointed",
    "frustrated",
    "angry",
];

/// Maximum number of keywords returned per message.
const MAX_KEYWORDS: usize = 5;

// "can I apply", "do you offer" and similar constructions. Compiled once;
// runs against normalized text, so no punctuation or case handling needed.
static CAN_DO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:can|do)\s+(?:i|you|we)\b").expect("Invalid regex: can/do pattern")
});

/// Pure text-to-features extractor over fixed vocabularies.
pub struct FeatureExtractor;

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Analyzes a raw message into its structured features.
    pub fn extract(&self, text: &str) -> AnalysisResult {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return AnalysisResult::empty();
        }

        let normalized = normalize(text);

        AnalysisResult {
            entities: self.extract_entities(&tokens),
            keywords: self.extract_keywords(&tokens),
            question_type: self.detect_question_type(&tokens, &normalized),
            intent_signals: self.extract_intent_signals(&tokens),
            sentiment: self.analyze_sentiment(&tokens),
            tokens,
        }
    }

    /// Matches each category vocabulary against the token stream, collecting
    /// canonical terms in order of first occurrence.
    fn extract_entities(&self, tokens: &[String]) -> ExtractedEntities {
        ExtractedEntities {
            programs: match_vocabulary(tokens, PROGRAM_ENTITIES),
            locations: match_vocabulary(tokens, LOCATION_ENTITIES),
            time_periods: match_vocabulary(tokens, TIME_PERIOD_ENTITIES),
        }
    }

    /// Ranks stop-word-free tokens by in-message frequency, ties broken by
    /// earliest position, and keeps the top five.
    fn extract_keywords(&self, tokens: &[String]) -> Vec<String> {
        let mut frequency: HashMap<&str, usize> = HashMap::new();
        let mut first_position: HashMap<&str, usize> = HashMap::new();

        for (position, token) in tokens.iter().enumerate() {
            if token.len() < MIN_KEYWORD_LENGTH
                || !token.chars().all(|c| c.is_alphabetic())
                || stop_words().contains(token.as_str())
            {
                continue;
            }
            *frequency.entry(token).or_insert(0) += 1;
            first_position.entry(token).or_insert(position);
        }

        let mut ranked: Vec<&str> = frequency.keys().copied().collect();
        ranked.sort_by_key(|token| {
            (
                std::cmp::Reverse(frequency[token]),
                first_position[token],
            )
        });

        ranked
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|s| s.to_string())
            .collect()
    }

    /// Tests marker sets in fixed priority order; the first category whose
    /// markers appear wins, so multi-marker messages resolve deterministically.
    fn detect_question_type(&self, tokens: &[String], normalized: &str) -> QuestionType {
        let has = |word: &str| tokens.iter().any(|t| t == word);

        if has("what") {
            QuestionType::What
        } else if has("how") {
            QuestionType::How
        } else if has("when") {
            QuestionType::When
        } else if has("where") {
            QuestionType::Where
        } else if has("why") {
            QuestionType::Why
        } else if CAN_DO_RE.is_match(normalized) {
            QuestionType::CanDo
        } else {
            QuestionType::None
        }
    }

    /// Four independent membership tests; no mutual exclusion.
    fn extract_intent_signals(&self, tokens: &[String]) -> IntentSignals {
        IntentSignals {
            urgency: any_term(tokens, URGENCY_WORDS),
            comparison: any_term(tokens, COMPARISON_WORDS),
            seeking_advice: any_term(tokens, ADVICE_WORDS),
            wants_details: any_term(tokens, DETAIL_WORDS),
        }
    }

    /// Counts positive vs negative lexicon hits; the difference decides.
    fn analyze_sentiment(&self, tokens: &[String]) -> Sentiment {
        let positive = count_terms(tokens, POSITIVE_WORDS);
        let negative = count_terms(tokens, NEGATIVE_WORDS);

        if positive > negative {
            Sentiment::Positive
        } else if negative > positive {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

fn match_vocabulary(tokens: &[String], vocabulary: &[&str]) -> Vec<String> {
    let mut matched: Vec<(usize, &str)> = vocabulary
        .iter()
        .filter_map(|term| {
            tokens
                .iter()
                .position(|token| matches_term(token, term))
                .map(|position| (position, *term))
        })
        .collect();

    matched.sort_by_key(|(position, _)| *position);
    matched.into_iter().map(|(_, term)| term.to_string()).collect()
}

fn any_term(tokens: &[String], vocabulary: &[&str]) -> bool {
    vocabulary
        .iter()
        .any(|term| tokens.iter().any(|token| matches_term(token, term)))
}

fn count_terms(tokens: &[String], vocabulary: &[&str]) -> usize {
    vocabulary
        .iter()
        .filter(|term| tokens.iter().any(|token| matches_term(token, term)))
        .count()
}

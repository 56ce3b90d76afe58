//! Analysis result types produced by the feature extractor.
//!
//! An [`AnalysisResult`] is created once per message, is immutable after
//! extraction, and feeds every later pipeline stage.

use serde::{Deserialize, Serialize};

/// Interrogative category of a message, detected in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    What,
    How,
    When,
    Where,
    Why,
    CanDo,
    None,
}

impl QuestionType {
    /// Returns the wire label for the question type.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionType::What => "what",
            QuestionType::How => "how",
            QuestionType::When => "when",
            QuestionType::Where => "where",
            QuestionType::Why => "why",
            QuestionType::CanDo => "can_do",
            QuestionType::None => "none",
        }
    }
}

/// Coarse message sentiment from fixed positive/negative lexicons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Independent boolean signals hinting at what the user wants from a reply.
///
/// The four signals are not mutually exclusive; each is a membership test
/// against its own keyword set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSignals {
    pub urgency: bool,
    pub comparison: bool,
    pub seeking_advice: bool,
    pub wants_details: bool,
}

/// Named entities found in the message, grouped by fixed category.
///
/// Terms are canonical vocabulary entries, de-duplicated, in order of first
/// occurrence in the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub programs: Vec<String>,
    pub locations: Vec<String>,
    pub time_periods: Vec<String>,
}

impl ExtractedEntities {
    /// Total number of entities across all categories.
    pub fn total(&self) -> usize {
        self.programs.len() + self.locations.len() + self.time_periods.len()
    }

    /// Iterates over every extracted entity term.
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.programs
            .iter()
            .chain(self.locations.iter())
            .chain(self.time_periods.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Complete structured analysis of one raw message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Entities grouped by category, first-occurrence ordered.
    pub entities: ExtractedEntities,
    /// Top keywords (at most five), frequency-ranked, stop-word free.
    pub keywords: Vec<String>,
    /// Detected interrogative category.
    pub question_type: QuestionType,
    /// Independent intent signals.
    pub intent_signals: IntentSignals,
    /// Lexicon-based sentiment.
    pub sentiment: Sentiment,
    /// Normalized message tokens, reused by the classifier and the semantic
    /// matcher. Internal detail, not part of the response payload.
    #[serde(skip)]
    pub tokens: Vec<String>,
}

impl AnalysisResult {
    /// A well-formed result for content-free input.
    pub fn empty() -> Self {
        Self {
            entities: ExtractedEntities::default(),
            keywords: vec![],
            question_type: QuestionType::None,
            intent_signals: IntentSignals::default(),
            sentiment: Sentiment::Neutral,
            tokens: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_is_well_formed() {
        let result = AnalysisResult::empty();

        assert!(result.entities.is_empty());
        assert!(result.keywords.is_empty());
        assert_eq!(result.question_type, QuestionType::None);
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert!(!result.intent_signals.urgency);
    }

    #[test]
    fn test_tokens_not_serialized() {
        let mut result = AnalysisResult::empty();
        result.tokens = vec!["hello".to_string()];

        let json = serde_json::to_value(&result).expect("serializable");
        assert!(json.get("tokens").is_none());
        assert!(json.get("keywords").is_some());
    }

    #[test]
    fn test_question_type_labels() {
        assert_eq!(QuestionType::CanDo.label(), "can_do");
        assert_eq!(QuestionType::None.label(), "none");
    }
}

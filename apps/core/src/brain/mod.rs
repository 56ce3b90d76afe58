//! # Brain Module
//!
//! Fast, non-LLM understanding pipeline for the MPTI Assistant.
//! Analyzes user input and resolves intent BEFORE any response is composed.
//!
//! ## Components
//! - `text`: normalization, tokenization, and lexicon matching primitives
//! - `analysis`: structured analysis output types
//! - `extractor`: entities, keywords, question type, signals, sentiment
//! - `semantic`: concept-cluster scoring over a synonym-expanded vocabulary
//! - `weights`: adaptive pattern-weight table with JSON persistence
//! - `classifier`: weighted intent classification with rule-based fallback

pub mod analysis;
pub mod classifier;
pub mod extractor;
pub mod semantic;
pub mod text;
pub mod weights;

// Re-export main types for convenience
pub use analysis::{AnalysisResult, ExtractedEntities, IntentSignals, QuestionType, Sentiment};
pub use classifier::{
    AdaptiveIntentClassifier, Classify, ClassificationInput, Intent, IntentDecision,
    RuleClassifier, WeightedClassifier, ALL_INTENTS,
};
pub use extractor::FeatureExtractor;
pub use semantic::{Concept, ConceptScore, SemanticMatcher};
pub use weights::PatternWeightTable;

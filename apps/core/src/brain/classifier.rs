//! Intent classification: weighted patterns with a rule-based fallback.
//!
//! Two classifiers implement one [`Classify`] capability. The
//! [`WeightedClassifier`] scores every intent from the mutable pattern-weight
//! table plus context and semantic boosts; the [`RuleClassifier`] is a
//! deterministic keyword-priority backstop. [`AdaptiveIntentClassifier`]
//! recomputes the mode on every call from the confidence threshold and
//! reinforces the weight table after each weighted decision.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;
use super::semantic::{Concept, ConceptScore};
use super::text::contains_term;
use super::weights::PatternWeightTable;
use crate::config::EngineConfig;

/// Supported intent categories.
///
/// Declaration order is the fixed priority order: it breaks confidence ties
/// in the weighted classifier and drives the rule-fallback scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    History,
    TactProgram,
    Application,
    Programs,
    Contact,
    Greeting,
    Fees,
    Requirements,
    Schedule,
    General,
}

/// All intents in priority order.
pub const ALL_INTENTS: &[Intent] = &[
    Intent::History,
    Intent::TactProgram,
    Intent::Application,
    Intent::Programs,
    Intent::Contact,
    Intent::Greeting,
    Intent::Fees,
    Intent::Requirements,
    Intent::Schedule,
    Intent::General,
];

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Intent {
    /// Returns the wire label for the intent.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::History => "history",
            Intent::TactProgram => "tact_program",
            Intent::Application => "application",
            Intent::Programs => "programs",
            Intent::Contact => "contact",
            Intent::Greeting => "greeting",
            Intent::Fees => "fees",
            Intent::Requirements => "requirements",
            Intent::Schedule => "schedule",
            Intent::General => "general",
        }
    }

    /// Parses a wire label back into an intent.
    pub fn from_label(label: &str) -> Option<Self> {
        ALL_INTENTS.iter().copied().find(|i| i.label() == label)
    }

    /// Fixed pattern vocabulary for the intent. Multi-word entries match as
    /// consecutive-token phrases.
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Intent::History => &[
                "how long",
                "when founded",
                "established",
                "history",
                "existence",
                "started",
                "began",
                "old",
                "years",
            ],
            Intent::TactProgram => &[
                "tact",
                "technical advancement",
                "certification training",
                "professional development",
            ],
            Intent::Application => &[
                "apply", "admission", "enroll", "form", "register", "join", "signup",
            ],
            Intent::Programs => &[
                "program",
                "course",
                "study",
                "degree",
                "curriculum",
                "major",
                "specialization",
            ],
            Intent::Contact => &[
                "contact", "phone", "email", "address", "location", "reach", "call",
            ],
            Intent::Greeting => &[
                "hello",
                "hi",
                "hey",
                "good morning",
                "good afternoon",
                "greetings",
            ],
            Intent::Fees => &[
                "fee",
                "cost",
                "price",
                "tuition",
                "payment",
                "scholarship",
                "financial",
            ],
            Intent::Requirements => &[
                "requirement",
                "prerequisite",
                "qualification",
                "criteria",
                "eligibility",
            ],
            Intent::Schedule => &[
                "schedule", "time", "duration", "when", "start", "semester", "class",
            ],
            Intent::General => &[],
        }
    }

    /// Intents considered related for context boosting: a recent occurrence
    /// of `self` boosts each listed intent on the following turns.
    fn related(&self) -> &'static [Intent] {
        match self {
            Intent::Programs => &[Intent::Requirements, Intent::Fees, Intent::Schedule],
            Intent::TactProgram => &[Intent::Application, Intent::Requirements, Intent::Fees],
            Intent::Application => &[Intent::Requirements, Intent::Fees, Intent::Programs],
            Intent::Requirements => &[Intent::Programs, Intent::Application],
            _ => &[],
        }
    }

    /// Concept clusters whose score can trigger the semantic raw-score bonus.
    fn concepts(&self) -> &'static [Concept] {
        match self {
            Intent::TactProgram => &[Concept::Education],
            Intent::Application => &[Concept::Application, Concept::Financial],
            Intent::Programs => &[Concept::Education, Concept::Technical],
            Intent::Fees => &[Concept::Financial],
            Intent::Requirements => &[Concept::Education, Concept::Application],
            Intent::Schedule => &[Concept::Time],
            Intent::Contact => &[Concept::Location],
            _ => &[],
        }
    }
}

/// Outcome of one classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentDecision {
    /// Winning intent.
    pub intent: Intent,
    /// Normalized confidence in [0, 1].
    pub confidence: f32,
    /// True when the rule-based backstop produced this decision.
    pub used_fallback: bool,
    /// Patterns of the winning intent that matched; drives reinforcement.
    pub matched_patterns: Vec<String>,
}

/// Per-call classification inputs.
pub struct ClassificationInput<'a> {
    pub analysis: &'a AnalysisResult,
    pub concepts: &'a [ConceptScore],
    pub recent_intents: &'a [Intent],
}

/// One classification capability with two implementations, selected by the
/// adaptive classifier's threshold check.
pub trait Classify {
    fn classify(&self, input: &ClassificationInput<'_>) -> IntentDecision;
}

/// Primary classifier: adaptively weighted pattern scoring with context and
/// semantic boosts, normalized by a saturating function.
pub struct WeightedClassifier {
    weights: Arc<PatternWeightTable>,
    context_boost: f32,
    semantic_boost: f32,
    semantic_threshold: f32,
    exact_match_bonus: f32,
    confidence_k: f32,
}

impl WeightedClassifier {
    pub fn new(weights: Arc<PatternWeightTable>, config: &EngineConfig) -> Self {
        Self {
            weights,
            context_boost: config.context_boost,
            semantic_boost: config.semantic_boost,
            semantic_threshold: config.semantic_boost_threshold,
            exact_match_bonus: config.exact_match_bonus,
            confidence_k: config.confidence_k,
        }
    }

    fn matched_patterns(&self, intent: Intent, tokens: &[String]) -> Vec<String> {
        intent
            .patterns()
            .iter()
            .filter(|pattern| contains_term(tokens, pattern))
            .map(|p| p.to_string())
            .collect()
    }

    fn raw_score(&self, intent: Intent, input: &ClassificationInput<'_>, matched: &[String]) -> f32 {
        let tokens = &input.analysis.tokens;
        let mut score = self.weights.matched_sum(intent, matched);

        // The whole message being exactly one pattern is a much stronger
        // signal than the pattern merely occurring somewhere in it.
        let whole_message = tokens.join(" ");
        if matched.iter().any(|pattern| *pattern == whole_message) {
            score += self.exact_match_bonus;
        }

        if input
            .recent_intents
            .iter()
            .any(|recent| recent.related().contains(&intent))
        {
            score += self.context_boost;
        }

        let cluster_top = intent
            .concepts()
            .iter()
            .filter_map(|concept| {
                input
                    .concepts
                    .iter()
                    .find(|cs| cs.concept == *concept)
                    .map(|cs| cs.score)
            })
            .fold(0.0_f32, f32::max);
        if cluster_top > self.semantic_threshold {
            score += self.semantic_boost;
        }

        score
    }

    /// Saturating normalization into [0, 1). Strictly increasing in the raw
    /// score, so reinforcing a matched pattern always raises the intent's
    /// confidence and never moves any other intent's.
    fn normalize(&self, score: f32) -> f32 {
        if score <= 0.0 {
            0.0
        } else {
            score / (score + self.confidence_k)
        }
    }
}

impl Classify for WeightedClassifier {
    fn classify(&self, input: &ClassificationInput<'_>) -> IntentDecision {
        let mut best = ALL_INTENTS[0];
        let mut best_confidence = 0.0_f32;
        let mut best_matched: Vec<String> = vec![];

        for &intent in ALL_INTENTS {
            let matched = self.matched_patterns(intent, &input.analysis.tokens);
            let confidence = self.normalize(self.raw_score(intent, input, &matched));

            // Strict comparison keeps ties resolved by declaration order.
            if confidence > best_confidence {
                best = intent;
                best_confidence = confidence;
                best_matched = matched;
            }
        }

        IntentDecision {
            intent: best,
            confidence: best_confidence,
            used_fallback: false,
            matched_patterns: best_matched,
        }
    }
}

/// Deterministic backstop: first intent in priority order with any pattern
/// hit wins; confidence reflects the matched fraction of its vocabulary.
pub struct RuleClassifier;

impl Classify for RuleClassifier {
    fn classify(&self, input: &ClassificationInput<'_>) -> IntentDecision {
        let tokens = &input.analysis.tokens;

        for &intent in ALL_INTENTS {
            let patterns = intent.patterns();
            let matched: Vec<String> = patterns
                .iter()
                .filter(|pattern| contains_term(tokens, pattern))
                .map(|p| p.to_string())
                .collect();

            if matched.is_empty() {
                continue;
            }

            let mut confidence = matched.len() as f32 / patterns.len() as f32;
            if matched.len() > 1 {
                confidence += 0.2;
            }

            return IntentDecision {
                intent,
                confidence: confidence.clamp(0.1, 1.0),
                used_fallback: true,
                matched_patterns: matched,
            };
        }

        IntentDecision {
            intent: Intent::General,
            confidence: 0.1,
            used_fallback: true,
            matched_patterns: vec![],
        }
    }
}

/// Two-tier classifier: weighted-pattern mode with rule fallback below the
/// confidence threshold. The mode decision is recomputed on every call.
pub struct AdaptiveIntentClassifier {
    weighted: WeightedClassifier,
    rules: RuleClassifier,
    weights: Arc<PatternWeightTable>,
    fallback_threshold: f32,
    reinforcement_step: f32,
}

impl AdaptiveIntentClassifier {
    pub fn new(weights: Arc<PatternWeightTable>, config: &EngineConfig) -> Self {
        Self {
            weighted: WeightedClassifier::new(Arc::clone(&weights), config),
            rules: RuleClassifier,
            weights,
            fallback_threshold: config.fallback_threshold,
            reinforcement_step: config.reinforcement_step,
        }
    }

    /// Classifies one message. Weighted decisions at or above the threshold
    /// reinforce their matched patterns; anything below it is discarded in
    /// favor of the rule backstop.
    pub fn classify(&self, input: &ClassificationInput<'_>) -> IntentDecision {
        let primary = self.weighted.classify(input);

        if primary.confidence < self.fallback_threshold {
            return self.rules.classify(input);
        }

        self.weights.reinforce(
            primary.intent,
            &primary.matched_patterns,
            self.reinforcement_step,
        );

        primary
    }
}

//! Semantic concept matching over a synonym-expanded vocabulary.
//!
//! Maps an analysis result onto weighted concept clusters. Each cluster is a
//! fixed member-term set expanded through a synonym table at construction;
//! scores are match counts normalized by cluster size.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::analysis::AnalysisResult;
use super::text::matches_term;

/// Concept clusters the matcher scores against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concept {
    Education,
    Application,
    Financial,
    Technical,
    Time,
    Location,
}

/// Declaration order doubles as the deterministic tie-break order.
pub const ALL_CONCEPTS: &[Concept] = &[
    Concept::Education,
    Concept::Application,
    Concept::Financial,
    Concept::Technical,
    Concept::Time,
    Concept::Location,
];

impl Concept {
    fn members(&self) -> &'static [&'static str] {
        match self {
            Concept::Education => &[
                "learn",
                "study",
                "education",
                "training",
                "course",
                "program",
                "curriculum",
                "academic",
            ],
            Concept::Application => &[
                "apply", "enroll", "register", "admission", "join", "signup", "form",
            ],
            Concept::Financial => &[
                "cost",
                "fee",
                "price",
                "tuition",
                "payment",
                "scholarship",
                "financial",
                "money",
            ],
            Concept::Technical => &[
                "engineering",
                "technology",
                "technical",
                "mechanical",
                "electrical",
                "welding",
            ],
            Concept::Time => &[
                "when", "schedule", "time", "duration", "start", "end", "semester", "year",
            ],
            Concept::Location => &["where", "location", "address", "campus", "ghana", "accra"],
        }
    }
}

/// Synonym groups; a token matches a cluster member when both sit in the same
/// group, so "enroll" counts toward any cluster containing "apply".
const SYNONYM_GROUPS: &[&[&str]] = &[
    &["program", "course", "curriculum", "study", "training", "education"],
    &["apply", "enroll", "register", "join", "signup", "admission"],
    &["cost", "fee", "price", "tuition", "payment", "expense"],
    &["requirement", "prerequisite", "qualification", "criteria", "condition"],
    &["contact", "reach", "call", "email", "phone", "communicate"],
    &["schedule", "time", "duration", "when", "timing", "calendar"],
];

/// Score of one concept cluster for one message; recomputed per message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptScore {
    pub concept: Concept,
    pub score: f32,
}

struct Cluster {
    concept: Concept,
    /// Members plus every synonym-group expansion of a member.
    expanded: HashSet<&'static str>,
    /// Normalization divisor: the original member count, not the expansion.
    size: usize,
}

/// Concept scorer plus confidence booster.
pub struct SemanticMatcher {
    clusters: Vec<Cluster>,
    boost_cap: f32,
    boost_factor: f32,
}

impl SemanticMatcher {
    pub fn new(boost_cap: f32, boost_factor: f32) -> Self {
        let clusters = ALL_CONCEPTS
            .iter()
            .map(|&concept| {
                let members = concept.members();
                let mut expanded: HashSet<&'static str> = members.iter().copied().collect();
                for member in members {
                    for group in SYNONYM_GROUPS {
                        if group.contains(member) {
                            expanded.extend(group.iter().copied());
                        }
                    }
                }
                Cluster {
                    concept,
                    expanded,
                    size: members.len(),
                }
            })
            .collect();

        Self {
            clusters,
            boost_cap,
            boost_factor,
        }
    }

    /// Scores every cluster against the message's keywords, entities, and raw
    /// tokens. Returns nonzero scores ranked descending; ties keep the
    /// declared concept order.
    pub fn score_concepts(&self, analysis: &AnalysisResult) -> Vec<ConceptScore> {
        let mut candidates: Vec<&str> = analysis
            .keywords
            .iter()
            .map(String::as_str)
            .chain(analysis.entities.all().map(String::as_str))
            .chain(analysis.tokens.iter().map(String::as_str))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let mut scores: Vec<ConceptScore> = self
            .clusters
            .iter()
            .map(|cluster| {
                let matches = candidates
                    .iter()
                    .filter(|candidate| {
                        cluster
                            .expanded
                            .iter()
                            .any(|member| matches_term(candidate, member))
                    })
                    .count();
                ConceptScore {
                    concept: cluster.concept,
                    score: matches as f32 / cluster.size as f32,
                }
            })
            .filter(|cs| cs.score > 0.0)
            .collect();

        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scores
    }

    /// Adds `min(boost_cap, top_score * boost_factor)` to a base confidence,
    /// clamped to [0, 1]. Monotone: never lowers the input.
    pub fn boost(&self, base_confidence: f32, concepts: &[ConceptScore]) -> f32 {
        let top = concepts.first().map(|cs| cs.score).unwrap_or(0.0);
        let bonus = (top * self.boost_factor).min(self.boost_cap);
        (base_confidence + bonus).clamp(0.0, 1.0)
    }
}

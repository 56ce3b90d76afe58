//! Institution knowledge sections with keyword-overlap relevance ranking.
//!
//! Content arrives from the external scraping/caching collaborator as plain
//! text sections; this store only ranks them against a message's tokens. An
//! empty store is fine, the response templates stand on their own.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::info;

/// Tokens this short carry no relevance signal and are skipped when scoring.
const MIN_SCORING_TOKEN_LENGTH: usize = 4;

/// Shared section store: name → plain-text content.
#[derive(Default)]
pub struct KnowledgeStore {
    sections: RwLock<HashMap<String, String>>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sections(sections: HashMap<String, String>) -> Self {
        Self {
            sections: RwLock::new(sections),
        }
    }

    /// Swaps in a freshly refreshed content set.
    pub fn replace_sections(&self, sections: HashMap<String, String>) {
        let mut guard = self.sections.write().expect("knowledge lock poisoned");
        info!("Knowledge refreshed: {} sections", sections.len());
        *guard = sections;
    }

    /// Ranks sections by summed occurrence counts of the message tokens,
    /// descending; equal scores fall back to section-name order so results
    /// are stable across calls. Returns up to `limit` section contents.
    pub fn find_relevant(&self, tokens: &[String], limit: usize) -> Vec<String> {
        let sections = self.sections.read().expect("knowledge lock poisoned");

        let mut scored: Vec<(usize, &String, &String)> = sections
            .iter()
            .map(|(name, content)| {
                let content_lower = content.to_lowercase();
                let score: usize = tokens
                    .iter()
                    .filter(|token| token.len() >= MIN_SCORING_TOKEN_LENGTH)
                    .map(|token| content_lower.matches(token.as_str()).count())
                    .sum();
                (score, name, content)
            })
            .filter(|(score, _, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, _, content)| content.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sections.read().expect("knowledge lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::text::tokenize;

    fn seeded() -> KnowledgeStore {
        let mut sections = HashMap::new();
        sections.insert(
            "programs".to_string(),
            "MPTI offers mechanical and electrical engineering programs.".to_string(),
        );
        sections.insert(
            "admissions".to_string(),
            "Admission applications are accepted year-round. Apply online.".to_string(),
        );
        sections.insert(
            "tact".to_string(),
            "The TACT program provides technical advancement and certification training. \
             TACT enrollment is open."
                .to_string(),
        );
        KnowledgeStore::with_sections(sections)
    }

    #[test]
    fn test_ranks_by_occurrence_count() {
        let store = seeded();

        let results = store.find_relevant(&tokenize("Tell me about TACT"), 2);
        assert_eq!(results.len(), 1);
        assert!(results[0].contains("TACT program"));
    }

    #[test]
    fn test_no_match_returns_empty() {
        let store = seeded();
        assert!(store.find_relevant(&tokenize("zzz qqq"), 2).is_empty());
    }

    #[test]
    fn test_short_tokens_ignored() {
        let store = seeded();
        // "and" appears in content but is too short to score
        assert!(store.find_relevant(&tokenize("and the for"), 2).is_empty());
    }

    #[test]
    fn test_replace_sections() {
        let store = seeded();
        assert_eq!(store.len(), 3);

        store.replace_sections(HashMap::new());
        assert!(store.is_empty());
    }

    #[test]
    fn test_limit_respected() {
        let store = seeded();
        let results = store.find_relevant(&tokenize("engineering admission programs"), 1);
        assert_eq!(results.len(), 1);
    }
}

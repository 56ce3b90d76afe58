//! Chat engine - per-turn orchestration of the understanding pipeline.
//!
//! Control flow per turn: feature extraction, concept scoring, adaptive
//! classification against the session context, response composition, then
//! turn recording and metrics. The engine is `Send + Sync`; share it with an
//! `Arc` across request workers. Session expiry runs on a detached task and
//! never touches the request path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::brain::analysis::AnalysisResult;
use crate::brain::classifier::{AdaptiveIntentClassifier, ClassificationInput};
use crate::brain::extractor::FeatureExtractor;
use crate::brain::semantic::SemanticMatcher;
use crate::brain::weights::PatternWeightTable;
use crate::config::EngineConfig;
use crate::error::AppError;
use crate::knowledge::KnowledgeStore;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::response::{GenerationInput, ResponseGenerator};
use crate::session::{SessionStore, Turn};

/// One chat turn's input, already validated and bounded upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

/// One chat turn's output.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub intent: String,
    pub confidence: f32,
    pub session_id: String,
    pub suggestions: Vec<String>,
    #[serde(rename = "nlp_analysis")]
    pub analysis: AnalysisResult,
    pub used_fallback: bool,
}

/// The assembled understanding pipeline.
pub struct ChatEngine {
    extractor: FeatureExtractor,
    semantic: SemanticMatcher,
    classifier: AdaptiveIntentClassifier,
    generator: ResponseGenerator,
    weights: Arc<PatternWeightTable>,
    sessions: Arc<SessionStore>,
    knowledge: Arc<KnowledgeStore>,
    metrics: Arc<EngineMetrics>,
    autosave_every: u64,
}

impl ChatEngine {
    /// Builds the engine, loading persisted weights when present.
    pub fn new(config: EngineConfig) -> Self {
        let weights = Arc::new(PatternWeightTable::load_or_default(
            &config.weights_path,
            config.weight_cap,
        ));

        Self {
            extractor: FeatureExtractor::new(),
            semantic: SemanticMatcher::new(config.boost_cap, config.boost_factor),
            classifier: AdaptiveIntentClassifier::new(Arc::clone(&weights), &config),
            generator: ResponseGenerator::new(config.max_suggestions),
            weights,
            sessions: Arc::new(SessionStore::new(&config)),
            knowledge: Arc::new(KnowledgeStore::new()),
            metrics: Arc::new(EngineMetrics::new()),
            autosave_every: config.autosave_every.max(1),
        }
    }

    /// Processes one turn. Never fails on well-formed text: low confidence
    /// transitions to the rule fallback and persistence problems downgrade
    /// to warnings.
    pub fn process(&self, request: ChatRequest) -> ChatResponse {
        let analysis = self.extractor.extract(&request.message);
        let concepts = self.semantic.score_concepts(&analysis);

        let session_id = self.sessions.get_or_create(request.session_id.as_deref());
        let view = self.sessions.context_view(&session_id);

        let mut decision = self.classifier.classify(&ClassificationInput {
            analysis: &analysis,
            concepts: &concepts,
            recent_intents: &view.recent_intents,
        });
        if !decision.used_fallback {
            decision.confidence = self.semantic.boost(decision.confidence, &concepts);
        }

        let relevant = self.knowledge.find_relevant(&analysis.tokens, 2);
        let (reply, suggestions) = self.generator.generate(&GenerationInput {
            intent: decision.intent,
            confidence: decision.confidence,
            analysis: &analysis,
            concepts: &concepts,
            view: &view,
            knowledge: &relevant,
        });

        self.sessions.record_turn(
            &session_id,
            Turn {
                message_text: request.message,
                analysis: analysis.clone(),
                intent: decision.intent,
                confidence: decision.confidence,
                suggestions: suggestions.clone(),
                timestamp: Utc::now(),
            },
        );

        let total = self
            .metrics
            .record_classification(decision.confidence, decision.used_fallback);
        if !decision.used_fallback && total % self.autosave_every == 0 {
            if let Err(e) = self.save_weights() {
                warn!("Weight autosave failed (will retry on next trigger): {}", e);
            }
        }

        debug!(
            intent = decision.intent.label(),
            confidence = decision.confidence,
            fallback = decision.used_fallback,
            session = %session_id,
            "Turn processed"
        );

        ChatResponse {
            reply,
            intent: decision.intent.label().to_string(),
            confidence: decision.confidence,
            session_id,
            suggestions,
            analysis,
            used_fallback: decision.used_fallback,
        }
    }

    /// Persists the weight table now. Exposed for the external save endpoint.
    pub fn save_weights(&self) -> Result<(), AppError> {
        self.weights.save()
    }

    /// Swaps in refreshed knowledge sections from the content collaborator.
    pub fn update_knowledge(&self, sections: HashMap<String, String>) {
        self.knowledge.replace_sections(sections);
    }

    /// Read-only counters for the monitoring boundary.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.sessions.active_sessions())
    }

    /// Spawns the detached session sweeper. The handle may be dropped; the
    /// task runs until the runtime shuts down.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = sessions.sweep_expired();
                if removed > 0 {
                    info!("Session sweep evicted {} expired sessions", removed);
                }
            }
        })
    }

    /// Shared handle to the session store, for tests and host wiring.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }
}

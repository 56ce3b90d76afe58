//! Engine configuration.
//!
//! Every tuning constant of the understanding pipeline lives here as data,
//! so the classifier and generator stay table-driven and testable with a
//! substituted configuration. Defaults match production behavior; a handful
//! of operational knobs can be overridden from the environment.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

/// Configuration for the chat engine and its pipeline components.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Winning confidence below this value triggers the rule-based fallback.
    pub fallback_threshold: f32,
    /// Raw-score bonus for intents related to a recently seen intent.
    pub context_boost: f32,
    /// Raw-score bonus when the intent's concept cluster scores high enough.
    pub semantic_boost: f32,
    /// Minimum concept score required for the semantic raw-score bonus.
    pub semantic_boost_threshold: f32,
    /// Raw-score bonus when the whole message equals a pattern verbatim.
    pub exact_match_bonus: f32,
    /// Saturation constant for `score / (score + k)` confidence normalization.
    pub confidence_k: f32,
    /// Upper bound on the post-classification semantic confidence boost.
    pub boost_cap: f32,
    /// Multiplier applied to the top concept score for the confidence boost.
    pub boost_factor: f32,
    /// Weight increment applied to matched patterns of a winning intent.
    pub reinforcement_step: f32,
    /// Upper bound on any learned pattern weight.
    pub weight_cap: f32,
    /// Maximum turns retained per session (FIFO eviction).
    pub max_history: usize,
    /// Size of the recent-intent window used for context boosting.
    pub recent_intent_window: usize,
    /// Maximum follow-up suggestions surfaced with a reply.
    pub max_suggestions: usize,
    /// Sessions idle longer than this are evicted by the sweeper.
    pub session_ttl: Duration,
    /// Cadence of the background session sweep task.
    pub sweep_interval: Duration,
    /// Autosave the weight table every N weighted classifications.
    pub autosave_every: u64,
    /// Location of the persisted pattern-weight table.
    pub weights_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: 0.3,
            context_boost: 0.5,
            semantic_boost: 0.3,
            semantic_boost_threshold: 0.1,
            exact_match_bonus: 2.0,
            confidence_k: 2.0,
            boost_cap: 0.2,
            boost_factor: 0.5,
            reinforcement_step: 0.1,
            weight_cap: 3.0,
            max_history: 10,
            recent_intent_window: 3,
            max_suggestions: 3,
            session_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            autosave_every: 25,
            weights_path: PathBuf::from("intent_weights.json"),
        }
    }
}

impl EngineConfig {
    /// Builds a configuration from environment variables, falling back to
    /// defaults for anything absent or unparseable. Unparseable values are
    /// logged and ignored rather than treated as fatal.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("MPTI_WEIGHTS_PATH") {
            if !path.trim().is_empty() {
                config.weights_path = PathBuf::from(path);
            }
        }
        if let Some(secs) = read_env_u64("MPTI_SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_u64("MPTI_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(every) = read_env_u64("MPTI_AUTOSAVE_EVERY") {
            config.autosave_every = every.max(1);
        }

        config
    }
}

fn read_env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}: {:?}", name, raw);
            None
        }
    }
}

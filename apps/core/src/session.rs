//! Bounded, expiring per-session conversation memory.
//!
//! Sessions are keyed by id in a shared map. Every turn mutates exactly one
//! session record under the store's write lock; expiry runs on a schedule
//! decoupled from request handling (see `ChatEngine::spawn_sweeper`).

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brain::analysis::AnalysisResult;
use crate::brain::classifier::Intent;
use crate::config::EngineConfig;

/// Durable facts accumulated over a session, consumed by the generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextFlags {
    /// Program entities the user has mentioned so far.
    pub explored_programs: BTreeSet<String>,
    /// Set once an application intent is recorded; never cleared.
    pub considering_application: bool,
}

/// One completed exchange. Immutable once appended to the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub message_text: String,
    pub analysis: AnalysisResult,
    pub intent: Intent,
    pub confidence: f32,
    /// Follow-up suggestions surfaced with the reply, kept so later turns
    /// never repeat one within the same session.
    pub suggestions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Per-session conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub history: VecDeque<Turn>,
    pub recent_intents: VecDeque<Intent>,
    pub context_flags: ContextFlags,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_active_at: now,
            history: VecDeque::new(),
            recent_intents: VecDeque::new(),
            context_flags: ContextFlags::default(),
        }
    }
}

/// Cloned classifier/generator inputs for one session, taken under a single
/// read lock so the turn pipeline never holds the store open.
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    pub recent_intents: Vec<Intent>,
    pub context_flags: ContextFlags,
    pub shown_suggestions: Vec<String>,
}

/// Shared session store with TTL eviction.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    max_history: usize,
    recent_window: usize,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history: config.max_history,
            recent_window: config.recent_intent_window,
            ttl: config.session_ttl,
        }
    }

    /// Returns the id of an existing session, or creates a fresh session with
    /// a generated id when the given id is absent or unknown. Creation is the
    /// only mutation here; a known session is untouched until a turn lands.
    pub fn get_or_create(&self, session_id: Option<&str>) -> String {
        if let Some(id) = session_id {
            let sessions = self.sessions.read().expect("session lock poisoned");
            if sessions.contains_key(id) {
                return id.to_string();
            }
        }

        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        sessions.insert(id.clone(), Session::new(id.clone()));
        id
    }

    /// Snapshot of the inputs the classifier and generator need.
    /// An unknown id yields an empty view rather than an error.
    pub fn context_view(&self, session_id: &str) -> SessionView {
        let sessions = self.sessions.read().expect("session lock poisoned");
        let Some(session) = sessions.get(session_id) else {
            return SessionView::default();
        };

        SessionView {
            recent_intents: session.recent_intents.iter().copied().collect(),
            context_flags: session.context_flags.clone(),
            shown_suggestions: session
                .history
                .iter()
                .flat_map(|turn| turn.suggestions.iter().cloned())
                .collect(),
        }
    }

    /// Appends a turn: bounded history and recent-intent window, context-flag
    /// accumulation, and the activity refresh that feeds TTL eviction.
    pub fn record_turn(&self, session_id: &str, turn: Turn) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id.to_string()));

        for program in &turn.analysis.entities.programs {
            session.context_flags.explored_programs.insert(program.clone());
        }
        if turn.intent == Intent::Application {
            session.context_flags.considering_application = true;
        }

        session.recent_intents.push_back(turn.intent);
        while session.recent_intents.len() > self.recent_window {
            session.recent_intents.pop_front();
        }

        session.history.push_back(turn);
        while session.history.len() > self.max_history {
            session.history.pop_front();
        }

        session.last_active_at = Utc::now();
    }

    /// Removes sessions idle past the TTL. Returns the eviction count.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    pub(crate) fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        let before = sessions.len();
        sessions.retain(|_, session| {
            (now - session.last_active_at)
                .to_std()
                .map(|idle| idle <= self.ttl)
                .unwrap_or(true)
        });
        before - sessions.len()
    }

    /// Number of live sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions.read().expect("session lock poisoned").len()
    }

    #[cfg(test)]
    pub(crate) fn set_last_active(&self, session_id: &str, at: DateTime<Utc>) {
        let mut sessions = self.sessions.write().expect("session lock poisoned");
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_active_at = at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::analysis::AnalysisResult;
    use chrono::Duration as ChronoDuration;

    fn store() -> SessionStore {
        SessionStore::new(&EngineConfig::default())
    }

    fn turn(intent: Intent) -> Turn {
        Turn {
            message_text: "test".to_string(),
            analysis: AnalysisResult::empty(),
            intent,
            confidence: 0.5,
            suggestions: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_unknown_id_creates_new_session() {
        let store = store();

        let id = store.get_or_create(Some("never-seen"));
        assert_ne!(id, "never-seen");
        assert_eq!(store.active_sessions(), 1);
    }

    #[test]
    fn test_known_id_is_reused() {
        let store = store();

        let id = store.get_or_create(None);
        let again = store.get_or_create(Some(&id));
        assert_eq!(id, again);
        assert_eq!(store.active_sessions(), 1);
    }

    #[test]
    fn test_history_fifo_eviction_at_capacity() {
        let store = store();
        let id = store.get_or_create(None);

        for _ in 0..15 {
            store.record_turn(&id, turn(Intent::Programs));
        }

        let sessions = store.sessions.read().expect("lock");
        let session = sessions.get(&id).expect("session exists");
        assert_eq!(session.history.len(), 10);
    }

    #[test]
    fn test_recent_intents_window() {
        let store = store();
        let id = store.get_or_create(None);

        store.record_turn(&id, turn(Intent::Greeting));
        store.record_turn(&id, turn(Intent::Programs));
        store.record_turn(&id, turn(Intent::Fees));
        store.record_turn(&id, turn(Intent::Schedule));

        let view = store.context_view(&id);
        assert_eq!(
            view.recent_intents,
            vec![Intent::Programs, Intent::Fees, Intent::Schedule]
        );
    }

    #[test]
    fn test_considering_application_is_sticky() {
        let store = store();
        let id = store.get_or_create(None);

        store.record_turn(&id, turn(Intent::Application));
        store.record_turn(&id, turn(Intent::Greeting));

        let view = store.context_view(&id);
        assert!(view.context_flags.considering_application);
    }

    #[test]
    fn test_explored_programs_accumulate() {
        let store = store();
        let id = store.get_or_create(None);

        let mut t = turn(Intent::Programs);
        t.analysis.entities.programs = vec!["tact".to_string(), "welding".to_string()];
        store.record_turn(&id, t);

        let view = store.context_view(&id);
        assert!(view.context_flags.explored_programs.contains("tact"));
        assert!(view.context_flags.explored_programs.contains("welding"));
    }

    #[test]
    fn test_sweep_respects_ttl_boundary() {
        let store = store();
        let stale = store.get_or_create(None);
        let fresh = store.get_or_create(None);
        let now = Utc::now();

        store.set_last_active(&stale, now - ChronoDuration::minutes(31));
        store.set_last_active(&fresh, now - ChronoDuration::minutes(29));

        let removed = store.sweep_expired_at(now);
        assert_eq!(removed, 1);
        assert_eq!(store.active_sessions(), 1);
        assert_eq!(store.get_or_create(Some(&fresh)), fresh);
    }

    #[test]
    fn test_context_view_for_unknown_session_is_empty() {
        let view = store().context_view("missing");
        assert!(view.recent_intents.is_empty());
        assert!(view.shown_suggestions.is_empty());
    }
}

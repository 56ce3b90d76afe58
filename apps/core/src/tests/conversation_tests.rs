//! Conversation Memory Tests
//!
//! Session lifecycle: bounded history, recent-intent windows, sticky context
//! flags, and TTL eviction at the 30-minute boundary.

use chrono::{Duration as ChronoDuration, Utc};

use crate::brain::analysis::AnalysisResult;
use crate::brain::classifier::Intent;
use crate::config::EngineConfig;
use crate::session::{SessionStore, Turn};

fn store() -> SessionStore {
    SessionStore::new(&EngineConfig::default())
}

fn turn(intent: Intent, suggestions: &[&str]) -> Turn {
    Turn {
        message_text: "test message".to_string(),
        analysis: AnalysisResult::empty(),
        intent,
        confidence: 0.5,
        suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
        timestamp: Utc::now(),
    }
}

#[test]
fn test_session_eviction_at_ttl_boundary() {
    let store = store();
    let expired = store.get_or_create(None);
    let alive = store.get_or_create(None);
    let now = Utc::now();

    store.set_last_active(&expired, now - ChronoDuration::minutes(31));
    store.set_last_active(&alive, now - ChronoDuration::minutes(29));

    store.sweep_expired_at(now);

    // The 31-minute session is gone; asking for it again creates a new id
    assert_ne!(store.get_or_create(Some(&expired)), expired);
    assert_eq!(store.get_or_create(Some(&alive)), alive);
}

#[test]
fn test_turn_recording_refreshes_activity() {
    let store = store();
    let id = store.get_or_create(None);
    let now = Utc::now();

    store.set_last_active(&id, now - ChronoDuration::minutes(31));
    store.record_turn(&id, turn(Intent::Programs, &[]));

    assert_eq!(store.sweep_expired_at(now), 0);
}

#[test]
fn test_shown_suggestions_accumulate_across_turns() {
    let store = store();
    let id = store.get_or_create(None);

    store.record_turn(&id, turn(Intent::Programs, &["suggestion one"]));
    store.record_turn(&id, turn(Intent::Fees, &["suggestion two"]));

    let view = store.context_view(&id);
    assert_eq!(
        view.shown_suggestions,
        vec!["suggestion one".to_string(), "suggestion two".to_string()]
    );
}

#[test]
fn test_history_capacity_and_intent_window() {
    let store = store();
    let id = store.get_or_create(None);

    for i in 0..12 {
        let intent = if i % 2 == 0 {
            Intent::Programs
        } else {
            Intent::Fees
        };
        store.record_turn(&id, turn(intent, &[]));
    }

    let view = store.context_view(&id);
    assert_eq!(view.recent_intents.len(), 3);
    // 12 turns recorded but only 10 kept, each carrying no suggestions
    assert!(view.shown_suggestions.is_empty());
}

#[test]
fn test_application_intent_sets_sticky_flag() {
    let store = store();
    let id = store.get_or_create(None);

    store.record_turn(&id, turn(Intent::Application, &[]));
    store.record_turn(&id, turn(Intent::Schedule, &[]));
    store.record_turn(&id, turn(Intent::Greeting, &[]));

    assert!(store.context_view(&id).context_flags.considering_application);
}

#[test]
fn test_program_entities_feed_explored_programs() {
    let store = store();
    let id = store.get_or_create(None);

    let mut t = turn(Intent::Programs, &[]);
    t.analysis.entities.programs = vec!["mechanical".to_string()];
    store.record_turn(&id, t);

    let mut t = turn(Intent::TactProgram, &[]);
    t.analysis.entities.programs = vec!["tact".to_string()];
    store.record_turn(&id, t);

    let flags = store.context_view(&id).context_flags;
    assert!(flags.explored_programs.contains("mechanical"));
    assert!(flags.explored_programs.contains("tact"));
}

#[test]
fn test_sessions_are_isolated() {
    let store = store();
    let a = store.get_or_create(None);
    let b = store.get_or_create(None);

    store.record_turn(&a, turn(Intent::Application, &["only for a"]));

    let view_b = store.context_view(&b);
    assert!(!view_b.context_flags.considering_application);
    assert!(view_b.shown_suggestions.is_empty());
}

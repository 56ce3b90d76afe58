//! Engine Integration Tests
//!
//! Full end-to-end turn scenarios through `ChatEngine::process`, plus weight
//! persistence, knowledge enrichment, and metrics counters.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::engine::{ChatEngine, ChatRequest};

fn engine_with_tempdir() -> (ChatEngine, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = EngineConfig::default();
    config.weights_path = dir.path().join("intent_weights.json");
    (ChatEngine::new(config), dir)
}

fn request(message: &str, session_id: Option<&str>) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        session_id: session_id.map(|s| s.to_string()),
    }
}

#[test]
fn test_hello_turn_without_session() {
    let (engine, _dir) = engine_with_tempdir();

    let response = engine.process(request("Hello", None));

    assert_eq!(response.intent, "greeting");
    assert!(response.suggestions.is_empty());
    assert!(!response.session_id.is_empty());
    assert!(response.reply.contains("Welcome to MPTI"));
}

#[test]
fn test_urgent_tact_turn() {
    let (engine, _dir) = engine_with_tempdir();

    let response = engine.process(request("I urgently need information about TACT program", None));

    assert!(response.analysis.intent_signals.urgency);
    assert!(response
        .analysis
        .entities
        .programs
        .contains(&"tact".to_string()));
    assert!(response.reply.contains("Immediate Assistance"));
}

#[test]
fn test_follow_up_turn_gets_context_boost() {
    let (engine, _dir) = engine_with_tempdir();

    // Fresh session baseline for the second message
    let fresh = engine.process(request("What are the requirements?", None));

    let first = engine.process(request("Tell me about TACT program", None));
    assert_eq!(first.intent, "tact_program");

    let follow_up = engine.process(request(
        "What are the requirements?",
        Some(&first.session_id),
    ));

    assert_eq!(follow_up.intent, "requirements");
    assert_eq!(follow_up.session_id, first.session_id);
    assert!(follow_up.confidence > fresh.confidence);
}

#[test]
fn test_unmatched_message_reports_fallback() {
    let (engine, _dir) = engine_with_tempdir();

    let response = engine.process(request("zxcvbnm qwertyuiop", None));

    assert!(response.used_fallback);
    assert_eq!(response.intent, "general");
    assert!(!response.reply.is_empty());
}

#[test]
fn test_unknown_session_id_creates_new_session() {
    let (engine, _dir) = engine_with_tempdir();

    let response = engine.process(request("Hello", Some("no-such-session")));
    assert_ne!(response.session_id, "no-such-session");
}

#[test]
fn test_suggestions_not_repeated_within_session() {
    let (engine, _dir) = engine_with_tempdir();

    let first = engine.process(request("What programs do you offer?", None));
    let second = engine.process(request(
        "Tell me about your programs",
        Some(&first.session_id),
    ));

    for suggestion in &second.suggestions {
        assert!(
            !first.suggestions.contains(suggestion),
            "repeated suggestion: {:?}",
            suggestion
        );
    }
}

#[test]
fn test_save_weights_persists_learning() {
    let (engine, dir) = engine_with_tempdir();

    let response = engine.process(request("Tell me about the TACT program", None));
    assert!(!response.used_fallback);

    engine.save_weights().expect("save should succeed");
    assert!(dir.path().join("intent_weights.json").exists());

    // A new engine picks the reinforced weights back up
    let mut config = EngineConfig::default();
    config.weights_path = dir.path().join("intent_weights.json");
    let reloaded = ChatEngine::new(config);
    let again = reloaded.process(request("Tell me about the TACT program", None));
    assert!(again.confidence >= response.confidence);
}

#[test]
fn test_metrics_counters() {
    let (engine, _dir) = engine_with_tempdir();

    engine.process(request("Hello", None));
    engine.process(request("zxcvbnm qwertyuiop", None));

    let metrics = engine.metrics();
    assert_eq!(metrics.classifications, 2);
    assert_eq!(metrics.fallbacks, 1);
    assert!(metrics.average_confidence > 0.0);
    assert_eq!(metrics.active_sessions, 2);
}

#[test]
fn test_knowledge_content_enriches_reply() {
    let (engine, _dir) = engine_with_tempdir();

    let mut sections = HashMap::new();
    sections.insert(
        "tact".to_string(),
        "TACT graduates receive an industry-recognized certification badge.".to_string(),
    );
    engine.update_knowledge(sections);

    let response = engine.process(request("Tell me about the TACT program", None));
    assert!(response.reply.contains("certification badge"));
}

#[test]
fn test_empty_message_still_yields_reply() {
    let (engine, _dir) = engine_with_tempdir();

    let response = engine.process(request("", None));

    assert!(response.used_fallback);
    assert!(!response.reply.is_empty());
    assert!(response.analysis.keywords.is_empty());
}

#[tokio::test]
async fn test_sweeper_task_runs_detached() {
    let (engine, _dir) = engine_with_tempdir();

    let handle = engine.spawn_sweeper(std::time::Duration::from_millis(10));
    engine.process(request("Hello", None));
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    // Fresh sessions survive the sweep; the task itself keeps running
    assert_eq!(engine.metrics().active_sessions, 1);
    assert!(!handle.is_finished());
    handle.abort();
}

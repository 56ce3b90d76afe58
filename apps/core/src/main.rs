// MPTI Assistant Backend Entry Point
// "The Brain" - intent & context understanding behind the chat API

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mpti_core::config::EngineConfig;
use mpti_core::engine::{ChatEngine, ChatRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::from_env();
    let sweep_interval = config.sweep_interval;
    let engine = Arc::new(ChatEngine::new(config));
    engine.spawn_sweeper(sweep_interval);

    info!("MPTI Assistant brain ready");
    println!("MPTI Assistant console. Type a message, /metrics, /save, or /quit.");

    let stdin = std::io::stdin();
    let mut session_id: Option<String> = None;
    let mut line = String::new();

    loop {
        print!("> ");
        std::io::stdout().flush().context("flush stdout")?;

        line.clear();
        if stdin.read_line(&mut line).context("read stdin")? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        match message {
            "/quit" | "/exit" => break,
            "/metrics" => {
                let snapshot = engine.metrics();
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                continue;
            }
            "/save" => {
                match engine.save_weights() {
                    Ok(()) => println!("Weights saved."),
                    Err(e) => println!("Weight save failed: {}", e),
                }
                continue;
            }
            _ => {}
        }

        let response = engine.process(ChatRequest {
            message: message.to_string(),
            session_id: session_id.clone(),
        });
        session_id = Some(response.session_id.clone());

        println!(
            "\n[{} @ {:.0}%{}]",
            response.intent,
            response.confidence * 100.0,
            if response.used_fallback { ", fallback" } else { "" }
        );
        println!("{}\n", response.reply);
        for suggestion in &response.suggestions {
            println!("  ? {}", suggestion);
        }
    }

    if let Err(e) = engine.save_weights() {
        info!("Final weight save failed: {}", e);
    }
    Ok(())
}

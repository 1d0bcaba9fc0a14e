//! Application entry point — console voice assistant.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run); fall back
//!    to the `GEMINI_API_KEY` environment variable for the credential.
//! 3. Load the persisted mode and integration registries.
//! 4. Build the Gemini inference gateway — only when a credential exists.
//! 5. Build the console capture/output gateways.
//! 6. Run the command loop until `quit` / EOF.
//!
//! In this front-end one typed line stands in for one recognized utterance:
//! `talk` puts the engine into its listening state and the next line you
//! type is captured, processed and answered.

use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use voice_assistant::config::AppConfig;
use voice_assistant::engine::{
    new_shared_state, AppState, InteractionState, ToggleOutcome, TurnOrchestrator,
};
use voice_assistant::gateway::{
    CaptureGateway, ConsoleCapture, ConsoleOutput, GeminiClient, InferenceGateway, OutputGateway,
};
use voice_assistant::integrations::{ApiIntegration, IntegrationRegistry, ToolServerLink};
use voice_assistant::modes::ModeRegistry;

const HELP: &str = "\
commands:
  talk                      capture one utterance (type it on the next line)
  mode <id>                 switch mode
  modes                     list built-in and custom modes
  new-mode <description>    synthesize and install a custom mode
  remove-mode <id>          delete a custom mode
  transcript                print the conversation so far
  suggestions               print analyzer suggestions
  clear-suggestions         drop all analyzer suggestions
  integrations              list integration records
  add-server <name> <url>   add a tool server link
  add-api <name> <url> <key>  add an API integration
  remove-server <id>        delete a tool server link
  remove-api <id>           delete an API integration
  toggle-server <id>        flip a tool server's enabled flag
  toggle-api <id>           flip an API integration's enabled flag
  status                    show engine state and current mode
  quit";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // ── Config + credential ─────────────────────────────────────────────
    let mut config = AppConfig::load()?;
    if config.inference.credential().is_none() {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                config.inference.api_key = Some(key);
            }
        }
    }

    // ── Registries + shared state ───────────────────────────────────────
    let modes = ModeRegistry::load_or_default();
    let integrations = IntegrationRegistry::load_or_default();
    let state = new_shared_state(AppState::new(modes, integrations));

    // ── Gateways ────────────────────────────────────────────────────────
    let inference: Option<Arc<dyn InferenceGateway>> = GeminiClient::from_config(&config.inference)
        .map(|client| Arc::new(client) as Arc<dyn InferenceGateway>);
    let capture: Arc<dyn CaptureGateway> = Arc::new(ConsoleCapture::new());
    let output: Arc<dyn OutputGateway> = Arc::new(ConsoleOutput::new(config.speech.clone()));

    let orchestrator = Arc::new(TurnOrchestrator::new(state, inference, capture, output));

    if !orchestrator.is_configured() {
        println!("no API key configured — set GEMINI_API_KEY or add it to settings.toml");
    }
    println!("voice assistant ready; `help` lists commands");

    // ── Command loop ────────────────────────────────────────────────────
    loop {
        print_prompt(&orchestrator);
        let Some(line) = read_line().await? else {
            break; // EOF
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "talk" | "t" => run_toggle(&orchestrator).await,
            "mode" => {
                if rest.is_empty() {
                    println!("usage: mode <id>");
                } else {
                    orchestrator.set_mode(rest);
                }
            }
            "modes" => print_modes(&orchestrator),
            "new-mode" => {
                if rest.is_empty() {
                    println!("usage: new-mode <description>");
                } else {
                    match orchestrator.create_mode(rest).await {
                        Some(mode) => println!("created mode {:?} ({})", mode.name, mode.id),
                        None => println!("no mode produced — try rephrasing the description"),
                    }
                }
            }
            "remove-mode" => {
                let state = orchestrator.shared_state();
                let removed = state.lock().unwrap().modes.remove(rest);
                println!("{}", if removed { "removed" } else { "no such custom mode" });
            }
            "transcript" => print_transcript(&orchestrator),
            "suggestions" => print_suggestions(&orchestrator),
            "clear-suggestions" => {
                let state = orchestrator.shared_state();
                state.lock().unwrap().suggestions.clear();
            }
            "integrations" => print_integrations(&orchestrator),
            "add-server" => add_server(&orchestrator, rest),
            "add-api" => add_api(&orchestrator, rest),
            "remove-server" => {
                let state = orchestrator.shared_state();
                let removed = state.lock().unwrap().integrations.remove_tool_server(rest);
                println!("{}", if removed { "removed" } else { "no such tool server" });
            }
            "remove-api" => {
                let state = orchestrator.shared_state();
                let removed = state.lock().unwrap().integrations.remove_api(rest);
                println!("{}", if removed { "removed" } else { "no such integration" });
            }
            "toggle-server" => {
                let state = orchestrator.shared_state();
                state.lock().unwrap().integrations.toggle_tool_server(rest);
            }
            "toggle-api" => {
                let state = orchestrator.shared_state();
                state.lock().unwrap().integrations.toggle_api(rest);
            }
            "status" => {
                let state = orchestrator.shared_state();
                let st = state.lock().unwrap();
                println!("state: {}  mode: {}", st.interaction.label(), st.current_mode);
                if let Some(error) = &st.last_error {
                    println!("last error: {error}");
                }
            }
            other => println!("unknown command {other:?} — `help` lists commands"),
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn run_toggle(orchestrator: &Arc<TurnOrchestrator>) {
    println!("(listening — type your utterance)");
    match orchestrator.toggle().await {
        ToggleOutcome::Completed => {}
        ToggleOutcome::NeedsConfiguration => {
            println!("no API key configured — set GEMINI_API_KEY or add it to settings.toml");
        }
        ToggleOutcome::CaptureUnsupported => println!("speech capture is unavailable"),
        ToggleOutcome::CaptureFailed => println!("capture failed — nothing was recorded"),
        ToggleOutcome::InferenceFailed => println!("(the error reply above was recorded)"),
        ToggleOutcome::Cancelled | ToggleOutcome::StopRequested => println!("stopped"),
        ToggleOutcome::Busy => println!("still finishing the previous turn"),
    }
}

fn print_prompt(orchestrator: &Arc<TurnOrchestrator>) {
    if orchestrator.interaction() == InteractionState::Idle {
        use std::io::Write;
        print!("> ");
        let _ = std::io::stdout().flush();
    }
}

fn print_modes(orchestrator: &Arc<TurnOrchestrator>) {
    let state = orchestrator.shared_state();
    let st = state.lock().unwrap();
    for mode in st.modes.list_builtins() {
        println!("  {:10} {} — {}", mode.id, mode.name, mode.description);
    }
    for mode in st.modes.custom_modes() {
        println!("  {:10} {} — {} (custom)", mode.id, mode.name, mode.description);
    }
}

fn print_transcript(orchestrator: &Arc<TurnOrchestrator>) {
    let state = orchestrator.shared_state();
    let st = state.lock().unwrap();
    for turn in st.transcript.turns() {
        println!("[{}] {}: {}", turn.created_at.format("%H:%M:%S"), turn.role.label(), turn.content);
    }
}

fn print_suggestions(orchestrator: &Arc<TurnOrchestrator>) {
    let state = orchestrator.shared_state();
    let st = state.lock().unwrap();
    if st.suggestions.is_empty() {
        println!("no suggestions yet — they accrue every few turns");
        return;
    }
    for (i, suggestion) in st.suggestions.entries().iter().enumerate() {
        println!("  {}. {}", i + 1, suggestion);
    }
}

fn print_integrations(orchestrator: &Arc<TurnOrchestrator>) {
    let state = orchestrator.shared_state();
    let st = state.lock().unwrap();
    if st.integrations.is_empty() {
        println!("no integrations registered");
        return;
    }
    for server in st.integrations.tool_servers() {
        println!(
            "  [{}] tool server {:12} {} ({})",
            if server.enabled { "on " } else { "off" },
            server.name,
            server.endpoint,
            server.id
        );
    }
    for api in st.integrations.apis() {
        println!(
            "  [{}] api         {:12} {} ({})",
            if api.enabled { "on " } else { "off" },
            api.name,
            api.endpoint,
            api.id
        );
    }
}

fn add_server(orchestrator: &Arc<TurnOrchestrator>, rest: &str) {
    let mut parts = rest.split_whitespace();
    let (Some(name), Some(endpoint)) = (parts.next(), parts.next()) else {
        println!("usage: add-server <name> <url>");
        return;
    };
    let link = ToolServerLink {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        endpoint: endpoint.to_string(),
        credential: None,
        enabled: true,
    };
    let state = orchestrator.shared_state();
    match state.lock().unwrap().integrations.add_tool_server(link) {
        Ok(()) => println!("added"),
        Err(e) => println!("rejected: {e}"),
    };
}

fn add_api(orchestrator: &Arc<TurnOrchestrator>, rest: &str) {
    let mut parts = rest.split_whitespace();
    let (Some(name), Some(endpoint), Some(key)) = (parts.next(), parts.next(), parts.next()) else {
        println!("usage: add-api <name> <url> <key>");
        return;
    };
    let api = ApiIntegration {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        endpoint: endpoint.to_string(),
        credential: key.to_string(),
        enabled: true,
        headers: Default::default(),
    };
    let state = orchestrator.shared_state();
    match state.lock().unwrap().integrations.add_api(api) {
        Ok(()) => println!("added"),
        Err(e) => println!("rejected: {e}"),
    };
}

// ---------------------------------------------------------------------------
// Stdin helper
// ---------------------------------------------------------------------------

/// Read one line from the process-global stdin buffer without stalling the
/// async runtime. Returns `None` on EOF.
async fn read_line() -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        match std::io::stdin().read_line(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf.trim_end().to_string())),
            Err(e) => Err(e),
        }
    })
    .await??;
    Ok(line)
}

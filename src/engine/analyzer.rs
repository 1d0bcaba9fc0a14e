//! Self-improvement analyzer.
//!
//! Every [`ANALYSIS_CADENCE`] transcript turns, the engine asks the inference
//! gateway to review the conversation against the currently registered modes
//! and integrations and propose up to [`MAX_SUGGESTIONS`] improvements as a
//! JSON array of strings. Whatever parses is appended to the suggestion
//! list; everything else — transport failures, malformed replies, missing
//! arrays — is logged and swallowed. The analyzer never raises past its own
//! boundary and never touches the transcript or the interaction state: it
//! reads one snapshot, runs unlocked, and appends its results.

use std::sync::Arc;

use crate::engine::extract::extract_array;
use crate::engine::state::{AppState, SharedState};
use crate::gateway::InferenceGateway;
use crate::transcript::Role;

// ---------------------------------------------------------------------------
// Trigger policy
// ---------------------------------------------------------------------------

/// The analyzer runs when the transcript length is a positive multiple of
/// this constant.
pub const ANALYSIS_CADENCE: usize = 5;

/// Maximum number of suggestions requested per analysis.
pub const MAX_SUGGESTIONS: usize = 5;

/// Whether an analysis is due after the transcript has grown to
/// `turn_count` turns.
pub fn analysis_due(turn_count: usize) -> bool {
    turn_count > 0 && turn_count % ANALYSIS_CADENCE == 0
}

// ---------------------------------------------------------------------------
// AnalysisSnapshot
// ---------------------------------------------------------------------------

/// Everything the analyzer reads, cloned out of [`AppState`] under one short
/// lock so the analysis itself runs without blocking the next cycle.
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    pub conversation: Vec<(Role, String)>,
    /// Current mode name followed by every custom mode name.
    pub mode_names: Vec<String>,
    /// Every integration name, regardless of its `enabled` flag.
    pub integration_names: Vec<String>,
}

impl AnalysisSnapshot {
    /// Snapshot the parts of `state` the analyzer consumes.
    pub fn take(state: &AppState) -> Self {
        Self {
            conversation: state.transcript.conversation(),
            mode_names: state.modes.active_mode_names(&state.current_mode),
            integration_names: state.integrations.all_names(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// Build the single natural-language analysis request.
pub fn build_analysis_prompt(snapshot: &AnalysisSnapshot) -> String {
    let conversation: String = snapshot
        .conversation
        .iter()
        .map(|(role, content)| format!("{}: {}\n", role.label(), content))
        .collect();

    format!(
        "You are an agentic AI system analyzer. Based on this conversation history and \
         current capabilities, suggest specific improvements:\n\n\
         Current Modes: {}\n\
         Current Integrations: {}\n\n\
         Conversation:\n{}\n\
         Analyze the conversation and suggest:\n\
         1. New modes that would be useful\n\
         2. New API integrations or tool servers that could help\n\
         3. UI/UX improvements\n\
         4. New features or capabilities\n\n\
         Return ONLY a JSON array of specific, actionable suggestions (max {}). Format:\n\
         [\"suggestion 1\", \"suggestion 2\", ...]",
        snapshot.mode_names.join(", "),
        snapshot.integration_names.join(", "),
        conversation,
        MAX_SUGGESTIONS,
    )
}

/// Parse the suggestion array out of a model reply.
///
/// Returns an empty vec when no well-formed array of strings is present.
fn parse_suggestions(reply: &str) -> Vec<String> {
    let Some(value) = extract_array(reply) else {
        log::warn!("analyzer: reply contained no parseable array");
        return Vec::new();
    };
    match serde_json::from_value::<Vec<String>>(value) {
        Ok(suggestions) => suggestions,
        Err(e) => {
            log::warn!("analyzer: array was not a list of strings: {e}");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// SelfImprovementAnalyzer
// ---------------------------------------------------------------------------

/// Periodic best-effort conversation analysis.
///
/// Dispatched by the orchestrator's post-append hook as an independent task;
/// see [`run`](Self::run).
pub struct SelfImprovementAnalyzer {
    state: SharedState,
    gateway: Arc<dyn InferenceGateway>,
}

impl SelfImprovementAnalyzer {
    pub fn new(state: SharedState, gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { state, gateway }
    }

    /// Run one analysis round: snapshot, generate, append suggestions.
    ///
    /// Never fails; every error path resolves to "no suggestions this round".
    pub async fn run(&self) {
        let snapshot = {
            let state = self.state.lock().unwrap();
            AnalysisSnapshot::take(&state)
        };

        let suggestions = self.analyze(&snapshot).await;
        if suggestions.is_empty() {
            return;
        }

        log::info!("analyzer: {} suggestion(s) produced", suggestions.len());
        let mut state = self.state.lock().unwrap();
        for suggestion in suggestions {
            state.suggestions.push(suggestion);
        }
    }

    /// Produce suggestions for a snapshot. Public for direct use by callers
    /// that manage their own state (and for tests).
    pub async fn analyze(&self, snapshot: &AnalysisSnapshot) -> Vec<String> {
        let prompt = build_analysis_prompt(snapshot);

        match self.gateway.generate(&prompt, None).await {
            Ok(reply) => parse_suggestions(&reply),
            Err(e) => {
                log::warn!("analyzer: inference failed: {e}");
                Vec::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::state::new_shared_state;
    use crate::gateway::inference::MockInference;
    use crate::integrations::{IntegrationRegistry, ToolServerLink};
    use crate::modes::{CustomMode, ModeRegistry};

    // ---- trigger policy ---

    #[test]
    fn analysis_is_due_only_on_positive_multiples_of_five() {
        assert!(!analysis_due(0));
        assert!(!analysis_due(1));
        assert!(!analysis_due(4));
        assert!(analysis_due(5));
        assert!(!analysis_due(6));
        assert!(analysis_due(10));
        assert!(analysis_due(15));
    }

    /// Checking after every append means the number of firings over N turns
    /// is floor(N / 5).
    #[test]
    fn firings_over_n_appends_is_floor_n_over_five() {
        let firings = |n: usize| (1..=n).filter(|&len| analysis_due(len)).count();
        assert_eq!(firings(4), 0);
        assert_eq!(firings(5), 1);
        assert_eq!(firings(12), 2); // at 5 and 10
        assert_eq!(firings(25), 5);
    }

    // ---- snapshot ---

    fn populated_state() -> AppState {
        let mut modes = ModeRegistry::new();
        modes
            .add_custom(CustomMode {
                id: "custom-1".into(),
                name: "Chef".into(),
                description: "cooking".into(),
                system_prompt: "you cook".into(),
                color: "#ff0000".into(),
                icon: "Heart".into(),
            })
            .unwrap();

        let mut integrations = IntegrationRegistry::new();
        integrations
            .add_tool_server(ToolServerLink {
                id: "s1".into(),
                name: "recipe-tools".into(),
                endpoint: "https://tools.example.com".into(),
                credential: None,
                enabled: false, // advertised to the analyzer regardless
            })
            .unwrap();

        let mut state = AppState::new(modes, integrations);
        state.transcript.append(Role::User, "hello");
        state.transcript.append(Role::Assistant, "hi there");
        state
    }

    #[test]
    fn snapshot_collects_conversation_modes_and_integrations() {
        let state = populated_state();
        let snapshot = AnalysisSnapshot::take(&state);

        assert_eq!(snapshot.conversation.len(), 2);
        assert_eq!(snapshot.mode_names, vec!["General", "Chef"]);
        assert_eq!(snapshot.integration_names, vec!["recipe-tools"]);
    }

    // ---- prompt ---

    #[test]
    fn prompt_contains_all_sections() {
        let state = populated_state();
        let prompt = build_analysis_prompt(&AnalysisSnapshot::take(&state));

        assert!(prompt.contains("Current Modes: General, Chef"));
        assert!(prompt.contains("Current Integrations: recipe-tools"));
        assert!(prompt.contains("user: hello"));
        assert!(prompt.contains("assistant: hi there"));
        assert!(prompt.contains("Return ONLY a JSON array"));
        assert!(prompt.contains("(max 5)"));
    }

    // ---- parsing ---

    #[test]
    fn parse_array_embedded_in_prose() {
        let reply = "Here are my thoughts:\n[\"add a cooking mode\", \"add a timer tool\"]";
        assert_eq!(
            parse_suggestions(reply),
            vec!["add a cooking mode", "add a timer tool"]
        );
    }

    #[test]
    fn parse_reply_without_array_is_empty() {
        assert!(parse_suggestions("I have no structured suggestions.").is_empty());
    }

    #[test]
    fn parse_array_of_non_strings_is_empty() {
        assert!(parse_suggestions("[1, 2, 3]").is_empty());
    }

    // ---- end-to-end run ---

    #[tokio::test]
    async fn run_appends_each_suggestion() {
        let state = new_shared_state(populated_state());
        let gateway = Arc::new(MockInference::ok(r#"["first", "second"]"#));
        let analyzer = SelfImprovementAnalyzer::new(Arc::clone(&state), gateway);

        analyzer.run().await;

        let state = state.lock().unwrap();
        assert_eq!(state.suggestions.entries(), ["first", "second"]);
    }

    #[tokio::test]
    async fn run_swallows_inference_failure() {
        let state = new_shared_state(populated_state());
        let gateway = Arc::new(MockInference::failing());
        let analyzer = SelfImprovementAnalyzer::new(Arc::clone(&state), gateway);

        analyzer.run().await;

        assert!(state.lock().unwrap().suggestions.is_empty());
    }

    #[tokio::test]
    async fn run_swallows_malformed_reply() {
        let state = new_shared_state(populated_state());
        let gateway = Arc::new(MockInference::ok("no structure to be found"));
        let analyzer = SelfImprovementAnalyzer::new(Arc::clone(&state), gateway);

        analyzer.run().await;

        assert!(state.lock().unwrap().suggestions.is_empty());
    }

    /// The analysis request goes out without a system prompt.
    #[tokio::test]
    async fn analysis_request_has_no_system_prompt() {
        let state = new_shared_state(populated_state());
        let gateway = Arc::new(MockInference::ok("[]"));
        let analyzer =
            SelfImprovementAnalyzer::new(state, Arc::clone(&gateway) as Arc<dyn InferenceGateway>);

        analyzer.run().await;

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.is_none());
    }
}

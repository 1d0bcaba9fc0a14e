//! Interaction state machine and shared application state.
//!
//! [`InteractionState`] drives the orchestrator's state machine; a front-end
//! reads it via [`SharedState`] to render the appropriate view.
//!
//! [`AppState`] is the single owned application-state object: interaction
//! phase, current mode, both registries, the transcript and the suggestion
//! list — no ambient globals anywhere.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<AppState>>` — cheap to
//! clone and safe to share across tasks.

use std::sync::{Arc, Mutex};

use crate::engine::suggestions::SuggestionList;
use crate::integrations::IntegrationRegistry;
use crate::modes::{ModeRegistry, GENERAL_MODE_ID};
use crate::transcript::TranscriptStore;

// ---------------------------------------------------------------------------
// InteractionState
// ---------------------------------------------------------------------------

/// States of one voice interaction cycle.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──toggle──▶ Listening
///                  ──utterance captured──▶ Processing
///                                          ──inference done──▶ Speaking
///                                                              ──output done──▶ Idle
/// any state ──error / cancel──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Waiting for the user to start a cycle.
    #[default]
    Idle,

    /// Capture is active; waiting for one recognized utterance.
    Listening,

    /// The utterance has been recorded; inference is running.
    Processing,

    /// The reply has been recorded; speech output is playing.
    Speaking,
}

impl InteractionState {
    /// Returns `true` while a cycle is in flight.
    ///
    /// ```
    /// use voice_assistant::engine::InteractionState;
    ///
    /// assert!(!InteractionState::Idle.is_busy());
    /// assert!(InteractionState::Listening.is_busy());
    /// assert!(InteractionState::Processing.is_busy());
    /// assert!(InteractionState::Speaking.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, InteractionState::Idle)
    }

    /// A short human-readable label suitable for a status line.
    pub fn label(&self) -> &'static str {
        match self {
            InteractionState::Idle => "Idle",
            InteractionState::Listening => "Listening",
            InteractionState::Processing => "Processing",
            InteractionState::Speaking => "Speaking",
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Shared application state — the single source of truth.
///
/// Held behind [`SharedState`] (`Arc<Mutex<AppState>>`). The orchestrator
/// owns every [`InteractionState`] transition; the analyzer only ever takes
/// snapshots and appends suggestions; a front-end reads whatever it needs.
pub struct AppState {
    /// Current phase of the interaction cycle.
    pub interaction: InteractionState,

    /// Id of the currently selected mode.
    ///
    /// May reference a built-in or a custom mode; an id that resolves to
    /// neither falls back to the `general` prompt at resolution time, so
    /// setting it is never validated.
    pub current_mode: String,

    /// Built-in + custom conversational modes.
    pub modes: ModeRegistry,

    /// Tool server links and API integrations.
    pub integrations: IntegrationRegistry,

    /// Append-only conversation log.
    pub transcript: TranscriptStore,

    /// Improvement suggestions accumulated by the analyzer.
    pub suggestions: SuggestionList,

    /// Message describing the most recent cycle error, for display.
    pub last_error: Option<String>,
}

impl AppState {
    /// Create a fresh state around the given registries.
    ///
    /// Starts `Idle` in the `general` mode with an empty transcript.
    pub fn new(modes: ModeRegistry, integrations: IntegrationRegistry) -> Self {
        Self {
            interaction: InteractionState::Idle,
            current_mode: GENERAL_MODE_ID.to_string(),
            modes,
            integrations,
            transcript: TranscriptStore::new(),
            suggestions: SuggestionList::new(),
            last_error: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ModeRegistry::new(), IntegrationRegistry::new())
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`AppState`].
///
/// Cheap to clone (`Arc` clone). Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<AppState>>;

/// Construct a new [`SharedState`] wrapping the given [`AppState`].
pub fn new_shared_state(state: AppState) -> SharedState {
    Arc::new(Mutex::new(state))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! The interaction orchestration engine.
//!
//! This module is the core of the crate:
//!
//! * [`state`] — the `Idle → Listening → Processing → Speaking` state machine
//!   and the single owned application-state object behind [`SharedState`].
//! * [`orchestrator`] — [`TurnOrchestrator`], sequencing one capture →
//!   inference → speech cycle at a time.
//! * [`analyzer`] — periodic best-effort self-improvement analysis.
//! * [`synthesizer`] — on-demand synthesis of new modes from descriptions.
//! * [`extract`] — best-effort JSON extraction from free-text model replies.
//! * [`suggestions`] — the analyzer's append-only suggestion list.

pub mod analyzer;
pub mod extract;
pub mod orchestrator;
pub mod state;
pub mod suggestions;
pub mod synthesizer;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use analyzer::{analysis_due, AnalysisSnapshot, SelfImprovementAnalyzer, ANALYSIS_CADENCE};
pub use extract::{extract_array, extract_object};
pub use orchestrator::{ToggleOutcome, TurnOrchestrator, FALLBACK_REPLY};
pub use state::{new_shared_state, AppState, InteractionState, SharedState};
pub use suggestions::SuggestionList;
pub use synthesizer::{draft_to_mode, ModeDraft, ModeSynthesizer};

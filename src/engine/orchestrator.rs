//! Turn orchestrator — drives the full capture → inference → speech cycle.
//!
//! [`TurnOrchestrator`] owns every [`InteractionState`] transition. A single
//! entry point, [`toggle`](TurnOrchestrator::toggle), either starts a cycle
//! (from idle) or stops the capture in progress (while listening); toggles
//! during processing or speaking are deliberately ignored — there is no
//! cancel once inference has started.
//!
//! # Cycle flow
//!
//! ```text
//! toggle (idle, configured)
//!   └─▶ Listening: capture.capture()
//!         ├─ Err ──▶ Idle (no turn recorded)
//!         └─ Ok(utterance)
//!             └─▶ Processing: append user turn, resolve mode prompt,
//!                 inference.generate(utterance, prompt)
//!                   ├─ Err ──▶ append fallback assistant turn ──▶ Idle
//!                   └─ Ok(reply)
//!                       └─▶ Speaking: append assistant turn,
//!                           output.speak(reply) ──▶ Idle
//! ```
//!
//! The user turn is appended **before** inference runs, so a failure
//! mid-inference still preserves the user's input, and the fallback reply
//! keeps the transcript an alternating user/assistant record.
//!
//! After every append the post-append hook checks the analysis cadence and,
//! when due, dispatches the self-improvement analyzer as an independent
//! task that neither blocks nor is blocked by the next cycle.

use std::sync::Arc;

use crate::engine::analyzer::{analysis_due, SelfImprovementAnalyzer};
use crate::engine::state::{InteractionState, SharedState};
use crate::engine::synthesizer::{draft_to_mode, ModeSynthesizer};
use crate::gateway::{CaptureError, CaptureGateway, InferenceGateway, OutputGateway};
use crate::modes::CustomMode;
use crate::transcript::Role;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Assistant turn recorded when inference fails mid-cycle.
pub const FALLBACK_REPLY: &str = "Sorry, I encountered an error processing your request.";

// ---------------------------------------------------------------------------
// ToggleOutcome
// ---------------------------------------------------------------------------

/// What a [`toggle`](TurnOrchestrator::toggle) call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A full cycle ran: user turn, assistant turn, speech output.
    Completed,
    /// Inference failed; the fallback assistant turn was recorded.
    InferenceFailed,
    /// Capture ended in an error; no turn was recorded.
    CaptureFailed,
    /// This cycle's capture was stopped by another toggle before an
    /// utterance was recognized; no turn was recorded.
    Cancelled,
    /// This toggle stopped a capture in progress (the stopped cycle itself
    /// resolves with [`Cancelled`](Self::Cancelled)).
    StopRequested,
    /// A cycle was processing or speaking; the toggle was ignored.
    Busy,
    /// No inference credential is configured; the caller should prompt for
    /// one. Re-offered on every toggle attempt until resolved.
    NeedsConfiguration,
    /// No capture backend exists in this environment.
    CaptureUnsupported,
}

// ---------------------------------------------------------------------------
// TurnOrchestrator
// ---------------------------------------------------------------------------

/// Sequences capture, mode resolution, inference, transcript appends and
/// speech output with single-flight semantics.
///
/// Create with [`TurnOrchestrator::new`], share behind an `Arc`, and call
/// [`toggle`](Self::toggle) from UI events.
pub struct TurnOrchestrator {
    state: SharedState,
    /// `None` until a credential is configured.
    inference: Option<Arc<dyn InferenceGateway>>,
    capture: Arc<dyn CaptureGateway>,
    output: Arc<dyn OutputGateway>,
}

impl TurnOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `state`     — shared application state (also read by the front-end).
    /// * `inference` — text generation backend; `None` puts the engine into
    ///                 the needs-configuration state.
    /// * `capture`   — speech capture backend.
    /// * `output`    — speech output backend.
    pub fn new(
        state: SharedState,
        inference: Option<Arc<dyn InferenceGateway>>,
        capture: Arc<dyn CaptureGateway>,
        output: Arc<dyn OutputGateway>,
    ) -> Self {
        Self {
            state,
            inference,
            capture,
            output,
        }
    }

    /// Whether an inference backend is configured.
    pub fn is_configured(&self) -> bool {
        self.inference.is_some()
    }

    /// Handle to the shared application state.
    pub fn shared_state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Current interaction phase.
    pub fn interaction(&self) -> InteractionState {
        self.state.lock().unwrap().interaction
    }

    /// Select the mode used for subsequent turns.
    ///
    /// Never validated: an id that resolves to neither a custom nor a
    /// built-in mode falls back to the `general` prompt at resolution time.
    pub fn set_mode(&self, mode_id: impl Into<String>) {
        let mode_id = mode_id.into();
        log::info!("orchestrator: mode set to {mode_id:?}");
        self.state.lock().unwrap().current_mode = mode_id;
    }

    // -----------------------------------------------------------------------
    // Toggle
    // -----------------------------------------------------------------------

    /// The single UI entry point: start a cycle, or stop the one listening.
    ///
    /// From `Idle` this runs a full cycle to completion and reports how it
    /// ended. While `Listening` it stops capture. While `Processing` or
    /// `Speaking` it does nothing.
    pub async fn toggle(&self) -> ToggleOutcome {
        {
            let mut st = self.state.lock().unwrap();
            match st.interaction {
                InteractionState::Listening => {
                    drop(st);
                    log::debug!("orchestrator: toggle while listening — stopping capture");
                    self.capture.stop();
                    return ToggleOutcome::StopRequested;
                }
                InteractionState::Processing | InteractionState::Speaking => {
                    log::debug!("orchestrator: toggle while busy — ignored");
                    return ToggleOutcome::Busy;
                }
                InteractionState::Idle => {
                    if self.inference.is_none() {
                        log::info!("orchestrator: toggle rejected — no credential configured");
                        return ToggleOutcome::NeedsConfiguration;
                    }
                    if !self.capture.is_supported() {
                        log::warn!("orchestrator: toggle rejected — capture unsupported");
                        return ToggleOutcome::CaptureUnsupported;
                    }
                    st.interaction = InteractionState::Listening;
                    st.last_error = None;
                }
            }
        }

        self.run_cycle().await
    }

    // -----------------------------------------------------------------------
    // Cycle
    // -----------------------------------------------------------------------

    /// Run one capture → inference → speech cycle. Entered only from
    /// [`toggle`](Self::toggle) with the state already set to `Listening`.
    async fn run_cycle(&self) -> ToggleOutcome {
        let inference = Arc::clone(self.inference.as_ref().expect("gated by toggle"));

        // ── 1. Capture one utterance ─────────────────────────────────────
        let utterance = match self.capture.capture().await {
            Ok(text) => text,
            Err(CaptureError::Aborted) => {
                log::debug!("orchestrator: capture cancelled");
                self.state.lock().unwrap().interaction = InteractionState::Idle;
                return ToggleOutcome::Cancelled;
            }
            Err(e) => {
                log::warn!("orchestrator: capture failed: {e}");
                let mut st = self.state.lock().unwrap();
                st.interaction = InteractionState::Idle;
                st.last_error = Some(e.to_string());
                return ToggleOutcome::CaptureFailed;
            }
        };

        log::debug!("orchestrator: captured utterance ({} chars)", utterance.len());

        // ── 2. Record the user turn, resolve the mode prompt ─────────────
        let (system_prompt, turn_count) = {
            let mut st = self.state.lock().unwrap();
            st.interaction = InteractionState::Processing;
            st.transcript.append(Role::User, utterance.clone());
            let prompt = st.modes.resolve_system_prompt(&st.current_mode).to_string();
            (prompt, st.transcript.len())
        };
        self.after_append(turn_count);

        // ── 3. Inference ─────────────────────────────────────────────────
        let reply = match inference.generate(&utterance, Some(&system_prompt)).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("orchestrator: inference failed: {e}");
                let turn_count = {
                    let mut st = self.state.lock().unwrap();
                    st.transcript.append(Role::Assistant, FALLBACK_REPLY);
                    st.interaction = InteractionState::Idle;
                    st.last_error = Some(e.to_string());
                    st.transcript.len()
                };
                self.after_append(turn_count);
                return ToggleOutcome::InferenceFailed;
            }
        };

        // ── 4. Record the reply and speak it ─────────────────────────────
        let turn_count = {
            let mut st = self.state.lock().unwrap();
            st.transcript.append(Role::Assistant, reply.clone());
            st.interaction = InteractionState::Speaking;
            st.transcript.len()
        };
        self.after_append(turn_count);

        self.output.speak(&reply).await;

        self.state.lock().unwrap().interaction = InteractionState::Idle;
        ToggleOutcome::Completed
    }

    /// Post-append hook: when the transcript length hits the analysis
    /// cadence, dispatch the analyzer as an independent background task.
    fn after_append(&self, turn_count: usize) {
        if !analysis_due(turn_count) {
            return;
        }
        let Some(gateway) = self.inference.clone() else {
            return;
        };
        log::debug!("orchestrator: dispatching analysis at {turn_count} turns");
        let analyzer = SelfImprovementAnalyzer::new(Arc::clone(&self.state), gateway);
        tokio::spawn(async move { analyzer.run().await });
    }

    // -----------------------------------------------------------------------
    // Mode synthesis
    // -----------------------------------------------------------------------

    /// Synthesize a new mode from `description` and install it in the mode
    /// registry under a fresh unique id.
    ///
    /// Returns the installed mode, or `None` when the gateway is
    /// unconfigured, no mode was produced, or the registry rejected the id.
    pub async fn create_mode(&self, description: &str) -> Option<CustomMode> {
        let gateway = self.inference.clone()?;
        let draft = ModeSynthesizer::new(gateway).synthesize(description).await?;
        let mode = draft_to_mode(draft);

        let mut st = self.state.lock().unwrap();
        match st.modes.add_custom(mode.clone()) {
            Ok(()) => Some(mode),
            Err(e) => {
                log::warn!("orchestrator: synthesized mode rejected: {e}");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

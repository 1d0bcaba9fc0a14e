//! Mode synthesizer.
//!
//! Turns a free-text description ("a mode that talks like a pirate chef")
//! into a [`ModeDraft`] by asking the inference gateway for a strictly
//! structured JSON object and best-effort-extracting it from the reply.
//! Failure at any step — unavailable gateway, transport error, malformed or
//! incomplete reply — produces "no mode produced" (`None`), never an error.
//!
//! A draft is not yet a registry entry: the caller assigns a fresh unique id
//! via [`draft_to_mode`] and inserts the result through
//! [`ModeRegistry::add_custom`](crate::modes::ModeRegistry::add_custom).

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::engine::extract::extract_object;
use crate::gateway::InferenceGateway;
use crate::modes::CustomMode;

// ---------------------------------------------------------------------------
// ModeDraft
// ---------------------------------------------------------------------------

/// A synthesized mode definition, parsed from the model's JSON reply.
///
/// Field names are camelCase on the wire (`systemPrompt`), matching the
/// structure the synthesis prompt dictates. Display hints are defaulted when
/// the model omits them; `name` and `systemPrompt` are mandatory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_color() -> String {
    "#8b5cf6".into()
}

fn default_icon() -> String {
    "Sparkles".into()
}

/// Promote a draft to a [`CustomMode`] with a fresh unique id.
pub fn draft_to_mode(draft: ModeDraft) -> CustomMode {
    CustomMode {
        id: format!("custom-{}", Uuid::new_v4()),
        name: draft.name,
        description: draft.description,
        system_prompt: draft.system_prompt,
        color: draft.color,
        icon: draft.icon,
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

fn build_synthesis_prompt(description: &str) -> String {
    format!(
        "Create a new assistant mode based on this description: \"{description}\"\n\n\
         Return ONLY valid JSON with this exact structure:\n\
         {{\n\
         \x20 \"name\": \"mode name\",\n\
         \x20 \"description\": \"brief description\",\n\
         \x20 \"systemPrompt\": \"detailed system prompt for the AI to follow in this mode\",\n\
         \x20 \"color\": \"hex color code\",\n\
         \x20 \"icon\": \"icon name (e.g. Code, Brain, Heart, BookOpen)\"\n\
         }}"
    )
}

/// Parse and normalize a draft out of a model reply.
///
/// Returns `None` when no well-formed object is present, required fields are
/// missing, or they are blank after trimming.
fn parse_draft(reply: &str) -> Option<ModeDraft> {
    let value = extract_object(reply)?;
    let mut draft: ModeDraft = match serde_json::from_value(value) {
        Ok(draft) => draft,
        Err(e) => {
            log::warn!("synthesizer: reply object did not match the mode shape: {e}");
            return None;
        }
    };

    draft.name = draft.name.trim().to_string();
    draft.description = draft.description.trim().to_string();
    draft.system_prompt = draft.system_prompt.trim().to_string();
    draft.color = draft.color.trim().to_string();
    draft.icon = draft.icon.trim().to_string();

    if draft.name.is_empty() || draft.system_prompt.is_empty() {
        log::warn!("synthesizer: draft had an empty name or system prompt");
        return None;
    }
    Some(draft)
}

// ---------------------------------------------------------------------------
// ModeSynthesizer
// ---------------------------------------------------------------------------

/// On-demand synthesis of new modes from free-text descriptions.
pub struct ModeSynthesizer {
    gateway: Arc<dyn InferenceGateway>,
}

impl ModeSynthesizer {
    pub fn new(gateway: Arc<dyn InferenceGateway>) -> Self {
        Self { gateway }
    }

    /// Ask the gateway for a mode matching `description`.
    ///
    /// `None` means no mode was produced — the caller decides whether and
    /// how to tell the user.
    pub async fn synthesize(&self, description: &str) -> Option<ModeDraft> {
        let prompt = build_synthesis_prompt(description);

        match self.gateway.generate(&prompt, None).await {
            Ok(reply) => parse_draft(&reply),
            Err(e) => {
                log::warn!("synthesizer: inference failed: {e}");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

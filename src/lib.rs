//! Voice assistant interaction engine.
//!
//! Captures one spoken utterance at a time, routes it through a configurable
//! *mode* (persona system prompt) to a language-model backend, records both
//! sides of the exchange in an append-only transcript, and speaks the reply.
//! A periodic self-improvement analyzer reviews the conversation against the
//! registered modes and integrations and accumulates suggestions; a mode
//! synthesizer turns free-text descriptions into new custom modes.
//!
//! # Architecture
//!
//! ```text
//! front-end ──toggle──▶ TurnOrchestrator ──▶ CaptureGateway   (one utterance)
//!                        │                ──▶ InferenceGateway (Gemini)
//!                        │                ──▶ OutputGateway    (speech)
//!                        └─ SharedState: ModeRegistry, IntegrationRegistry,
//!                                        TranscriptStore, SuggestionList
//! ```
//!
//! The engine depends only on the three gateway traits; the concrete Gemini
//! client exists when (and only when) a credential is configured, which is
//! how the needs-configuration state is signalled.

pub mod config;
pub mod engine;
pub mod gateway;
pub mod integrations;
pub mod modes;
pub mod transcript;

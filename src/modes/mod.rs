//! Conversational mode registry.
//!
//! A *mode* is a named persona configuration selecting the system prompt used
//! for inference. Six built-in modes are fixed at compile time; custom modes
//! are created at runtime (by the user or the mode synthesizer) and persist
//! as JSON.

pub mod builtin;
pub mod registry;

pub use builtin::{builtin_modes, builtin_prompt, general_prompt, BuiltinMode, GENERAL_MODE_ID};
pub use registry::{CustomMode, ModeRegistry, ModeUpdate, RegistryError};

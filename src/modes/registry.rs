//! Custom mode records and the mode registry.
//!
//! [`ModeRegistry`] holds user- and analyzer-created [`CustomMode`]s alongside
//! the fixed built-in table and implements the two-tier system-prompt
//! resolution: a custom mode's stored prompt takes precedence over a built-in
//! entry with the same id, and an id found in neither tier falls back to the
//! `general` prompt.
//!
//! Custom modes persist as pretty JSON in the platform config directory so
//! they survive restarts. Persistence is best-effort; a failed save is logged
//! and never fatal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppPaths;
use crate::modes::builtin::{builtin_modes, builtin_prompt, general_prompt, BuiltinMode};

// ---------------------------------------------------------------------------
// RegistryError
// ---------------------------------------------------------------------------

/// Errors from mode registry mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `add_custom` was called with an id that already names a custom mode.
    #[error("a custom mode with id {0:?} already exists")]
    DuplicateMode(String),
}

// ---------------------------------------------------------------------------
// CustomMode
// ---------------------------------------------------------------------------

/// A user- or analyzer-created assistant mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMode {
    /// Unique token; by convention `custom-` followed by a uuid.
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    /// Display hint: hex color.
    pub color: String,
    /// Display hint: icon name.
    pub icon: String,
}

/// Partial update applied to an existing custom mode.
///
/// `None` fields are left unchanged; the id itself is never rewritten.
#[derive(Debug, Clone, Default)]
pub struct ModeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub system_prompt: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

// ---------------------------------------------------------------------------
// ModeRegistry
// ---------------------------------------------------------------------------

/// Holds built-in and custom conversational modes.
///
/// The built-in set is fixed; only custom modes can be added, edited or
/// removed. When constructed with a path, every mutation persists the custom
/// set to disk.
#[derive(Debug, Default)]
pub struct ModeRegistry {
    custom: Vec<CustomMode>,
    /// Persistence target; `None` keeps the registry purely in memory.
    path: Option<PathBuf>,
}

impl ModeRegistry {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create an empty, in-memory registry (no persistence).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load custom modes from the platform config directory, or start empty
    /// when the file does not exist yet.
    pub fn load_or_default() -> Self {
        Self::load_from(AppPaths::new().modes_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: PathBuf) -> Self {
        let custom = if path.exists() {
            let data = std::fs::read_to_string(&path).unwrap_or_default();
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            Vec::new()
        };
        Self {
            custom,
            path: Some(path),
        }
    }

    // -----------------------------------------------------------------------
    // Built-ins
    // -----------------------------------------------------------------------

    /// The ordered, fixed table of 6 built-in modes.
    pub fn list_builtins(&self) -> &'static [BuiltinMode] {
        builtin_modes()
    }

    // -----------------------------------------------------------------------
    // Custom mode mutation
    // -----------------------------------------------------------------------

    /// Add a custom mode.
    ///
    /// Rejected with [`RegistryError::DuplicateMode`] when a custom mode with
    /// the same id already exists. A custom id may deliberately shadow a
    /// built-in id — resolution then prefers the custom prompt.
    pub fn add_custom(&mut self, mode: CustomMode) -> Result<(), RegistryError> {
        if self.custom.iter().any(|m| m.id == mode.id) {
            return Err(RegistryError::DuplicateMode(mode.id));
        }
        log::info!("modes: added custom mode {:?} ({})", mode.name, mode.id);
        self.custom.push(mode);
        self.save();
        Ok(())
    }

    /// Remove a custom mode by id. Returns `true` when a mode was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|m| m.id != id);
        let removed = self.custom.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    /// Merge `update` into the custom mode with the given id.
    ///
    /// A no-op when the id names no custom mode (built-ins are immutable).
    pub fn update(&mut self, id: &str, update: ModeUpdate) {
        let Some(mode) = self.custom.iter_mut().find(|m| m.id == id) else {
            return;
        };
        if let Some(name) = update.name {
            mode.name = name;
        }
        if let Some(description) = update.description {
            mode.description = description;
        }
        if let Some(system_prompt) = update.system_prompt {
            mode.system_prompt = system_prompt;
        }
        if let Some(color) = update.color {
            mode.color = color;
        }
        if let Some(icon) = update.icon {
            mode.icon = icon;
        }
        self.save();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All custom modes in insertion order.
    pub fn custom_modes(&self) -> &[CustomMode] {
        &self.custom
    }

    /// Look up a custom mode by id.
    pub fn get_custom(&self, id: &str) -> Option<&CustomMode> {
        self.custom.iter().find(|m| m.id == id)
    }

    /// Resolve the system prompt for a mode id.
    ///
    /// Two-tier lookup: a custom mode with this id wins over a built-in entry
    /// with the same id; an id found in neither tier resolves to the
    /// `general` prompt rather than failing.
    pub fn resolve_system_prompt(&self, mode_id: &str) -> &str {
        if let Some(custom) = self.get_custom(mode_id) {
            return &custom.system_prompt;
        }
        builtin_prompt(mode_id).unwrap_or_else(general_prompt)
    }

    /// Names of the active modes: the name resolved for `current_mode_id`
    /// followed by every custom mode name. Consumed by the analyzer.
    pub fn active_mode_names(&self, current_mode_id: &str) -> Vec<String> {
        let current = self
            .get_custom(current_mode_id)
            .map(|m| m.name.clone())
            .or_else(|| {
                builtin_modes()
                    .iter()
                    .find(|m| m.id == current_mode_id)
                    .map(|m| m.name.to_string())
            })
            .unwrap_or_else(|| current_mode_id.to_string());

        let mut names = vec![current];
        names.extend(self.custom.iter().map(|m| m.name.clone()));
        names
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&self.custom) {
            Ok(data) => {
                if let Err(e) = std::fs::write(path, data) {
                    log::warn!("modes: failed to persist {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("modes: failed to serialise custom modes: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn mode(id: &str, prompt: &str) -> CustomMode {
        CustomMode {
            id: id.into(),
            name: format!("{id} name"),
            description: "test mode".into(),
            system_prompt: prompt.into(),
            color: "#123456".into(),
            icon: "Sparkles".into(),
        }
    }

    // ---- add / remove / update ---

    #[test]
    fn add_then_get() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "be terse")).unwrap();
        assert_eq!(reg.custom_modes().len(), 1);
        assert_eq!(reg.get_custom("custom-1").unwrap().system_prompt, "be terse");
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "a")).unwrap();
        let err = reg.add_custom(mode("custom-1", "b")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateMode("custom-1".into()));
        // The original entry must be untouched.
        assert_eq!(reg.custom_modes().len(), 1);
        assert_eq!(reg.get_custom("custom-1").unwrap().system_prompt, "a");
    }

    #[test]
    fn remove_returns_whether_anything_was_removed() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "a")).unwrap();
        assert!(reg.remove("custom-1"));
        assert!(!reg.remove("custom-1"));
        assert!(reg.custom_modes().is_empty());
    }

    #[test]
    fn update_merges_only_provided_fields() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "old prompt")).unwrap();

        reg.update(
            "custom-1",
            ModeUpdate {
                name: Some("Renamed".into()),
                system_prompt: Some("new prompt".into()),
                ..Default::default()
            },
        );

        let m = reg.get_custom("custom-1").unwrap();
        assert_eq!(m.name, "Renamed");
        assert_eq!(m.system_prompt, "new prompt");
        // Untouched fields survive.
        assert_eq!(m.description, "test mode");
        assert_eq!(m.color, "#123456");
    }

    #[test]
    fn update_unknown_id_is_a_no_op() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "a")).unwrap();
        reg.update(
            "custom-2",
            ModeUpdate {
                name: Some("x".into()),
                ..Default::default()
            },
        );
        assert_eq!(reg.get_custom("custom-1").unwrap().name, "custom-1 name");
    }

    // ---- resolution ---

    #[test]
    fn resolve_builtin_prompt() {
        let reg = ModeRegistry::new();
        assert!(reg.resolve_system_prompt("code").contains("programming"));
    }

    #[test]
    fn resolve_custom_prompt() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "answer in haiku")).unwrap();
        assert_eq!(reg.resolve_system_prompt("custom-1"), "answer in haiku");
    }

    /// A custom mode whose id equals a built-in id must win resolution.
    #[test]
    fn custom_mode_shadows_builtin_of_same_id() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("code", "my own code prompt")).unwrap();
        assert_eq!(reg.resolve_system_prompt("code"), "my own code prompt");
    }

    #[test]
    fn unknown_id_falls_back_to_general() {
        let reg = ModeRegistry::new();
        assert_eq!(
            reg.resolve_system_prompt("does-not-exist"),
            crate::modes::builtin::general_prompt()
        );
    }

    // ---- analyzer input ---

    #[test]
    fn active_mode_names_lists_current_then_customs() {
        let mut reg = ModeRegistry::new();
        reg.add_custom(mode("custom-1", "a")).unwrap();
        reg.add_custom(mode("custom-2", "b")).unwrap();

        let names = reg.active_mode_names("general");
        assert_eq!(names[0], "General");
        assert_eq!(names[1], "custom-1 name");
        assert_eq!(names[2], "custom-2 name");
    }

    #[test]
    fn active_mode_names_keeps_unresolvable_id_verbatim() {
        let reg = ModeRegistry::new();
        let names = reg.active_mode_names("mystery");
        assert_eq!(names, vec!["mystery".to_string()]);
    }

    // ---- persistence ---

    #[test]
    fn persists_and_reloads() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modes.json");

        {
            let mut reg = ModeRegistry::load_from(path.clone());
            reg.add_custom(mode("custom-1", "persisted prompt")).unwrap();
        }

        let reloaded = ModeRegistry::load_from(path);
        assert_eq!(reloaded.custom_modes().len(), 1);
        assert_eq!(
            reloaded.get_custom("custom-1").unwrap().system_prompt,
            "persisted prompt"
        );
    }

    #[test]
    fn remove_persists() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modes.json");

        {
            let mut reg = ModeRegistry::load_from(path.clone());
            reg.add_custom(mode("custom-1", "a")).unwrap();
            reg.remove("custom-1");
        }

        let reloaded = ModeRegistry::load_from(path);
        assert!(reloaded.custom_modes().is_empty());
    }
}

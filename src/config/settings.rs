//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// InferenceConfig
// ---------------------------------------------------------------------------

/// Settings for the language-model inference backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// API key for the Gemini backend — `None` until the user configures one.
    ///
    /// While this is absent the engine refuses to start a capture cycle and
    /// surfaces a needs-configuration signal instead.
    pub api_key: Option<String>,
    /// Base URL of the API endpoint.
    pub base_url: String,
    /// Model identifier sent to the API (e.g. `"gemini-2.0-flash-exp"`).
    pub model: String,
    /// Maximum seconds to wait for a generation response before timing out.
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.0-flash-exp".into(),
            timeout_secs: 30,
        }
    }
}

impl InferenceConfig {
    /// Returns the configured API key, treating an empty string as absent.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Preferences passed to the speech output gateway.
///
/// These are hints only; a gateway implementation may ignore any of them
/// (the console output gateway ignores all three numeric fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Recognition / synthesis language as a BCP-47 tag.
    pub language: String,
    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = normal).
    pub pitch: f32,
    /// Output volume (0.0 – 1.0).
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use voice_assistant::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Inference backend settings.
    pub inference: InferenceConfig,
    /// Speech output preferences.
    pub speech: SpeechConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(original, loaded);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.inference.api_key.is_none());
        assert_eq!(
            cfg.inference.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(cfg.inference.model, "gemini-2.0-flash-exp");
        assert_eq!(cfg.inference.timeout_secs, 30);
        assert_eq!(cfg.speech.language, "en-US");
        assert_eq!(cfg.speech.rate, 1.0);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.inference.api_key = Some("AIza-test".into());
        cfg.inference.model = "gemini-1.5-pro".into();
        cfg.inference.timeout_secs = 60;
        cfg.speech.language = "en-GB".into();
        cfg.speech.rate = 1.25;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded, cfg);
    }

    // ---- credential() ---

    #[test]
    fn credential_none_when_missing() {
        let cfg = InferenceConfig::default();
        assert!(cfg.credential().is_none());
    }

    #[test]
    fn credential_none_when_empty_string() {
        let cfg = InferenceConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(cfg.credential().is_none());
    }

    #[test]
    fn credential_some_when_present() {
        let cfg = InferenceConfig {
            api_key: Some("AIza-test".into()),
            ..Default::default()
        };
        assert_eq!(cfg.credential(), Some("AIza-test"));
    }
}

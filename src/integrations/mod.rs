//! External tool and API integration registry.
//!
//! Two record kinds share the registry: [`ToolServerLink`]s (remote tool
//! servers, credential optional) and [`ApiIntegration`]s (generic REST
//! integrations, credential required). Records are independently addressable
//! by id and carry an `enabled` flag that gates whether they are advertised
//! to the self-improvement analyzer; the engine itself never dials them — the
//! endpoint and credential fields are passed opaquely to whatever network
//! layer sits outside this crate.
//!
//! Adds are validated ([`IntegrationError`] on empty required fields);
//! removal is by id; toggling an unknown id is a deliberate no-op so that
//! UI-driven toggles stay idempotent.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// IntegrationError
// ---------------------------------------------------------------------------

/// Validation errors from integration adds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrationError {
    #[error("integration name must not be empty")]
    EmptyName,

    #[error("integration endpoint must not be empty")]
    EmptyEndpoint,

    /// API integrations require a credential; tool server links do not.
    #[error("API integration credential must not be empty")]
    EmptyCredential,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A remote tool server the assistant can be pointed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolServerLink {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    /// Optional — many tool servers are unauthenticated.
    pub credential: Option<String>,
    pub enabled: bool,
}

/// A generic REST API integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiIntegration {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    /// Required — adds without one are rejected.
    pub credential: String,
    pub enabled: bool,
    /// Extra request headers, passed through opaquely.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// IntegrationRegistry
// ---------------------------------------------------------------------------

/// Holds the integration records, persisted together as one JSON document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IntegrationRegistry {
    tool_servers: Vec<ToolServerLink>,
    apis: Vec<ApiIntegration>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl IntegrationRegistry {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create an empty, in-memory registry (no persistence).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from the platform config directory, or start empty when
    /// the file does not exist yet.
    pub fn load_or_default() -> Self {
        Self::load_from(AppPaths::new().integrations_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: PathBuf) -> Self {
        let mut registry: Self = if path.exists() {
            let data = std::fs::read_to_string(&path).unwrap_or_default();
            serde_json::from_str(&data).unwrap_or_default()
        } else {
            Self::default()
        };
        registry.path = Some(path);
        registry
    }

    // -----------------------------------------------------------------------
    // Tool server links
    // -----------------------------------------------------------------------

    /// Add a tool server link. Requires a non-empty name and endpoint.
    pub fn add_tool_server(&mut self, link: ToolServerLink) -> Result<(), IntegrationError> {
        validate_common(&link.name, &link.endpoint)?;
        log::info!("integrations: added tool server {:?} ({})", link.name, link.id);
        self.tool_servers.push(link);
        self.save();
        Ok(())
    }

    /// Remove a tool server link by id. Returns `true` when one was removed.
    pub fn remove_tool_server(&mut self, id: &str) -> bool {
        let before = self.tool_servers.len();
        self.tool_servers.retain(|s| s.id != id);
        let removed = self.tool_servers.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    /// Flip the `enabled` flag of a tool server link. No-op on unknown id.
    pub fn toggle_tool_server(&mut self, id: &str) {
        if let Some(link) = self.tool_servers.iter_mut().find(|s| s.id == id) {
            link.enabled = !link.enabled;
            self.save();
        }
    }

    /// All tool server links in insertion order.
    pub fn tool_servers(&self) -> &[ToolServerLink] {
        &self.tool_servers
    }

    // -----------------------------------------------------------------------
    // API integrations
    // -----------------------------------------------------------------------

    /// Add an API integration. Requires a non-empty name, endpoint and
    /// credential.
    pub fn add_api(&mut self, api: ApiIntegration) -> Result<(), IntegrationError> {
        validate_common(&api.name, &api.endpoint)?;
        if api.credential.is_empty() {
            return Err(IntegrationError::EmptyCredential);
        }
        log::info!("integrations: added API integration {:?} ({})", api.name, api.id);
        self.apis.push(api);
        self.save();
        Ok(())
    }

    /// Remove an API integration by id. Returns `true` when one was removed.
    pub fn remove_api(&mut self, id: &str) -> bool {
        let before = self.apis.len();
        self.apis.retain(|a| a.id != id);
        let removed = self.apis.len() != before;
        if removed {
            self.save();
        }
        removed
    }

    /// Flip the `enabled` flag of an API integration. No-op on unknown id.
    pub fn toggle_api(&mut self, id: &str) {
        if let Some(api) = self.apis.iter_mut().find(|a| a.id == id) {
            api.enabled = !api.enabled;
            self.save();
        }
    }

    /// All API integrations in insertion order.
    pub fn apis(&self) -> &[ApiIntegration] {
        &self.apis
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Names of every record, tool servers first, regardless of `enabled`.
    /// Consumed by the self-improvement analyzer.
    pub fn all_names(&self) -> Vec<String> {
        self.tool_servers
            .iter()
            .map(|s| s.name.clone())
            .chain(self.apis.iter().map(|a| a.name.clone()))
            .collect()
    }

    /// Total record count across both kinds.
    pub fn len(&self) -> usize {
        self.tool_servers.len() + self.apis.len()
    }

    /// Returns `true` when no records of either kind exist.
    pub fn is_empty(&self) -> bool {
        self.tool_servers.is_empty() && self.apis.is_empty()
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
        match serde_json::to_string_pretty(self) {
            Ok(data) => {
                if let Err(e) = std::fs::write(path, data) {
                    log::warn!("integrations: failed to persist {}: {e}", path.display());
                }
            }
            Err(e) => log::warn!("integrations: failed to serialise registry: {e}"),
        }
    }
}

fn validate_common(name: &str, endpoint: &str) -> Result<(), IntegrationError> {
    if name.is_empty() {
        return Err(IntegrationError::EmptyName);
    }
    if endpoint.is_empty() {
        return Err(IntegrationError::EmptyEndpoint);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Agent catalog: the set of specialized agents messages can route to.
//!
//! Supplied by the caller at pipeline construction and validated once;
//! routing answers from the classification oracle are only accepted if
//! they name an agent present here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a specialized agent (e.g. `DIAGNOSIS_AGENT`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Create an agent id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One catalog entry: an agent and a description of what it handles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Agent identifier
    pub id: AgentId,
    /// Scope description shown to the oracle for disambiguation
    pub scope: String,
}

impl AgentSpec {
    /// Create a catalog entry.
    pub fn new(id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(id),
            scope: scope.into(),
        }
    }
}

/// Errors from catalog construction.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No agents configured
    #[error("agent catalog is empty")]
    Empty,

    /// Duplicate agent id
    #[error("duplicate agent id in catalog: {0}")]
    DuplicateAgent(AgentId),
}

/// Validated, non-empty collection of agent specs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCatalog {
    agents: Vec<AgentSpec>,
}

impl AgentCatalog {
    /// Build a catalog, rejecting empty input and duplicate ids.
    pub fn new(agents: Vec<AgentSpec>) -> Result<Self, CatalogError> {
        if agents.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, spec) in agents.iter().enumerate() {
            if agents[..i].iter().any(|other| other.id == spec.id) {
                return Err(CatalogError::DuplicateAgent(spec.id.clone()));
            }
        }
        Ok(Self { agents })
    }

    /// All entries, in declaration order.
    pub fn agents(&self) -> &[AgentSpec] {
        &self.agents
    }

    /// Whether the catalog contains the given id.
    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.iter().any(|spec| &spec.id == id)
    }

    /// Look up an entry by raw identifier string. Oracle answers arrive
    /// as text and with unreliable casing, so the match ignores ASCII
    /// case.
    pub fn get(&self, id: &str) -> Option<&AgentSpec> {
        self.agents
            .iter()
            .find(|spec| spec.id.as_str().eq_ignore_ascii_case(id))
    }

    /// Number of configured agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always false: construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<AgentSpec> {
        vec![
            AgentSpec::new("DIAGNOSIS_AGENT", "Clinical questions and symptom triage"),
            AgentSpec::new("APPOINTMENT_AGENT", "Scheduling and visit logistics"),
        ]
    }

    #[test]
    fn test_catalog_new_valid() {
        let catalog = AgentCatalog::new(specs()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&AgentId::new("DIAGNOSIS_AGENT")));
        assert!(!catalog.contains(&AgentId::new("BILLING_AGENT")));
    }

    #[test]
    fn test_catalog_rejects_empty() {
        let result = AgentCatalog::new(Vec::new());
        assert!(matches!(result, Err(CatalogError::Empty)));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let mut agents = specs();
        agents.push(AgentSpec::new("DIAGNOSIS_AGENT", "Duplicate"));
        let result = AgentCatalog::new(agents);
        assert!(matches!(result, Err(CatalogError::DuplicateAgent(_))));
    }

    #[test]
    fn test_catalog_get_by_str() {
        let catalog = AgentCatalog::new(specs()).unwrap();
        assert!(catalog.get("APPOINTMENT_AGENT").is_some());
        assert!(catalog.get("BILLING_AGENT").is_none());
    }

    #[test]
    fn test_catalog_get_ignores_case() {
        let catalog = AgentCatalog::new(specs()).unwrap();
        let spec = catalog.get("appointment_agent").unwrap();
        assert_eq!(spec.id.as_str(), "APPOINTMENT_AGENT");
    }
}

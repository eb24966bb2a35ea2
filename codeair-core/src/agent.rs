//! Agent definitions attached to projects.
//!
//! Besides the wire types, this module holds the two pieces of agent logic the
//! console needs: merging server placeholders into the real agent list, and
//! validating the create/update form before anything is sent.

use crate::identity::{self, AgentId, ProjectId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENUMS
// ============================================================================

/// Error returned when a wire string names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// What an agent does on a merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentType {
    #[serde(rename = "mr-describer")]
    MrDescriber,
    #[serde(rename = "mr-reviewer")]
    MrReviewer,
}

impl AgentType {
    pub fn all() -> &'static [AgentType] {
        &[AgentType::MrDescriber, AgentType::MrReviewer]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentType::MrDescriber => "mr-describer",
            AgentType::MrReviewer => "mr-reviewer",
        }
    }

    /// Human label built from the wire name: `mr-describer` -> `Mr Describer`.
    pub fn label(&self) -> String {
        self.as_str()
            .split('-')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mr-describer" => Ok(AgentType::MrDescriber),
            "mr-reviewer" => Ok(AgentType::MrReviewer),
            _ => Err(ParseEnumError {
                kind: "agent type",
                value: s.to_string(),
            }),
        }
    }
}

/// Execution engine. `PrAgent` is the built-in default engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentEngine {
    #[serde(rename = "pr_agent_v0.29")]
    PrAgent,
    #[serde(rename = "external")]
    External,
}

impl AgentEngine {
    pub fn all() -> &'static [AgentEngine] {
        &[AgentEngine::PrAgent, AgentEngine::External]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentEngine::PrAgent => "pr_agent_v0.29",
            AgentEngine::External => "external",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgentEngine::PrAgent => "PR Agent v0.29",
            AgentEngine::External => "External",
        }
    }
}

impl Default for AgentEngine {
    fn default() -> Self {
        AgentEngine::PrAgent
    }
}

impl fmt::Display for AgentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentEngine {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pr_agent_v0.29" => Ok(AgentEngine::PrAgent),
            "external" => Ok(AgentEngine::External),
            _ => Err(ParseEnumError {
                kind: "agent engine",
                value: s.to_string(),
            }),
        }
    }
}

/// LLM provider backing the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentProvider {
    Anthropic,
}

impl AgentProvider {
    pub fn all() -> &'static [AgentProvider] {
        &[AgentProvider::Anthropic]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentProvider::Anthropic => "anthropic",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgentProvider::Anthropic => "Anthropic",
        }
    }
}

impl Default for AgentProvider {
    fn default() -> Self {
        AgentProvider::Anthropic
    }
}

// ============================================================================
// AGENT RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub provider: AgentProvider,
    pub model: String,
    pub token: String,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
}

/// A configured (or placeholder) agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub engine: AgentEngine,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub config: AgentConfig,
    #[serde(with = "identity::timestamp")]
    pub created_at: Timestamp,
    #[serde(with = "identity::timestamp")]
    pub updated_at: Timestamp,
}

impl Agent {
    /// Placeholders are server templates for agent types not configured yet.
    pub fn is_placeholder(&self) -> bool {
        identity::is_placeholder_id(&self.id)
    }

    /// Console location of the configuration form for this agent.
    pub fn config_href(&self, project_id: ProjectId) -> String {
        if self.is_placeholder() {
            format!("/project/{}/agents/new?type={}", project_id, self.agent_type)
        } else {
            format!("/project/{}/agents/{}", project_id, self.id)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDetailResponse {
    pub agent: Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentsListResponse {
    pub total: u64,
    pub agents: Vec<Agent>,
}

/// Merge real agents with placeholder templates.
///
/// Real agents come first in server order, followed by every placeholder whose
/// type has no real agent, also in server order.
pub fn merge_placeholders(real: &[Agent], placeholders: &[Agent]) -> Vec<Agent> {
    let existing: HashSet<AgentType> = real.iter().map(|agent| agent.agent_type).collect();
    real.iter()
        .cloned()
        .chain(
            placeholders
                .iter()
                .filter(|placeholder| !existing.contains(&placeholder.agent_type))
                .cloned(),
        )
        .collect()
}

// ============================================================================
// DRAFTS AND VALIDATION
// ============================================================================

/// Form fields that carry client-side validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentField {
    Name,
    Description,
    Model,
    Token,
    ExternalUrl,
}

impl AgentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentField::Name => "name",
            AgentField::Description => "description",
            AgentField::Model => "model",
            AgentField::Token => "token",
            AgentField::ExternalUrl => "external_url",
        }
    }
}

/// Per-field validation messages. Empty means the draft may be submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<AgentField, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: AgentField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: AgentField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentField, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// Request body for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDraft {
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    pub engine: AgentEngine,
    pub name: String,
    pub description: String,
    pub enabled: bool,
    pub config: AgentConfig,
}

impl AgentDraft {
    /// Pre-fill a draft from an existing agent or a placeholder template.
    pub fn from_agent(agent: &Agent) -> Self {
        Self {
            agent_type: agent.agent_type,
            engine: agent.engine,
            name: agent.name.clone(),
            description: agent.description.clone(),
            enabled: agent.enabled,
            config: agent.config.clone(),
        }
    }

    /// Check required fields. Nothing is sent while this returns errors.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.name.trim().is_empty() {
            errors.insert(AgentField::Name, "Name is required");
        }
        if self.description.trim().is_empty() {
            errors.insert(AgentField::Description, "Description is required");
        }
        if self.config.model.trim().is_empty() {
            errors.insert(AgentField::Model, "Model is required");
        }
        if self.config.token.trim().is_empty() {
            errors.insert(AgentField::Token, "Token is required");
        }
        if self.engine == AgentEngine::External {
            let url = self.config.external_url.as_deref().unwrap_or("").trim();
            if url.is_empty() {
                errors.insert(AgentField::ExternalUrl, "External URL is required");
            } else if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.insert(
                    AgentField::ExternalUrl,
                    "External URL must start with http:// or https://",
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Shape the draft for the wire: blank prompt becomes null and the external
    /// URL is only kept for the external engine.
    pub fn normalized(mut self) -> Self {
        self.config.prompt = self
            .config
            .prompt
            .filter(|prompt| !prompt.is_empty());
        self.config.external_url = match self.engine {
            AgentEngine::External => self
                .config
                .external_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            AgentEngine::PrAgent => None,
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_agent(id: u128, agent_type: AgentType) -> Agent {
        let now = Utc::now();
        Agent {
            id: Uuid::from_u128(id),
            agent_type,
            engine: AgentEngine::PrAgent,
            name: format!("agent-{}", id),
            description: "does things".to_string(),
            enabled: true,
            config: AgentConfig {
                provider: AgentProvider::Anthropic,
                model: "claude-3-5-sonnet-20241022".to_string(),
                token: "secret".to_string(),
                prompt: None,
                external_url: None,
            },
            created_at: now,
            updated_at: now,
        }
    }

    fn make_draft() -> AgentDraft {
        AgentDraft::from_agent(&make_agent(0xabc << 80, AgentType::MrReviewer))
    }

    #[test]
    fn test_agent_type_roundtrip() {
        for agent_type in AgentType::all() {
            let parsed: AgentType = agent_type.as_str().parse().unwrap();
            assert_eq!(*agent_type, parsed);
        }
        assert!("mr-approver".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_agent_type_label() {
        assert_eq!(AgentType::MrDescriber.label(), "Mr Describer");
        assert_eq!(AgentType::MrReviewer.label(), "Mr Reviewer");
    }

    #[test]
    fn test_agent_wire_format() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000002",
            "type": "mr-reviewer",
            "engine": "pr_agent_v0.29",
            "name": "MR Code Reviewer",
            "description": "Reviews merge requests",
            "enabled": false,
            "config": {"provider": "anthropic", "model": "m", "token": "t", "prompt": null},
            "created_at": "2024-05-01T12:00:00.000001",
            "updated_at": "2024-05-01T12:00:00Z"
        }"#;
        let agent: Agent = serde_json::from_str(json).unwrap();
        assert_eq!(agent.agent_type, AgentType::MrReviewer);
        assert!(agent.is_placeholder());
        assert_eq!(agent.config.external_url, None);
        assert_eq!(agent.config_href(42), "/project/42/agents/new?type=mr-reviewer");
    }

    #[test]
    fn test_real_agent_href() {
        let agent = make_agent(0x1234 << 80, AgentType::MrDescriber);
        assert_eq!(agent.config_href(7), format!("/project/7/agents/{}", agent.id));
    }

    #[test]
    fn test_merge_real_first_then_missing_placeholders() {
        let real = vec![make_agent(0xa1 << 80, AgentType::MrReviewer)];
        let placeholders = vec![
            make_agent(1, AgentType::MrDescriber),
            make_agent(2, AgentType::MrReviewer),
        ];

        let merged = merge_placeholders(&real, &placeholders);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, real[0].id);
        assert_eq!(merged[1].agent_type, AgentType::MrDescriber);
        assert!(merged[1].is_placeholder());
    }

    #[test]
    fn test_merge_with_no_real_agents_keeps_placeholder_order() {
        let placeholders = vec![
            make_agent(1, AgentType::MrDescriber),
            make_agent(2, AgentType::MrReviewer),
        ];
        let merged = merge_placeholders(&[], &placeholders);
        assert_eq!(merged, placeholders);
    }

    #[test]
    fn test_validate_accepts_complete_draft() {
        assert!(make_draft().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_each_blank_field() {
        let mut draft = make_draft();
        draft.name = "  ".to_string();
        draft.description.clear();
        draft.config.model.clear();
        draft.config.token = "\t".to_string();

        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.get(AgentField::Name), Some("Name is required"));
        assert_eq!(errors.get(AgentField::Token), Some("Token is required"));
        assert_eq!(errors.get(AgentField::ExternalUrl), None);
    }

    #[test]
    fn test_validate_external_engine_requires_url() {
        let mut draft = make_draft();
        draft.engine = AgentEngine::External;
        let errors = draft.validate().unwrap_err();
        assert_eq!(
            errors.get(AgentField::ExternalUrl),
            Some("External URL is required")
        );

        draft.config.external_url = Some("ftp://hooks.example.com".to_string());
        assert!(draft.validate().is_err());

        draft.config.external_url = Some("https://hooks.example.com/review".to_string());
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_normalized_drops_url_for_default_engine() {
        let mut draft = make_draft();
        draft.config.prompt = Some(String::new());
        draft.config.external_url = Some("https://left.over".to_string());

        let normalized = draft.normalized();
        assert_eq!(normalized.config.prompt, None);
        assert_eq!(normalized.config.external_url, None);

        let body = serde_json::to_value(&normalized).unwrap();
        assert_eq!(body["type"], "mr-reviewer");
        assert_eq!(body["engine"], "pr_agent_v0.29");
        assert!(body["config"]["external_url"].is_null());
    }
}

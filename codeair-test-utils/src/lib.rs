//! CodeAir Test Utilities
//!
//! Shared test infrastructure for the CodeAir workspace:
//! - A recording mock of the remote API
//! - Proptest generators for locations and agents
//! - Fixtures for common scenarios
//! - Assertions over API results

pub use codeair_core::{
    Agent, AgentConfig, AgentDetailResponse, AgentDraft, AgentEngine, AgentId, AgentLogsResponse,
    AgentProvider, AgentType, AgentsListResponse, ApiEndpoint, ApiError, ApiResult, AuthResponse,
    AuthorizeResponse, ConsoleApi, JobId, JobLog, LogoutResponse, Project, ProjectDetailResponse,
    ProjectId, ProjectSearchResponse, Timestamp, User,
};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

// ============================================================================
// MOCK API
// ============================================================================

/// One call observed by [`MockConsoleApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub endpoint: ApiEndpoint,
    /// Token the call was made with, if the endpoint is authenticated.
    pub token: Option<String>,
    /// Endpoint-specific argument summary (query, code, ids).
    pub detail: String,
}

#[derive(Debug)]
struct MockState {
    calls: Vec<ApiCall>,
    failures: HashMap<ApiEndpoint, ApiError>,
    authorization_url: String,
    auth: AuthResponse,
    bot_user: User,
    projects: Vec<Project>,
    agents: Vec<Agent>,
    placeholders: Vec<Agent>,
    logs: Vec<JobLog>,
}

/// In-memory [`ConsoleApi`] that records every call.
///
/// Responses come from the seeded data; any endpoint can be made to fail
/// with [`MockConsoleApi::fail`].
#[derive(Debug)]
pub struct MockConsoleApi {
    state: Mutex<MockState>,
}

impl MockConsoleApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                calls: Vec::new(),
                failures: HashMap::new(),
                authorization_url: fixtures::AUTHORIZATION_URL.to_string(),
                auth: AuthResponse {
                    token: fixtures::SESSION_TOKEN.to_string(),
                    user: fixtures::user(),
                },
                bot_user: fixtures::bot_user(),
                projects: Vec::new(),
                agents: Vec::new(),
                placeholders: fixtures::placeholders(),
                logs: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.lock().projects = projects;
        self
    }

    pub fn with_agents(self, agents: Vec<Agent>) -> Self {
        self.lock().agents = agents;
        self
    }

    pub fn with_placeholders(self, placeholders: Vec<Agent>) -> Self {
        self.lock().placeholders = placeholders;
        self
    }

    pub fn with_logs(self, logs: Vec<JobLog>) -> Self {
        self.lock().logs = logs;
        self
    }

    /// Make `endpoint` reject with `message` (HTTP 500).
    pub fn fail(&self, endpoint: ApiEndpoint, message: impl Into<String>) {
        self.lock()
            .failures
            .insert(endpoint, ApiError::new(endpoint, Some(500), message));
    }

    /// Make `endpoint` reject with its fallback message and no status.
    pub fn fail_transport(&self, endpoint: ApiEndpoint) {
        self.lock().failures.insert(endpoint, ApiError::fallback(endpoint));
    }

    pub fn recover(&self, endpoint: ApiEndpoint) {
        self.lock().failures.remove(&endpoint);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn calls_to(&self, endpoint: ApiEndpoint) -> Vec<ApiCall> {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .cloned()
            .collect()
    }

    pub fn call_count(&self, endpoint: ApiEndpoint) -> usize {
        self.calls_to(endpoint).len()
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.lock().agents.clone()
    }

    fn record(
        &self,
        endpoint: ApiEndpoint,
        token: Option<&str>,
        detail: String,
    ) -> Result<MutexGuard<'_, MockState>, ApiError> {
        let mut state = self.lock();
        state.calls.push(ApiCall {
            endpoint,
            token: token.map(str::to_string),
            detail,
        });
        if let Some(err) = state.failures.get(&endpoint).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

impl Default for MockConsoleApi {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(endpoint: ApiEndpoint, what: &str) -> ApiError {
    ApiError::new(endpoint, Some(404), format!("{} not found", what))
}

#[async_trait]
impl ConsoleApi for MockConsoleApi {
    async fn authorization_url(&self) -> ApiResult<AuthorizeResponse> {
        let state = self.record(ApiEndpoint::AuthorizationUrl, None, String::new())?;
        Ok(AuthorizeResponse {
            authorization_url: state.authorization_url.clone(),
        })
    }

    async fn exchange_code(&self, code: &str) -> ApiResult<AuthResponse> {
        let state = self.record(ApiEndpoint::ExchangeCode, None, code.to_string())?;
        Ok(state.auth.clone())
    }

    async fn logout(&self, token: &str) -> ApiResult<LogoutResponse> {
        let _state = self.record(ApiEndpoint::Logout, Some(token), String::new())?;
        Ok(LogoutResponse {
            message: "Logged out".to_string(),
        })
    }

    async fn search_projects(&self, token: &str, query: &str) -> ApiResult<ProjectSearchResponse> {
        let state = self.record(ApiEndpoint::SearchProjects, Some(token), query.to_string())?;
        let needle = query.to_lowercase();
        let items: Vec<Project> = state
            .projects
            .iter()
            .filter(|project| project.name_with_namespace.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(ProjectSearchResponse {
            total: items.len() as u64,
            items,
            bot_user: state.bot_user.clone(),
        })
    }

    async fn get_project(&self, token: &str, project_id: ProjectId) -> ApiResult<ProjectDetailResponse> {
        let state = self.record(ApiEndpoint::GetProject, Some(token), project_id.to_string())?;
        state
            .projects
            .iter()
            .find(|project| project.id == project_id)
            .cloned()
            .map(|project| ProjectDetailResponse { project })
            .ok_or_else(|| not_found(ApiEndpoint::GetProject, "Project"))
    }

    async fn list_agents(&self, token: &str, project_id: ProjectId) -> ApiResult<AgentsListResponse> {
        let state = self.record(ApiEndpoint::ListAgents, Some(token), project_id.to_string())?;
        Ok(AgentsListResponse {
            total: state.agents.len() as u64,
            agents: state.agents.clone(),
        })
    }

    async fn list_agent_placeholders(
        &self,
        token: &str,
        project_id: ProjectId,
    ) -> ApiResult<AgentsListResponse> {
        let state = self.record(
            ApiEndpoint::ListAgentPlaceholders,
            Some(token),
            project_id.to_string(),
        )?;
        Ok(AgentsListResponse {
            total: state.placeholders.len() as u64,
            agents: state.placeholders.clone(),
        })
    }

    async fn get_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
    ) -> ApiResult<AgentDetailResponse> {
        let state = self.record(
            ApiEndpoint::GetAgent,
            Some(token),
            format!("{}/{}", project_id, agent_id),
        )?;
        state
            .agents
            .iter()
            .find(|agent| agent.id == agent_id)
            .cloned()
            .map(|agent| AgentDetailResponse { agent })
            .ok_or_else(|| not_found(ApiEndpoint::GetAgent, "Agent"))
    }

    async fn create_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        draft: &AgentDraft,
    ) -> ApiResult<AgentDetailResponse> {
        let mut state = self.record(ApiEndpoint::CreateAgent, Some(token), project_id.to_string())?;
        let now = Utc::now();
        let agent = Agent {
            id: Uuid::new_v4(),
            agent_type: draft.agent_type,
            engine: draft.engine,
            name: draft.name.clone(),
            description: draft.description.clone(),
            enabled: draft.enabled,
            config: draft.config.clone(),
            created_at: now,
            updated_at: now,
        };
        state.agents.push(agent.clone());
        Ok(AgentDetailResponse { agent })
    }

    async fn update_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        draft: &AgentDraft,
    ) -> ApiResult<AgentDetailResponse> {
        let mut state = self.record(
            ApiEndpoint::UpdateAgent,
            Some(token),
            format!("{}/{}", project_id, agent_id),
        )?;
        let agent = state
            .agents
            .iter_mut()
            .find(|agent| agent.id == agent_id)
            .ok_or_else(|| not_found(ApiEndpoint::UpdateAgent, "Agent"))?;
        agent.name = draft.name.clone();
        agent.description = draft.description.clone();
        agent.enabled = draft.enabled;
        agent.config = draft.config.clone();
        agent.updated_at = Utc::now();
        Ok(AgentDetailResponse {
            agent: agent.clone(),
        })
    }

    async fn list_agent_logs(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        limit: u32,
    ) -> ApiResult<AgentLogsResponse> {
        let state = self.record(
            ApiEndpoint::ListAgentLogs,
            Some(token),
            format!("{}/{}?limit={}", project_id, agent_id, limit),
        )?;
        let logs: Vec<JobLog> = state.logs.iter().take(limit as usize).cloned().collect();
        Ok(AgentLogsResponse {
            total: state.logs.len() as u64,
            logs,
        })
    }

    async fn get_job_log(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        job_id: JobId,
    ) -> ApiResult<JobLog> {
        let state = self.record(
            ApiEndpoint::GetJobLog,
            Some(token),
            format!("{}/{}/{}", project_id, agent_id, job_id),
        )?;
        state
            .logs
            .iter()
            .find(|log| log.job_id == job_id)
            .cloned()
            .ok_or_else(|| not_found(ApiEndpoint::GetJobLog, "Job log"))
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for locations and agent records.

    use super::*;
    use proptest::prelude::*;

    /// Any agent type.
    pub fn arb_agent_type() -> impl Strategy<Value = AgentType> {
        prop_oneof![Just(AgentType::MrDescriber), Just(AgentType::MrReviewer)]
    }

    /// Agent id outside the placeholder range.
    pub fn arb_real_agent_id() -> impl Strategy<Value = Uuid> {
        any::<u128>()
            .prop_filter("placeholder range", |raw| raw >> 48 != 0)
            .prop_map(Uuid::from_u128)
    }

    /// Agent id inside the placeholder range.
    pub fn arb_placeholder_id() -> impl Strategy<Value = Uuid> {
        (1u128..(1u128 << 48)).prop_map(Uuid::from_u128)
    }

    pub fn arb_project_id() -> impl Strategy<Value = ProjectId> {
        1u64..10_000_000
    }

    /// A path segment that is neither digits, a uuid nor a route keyword.
    pub fn arb_word_segment() -> impl Strategy<Value = String> {
        "[a-z][a-z_-]{0,11}".prop_filter("route keyword", |s| {
            !matches!(s.as_str(), "project" | "agents" | "logs" | "new" | "auth" | "callback")
        })
    }

    /// Paths that no specific route claims.
    pub fn arb_unmatched_path() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::collection::vec(arb_word_segment(), 0..4)
                .prop_map(|segments| format!("/{}", segments.join("/"))),
            arb_word_segment().prop_map(|s| format!("/project/{}", s)),
            (arb_project_id(), arb_word_segment())
                .prop_map(|(id, s)| format!("/project/{}/{}", id, s)),
            (arb_project_id(), arb_word_segment())
                .prop_map(|(id, s)| format!("/project/{}/agents/{}", id, s)),
            arb_project_id().prop_map(|id| format!("/project/{}/agents", id)),
            arb_project_id().prop_map(|id| format!("/project/{}/", id)),
            arb_project_id().prop_map(|id| format!("//project//{}", id)),
        ]
    }

    /// Query values that survive percent-encoding unchanged in meaning.
    pub fn arb_query_value() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _.-]{1,24}"
    }

    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    /// A real (persisted) agent of the given type.
    pub fn arb_real_agent(agent_type: AgentType) -> impl Strategy<Value = Agent> {
        (arb_real_agent_id(), "[A-Za-z ]{1,20}", any::<bool>(), arb_timestamp()).prop_map(
            move |(id, name, enabled, created_at)| Agent {
                id,
                enabled,
                name,
                created_at,
                updated_at: created_at,
                ..fixtures::agent_of(agent_type)
            },
        )
    }

    /// A list of real agents with distinct ids, zero or one per type.
    pub fn arb_real_agents() -> impl Strategy<Value = Vec<Agent>> {
        prop::collection::vec(arb_agent_type(), 0..=2).prop_flat_map(|types| {
            let mut distinct = types;
            distinct.sort();
            distinct.dedup();
            distinct
                .into_iter()
                .map(arb_real_agent)
                .collect::<Vec<_>>()
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common scenarios.

    use super::*;

    pub const SESSION_TOKEN: &str = "test-session-token";
    pub const AUTHORIZATION_URL: &str =
        "https://gitlab.example.com/oauth/authorize?client_id=codeair&response_type=code";

    fn epoch() -> Timestamp {
        chrono::DateTime::from_timestamp(1_714_564_800, 0).unwrap_or_else(Utc::now)
    }

    pub fn user() -> User {
        User {
            id: 42,
            username: "ada".to_string(),
            name: "Ada Lovelace".to_string(),
            web_url: "https://gitlab.example.com/ada".to_string(),
            avatar_url: None,
        }
    }

    pub fn bot_user() -> User {
        User {
            id: 7,
            username: "codeair-bot".to_string(),
            name: "CodeAir Bot".to_string(),
            web_url: "https://gitlab.example.com/codeair-bot".to_string(),
            avatar_url: None,
        }
    }

    pub fn project(id: ProjectId, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            name_with_namespace: format!("Acme / {}", name),
            path: name.to_lowercase(),
            path_with_namespace: format!("acme/{}", name.to_lowercase()),
            description: Some(format!("The {} project", name)),
            visibility: "private".to_string(),
            web_url: format!("https://gitlab.example.com/acme/{}", name.to_lowercase()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            last_activity_at: "2024-05-01T00:00:00Z".to_string(),
            avatar_url: None,
        }
    }

    /// Template fields for an agent type, with a nil id.
    pub fn agent_of(agent_type: AgentType) -> Agent {
        let (name, description) = match agent_type {
            AgentType::MrDescriber => ("MR Describer", "Writes merge request descriptions"),
            AgentType::MrReviewer => ("MR Code Reviewer", "Reviews merge request changes"),
        };
        Agent {
            id: Uuid::nil(),
            agent_type,
            engine: AgentEngine::PrAgent,
            name: name.to_string(),
            description: description.to_string(),
            enabled: true,
            config: AgentConfig {
                provider: AgentProvider::Anthropic,
                model: "claude-3-5-sonnet-20241022".to_string(),
                token: String::new(),
                prompt: None,
                external_url: None,
            },
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    /// Placeholder template: ids `...0001` and `...0002` by type.
    pub fn placeholder(agent_type: AgentType) -> Agent {
        let index = match agent_type {
            AgentType::MrDescriber => 1,
            AgentType::MrReviewer => 2,
        };
        Agent {
            id: Uuid::from_u128(index),
            ..agent_of(agent_type)
        }
    }

    /// Both templates in server order.
    pub fn placeholders() -> Vec<Agent> {
        AgentType::all().iter().map(|t| placeholder(*t)).collect()
    }

    /// A configured agent with a fresh id and a stored token.
    pub fn agent(agent_type: AgentType) -> Agent {
        let mut agent = agent_of(agent_type);
        agent.id = Uuid::new_v4();
        agent.config.token = "sk-stored-token".to_string();
        agent
    }

    pub fn job_log(job_id: JobId) -> JobLog {
        JobLog {
            job_id,
            mr_url: format!("https://gitlab.example.com/acme/app/-/merge_requests/{}", job_id),
            created_at: epoch(),
            started_at: Some(epoch()),
            ended_at: Some(epoch() + chrono::Duration::milliseconds(61_500)),
            exit_code: Some(0),
            stdout: Some("\u{1b}[32mok\u{1b}[0m review posted".to_string()),
            stderr: None,
            elapsed_ms: Some(61_500),
        }
    }

    pub fn draft_for(agent_type: AgentType) -> AgentDraft {
        let mut draft = AgentDraft::from_agent(&agent_of(agent_type));
        draft.config.token = "sk-new-token".to_string();
        draft
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over API results.

    use super::*;

    pub fn assert_api_error<T: std::fmt::Debug>(result: &ApiResult<T>, message: &str) {
        match result {
            Err(err) => assert_eq!(err.message, message, "unexpected error message"),
            Ok(value) => panic!("Expected API error '{}', got Ok({:?})", message, value),
        }
    }

    pub fn assert_no_calls(api: &MockConsoleApi) {
        let calls = api.calls();
        assert!(calls.is_empty(), "Expected no API calls, got {:?}", calls);
    }

    pub fn assert_called_once(api: &MockConsoleApi, endpoint: ApiEndpoint) {
        let count = api.call_count(endpoint);
        assert_eq!(count, 1, "Expected exactly one call to {}, got {}", endpoint, count);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_placeholder_fixtures_in_placeholder_range() {
        for placeholder in fixtures::placeholders() {
            assert!(placeholder.is_placeholder());
        }
        assert!(!fixtures::agent(AgentType::MrReviewer).is_placeholder());
    }

    #[tokio::test]
    async fn test_mock_records_and_fails() {
        let api = MockConsoleApi::new().with_projects(vec![
            fixtures::project(1, "Rocket"),
            fixtures::project(2, "Garden"),
        ]);

        let found = api.search_projects("t", "rock").await.unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.items[0].id, 1);

        api.fail(ApiEndpoint::GetProject, "boom");
        let result = api.get_project("t", 1).await;
        assertions::assert_api_error(&result, "boom");

        api.recover(ApiEndpoint::GetProject);
        assert!(api.get_project("t", 2).await.is_ok());
        assert_eq!(api.call_count(ApiEndpoint::GetProject), 2);
        assert_eq!(api.calls()[0].detail, "rock");
    }

    #[tokio::test]
    async fn test_mock_create_then_update() {
        let api = MockConsoleApi::new();
        let created = api
            .create_agent("t", 1, &fixtures::draft_for(AgentType::MrDescriber))
            .await
            .unwrap()
            .agent;
        assert!(!created.is_placeholder());

        let mut draft = fixtures::draft_for(AgentType::MrDescriber);
        draft.name = "Renamed".to_string();
        let updated = api.update_agent("t", 1, created.id, &draft).await.unwrap().agent;
        assert_eq!(updated.name, "Renamed");
        assert_eq!(api.agents().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_logout_records_token() {
        let api = MockConsoleApi::new();
        assert!(api.logout("tok").await.is_ok());

        api.fail(ApiEndpoint::Logout, "expired");
        assertions::assert_api_error(&api.logout("tok").await, "expired");

        let calls = api.calls_to(ApiEndpoint::Logout);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].token.as_deref(), Some("tok"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_real_ids_never_placeholders(id in generators::arb_real_agent_id()) {
            prop_assert!(!codeair_core::is_placeholder_id(&id));
        }

        #[test]
        fn prop_placeholder_ids_in_range(id in generators::arb_placeholder_id()) {
            prop_assert!(codeair_core::is_placeholder_id(&id));
        }

        #[test]
        fn prop_real_agent_lists_have_distinct_types(agents in generators::arb_real_agents()) {
            let mut types: Vec<_> = agents.iter().map(|a| a.agent_type).collect();
            let before = types.len();
            types.dedup();
            prop_assert_eq!(before, types.len());
        }
    }
}

//! Async load execution.
//!
//! Views describe what they need as a [`LoadRequest`]; the event loop wraps it
//! in a [`LoadJob`] with the session token, runs it on a spawned task and
//! sends the [`LoadOutcome`] back to the UI loop.

use crate::load_state::Ticket;
use codeair_core::{
    Agent, AgentDraft, AgentId, AgentLogsResponse, ApiEndpoint, ApiError, AuthResponse,
    AuthorizeResponse, ConsoleApi, JobId, JobLog, LogoutResponse, Project, ProjectId,
    ProjectSearchResponse,
};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    AuthorizationUrl,
    ExchangeCode {
        code: String,
    },
    Logout,
    SearchProjects {
        query: String,
    },
    Project {
        project_id: ProjectId,
    },
    Agents {
        project_id: ProjectId,
    },
    Placeholders {
        project_id: ProjectId,
    },
    Agent {
        project_id: ProjectId,
        agent_id: AgentId,
    },
    JobLogs {
        project_id: ProjectId,
        agent_id: AgentId,
        limit: u32,
    },
    JobLog {
        project_id: ProjectId,
        agent_id: AgentId,
        job_id: JobId,
    },
    CreateAgent {
        project_id: ProjectId,
        draft: AgentDraft,
    },
    UpdateAgent {
        project_id: ProjectId,
        agent_id: AgentId,
        draft: AgentDraft,
    },
}

impl LoadRequest {
    pub fn endpoint(&self) -> ApiEndpoint {
        match self {
            LoadRequest::AuthorizationUrl => ApiEndpoint::AuthorizationUrl,
            LoadRequest::ExchangeCode { .. } => ApiEndpoint::ExchangeCode,
            LoadRequest::Logout => ApiEndpoint::Logout,
            LoadRequest::SearchProjects { .. } => ApiEndpoint::SearchProjects,
            LoadRequest::Project { .. } => ApiEndpoint::GetProject,
            LoadRequest::Agents { .. } => ApiEndpoint::ListAgents,
            LoadRequest::Placeholders { .. } => ApiEndpoint::ListAgentPlaceholders,
            LoadRequest::Agent { .. } => ApiEndpoint::GetAgent,
            LoadRequest::JobLogs { .. } => ApiEndpoint::ListAgentLogs,
            LoadRequest::JobLog { .. } => ApiEndpoint::GetJobLog,
            LoadRequest::CreateAgent { .. } => ApiEndpoint::CreateAgent,
            LoadRequest::UpdateAgent { .. } => ApiEndpoint::UpdateAgent,
        }
    }

    fn needs_session(&self) -> bool {
        !matches!(
            self,
            LoadRequest::AuthorizationUrl | LoadRequest::ExchangeCode { .. }
        )
    }
}

/// A request bound to its ticket and the token captured when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadJob {
    pub ticket: Ticket,
    pub token: Option<String>,
    pub request: LoadRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPayload {
    Authorize(AuthorizeResponse),
    Auth(AuthResponse),
    LoggedOut(LogoutResponse),
    Projects(ProjectSearchResponse),
    Project(Project),
    Agents(Vec<Agent>),
    Agent(Agent),
    JobLogs(AgentLogsResponse),
    JobLog(Box<JobLog>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub ticket: Ticket,
    pub endpoint: ApiEndpoint,
    pub result: Result<LoadPayload, ApiError>,
}

impl LoadOutcome {
    /// Narrow the payload to what a slot expects. A payload of the wrong
    /// shape is reported as the endpoint's fallback failure.
    pub fn into_result<T>(self, extract: impl FnOnce(LoadPayload) -> Option<T>) -> Result<T, String> {
        let fallback = self.endpoint.fallback_message();
        match self.result {
            Ok(payload) => extract(payload).ok_or_else(|| fallback.to_string()),
            Err(err) => Err(err.message),
        }
    }
}

/// Execute one job against the API.
pub async fn run(api: &dyn ConsoleApi, job: LoadJob) -> LoadOutcome {
    let LoadJob {
        ticket,
        token,
        request,
    } = job;
    let endpoint = request.endpoint();
    tracing::debug!(endpoint = %endpoint, request_id = ticket.request_id, "Load started");

    let token = match (request.needs_session(), token) {
        (true, None) => {
            return LoadOutcome {
                ticket,
                endpoint,
                result: Err(ApiError::new(endpoint, Some(401), "Not signed in")),
            };
        }
        (_, token) => token.unwrap_or_default(),
    };

    let result = match request {
        LoadRequest::AuthorizationUrl => api.authorization_url().await.map(LoadPayload::Authorize),
        LoadRequest::ExchangeCode { code } => api.exchange_code(&code).await.map(LoadPayload::Auth),
        LoadRequest::Logout => api.logout(&token).await.map(LoadPayload::LoggedOut),
        LoadRequest::SearchProjects { query } => api
            .search_projects(&token, &query)
            .await
            .map(LoadPayload::Projects),
        LoadRequest::Project { project_id } => api
            .get_project(&token, project_id)
            .await
            .map(|r| LoadPayload::Project(r.project)),
        LoadRequest::Agents { project_id } => api
            .list_agents(&token, project_id)
            .await
            .map(|r| LoadPayload::Agents(r.agents)),
        LoadRequest::Placeholders { project_id } => api
            .list_agent_placeholders(&token, project_id)
            .await
            .map(|r| LoadPayload::Agents(r.agents)),
        LoadRequest::Agent {
            project_id,
            agent_id,
        } => api
            .get_agent(&token, project_id, agent_id)
            .await
            .map(|r| LoadPayload::Agent(r.agent)),
        LoadRequest::JobLogs {
            project_id,
            agent_id,
            limit,
        } => api
            .list_agent_logs(&token, project_id, agent_id, limit)
            .await
            .map(LoadPayload::JobLogs),
        LoadRequest::JobLog {
            project_id,
            agent_id,
            job_id,
        } => api
            .get_job_log(&token, project_id, agent_id, job_id)
            .await
            .map(|log| LoadPayload::JobLog(Box::new(log))),
        LoadRequest::CreateAgent { project_id, draft } => api
            .create_agent(&token, project_id, &draft)
            .await
            .map(|r| LoadPayload::Agent(r.agent)),
        LoadRequest::UpdateAgent {
            project_id,
            agent_id,
            draft,
        } => api
            .update_agent(&token, project_id, agent_id, &draft)
            .await
            .map(|r| LoadPayload::Agent(r.agent)),
    };

    match &result {
        Ok(_) => tracing::debug!(endpoint = %endpoint, request_id = ticket.request_id, "Load completed"),
        Err(err) => tracing::debug!(
            endpoint = %endpoint,
            request_id = ticket.request_id,
            status = ?err.status,
            error = %err,
            "Load failed"
        ),
    }

    LoadOutcome {
        ticket,
        endpoint,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_state::LoadSlot;
    use codeair_test_utils::{fixtures, MockConsoleApi};

    #[tokio::test]
    async fn test_run_without_token_rejects_locally() {
        let api = MockConsoleApi::new();
        let mut slot: LoadSlot<Project> = LoadSlot::new();
        let job = LoadJob {
            ticket: slot.begin("1"),
            token: None,
            request: LoadRequest::Project { project_id: 1 },
        };
        let outcome = run(&api, job).await;
        assert!(outcome.result.is_err());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_run_maps_payload() {
        let api = MockConsoleApi::new().with_projects(vec![fixtures::project(3, "Rocket")]);
        let mut slot: LoadSlot<Project> = LoadSlot::new();
        let job = LoadJob {
            ticket: slot.begin("3"),
            token: Some(fixtures::SESSION_TOKEN.to_string()),
            request: LoadRequest::Project { project_id: 3 },
        };
        let outcome = run(&api, job).await;
        let project = outcome
            .into_result(|payload| match payload {
                LoadPayload::Project(project) => Some(project),
                _ => None,
            })
            .unwrap();
        assert_eq!(project.name, "Rocket");
    }

    #[tokio::test]
    async fn test_wrong_payload_shape_uses_fallback() {
        let api = MockConsoleApi::new();
        let mut slot: LoadSlot<Project> = LoadSlot::new();
        let job = LoadJob {
            ticket: slot.begin("auth"),
            token: None,
            request: LoadRequest::AuthorizationUrl,
        };
        let outcome = run(&api, job).await;
        let result: Result<Project, String> = outcome.into_result(|_| None);
        assert_eq!(result.unwrap_err(), "Failed to get login URL");
    }
}

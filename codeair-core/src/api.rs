//! The remote API as seen by the console.
//!
//! Implemented over HTTP by the console crate and by a recording mock in the
//! test utilities. Every method resolves to an [`ApiError`] carrying a
//! user-facing message on rejection.

use crate::agent::{AgentDetailResponse, AgentDraft, AgentsListResponse};
use crate::error::ApiError;
use crate::identity::{AgentId, JobId, ProjectId};
use crate::job_log::{AgentLogsResponse, JobLog};
use crate::project::{ProjectDetailResponse, ProjectSearchResponse};
use crate::user::{AuthResponse, AuthorizeResponse, LogoutResponse};
use async_trait::async_trait;

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// URL the user must visit to start the OAuth flow.
    async fn authorization_url(&self) -> ApiResult<AuthorizeResponse>;

    /// Exchange an OAuth authorization code for a session token.
    async fn exchange_code(&self, code: &str) -> ApiResult<AuthResponse>;

    async fn logout(&self, token: &str) -> ApiResult<LogoutResponse>;

    async fn search_projects(&self, token: &str, query: &str) -> ApiResult<ProjectSearchResponse>;

    async fn get_project(&self, token: &str, project_id: ProjectId)
        -> ApiResult<ProjectDetailResponse>;

    async fn list_agents(&self, token: &str, project_id: ProjectId)
        -> ApiResult<AgentsListResponse>;

    /// Templates for agent types, identified by the placeholder id range.
    async fn list_agent_placeholders(
        &self,
        token: &str,
        project_id: ProjectId,
    ) -> ApiResult<AgentsListResponse>;

    async fn get_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
    ) -> ApiResult<AgentDetailResponse>;

    async fn create_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        draft: &AgentDraft,
    ) -> ApiResult<AgentDetailResponse>;

    async fn update_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        draft: &AgentDraft,
    ) -> ApiResult<AgentDetailResponse>;

    async fn list_agent_logs(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        limit: u32,
    ) -> ApiResult<AgentLogsResponse>;

    async fn get_job_log(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        job_id: JobId,
    ) -> ApiResult<JobLog>;
}

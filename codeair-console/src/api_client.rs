//! REST client for the CodeAir API.

use crate::config::ConsoleConfig;
use async_trait::async_trait;
use codeair_core::{
    AgentDetailResponse, AgentDraft, AgentId, AgentLogsResponse, AgentsListResponse, ApiEndpoint,
    ApiError, ApiResult, AuthResponse, AuthorizeResponse, ConsoleApi, JobId, JobLog,
    LogoutResponse, ProjectDetailResponse, ProjectId, ProjectSearchResponse,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiClientError> {
        Self::with_base_url(
            &config.api_base_url,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ApiClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiClientError::Config("api base url is empty".to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T, Q>(
        &self,
        endpoint: ApiEndpoint,
        token: Option<&str>,
        path: &str,
        query: Option<&Q>,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.request(Method::GET, path, token);
        if let Some(query) = query {
            request = request.query(query);
        }
        self.execute(endpoint, request).await
    }

    async fn send_json<T, B>(
        &self,
        endpoint: ApiEndpoint,
        method: Method,
        token: &str,
        path: &str,
        body: &B,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(method, path, Some(token)).json(body);
        self.execute(endpoint, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: ApiEndpoint,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let response = request.send().await.map_err(|err| {
            tracing::warn!(endpoint = %endpoint, error = %err, "Request failed to send");
            ApiError::fallback(endpoint)
        })?;
        parse_response(endpoint, response).await
    }
}

async fn parse_response<T: DeserializeOwned>(
    endpoint: ApiEndpoint,
    response: reqwest::Response,
) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(|err| {
            tracing::warn!(endpoint = %endpoint, error = %err, "Failed to decode response");
            ApiError::fallback(endpoint)
        });
    }
    let text = response.text().await.unwrap_or_default();
    tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "API rejected request");
    Err(ApiError::from_response(endpoint, status.as_u16(), &text))
}

#[async_trait]
impl ConsoleApi for RestClient {
    async fn authorization_url(&self) -> ApiResult<AuthorizeResponse> {
        self.get_json::<_, ()>(ApiEndpoint::AuthorizationUrl, None, "/auth/gitlab/authorize", None)
            .await
    }

    async fn exchange_code(&self, code: &str) -> ApiResult<AuthResponse> {
        self.get_json(
            ApiEndpoint::ExchangeCode,
            None,
            "/auth/gitlab/callback",
            Some(&[("code", code)]),
        )
        .await
    }

    async fn logout(&self, token: &str) -> ApiResult<LogoutResponse> {
        let request = self.request(Method::POST, "/auth/logout", Some(token));
        self.execute(ApiEndpoint::Logout, request).await
    }

    async fn search_projects(&self, token: &str, query: &str) -> ApiResult<ProjectSearchResponse> {
        self.get_json(
            ApiEndpoint::SearchProjects,
            Some(token),
            "/projects/search",
            Some(&[("q", query)]),
        )
        .await
    }

    async fn get_project(&self, token: &str, project_id: ProjectId) -> ApiResult<ProjectDetailResponse> {
        let path = format!("/projects/{}", project_id);
        self.get_json::<_, ()>(ApiEndpoint::GetProject, Some(token), &path, None)
            .await
    }

    async fn list_agents(&self, token: &str, project_id: ProjectId) -> ApiResult<AgentsListResponse> {
        let path = format!("/projects/{}/agents", project_id);
        self.get_json::<_, ()>(ApiEndpoint::ListAgents, Some(token), &path, None)
            .await
    }

    async fn list_agent_placeholders(
        &self,
        token: &str,
        project_id: ProjectId,
    ) -> ApiResult<AgentsListResponse> {
        let path = format!("/projects/{}/agents/placeholders", project_id);
        self.get_json::<_, ()>(ApiEndpoint::ListAgentPlaceholders, Some(token), &path, None)
            .await
    }

    async fn get_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
    ) -> ApiResult<AgentDetailResponse> {
        let path = format!("/projects/{}/agents/{}", project_id, agent_id);
        self.get_json::<_, ()>(ApiEndpoint::GetAgent, Some(token), &path, None)
            .await
    }

    async fn create_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        draft: &AgentDraft,
    ) -> ApiResult<AgentDetailResponse> {
        let path = format!("/projects/{}/agents", project_id);
        self.send_json(ApiEndpoint::CreateAgent, Method::POST, token, &path, draft)
            .await
    }

    async fn update_agent(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        draft: &AgentDraft,
    ) -> ApiResult<AgentDetailResponse> {
        let path = format!("/projects/{}/agents/{}", project_id, agent_id);
        self.send_json(ApiEndpoint::UpdateAgent, Method::PATCH, token, &path, draft)
            .await
    }

    async fn list_agent_logs(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        limit: u32,
    ) -> ApiResult<AgentLogsResponse> {
        let path = format!("/projects/{}/agents/{}/logs", project_id, agent_id);
        self.get_json(
            ApiEndpoint::ListAgentLogs,
            Some(token),
            &path,
            Some(&[("limit", limit)]),
        )
        .await
    }

    async fn get_job_log(
        &self,
        token: &str,
        project_id: ProjectId,
        agent_id: AgentId,
        job_id: JobId,
    ) -> ApiResult<JobLog> {
        let path = format!("/projects/{}/agents/{}/logs/{}", project_id, agent_id, job_id);
        self.get_json::<_, ()>(ApiEndpoint::GetJobLog, Some(token), &path, None)
            .await
    }
}

//! Error types for CodeAir API calls

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Every remote operation the console performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiEndpoint {
    AuthorizationUrl,
    ExchangeCode,
    Logout,
    SearchProjects,
    GetProject,
    ListAgents,
    ListAgentPlaceholders,
    GetAgent,
    CreateAgent,
    UpdateAgent,
    ListAgentLogs,
    GetJobLog,
}

impl ApiEndpoint {
    /// Message used when the server gives no usable error body.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            ApiEndpoint::AuthorizationUrl => "Failed to get login URL",
            ApiEndpoint::ExchangeCode => "Failed to authenticate",
            ApiEndpoint::Logout => "Failed to logout",
            ApiEndpoint::SearchProjects => "Failed to search projects",
            ApiEndpoint::GetProject => "Failed to load project",
            ApiEndpoint::ListAgents => "Failed to load agents",
            ApiEndpoint::ListAgentPlaceholders => "Failed to load agent templates",
            ApiEndpoint::GetAgent => "Failed to load agent",
            ApiEndpoint::CreateAgent => "Failed to create agent",
            ApiEndpoint::UpdateAgent => "Failed to update agent",
            ApiEndpoint::ListAgentLogs => "Failed to load logs",
            ApiEndpoint::GetJobLog => "Failed to load run log",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiEndpoint::AuthorizationUrl => "authorization_url",
            ApiEndpoint::ExchangeCode => "exchange_code",
            ApiEndpoint::Logout => "logout",
            ApiEndpoint::SearchProjects => "search_projects",
            ApiEndpoint::GetProject => "get_project",
            ApiEndpoint::ListAgents => "list_agents",
            ApiEndpoint::ListAgentPlaceholders => "list_agent_placeholders",
            ApiEndpoint::GetAgent => "get_agent",
            ApiEndpoint::CreateAgent => "create_agent",
            ApiEndpoint::UpdateAgent => "update_agent",
            ApiEndpoint::ListAgentLogs => "list_agent_logs",
            ApiEndpoint::GetJobLog => "get_job_log",
        }
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected API call. Displays as the user-facing message only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub endpoint: ApiEndpoint,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(endpoint: ApiEndpoint, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            endpoint,
            status,
            message: message.into(),
        }
    }

    /// Transport or decode failure: no server message is available.
    pub fn fallback(endpoint: ApiEndpoint) -> Self {
        Self::new(endpoint, None, endpoint.fallback_message())
    }

    /// Build the error for a non-2xx response, preferring the server's
    /// envelope message over the endpoint fallback.
    pub fn from_response(endpoint: ApiEndpoint, status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|envelope| envelope.error.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| endpoint.fallback_message().to_string());
        Self::new(endpoint, Some(status), message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

/// Standard error body: `{"error": {"code", "message", "details"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_message_wins() {
        let body = r#"{"error":{"code":"not_found","message":"Project not found","details":null}}"#;
        let err = ApiError::from_response(ApiEndpoint::GetProject, 404, body);
        assert_eq!(err.message, "Project not found");
        assert_eq!(err.status, Some(404));
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn test_unparseable_body_uses_fallback() {
        let err = ApiError::from_response(ApiEndpoint::ListAgents, 502, "<html>Bad Gateway</html>");
        assert_eq!(err.message, "Failed to load agents");
    }

    #[test]
    fn test_blank_envelope_message_uses_fallback() {
        let body = r#"{"error":{"code":"x","message":"  "}}"#;
        let err = ApiError::from_response(ApiEndpoint::CreateAgent, 400, body);
        assert_eq!(err.message, "Failed to create agent");
    }

    #[test]
    fn test_fallback_has_no_status() {
        let err = ApiError::fallback(ApiEndpoint::ExchangeCode);
        assert_eq!(err.status, None);
        assert_eq!(err.message, "Failed to authenticate");
        assert!(!err.is_unauthorized());
    }
}

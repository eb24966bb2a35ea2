//! Source-control project payloads.

use crate::identity::ProjectId;
use crate::user::User;
use serde::{Deserialize, Serialize};

/// A GitLab project. Timestamps are kept verbatim; they are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub name_with_namespace: String,
    pub path: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub description: Option<String>,
    pub visibility: String,
    pub web_url: String,
    pub created_at: String,
    pub last_activity_at: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Project {
    /// Console location of the project page.
    pub fn href(&self) -> String {
        format!("/project/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDetailResponse {
    pub project: Project,
}

/// Search results plus the bot account that must be a project member for
/// agents to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSearchResponse {
    pub total: u64,
    pub items: Vec<Project>,
    pub bot_user: User,
}

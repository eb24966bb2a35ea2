//! CodeAir Core - Console Data Types
//!
//! Wire types shared between the console and its test utilities, plus the
//! small amount of pure logic that operates on them (placeholder merging,
//! agent form validation, job log formatting). No I/O lives here; the remote
//! API is described by the [`ConsoleApi`] trait and implemented elsewhere.

pub mod agent;
pub mod api;
pub mod error;
pub mod identity;
pub mod job_log;
pub mod project;
pub mod user;

pub use agent::{
    merge_placeholders, Agent, AgentConfig, AgentDetailResponse, AgentDraft, AgentEngine,
    AgentField, AgentProvider, AgentType, AgentsListResponse, ParseEnumError, ValidationErrors,
};
pub use api::{ApiResult, ConsoleApi};
pub use error::{ApiEndpoint, ApiError, ErrorBody, ErrorEnvelope};
pub use identity::{
    is_placeholder_id, parse_timestamp, AgentId, JobId, ProjectId, Timestamp,
    PLACEHOLDER_ID_PREFIX,
};
pub use job_log::{
    exit_code_label, extract_mr_id, format_duration, AgentLogsResponse, JobLog, JobStatus,
};
pub use project::{Project, ProjectDetailResponse, ProjectSearchResponse};
pub use user::{AuthResponse, AuthorizeResponse, LogoutResponse, User};

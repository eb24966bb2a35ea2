//! Agent job logs and the formatting used to display them.

use crate::identity::{self, JobId, Timestamp};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static MR_ID_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"merge_requests/(\d+)").ok());

/// One execution of an agent against a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLog {
    pub job_id: JobId,
    #[serde(default)]
    pub mr_url: String,
    #[serde(with = "identity::timestamp")]
    pub created_at: Timestamp,
    #[serde(default, with = "identity::optional_timestamp")]
    pub started_at: Option<Timestamp>,
    #[serde(default, with = "identity::optional_timestamp")]
    pub ended_at: Option<Timestamp>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub elapsed_ms: Option<i64>,
}

impl JobLog {
    pub fn status(&self) -> JobStatus {
        JobStatus::from_times(self.started_at.as_ref(), self.ended_at.as_ref())
    }

    pub fn mr_id(&self) -> String {
        extract_mr_id(&self.mr_url)
    }

    pub fn href(&self, project_id: u64, agent_id: &uuid::Uuid) -> String {
        format!("/project/{}/agents/{}/logs/{}", project_id, agent_id, self.job_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLogsResponse {
    pub total: u64,
    pub logs: Vec<JobLog>,
}

/// Run status derived from the start and end timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Running,
    Finished,
}

impl JobStatus {
    pub fn from_times(started_at: Option<&Timestamp>, ended_at: Option<&Timestamp>) -> Self {
        match (started_at, ended_at) {
            (_, Some(_)) => JobStatus::Finished,
            (Some(_), None) => JobStatus::Running,
            (None, None) => JobStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Running => "Running",
            JobStatus::Finished => "Finished",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge request number from a GitLab MR URL, or `N/A`.
pub fn extract_mr_id(mr_url: &str) -> String {
    MR_ID_PATTERN
        .as_ref()
        .and_then(|re| re.captures(mr_url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Human duration: `850ms`, `42s`, `3m 7s`. Absent values render as `N/A`.
pub fn format_duration(elapsed_ms: Option<i64>) -> String {
    let Some(elapsed_ms) = elapsed_ms else {
        return "N/A".to_string();
    };
    if elapsed_ms < 1000 {
        return format!("{}ms", elapsed_ms);
    }
    let seconds = elapsed_ms / 1000;
    if seconds < 60 {
        return format!("{}s", seconds);
    }
    format!("{}m {}s", seconds / 60, seconds % 60)
}

/// Outcome label for the job list.
pub fn exit_code_label(exit_code: Option<i32>) -> String {
    match exit_code {
        None => "Running".to_string(),
        Some(0) => "Success".to_string(),
        Some(code) => format!("Failed ({})", code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_minutes_format_truncates_millis(seconds in 60i64..1_000_000) {
            let formatted = format_duration(Some(seconds * 1000 + 999));
            prop_assert_eq!(formatted, format!("{}m {}s", seconds / 60, seconds % 60));
        }

        #[test]
        fn prop_mr_id_is_last_number(group in "[a-z]{1,8}", id in 1u64..1_000_000) {
            let url = format!("https://gitlab.com/{}/repo/-/merge_requests/{}", group, id);
            prop_assert_eq!(extract_mr_id(&url), id.to_string());
        }
    }

    #[test]
    fn test_extract_mr_id() {
        assert_eq!(
            extract_mr_id("https://gitlab.com/group/repo/-/merge_requests/123"),
            "123"
        );
        assert_eq!(extract_mr_id("https://gitlab.com/group/repo/-/issues/9"), "N/A");
        assert_eq!(extract_mr_id(""), "N/A");
    }

    #[test]
    fn test_format_duration_boundaries() {
        assert_eq!(format_duration(None), "N/A");
        assert_eq!(format_duration(Some(0)), "0ms");
        assert_eq!(format_duration(Some(999)), "999ms");
        assert_eq!(format_duration(Some(1000)), "1s");
        assert_eq!(format_duration(Some(59_999)), "59s");
        assert_eq!(format_duration(Some(60_000)), "1m 0s");
        assert_eq!(format_duration(Some(187_400)), "3m 7s");
    }

    #[test]
    fn test_status_from_times() {
        let now = Utc::now();
        assert_eq!(JobStatus::from_times(None, None), JobStatus::Pending);
        assert_eq!(JobStatus::from_times(Some(&now), None), JobStatus::Running);
        assert_eq!(JobStatus::from_times(Some(&now), Some(&now)), JobStatus::Finished);
        assert_eq!(JobStatus::from_times(None, Some(&now)), JobStatus::Finished);
    }

    #[test]
    fn test_exit_code_label() {
        assert_eq!(exit_code_label(None), "Running");
        assert_eq!(exit_code_label(Some(0)), "Success");
        assert_eq!(exit_code_label(Some(2)), "Failed (2)");
    }

    #[test]
    fn test_job_log_minimal_payload() {
        let json = r#"{
            "job_id": 17,
            "mr_url": "https://gitlab.com/a/b/-/merge_requests/5",
            "created_at": "2024-05-01T12:00:00",
            "exit_code": null
        }"#;
        let log: JobLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.job_id, 17);
        assert_eq!(log.status(), JobStatus::Pending);
        assert_eq!(log.mr_id(), "5");
        assert!(log.stdout.is_none());
        let agent = uuid::Uuid::from_u128(9);
        assert_eq!(
            log.href(3, &agent),
            "/project/3/agents/00000000-0000-0000-0000-000000000009/logs/17"
        );
    }
}

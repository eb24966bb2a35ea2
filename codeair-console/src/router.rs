//! Route resolution.
//!
//! Session rules come first; the remaining routes are an ordered table of
//! segment patterns matched by a single generic matcher. Anything unmatched
//! lands on the dashboard.

use crate::location::Location;
use codeair_core::{AgentId, JobId, ProjectId};
use uuid::Uuid;

/// Agent addressed by an AgentConfig route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRef {
    New,
    Existing(AgentId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    AuthCallback,
    Login,
    Dashboard {
        query: Option<String>,
    },
    ProjectView {
        project_id: ProjectId,
    },
    AgentConfig {
        project_id: ProjectId,
        agent: AgentRef,
        agent_type: Option<String>,
    },
    JobLogDetail {
        project_id: ProjectId,
        agent_id: AgentId,
        job_id: JobId,
    },
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::AuthCallback => "auth_callback",
            Route::Login => "login",
            Route::Dashboard { .. } => "dashboard",
            Route::ProjectView { .. } => "project",
            Route::AgentConfig { .. } => "agent_config",
            Route::JobLogDetail { .. } => "job_log_detail",
        }
    }
}

/// One path segment pattern. Capturing variants carry their capture name.
#[derive(Debug, Clone, Copy)]
enum Segment {
    Literal(&'static str),
    Digits(&'static str),
    Uuid(&'static str),
    UuidOrNew(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Number(u64),
    Id(Uuid),
    New,
}

#[derive(Debug, Default)]
struct Captures {
    values: Vec<(&'static str, Capture)>,
}

impl Captures {
    fn get(&self, name: &str) -> Option<Capture> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, capture)| *capture)
    }

    fn number(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            Capture::Number(n) => Some(n),
            _ => None,
        }
    }

    fn id(&self, name: &str) -> Option<Uuid> {
        match self.get(name)? {
            Capture::Id(id) => Some(id),
            _ => None,
        }
    }

    fn agent_ref(&self, name: &str) -> Option<AgentRef> {
        match self.get(name)? {
            Capture::Id(id) => Some(AgentRef::Existing(id)),
            Capture::New => Some(AgentRef::New),
            Capture::Number(_) => None,
        }
    }
}

struct RouteEntry {
    pattern: &'static [Segment],
    build: fn(&Captures, &Location) -> Option<Route>,
}

const ROUTES: &[RouteEntry] = &[
    RouteEntry {
        pattern: &[
            Segment::Literal("project"),
            Segment::Digits("project_id"),
            Segment::Literal("agents"),
            Segment::Uuid("agent_id"),
            Segment::Literal("logs"),
            Segment::Digits("job_id"),
        ],
        build: |caps, _| {
            Some(Route::JobLogDetail {
                project_id: caps.number("project_id")?,
                agent_id: caps.id("agent_id")?,
                job_id: caps.number("job_id")?,
            })
        },
    },
    RouteEntry {
        pattern: &[
            Segment::Literal("project"),
            Segment::Digits("project_id"),
            Segment::Literal("agents"),
            Segment::UuidOrNew("agent"),
        ],
        build: |caps, location| {
            Some(Route::AgentConfig {
                project_id: caps.number("project_id")?,
                agent: caps.agent_ref("agent")?,
                agent_type: location.query("type").map(str::to_string),
            })
        },
    },
    RouteEntry {
        pattern: &[Segment::Literal("project"), Segment::Digits("project_id")],
        build: |caps, _| {
            Some(Route::ProjectView {
                project_id: caps.number("project_id")?,
            })
        },
    },
];

pub const CALLBACK_PATH: &str = "/auth/callback";

/// Resolve a location to exactly one route. Pure and total.
pub fn resolve(location: &Location, session_present: bool) -> Route {
    if !session_present {
        if location.path() == CALLBACK_PATH {
            return Route::AuthCallback;
        }
        return Route::Login;
    }

    let segments = location.segments();
    for entry in ROUTES {
        if let Some(captures) = match_segments(entry.pattern, &segments) {
            if let Some(route) = (entry.build)(&captures, location) {
                return route;
            }
        }
    }

    Route::Dashboard {
        query: location
            .query("q")
            .filter(|q| !q.is_empty())
            .map(str::to_string),
    }
}

fn match_segments(pattern: &[Segment], segments: &[&str]) -> Option<Captures> {
    if pattern.len() != segments.len() {
        return None;
    }
    let mut captures = Captures::default();
    for (expected, actual) in pattern.iter().zip(segments) {
        let actual = *actual;
        match *expected {
            Segment::Literal(literal) => {
                if literal != actual {
                    return None;
                }
            }
            Segment::Digits(name) => {
                captures.values.push((name, Capture::Number(parse_digits(actual)?)));
            }
            Segment::Uuid(name) => {
                captures.values.push((name, Capture::Id(parse_canonical_uuid(actual)?)));
            }
            Segment::UuidOrNew(name) => {
                let capture = if actual == "new" {
                    Capture::New
                } else {
                    Capture::Id(parse_canonical_uuid(actual)?)
                };
                captures.values.push((name, capture));
            }
        }
    }
    Some(captures)
}

fn parse_digits(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Accept only the canonical lowercase hyphenated form.
fn parse_canonical_uuid(segment: &str) -> Option<Uuid> {
    if segment.len() != 36 {
        return None;
    }
    let well_formed = segment.bytes().enumerate().all(|(i, b)| match i {
        8 | 13 | 18 | 23 => b == b'-',
        _ => b.is_ascii_digit() || (b'a'..=b'f').contains(&b),
    });
    if !well_formed {
        return None;
    }
    Uuid::parse_str(segment).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AGENT: &str = "6f1c2a9e-1b7d-4c55-9f0a-3e2b1c4d5e6f";

    fn resolve_href(href: &str) -> Route {
        resolve(&Location::parse(href), true)
    }

    #[test]
    fn test_unauthenticated_routes() {
        assert_eq!(resolve(&Location::parse("/project/1"), false), Route::Login);
        assert_eq!(
            resolve(&Location::parse("/auth/callback?code=x"), false),
            Route::AuthCallback
        );
    }

    #[test]
    fn test_callback_with_session_is_dashboard() {
        assert_eq!(
            resolve_href("/auth/callback?code=x"),
            Route::Dashboard { query: None }
        );
    }

    #[test]
    fn test_job_log_detail() {
        let route = resolve_href(&format!("/project/9/agents/{}/logs/31", AGENT));
        assert_eq!(
            route,
            Route::JobLogDetail {
                project_id: 9,
                agent_id: Uuid::parse_str(AGENT).unwrap(),
                job_id: 31,
            }
        );
    }

    #[test]
    fn test_job_log_detail_rejects_new() {
        assert_eq!(
            resolve_href("/project/9/agents/new/logs/31"),
            Route::Dashboard { query: None }
        );
    }

    #[test]
    fn test_agent_config_new_and_existing() {
        assert_eq!(
            resolve_href("/project/4/agents/new?type=mr-describer"),
            Route::AgentConfig {
                project_id: 4,
                agent: AgentRef::New,
                agent_type: Some("mr-describer".to_string()),
            }
        );
        assert_eq!(
            resolve_href(&format!("/project/4/agents/{}", AGENT)),
            Route::AgentConfig {
                project_id: 4,
                agent: AgentRef::Existing(Uuid::parse_str(AGENT).unwrap()),
                agent_type: None,
            }
        );
    }

    #[test]
    fn test_uppercase_uuid_falls_through() {
        let upper = AGENT.to_uppercase();
        assert_eq!(
            resolve_href(&format!("/project/4/agents/{}", upper)),
            Route::Dashboard { query: None }
        );
    }

    #[test]
    fn test_project_view_and_overflow() {
        assert_eq!(resolve_href("/project/77"), Route::ProjectView { project_id: 77 });
        assert_eq!(
            resolve_href("/project/99999999999999999999999"),
            Route::Dashboard { query: None }
        );
        assert_eq!(resolve_href("/project/-1"), Route::Dashboard { query: None });
    }

    #[test]
    fn test_extra_slashes_do_not_match() {
        for href in [
            "/project/5/",
            "//project//5",
            "/project/5///",
            "//project/5",
            "/project/5/agents/new/",
        ] {
            assert_eq!(resolve_href(href), Route::Dashboard { query: None }, "{}", href);
        }
        assert_eq!(resolve_href("/"), Route::Dashboard { query: None });
    }

    #[test]
    fn test_dashboard_query() {
        assert_eq!(
            resolve_href("/?q=rocket"),
            Route::Dashboard {
                query: Some("rocket".to_string())
            }
        );
        assert_eq!(resolve_href("/?q="), Route::Dashboard { query: None });
        assert_eq!(
            resolve_href("/settings?q=x"),
            Route::Dashboard {
                query: Some("x".to_string())
            }
        );
    }
}

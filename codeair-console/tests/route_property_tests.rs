use codeair_console::location::Location;
use codeair_console::router::{resolve, AgentRef, Route, CALLBACK_PATH};
use codeair_test_utils::generators::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn unmatched_paths_land_on_dashboard(path in arb_unmatched_path()) {
        let route = resolve(&Location::parse(&path), true);
        prop_assert_eq!(route, Route::Dashboard { query: None });
    }

    #[test]
    fn dashboard_keeps_search_query(path in arb_unmatched_path(), q in arb_query_value()) {
        let href = format!("{}?q={}", path, urlencoding::encode(&q));
        let route = resolve(&Location::parse(&href), true);
        prop_assert_eq!(route, Route::Dashboard { query: Some(q) });
    }

    #[test]
    fn agent_config_captures_id_and_type(
        project_id in arb_project_id(),
        agent_id in arb_real_agent_id(),
        agent_type in arb_query_value(),
    ) {
        let href = format!(
            "/project/{}/agents/{}?type={}",
            project_id,
            agent_id,
            urlencoding::encode(&agent_type)
        );
        let route = resolve(&Location::parse(&href), true);
        prop_assert_eq!(
            route,
            Route::AgentConfig {
                project_id,
                agent: AgentRef::Existing(agent_id),
                agent_type: Some(agent_type),
            }
        );
    }

    #[test]
    fn agent_config_new_without_type(project_id in arb_project_id()) {
        let href = format!("/project/{}/agents/new", project_id);
        let route = resolve(&Location::parse(&href), true);
        prop_assert_eq!(
            route,
            Route::AgentConfig {
                project_id,
                agent: AgentRef::New,
                agent_type: None,
            }
        );
    }

    #[test]
    fn job_log_detail_captures_all_ids(
        project_id in arb_project_id(),
        agent_id in arb_real_agent_id(),
        job_id in any::<u64>(),
    ) {
        let href = format!("/project/{}/agents/{}/logs/{}", project_id, agent_id, job_id);
        let route = resolve(&Location::parse(&href), true);
        prop_assert_eq!(route, Route::JobLogDetail { project_id, agent_id, job_id });
    }

    #[test]
    fn uppercase_uuid_is_not_an_agent(project_id in arb_project_id(), agent_id in arb_real_agent_id()) {
        let upper = agent_id.to_string().to_uppercase();
        prop_assume!(upper != agent_id.to_string());
        let href = format!("/project/{}/agents/{}", project_id, upper);
        let route = resolve(&Location::parse(&href), true);
        prop_assert_eq!(route, Route::Dashboard { query: None });
    }

    #[test]
    fn signed_out_always_resolves_to_login(
        path in prop_oneof![
            arb_unmatched_path(),
            arb_project_id().prop_map(|id| format!("/project/{}", id)),
            arb_project_id().prop_map(|id| format!("/project/{}/agents/new", id)),
        ],
    ) {
        prop_assert_eq!(resolve(&Location::parse(&path), false), Route::Login);
    }

    #[test]
    fn callback_is_reachable_signed_out(code in arb_query_value()) {
        let href = format!("{}?code={}", CALLBACK_PATH, urlencoding::encode(&code));
        prop_assert_eq!(resolve(&Location::parse(&href), false), Route::AuthCallback);
    }
}

#[test]
fn callback_with_session_falls_through_to_dashboard() {
    let route = resolve(&Location::parse("/auth/callback?code=abc"), true);
    assert_eq!(route, Route::Dashboard { query: None });
}

#[test]
fn project_id_overflow_falls_through() {
    let route = resolve(&Location::parse("/project/99999999999999999999999"), true);
    assert_eq!(route, Route::Dashboard { query: None });
}

#[test]
fn new_is_not_a_log_agent() {
    let route = resolve(&Location::parse("/project/1/agents/new/logs/2"), true);
    assert_eq!(route, Route::Dashboard { query: None });
}

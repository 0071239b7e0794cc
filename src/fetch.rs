use crate::api::{FetchError, JobsApi};
use crate::models::Job;

/// Shown for every failed fetch, whatever the underlying cause.
pub const FETCH_ERROR_MESSAGE: &str = "Could not fetch jobs. [500] Internal server error";

#[derive(Debug, Default)]
pub struct FetchState {
    pub jobs: Vec<Job>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Identifies one issued request. Only the most recent ticket may write
/// into [`FetchState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub search: String,
}

#[derive(Debug, Default)]
pub struct FetchController {
    issued: u64,
    state: FetchState,
}

impl FetchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn begin(&mut self, search: &str) -> FetchTicket {
        self.issued += 1;
        self.state.loading = true;
        self.state.error = None;
        FetchTicket {
            seq: self.issued,
            search: search.to_string(),
        }
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.issued
    }

    /// Applies a finished request. Returns `false` when a newer request has
    /// been issued since, in which case the result is dropped.
    pub fn complete(&mut self, ticket: &FetchTicket, result: Result<Vec<Job>, FetchError>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.issued,
                search = %ticket.search,
                "discarding stale job list"
            );
            return false;
        }

        match result {
            Ok(jobs) => {
                tracing::info!(count = jobs.len(), search = %ticket.search, "job list updated");
                self.state.jobs = jobs;
                self.state.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, search = %ticket.search, "job fetch failed");
                self.state.jobs.clear();
                self.state.error = Some(FETCH_ERROR_MESSAGE.to_string());
            }
        }
        self.state.loading = false;
        true
    }

    /// Issues and awaits a single request.
    pub async fn refresh(&mut self, api: &JobsApi, search: &str) -> &FetchState {
        let ticket = self.begin(search);
        let result = api.fetch_jobs(&ticket.search).await;
        self.complete(&ticket, result);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::spawn_api;
    use crate::models::JobId;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use std::time::Duration;

    fn job(id: i64) -> Job {
        Job {
            job_id: JobId::Number(id),
            ..Default::default()
        }
    }

    #[test]
    fn test_begin_sets_loading_and_clears_error() {
        let mut ctl = FetchController::new();
        let t = ctl.begin("");
        ctl.complete(&t, Err(FetchError::Status(502)));
        assert!(ctl.state().error.is_some());

        ctl.begin("rust");
        assert!(ctl.state().loading);
        assert!(ctl.state().error.is_none());
    }

    #[test]
    fn test_success_replaces_jobs() {
        let mut ctl = FetchController::new();
        let t = ctl.begin("");
        assert!(ctl.complete(&t, Ok(vec![job(1), job(2)])));
        let t = ctl.begin("x");
        assert!(ctl.complete(&t, Ok(vec![job(3)])));

        let state = ctl.state();
        assert!(!state.loading);
        assert_eq!(state.jobs.len(), 1);
        assert_eq!(state.jobs[0].job_id, JobId::Number(3));
    }

    #[test]
    fn test_failure_sets_fixed_message_and_empties_jobs() {
        let mut ctl = FetchController::new();
        let t = ctl.begin("");
        ctl.complete(&t, Ok(vec![job(1)]));

        let t = ctl.begin("");
        ctl.complete(&t, Err(FetchError::MissingBaseUrl));
        let state = ctl.state();
        assert_eq!(state.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert!(state.jobs.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut ctl = FetchController::new();
        let slow = ctl.begin("r");
        let fast = ctl.begin("rust");

        assert!(ctl.complete(&fast, Ok(vec![job(10)])));
        assert!(!ctl.complete(&slow, Ok(vec![job(1), job(2), job(3)])));

        assert_eq!(ctl.state().jobs.len(), 1);
        assert_eq!(ctl.state().jobs[0].job_id, JobId::Number(10));
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut ctl = FetchController::new();
        let old = ctl.begin("a");
        let new = ctl.begin("ab");

        assert!(!ctl.complete(&old, Err(FetchError::Status(500))));
        assert!(ctl.state().loading);
        assert!(ctl.state().error.is_none());

        ctl.complete(&new, Ok(vec![]));
        assert!(!ctl.state().loading);
    }

    #[tokio::test]
    async fn test_refresh_against_http_500() {
        let router = Router::new().route("/jobs", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let base = spawn_api(router).await;
        let api = JobsApi::new(Some(base), Duration::from_secs(5)).unwrap();

        let mut ctl = FetchController::new();
        let t = ctl.begin("");
        ctl.complete(&t, Ok(vec![job(1)]));

        let state = ctl.refresh(&api, "").await;
        assert_eq!(state.error.as_deref(), Some(FETCH_ERROR_MESSAGE));
        assert!(state.jobs.is_empty());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let router = Router::new().route(
            "/jobs",
            get(|| async { axum::Json(serde_json::json!([{"job_id": 5, "title": "a"}])) }),
        );
        let base = spawn_api(router).await;
        let api = JobsApi::new(Some(base), Duration::from_secs(5)).unwrap();

        let mut ctl = FetchController::new();
        let state = ctl.refresh(&api, "a").await;
        assert!(state.error.is_none());
        assert_eq!(state.jobs.len(), 1);
    }
}

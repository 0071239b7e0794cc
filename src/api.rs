use std::time::Duration;

use thiserror::Error;

use crate::models::Job;
use crate::query::build_query;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no jobs API base URL configured")]
    MissingBaseUrl,
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("jobs API answered with HTTP {0}")]
    Status(u16),
    #[error("could not decode job list: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct JobsApi {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl JobsApi {
    pub fn new(base_url: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jobboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Ok(Self { client, base_url })
    }

    pub fn jobs_url(&self, search: &str) -> Option<String> {
        self.base_url
            .as_ref()
            .map(|base| format!("{}/jobs{}", base, build_query(search)))
    }

    pub async fn fetch_jobs(&self, search: &str) -> Result<Vec<Job>, FetchError> {
        let url = self.jobs_url(search).ok_or(FetchError::MissingBaseUrl)?;
        tracing::debug!(%url, "fetching jobs");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let jobs: Vec<Job> = response.json().await.map_err(FetchError::Decode)?;
        tracing::debug!(count = jobs.len(), "jobs received");
        Ok(jobs)
    }
}

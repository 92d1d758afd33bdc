//! GitHub Actions client for workflow run status.
//!
//! Queries `GET /repos/{owner}/{repo}/actions/runs?head_sha={sha}` and passes
//! when any completed run of the requested job succeeded.

use std::time::Duration;

use serde::Deserialize;

use super::{CiProvider, Conclusion};
use crate::config::CiConfig;
use crate::error::{ReleaseError, Result};

/// Default API endpoint for github.com
pub const GITHUB_API: &str = "https://api.github.com";

/// Default timeout for API requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent for API requests
pub const USER_AGENT: &str = concat!("release-validator/", env!("CARGO_PKG_VERSION"));

/// Token variable consulted when the configured one is unset
pub const FALLBACK_TOKEN_ENV: &str = "GH_TOKEN";

/// A single workflow run as returned by the runs listing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub head_sha: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

/// GitHub Actions API client scoped to one repository
#[derive(Debug, Clone)]
pub struct GitHubActionsClient {
    base_url: String,
    repository: String,
    token: String,
    client: reqwest::blocking::Client,
}

fn build_http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ReleaseError::ci(format!("cannot build HTTP client: {}", e)))
}

impl GitHubActionsClient {
    /// Create a client for `repository` ("owner/name") on the given API base URL
    pub fn new(base_url: &str, repository: &str, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            repository: repository.to_string(),
            token: token.into(),
            client: build_http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
        })
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_http_client(timeout)?;
        Ok(self)
    }

    /// Build a client from configuration and the environment.
    ///
    /// Returns `Ok(None)` when no token is available: without credentials
    /// the CI check is skipped, not failed.
    pub fn from_config(config: &CiConfig, remote_url: Option<&str>) -> Result<Option<Self>> {
        let token = std::env::var(&config.token_env)
            .ok()
            .or_else(|| std::env::var(FALLBACK_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty());

        let Some(token) = token else {
            tracing::debug!(token_env = %config.token_env, "no CI token in environment");
            return Ok(None);
        };

        let repository = config
            .repository
            .clone()
            .or_else(|| std::env::var("GITHUB_REPOSITORY").ok())
            .or_else(|| remote_url.and_then(parse_github_slug))
            .ok_or_else(|| {
                ReleaseError::config(
                    "CI token is set but the GitHub repository could not be determined; set ci.repository",
                )
            })?;

        let client = Self::new(&config.api_url, &repository, token)?
            .with_timeout(Duration::from_secs(config.timeout_secs))?;
        Ok(Some(client))
    }

    /// Repository this client queries ("owner/name")
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// List workflow runs triggered for a commit.
    ///
    /// Only the first page of 100 runs is read; a commit with more runs
    /// than that is judged on the newest 100.
    pub fn list_runs(&self, commit: &str) -> Result<Vec<WorkflowRun>> {
        let url = format!(
            "{}/repos/{}/actions/runs?head_sha={}&per_page=100",
            self.base_url, self.repository, commit
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .map_err(|e| ReleaseError::ci(format!("failed to send request to GitHub: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::ci(format!(
                "unexpected status code from {}: {}",
                url, status
            )));
        }

        let body: WorkflowRunsResponse = response
            .json()
            .map_err(|e| ReleaseError::ci(format!("failed to parse workflow runs: {}", e)))?;

        Ok(body.workflow_runs)
    }
}

/// Conclusion of the runs named `job_name`.
///
/// Any completed successful run passes, even when a newer run was
/// cancelled or is still going. Otherwise the newest completed run decides;
/// run ids grow monotonically, so the highest id is the newest. `None`
/// when no matching run has completed.
pub fn select_conclusion(runs: &[WorkflowRun], job_name: &str) -> Option<Conclusion> {
    let completed: Vec<&WorkflowRun> = runs
        .iter()
        .filter(|run| run.name.as_deref() == Some(job_name))
        .filter(|run| run.status.as_deref() == Some("completed"))
        .collect();

    if completed
        .iter()
        .any(|run| run.conclusion.as_deref() == Some("success"))
    {
        return Some(Conclusion::Success);
    }

    completed
        .iter()
        .filter(|run| run.conclusion.is_some())
        .max_by_key(|run| run.id)
        .and_then(|run| run.conclusion.as_deref())
        .map(Conclusion::from)
}

/// Extract "owner/name" from a GitHub remote URL
///
/// Accepts `https://github.com/owner/name(.git)`, `git@github.com:owner/name(.git)`
/// and `ssh://git@github.com/owner/name(.git)`.
pub fn parse_github_slug(url: &str) -> Option<String> {
    let path = if let Some(rest) = url.strip_prefix("git@") {
        rest.split_once(':')?.1
    } else {
        let without_scheme = url.split_once("://")?.1;
        without_scheme.split_once('/')?.1
    };

    let path = path.trim_end_matches('/').trim_end_matches(".git");
    let mut parts = path.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let name = parts.next().filter(|s| !s.is_empty())?;
    if parts.next().is_some() {
        return None;
    }

    Some(format!("{}/{}", owner, name))
}

impl CiProvider for GitHubActionsClient {
    fn run_conclusion(&self, commit: &str, job_name: &str) -> Result<Option<Conclusion>> {
        let runs = self.list_runs(commit)?;
        tracing::debug!(
            repository = %self.repository,
            commit,
            runs = runs.len(),
            "fetched workflow runs"
        );
        Ok(select_conclusion(&runs, job_name))
    }
}

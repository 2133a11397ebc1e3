//! GitHub REST client

use crate::forge::ForgeClient;
use crate::types::{Issue, PullRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const LOG_TARGET: &str = "github";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
struct WireUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct WireLabel {
    name: String,
}

/// Issue as returned by `/issues`; pull requests carry a `pull_request` key
#[derive(Debug, Deserialize)]
struct WireIssue {
    number: u64,
    #[serde(default)]
    title: String,
    user: WireUser,
    #[serde(default)]
    labels: Vec<WireLabel>,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WirePull {
    number: u64,
    #[serde(default)]
    title: String,
    user: WireUser,
    body: Option<String>,
    closed_at: Option<DateTime<Utc>>,
    merged_at: Option<DateTime<Utc>>,
}

impl From<WireIssue> for Issue {
    fn from(wire: WireIssue) -> Self {
        Issue {
            id: wire.number,
            created_at: wire.created_at,
            closed_at: wire.closed_at,
            author: wire.user.login,
            labels: wire.labels.into_iter().map(|l| l.name).collect(),
            title: wire.title,
        }
    }
}

impl From<WirePull> for PullRequest {
    fn from(wire: WirePull) -> Self {
        PullRequest {
            id: wire.number,
            author: wire.user.login,
            body: wire.body.unwrap_or_default(),
            closed_at: wire.closed_at,
            merged_at: wire.merged_at,
            title: wire.title,
        }
    }
}

/// Client for one GitHub repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(base_url: &str, owner: &str, repo: &str, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("bugrate"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Invalid characters in API token")?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(GitHubClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    fn endpoint(&self, resource: &str, state: &str, page: u32) -> String {
        format!(
            "{}/repos/{}/{}/{}?state={}&per_page={}&page={}",
            self.base_url, self.owner, self.repo, resource, state, PAGE_SIZE, page
        )
    }

    /// Requests numbered pages until one comes back empty
    async fn fetch_all<T: DeserializeOwned>(&self, resource: &str, state: &str) -> Result<Vec<T>> {
        let mut records = Vec::new();
        for page in 1.. {
            let url = self.endpoint(resource, state, page);
            let batch: Vec<T> = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("GET {}", url))?
                .error_for_status()
                .with_context(|| format!("GET {}", url))?
                .json()
                .await
                .with_context(|| format!("Failed to decode {}", url))?;
            if batch.is_empty() {
                break;
            }
            log::info!(target: LOG_TARGET, "Fetched page {} of {} ({} records)", page, resource, batch.len());
            records.extend(batch);
        }
        Ok(records)
    }
}

#[async_trait]
impl ForgeClient for GitHubClient {
    async fn fetch_issues(&self) -> Result<Vec<Issue>> {
        let wire: Vec<WireIssue> = self.fetch_all("issues", "all").await?;
        Ok(wire
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .map(Issue::from)
            .collect())
    }

    async fn fetch_pulls(&self) -> Result<Vec<PullRequest>> {
        let wire: Vec<WirePull> = self.fetch_all("pulls", "closed").await?;
        Ok(wire.into_iter().map(PullRequest::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_issue_conversion() {
        let json = r#"[
            {"number": 4, "title": "Crash", "user": {"login": "bob"},
             "labels": [{"name": "bug"}], "created_at": "2020-01-01T00:00:00Z",
             "closed_at": null},
            {"number": 5, "title": "PR", "user": {"login": "amy"}, "labels": [],
             "created_at": "2020-01-01T00:00:00Z", "closed_at": null,
             "pull_request": {"url": "x"}}
        ]"#;
        let wire: Vec<WireIssue> = serde_json::from_str(json).unwrap();
        let issues: Vec<Issue> = wire
            .into_iter()
            .filter(|i| i.pull_request.is_none())
            .map(Issue::from)
            .collect();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].id, 4);
        assert_eq!(issues[0].author, "bob");
        assert!(issues[0].is_bug());
        assert!(issues[0].is_open());
    }

    #[test]
    fn test_wire_pull_null_body() {
        let json = r#"{"number": 9, "title": "t", "user": {"login": "amy"}, "body": null,
                       "closed_at": "2020-02-01T00:00:00Z", "merged_at": null}"#;
        let pull: PullRequest = serde_json::from_str::<WirePull>(json).unwrap().into();
        assert_eq!(pull.body, "");
        assert!(pull.is_closed());
    }

    #[test]
    fn test_endpoint() {
        let client = GitHubClient::new("https://api.github.com/", "o", "r", None).unwrap();
        assert_eq!(
            client.endpoint("pulls", "closed", 2),
            "https://api.github.com/repos/o/r/pulls?state=closed&per_page=100&page=2"
        );
    }
}

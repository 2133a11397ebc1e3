//! Live data source interface

pub mod github;

use crate::types::{Issue, PullRequest};
use anyhow::Result;
use async_trait::async_trait;

/// ForgeClient fetches every issue and pull request of one repository
#[async_trait]
pub trait ForgeClient: Send + Sync {
    /// All issues, open and closed, excluding pull requests
    async fn fetch_issues(&self) -> Result<Vec<Issue>>;

    /// All closed pull requests
    async fn fetch_pulls(&self) -> Result<Vec<PullRequest>>;
}

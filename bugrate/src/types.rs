//! Core data structures for issue and pull-request statistics.

use crate::references;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label that marks an issue as a bug
pub const BUG_LABEL: &str = "bug";

/// Issue is a single forge issue (pull requests excluded)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub closed_at: Option<DateTime<Utc>>,
    pub author: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// Exact, case-sensitive label match
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn is_bug(&self) -> bool {
        self.has_label(BUG_LABEL)
    }
}

/// PullRequest is a pull request as returned by the forge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub author: String,
    #[serde(default)]
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }
}

/// AnnotatedPullRequest carries the issues a pull request claims to resolve.
/// The references are extracted once, when the value is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedPullRequest {
    pub pull: PullRequest,
    referenced_issues: Vec<u64>,
}

impl AnnotatedPullRequest {
    pub fn new(pull: PullRequest) -> Self {
        let referenced_issues = references::extract(&pull.body, pull.id);
        AnnotatedPullRequest {
            pull,
            referenced_issues,
        }
    }

    pub fn referenced_issues(&self) -> &[u64] {
        &self.referenced_issues
    }

    pub fn author(&self) -> &str {
        &self.pull.author
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.pull.closed_at
    }
}

/// Annotates every pull request of a fetch
pub fn annotate_all(pulls: Vec<PullRequest>) -> Vec<AnnotatedPullRequest> {
    pulls.into_iter().map(AnnotatedPullRequest::new).collect()
}

/// Snapshot is one already-fetched data set; every report reads from it
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub issues: Vec<Issue>,
    pub pulls: Vec<AnnotatedPullRequest>,
}

impl Snapshot {
    pub fn new(issues: Vec<Issue>, pulls: Vec<PullRequest>) -> Self {
        Snapshot {
            issues,
            pulls: annotate_all(pulls),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_issue_state_and_labels() {
        let open = labelled(issue(1, at(2020, 1, 1), None), &["bug", "ui"]);
        assert!(open.is_open());
        assert!(open.is_bug());
        assert!(open.has_label("ui"));
        assert!(!open.has_label("Bug"));

        let closed = issue(2, at(2020, 1, 1), Some(at(2020, 2, 1)));
        assert!(closed.is_closed());
        assert!(!closed.is_bug());
    }

    #[test]
    fn test_pull_annotated_on_construction() {
        let pr = pull(7, "alice", "fixes #12 and resolves #34", Some(at(2020, 3, 1)));
        assert_eq!(pr.referenced_issues(), &[12, 34]);
        assert_eq!(pr.author(), "alice");
    }

    #[test]
    fn test_issue_json_defaults() {
        let json = r#"{"id":3,"created_at":"2020-01-01T00:00:00Z","author":"bob"}"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert!(issue.is_open());
        assert!(issue.labels.is_empty());
    }
}

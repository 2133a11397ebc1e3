//! Grouping and filtering of issues and pull requests.
//!
//! Nothing here fails: empty input gives empty output.

use crate::types::{AnnotatedPullRequest, Issue, Snapshot};
use chrono::{DateTime, Datelike, Utc};
use std::collections::{HashMap, HashSet};

/// Pull requests authored by `login` (exact, case-sensitive)
pub fn pulls_by_user<'a>(login: &str, pulls: &'a [AnnotatedPullRequest]) -> Vec<&'a AnnotatedPullRequest> {
    pulls.iter().filter(|p| p.author() == login).collect()
}

/// Partitions pull requests by author login
pub fn pulls_grouped_by_user(pulls: &[AnnotatedPullRequest]) -> HashMap<String, Vec<&AnnotatedPullRequest>> {
    let mut groups: HashMap<String, Vec<&AnnotatedPullRequest>> = HashMap::new();
    for pull in pulls {
        groups.entry(pull.author().to_string()).or_default().push(pull);
    }
    groups
}

/// Partitions issues by author login
pub fn issues_grouped_by_user(issues: &[Issue]) -> HashMap<String, Vec<&Issue>> {
    let mut groups: HashMap<String, Vec<&Issue>> = HashMap::new();
    for issue in issues {
        groups.entry(issue.author.clone()).or_default().push(issue);
    }
    groups
}

/// Issues for which `predicate` holds
pub fn filter_issues<'a, P>(issues: &'a [Issue], predicate: P) -> Vec<&'a Issue>
where
    P: Fn(&Issue) -> bool,
{
    issues.iter().filter(|i| predicate(i)).collect()
}

pub fn issues_with_label<'a>(issues: &'a [Issue], label: &str) -> Vec<&'a Issue> {
    filter_issues(issues, |i| i.has_label(label))
}

/// Pull requests that reference at least one issue carrying `label`.
/// The label belongs to the referenced issues, not to the pull request.
pub fn pulls_with_label<'a>(
    pulls: &'a [AnnotatedPullRequest],
    issues: &[Issue],
    label: &str,
) -> Vec<&'a AnnotatedPullRequest> {
    let labelled: HashSet<u64> = issues
        .iter()
        .filter(|i| i.has_label(label))
        .map(|i| i.id)
        .collect();
    pulls
        .iter()
        .filter(|p| p.referenced_issues().iter().any(|id| labelled.contains(id)))
        .collect()
}

pub fn is_bug(issue: &Issue) -> bool {
    issue.is_bug()
}

/// True if `date` is strictly after `since` or on the same calendar day
pub fn on_or_after_day(date: DateTime<Utc>, since: DateTime<Utc>) -> bool {
    date > since || (date.year() == since.year() && date.ordinal() == since.ordinal())
}

/// True if `date` is at or after the instant `since`
pub fn at_or_after(date: DateTime<Utc>, since: DateTime<Utc>) -> bool {
    date >= since
}

/// Closed issues whose closure date is on or after `since`
pub fn issues_fixed_since(issues: &[Issue], since: DateTime<Utc>) -> usize {
    issues
        .iter()
        .filter(|i| i.closed_at.is_some_and(|closed| on_or_after_day(closed, since)))
        .count()
}

/// Like [`issues_fixed_since`], restricted to bugs
pub fn bugs_fixed_since(issues: &[Issue], since: DateTime<Utc>) -> usize {
    issues
        .iter()
        .filter(|i| i.is_bug())
        .filter(|i| i.closed_at.is_some_and(|closed| on_or_after_day(closed, since)))
        .count()
}

pub fn num_open_issues(issues: &[Issue]) -> usize {
    issues.iter().filter(|i| i.is_open()).count()
}

pub fn num_closed_issues(issues: &[Issue]) -> usize {
    issues.iter().filter(|i| i.is_closed()).count()
}

pub fn num_open_pulls(pulls: &[AnnotatedPullRequest]) -> usize {
    pulls.iter().filter(|p| p.pull.is_open()).count()
}

pub fn num_closed_pulls(pulls: &[AnnotatedPullRequest]) -> usize {
    pulls.iter().filter(|p| p.pull.is_closed()).count()
}

pub fn issues_opened_by(login: &str, issues: &[Issue]) -> usize {
    issues.iter().filter(|i| i.author == login).count()
}

/// Total issues referenced by `login`'s closed pull requests
pub fn issues_resolved_by(login: &str, pulls: &[AnnotatedPullRequest]) -> usize {
    pulls_by_user(login, pulls)
        .into_iter()
        .filter(|p| p.pull.is_closed())
        .map(|p| p.referenced_issues().len())
        .sum()
}

/// Closures on or after a threshold date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSince {
    pub issues: usize,
    pub bugs: usize,
}

/// Scalar counts printed ahead of the charts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub open_issues: usize,
    pub closed_issues: usize,
    pub open_pulls: usize,
    pub closed_pulls: usize,
    pub opened_by_user: usize,
    pub resolved_by_user: usize,
    /// `None` when no threshold date is available
    pub fixed_since: Option<FixedSince>,
}

pub fn summarize(snapshot: &Snapshot, login: &str, since: Option<DateTime<Utc>>) -> Summary {
    let issues = &snapshot.issues;
    let pulls = &snapshot.pulls;
    Summary {
        open_issues: num_open_issues(issues),
        closed_issues: num_closed_issues(issues),
        open_pulls: num_open_pulls(pulls),
        closed_pulls: num_closed_pulls(pulls),
        opened_by_user: issues_opened_by(login, issues),
        resolved_by_user: issues_resolved_by(login, pulls),
        fixed_since: since.map(|since| FixedSince {
            issues: issues_fixed_since(issues, since),
            bugs: bugs_fixed_since(issues, since),
        }),
    }
}

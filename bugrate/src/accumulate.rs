//! Turns dated events into point-in-time counts.
//!
//! Every map here is built in two passes: first a zero bucket is anchored at
//! each event date so the series has an endpoint there, then each event
//! applies its delta to all buckets on or after its date.

use crate::dates::DateCountMap;
use crate::types::{AnnotatedPullRequest, Issue};

/// Number of issues open at each issue creation date.
///
/// A gauge, not a running total: closures are subtracted.
pub fn open_issues_by_date<'a, I>(issues: I) -> DateCountMap
where
    I: IntoIterator<Item = &'a Issue>,
{
    let issues: Vec<&Issue> = issues.into_iter().collect();
    let mut by_date = DateCountMap::new();
    for issue in &issues {
        by_date.anchor(issue.created_at);
    }
    for issue in &issues {
        by_date.increment_after_date(issue.created_at);
        if let Some(closed) = issue.closed_at {
            by_date.decrement_after_date(closed);
        }
    }
    by_date
}

/// Number of issues opened on or before each creation date
pub fn cum_opened_by_date<'a, I>(issues: I) -> DateCountMap
where
    I: IntoIterator<Item = &'a Issue>,
{
    let issues: Vec<&Issue> = issues.into_iter().collect();
    let mut by_date = DateCountMap::new();
    for issue in &issues {
        by_date.anchor(issue.created_at);
    }
    for issue in &issues {
        by_date.increment_after_date(issue.created_at);
    }
    by_date
}

/// Number of issues closed on or before each closure date.
/// Open issues contribute no bucket.
pub fn cum_closed_by_date<'a, I>(issues: I) -> DateCountMap
where
    I: IntoIterator<Item = &'a Issue>,
{
    let closures: Vec<_> = issues.into_iter().filter_map(|i| i.closed_at).collect();
    let mut by_date = DateCountMap::new();
    for closed in &closures {
        by_date.anchor(*closed);
    }
    for closed in &closures {
        by_date.increment_after_date(*closed);
    }
    by_date
}

/// Number of issues referenced by pull requests closed on or before each
/// pull-request closure date. This is the bug-fix rate.
pub fn cum_resolved_by_date<'a, I>(pulls: I) -> DateCountMap
where
    I: IntoIterator<Item = &'a AnnotatedPullRequest>,
{
    let closed: Vec<_> = pulls
        .into_iter()
        .filter_map(|p| p.closed_at().map(|at| (at, p.referenced_issues().len() as i64)))
        .collect();
    let mut by_date = DateCountMap::new();
    for (at, _) in &closed {
        by_date.anchor(*at);
    }
    for (at, resolved) in &closed {
        by_date.add_after_date(*at, *resolved);
    }
    by_date
}

/// Number of issues referenced by pull requests closed at each date
/// (not cumulative)
pub fn resolved_by_date<'a, I>(pulls: I) -> DateCountMap
where
    I: IntoIterator<Item = &'a AnnotatedPullRequest>,
{
    let mut by_date = DateCountMap::new();
    for pull in pulls {
        if let Some(at) = pull.closed_at() {
            by_date.add_at(at, pull.referenced_issues().len() as i64);
        }
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    fn values(map: &DateCountMap) -> Vec<i64> {
        map.sorted_entries().into_iter().map(|(_, v)| v).collect()
    }

    #[test]
    fn test_open_issues_by_date() {
        let issues = vec![
            issue(1, at(2020, 1, 1), Some(at(2020, 1, 15))),
            issue(2, at(2020, 1, 10), None),
            issue(3, at(2020, 2, 1), Some(at(2020, 3, 1))),
        ];
        let open = open_issues_by_date(&issues);
        assert_eq!(
            open.sorted_dates(),
            vec![at(2020, 1, 1), at(2020, 1, 10), at(2020, 2, 1)]
        );
        assert_eq!(values(&open), vec![1, 2, 2]);
    }

    #[test]
    fn test_cumulative_opened_and_closed() {
        let issues = vec![
            issue(1, at(2020, 1, 1), Some(at(2020, 1, 15))),
            issue(2, at(2020, 1, 10), None),
            issue(3, at(2020, 2, 1), Some(at(2020, 3, 1))),
        ];
        assert_eq!(values(&cum_opened_by_date(&issues)), vec![1, 2, 3]);

        let closed = cum_closed_by_date(&issues);
        assert_eq!(closed.sorted_dates(), vec![at(2020, 1, 15), at(2020, 3, 1)]);
        assert_eq!(values(&closed), vec![1, 2]);
    }

    #[test]
    fn test_resolved_counts_referenced_issues() {
        let pulls = vec![
            pull(10, "alice", "fixes #1 fixes #2", Some(at(2020, 1, 5))),
            pull(11, "alice", "no refs", Some(at(2020, 1, 6))),
            pull(12, "alice", "closes #3", None),
            pull(13, "alice", "resolves #4", Some(at(2020, 1, 7))),
        ];
        let cum = cum_resolved_by_date(&pulls);
        assert_eq!(cum.len(), 3);
        assert_eq!(values(&cum), vec![2, 2, 3]);

        let daily = resolved_by_date(&pulls);
        assert_eq!(values(&daily), vec![2, 0, 1]);
    }

    #[test]
    fn test_same_instant_events_share_a_bucket() {
        let issues = vec![
            issue(1, at(2020, 1, 1), None),
            issue(2, at(2020, 1, 1), None),
        ];
        let opened = cum_opened_by_date(&issues);
        assert_eq!(opened.len(), 1);
        assert_eq!(opened.get(&at(2020, 1, 1)), Some(2));
    }

    #[test]
    fn test_empty_input_yields_empty_maps() {
        let issues: Vec<Issue> = Vec::new();
        let pulls: Vec<AnnotatedPullRequest> = Vec::new();
        assert!(open_issues_by_date(&issues).is_empty());
        assert!(cum_opened_by_date(&issues).is_empty());
        assert!(cum_closed_by_date(&issues).is_empty());
        assert!(cum_resolved_by_date(&pulls).is_empty());
    }

    fn arb_issues() -> impl Strategy<Value = Vec<Issue>> {
        prop::collection::vec((0i64..10_000, prop::option::of(0i64..10_000)), 0..40).prop_map(
            |raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(n, (created, lifetime))| {
                        let created_at = DateTime::<Utc>::from_timestamp(created * 60, 0).unwrap();
                        let closed_at = lifetime.map(|l| {
                            DateTime::<Utc>::from_timestamp((created + l) * 60, 0).unwrap()
                        });
                        issue(n as u64, created_at, closed_at)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_cumulative_series_are_monotonic(issues in arb_issues()) {
            let opened = values(&cum_opened_by_date(&issues));
            let closed = values(&cum_closed_by_date(&issues));
            prop_assert!(opened.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(closed.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn prop_open_equals_opened_minus_closed(issues in arb_issues()) {
            let open = open_issues_by_date(&issues);
            let opened = cum_opened_by_date(&issues);
            let closed = cum_closed_by_date(&issues);
            for (date, value) in open.sorted_entries() {
                prop_assert_eq!(value, opened.value_at(date) - closed.value_at(date));
            }
        }
    }
}

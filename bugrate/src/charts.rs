//! Named charts composed from the accumulators and filters.
//!
//! Each builder returns its own `Result`, so one chart failing never stops
//! the others from being produced.

use crate::accumulate::{cum_closed_by_date, cum_opened_by_date, cum_resolved_by_date, open_issues_by_date};
use crate::dates::DateCountMap;
use crate::error::{Error, Result};
use crate::filter::{self, at_or_after};
use crate::series::{BarSeries, PairedSeries, Series};
use crate::settings::Settings;
use crate::types::{AnnotatedPullRequest, Issue, Snapshot};
use serde::Serialize;

const LOG_TARGET: &str = "charts";

pub const OPENED_NAME: &str = "Total issues opened";
pub const CLOSED_NAME: &str = "Total issues closed";

/// The data a chart draws
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "series", rename_all = "snake_case")]
pub enum ChartData {
    Line(Vec<Series>),
    Scatter(Vec<PairedSeries>),
    Bar(Vec<BarSeries>),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Line(s) => s.len(),
            ChartData::Scatter(s) => s.len(),
            ChartData::Bar(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Chart is everything a renderer needs: labels, a file name and the data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub file_name: String,
    pub data: ChartData,
}

impl Chart {
    pub fn new(
        title: impl Into<String>,
        x_label: &str,
        y_label: &str,
        file_name: &str,
        data: ChartData,
    ) -> Result<Self> {
        let title = title.into();
        if data.is_empty() {
            return Err(Error::NoSeries(title));
        }
        Ok(Chart {
            title,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            file_name: file_name.to_string(),
            data,
        })
    }

    pub fn line_series(&self) -> &[Series] {
        match &self.data {
            ChartData::Line(series) => series,
            _ => &[],
        }
    }
}

/// Maps a free-form label onto a file-name fragment that stays inside the
/// output directory
fn file_fragment(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Cumulative issues resolved by `login`'s pull requests
pub fn bug_fix_rate(pulls: &[AnnotatedPullRequest], login: &str) -> DateCountMap {
    cum_resolved_by_date(filter::pulls_by_user(login, pulls))
}

fn opened_and_closed<'a, I>(issues: I) -> Result<Vec<Series>>
where
    I: IntoIterator<Item = &'a Issue> + Clone,
{
    Ok(vec![
        Series::from_map(OPENED_NAME, &cum_opened_by_date(issues.clone()))?,
        Series::from_map(CLOSED_NAME, &cum_closed_by_date(issues))?,
    ])
}

pub fn bug_fix_rate_chart(snapshot: &Snapshot, login: &str) -> Result<Chart> {
    let rate = bug_fix_rate(&snapshot.pulls, login);
    let title = format!("Cumulative bugs fixed over time by {}", login);
    let series = Series::from_map(title.as_str(), &rate)?;
    Chart::new(
        title,
        "Date",
        "Total Number of Issues Resolved",
        "bugs",
        ChartData::Line(vec![series]),
    )
}

pub fn open_issues_chart(issues: &[Issue]) -> Result<Chart> {
    let title = "Change in number of open bugs over time";
    let series = Series::from_map(title, &open_issues_by_date(issues))?;
    Chart::new(title, "Date", "Number of open bugs", "openIssues", ChartData::Line(vec![series]))
}

/// Open issues over time, restricted to issues carrying `label`
pub fn open_issues_with_label_chart(issues: &[Issue], label: &str) -> Result<Chart> {
    let title = format!("Open issues labelled '{}' over time", label);
    let labelled = filter::issues_with_label(issues, label);
    let series = Series::from_map(title.as_str(), &open_issues_by_date(labelled))?;
    Chart::new(
        title,
        "Date",
        "Number of open issues",
        &format!("openIssues-{}", file_fragment(label)),
        ChartData::Line(vec![series]),
    )
}

/// Cumulative fixes by the authors of pull requests that reference issues
/// carrying `label`
pub fn fixes_with_label_chart(snapshot: &Snapshot, label: &str) -> Result<Chart> {
    let title = format!("Issues labelled '{}' resolved over time", label);
    let pulls = filter::pulls_with_label(&snapshot.pulls, &snapshot.issues, label);
    let series = Series::from_map(title.as_str(), &cum_resolved_by_date(pulls))?;
    Chart::new(
        title,
        "Date",
        "Total Number of Issues Resolved",
        &format!("fixed-{}", file_fragment(label)),
        ChartData::Line(vec![series]),
    )
}

pub fn opened_vs_closed_chart(issues: &[Issue]) -> Result<Chart> {
    Chart::new(
        "Total issues opened and closed over time",
        "Date",
        "Number of open bugs",
        "openedVsClosed",
        ChartData::Line(opened_and_closed(issues)?),
    )
}

/// Opened and closed issues plotted against each other
pub fn closed_against_opened_chart(issues: &[Issue]) -> Result<Chart> {
    let series = opened_and_closed(issues)?;
    let paired = PairedSeries::from_date_series(&series[0], &series[1], "Closed vs opened");
    Chart::new(
        "Issues closed against issues opened",
        "Total issues opened",
        "Total issues closed",
        "closedVsOpened",
        ChartData::Scatter(vec![paired]),
    )
}

/// Opened/closed totals since `login`'s first fix, plus the user's own fix
/// count. Without any fix by the user the whole history is used.
pub fn opened_vs_closed_for_user_chart(snapshot: &Snapshot, login: &str) -> Result<Chart> {
    let rate = bug_fix_rate(&snapshot.pulls, login);
    let fixed = Series::from_map(format!("Total fixed by {}", login), &rate)?;

    let mut series = match rate.first_date() {
        Ok(first_fix) => {
            let opened = filter::filter_issues(&snapshot.issues, |i| at_or_after(i.created_at, first_fix));
            let closed = filter::filter_issues(&snapshot.issues, |i| {
                i.closed_at.is_some_and(|c| at_or_after(c, first_fix))
            });
            vec![
                Series::from_map(OPENED_NAME, &cum_opened_by_date(opened))?,
                Series::from_map(CLOSED_NAME, &cum_closed_by_date(closed))?,
            ]
        }
        Err(Error::NotAvailable(_)) => {
            log::info!(target: LOG_TARGET, "{} has not resolved any issues; using full history", login);
            opened_and_closed(&snapshot.issues)?
        }
        Err(e) => return Err(e),
    };
    series.push(fixed);

    Chart::new(
        format!("Total issues opened and closed over time since {}'s first bugfix", login),
        "Date",
        "Number of open bugs",
        "closedByUser",
        ChartData::Line(series),
    )
}

/// Opened/closed totals plus one fix series per named user
pub fn opened_vs_closed_for_users_chart(snapshot: &Snapshot, logins: &[String]) -> Result<Chart> {
    let mut series = Vec::with_capacity(logins.len() + 2);
    for login in logins {
        let rate = bug_fix_rate(&snapshot.pulls, login);
        series.push(Series::from_map(format!("Total fixed by {}", login), &rate)?);
    }
    series.extend(opened_and_closed(&snapshot.issues)?);
    Chart::new(
        "Total issues opened and closed over time",
        "Date",
        "Number of bugs",
        "usersComparison",
        ChartData::Line(series),
    )
}

/// Users whose cumulative resolved count at their latest date is at least
/// `min_n`, with that count. A user with no closed pull request counts as 0.
/// Sorted by login.
pub fn users_with_min_fixes(pulls: &[AnnotatedPullRequest], min_n: i64) -> Vec<(String, DateCountMap)> {
    let mut retained: Vec<(String, DateCountMap)> = filter::pulls_grouped_by_user(pulls)
        .into_iter()
        .map(|(login, group)| (login, cum_resolved_by_date(group)))
        .filter(|(_, rate)| rate.last_value().unwrap_or(0) >= min_n)
        .collect();
    retained.sort_by(|a, b| a.0.cmp(&b.0));
    retained
}

/// One fix series per user with at least `min_n` fixes, plus the
/// opened/closed totals. A negative `min_n` includes everyone.
pub fn bug_fix_rate_by_user_chart(snapshot: &Snapshot, min_n: i64, file_name: &str) -> Result<Chart> {
    let mut series = Vec::new();
    for (login, rate) in users_with_min_fixes(&snapshot.pulls, min_n) {
        series.push(Series::from_map(login, &rate)?);
    }
    log::debug!(target: LOG_TARGET, "{} users have fixed at least {} bugs", series.len(), min_n);
    series.extend(opened_and_closed(&snapshot.issues)?);
    Chart::new(
        format!("Bugs fixed over time for all users who have fixed at least {} bugs", min_n),
        "Date",
        "Number of bugs",
        file_name,
        ChartData::Line(series),
    )
}

pub fn issues_per_user_chart(issues: &[Issue]) -> Result<Chart> {
    let groups = filter::issues_grouped_by_user(issues);
    Chart::new(
        "Issues opened per user",
        "User",
        "Number of issues",
        "issuesPerUser",
        ChartData::Bar(vec![BarSeries::from_groups("Issues opened", &groups)]),
    )
}

/// Every chart a report produces for `settings`. Each entry is built
/// independently so one failure leaves the rest intact.
pub fn build_all(snapshot: &Snapshot, settings: &Settings) -> Vec<Result<Chart>> {
    let user = settings.username.as_str();
    let mut built = vec![
        bug_fix_rate_chart(snapshot, user),
        open_issues_chart(&snapshot.issues),
        opened_vs_closed_chart(&snapshot.issues),
        closed_against_opened_chart(&snapshot.issues),
        opened_vs_closed_for_user_chart(snapshot, user),
        bug_fix_rate_by_user_chart(snapshot, settings.min_fixes, "fixersComparison"),
        bug_fix_rate_by_user_chart(snapshot, -1, "allfixersComparison"),
        issues_per_user_chart(&snapshot.issues),
    ];
    if !settings.compare_users.is_empty() {
        built.push(opened_vs_closed_for_users_chart(snapshot, &settings.compare_users));
    }
    if let Some(label) = &settings.label {
        built.push(open_issues_with_label_chart(&snapshot.issues, label));
        built.push(fixes_with_label_chart(snapshot, label));
    }
    built
}

//! Ordered data handed to the chart sink.

use crate::dates::DateCountMap;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Series is a named run of (date, value) points in ascending date order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    x: Vec<DateTime<Utc>>,
    y: Vec<i64>,
}

impl Series {
    /// Fails with [`Error::ShapeMismatch`] when the axes differ in length and
    /// with [`Error::UnorderedSeries`] when `x` goes back in time
    pub fn new(name: impl Into<String>, x: Vec<DateTime<Utc>>, y: Vec<i64>) -> Result<Self> {
        let name = name.into();
        if x.len() != y.len() {
            return Err(Error::ShapeMismatch {
                name,
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if let Some(at) = x.windows(2).position(|w| w[0] > w[1]) {
            return Err(Error::UnorderedSeries { name, index: at + 1 });
        }
        Ok(Series { name, x, y })
    }

    pub fn from_map(name: impl Into<String>, data: &DateCountMap) -> Result<Self> {
        let (x, y): (Vec<_>, Vec<_>) = data.sorted_entries().into_iter().unzip();
        Series::new(name, x, y)
    }

    pub fn x(&self) -> &[DateTime<Utc>] {
        &self.x
    }

    pub fn y(&self) -> &[i64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (DateTime<Utc>, i64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }

    pub fn first_date(&self) -> Option<DateTime<Utc>> {
        self.x.first().copied()
    }

    pub fn last_value(&self) -> Option<i64> {
        self.y.last().copied()
    }
}

/// PairedSeries plots the values of one date series against another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairedSeries {
    pub name: String,
    pub x: Vec<i64>,
    pub y: Vec<i64>,
}

impl PairedSeries {
    /// Pairs `x` and `y` point by point when their lengths agree; otherwise
    /// keeps only the dates present in both.
    pub fn from_date_series(x: &Series, y: &Series, name: impl Into<String>) -> Self {
        if x.len() == y.len() {
            return PairedSeries {
                name: name.into(),
                x: x.y.clone(),
                y: y.y.clone(),
            };
        }
        let y_by_date: HashMap<DateTime<Utc>, i64> = y.points().collect();
        let (xs, ys): (Vec<i64>, Vec<i64>) = x
            .points()
            .filter_map(|(date, xv)| y_by_date.get(&date).map(|yv| (xv, *yv)))
            .unzip();
        PairedSeries {
            name: name.into(),
            x: xs,
            y: ys,
        }
    }
}

/// BarSeries is one labelled value per category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub name: String,
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl BarSeries {
    /// One bar per group, sorted by group key, sized by the group's length
    pub fn from_groups<T>(name: impl Into<String>, groups: &HashMap<String, Vec<T>>) -> Self {
        let mut keys: Vec<&String> = groups.keys().collect();
        keys.sort();
        BarSeries {
            name: name.into(),
            names: keys.iter().map(|k| k.to_string()).collect(),
            values: keys.iter().map(|k| groups[*k].len() as f64).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

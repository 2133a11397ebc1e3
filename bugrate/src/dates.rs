//! Date-keyed counters and the ordering primitive used by every series.
//!
//! `DateCountMap` is unordered. The only way to read it in
//! chronological order is [`DateCountMap::sorted_dates`]; nothing else in the
//! crate relies on iteration order.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Maps an event instant to a count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateCountMap {
    buckets: HashMap<DateTime<Utc>, i64>,
}

impl DateCountMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, date: &DateTime<Utc>) -> Option<i64> {
        self.buckets.get(date).copied()
    }

    /// Creates a zero bucket for `date` unless one already exists
    pub fn anchor(&mut self, date: DateTime<Utc>) {
        self.buckets.entry(date).or_insert(0);
    }

    /// Adds `n` to the bucket for `date` alone, creating it if needed
    pub fn add_at(&mut self, date: DateTime<Utc>, n: i64) {
        *self.buckets.entry(date).or_insert(0) += n;
    }

    pub fn increment_after_date(&mut self, date: DateTime<Utc>) {
        self.add_after_date(date, 1);
    }

    pub fn decrement_after_date(&mut self, date: DateTime<Utc>) {
        self.add_after_date(date, -1);
    }

    /// Adds `n` to every bucket on or after `date`.
    ///
    /// Linear in the number of buckets, so a full accumulation pass is
    /// O(events * dates). A prefix-sum or Fenwick tree over the sorted dates
    /// would replace this if event counts reach the hundreds of thousands.
    pub fn add_after_date(&mut self, date: DateTime<Utc>, n: i64) {
        for (key, value) in self.buckets.iter_mut() {
            if *key >= date {
                *value += n;
            }
        }
    }

    /// Keys in ascending chronological order
    pub fn sorted_dates(&self) -> Vec<DateTime<Utc>> {
        let mut keys: Vec<DateTime<Utc>> = self.buckets.keys().copied().collect();
        keys.sort();
        keys
    }

    /// (date, count) pairs in ascending chronological order
    pub fn sorted_entries(&self) -> Vec<(DateTime<Utc>, i64)> {
        self.sorted_dates()
            .into_iter()
            .map(|date| (date, self.buckets[&date]))
            .collect()
    }

    pub fn first_date(&self) -> Result<DateTime<Utc>> {
        self.buckets
            .keys()
            .min()
            .copied()
            .ok_or(Error::NotAvailable("first date of an empty series"))
    }

    pub fn last_date(&self) -> Result<DateTime<Utc>> {
        self.buckets
            .keys()
            .max()
            .copied()
            .ok_or(Error::NotAvailable("last date of an empty series"))
    }

    /// Value of the bucket at the latest date
    pub fn last_value(&self) -> Result<i64> {
        let date = self.last_date()?;
        Ok(self.buckets[&date])
    }

    /// Reads the map as a step function: the value of the latest bucket at or
    /// before `date`, or 0 when every bucket is later.
    pub fn value_at(&self, date: DateTime<Utc>) -> i64 {
        self.buckets
            .iter()
            .filter(|(key, _)| **key <= date)
            .max_by_key(|(key, _)| **key)
            .map_or(0, |(_, value)| *value)
    }
}

impl FromIterator<(DateTime<Utc>, i64)> for DateCountMap {
    fn from_iter<I: IntoIterator<Item = (DateTime<Utc>, i64)>>(iter: I) -> Self {
        DateCountMap {
            buckets: iter.into_iter().collect(),
        }
    }
}

//! Issue and pull-request statistics for a single forge repository.
//!
//! Raw issues and pull requests are turned into date-keyed counters
//! ([`dates::DateCountMap`]) by the accumulators, grouped and filtered by
//! user or label, and assembled into named [`series::Series`] for charting.

pub mod accumulate;
pub mod charts;
pub mod dates;
pub mod error;
pub mod filter;
pub mod forge;
pub mod references;
pub mod series;
pub mod settings;
pub mod sink;
pub mod storage;
pub mod types;

//! Cache interface and snapshot loading

pub mod json;

use crate::forge::ForgeClient;
use crate::settings::Settings;
use crate::types::*;
use anyhow::{Context, Result};

const LOG_TARGET: &str = "storage";

/// Store persists the two flat collections a snapshot is built from
pub trait Store: Send + Sync {
    /// `None` when nothing has been cached yet
    fn load_issues(&self) -> Result<Option<Vec<Issue>>>;
    fn load_pulls(&self) -> Result<Option<Vec<PullRequest>>>;

    fn save_issues(&self, issues: &[Issue]) -> Result<()>;
    fn save_pulls(&self, pulls: &[PullRequest]) -> Result<()>;

    /// Human-readable location, for diagnostics
    fn describe(&self) -> String;
}

/// Builds a snapshot, reading the cache where allowed and falling back to
/// the forge for any collection the cache does not hold. Fetched data is
/// written back to the store.
pub async fn load_snapshot(
    settings: &Settings,
    store: &dyn Store,
    forge: &dyn ForgeClient,
) -> Result<Snapshot> {
    let cached_issues = if settings.use_cache { store.load_issues()? } else { None };
    let issues = match cached_issues {
        Some(issues) => {
            log::info!(target: LOG_TARGET, "Read {} issues from {}", issues.len(), store.describe());
            issues
        }
        None => {
            let issues = forge.fetch_issues().await.context("fetching issues")?;
            store.save_issues(&issues)?;
            issues
        }
    };

    let cached_pulls = if settings.use_cache { store.load_pulls()? } else { None };
    let pulls = match cached_pulls {
        Some(pulls) => {
            log::info!(target: LOG_TARGET, "Read {} pull requests from {}", pulls.len(), store.describe());
            pulls
        }
        None => {
            let pulls = forge.fetch_pulls().await.context("fetching pull requests")?;
            store.save_pulls(&pulls)?;
            pulls
        }
    };

    Ok(Snapshot::new(issues, pulls))
}

/// Replaces both cached collections with live data
pub async fn refresh(store: &dyn Store, forge: &dyn ForgeClient) -> Result<(usize, usize)> {
    let issues = forge.fetch_issues().await.context("fetching issues")?;
    store.save_issues(&issues)?;
    let pulls = forge.fetch_pulls().await.context("fetching pull requests")?;
    store.save_pulls(&pulls)?;
    Ok((issues.len(), pulls.len()))
}

#[cfg(test)]
mod tests {
    use super::json::JsonCache;
    use super::*;
    use crate::forge::tests::FakeForge;
    use crate::settings::{Overrides, Settings};
    use crate::types::fixtures::*;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn settings(use_cache: bool) -> Settings {
        let mut settings = Settings::load(&Overrides::default()).unwrap();
        settings.use_cache = use_cache;
        settings
    }

    fn cache_in(dir: &TempDir) -> JsonCache {
        JsonCache::new(dir.path().join("issues.cache"), dir.path().join("pulls.cache"))
    }

    #[tokio::test]
    async fn test_missing_cache_falls_back_to_forge_and_writes_back() {
        let dir = TempDir::new().unwrap();
        let store = cache_in(&dir);
        let forge = FakeForge::sample();

        let snapshot = load_snapshot(&settings(true), &store, &forge).await.unwrap();
        assert_eq!(snapshot.issues.len(), 2);
        assert_eq!(snapshot.pulls[0].referenced_issues(), &[1]);
        assert_eq!(forge.calls.load(Ordering::SeqCst), 2);

        // Second load is served from the cache
        let again = load_snapshot(&settings(true), &store, &forge).await.unwrap();
        assert_eq!(again.issues, snapshot.issues);
        assert_eq!(forge.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_only_missing_collection_is_fetched() {
        let dir = TempDir::new().unwrap();
        let store = cache_in(&dir);
        store
            .save_issues(&[issue(9, at(2020, 1, 1), None)])
            .unwrap();
        let forge = FakeForge::sample();

        let snapshot = load_snapshot(&settings(true), &store, &forge).await.unwrap();
        assert_eq!(snapshot.issues.len(), 1);
        assert_eq!(snapshot.pulls.len(), 1);
        assert_eq!(forge.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_disabled_always_fetches() {
        let dir = TempDir::new().unwrap();
        let store = cache_in(&dir);
        let forge = FakeForge::sample();
        load_snapshot(&settings(false), &store, &forge).await.unwrap();
        load_snapshot(&settings(false), &store, &forge).await.unwrap();
        assert_eq!(forge.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_cache() {
        let dir = TempDir::new().unwrap();
        let store = cache_in(&dir);
        let forge = FakeForge::sample();
        let (issues, pulls) = refresh(&store, &forge).await.unwrap();
        assert_eq!((issues, pulls), (2, 1));
        assert_eq!(store.load_issues().unwrap().unwrap().len(), 2);
    }
}

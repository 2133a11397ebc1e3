//! Resolved run configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML
//! file, `BUGRATE_*` environment variables, command-line overrides.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "bugrate.toml";
pub const ENV_PREFIX: &str = "BUGRATE";

/// Day/month/year, e.g. `31/12/2019`
const SINCE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub owner: String,
    pub repo: String,
    pub username: String,
    pub since: String,
    pub quiet: bool,
    pub use_cache: bool,
    pub issues_cache: PathBuf,
    pub pulls_cache: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub compare_users: Vec<String>,
    pub min_fixes: i64,
    #[serde(default)]
    pub label: Option<String>,
    pub api_url: String,
    #[serde(default)]
    pub token: Option<String>,
}

/// Values given on the command line; `None` leaves lower layers in place
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub username: Option<String>,
    pub since: Option<String>,
    pub quiet: Option<bool>,
    pub use_cache: Option<bool>,
    pub output_dir: Option<String>,
    pub compare_users: Option<Vec<String>>,
    pub min_fixes: Option<i64>,
    pub label: Option<String>,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let (file, required) = match &overrides.config_file {
            Some(path) => (path.to_string_lossy().into_owned(), true),
            None => (DEFAULT_CONFIG_FILE.to_string(), false),
        };

        let settings = Config::builder()
            .set_default("owner", "APSIMInitiative")?
            .set_default("repo", "ApsimX")?
            .set_default("username", "hol430")?
            .set_default("since", "1/1/1970")?
            .set_default("quiet", false)?
            .set_default("use_cache", true)?
            .set_default("issues_cache", ".issues.cache")?
            .set_default("pulls_cache", ".pulls.cache")?
            .set_default("output_dir", "charts")?
            .set_default("min_fixes", 100)?
            .set_default("api_url", "https://api.github.com")?
            .add_source(File::new(&file, FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("compare_users"),
            )
            .set_override_option("username", overrides.username.clone())?
            .set_override_option("since", overrides.since.clone())?
            .set_override_option("quiet", overrides.quiet)?
            .set_override_option("use_cache", overrides.use_cache)?
            .set_override_option("output_dir", overrides.output_dir.clone())?
            .set_override_option("compare_users", overrides.compare_users.clone())?
            .set_override_option("min_fixes", overrides.min_fixes)?
            .set_override_option("label", overrides.label.clone())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// The `since` threshold as UTC midnight of the given day
    pub fn since(&self) -> Result<DateTime<Utc>> {
        parse_since(&self.since)
    }
}

pub fn parse_since(value: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), SINCE_FORMAT).map_err(|e| Error::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::load(&Overrides::default()).unwrap();
        assert_eq!(settings.owner, "APSIMInitiative");
        assert_eq!(settings.repo, "ApsimX");
        assert_eq!(settings.min_fixes, 100);
        assert!(settings.use_cache);
        assert!(settings.label.is_none());
    }

    #[test]
    fn test_file_then_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "username = \"zur003\"\nmin_fixes = 5\ncompare_users = [\"a\", \"b\"]").unwrap();

        let overrides = Overrides {
            config_file: Some(file.path().to_path_buf()),
            min_fixes: Some(-1),
            label: Some("bug".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::load(&overrides).unwrap();
        assert_eq!(settings.username, "zur003");
        assert_eq!(settings.min_fixes, -1);
        assert_eq!(settings.compare_users, vec!["a", "b"]);
        assert_eq!(settings.label.as_deref(), Some("bug"));
    }

    #[test]
    fn test_quiet_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "quiet = true").unwrap();
        let overrides = Overrides {
            config_file: Some(file.path().to_path_buf()),
            ..Overrides::default()
        };
        assert!(Settings::load(&overrides).unwrap().quiet);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let overrides = Overrides {
            config_file: Some(PathBuf::from("/nonexistent/bugrate.toml")),
            ..Overrides::default()
        };
        assert!(matches!(Settings::load(&overrides), Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_since() {
        let since = parse_since("31/12/2019").unwrap();
        assert_eq!((since.year(), since.month(), since.day()), (2019, 12, 31));
        assert_eq!(since.hour(), 0);

        let epoch = parse_since("1/1/1970").unwrap();
        assert_eq!(epoch.timestamp(), 0);

        assert!(matches!(parse_since("2019-12-31"), Err(Error::InvalidDate { .. })));
    }
}

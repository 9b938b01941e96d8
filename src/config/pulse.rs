// src/config/pulse.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::trends::DEFAULT_TABLE;

pub const DEFAULT_CONFIG_PATH: &str = "config/pulse.toml";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_REVALIDATE_SECS: u64 = 60;

pub const ENV_CONFIG_PATH: &str = "PULSE_CONFIG_PATH";
pub const ENV_TABLE: &str = "TRENDS_TABLE";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_ENDPOINT_URL: &str = "DYNAMO_ENDPOINT_URL";
pub const ENV_REVALIDATE_SECS: &str = "PAGE_REVALIDATE_SECS";
pub const ENV_FIXTURE_PATH: &str = "TRENDS_FIXTURE_PATH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    /// Trend table name.
    pub table: String,
    pub region: String,
    /// Override for local DynamoDB; `None` uses the regional endpoint.
    pub endpoint_url: Option<String>,
    /// How long a generated page stays fresh.
    pub revalidate_secs: u64,
    /// Serve trends from a JSON fixture instead of DynamoDB.
    pub fixture_path: Option<PathBuf>,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            revalidate_secs: DEFAULT_REVALIDATE_SECS,
            fixture_path: None,
        }
    }
}

impl PulseConfig {
    /// Load using env var + fallbacks:
    /// 1) $PULSE_CONFIG_PATH (must exist)
    /// 2) config/pulse.toml (if present)
    /// 3) built-in defaults
    ///
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path");
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(Path::new(DEFAULT_CONFIG_PATH))?
        } else {
            Self::default()
        };

        base.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        cfg.validate()
    }

    /// Apply overrides from `lookup` (the process environment in production).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get(ENV_TABLE) {
            self.table = v;
        }
        if let Some(v) = get(ENV_REGION) {
            self.region = v;
        }
        if let Some(v) = get(ENV_ENDPOINT_URL) {
            self.endpoint_url = Some(v);
        }
        if let Some(v) = get(ENV_REVALIDATE_SECS) {
            self.revalidate_secs = v
                .parse()
                .map_err(|_| anyhow!("{ENV_REVALIDATE_SECS} must be a whole number of seconds, got '{v}'"))?;
        }
        if let Some(v) = get(ENV_FIXTURE_PATH) {
            self.fixture_path = Some(PathBuf::from(v));
        }
        self.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.table.trim().is_empty() {
            bail!("table name must not be empty");
        }
        if self.revalidate_secs == 0 {
            bail!("revalidate_secs must be at least 1");
        }
        Ok(self)
    }

    pub fn revalidate_window(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_the_trend_table() {
        let cfg = PulseConfig::default();
        assert_eq!(cfg.table, "TrendingData");
        assert_eq!(cfg.revalidate_window(), Duration::from_secs(60));
        assert!(cfg.endpoint_url.is_none());
    }

    #[test]
    fn toml_fields_and_env_overrides() {
        let cfg: PulseConfig = toml::from_str(
            r#"
            region = "eu-central-1"
            revalidate_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.table, "TrendingData");
        assert_eq!(cfg.region, "eu-central-1");

        let cfg = cfg
            .with_overrides(lookup(&[
                (ENV_TABLE, "TrendingStaging"),
                (ENV_ENDPOINT_URL, "http://localhost:8000"),
                (ENV_REGION, "  "),
            ]))
            .unwrap();
        assert_eq!(cfg.table, "TrendingStaging");
        assert_eq!(cfg.endpoint_url.as_deref(), Some("http://localhost:8000"));
        // blank values do not override
        assert_eq!(cfg.region, "eu-central-1");
        assert_eq!(cfg.revalidate_secs, 30);
    }

    #[test]
    fn bad_window_is_rejected() {
        let zero = PulseConfig::default().with_overrides(lookup(&[(ENV_REVALIDATE_SECS, "0")]));
        assert!(zero.is_err());
        let junk = PulseConfig::default().with_overrides(lookup(&[(ENV_REVALIDATE_SECS, "1m")]));
        assert!(junk.is_err());
        assert!(toml::from_str::<PulseConfig>("tabel = \"x\"").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn load_uses_env_path_then_fallbacks() {
        // Isolate CWD so a real config/ in the repo does not interfere
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        for name in [
            ENV_CONFIG_PATH,
            ENV_TABLE,
            ENV_REGION,
            ENV_ENDPOINT_URL,
            ENV_REVALIDATE_SECS,
            ENV_FIXTURE_PATH,
        ] {
            env::remove_var(name);
        }

        // No files -> defaults
        assert_eq!(PulseConfig::load().unwrap(), PulseConfig::default());

        // Env path wins
        let p = tmp.path().join("custom.toml");
        fs::write(&p, "table = \"FromFile\"\nrevalidate_secs = 5\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        let cfg = PulseConfig::load().unwrap();
        assert_eq!(cfg.table, "FromFile");
        assert_eq!(cfg.revalidate_secs, 5);

        // Env override on top of the file
        env::set_var(ENV_REVALIDATE_SECS, "90");
        assert_eq!(PulseConfig::load().unwrap().revalidate_secs, 90);

        env::remove_var(ENV_REVALIDATE_SECS);
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(PulseConfig::load().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}

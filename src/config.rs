use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::catalog::PackageDescriptor;

/// Public npm download-statistics API.
pub const DEFAULT_REGISTRY_URL: &str = "https://api.npmjs.org";

/// Shown whenever live data is unavailable or sums to zero.
pub const DEFAULT_FALLBACK_DISPLAY: &str = "1,276";

/// First day counted towards the aggregate.
pub const DEFAULT_START_DATE: &str = "2024-01-01";

/// Seconds between two refresh cycles of the poller.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

/// Per-request timeout against the registry.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";

/// Top-level configuration for the statistics service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Base URL of the registry statistics API, without trailing slash.
    pub registry_url: String,
    /// Extra headers sent with every registry request.
    pub registry_headers: HashMap<String, String>,
    /// Start of the counted date range; the end is always today.
    pub start_date: NaiveDate,
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Literal displayed when the aggregate is zero.
    pub fallback_display: String,
    /// Address the read-only JSON server binds to.
    pub listen_addr: String,
    /// Overrides the built-in package catalog when set.
    pub packages: Option<Vec<PackageDescriptor>>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            registry_headers: HashMap::new(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            fallback_display: DEFAULT_FALLBACK_DISPLAY.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            packages: None,
        }
    }
}

impl StatsConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: StatsConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.registry_url.trim().is_empty() {
            anyhow::bail!("registry_url must not be empty");
        }
        if self.refresh_interval_secs == 0 {
            anyhow::bail!("refresh_interval_secs must be greater than zero");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }
        if let Some(packages) = &self.packages {
            if packages.is_empty() {
                anyhow::bail!("packages override must not be empty");
            }
            let mut seen = HashSet::new();
            for pkg in packages {
                if !seen.insert(pkg.registry_id.as_str()) {
                    anyhow::bail!("duplicate registry_id in packages: {}", pkg.registry_id);
                }
            }
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The configured package list, or the built-in catalog.
    pub fn packages(&self) -> Vec<PackageDescriptor> {
        self.packages
            .clone()
            .unwrap_or_else(crate::catalog::default_packages)
    }
}

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::{DailyDownloads, DateRange, DownloadSource};
use crate::error::FetchError;

/// Body of `GET /downloads/range/{start}:{end}/{package}`.
#[derive(Debug, Deserialize)]
struct RangeResponse {
    downloads: Vec<DailyDownloads>,
    #[serde(default)]
    package: Option<String>,
}

/// Download statistics from the public npm registry API.
pub struct NpmRegistrySource {
    client: Client,
    base_url: String,
    /// Sent with every request, e.g. an auth token for a private mirror.
    headers: HashMap<String, String>,
}

impl NpmRegistrySource {
    pub fn new(
        base_url: String,
        timeout: Duration,
        headers: HashMap<String, String>,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("zksdk-stats/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    pub fn url_for(&self, package: &str, range: DateRange) -> String {
        format!("{}/downloads/range/{}/{}", self.base_url, range, package)
    }

    fn build_request(&self, url: &str) -> RequestBuilder {
        let mut req = self.client.get(url).header("Accept", "application/json");
        for (k, v) in &self.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        req
    }
}

#[async_trait]
impl DownloadSource for NpmRegistrySource {
    async fn fetch_daily(
        &self,
        package: &str,
        range: DateRange,
    ) -> Result<Vec<DailyDownloads>, FetchError> {
        let url = self.url_for(package, range);
        debug!("registry fetch package={} range={}", package, range);

        let resp = self.build_request(&url).send().await?;
        let status = resp.status();
        if status.as_u16() == 404 {
            warn!("registry fetch package={} not found", package);
            return Err(FetchError::NotFound(package.to_string()));
        }
        if !status.is_success() {
            warn!(
                "registry fetch failed status={} package={}",
                status.as_u16(),
                package
            );
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        let parsed: RangeResponse = serde_json::from_str(&body)?;
        if let Some(name) = parsed.package.as_deref() {
            if name != package {
                debug!("registry answered for package={} asked={}", name, package);
            }
        }
        debug!(
            "registry fetch package={} days={}",
            package,
            parsed.downloads.len()
        );
        Ok(parsed.downloads)
    }
}

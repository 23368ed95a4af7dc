//! Release listing client
//!
//! Fetches the release list of an upstream repository and selects, per
//! release, the asset that matches a project's naming pattern.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::network::{network_of, DEFAULT_NETWORK};
use crate::project::{AssetPattern, ProjectSpec};
use crate::{Error, Result};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Releases scanned per wanted release in each network.
const SCAN_FACTOR: usize = 10;

/// Number of networks worth of releases collected before scanning stops.
const NETWORK_SPAN: usize = 3;

/// Largest page the release API hands out.
const MAX_PAGE_SIZE: usize = 100;

/// Release asset as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Release as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRelease {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ApiAsset>,
}

/// A release with the asset selected for pinning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub url: String,
    pub filename: String,
}

/// Build the HTTP client shared by the fetcher and the hasher.
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("release-pin/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Release API client
#[derive(Clone)]
pub struct ReleaseClient {
    client: reqwest::Client,
    api_base: String,
    per_network: usize,
}

impl ReleaseClient {
    /// Create a client for `api_base`, keeping `per_network` releases per network.
    pub fn new(client: reqwest::Client, api_base: &str, per_network: usize) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            per_network: per_network.max(1),
        }
    }

    fn page_size(&self) -> usize {
        (self.per_network * SCAN_FACTOR).min(MAX_PAGE_SIZE)
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers
    }

    /// List the most recent releases of `repo` ("owner/name"), newest first.
    pub async fn list_releases(&self, repo: &str) -> Result<Vec<ApiRelease>> {
        let url = format!("{}/repos/{}/releases", self.api_base, repo);
        debug!("GET {} (per_page={})", url, self.page_size());

        let response = self
            .client
            .get(&url)
            .headers(Self::build_headers())
            .query(&[("per_page", self.page_size())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Api(format!(
                "Failed to list releases for {}: {}",
                repo,
                response.status()
            )));
        }

        response.json().await.map_err(Error::Http)
    }

    /// Fetch the releases of a project that carry a matching asset.
    ///
    /// Failures are logged and degrade to an empty list.
    pub async fn fetch(&self, project: &ProjectSpec) -> Vec<Release> {
        info!(
            "Fetching latest {} releases for {}...",
            self.per_network, project.id
        );

        let releases = match self.list_releases(&project.repo).await {
            Ok(releases) => releases,
            Err(e) => {
                warn!("Failed to fetch releases for {}: {}", project.id, e);
                return Vec::new();
            }
        };

        let selected = select_releases(&releases, &project.asset, self.per_network);
        if selected.is_empty() {
            warn!("No releases found for {}", project.id);
        }
        selected
    }
}

/// Pick releases with a matching asset, newest first.
///
/// Only the first `10 × per_network` releases are scanned. Each named network
/// yields at most `per_network` releases; untagged releases are only bounded
/// by the overall cap of `3 × per_network`.
pub fn select_releases(
    releases: &[ApiRelease],
    pattern: &AssetPattern,
    per_network: usize,
) -> Vec<Release> {
    let total_cap = per_network * NETWORK_SPAN;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut selected = Vec::new();

    for release in releases.iter().take(per_network * SCAN_FACTOR) {
        let Some(asset) = release.assets.iter().find(|a| pattern.matches(&a.name)) else {
            continue;
        };

        let network = network_of(&release.tag_name);
        if network != DEFAULT_NETWORK {
            let count = counts.entry(network).or_insert(0);
            *count += 1;
            if *count > per_network {
                continue;
            }
        }

        selected.push(Release {
            tag: release.tag_name.clone(),
            url: asset.browser_download_url.clone(),
            filename: asset.name.clone(),
        });

        if selected.len() >= total_cap {
            break;
        }
    }

    selected
}

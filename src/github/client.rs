//! Concrete GitHub REST client used by the production pipeline.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::{GithubConfig, HarvestConfig};
use crate::models::{ContributorPage, SearchResults};

use super::pagination;
use super::GithubApi;

/// REST client for the two GitHub endpoints the harvest touches.
pub struct GithubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
    search_per_page: u32,
}

impl GithubClient {
    pub fn new(github: &GithubConfig, harvest: &HarvestConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(github.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_base: github.api_base.trim_end_matches('/').to_string(),
            token: github.token.clone(),
            search_per_page: harvest.search_per_page,
        }
    }

    /// Builds a GET request with the headers GitHub's REST API expects.
    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn search_repositories(&self, query: &str) -> Result<SearchResults> {
        let url = format!(
            "{}/search/repositories?q={}&per_page={}",
            self.api_base,
            urlencoding::encode(query),
            self.search_per_page
        );
        debug!("GET {}", url);

        let response = self
            .request(&url)
            .send()
            .await
            .context("failed to send repository search request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("repository search returned HTTP {}", status);
        }

        response
            .json::<SearchResults>()
            .await
            .context("failed to parse repository search response")
    }

    async fn contributor_page(&self, full_name: &str, page: u32) -> Result<ContributorPage> {
        let url = format!(
            "{}/repos/{}/contributors?page={}",
            self.api_base, full_name, page
        );
        debug!("GET {}", url);

        let response = self
            .request(&url)
            .send()
            .await
            .with_context(|| format!("failed to send contributor request for {full_name}"))?;

        let status = response.status();

        // An empty repository answers 204 with no body.
        if status == StatusCode::NO_CONTENT {
            return Ok(ContributorPage {
                records: Vec::new(),
                last_page: None,
            });
        }

        if !status.is_success() {
            anyhow::bail!(
                "contributor listing for {} page {} returned HTTP {}",
                full_name,
                page,
                status
            );
        }

        let last_page = response
            .headers()
            .get("link")
            .and_then(|value| value.to_str().ok())
            .and_then(pagination::last_page);

        let records = response
            .json()
            .await
            .with_context(|| format!("failed to parse contributors for {full_name} page {page}"))?;

        Ok(ContributorPage { records, last_page })
    }
}

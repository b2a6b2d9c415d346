//! GitHub REST API access
//!
//! This module provides the read-only GitHub surface the harvest needs: one
//! repository search call and paginated contributor listings. The [`GithubApi`]
//! trait is the seam the collector depends on, so tests can swap the real
//! client for a scripted one.

pub mod client;
pub mod pagination;

pub use client::GithubClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ContributorPage, SearchResults};

/// The GitHub REST endpoints the harvest consumes.
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Runs the repository search and returns its first page of results.
    async fn search_repositories(&self, query: &str) -> Result<SearchResults>;

    /// Fetches one page of a repository's contributor listing.
    ///
    /// `page` is 1-based. The returned page carries the `rel="last"` page
    /// number when the response advertised one.
    async fn contributor_page(&self, full_name: &str, page: u32) -> Result<ContributorPage>;
}

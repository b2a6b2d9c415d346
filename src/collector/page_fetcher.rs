//! Single-page contributor fetches with failure tagging.

use std::sync::Arc;

use crate::errors::FetchError;
use crate::github::GithubApi;
use crate::models::ContributorPage;

/// Fetches one contributor page and tags every failure with the repository
/// and 1-based page number it belongs to.
#[derive(Clone)]
pub struct PageFetcher {
    api: Arc<dyn GithubApi>,
}

impl PageFetcher {
    pub fn new(api: Arc<dyn GithubApi>) -> Self {
        Self { api }
    }

    /// Fetches `page` of the repository's contributor listing.
    ///
    /// A returned page without pagination metadata means the listing fits on
    /// a single page. Failures are not retried here; they propagate upward.
    pub async fn fetch(&self, full_name: &str, page: u32) -> Result<ContributorPage, FetchError> {
        self.api
            .contributor_page(full_name, page)
            .await
            .map_err(|e| FetchError::contributor_page(full_name, page, e.to_string()))
    }
}

//! Contributor collection: page fan-out and in-order reassembly
//!
//! One collector drives the full contributor listing of one repository. Page 1
//! is fetched first to learn the page count from the response's pagination
//! metadata; the remaining pages are fetched with bounded fan-out and stitched
//! back together in ascending page order.

pub mod page_fetcher;

pub use page_fetcher::PageFetcher;

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::errors::FetchError;
use crate::github::GithubApi;
use crate::models::{CollectedRepository, ContributorPage, RepoRecord};

/// Gathers the complete contributor list for one repository.
pub struct ContributorCollector {
    fetcher: PageFetcher,
    max_concurrent_pages: usize,
}

impl ContributorCollector {
    pub fn new(api: Arc<dyn GithubApi>, max_concurrent_pages: usize) -> Self {
        Self {
            fetcher: PageFetcher::new(api),
            max_concurrent_pages: max_concurrent_pages.max(1),
        }
    }

    /// Fetches every contributor page of `repository` and concatenates them
    /// in ascending page order.
    ///
    /// Page 1 is fetched exactly once and its records reused; when the
    /// listing spans more pages, pages `2..=last` are fetched with bounded
    /// fan-out. `buffered` yields completed fetches in input order, so the
    /// concatenation is in page order regardless of completion order. A
    /// single-page repository issues no further fetches, and an empty
    /// listing yields an empty list rather than an error.
    pub async fn collect(
        &self,
        repository: RepoRecord,
    ) -> Result<CollectedRepository, FetchError> {
        let full_name = repository.full_name.clone();
        let first = self.fetcher.fetch(&full_name, 1).await?;
        let last_page = first.last_page.unwrap_or(1);

        let mut contributors = first.records;
        if last_page > 1 {
            let remaining: Vec<ContributorPage> = stream::iter((2..=last_page).map(|page| {
                let fetcher = self.fetcher.clone();
                let full_name = full_name.clone();
                async move { fetcher.fetch(&full_name, page).await }
            }))
            .buffered(self.max_concurrent_pages)
            .try_collect()
            .await?;

            for page in remaining {
                contributors.extend(page.records);
            }
        }

        debug!(
            "collected {} contributors across {} pages for {}",
            contributors.len(),
            last_page,
            full_name
        );

        Ok(CollectedRepository {
            repository,
            contributors,
        })
    }
}

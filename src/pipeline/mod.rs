//! Harvest pipeline orchestration
//!
//! One [`Pipeline`] drives a complete run: repository search, per-repository
//! contributor collection with bounded fan-out, transformation, the two bulk
//! loads, and finally index creation plus store teardown. The index/teardown
//! phase runs no matter what happened earlier, so pool connections are never
//! leaked behind a failed run. Every failure is logged with its context the
//! moment it is recorded, and the full list travels out in the
//! [`HarvestReport`].

pub mod report;
pub mod state;

pub use report::HarvestReport;
pub use state::PipelineState;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::collector::ContributorCollector;
use crate::config::HarvestConfig;
use crate::database::loader::BulkLoader;
use crate::database::{schema, SqlStore};
use crate::errors::{FetchError, HarvestError};
use crate::github::GithubApi;
use crate::models::{CollectedRepository, ContributorRow, ProjectRow, RepoRecord, SqlValue};
use crate::transform;

/// Drives one harvest run end to end.
pub struct Pipeline {
    api: Arc<dyn GithubApi>,
    store: Arc<dyn SqlStore>,
    config: HarvestConfig,
    state: PipelineState,
}

impl Pipeline {
    pub fn new(api: Arc<dyn GithubApi>, store: Arc<dyn SqlStore>, config: HarvestConfig) -> Self {
        Self {
            api,
            store,
            config,
            state: PipelineState::Searching,
        }
    }

    /// Runs search, collection and loading, then always creates the indexes
    /// and closes the store, whatever happened before.
    pub async fn run(mut self) -> HarvestReport {
        let started_at = Utc::now();
        let mut failures: Vec<HarvestError> = Vec::new();
        let mut repositories_found = 0usize;
        let mut repositories_collected = 0usize;
        let mut project_rows = 0u64;
        let mut contributor_rows = 0u64;

        // The destination tables must exist before anything loads. A failure
        // here skips the harvest body but still reaches index/teardown.
        let tables_ready = match schema::create_tables(self.store.as_ref()).await {
            Ok(()) => true,
            Err(e) => {
                let e = HarvestError::schema(e.to_string());
                error!("{e}");
                failures.push(e);
                false
            }
        };

        if tables_ready {
            info!("searching repositories: {}", self.config.query);
            let repositories = match self.api.search_repositories(&self.config.query).await {
                Ok(results) => {
                    info!(
                        "search returned {} repositories ({} total matches upstream)",
                        results.items.len(),
                        results.total_count
                    );
                    results.items
                }
                Err(e) => {
                    let e: HarvestError = FetchError::search(e.to_string()).into();
                    error!("{e}");
                    failures.push(e);
                    Vec::new()
                }
            };
            repositories_found = repositories.len();

            if repositories.is_empty() {
                // Zero results (or a failed search): nothing to collect or
                // load, but indexes are still safe to create on empty tables.
                self.advance(PipelineState::Indexing);
            } else {
                self.advance(PipelineState::Collecting);
                let collected = self.collect_all(&repositories, &mut failures).await;
                repositories_collected = collected.len();

                self.advance(PipelineState::Loading);
                let (projects, contributors) =
                    self.transform_rows(&repositories, &collected, &mut failures);
                (project_rows, contributor_rows) =
                    self.load_all(projects, contributors, &mut failures).await;

                self.advance(PipelineState::Indexing);
            }
        } else {
            self.advance(PipelineState::Indexing);
        }

        // Index creation and teardown run on every path.
        for failure in schema::create_indexes(self.store.as_ref()).await {
            let e: HarvestError = failure.into();
            error!("{e}");
            failures.push(e);
        }
        self.store.close().await;

        let terminal = if failures.is_empty() {
            PipelineState::Done
        } else {
            PipelineState::Failed
        };
        self.advance(terminal);

        let report = HarvestReport {
            state: self.state,
            started_at,
            finished_at: Utc::now(),
            repositories_found,
            repositories_collected,
            project_rows,
            contributor_rows,
            failures,
        };
        info!("harvest finished: {report}");
        report
    }

    /// Runs every repository's contributor collection with bounded fan-out.
    ///
    /// A failed collection is logged with its repository and page context and
    /// recorded; it does not stop the other collections and does not remove
    /// the repository's search-result row from the project load.
    async fn collect_all(
        &self,
        repositories: &[RepoRecord],
        failures: &mut Vec<HarvestError>,
    ) -> Vec<CollectedRepository> {
        let collector =
            ContributorCollector::new(self.api.clone(), self.config.max_concurrent_pages);

        let outcomes: Vec<Result<CollectedRepository, FetchError>> =
            stream::iter(repositories.to_vec())
                .map(|repository| collector.collect(repository))
                .buffer_unordered(self.config.max_concurrent_repos.max(1))
                .collect()
                .await;

        let mut collected = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(collection) => collected.push(collection),
                Err(e) => {
                    let e: HarvestError = e.into();
                    error!("{e}");
                    failures.push(e);
                }
            }
        }
        collected
    }

    /// Maps API records onto destination rows.
    ///
    /// Every search result produces a project row, including repositories
    /// whose contributor collection failed. Contributor rows come only from
    /// complete collections, so a partially fetched listing is never loaded,
    /// and only from repositories whose project row transformed cleanly, so
    /// no contributor row can reference a project this run does not insert.
    fn transform_rows(
        &self,
        repositories: &[RepoRecord],
        collected: &[CollectedRepository],
        failures: &mut Vec<HarvestError>,
    ) -> (Vec<ProjectRow>, Vec<ContributorRow>) {
        let mut projects = Vec::with_capacity(repositories.len());
        let mut loadable = HashSet::with_capacity(repositories.len());
        for repository in repositories {
            match transform::repository_row(repository) {
                Ok(row) => {
                    loadable.insert(row.id);
                    projects.push(row);
                }
                Err(e) => {
                    let e: HarvestError = e.into();
                    error!("{e}");
                    failures.push(e);
                }
            }
        }

        let mut contributors = Vec::new();
        for collection in collected {
            if !loadable.contains(&collection.repository.id) {
                warn!(
                    "skipping {} contributors of {}: its project row was rejected",
                    collection.contributors.len(),
                    collection.repository.full_name
                );
                continue;
            }
            match transform::contributor_rows(&collection.repository, &collection.contributors) {
                Ok(rows) => contributors.extend(rows),
                Err(e) => {
                    let e: HarvestError = e.into();
                    error!("{e}");
                    failures.push(e);
                }
            }
        }

        (projects, contributors)
    }

    /// Issues both bulk loads concurrently and waits for both outcomes.
    async fn load_all(
        &self,
        projects: Vec<ProjectRow>,
        contributors: Vec<ContributorRow>,
        failures: &mut Vec<HarvestError>,
    ) -> (u64, u64) {
        let loader = BulkLoader::new(self.store.as_ref(), self.config.insert_chunk_size);

        let project_values: Vec<Vec<SqlValue>> =
            projects.into_iter().map(ProjectRow::into_values).collect();
        let contributor_values: Vec<Vec<SqlValue>> = contributors
            .into_iter()
            .map(ContributorRow::into_values)
            .collect();

        let (project_outcome, contributor_outcome) = tokio::join!(
            loader.load(ProjectRow::TABLE, &ProjectRow::COLUMNS, project_values),
            loader.load(
                ContributorRow::TABLE,
                &ContributorRow::COLUMNS,
                contributor_values
            ),
        );

        let mut loaded = (0u64, 0u64);
        match project_outcome {
            Ok(count) => loaded.0 = count,
            Err(e) => {
                let e: HarvestError = e.into();
                error!("{e}");
                failures.push(e);
            }
        }
        match contributor_outcome {
            Ok(count) => loaded.1 = count,
            Err(e) => {
                let e: HarvestError = e.into();
                error!("{e}");
                failures.push(e);
            }
        }
        loaded
    }

    fn advance(&mut self, next: PipelineState) {
        if !self.state.can_transition_to(next) {
            warn!("unexpected state transition {} -> {}", self.state, next);
        } else {
            info!("pipeline state {} -> {}", self.state, next);
        }
        self.state = next;
    }
}

//! End-to-end pipeline runs against a scripted API and a recording store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use repo_harvest::config::HarvestConfig;
use repo_harvest::database::SqlStore;
use repo_harvest::errors::HarvestError;
use repo_harvest::github::GithubApi;
use repo_harvest::models::{ContributorPage, ContributorRecord, OwnerRecord, RepoRecord, SearchResults};
use repo_harvest::pipeline::{Pipeline, PipelineState};

/// Scripted API: a fixed search result plus contributor listings keyed by
/// repository, one inner vec per page.
struct ScriptedApi {
    repositories: Vec<RepoRecord>,
    listings: HashMap<String, Vec<Vec<ContributorRecord>>>,
    failing_page: Option<(String, u32)>,
    search_fails: bool,
}

impl ScriptedApi {
    fn new(repositories: Vec<RepoRecord>) -> Self {
        Self {
            repositories,
            listings: HashMap::new(),
            failing_page: None,
            search_fails: false,
        }
    }

    fn with_listing(mut self, repo: &str, pages: Vec<Vec<ContributorRecord>>) -> Self {
        self.listings.insert(repo.to_string(), pages);
        self
    }

    fn with_failing_page(mut self, repo: &str, page: u32) -> Self {
        self.failing_page = Some((repo.to_string(), page));
        self
    }

    fn with_failing_search(mut self) -> Self {
        self.search_fails = true;
        self
    }
}

#[async_trait]
impl GithubApi for ScriptedApi {
    async fn search_repositories(&self, _query: &str) -> Result<SearchResults> {
        if self.search_fails {
            anyhow::bail!("403 rate limit exceeded");
        }
        Ok(SearchResults {
            total_count: self.repositories.len() as u64,
            incomplete_results: false,
            items: self.repositories.clone(),
        })
    }

    async fn contributor_page(&self, full_name: &str, page: u32) -> Result<ContributorPage> {
        if let Some((failing_repo, failing_page)) = &self.failing_page {
            if failing_repo == full_name && *failing_page == page {
                anyhow::bail!("502 Bad Gateway");
            }
        }

        let pages = self
            .listings
            .get(full_name)
            .ok_or_else(|| anyhow::anyhow!("unknown repository {full_name}"))?;
        let records = pages
            .get((page - 1) as usize)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("page {page} out of range for {full_name}"))?;

        Ok(ContributorPage {
            records,
            last_page: (pages.len() > 1).then_some(pages.len() as u32),
        })
    }
}

/// Recording store: keeps every executed statement in order and remembers
/// whether the pool was closed. Optionally rejects INSERT statements.
struct RecordingStore {
    statements: Mutex<Vec<String>>,
    fail_inserts: bool,
    closed: AtomicBool,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            fail_inserts: false,
            closed: AtomicBool::new(false),
        }
    }

    fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Self::new()
        }
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn statements_starting_with(&self, prefix: &str) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| s.starts_with(prefix))
            .collect()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SqlStore for RecordingStore {
    async fn execute(&self, statement: &str) -> Result<u64> {
        if self.fail_inserts && statement.starts_with("INSERT") {
            anyhow::bail!("server has gone away");
        }
        self.statements.lock().unwrap().push(statement.to_string());
        Ok(0)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

fn repository(full_name: &str, id: u64) -> RepoRecord {
    RepoRecord {
        id,
        name: full_name.split('/').last().unwrap().to_string(),
        full_name: full_name.to_string(),
        description: Some("a test repository".to_string()),
        owner: Some(OwnerRecord {
            id: id * 100,
            login: full_name.split('/').next().unwrap().to_string(),
        }),
        homepage: None,
        watchers_count: 5,
        forks_count: 2,
        stargazers_count: 9,
    }
}

fn contributor(login: &str, id: u64) -> ContributorRecord {
    ContributorRecord {
        login: Some(login.to_string()),
        id: Some(id),
        contributions: 1,
    }
}

fn contributors(prefix: &str, count: usize) -> Vec<ContributorRecord> {
    (0..count)
        .map(|i| contributor(&format!("{prefix}{i}"), i as u64 + 1))
        .collect()
}

fn test_config() -> HarvestConfig {
    HarvestConfig {
        query: "drupal in:description language:php".to_string(),
        search_per_page: 100,
        max_concurrent_repos: 4,
        max_concurrent_pages: 2,
        insert_chunk_size: 500,
    }
}

/// Counts value tuples in a rendered INSERT. Every test row opens with a
/// quoted text cell, so each tuple starts with `('`.
fn tuple_count(statement: &str) -> usize {
    statement.matches("('").count()
}

#[tokio::test]
async fn test_two_repositories_load_every_row() {
    // Repo A has one page of 3 contributors, repo B has three pages of
    // 250 + 250 + 40. Everything lands: 2 project rows, 543 contributors.
    let api = Arc::new(
        ScriptedApi::new(vec![repository("acme/a", 1), repository("acme/b", 2)])
            .with_listing("acme/a", vec![contributors("a_", 3)])
            .with_listing(
                "acme/b",
                vec![
                    contributors("b_p1_", 250),
                    contributors("b_p2_", 250),
                    contributors("b_p3_", 40),
                ],
            ),
    );
    let store = Arc::new(RecordingStore::new());

    let report = Pipeline::new(api, store.clone(), test_config()).run().await;

    assert!(report.is_success(), "failures: {:?}", report.failures);
    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.repositories_found, 2);
    assert_eq!(report.repositories_collected, 2);
    assert_eq!(report.project_rows, 2);
    assert_eq!(report.contributor_rows, 543);

    let project_inserts = store.statements_starting_with("INSERT INTO projects ");
    assert_eq!(project_inserts.len(), 1);
    assert_eq!(tuple_count(&project_inserts[0]), 2);
    assert!(project_inserts[0].contains("('a', "));
    assert!(project_inserts[0].contains("('b', "));

    // 543 rows at a 500-row chunk: one full statement and one of 43.
    let contributor_inserts = store.statements_starting_with("INSERT INTO project_contributors ");
    assert_eq!(contributor_inserts.len(), 2);
    assert_eq!(tuple_count(&contributor_inserts[0]), 500);
    assert_eq!(tuple_count(&contributor_inserts[1]), 43);

    // The last page of repo B made it in, each login exactly once.
    let all_inserts = contributor_inserts.join("\n");
    assert_eq!(all_inserts.matches("'b_p3_").count(), 40);
    assert_eq!(all_inserts.matches("'b_p3_39'").count(), 1);
    assert_eq!(all_inserts.matches("'a_0'").count(), 1);

    // Tables first, indexes last, pool closed.
    let statements = store.statements();
    assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS"));
    assert!(statements[1].starts_with("CREATE TABLE IF NOT EXISTS"));
    let index_statements = store.statements_starting_with("ALTER TABLE");
    assert_eq!(index_statements.len(), 5);
    assert!(statements[statements.len() - 5..]
        .iter()
        .all(|s| s.starts_with("ALTER TABLE")));
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_zero_search_results_still_index_and_close() {
    let api = Arc::new(ScriptedApi::new(Vec::new()));
    let store = Arc::new(RecordingStore::new());

    let report = Pipeline::new(api, store.clone(), test_config()).run().await;

    assert!(report.is_success());
    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.repositories_found, 0);
    assert_eq!(report.project_rows, 0);
    assert_eq!(report.contributor_rows, 0);

    assert!(store.statements_starting_with("INSERT").is_empty());
    assert_eq!(store.statements_starting_with("ALTER TABLE").len(), 5);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_page_failure_keeps_other_repositories_and_project_rows() {
    // Page 2 of repo B fails. Repo A's contributors and both project rows
    // still load; none of B's contributors may land.
    let api = Arc::new(
        ScriptedApi::new(vec![repository("acme/a", 1), repository("acme/b", 2)])
            .with_listing("acme/a", vec![contributors("a_", 3)])
            .with_listing(
                "acme/b",
                vec![
                    contributors("b_p1_", 250),
                    contributors("b_p2_", 250),
                    contributors("b_p3_", 40),
                ],
            )
            .with_failing_page("acme/b", 2),
    );
    let store = Arc::new(RecordingStore::new());

    let report = Pipeline::new(api, store.clone(), test_config()).run().await;

    assert!(!report.is_success());
    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(report.repositories_found, 2);
    assert_eq!(report.repositories_collected, 1);
    assert_eq!(report.project_rows, 2);
    assert_eq!(report.contributor_rows, 3);

    let failure = report.first_failure().unwrap().to_string();
    assert!(failure.contains("acme/b"), "missing repo: {failure}");
    assert!(failure.contains("page 2"), "missing page: {failure}");

    let contributor_inserts = store.statements_starting_with("INSERT INTO project_contributors ");
    assert_eq!(contributor_inserts.len(), 1);
    assert_eq!(tuple_count(&contributor_inserts[0]), 3);
    assert!(!contributor_inserts[0].contains("'b_"));

    let project_inserts = store.statements_starting_with("INSERT INTO projects ");
    assert_eq!(project_inserts.len(), 1);
    assert_eq!(tuple_count(&project_inserts[0]), 2);

    // Indexing and teardown run regardless of the failure.
    assert_eq!(store.statements_starting_with("ALTER TABLE").len(), 5);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_repository_without_owner_loads_no_rows_at_all() {
    // The ownerless repository cannot produce a project row, so its
    // contributors must not land either; the other repository is unaffected.
    let mut ownerless = repository("acme/orphan", 3);
    ownerless.owner = None;

    let api = Arc::new(
        ScriptedApi::new(vec![repository("acme/a", 1), ownerless])
            .with_listing("acme/a", vec![contributors("a_", 3)])
            .with_listing("acme/orphan", vec![contributors("orphan_", 2)]),
    );
    let store = Arc::new(RecordingStore::new());

    let report = Pipeline::new(api, store.clone(), test_config()).run().await;

    assert!(!report.is_success());
    let failure = report.first_failure().unwrap().to_string();
    assert!(failure.contains("owner"), "missing field: {failure}");
    assert!(failure.contains("acme/orphan"), "missing repo: {failure}");

    assert_eq!(report.project_rows, 1);
    assert_eq!(report.contributor_rows, 3);

    let contributor_inserts = store.statements_starting_with("INSERT INTO project_contributors ");
    assert_eq!(contributor_inserts.len(), 1);
    assert!(!contributor_inserts[0].contains("'orphan_"));

    let project_inserts = store.statements_starting_with("INSERT INTO projects ");
    assert_eq!(tuple_count(&project_inserts[0]), 1);
}

#[tokio::test]
async fn test_load_failure_still_indexes_and_closes() {
    let api = Arc::new(
        ScriptedApi::new(vec![repository("acme/a", 1)])
            .with_listing("acme/a", vec![contributors("a_", 3)]),
    );
    let store = Arc::new(RecordingStore::failing_inserts());

    let report = Pipeline::new(api, store.clone(), test_config()).run().await;

    assert!(!report.is_success());
    assert_eq!(report.state, PipelineState::Failed);
    assert_eq!(report.failures.len(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f, HarvestError::Load(_))));

    assert_eq!(store.statements_starting_with("ALTER TABLE").len(), 5);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_search_failure_still_indexes_and_closes() {
    let api = Arc::new(ScriptedApi::new(Vec::new()).with_failing_search());
    let store = Arc::new(RecordingStore::new());

    let report = Pipeline::new(api, store.clone(), test_config()).run().await;

    assert!(!report.is_success());
    assert_eq!(report.state, PipelineState::Failed);
    assert!(matches!(
        report.first_failure(),
        Some(HarvestError::Fetch(_))
    ));
    assert!(report.first_failure().unwrap().to_string().contains("403"));

    assert!(store.statements_starting_with("INSERT").is_empty());
    assert_eq!(store.statements_starting_with("ALTER TABLE").len(), 5);
    assert!(store.is_closed());
}

//! Destination DDL: table creation and the post-load index statements.

use futures::future::join_all;
use tracing::info;

use crate::errors::IndexError;

use super::SqlStore;

pub const CREATE_PROJECTS: &str = "CREATE TABLE IF NOT EXISTS projects (name VARCHAR(256), description TEXT, id INTEGER UNSIGNED PRIMARY KEY, owner_id INTEGER UNSIGNED, homepage TEXT, watchers_cnt INTEGER UNSIGNED, forks_cnt INTEGER UNSIGNED, stargazers_cnt INTEGER UNSIGNED);";

pub const CREATE_PROJECT_CONTRIBUTORS: &str = "CREATE TABLE IF NOT EXISTS project_contributors (login VARCHAR(256), id INTEGER UNSIGNED, project_id INTEGER UNSIGNED);";

/// Read/join indexes added after loading, keyed by index name.
///
/// Adding them post-load keeps the bulk inserts free of incremental index
/// maintenance.
pub const INDEX_STATEMENTS: [(&str, &str); 5] = [
    (
        "join_pc_on_pj_idx",
        "ALTER TABLE project_contributors ADD INDEX join_pc_on_pj_idx(id, project_id);",
    ),
    (
        "join_pj_on_pc_idx",
        "ALTER TABLE project_contributors ADD INDEX join_pj_on_pc_idx(project_id, id);",
    ),
    (
        "project_id_idx",
        "ALTER TABLE project_contributors ADD INDEX project_id_idx(project_id);",
    ),
    (
        "login_idx",
        "ALTER TABLE project_contributors ADD INDEX login_idx(login(255));",
    ),
    (
        "name_idx",
        "ALTER TABLE projects ADD INDEX name_idx(name(255));",
    ),
];

/// Creates both destination tables if they do not exist yet.
pub async fn create_tables(store: &dyn SqlStore) -> anyhow::Result<()> {
    let (projects, contributors) = tokio::join!(
        store.execute(CREATE_PROJECTS),
        store.execute(CREATE_PROJECT_CONTRIBUTORS)
    );
    projects?;
    contributors?;

    info!("destination tables ready");
    Ok(())
}

/// Creates the five read/join indexes.
///
/// All statements run concurrently, each on its own pooled connection. Every
/// failure is collected and returned; one failing index does not stop the
/// others.
pub async fn create_indexes(store: &dyn SqlStore) -> Vec<IndexError> {
    let attempts = INDEX_STATEMENTS.iter().map(|(name, statement)| async move {
        store
            .execute(statement)
            .await
            .map_err(|e| IndexError::new(*name, e.to_string()))
    });

    let failures: Vec<IndexError> = join_all(attempts)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();

    if failures.is_empty() {
        info!("created {} indexes", INDEX_STATEMENTS.len());
    }
    failures
}

//! Data shapes shared across the harvest pipeline: the GitHub API payloads we
//! deserialize and the destination-table rows the transformer produces.

use serde::{Deserialize, Serialize};

/// Envelope returned by the repository search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<RepoRecord>,
}

/// One repository entry from a search result page.
///
/// Fields the API legitimately omits or nulls stay optional so that a sparse
/// record deserializes cleanly and the transformer can decide what is fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoRecord {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<OwnerRecord>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub stargazers_count: u64,
}

/// The owning account embedded in a repository record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub id: u64,
    pub login: String,
}

/// One contributor entry from a contributor listing page.
///
/// Anonymous contributors come back without `login` or `id`, so both stay
/// optional here and are validated during transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorRecord {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub contributions: u64,
}

/// One fetched page of contributors together with the pagination metadata
/// needed to plan the remaining fetches.
#[derive(Debug, Clone)]
pub struct ContributorPage {
    pub records: Vec<ContributorRecord>,
    /// Page number carried by the `rel="last"` link header, or `None` when
    /// the response carried no pagination metadata (single-page listing).
    pub last_page: Option<u32>,
}

/// A repository paired with its fully reassembled contributor list, as
/// produced by the collector.
#[derive(Debug, Clone)]
pub struct CollectedRepository {
    pub repository: RepoRecord,
    pub contributors: Vec<ContributorRecord>,
}

/// A scalar cell in a destination-table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    UInt(u64),
    Text(String),
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::UInt(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Option<String>> for SqlValue {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => SqlValue::Text(text),
            None => SqlValue::Null,
        }
    }
}

impl From<Option<u64>> for SqlValue {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(number) => SqlValue::UInt(number),
            None => SqlValue::Null,
        }
    }
}

/// One row destined for the `projects` table, fields in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub name: String,
    pub description: Option<String>,
    pub id: u64,
    pub owner_id: u64,
    pub homepage: Option<String>,
    pub watchers_cnt: u64,
    pub forks_cnt: u64,
    pub stargazers_cnt: u64,
}

impl ProjectRow {
    pub const TABLE: &'static str = "projects";
    pub const COLUMNS: [&'static str; 8] = [
        "name",
        "description",
        "id",
        "owner_id",
        "homepage",
        "watchers_cnt",
        "forks_cnt",
        "stargazers_cnt",
    ];

    /// Flattens the row into cells, preserving column order.
    pub fn into_values(self) -> Vec<SqlValue> {
        vec![
            self.name.into(),
            self.description.into(),
            self.id.into(),
            self.owner_id.into(),
            self.homepage.into(),
            self.watchers_cnt.into(),
            self.forks_cnt.into(),
            self.stargazers_cnt.into(),
        ]
    }
}

/// One row destined for the `project_contributors` table, fields in column
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContributorRow {
    pub login: String,
    pub id: u64,
    pub project_id: u64,
}

impl ContributorRow {
    pub const TABLE: &'static str = "project_contributors";
    pub const COLUMNS: [&'static str; 3] = ["login", "id", "project_id"];

    /// Flattens the row into cells, preserving column order.
    pub fn into_values(self) -> Vec<SqlValue> {
        vec![self.login.into(), self.id.into(), self.project_id.into()]
    }
}

//! Error type definitions for the harvest pipeline
//!
//! Each pipeline stage has its own error kind carrying enough context to
//! diagnose a failed run from the logs alone: the repository and page for
//! fetch failures, the table and row count for load failures, the index
//! name for index failures.

use thiserror::Error;

/// Top-level pipeline error type
///
/// Stage errors convert into this enum via `From` so they can cross the
/// orchestrator boundary without losing their context.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Network/API failures fetching search results or contributor pages
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Malformed or incomplete source records
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Bulk insert statement failures
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Post-load index creation failures
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Failures creating the destination tables
    #[error("Schema error: {message}")]
    Schema { message: String },
}

/// Network/API failures while talking to the code-hosting API
#[derive(Error, Debug)]
pub enum FetchError {
    /// The repository search request failed
    #[error("repository search failed: {message}")]
    Search { message: String },

    /// A contributor page request failed; carries the repository and the
    /// 1-based page number so the failed slice can be identified
    #[error("contributor page {page} of '{repo}' failed: {message}")]
    ContributorPage {
        repo: String,
        page: u32,
        message: String,
    },
}

/// Data-integrity faults in records coming off the API
///
/// These should not occur against a well-formed API; they surface as
/// reported faults rather than panics.
#[derive(Error, Debug)]
pub enum TransformError {
    /// A record is missing a field the destination row requires
    #[error("missing field '{field}' in record for repository '{repo}'")]
    MissingField { field: &'static str, repo: String },
}

/// A bulk insert statement failed
///
/// Rows already committed by earlier statements of the same load remain in
/// the store; the count here is the number of rows the failed load carried.
#[derive(Error, Debug)]
#[error("bulk insert into {table} ({rows} rows) failed: {message}")]
pub struct LoadError {
    pub table: String,
    pub rows: usize,
    pub message: String,
}

/// An index creation statement failed
///
/// Non-fatal to data durability: rows are already committed when the index
/// phase runs. Reported so the operator can create the index manually.
#[derive(Error, Debug)]
#[error("creating index {index} failed: {message}")]
pub struct IndexError {
    pub index: String,
    pub message: String,
}

impl HarvestError {
    /// Create a schema error with a custom message
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

impl FetchError {
    /// Create a search error
    pub fn search<M: Into<String>>(message: M) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a contributor page error tagged with repository and page
    pub fn contributor_page<R: Into<String>, M: Into<String>>(
        repo: R,
        page: u32,
        message: M,
    ) -> Self {
        Self::ContributorPage {
            repo: repo.into(),
            page,
            message: message.into(),
        }
    }
}

impl TransformError {
    /// Create a missing field error for a repository's record
    pub fn missing_field<R: Into<String>>(field: &'static str, repo: R) -> Self {
        Self::MissingField {
            field,
            repo: repo.into(),
        }
    }
}

impl LoadError {
    /// Create a load error for a table and the row count attempted
    pub fn new<T: Into<String>, M: Into<String>>(table: T, rows: usize, message: M) -> Self {
        Self {
            table: table.into(),
            rows,
            message: message.into(),
        }
    }
}

impl IndexError {
    /// Create an index creation error
    pub fn new<I: Into<String>, M: Into<String>>(index: I, message: M) -> Self {
        Self {
            index: index.into(),
            message: message.into(),
        }
    }
}

//! Pure mapping from API records onto destination-table rows.
//!
//! No I/O happens here. Inputs are taken by reference and cloned into
//! independently-owned rows, so repeated calls on the same input yield
//! structurally equal, unshared outputs.

use crate::errors::TransformError;
use crate::models::{ContributorRecord, ContributorRow, ProjectRow, RepoRecord};

/// Maps a search-result repository onto its `projects` row.
///
/// A repository without an owner cannot produce `owner_id`; that is a
/// data-integrity fault, not a panic.
pub fn repository_row(repository: &RepoRecord) -> Result<ProjectRow, TransformError> {
    let owner = repository
        .owner
        .as_ref()
        .ok_or_else(|| TransformError::missing_field("owner", repository.full_name.clone()))?;

    Ok(ProjectRow {
        name: repository.name.clone(),
        description: repository.description.clone(),
        id: repository.id,
        owner_id: owner.id,
        homepage: repository.homepage.clone(),
        watchers_cnt: repository.watchers_count,
        forks_cnt: repository.forks_count,
        stargazers_cnt: repository.stargazers_count,
    })
}

/// Maps one repository's contributors onto `project_contributors` rows.
///
/// Anonymous contributor entries carry neither login nor id and are reported
/// as missing-field faults naming the repository they came from.
pub fn contributor_rows(
    repository: &RepoRecord,
    contributors: &[ContributorRecord],
) -> Result<Vec<ContributorRow>, TransformError> {
    contributors
        .iter()
        .map(|contributor| {
            let login = contributor
                .login
                .clone()
                .ok_or_else(|| TransformError::missing_field("login", repository.full_name.clone()))?;
            let id = contributor
                .id
                .ok_or_else(|| TransformError::missing_field("id", repository.full_name.clone()))?;

            Ok(ContributorRow {
                login,
                id,
                project_id: repository.id,
            })
        })
        .collect()
}

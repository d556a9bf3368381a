use indexmap::IndexMap;
use serde::Serialize;

use crate::normalize::{CodeRecord, CommitRecord, RepoRecord};
use crate::transform::RepoCommitStats;

/// Filter echo for the repository report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoFilters {
    pub min_stars: Option<u64>,
    pub language: Option<String>,
}

/// Sort echo for the repository report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub sort_by: Option<String>,
    pub sort_direction: String,
}

/// Repository search report. Exactly one of `groups` and `repositories` is
/// present, depending on whether grouping was requested. Field order is the
/// emission order.
#[derive(Debug, Serialize)]
pub struct ReposReport {
    pub query: String,
    pub api_base: String,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub returned: usize,
    pub filters: RepoFilters,
    pub sorting: SortSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<IndexMap<Option<String>, Vec<RepoRecord>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<RepoRecord>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeFilters {
    pub repo: Option<String>,
    pub language: Option<String>,
    pub path: Option<String>,
}

/// Code search report: always a flat result list.
#[derive(Debug, Serialize)]
pub struct CodeReport {
    pub query: String,
    pub api_base: String,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub returned: usize,
    pub filters: CodeFilters,
    pub results: Vec<CodeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitFilters {
    pub repo: Option<String>,
    pub author: Option<String>,
    pub committer: Option<String>,
}

/// Commit search report. Exactly one of `repositories` (aggregated stats)
/// and `commits` (flat list) is present.
#[derive(Debug, Serialize)]
pub struct CommitsReport {
    pub query: String,
    pub api_base: String,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub returned: usize,
    pub filters: CommitFilters,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<RepoCommitStats>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<CommitRecord>>,
}

pub mod types;

pub use types::{
    CodeFilters, CodeReport, CommitFilters, CommitsReport, RepoFilters, ReposReport, SortSpec,
};

use crate::config::{CodeSettings, CommitsSettings, ReposSettings};
use crate::normalize::{CodeRecord, CommitRecord, RepoRecord};
use crate::search::SearchResult;
use crate::transform;

/// Assemble the repository report. Top-N truncation happens here, after
/// filter/sort and before the optional group-by-language branch.
pub fn build_repos_report(
    raw: &SearchResult,
    records: Vec<RepoRecord>,
    settings: &ReposSettings,
) -> ReposReport {
    let mut processed = records;
    if let Some(top_n) = settings.top_n.filter(|n| *n > 0) {
        processed.truncate(top_n);
    }
    let returned = processed.len();
    let (group_by, groups, repositories) = if settings.group_by_language {
        (
            Some("language".to_string()),
            Some(transform::group_by_language(&processed)),
            None,
        )
    } else {
        (None, None, Some(processed))
    };
    ReposReport {
        query: raw.query.clone(),
        api_base: settings.api_base.clone(),
        total_count: raw.total_count,
        incomplete_results: raw.incomplete_results,
        returned,
        filters: RepoFilters {
            min_stars: settings.min_stars,
            language: settings.language.clone(),
        },
        sorting: SortSpec {
            sort_by: settings.sort_by.clone(),
            sort_direction: settings.sort_direction.clone(),
        },
        group_by,
        groups,
        repositories,
    }
}

/// Assemble the code report: flat results plus the filter echo.
pub fn build_code_report(
    raw: &SearchResult,
    records: Vec<CodeRecord>,
    settings: &CodeSettings,
) -> CodeReport {
    CodeReport {
        query: raw.query.clone(),
        api_base: settings.api_base.clone(),
        total_count: raw.total_count,
        incomplete_results: raw.incomplete_results,
        returned: records.len(),
        filters: CodeFilters {
            repo: settings.repo.clone(),
            language: settings.language.clone(),
            path: settings.path.clone(),
        },
        results: records,
    }
}

/// Assemble the commit report: aggregated per-repository stats when the
/// stats flag is set, otherwise the flat commit list.
pub fn build_commits_report(
    raw: &SearchResult,
    records: Vec<CommitRecord>,
    settings: &CommitsSettings,
) -> CommitsReport {
    let returned = records.len();
    let (repositories, commits) = if settings.stats {
        (Some(transform::aggregate_commits_by_repo(&records)), None)
    } else {
        (None, Some(records))
    };
    CommitsReport {
        query: raw.query.clone(),
        api_base: settings.api_base.clone(),
        total_count: raw.total_count,
        incomplete_results: raw.incomplete_results,
        returned,
        filters: CommitFilters {
            repo: settings.repo.clone(),
            author: settings.author.clone(),
            committer: settings.committer.clone(),
        },
        repositories,
        commits,
    }
}

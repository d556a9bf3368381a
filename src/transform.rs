//! Pure transforms over normalized records: filter, sort, group, aggregate.
//! Nothing here mutates its input; every function returns a fresh sequence
//! or mapping.

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::normalize::{CommitRecord, RepoRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortOptionsError {
    #[error("sort-by must be one of: stars, forks, updated, created")]
    InvalidKey,

    #[error("sort-direction must be 'asc' or 'desc'")]
    InvalidDirection,
}

/// Reject unknown sort keys and directions before any network call. The
/// transforms themselves stay permissive; this is the strict gate at the
/// command layer.
pub fn validate_sort_options(
    sort_by: Option<&str>,
    sort_direction: &str,
) -> Result<(), SortOptionsError> {
    if let Some(key) = sort_by {
        if !matches!(key, "stars" | "forks" | "updated" | "created") {
            return Err(SortOptionsError::InvalidKey);
        }
    }
    let direction = sort_direction.to_lowercase();
    if direction != "asc" && direction != "desc" {
        return Err(SortOptionsError::InvalidDirection);
    }
    Ok(())
}

/// Keep repositories with at least `min_stars` stars and, when a language
/// filter is active, a case-insensitive matching language. Records with no
/// language are excluded by an active language filter.
pub fn apply_filters(
    repos: &[RepoRecord],
    min_stars: Option<u64>,
    language: Option<&str>,
) -> Vec<RepoRecord> {
    let language = language.map(str::to_lowercase);
    repos
        .iter()
        .filter(|repo| min_stars.is_none_or(|min| repo.stars >= min))
        .filter(|repo| {
            language.as_deref().is_none_or(|wanted| {
                repo.language
                    .as_deref()
                    .is_some_and(|lang| lang.to_lowercase() == wanted)
            })
        })
        .cloned()
        .collect()
}

/// Stable sort by one of the known keys. Unrecognized keys are a no-op; a
/// missing key with a descending direction reverses the input, matching the
/// long-standing behavior downstream consumers rely on. Missing numeric keys
/// sort as 0 and missing timestamps as the empty string.
pub fn apply_sorting(
    repos: &[RepoRecord],
    sort_by: Option<&str>,
    sort_direction: &str,
) -> Vec<RepoRecord> {
    let ascending = sort_direction.eq_ignore_ascii_case("asc");
    let mut sorted = repos.to_vec();
    match sort_by {
        Some("stars") => sort_numeric(&mut sorted, ascending, |repo| repo.stars),
        Some("forks") => sort_numeric(&mut sorted, ascending, |repo| repo.forks),
        Some("updated") => sort_timestamp(&mut sorted, ascending, |repo| {
            repo.updated_at.clone().unwrap_or_default()
        }),
        Some("created") => sort_timestamp(&mut sorted, ascending, |repo| {
            repo.created_at.clone().unwrap_or_default()
        }),
        None => {
            if !ascending {
                sorted.reverse();
            }
        }
        Some(_) => {}
    }
    sorted
}

fn sort_numeric<K>(repos: &mut [RepoRecord], ascending: bool, key: K)
where
    K: Fn(&RepoRecord) -> u64,
{
    // Stable sort with a reversed comparator keeps ties in input order for
    // descending runs too.
    if ascending {
        repos.sort_by(|a, b| key(a).cmp(&key(b)));
    } else {
        repos.sort_by(|a, b| key(b).cmp(&key(a)));
    }
}

fn sort_timestamp<K>(repos: &mut [RepoRecord], ascending: bool, key: K)
where
    K: Fn(&RepoRecord) -> String,
{
    if ascending {
        repos.sort_by(|a, b| key(a).cmp(&key(b)));
    } else {
        repos.sort_by(|a, b| key(b).cmp(&key(a)));
    }
}

/// Partition repositories by language, preserving per-group insertion order.
/// Records without a language land in the `None` bucket.
pub fn group_by_language(
    repos: &[RepoRecord],
) -> IndexMap<Option<String>, Vec<RepoRecord>> {
    let mut groups: IndexMap<Option<String>, Vec<RepoRecord>> = IndexMap::new();
    for repo in repos {
        groups
            .entry(repo.language.clone())
            .or_default()
            .push(repo.clone());
    }
    groups
}

/// Per-repository commit summary produced by [`aggregate_commits_by_repo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoCommitStats {
    pub repository_full_name: String,
    pub repository_html_url: Option<String>,
    pub total_number_of_commits: u64,
}

/// Fold commits into one summary per distinct repository. The html_url comes
/// from the first commit seen for that repository; commits with no
/// repository name are skipped.
pub fn aggregate_commits_by_repo(commits: &[CommitRecord]) -> Vec<RepoCommitStats> {
    let mut stats: IndexMap<String, RepoCommitStats> = IndexMap::new();
    for commit in commits {
        let Some(name) = commit.repository_full_name.as_deref() else {
            continue;
        };
        stats
            .entry(name.to_owned())
            .or_insert_with(|| RepoCommitStats {
                repository_full_name: name.to_owned(),
                repository_html_url: commit.repository_html_url.clone(),
                total_number_of_commits: 0,
            })
            .total_number_of_commits += 1;
    }
    stats.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: u64, language: Option<&str>) -> RepoRecord {
        RepoRecord {
            full_name: Some(name.to_string()),
            html_url: None,
            description: None,
            stars,
            watchers: 0,
            forks: 0,
            language: language.map(str::to_owned),
            archived: false,
            fork: false,
            topics: vec![],
            license: None,
            default_branch: None,
            pushed_at: None,
            updated_at: None,
            created_at: None,
            score: None,
        }
    }

    fn names(repos: &[RepoRecord]) -> Vec<&str> {
        repos
            .iter()
            .filter_map(|repo| repo.full_name.as_deref())
            .collect()
    }

    fn commit(repo: Option<&str>, url: Option<&str>) -> CommitRecord {
        CommitRecord {
            sha: None,
            html_url: None,
            url: None,
            message: None,
            author_name: None,
            author_email: None,
            author_date: None,
            committer_name: None,
            committer_email: None,
            committer_date: None,
            repository_full_name: repo.map(str::to_owned),
            repository_html_url: url.map(str::to_owned),
            score: None,
        }
    }

    #[test]
    fn test_filter_by_min_stars() {
        let repos = vec![
            repo("a/a", 100, None),
            repo("b/b", 50, None),
            repo("c/c", 200, None),
        ];
        let filtered = apply_filters(&repos, Some(100), None);
        assert_eq!(names(&filtered), vec!["a/a", "c/c"]);
    }

    #[test]
    fn test_filter_by_language_case_insensitive() {
        let repos = vec![
            repo("a/a", 0, Some("Python")),
            repo("b/b", 0, Some("Rust")),
            repo("c/c", 0, None),
        ];
        let filtered = apply_filters(&repos, None, Some("python"));
        assert_eq!(names(&filtered), vec!["a/a"]);
    }

    #[test]
    fn test_filters_compose() {
        let repos = vec![
            repo("a/a", 150, Some("Rust")),
            repo("b/b", 150, Some("Go")),
            repo("c/c", 10, Some("Rust")),
        ];
        let filtered = apply_filters(&repos, Some(100), Some("rust"));
        assert_eq!(names(&filtered), vec!["a/a"]);
    }

    #[test]
    fn test_no_filters_returns_all() {
        let repos = vec![repo("a/a", 1, None), repo("b/b", 2, None)];
        assert_eq!(apply_filters(&repos, None, None).len(), 2);
    }

    #[test]
    fn test_sort_by_stars_asc() {
        let repos = vec![
            repo("a/a", 50, None),
            repo("b/b", 100, None),
            repo("c/c", 25, None),
        ];
        let sorted = apply_sorting(&repos, Some("stars"), "asc");
        assert_eq!(names(&sorted), vec!["c/c", "a/a", "b/b"]);
    }

    #[test]
    fn test_sort_by_stars_desc() {
        let repos = vec![
            repo("a/a", 50, None),
            repo("b/b", 100, None),
            repo("c/c", 25, None),
        ];
        let sorted = apply_sorting(&repos, Some("stars"), "desc");
        assert_eq!(names(&sorted), vec!["b/b", "a/a", "c/c"]);
    }

    #[test]
    fn test_sort_desc_is_stable_on_ties() {
        let repos = vec![
            repo("first", 10, None),
            repo("second", 10, None),
            repo("third", 20, None),
        ];
        let sorted = apply_sorting(&repos, Some("stars"), "desc");
        assert_eq!(names(&sorted), vec!["third", "first", "second"]);
    }

    #[test]
    fn test_sort_by_updated_missing_sorts_first_asc() {
        let mut newer = repo("newer", 0, None);
        newer.updated_at = Some("2024-05-01T00:00:00Z".to_string());
        let repos = vec![newer, repo("missing", 0, None)];
        let sorted = apply_sorting(&repos, Some("updated"), "asc");
        assert_eq!(names(&sorted), vec!["missing", "newer"]);
    }

    #[test]
    fn test_sort_unrecognized_key_is_noop() {
        let repos = vec![repo("a/a", 1, None), repo("b/b", 2, None)];
        let sorted = apply_sorting(&repos, Some("watchers"), "desc");
        assert_eq!(names(&sorted), vec!["a/a", "b/b"]);
    }

    #[test]
    fn test_sort_without_key_desc_reverses() {
        // Documented behavior: no sort key with the default descending
        // direction reverses the API ordering.
        let repos = vec![repo("a/a", 1, None), repo("b/b", 2, None)];
        let sorted = apply_sorting(&repos, None, "desc");
        assert_eq!(names(&sorted), vec!["b/b", "a/a"]);
        let unchanged = apply_sorting(&repos, None, "asc");
        assert_eq!(names(&unchanged), vec!["a/a", "b/b"]);
    }

    #[test]
    fn test_group_by_language_buckets() {
        let repos = vec![
            repo("a/a", 0, Some("Python")),
            repo("b/b", 0, Some("JavaScript")),
            repo("c/c", 0, Some("Python")),
            repo("d/d", 0, None),
        ];
        let groups = group_by_language(&repos);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&Some("Python".to_string())].len(), 2);
        assert_eq!(groups[&Some("JavaScript".to_string())].len(), 1);
        assert_eq!(groups[&None].len(), 1);
        // Insertion order: first-seen language first.
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys[0].as_deref(), Some("Python"));
        assert_eq!(keys[2], None);
    }

    #[test]
    fn test_aggregate_commits_by_repo() {
        let commits = vec![
            commit(Some("octo/repo1"), Some("https://github.com/octo/repo1")),
            commit(Some("octo/repo2"), Some("https://github.com/octo/repo2")),
            commit(Some("octo/repo1"), None),
        ];
        let stats = aggregate_commits_by_repo(&commits);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].repository_full_name, "octo/repo1");
        assert_eq!(stats[0].total_number_of_commits, 2);
        assert_eq!(
            stats[0].repository_html_url.as_deref(),
            Some("https://github.com/octo/repo1")
        );
        assert_eq!(stats[1].total_number_of_commits, 1);
    }

    #[test]
    fn test_aggregate_skips_commits_without_repository() {
        // Documented behavior: repo-less commits are dropped, not an error.
        let commits = vec![commit(None, None), commit(Some("octo/repo1"), None)];
        let stats = aggregate_commits_by_repo(&commits);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_number_of_commits, 1);
    }

    #[test]
    fn test_validate_sort_options() {
        assert!(validate_sort_options(None, "desc").is_ok());
        assert!(validate_sort_options(Some("stars"), "ASC").is_ok());
        assert_eq!(
            validate_sort_options(Some("watchers"), "desc"),
            Err(SortOptionsError::InvalidKey)
        );
        assert_eq!(
            validate_sort_options(Some("stars"), "sideways"),
            Err(SortOptionsError::InvalidDirection)
        );
    }

    #[test]
    fn test_transforms_do_not_mutate_input() {
        let repos = vec![repo("a/a", 1, Some("Rust")), repo("b/b", 2, None)];
        let before = repos.clone();
        let _ = apply_filters(&repos, Some(2), None);
        let _ = apply_sorting(&repos, Some("stars"), "asc");
        let _ = group_by_language(&repos);
        assert_eq!(repos, before);
    }
}

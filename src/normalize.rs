//! Raw search items arrive as loosely-shaped JSON, one schema per search
//! kind. Normalization flattens each item into a fixed record with null-safe
//! defaults so every downstream transform works on a stable shape.

use serde::Serialize;
use serde_json::Value;

/// Maps one raw API item into a flat record. Missing keys take the
/// documented default; nested objects are flattened here and never escape.
pub trait Normalize: Sized {
    fn from_raw(item: &Value) -> Self;
}

/// Normalize a full page-accumulated item sequence.
pub fn normalize<R: Normalize>(items: &[Value]) -> Vec<R> {
    items.iter().map(R::from_raw).collect()
}

fn text(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn count(item: &Value, key: &str) -> u64 {
    item.get(key).and_then(Value::as_u64).unwrap_or(0)
}

fn flag(item: &Value, key: &str) -> bool {
    item.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// A nested sub-object, or null when absent or not an object, so field
/// lookups never fail.
fn nested<'a>(item: &'a Value, key: &str) -> &'a Value {
    static NULL: Value = Value::Null;
    item.get(key)
        .filter(|value| value.is_object())
        .unwrap_or(&NULL)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LicenseRecord {
    pub key: Option<String>,
    pub name: Option<String>,
    pub spdx_id: Option<String>,
}

/// Flattened repository search item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoRecord {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub description: Option<String>,
    pub stars: u64,
    pub watchers: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub archived: bool,
    pub fork: bool,
    pub topics: Vec<String>,
    pub license: Option<LicenseRecord>,
    pub default_branch: Option<String>,
    pub pushed_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
    pub score: Option<f64>,
}

impl Normalize for RepoRecord {
    fn from_raw(item: &Value) -> Self {
        let license = item
            .get("license")
            .filter(|value| value.is_object())
            .map(|license| LicenseRecord {
                key: text(license, "key"),
                name: text(license, "name"),
                spdx_id: text(license, "spdx_id"),
            });
        let topics = item
            .get("topics")
            .and_then(Value::as_array)
            .map(|topics| {
                topics
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            full_name: text(item, "full_name"),
            html_url: text(item, "html_url"),
            description: text(item, "description"),
            stars: count(item, "stargazers_count"),
            watchers: count(item, "watchers_count"),
            forks: count(item, "forks_count"),
            language: text(item, "language"),
            archived: flag(item, "archived"),
            fork: flag(item, "fork"),
            topics,
            license,
            default_branch: text(item, "default_branch"),
            pushed_at: text(item, "pushed_at"),
            updated_at: text(item, "updated_at"),
            created_at: text(item, "created_at"),
            score: item.get("score").and_then(Value::as_f64),
        }
    }
}

/// Flattened code search match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeRecord {
    pub name: Option<String>,
    pub path: Option<String>,
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub repository_full_name: Option<String>,
    pub repository_html_url: Option<String>,
}

impl Normalize for CodeRecord {
    fn from_raw(item: &Value) -> Self {
        let repository = nested(item, "repository");
        Self {
            name: text(item, "name"),
            path: text(item, "path"),
            sha: text(item, "sha"),
            html_url: text(item, "html_url"),
            repository_full_name: text(repository, "full_name"),
            repository_html_url: text(repository, "html_url"),
        }
    }
}

/// Flattened commit search item. `message` keeps the first line only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    pub sha: Option<String>,
    pub html_url: Option<String>,
    pub url: Option<String>,
    pub message: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub author_date: Option<String>,
    pub committer_name: Option<String>,
    pub committer_email: Option<String>,
    pub committer_date: Option<String>,
    pub repository_full_name: Option<String>,
    pub repository_html_url: Option<String>,
    pub score: Option<f64>,
}

impl Normalize for CommitRecord {
    fn from_raw(item: &Value) -> Self {
        let commit = nested(item, "commit");
        let author = nested(commit, "author");
        let committer = nested(commit, "committer");
        let repository = nested(item, "repository");
        let message = commit
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(|message| message.split('\n').next().unwrap_or_default().to_owned());
        Self {
            sha: text(item, "sha"),
            html_url: text(item, "html_url"),
            url: text(item, "url"),
            message,
            author_name: text(author, "name"),
            author_email: text(author, "email"),
            author_date: text(author, "date"),
            committer_name: text(committer, "name"),
            committer_email: text(committer, "email"),
            committer_date: text(committer, "date"),
            repository_full_name: text(repository, "full_name"),
            repository_html_url: text(repository, "html_url"),
            score: item.get("score").and_then(Value::as_f64),
        }
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Public GitHub API, used when nothing else resolves.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Token environment variables checked by the search commands, in order.
pub const SEARCH_TOKEN_ENV: &[&str] = &["GHSEARCH_TOKEN", "GITHUB_TOKEN"];

/// Token environment variables checked by the mutation commands, in order.
/// `GHE_TOKEN` is the legacy enterprise variable.
pub const PR_TOKEN_ENV: &[&str] = &["GHPR_TOKEN", "GHE_TOKEN", "GITHUB_TOKEN"];

const DEFAULT_PER_PAGE: u32 = 50;
const DEFAULT_MAX_PAGES: u32 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("--owner and --repo are required")]
    MissingOwnerRepo,

    #[error("--token is required")]
    MissingToken,
}

/// Top-level config file shape: one section per command family, every field
/// optional. Loaded from YAML (preferred) or JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub ghpr: PrSection,

    #[serde(default)]
    pub repos: ReposSection,

    #[serde(default)]
    pub code: CodeSection,

    #[serde(default)]
    pub commits: CommitsSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrSection {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub proxy: Option<String>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReposSection {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub min_stars: Option<u64>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub group_by_language: Option<bool>,
    pub top_n: Option<usize>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeSection {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub repo: Option<String>,
    pub language: Option<String>,
    pub path: Option<String>,
    pub verify_tls: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitsSection {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub repo: Option<String>,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub stats: Option<bool>,
    pub verify_tls: Option<bool>,
}

/// Load the config file, falling back to `~/<default_file_name>` when no
/// explicit path is given. A missing or malformed file is never fatal: it
/// yields an empty config (with a warning for explicit paths and parse
/// failures) and resolution falls through to environment/defaults.
pub fn load_config(explicit: Option<&Path>, default_file_name: &str) -> FileConfig {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => match dirs::home_dir() {
            Some(home) => home.join(default_file_name),
            None => return FileConfig::default(),
        },
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!(path = %path.display(), "config file not found");
        }
        return FileConfig::default();
    }

    let data = match fs::read_to_string(&path) {
        Ok(data) => data,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read config file");
            return FileConfig::default();
        }
    };
    if data.trim().is_empty() {
        return FileConfig::default();
    }

    parse_config(&data).unwrap_or_else(|| {
        warn!(path = %path.display(), "failed to parse config file");
        FileConfig::default()
    })
}

/// Try YAML first, then JSON.
fn parse_config(data: &str) -> Option<FileConfig> {
    if let Ok(config) = serde_yaml::from_str(data) {
        return Some(config);
    }
    serde_json::from_str(data).ok()
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| env::var(key).ok().filter(|value| !value.is_empty()))
}

/// Determine which auth token to use: CLI flag, then config file, then the
/// given environment variables in order.
pub fn resolve_auth_token(
    cli_token: Option<&str>,
    config_token: Option<&str>,
    env_keys: &[&str],
) -> Option<String> {
    if let Some(token) = cli_token {
        return Some(token.to_string());
    }
    if let Some(token) = config_token {
        return Some(token.to_string());
    }
    first_env(env_keys)
}

/// Determine the API base URL with precedence CLI > config > env > default.
/// `enterprise_env_key` names a legacy base-URL variable whose value is
/// converted to an API base before use.
pub fn resolve_api_base(
    cli_api_base: Option<&str>,
    config_api_base: Option<&str>,
    env_key: &str,
    enterprise_env_key: Option<&str>,
) -> String {
    if let Some(base) = cli_api_base {
        return base.to_string();
    }
    if let Some(base) = config_api_base {
        return base.to_string();
    }
    if let Some(base) = first_env(&[env_key]) {
        return base;
    }
    if let Some(key) = enterprise_env_key {
        if let Some(base) = first_env(&[key]) {
            return enterprise_api_base(&base);
        }
    }
    DEFAULT_API_BASE.to_string()
}

/// Convert an enterprise base URL into an API base by appending `/api/v3`
/// after stripping any trailing slash. Idempotent.
pub fn enterprise_api_base(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/api/v3") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api/v3")
    }
}

/// CLI-supplied values for the `repos` command; `None` falls through to the
/// config file, environment, and built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct ReposOverrides {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub min_stars: Option<u64>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
    pub group_by_language: Option<bool>,
    pub top_n: Option<usize>,
    pub verify_tls: Option<bool>,
}

/// Effective settings for one `repos` invocation. Immutable once resolved.
#[derive(Debug, Clone)]
pub struct ReposSettings {
    pub api_base: String,
    pub token: Option<String>,
    pub query: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub min_stars: Option<u64>,
    pub language: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: String,
    pub group_by_language: bool,
    pub top_n: Option<usize>,
    pub verify_tls: bool,
}

impl ReposSettings {
    pub fn resolve(config: &FileConfig, cli: ReposOverrides) -> Self {
        let section = &config.repos;
        Self {
            api_base: resolve_api_base(
                cli.api_base.as_deref(),
                section.api_base.as_deref(),
                "GHSEARCH_API_BASE",
                None,
            ),
            token: resolve_auth_token(
                cli.token.as_deref(),
                section.token.as_deref(),
                SEARCH_TOKEN_ENV,
            ),
            query: cli
                .query
                .or_else(|| section.query.clone())
                .unwrap_or_else(|| "topic:astro topic:template".to_string()),
            per_page: cli.per_page.or(section.per_page).unwrap_or(DEFAULT_PER_PAGE),
            max_pages: cli
                .max_pages
                .or(section.max_pages)
                .unwrap_or(DEFAULT_MAX_PAGES),
            min_stars: cli.min_stars.or(section.min_stars),
            language: cli.language.or_else(|| section.language.clone()),
            sort_by: cli.sort_by.or_else(|| section.sort_by.clone()),
            sort_direction: cli
                .sort_direction
                .or_else(|| section.sort_direction.clone())
                .unwrap_or_else(|| "desc".to_string()),
            group_by_language: cli
                .group_by_language
                .or(section.group_by_language)
                .unwrap_or(false),
            top_n: cli.top_n.or(section.top_n),
            verify_tls: cli.verify_tls.or(section.verify_tls).unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeOverrides {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub repo: Option<String>,
    pub language: Option<String>,
    pub path: Option<String>,
    pub verify_tls: Option<bool>,
}

/// Effective settings for one `code` invocation.
#[derive(Debug, Clone)]
pub struct CodeSettings {
    pub api_base: String,
    pub token: Option<String>,
    pub query: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub repo: Option<String>,
    pub language: Option<String>,
    pub path: Option<String>,
    pub verify_tls: bool,
}

impl CodeSettings {
    pub fn resolve(config: &FileConfig, cli: CodeOverrides) -> Self {
        let section = &config.code;
        Self {
            api_base: resolve_api_base(
                cli.api_base.as_deref(),
                section.api_base.as_deref(),
                "GHSEARCH_API_BASE",
                None,
            ),
            token: resolve_auth_token(
                cli.token.as_deref(),
                section.token.as_deref(),
                SEARCH_TOKEN_ENV,
            ),
            query: cli
                .query
                .or_else(|| section.query.clone())
                .unwrap_or_else(|| "test".to_string()),
            per_page: cli.per_page.or(section.per_page).unwrap_or(DEFAULT_PER_PAGE),
            max_pages: cli
                .max_pages
                .or(section.max_pages)
                .unwrap_or(DEFAULT_MAX_PAGES),
            repo: cli.repo.or_else(|| section.repo.clone()),
            language: cli.language.or_else(|| section.language.clone()),
            path: cli.path.or_else(|| section.path.clone()),
            verify_tls: cli.verify_tls.or(section.verify_tls).unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommitsOverrides {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub query: Option<String>,
    pub per_page: Option<u32>,
    pub max_pages: Option<u32>,
    pub repo: Option<String>,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub stats: Option<bool>,
    pub verify_tls: Option<bool>,
}

/// Effective settings for one `commits` invocation.
#[derive(Debug, Clone)]
pub struct CommitsSettings {
    pub api_base: String,
    pub token: Option<String>,
    pub query: String,
    pub per_page: u32,
    pub max_pages: u32,
    pub repo: Option<String>,
    pub author: Option<String>,
    pub committer: Option<String>,
    pub stats: bool,
    pub verify_tls: bool,
}

impl CommitsSettings {
    pub fn resolve(config: &FileConfig, cli: CommitsOverrides) -> Self {
        let section = &config.commits;
        Self {
            api_base: resolve_api_base(
                cli.api_base.as_deref(),
                section.api_base.as_deref(),
                "GHSEARCH_API_BASE",
                None,
            ),
            token: resolve_auth_token(
                cli.token.as_deref(),
                section.token.as_deref(),
                SEARCH_TOKEN_ENV,
            ),
            query: cli
                .query
                .or_else(|| section.query.clone())
                .unwrap_or_else(|| "fix".to_string()),
            per_page: cli.per_page.or(section.per_page).unwrap_or(DEFAULT_PER_PAGE),
            max_pages: cli
                .max_pages
                .or(section.max_pages)
                .unwrap_or(DEFAULT_MAX_PAGES),
            repo: cli.repo.or_else(|| section.repo.clone()),
            author: cli.author.or_else(|| section.author.clone()),
            committer: cli.committer.or_else(|| section.committer.clone()),
            stats: cli.stats.or(section.stats).unwrap_or(false),
            verify_tls: cli.verify_tls.or(section.verify_tls).unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrOverrides {
    pub api_base: Option<String>,
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub proxy: Option<String>,
    pub verify_tls: Option<bool>,
}

/// Effective settings for one `ghpr` invocation. Owner and repo additionally
/// fall back to the legacy `GHE_PROJECT` / `GHE_REPO_NAME` variables.
#[derive(Debug, Clone)]
pub struct PrSettings {
    pub api_base: String,
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub proxy: Option<String>,
    pub verify_tls: bool,
}

impl PrSettings {
    pub fn resolve(config: &FileConfig, cli: PrOverrides) -> Self {
        let section = &config.ghpr;
        Self {
            api_base: resolve_api_base(
                cli.api_base.as_deref(),
                section.api_base.as_deref(),
                "GHPR_API_BASE",
                Some("GHE_URL"),
            ),
            token: resolve_auth_token(cli.token.as_deref(), section.token.as_deref(), PR_TOKEN_ENV),
            owner: cli
                .owner
                .or_else(|| section.owner.clone())
                .or_else(|| first_env(&["GHE_PROJECT"])),
            repo: cli
                .repo
                .or_else(|| section.repo.clone())
                .or_else(|| first_env(&["GHE_REPO_NAME"])),
            proxy: cli.proxy.or_else(|| section.proxy.clone()),
            verify_tls: cli.verify_tls.or(section.verify_tls).unwrap_or(true),
        }
    }

    /// Owner and repo are required for every mutation command.
    pub fn owner_repo(&self) -> Result<(&str, &str), ConfigError> {
        match (self.owner.as_deref(), self.repo.as_deref()) {
            (Some(owner), Some(repo)) => Ok((owner, repo)),
            _ => Err(ConfigError::MissingOwnerRepo),
        }
    }

    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::MissingToken)
    }
}

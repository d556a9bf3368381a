//! `ghsearch` — GitHub / GitHub Enterprise search CLI tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ghcli::config::{
    self, CodeOverrides, CodeSettings, CommitsOverrides, CommitsSettings, ReposOverrides,
    ReposSettings,
};
use ghcli::normalize::{self, CodeRecord, CommitRecord, RepoRecord};
use ghcli::{report, search, transform};

const CONFIG_FILE_NAME: &str = ".ghsearch.yml";

#[derive(Parser, Debug)]
#[command(name = "ghsearch", version, about = "GitHub / GitHub Enterprise search CLI tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search GitHub repositories
    Repos(ReposArgs),
    /// Search code across GitHub repositories
    Code(CodeArgs),
    /// Search GitHub commits
    Commits(CommitsArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override API base URL
    #[arg(long)]
    api_base: Option<String>,

    /// GitHub token for authentication
    #[arg(long)]
    token: Option<String>,

    /// Search query
    #[arg(short, long)]
    query: Option<String>,

    /// Results per page (max 100)
    #[arg(long)]
    per_page: Option<u32>,

    /// Maximum pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,

    /// Show API request details and equivalent curl command
    #[arg(long)]
    debug: bool,

    /// Enable TLS verification (default)
    #[arg(long, overrides_with = "no_verify_tls")]
    verify_tls: bool,

    /// Disable TLS verification
    #[arg(long)]
    no_verify_tls: bool,
}

impl CommonArgs {
    fn verify_tls_override(&self) -> Option<bool> {
        if self.no_verify_tls {
            Some(false)
        } else if self.verify_tls {
            Some(true)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
struct ReposArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Minimum stars filter
    #[arg(long)]
    min_stars: Option<u64>,

    /// Language filter
    #[arg(long)]
    language: Option<String>,

    /// Sort by field (stars, forks, updated, created)
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort direction (asc or desc)
    #[arg(long)]
    sort_direction: Option<String>,

    /// Group results by language
    #[arg(long, overrides_with = "no_group_by_language")]
    group_by_language: bool,

    /// Do not group results by language
    #[arg(long)]
    no_group_by_language: bool,

    /// Limit results to top N
    #[arg(long)]
    top_n: Option<usize>,
}

#[derive(Args, Debug)]
struct CodeArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Repository filter (owner/repo)
    #[arg(long)]
    repo: Option<String>,

    /// Language filter
    #[arg(long)]
    language: Option<String>,

    /// Path filter
    #[arg(long)]
    path: Option<String>,
}

#[derive(Args, Debug)]
struct CommitsArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Repository filter (owner/repo)
    #[arg(long)]
    repo: Option<String>,

    /// Author filter (username or email)
    #[arg(long)]
    author: Option<String>,

    /// Committer filter (username or email)
    #[arg(long)]
    committer: Option<String>,

    /// Output repository statistics instead of individual commits
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Repos(args) => run_repos(args),
        Command::Code(args) => run_code(args),
        Command::Commits(args) => run_commits(args),
    }
}

fn run_repos(args: ReposArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = config::load_config(args.common.config.as_deref(), CONFIG_FILE_NAME);
    let group_by_language = if args.no_group_by_language {
        Some(false)
    } else if args.group_by_language {
        Some(true)
    } else {
        None
    };
    let settings = ReposSettings::resolve(
        &file_config,
        ReposOverrides {
            api_base: args.common.api_base.clone(),
            token: args.common.token.clone(),
            query: args.common.query.clone(),
            per_page: args.common.per_page,
            max_pages: args.common.max_pages,
            min_stars: args.min_stars,
            language: args.language,
            sort_by: args.sort_by,
            sort_direction: args.sort_direction,
            group_by_language,
            top_n: args.top_n,
            verify_tls: args.common.verify_tls_override(),
        },
    );
    transform::validate_sort_options(settings.sort_by.as_deref(), &settings.sort_direction)?;

    info!(query = %settings.query, "searching repositories");
    let raw = search::search_repositories(&settings, args.common.debug)?;
    let simplified: Vec<RepoRecord> = normalize::normalize(&raw.items);
    let filtered =
        transform::apply_filters(&simplified, settings.min_stars, settings.language.as_deref());
    let sorted =
        transform::apply_sorting(&filtered, settings.sort_by.as_deref(), &settings.sort_direction);
    let report = report::build_repos_report(&raw, sorted, &settings);
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}

fn run_code(args: CodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = config::load_config(args.common.config.as_deref(), CONFIG_FILE_NAME);
    let settings = CodeSettings::resolve(
        &file_config,
        CodeOverrides {
            api_base: args.common.api_base.clone(),
            token: args.common.token.clone(),
            query: args.common.query.clone(),
            per_page: args.common.per_page,
            max_pages: args.common.max_pages,
            repo: args.repo,
            language: args.language,
            path: args.path,
            verify_tls: args.common.verify_tls_override(),
        },
    );

    info!(query = %settings.query, "searching code");
    let runtime = tokio::runtime::Runtime::new()?;
    let raw = runtime.block_on(search::search_code(&settings, args.common.debug))?;
    let simplified: Vec<CodeRecord> = normalize::normalize(&raw.items);
    let report = report::build_code_report(&raw, simplified, &settings);
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}

fn run_commits(args: CommitsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = config::load_config(args.common.config.as_deref(), CONFIG_FILE_NAME);
    let settings = CommitsSettings::resolve(
        &file_config,
        CommitsOverrides {
            api_base: args.common.api_base.clone(),
            token: args.common.token.clone(),
            query: args.common.query.clone(),
            per_page: args.common.per_page,
            max_pages: args.common.max_pages,
            repo: args.repo,
            author: args.author,
            committer: args.committer,
            stats: if args.stats { Some(true) } else { None },
            verify_tls: args.common.verify_tls_override(),
        },
    );

    info!(query = %settings.query, stats = settings.stats, "searching commits");
    let runtime = tokio::runtime::Runtime::new()?;
    let raw = runtime.block_on(search::search_commits(&settings, args.common.debug))?;
    let simplified: Vec<CommitRecord> = normalize::normalize(&raw.items);
    let report = report::build_commits_report(&raw, simplified, &settings);
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}

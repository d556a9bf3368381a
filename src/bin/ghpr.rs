//! `ghpr` — GitHub / GitHub Enterprise pull request management CLI tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use ghcli::config::{self, PrOverrides, PrSettings};
use ghcli::pr::{self, CommentKind, CreateParams};

const CONFIG_FILE_NAME: &str = ".ghpr.yml";

#[derive(Parser, Debug)]
#[command(
    name = "ghpr",
    version,
    about = "GitHub / GitHub Enterprise Pull Request management CLI tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new Pull Request
    Create(CreateArgs),
    /// Approve a Pull Request
    Approve(ApproveArgs),
    /// Add a comment to a Pull Request
    Comment(CommentArgs),
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
    #[arg(short, long)]
    token: Option<String>,

    /// Repository owner/organization
    #[arg(short, long)]
    owner: Option<String>,

    /// Repository name
    #[arg(short, long)]
    repo: Option<String>,

    /// SOCKS5h proxy address
    #[arg(short = 'x', long)]
    proxy: Option<String>,

    /// Enable TLS verification (default)
    #[arg(long, overrides_with = "no_verify_tls")]
    verify_tls: bool,

    /// Disable TLS verification
    #[arg(long)]
    no_verify_tls: bool,

    /// Show API request details and equivalent curl command
    #[arg(long)]
    debug: bool,
}

impl CommonArgs {
    fn settings(&self) -> PrSettings {
        let file_config = config::load_config(self.config.as_deref(), CONFIG_FILE_NAME);
        let verify_tls = if self.no_verify_tls {
            Some(false)
        } else if self.verify_tls {
            Some(true)
        } else {
            None
        };
        PrSettings::resolve(
            &file_config,
            PrOverrides {
                api_base: self.api_base.clone(),
                token: self.token.clone(),
                owner: self.owner.clone(),
                repo: self.repo.clone(),
                proxy: self.proxy.clone(),
                verify_tls,
            },
        )
    }
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// PR title
    #[arg(long)]
    title: String,

    /// PR body/description
    #[arg(short, long)]
    body: Option<String>,

    /// Branch to merge from
    #[arg(long)]
    head: String,

    /// Branch to merge into
    #[arg(long, default_value = "main")]
    base: String,

    /// Create as draft PR
    #[arg(long)]
    draft: bool,

    /// Labels to add (can be used multiple times)
    #[arg(long = "label")]
    labels: Vec<String>,
}

#[derive(Args, Debug)]
struct ApproveArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Pull Request number
    #[arg(long)]
    pr_number: u64,

    /// Optional approval comment
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Args, Debug)]
struct CommentArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Pull Request number
    #[arg(long)]
    pr_number: u64,

    /// Comment text
    #[arg(long)]
    comment: String,

    /// Comment type: 'review' or 'issue'
    #[arg(long = "type", default_value = "review")]
    comment_type: CommentKind,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Create(args) => run_create(args),
        Command::Approve(args) => run_approve(args),
        Command::Comment(args) => run_comment(args),
    }
}

fn run_create(args: CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.common.settings();
    let params = CreateParams {
        title: args.title,
        head: args.head,
        base: args.base,
        body: args.body,
        draft: args.draft,
        labels: args.labels,
    };

    println!(
        "Creating PR: {} ({} -> {})",
        params.title, params.head, params.base
    );
    let created = pr::create_pull_request(&settings, &params, args.common.debug)?;

    println!("{} Pull Request created successfully!", "✓".green());
    println!(
        "  PR #{}: {}",
        created.number.map(|n| n.to_string()).unwrap_or_default(),
        created.html_url.as_deref().unwrap_or_default()
    );
    println!("  State: {}", created.state.as_deref().unwrap_or_default());
    if created.draft {
        println!("  Draft: Yes");
    }
    Ok(())
}

fn run_approve(args: ApproveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.common.settings();
    let (owner, repo) = settings.owner_repo()?;

    println!(
        "Approving PR #{} in {owner}/{repo}...",
        args.pr_number
    );
    let review = pr::approve_pull_request(
        &settings,
        args.pr_number,
        args.comment.as_deref(),
        args.common.debug,
    )?;

    println!("{} Pull Request approved successfully!", "✓".green());
    println!(
        "  Review ID: {}",
        review.id.map(|id| id.to_string()).unwrap_or_default()
    );
    println!(
        "  Review URL: {}",
        review.html_url.as_deref().unwrap_or_default()
    );
    println!("  State: {}", review.state.as_deref().unwrap_or_default());
    Ok(())
}

fn run_comment(args: CommentArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.common.settings();
    let (owner, repo) = settings.owner_repo()?;
    let label = args.comment_type.label();

    println!(
        "Adding {label} to PR #{} in {owner}/{repo}...",
        args.pr_number
    );
    let comment = pr::comment_on_pull_request(
        &settings,
        args.pr_number,
        &args.comment,
        args.comment_type,
        args.common.debug,
    )?;

    let mut capitalized = label.to_string();
    if let Some(first) = capitalized.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    println!("{} {capitalized} added successfully!", "✓".green());
    println!(
        "  ID: {}",
        comment.id.map(|id| id.to_string()).unwrap_or_default()
    );
    println!("  URL: {}", comment.html_url.as_deref().unwrap_or_default());
    Ok(())
}

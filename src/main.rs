// This is the entry point of the moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (the GitHub REST adapter)
//
// This file's job is to:
// 1. Load configuration from the environment
// 2. Wire the engine together (dependency injection)
// 3. Run the periodic mark-and-sweep schedule

use std::time::Duration;

use anyhow::{Context, Result};

use profanity_bot::core::detector::WordListFilter;
use profanity_bot::core::moderation::{ModerationService, RepoRef};
use profanity_bot::core::policy::{policy_schema, ItemType};
use profanity_bot::infra::github::github_client::{GithubApiClient, DEFAULT_API_BASE};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("GITHUB_TOKEN")
        .context("missing GITHUB_TOKEN environment variable")?;
    let repo_list = std::env::var("GITHUB_REPOS").context(
        "missing GITHUB_REPOS environment variable (comma-separated owner/repo list)",
    )?;
    let mut repos = repo_list
        .split(',')
        .map(str::trim)
        .filter(|slug| !slug.is_empty())
        .map(|slug| {
            RepoRef::parse(slug)
                .with_context(|| format!("invalid repository slug '{slug}', expected owner/repo"))
        })
        .collect::<Result<Vec<_>>>()?;

    let interval = std::env::var("SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(3600);
    let dry_run = std::env::var("DRY_RUN").is_ok();
    let api_base =
        std::env::var("GITHUB_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

    let client = GithubApiClient::new(api_base, Some(token))
        .context("failed to create GitHub API client")?;

    tracing::info!(
        repo_count = repos.len(),
        interval_secs = interval,
        dry_run,
        "moderation bot starting"
    );

    loop {
        let mut still_scheduled = Vec::with_capacity(repos.len());
        for repo in repos {
            match run_sweep(&client, &repo, dry_run).await {
                Ok(true) => still_scheduled.push(repo),
                Ok(false) => tracing::warn!(
                    owner = %repo.owner,
                    repo = %repo.repo,
                    "no moderation config found, repository removed from the schedule"
                ),
                Err(err) => {
                    tracing::warn!(owner = %repo.owner, repo = %repo.repo, %err, "sweep failed");
                    still_scheduled.push(repo);
                }
            }
        }
        repos = still_scheduled;

        if repos.is_empty() {
            tracing::info!("no repositories left to moderate, exiting");
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(interval)).await;
    }
}

/// Runs one full sweep for a repository. Returns false when the
/// repository has no configuration and should be unscheduled.
async fn run_sweep(client: &GithubApiClient, repo: &RepoRef, dry_run: bool) -> Result<bool> {
    let raw = client.fetch_repo_config(repo).await?;
    if raw.is_none() {
        return Ok(false);
    }

    let policy = policy_schema::resolve(&repo.owner, &repo.repo, raw.as_ref(), !dry_run);
    let filter = WordListFilter::new(
        &policy.extra_words,
        &policy.exempt_words,
        policy.base.placeholder,
    )
    .context("failed to build profanity filter")?;

    let service = ModerationService::new(client.clone(), filter, repo.clone(), policy);
    service.mark_and_sweep(ItemType::Pulls).await?;
    service.mark_and_sweep(ItemType::Issues).await?;
    Ok(true)
}

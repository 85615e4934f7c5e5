//! Relay CLI - scrape, rewrite and publish one article per run
//!
//! Usage:
//!   relay init                  Write default relay.toml and data files
//!   relay run                   Publish the next unseen article
//!   relay login                 Save a browser session for the blog
//!   relay seen                  List already-published source URLs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relay_agent::GeminiClient;
use relay_browser::{interactive_login, ChromeLauncher};
use relay_core::{Credentials, RelayConfig, RelayError, DEFAULT_CONFIG_FILE};
use relay_pipeline::{RunOutcome, Sequencer};
use relay_store::SeenSetStore;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "relay")]
#[command(author, version, about = "Deduplicating article rewrite-and-publish pipeline")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration and empty data files
    Init {
        /// Configuration file to create
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Fetch, rewrite and publish the next unseen article
    Run {
        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Exit with an error when the publish attempt fails
        #[arg(long)]
        fail_on_publish_error: bool,
    },

    /// Log in through a visible browser and save the session cookies
    Login {
        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Seconds to wait for the login to complete
        #[arg(long, default_value = "300")]
        timeout: u64,
    },

    /// Print the source URLs already published
    Seen {
        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Could not read .env file: {}", e);
        }
    }

    match cli.command {
        Commands::Init { config } => cmd_init(config).await,
        Commands::Run {
            config,
            fail_on_publish_error,
        } => cmd_run(config, fail_on_publish_error).await,
        Commands::Login { config, timeout } => cmd_login(config, timeout).await,
        Commands::Seen { config } => cmd_seen(config).await,
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    if std::env::var_os("RUST_LOG").is_some() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let level = if verbose { Level::DEBUG } else { Level::INFO };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<RelayConfig> {
    RelayConfig::load_or_default(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

async fn write_if_absent(path: &Path, content: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

async fn cmd_init(config_path: PathBuf) -> Result<()> {
    let mut created = Vec::new();

    if !config_path.exists() {
        RelayConfig::write_default(&config_path)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        created.push(config_path.clone());
    }

    let config = load_config(&config_path)?;
    if write_if_absent(&config.paths.seen_set, "[]").await? {
        created.push(config.paths.seen_set.clone());
    }
    if write_if_absent(&config.paths.asset_pool, "[]").await? {
        created.push(config.paths.asset_pool.clone());
    }

    if created.is_empty() {
        println!("Nothing to create; relay is already initialized");
        return Ok(());
    }

    println!("Initialized relay");
    println!("Created:");
    for path in &created {
        println!("  {}", path.display());
    }
    println!("\nNext steps:");
    println!("  1. Add image URLs to {}", config.paths.asset_pool.display());
    println!(
        "  2. Set GEMINI_API_KEY, TISTORY_USERNAME and TISTORY_PASSWORD (a .env file works)"
    );
    println!("  3. Run 'relay run'");
    Ok(())
}

async fn cmd_run(config_path: PathBuf, fail_on_publish_error: bool) -> Result<()> {
    let config = load_config(&config_path)?;
    config.validate().context("Invalid configuration")?;
    let credentials = Credentials::from_env().context("Missing credentials")?;

    let generator = GeminiClient::new(&config.generator, credentials.api_key.as_str())
        .context("Failed to build the text generator")?;
    let launcher = ChromeLauncher::new(config.clone());
    let sequencer = Sequencer::new(config, credentials, launcher, generator);

    let outcome = sequencer.run().await.context("Pipeline run failed")?;

    match outcome {
        RunOutcome::NothingToDo => {
            println!("No new article to publish");
        }
        RunOutcome::Published { identifier } => {
            println!("Published article from {}", identifier);
        }
        RunOutcome::PublishFailed {
            identifier,
            outcome,
        } => {
            println!("Publishing failed for {}", identifier);
            if let Some(step) = &outcome.failed_step {
                println!("  Step: {}", step);
            }
            if let Some(error) = &outcome.error {
                println!("  Error: {}", error);
            }
            if let Some(path) = outcome
                .diagnostics
                .as_ref()
                .and_then(|d| d.screenshot.as_ref())
            {
                println!("  Screenshot: {}", path.display());
            }

            if fail_on_publish_error {
                let step = outcome.failed_step.unwrap_or_else(|| "unknown".to_string());
                let message = outcome.error.unwrap_or_default();
                return Err(RelayError::publish(step, message))
                    .with_context(|| format!("Publishing failed for {}", identifier));
            }
        }
    }

    Ok(())
}

async fn cmd_login(config_path: PathBuf, timeout: u64) -> Result<()> {
    let config = load_config(&config_path)?;

    info!(
        "Waiting up to {}s for a login at {}",
        timeout, config.publisher.manage_url_pattern
    );
    let saved = interactive_login(
        &config.browser,
        &config.publisher.manage_url_pattern,
        &config.paths.session_state,
        Duration::from_secs(timeout),
    )
    .await
    .context("Login did not complete")?;

    println!(
        "Saved {} cookies to {}",
        saved,
        config.paths.session_state.display()
    );
    Ok(())
}

async fn cmd_seen(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)?;
    let store = SeenSetStore::new(&config.paths.seen_set);
    let seen = store
        .load()
        .await
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    if seen.is_empty() {
        println!("No articles published yet");
        return Ok(());
    }

    println!("Published ({}):", seen.len());
    for id in seen.iter() {
        println!("  {}", id);
    }
    Ok(())
}

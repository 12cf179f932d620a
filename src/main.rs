//! label-leader CLI
//!
//! Command line tool synchronizing GitHub labels from a leader repository

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use label_leader::{
    config::{load_config, resolve_token, DEFAULT_CONFIG_PATH, DEFAULT_TOKEN_PATH},
    GitHubClient, LabelSyncer, RunOptions, SyncOutcome, TerminalPrompt,
};

/// label-leader CLI
///
/// Copies label names, colors and descriptions from the leader repository
/// to every target repository
#[derive(Parser, Debug)]
#[command(
    name = "label-leader",
    version,
    about = "Synchronize GitHub labels from a leader repository to target repositories",
    long_about = "Reads the leader repository's labels, filters them through the configured \
    include/ignore rules, and creates or updates them in every target repository. \
    Labels are never deleted."
)]
struct Cli {
    /// Configuration file path
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    conf: PathBuf,

    /// GitHub token path
    #[arg(long, default_value = DEFAULT_TOKEN_PATH)]
    token_path: PathBuf,

    /// Show what you would do, but don't do it
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(outcome) => tracing::debug!(?outcome, "run finished"),
        Err(e) => {
            eprintln!("{} {:#}", "ERROR:".red(), e);
            std::process::exit(1);
        }
    }
}

/// Execute synchronization
async fn run(cli: Cli) -> anyhow::Result<SyncOutcome> {
    // Configuration problems are reported before any network call
    let config = load_config(&cli.conf)
        .with_context(|| format!("failed to load {}", cli.conf.display()))?;
    let token = resolve_token(&cli.token_path).context("failed to read GitHub token")?;
    let client = GitHubClient::new(&token).await?;

    if cli.verbose && cli.dry_run {
        println!(
            "{} Running in dry-run mode (no changes will be made)",
            "!".yellow()
        );
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
    };
    let syncer = LabelSyncer::new(client, config);
    let outcome = syncer
        .run(options, &mut TerminalPrompt, &mut std::io::stdout())
        .await?;

    Ok(outcome)
}

/// Log filter used when `RUST_LOG` is not set
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,label_leader=debug"
    } else {
        "warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["label-leader"]).unwrap();
        assert_eq!(cli.conf, PathBuf::from("./config.yaml"));
        assert_eq!(cli.token_path, PathBuf::from("~/.github-token"));
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "label-leader",
            "--conf",
            "labels.yaml",
            "--token-path",
            "/tmp/token",
            "--dry-run",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.conf, PathBuf::from("labels.yaml"));
        assert_eq!(cli.token_path, PathBuf::from("/tmp/token"));
        assert!(cli.dry_run);
        assert!(cli.verbose);
    }

    #[test]
    fn test_default_log_filter() {
        assert_eq!(default_log_filter(false), "warn");
        assert!(default_log_filter(true).contains("label_leader=debug"));
    }

    #[tokio::test]
    async fn test_config_error_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let conf = dir.path().join("config.yaml");
        std::fs::write(
            &conf,
            "github:\n  organization: acme\n  repositories:\n    - name: web\n",
        )
        .unwrap();

        let cli = Cli {
            conf,
            token_path: dir.path().join("missing-token"),
            dry_run: true,
            verbose: false,
        };
        let err = run(cli).await.unwrap_err();
        assert!(format!("{err:#}").contains("no leader repository"));
    }
}

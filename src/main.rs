use clap::Parser;
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use actionpin::config::load_config;
use actionpin::lookup::GitHubClient;
use actionpin::processor;
use actionpin::rewrite::LineRewriter;
use actionpin::types::RunSummary;

/// Pin GitHub Actions references to commit SHAs.
#[derive(Parser)]
#[command(
    name = "actionpin",
    version,
    about = "Pin GitHub Actions references in workflow files to commit SHAs"
)]
struct Cli {
    /// Workflow file, or directory containing *.yml / *.yaml workflows
    path: PathBuf,
    /// Report what would change without modifying files
    #[arg(long)]
    dry_run: bool,
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the API base URL (e.g. for GitHub Enterprise)
    #[arg(long)]
    api_url: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> actionpin::errors::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }

    if cli.dry_run {
        println!("DRY RUN MODE - no files will be modified\n");
    }

    let client = GitHubClient::new(&config);
    let rewriter = LineRewriter::new(&client);
    let summary = processor::run(&cli.path, &rewriter, &config, cli.dry_run)?;

    print_summary(&summary, cli.dry_run);
    Ok(())
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    let rule = "=".repeat(60);
    for report in &summary.reports {
        if report.written {
            println!(
                "Updated {} ({} actions pinned)",
                report.path.display(),
                report.changes
            );
        } else if report.changes > 0 && dry_run {
            println!(
                "Would update {} ({} actions)",
                report.path.display(),
                report.changes
            );
        } else {
            println!("No changes needed for {}", report.path.display());
        }
    }
    for failure in &summary.failures {
        println!("Failed {}: {}", failure.path.display(), failure.message);
    }
    println!("\n{rule}");
    println!("Total actions pinned: {}", summary.total_changes);
    println!("{rule}");
}

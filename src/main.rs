use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use podpub::{
    Config, DocumentState, FsRelocator, GitPublisher, Mp3Probe, NoopReporter, ProgressEvent,
    ProgressReporter, SharedProgressReporter, default_config_path, publish_changes, run_sync,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static FEED: Emoji<'_, '_> = Emoji("📻 ", "[i] ");
static FOLDER: Emoji<'_, '_> = Emoji("📁 ", "[d] ");
static ADDED: Emoji<'_, '_> = Emoji("➕ ", "[+] ");
static REMOVED: Emoji<'_, '_> = Emoji("➖ ", "[-] ");
static SKIPPED: Emoji<'_, '_> = Emoji("⏭️  ", "[~] ");
static SAVED: Emoji<'_, '_> = Emoji("💾 ", "[s] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[*] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");

/// Publish a podcast RSS feed from a directory of audio files
#[derive(Parser, Debug)]
#[command(name = "podpub")]
#[command(about = "Sync a podcast RSS feed with its audio files and publish it via git")]
#[command(version)]
struct Args {
    /// Repository directory holding the feed and the published audio files
    #[arg(default_value = ".")]
    repo: PathBuf,

    /// Public URL the repository is served from (overrides the config file)
    #[arg(short, long, env = "PODPUB_BASE_URL")]
    base_url: Option<String>,

    /// Config file (defaults to podpub.toml in the repository)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Update the feed but do not commit or push
    #[arg(long)]
    no_publish: bool,

    /// Quiet mode - suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

/// Progress reporter printing to the terminal
struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl TerminalReporter {
    fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn set_spinner_message(&self, message: String) {
        let Ok(mut spinner) = self.spinner.lock() else {
            return;
        };

        let bar = spinner.get_or_insert_with(|| {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}")
            {
                bar.set_style(style);
            }
            bar.enable_steady_tick(std::time::Duration::from_millis(100));
            bar
        });
        bar.set_message(message);
    }

    fn finish_spinner(&self) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(bar) = spinner.take()
        {
            bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::StagingCreated { path } => {
                println!(
                    "{FOLDER}Created staging directory {}, place new audio files there",
                    path.display().to_string().cyan()
                );
            }

            ProgressEvent::FeedLoaded {
                title,
                entries,
                initialized,
            } => {
                if initialized {
                    println!("{FEED}Creating new feed {}", title.bold().green());
                } else {
                    println!(
                        "{FEED}{} • {} entries",
                        title.bold().green(),
                        entries.to_string().cyan()
                    );
                }
            }

            ProgressEvent::EntryRemoved { title, filename } => {
                println!(
                    "  {REMOVED}Removed '{}' ({} is missing)",
                    title.yellow(),
                    filename.dimmed()
                );
            }

            ProgressEvent::EntryAdded {
                title,
                guid,
                filename,
            } => {
                println!(
                    "  {ADDED}Added '{}' [{}] from {}",
                    title.green(),
                    guid.cyan(),
                    filename.dimmed()
                );
            }

            ProgressEvent::CandidateSkipped { filename, reason } => {
                println!("  {SKIPPED}Skipped {} - {}", filename.yellow(), reason.dimmed());
            }

            ProgressEvent::FeedSaved {
                path,
                added_count,
                removed_count,
            } => {
                println!(
                    "\n{SAVED}{} {} added, {} removed → {}",
                    "Feed updated:".bold().green(),
                    added_count.to_string().green().bold(),
                    removed_count.to_string().yellow(),
                    path.display().to_string().cyan()
                );
            }

            ProgressEvent::FeedUnchanged => {
                println!("\n{SUCCESS}{}", "Feed is up to date, nothing to publish".green());
            }

            ProgressEvent::PublishStep { description } => {
                self.set_spinner_message(description);
            }

            ProgressEvent::PublishCompleted => {
                self.finish_spinner();
                println!("{SUCCESS}{}", "Published".bold().green());
            }

            ProgressEvent::PublishFailed { error } => {
                self.finish_spinner();
                println!("{FAILURE}{} {}", "Publish failed:".bold().red(), error.red());
            }
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&args.repo));
    let mut config = Config::load(&config_path).context("Failed to load configuration")?;
    if args.base_url.is_some() {
        config.base_url = args.base_url.clone();
    }

    let options = config
        .sync_options(&args.repo)
        .context("Invalid configuration")?;

    if !args.quiet {
        println!(
            "\n{}{} {}\n",
            MICROPHONE,
            "podpub".bold().magenta(),
            "- Podcast Feed Publisher".dimmed()
        );
    }

    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        Arc::new(TerminalReporter::new())
    };

    let result = run_sync(&options, &Mp3Probe, &FsRelocator, &reporter, Utc::now())
        .context("Failed to update feed")?;

    if result.state == DocumentState::Clean || args.no_publish {
        return Ok(());
    }

    let publisher = GitPublisher::new(&args.repo);
    if let Err(e) = publish_changes(&publisher, &config.publish_options(), &reporter) {
        if args.quiet {
            eprintln!("Publish failed: {}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

//! upload-review - publish media for review
//!
//! CLI binary for submitting review movies to the production-tracking site.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "upload-review")]
#[command(about = "Publish review media to the production-tracking site")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log more; repeat for debug output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a movie for review
    Submit {
        /// Movie to submit
        file: PathBuf,

        /// Task the review belongs to
        #[arg(long)]
        task: u64,

        /// Version title; `{version}` expands to the version number
        #[arg(long)]
        title: Option<String>,

        /// Version description
        #[arg(long, default_value = "")]
        description: String,

        /// Add the Version to this playlist
        #[arg(long, conflicts_with = "pick_playlist")]
        playlist: Option<u64>,

        /// Choose a playlist interactively
        #[arg(long)]
        pick_playlist: bool,
    },

    /// Show the publish path the next submission would use
    NextPath {
        /// Task to resolve the path for
        #[arg(long)]
        task: u64,
    },

    /// List playlists a review can be added to
    Playlists {
        /// Project to list playlists for
        #[arg(long)]
        project: u64,
    },

    /// Show the context of a task
    Context {
        /// Task to describe
        #[arg(long)]
        task: u64,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "review_upload=info",
        _ => "review_upload=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Submit {
            file,
            task,
            title,
            description,
            playlist,
            pick_playlist,
        } => {
            let args = cli::SubmitArgs {
                file,
                task,
                title,
                description,
                playlist,
                pick_playlist,
            };
            cli::run_submit(config, args).await?;
        }
        Commands::NextPath { task } => {
            cli::run_next_path(config, task).await?;
        }
        Commands::Playlists { project } => {
            cli::run_playlists(config, project).await?;
        }
        Commands::Context { task } => {
            cli::run_context(config, task).await?;
        }
    }

    Ok(())
}

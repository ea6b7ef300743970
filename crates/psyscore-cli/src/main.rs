//! psyscore CLI for scoring scanned psychometric answer sheets.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "psyscore", version, about = "Psychometric answer sheet scorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an answer sheet and score it against assigned chapters
    Score {
        /// Answer sheet to scan (bubble-mark JSON, or any reference with --mock)
        #[arg(long)]
        sheet: PathBuf,

        /// TOML file assigning each scanned section to an exam chapter
        #[arg(long)]
        assignments: PathBuf,

        /// Answer key file or directory (overrides config)
        #[arg(long)]
        keys: Option<PathBuf>,

        /// Use the mock scanner instead of reading the sheet
        #[arg(long)]
        mock: bool,

        /// Output directory (overrides config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Report formats to write: none, json, html, all
        #[arg(long, default_value = "none")]
        format: String,

        /// List every mistake after the summary
        #[arg(long)]
        mistakes: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two saved exam reports
    Compare {
        /// Earlier report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Later report JSON
        #[arg(long)]
        current: PathBuf,

        /// Score changes of this many points or fewer count as unchanged
        #[arg(long, default_value = "2")]
        threshold: u32,

        /// Exit code 1 if any subject declined
        #[arg(long)]
        fail_on_decline: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate answer key TOML files
    Validate {
        /// Answer key file or directory
        #[arg(long)]
        keys: PathBuf,
    },

    /// List chapters that have answer keys
    ListKeys {
        /// Answer key file or directory (overrides config)
        #[arg(long)]
        keys: Option<PathBuf>,

        /// Only show chapters of this subject
        #[arg(long)]
        subject: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, sample answer keys, and a sample sheet
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("psyscore=info".parse().expect("static directive")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            sheet,
            assignments,
            keys,
            mock,
            output,
            format,
            mistakes,
            config,
        } => {
            commands::score::execute(commands::score::ScoreArgs {
                sheet,
                assignments,
                keys,
                mock,
                output,
                format,
                show_mistakes: mistakes,
                config,
            })
            .await
        }
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_decline,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_decline, format),
        Commands::Validate { keys } => commands::validate::execute(keys),
        Commands::ListKeys {
            keys,
            subject,
            config,
        } => commands::list_keys::execute(keys, subject, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

//! DataMirror CLI entry point.

use std::io::Write;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use datamirror_cli::commands::get_cmd::GetOptions;
use datamirror_cli::commands::{get_cmd, list_cmd, search_cmd, tree_cmd, App};
use datamirror_cli::config::{resolve_output_dir, CliConfig, DEFAULT_LOG_LEVEL};

#[derive(Parser)]
#[command(
    name = "datamirror",
    about = "DataMirror - search and mirror datasets from a remote dataset repository",
    version,
    arg_required_else_help = true,
    after_help = "Run 'datamirror <command> --help' for details on each command."
)]
struct Cli {
    /// Root URL of the dataset repository.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Maximum number of concurrent requests.
    #[arg(long, global = true)]
    concurrency: Option<usize>,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Retries for failed or throttled requests.
    #[arg(long, global = true)]
    retries: Option<u32>,

    /// Output results as JSON (machine-readable).
    #[arg(long, global = true)]
    json: bool,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search dataset titles by substring or approximate spelling.
    Search {
        /// Dataset name to look for.
        query: String,
    },

    /// List every dataset in the remote catalog.
    #[command(visible_alias = "lsr")]
    ListRemote,

    /// Download a dataset's files into a local folder named after it.
    Get {
        /// Dataset slug as printed by `search` (e.g. "iris-plants").
        dataset: String,

        /// Directory to create the dataset folder in.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write files byte-for-byte instead of as decoded text.
        #[arg(long)]
        raw: bool,
    },

    /// Show a dataset's remote file tree without downloading.
    Tree {
        /// Dataset slug as printed by `search`.
        dataset: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = CliConfig::resolve(
        cli.base_url,
        cli.concurrency,
        cli.timeout,
        cli.retries,
        cli.json,
    );

    let result = run(cli.command, config, &mut std::io::stdout()).await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}

async fn run(command: Commands, config: CliConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "datamirror", out);
            Ok(())
        }
        Commands::Search { query } => search_cmd::run(&App::new(config)?, &query, out).await,
        Commands::ListRemote => list_cmd::run(&App::new(config)?, out).await,
        Commands::Get { dataset, out: dir, raw } => {
            let options = GetOptions {
                out_dir: resolve_output_dir(dir.as_deref()),
                raw,
            };
            get_cmd::run(&App::new(config)?, &dataset, &options, out)
                .await
                .map(|_| ())
        }
        Commands::Tree { dataset } => tree_cmd::run(&App::new(config)?, &dataset, out).await,
    }
}

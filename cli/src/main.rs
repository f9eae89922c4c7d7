//! Command-line interface for verso.
//!
//! This CLI tool drives the document versioning operations against a local
//! repository snapshot:
//! - create: Create a new document series
//! - latest: Show the latest (or latest major) version
//! - versions: List a document's version history
//! - checkout: Check a document out
//! - checkin: Check the working copy in as a new version
//! - cancel: Discard the working copy
//! - checked-out: List checked-out documents
//!
//! Configuration via environment:
//! - VERSO_STORE: Path of the repository snapshot (default: verso-store.json)
//! - VERSO_REPOSITORY_ID: Repository id (default: default)
//! - VERSO_PAGE_SIZE: Page size for unwindowed server listings (default: 100)
//! - LOG_LEVEL / RUST_LOG: Log filter for stderr output

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::{
    Context, cancel::CancelArgs, checked_out::CheckedOutArgs, checkin::CheckinArgs,
    checkout::CheckoutArgs, create::CreateArgs, latest::LatestArgs, versions::VersionsArgs,
};

/// verso CLI
///
/// Manage document versions from the command line. Prints JSON by default
/// and formatted text with --human.
#[derive(Parser)]
#[command(name = "verso")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Repository snapshot file
    #[arg(
        long,
        env = "VERSO_STORE",
        default_value = "verso-store.json",
        global = true
    )]
    store: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new document
    Create(CreateArgs),

    /// Show the latest version of a document
    Latest(LatestArgs),

    /// List a document's versions
    Versions(VersionsArgs),

    /// Check a document out
    Checkout(CheckoutArgs),

    /// Check a working copy in as a new version
    Checkin(CheckinArgs),

    /// Cancel a checkout
    Cancel(CancelArgs),

    /// List checked-out documents
    CheckedOut(CheckedOutArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let ctx = match Context::open(&cli.store).await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Create(args) => commands::create::execute(&ctx, cli.human, args).await,
        Commands::Latest(args) => commands::latest::execute(&ctx, cli.human, args).await,
        Commands::Versions(args) => commands::versions::execute(&ctx, cli.human, args).await,
        Commands::Checkout(args) => commands::checkout::execute(&ctx, cli.human, args).await,
        Commands::Checkin(args) => commands::checkin::execute(&ctx, cli.human, args).await,
        Commands::Cancel(args) => commands::cancel::execute(&ctx, cli.human, args).await,
        Commands::CheckedOut(args) => {
            commands::checked_out::execute(&ctx, cli.human, args).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing on stderr, keeping stdout for command output.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

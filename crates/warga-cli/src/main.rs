//! Inspection CLI for Warga
//!
//! Answers read-only questions about the progression tiers, the badge
//! catalog and the geography it is generated from. Nothing here touches
//! user storage.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{
    badges::{self, AvailableArgs, CatalogArgs},
    tiers::{self, TierArgs},
    Sources,
};

#[derive(Parser)]
#[command(name = "warga")]
#[command(about = "Warga - civic volunteer progression and badge catalog inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Tier catalog TOML to use instead of the built-in tiers
    #[arg(long, global = true)]
    tiers: Option<PathBuf>,

    /// Geography TOML to use instead of the bundled dataset
    #[arg(long, global = true)]
    geography: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the tier for a role and point balance
    Level(TierArgs),

    /// Show progress toward the next tier
    Progress(TierArgs),

    /// List the generated badge catalog
    Catalog(CatalogArgs),

    /// List badges assignable within an area
    Available(AvailableArgs),

    /// Resolve a postal code to its kecamatan and kelurahan
    Postal {
        /// Five-digit postal code
        code: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let sources = Sources::load(cli.tiers.as_deref(), cli.geography.as_deref())?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Level(args) => tiers::level(&sources, &args, cli.json, &mut out)?,
        Commands::Progress(args) => tiers::progress(&sources, &args, cli.json, &mut out)?,
        Commands::Catalog(args) => badges::catalog(&sources, &args, cli.json, &mut out)?,
        Commands::Available(args) => badges::available(&sources, &args, cli.json, &mut out)?,
        Commands::Postal { code } => badges::postal(&sources, &code, cli.json, &mut out)?,
    }

    Ok(())
}

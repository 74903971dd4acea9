//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use harvester_core::DEFAULT_MAX_ATTEMPTS;

/// Harvest Google Drive files linked from blog pages.
///
/// Runs discovery (once per job) and then downloads every resolved file,
/// skipping files that are already complete.
#[derive(Parser, Debug)]
#[command(name = "drive-harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Directory holding config.yaml and index.yaml
    #[arg(long, default_value = "conf")]
    pub config_dir: PathBuf,

    /// Google "authorized_user" credentials file (falls back to DRIVE_ACCESS_TOKEN)
    #[arg(long, default_value = "secrets/credentials.json")]
    pub credentials: PathBuf,

    /// Attempts per provider operation, re-authenticating in between (1-5)
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub max_attempts: u8,

    /// Keep downloading remaining files after one fails; exit non-zero at the end
    #[arg(long)]
    pub keep_going: bool,
}

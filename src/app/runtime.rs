//! The two-phase run: load state, discover, download.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, bail};
use harvester_core::drive::AuthorizedUserCredentials;
use harvester_core::{
    Authenticator, DiscoveryOrchestrator, DiscoveryOutcome, DownloadOrchestrator, DownloadOutcome,
    FailurePolicy, GoogleDriveClient, HtmlLinkCollector, LogProgress, ReauthPolicy,
    RefreshTokenAuthenticator, StateStore, StaticTokenAuthenticator, TransferProgress,
};
use tracing::{info, warn};

use super::progress::BarProgress;
use crate::cli::Args;

/// Environment variable holding a pre-minted access token.
pub(crate) const ACCESS_TOKEN_ENV: &str = "DRIVE_ACCESS_TOKEN";

pub(crate) async fn run(args: Args) -> Result<()> {
    let store = StateStore::in_dir(&args.config_dir);
    let mut state = store
        .load_state()
        .await
        .with_context(|| format!("loading job state from {}", args.config_dir.display()))?;

    let auth = select_authenticator(&args.credentials).await?;
    let api = GoogleDriveClient::new()?;
    let policy = ReauthPolicy::with_max_attempts(u32::from(args.max_attempts));

    let links = HtmlLinkCollector::new()?;
    let discovery = DiscoveryOrchestrator::new(&links, &api, auth.as_ref(), &store)
        .with_retry_policy(policy)
        .run(&mut state)
        .await?;
    if let DiscoveryOutcome::NotPersisted { reason, .. } = &discovery {
        warn!(error = %reason, "Discovery results were not saved; download phase will wait");
    }

    let progress: Box<dyn TransferProgress> = if !args.quiet && io::stderr().is_terminal() {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress::new())
    };
    let failure_policy = if args.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };

    let outcome = DownloadOrchestrator::new(&api, auth.as_ref(), progress.as_ref())
        .with_retry_policy(policy)
        .with_failure_policy(failure_policy)
        .run(&state, &store)
        .await?;

    match outcome {
        DownloadOutcome::NotReady => info!("Nothing downloaded; discovery has not completed"),
        DownloadOutcome::Finished(summary) => {
            if !summary.is_success() {
                for failed in &summary.failed {
                    eprintln!("failed: {} ({})", failed.file_id, failed.error);
                }
                bail!(
                    "{} of {} files failed to download",
                    summary.failed.len(),
                    summary.total
                );
            }
        }
    }

    info!("Drive harvester finished");
    Ok(())
}

/// Picks refresh-token credentials when the file exists, else the env token.
async fn select_authenticator(credentials: &Path) -> Result<Box<dyn Authenticator>> {
    if tokio::fs::try_exists(credentials).await.unwrap_or(false) {
        let creds = AuthorizedUserCredentials::load(credentials).await?;
        info!(path = %credentials.display(), "Using refresh-token credentials");
        return Ok(Box::new(RefreshTokenAuthenticator::new(creds)?));
    }

    match std::env::var(ACCESS_TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            info!("Using access token from {ACCESS_TOKEN_ENV}");
            Ok(Box::new(StaticTokenAuthenticator::new(token)))
        }
        _ => bail!(
            "no Drive credentials: create {} or set {ACCESS_TOKEN_ENV}",
            credentials.display()
        ),
    }
}

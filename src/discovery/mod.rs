//! Discovery phase: crawl pages, collect Drive links, resolve identifiers.
//!
//! Discovery runs once per job. It walks two hops from the seed pages:
//!
//! 1. seed pages -> candidate blog pages (relative hrefs resolved against
//!    the seed, deduplicated, then narrowed by every configured filter)
//! 2. blog pages -> Drive links (prefix-matched against [`DRIVE_LINK_PATTERN`])
//!
//! Drive links are split into file and folder identifiers, folders are
//! expanded, and the deduplicated result is written to the index. Only after
//! that write succeeds is `scraping_complete` set and the config saved.
//!
//! A crawl or provider failure aborts the run with nothing persisted; the
//! next invocation starts over from the seeds.

mod error;

use tracing::{debug, info, instrument, warn};
use url::Url;

pub use error::DiscoveryError;

use crate::crawl::{LinkFilter, LinkSource, apply_filters, dedup_preserving_order};
use crate::drive::{Authenticator, DriveApi, list_files_in_folder, partition_drive_links};
use crate::retry::{ReauthPolicy, with_reauth};
use crate::state::{JobState, StateError, StateStore};

/// Prefix pattern selecting links that point at Google Drive.
pub const DRIVE_LINK_PATTERN: &str = r".*drive\.google\.com";

/// Result of invoking the discovery phase.
#[derive(Debug)]
pub enum DiscoveryOutcome {
    /// `scraping_complete` was already set; nothing was done.
    AlreadyComplete,
    /// Identifiers were resolved and persisted, and the flag is now set.
    Completed {
        /// The resolved identifier set, in first-seen order.
        identifiers: Vec<String>,
    },
    /// Identifiers were resolved but could not be persisted. The flag is
    /// still `false`, so the whole phase runs again next time.
    NotPersisted {
        /// The resolved identifier set that was not saved.
        identifiers: Vec<String>,
        /// The persistence failure.
        reason: StateError,
    },
}

impl DiscoveryOutcome {
    /// Returns true when the job state now says discovery is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::AlreadyComplete | Self::Completed { .. })
    }
}

/// Composes crawling, link filtering and folder expansion.
pub struct DiscoveryOrchestrator<'a> {
    links: &'a dyn LinkSource,
    api: &'a dyn DriveApi,
    auth: &'a dyn Authenticator,
    store: &'a StateStore,
    policy: ReauthPolicy,
}

impl<'a> DiscoveryOrchestrator<'a> {
    /// Creates an orchestrator with the default re-authentication policy.
    #[must_use]
    pub fn new(
        links: &'a dyn LinkSource,
        api: &'a dyn DriveApi,
        auth: &'a dyn Authenticator,
        store: &'a StateStore,
    ) -> Self {
        Self {
            links,
            api,
            auth,
            store,
            policy: ReauthPolicy::default(),
        }
    }

    /// Overrides the retry policy used around folder expansion.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: ReauthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Runs discovery unless `state.scraping_complete` is already set.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] when a page cannot be fetched, a filter
    /// pattern does not compile, or authentication/folder listing fails.
    /// Persistence failures are reported as [`DiscoveryOutcome::NotPersisted`].
    #[instrument(skip_all, fields(seeds = state.initial_blog_pages.len()))]
    pub async fn run(&self, state: &mut JobState) -> Result<DiscoveryOutcome, DiscoveryError> {
        if state.scraping_complete {
            info!("Discovery already complete; skipping");
            return Ok(DiscoveryOutcome::AlreadyComplete);
        }

        let filters = LinkFilter::compile_all(&state.url_pattern_filters)?;
        let drive_filter = LinkFilter::new(DRIVE_LINK_PATTERN)?;

        let blog_pages = self.collect_blog_pages(&state.initial_blog_pages).await?;
        let blog_pages = apply_filters(blog_pages, &filters);
        info!(
            pages = blog_pages.len(),
            filters = filters.len(),
            "Filters applied to blog pages"
        );

        let drive_links = self.collect_drive_links(&blog_pages, &drive_filter).await?;
        info!(links = drive_links.len(), "Drive links scraped");

        let partitioned = partition_drive_links(&drive_links);
        info!(
            files = partitioned.file_ids.len(),
            folders = partitioned.folder_ids.len(),
            rejected = partitioned.rejected.len(),
            "Drive links decomposed"
        );

        let mut file_ids = partitioned.file_ids;
        file_ids.extend(self.expand_folders(&partitioned.folder_ids).await?);

        let identifiers = dedup_preserving_order(file_ids);
        info!(identifiers = identifiers.len(), "Resolved identifier set");

        Ok(self.persist(state, identifiers).await)
    }

    async fn collect_blog_pages(&self, seeds: &[String]) -> Result<Vec<String>, DiscoveryError> {
        let mut candidates = Vec::new();
        for seed in seeds {
            let links = self.links.links_on_page(seed).await?;
            info!(page = %seed, links = links.len(), "Blog pages found");
            let base = Url::parse(seed).ok();
            candidates.extend(
                links
                    .into_iter()
                    .map(|link| resolve_against(base.as_ref(), link)),
            );
        }
        Ok(dedup_preserving_order(candidates))
    }

    async fn collect_drive_links(
        &self,
        blog_pages: &[String],
        drive_filter: &LinkFilter,
    ) -> Result<Vec<String>, DiscoveryError> {
        let mut drive_links = Vec::new();
        for page in blog_pages {
            if !is_absolute_http_url(page) {
                warn!(page = %page, "Skipping blog page that is not an http(s) URL");
                continue;
            }
            let links = drive_filter.apply(self.links.links_on_page(page).await?);
            debug!(page = %page, drive_links = links.len(), "Scraped page");
            drive_links.extend(links);
        }
        Ok(drive_links)
    }

    async fn expand_folders(&self, folder_ids: &[String]) -> Result<Vec<String>, DiscoveryError> {
        // No session is acquired when no folder links were found; file
        // identifiers need no provider call during discovery.
        if folder_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut session = self.auth.authenticate().await?;
        let mut expanded = Vec::new();
        for folder_id in folder_ids {
            let ids = with_reauth(&self.policy, self.auth, &mut session, |session| {
                let api = self.api;
                async move { list_files_in_folder(api, &session, folder_id).await }
            })
            .await?;
            info!(folder_id = %folder_id, files = ids.len(), "Folder expanded");
            expanded.extend(ids);
        }
        Ok(expanded)
    }

    async fn persist(&self, state: &mut JobState, identifiers: Vec<String>) -> DiscoveryOutcome {
        if let Err(reason) = self.store.save_index(&identifiers).await {
            warn!(error = %reason, "Could not save identifier index; discovery will rerun");
            return DiscoveryOutcome::NotPersisted {
                identifiers,
                reason,
            };
        }

        state.scraping_complete = true;
        if let Err(reason) = self.store.save_state(state).await {
            state.scraping_complete = false;
            warn!(error = %reason, "Could not save job state; discovery will rerun");
            return DiscoveryOutcome::NotPersisted {
                identifiers,
                reason,
            };
        }

        info!(
            identifiers = identifiers.len(),
            index = %self.store.index_path().display(),
            "Discovery complete"
        );
        DiscoveryOutcome::Completed { identifiers }
    }
}

/// Resolves a relative href against the page it was found on.
///
/// Absolute links are returned untouched so filters see them as written.
/// Links that cannot be resolved are kept as-is and skipped later.
fn resolve_against(base: Option<&Url>, link: String) -> String {
    if Url::parse(&link).is_ok() {
        return link;
    }
    match base.map(|base| base.join(&link)) {
        Some(Ok(resolved)) => {
            debug!(href = %link, resolved = %resolved, "Resolved relative link");
            resolved.into()
        }
        _ => link,
    }
}

fn is_absolute_http_url(link: &str) -> bool {
    Url::parse(link).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

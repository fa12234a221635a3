// Archive: the public entry point. Callers hand it a link via
// `collect_post` or `collect_profile` and get back a cached or freshly
// crawled record.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clock::Clock;
use crate::crawler::PaginationCrawler;
use crate::error::{ArchiveError, Result};
use crate::normalize::{normalize, Engagement};
use crate::provider::MediaProvider;
use crate::reference::{classify, Reference};
use crate::store::{InsertOutcome, RecordStore};
use crate::types::{CrawlRecord, Owner};

/// What a collect call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    /// Served from the store; no upstream calls were made.
    Cached(CrawlRecord),
    /// Crawled now and written to the store.
    Crawled(CrawlRecord),
    /// The post has no image. Nothing was stored.
    NoDisplayableMedia { owner: Owner },
}

impl CrawlOutcome {
    pub fn record(&self) -> Option<&CrawlRecord> {
        match self {
            CrawlOutcome::Cached(r) | CrawlOutcome::Crawled(r) => Some(r),
            CrawlOutcome::NoDisplayableMedia { .. } => None,
        }
    }
}

struct ArchiveInner {
    provider: Arc<dyn MediaProvider>,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

/// Cheap to clone; all clones share the same provider, store and clock.
#[derive(Clone)]
pub struct Archive {
    inner: Arc<ArchiveInner>,
}

impl Archive {
    pub fn new(
        provider: Arc<dyn MediaProvider>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(ArchiveInner {
                provider,
                store,
                clock,
            }),
        }
    }

    /// Collect every image in a single post.
    pub async fn collect_post(&self, reference: &str) -> Result<CrawlOutcome> {
        let shortcode = match classify(reference)? {
            Reference::Post { shortcode } => shortcode,
            Reference::Profile { .. } => {
                return Err(ArchiveError::InvalidReference(format!(
                    "{reference} is a profile link, not a post link"
                )))
            }
        };

        if let Some(record) = self.inner.store.lookup(&shortcode).await? {
            info!(shortcode = shortcode.as_str(), "archive: post served from cache");
            return Ok(CrawlOutcome::Cached(record));
        }

        let post = self
            .inner
            .provider
            .fetch_post(&shortcode)
            .await
            .inspect_err(|e| {
                warn!(shortcode = shortcode.as_str(), error = %e, "archive: post fetch failed");
            })?;

        let owner = Owner::from(&post.owner);
        let items = normalize(&post.node, Engagement::of(&post.node))?;
        if items.is_empty() {
            info!(shortcode = shortcode.as_str(), "archive: post has no image");
            return Ok(CrawlOutcome::NoDisplayableMedia { owner });
        }

        info!(shortcode = shortcode.as_str(), count = items.len(), "archive: post crawled");
        let record = CrawlRecord::new(shortcode, owner, items, self.inner.clock.now());
        self.persist(record).await
    }

    /// Collect every image across all pages of a profile.
    pub async fn collect_profile(&self, reference: &str) -> Result<CrawlOutcome> {
        let username = match classify(reference)? {
            Reference::Profile { username } => username,
            Reference::Post { .. } => {
                return Err(ArchiveError::InvalidReference(format!(
                    "{reference} is a post link, not a profile link"
                )))
            }
        };

        if let Some(record) = self.inner.store.lookup(&username).await? {
            info!(username = username.as_str(), "archive: profile served from cache");
            return Ok(CrawlOutcome::Cached(record));
        }

        let profile = self
            .inner
            .provider
            .fetch_profile(&username)
            .await
            .inspect_err(|e| {
                warn!(username = username.as_str(), error = %e, "archive: profile fetch failed");
            })?;
        let owner = Owner::from(&profile);

        let media = PaginationCrawler::new(self.inner.provider.as_ref())
            .crawl(&owner.id)
            .await
            .inspect_err(|e| {
                warn!(username = username.as_str(), error = %e, "archive: profile crawl aborted");
            })?;

        info!(
            username = username.as_str(),
            pages = media.pages,
            count = media.count,
            "archive: profile crawled"
        );
        let record = CrawlRecord::new(username, owner, media.items, self.inner.clock.now());
        self.persist(record).await
    }

    /// Write once. If a concurrent request already stored this identifier,
    /// drop ours and serve theirs.
    async fn persist(&self, record: CrawlRecord) -> Result<CrawlOutcome> {
        match self.inner.store.insert_if_absent(&record).await? {
            InsertOutcome::Inserted => Ok(CrawlOutcome::Crawled(record)),
            InsertOutcome::AlreadyExists => {
                warn!(
                    identifier = record.identifier(),
                    "archive: lost insert race, serving stored record"
                );
                match self.inner.store.lookup(record.identifier()).await? {
                    Some(stored) => Ok(CrawlOutcome::Cached(stored)),
                    None => Ok(CrawlOutcome::Crawled(record)),
                }
            }
        }
    }
}

pub mod archive;
pub mod clock;
pub mod crawler;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod reference;
pub mod store;
pub mod types;

pub use archive::{Archive, CrawlOutcome};
pub use clock::{Clock, FixedClock, ZonedClock};
pub use crawler::{PaginationCrawler, ProfileMedia};
pub use error::{ArchiveError, Result};
pub use normalize::{normalize, Engagement};
pub use provider::{MediaProvider, PageCursor};
pub use reference::{classify, Reference};
pub use store::{InsertOutcome, MemoryRecordStore, PgRecordStore, RecordStore};
pub use types::{CrawlRecord, CrawlView, MediaItem, Owner};

#[cfg(any(test, feature = "test-support"))]
pub use provider::{MockProvider, ProviderCall};

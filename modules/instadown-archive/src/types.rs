// Record types: what a crawl produces and what the store keeps.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The account that published the crawled content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl From<&instagram_client::NodeOwner> for Owner {
    fn from(o: &instagram_client::NodeOwner) -> Self {
        Self {
            id: o.id.clone(),
            avatar_url: o.profile_pic_url.clone(),
            display_name: o.username.clone(),
        }
    }
}

impl From<&instagram_client::ProfileUser> for Owner {
    fn from(u: &instagram_client::ProfileUser) -> Self {
        Self {
            id: u.id.clone(),
            avatar_url: u.profile_pic_url.clone(),
            display_name: u.username.clone(),
        }
    }
}

/// One image. Like and comment counts belong to the parent post and are
/// copied onto every image derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(rename = "url")]
    pub media_url: String,
    pub height: u32,
    pub width: u32,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub shortcode: String,
    #[serde(rename = "countLike")]
    pub like_count: u64,
    #[serde(rename = "countComment")]
    pub comment_count: u64,
}

/// The persisted result of one crawl, keyed by `identifier` (post shortcode
/// or profile username). `item_count` always equals `items.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlRecord {
    identifier: String,
    owner: Owner,
    items: Vec<MediaItem>,
    item_count: usize,
    expires_at: DateTime<FixedOffset>,
}

impl CrawlRecord {
    pub fn new(
        identifier: impl Into<String>,
        owner: Owner,
        items: Vec<MediaItem>,
        expires_at: DateTime<FixedOffset>,
    ) -> Self {
        let item_count = items.len();
        Self {
            identifier: identifier.into(),
            owner,
            items,
            item_count,
            expires_at,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// When the record was built. The store's TTL counts from this stamp.
    pub fn expires_at(&self) -> DateTime<FixedOffset> {
        self.expires_at
    }

    /// The outward representation: everything except the cache key and expiry.
    pub fn view(&self) -> CrawlView {
        CrawlView {
            owner: self.owner.clone(),
            count: self.item_count,
            data: self.items.clone(),
        }
    }
}

/// Identifier-less view returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlView {
    pub owner: Owner,
    pub count: usize,
    pub data: Vec<MediaItem>,
}

// Profile pagination: walk an owner's timeline page by page until the
// provider stops handing out cursors.

use instagram_client::MediaNode;
use tracing::{debug, info};

use crate::error::Result;
use crate::normalize::{normalize, Engagement};
use crate::provider::{MediaProvider, PageCursor};
use crate::types::MediaItem;

/// Everything collected from one profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileMedia {
    pub items: Vec<MediaItem>,
    /// Items emitted after filtering, not nodes seen.
    pub count: usize,
    pub pages: usize,
}

pub struct PaginationCrawler<'a> {
    provider: &'a dyn MediaProvider,
}

impl<'a> PaginationCrawler<'a> {
    pub fn new(provider: &'a dyn MediaProvider) -> Self {
        Self { provider }
    }

    /// Crawl every page for `owner_id`. Pages are fetched strictly in sequence;
    /// the only stop condition is the provider returning no next cursor.
    /// Any fetch or normalization error aborts the whole crawl.
    pub async fn crawl(&self, owner_id: &str) -> Result<ProfileMedia> {
        let mut out = ProfileMedia::default();
        let mut cursor = PageCursor::first();

        loop {
            let page = self.provider.fetch_profile_page(owner_id, &cursor).await?;
            out.pages += 1;

            let before = out.items.len();
            for node in &page.nodes {
                let mut items = normalize(node, Engagement::of(node))?;
                // Timeline items link back to the post, not the carousel slide.
                if let MediaNode::Sidecar(side) = node {
                    for item in &mut items {
                        item.shortcode.clone_from(&side.shortcode);
                    }
                }
                out.items.extend(items);
            }
            debug!(
                owner_id,
                page = out.pages,
                nodes = page.nodes.len(),
                emitted = out.items.len() - before,
                "crawler: page processed"
            );

            match page.end_cursor {
                Some(next) => cursor = PageCursor::from_provider(next),
                None => break,
            }
        }

        out.count = out.items.len();
        info!(owner_id, pages = out.pages, count = out.count, "crawler: profile exhausted");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::provider::{MockProvider, ProviderCall};
    use instagram_client::TimelinePage;
    use serde_json::json;

    fn image(id: &str) -> MediaNode {
        serde_json::from_value(json!({
            "__typename": "GraphImage",
            "id": id,
            "shortcode": format!("sc_{id}"),
            "display_url": format!("https://cdn.example.com/{id}.jpg"),
            "dimensions": { "height": 100, "width": 100 },
            "display_resources": [{ "src": "https://cdn.example.com/t.jpg", "config_width": 100, "config_height": 100 }],
            "edge_media_preview_like": { "count": 1 },
            "edge_media_to_comment": { "count": 0 }
        }))
        .unwrap()
    }

    fn video(id: &str) -> MediaNode {
        serde_json::from_value(json!({ "__typename": "GraphVideo", "id": id })).unwrap()
    }

    fn page(nodes: Vec<MediaNode>, next: Option<&str>) -> TimelinePage {
        TimelinePage {
            nodes,
            end_cursor: next.map(str::to_string),
        }
    }

    fn ids(media: &ProfileMedia) -> Vec<&str> {
        media.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn follows_cursors_through_empty_pages() {
        let provider = MockProvider::new()
            .with_page(page(vec![image("A"), image("B")], Some("c2")))
            .with_page(page(vec![], Some("c3")))
            .with_page(page(vec![image("C")], None));

        let media = PaginationCrawler::new(&provider).crawl("42").await.unwrap();

        assert_eq!(ids(&media), vec!["A", "B", "C"]);
        assert_eq!(media.count, 3);
        assert_eq!(media.pages, 3);
        assert_eq!(provider.page_calls(), 3);
    }

    #[tokio::test]
    async fn cursors_are_passed_through_verbatim() {
        let provider = MockProvider::new()
            .with_page(page(vec![image("A")], Some("QVFB==")))
            .with_page(page(vec![], None));

        PaginationCrawler::new(&provider).crawl("42").await.unwrap();

        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::Page {
                    owner_id: "42".into(),
                    cursor: PageCursor::first(),
                },
                ProviderCall::Page {
                    owner_id: "42".into(),
                    cursor: PageCursor::from_provider("QVFB=="),
                },
            ]
        );
    }

    #[tokio::test]
    async fn count_excludes_filtered_nodes() {
        let provider = MockProvider::new().with_page(page(
            vec![video("v1"), image("A"), video("v2")],
            None,
        ));

        let media = PaginationCrawler::new(&provider).crawl("42").await.unwrap();
        assert_eq!(ids(&media), vec!["A"]);
        assert_eq!(media.count, 1);
    }

    #[tokio::test]
    async fn repeated_media_ids_are_kept() {
        let provider = MockProvider::new()
            .with_page(page(vec![image("A")], Some("c2")))
            .with_page(page(vec![image("A")], None));

        let media = PaginationCrawler::new(&provider).crawl("42").await.unwrap();
        assert_eq!(ids(&media), vec!["A", "A"]);
    }

    #[tokio::test]
    async fn timeline_image_without_display_resources_uses_thumbnail_src() {
        let node: MediaNode = serde_json::from_value(json!({
            "__typename": "GraphImage",
            "id": "1",
            "shortcode": "tl1",
            "display_url": "https://cdn.example.com/1.jpg",
            "dimensions": { "height": 1080, "width": 1080 },
            "thumbnail_src": "https://cdn.example.com/1_thumb.jpg",
            "edge_media_preview_like": { "count": 4 },
            "edge_media_to_comment": { "count": 1 }
        }))
        .unwrap();
        let provider = MockProvider::new().with_page(page(vec![node], None));

        let media = PaginationCrawler::new(&provider).crawl("42").await.unwrap();

        assert_eq!(media.count, 1);
        assert_eq!(media.items[0].thumbnail_url, "https://cdn.example.com/1_thumb.jpg");
        assert_eq!(media.items[0].shortcode, "tl1");
    }

    #[tokio::test]
    async fn sidecar_items_carry_the_post_shortcode() {
        let child = |id: &str| {
            json!({ "node": {
                "__typename": "GraphImage",
                "id": id,
                "shortcode": format!("child_{id}"),
                "display_url": format!("https://cdn.example.com/{id}.jpg"),
                "dimensions": { "height": 100, "width": 100 },
                "display_resources": [{ "src": "https://cdn.example.com/t.jpg", "config_width": 100, "config_height": 100 }]
            }})
        };
        let sidecar: MediaNode = serde_json::from_value(json!({
            "__typename": "GraphSidecar",
            "id": "p1",
            "shortcode": "post1",
            "edge_sidecar_to_children": { "edges": [child("a"), child("b")] }
        }))
        .unwrap();
        let provider = MockProvider::new().with_page(page(vec![sidecar], None));

        let media = PaginationCrawler::new(&provider).crawl("42").await.unwrap();

        assert_eq!(ids(&media), vec!["a", "b"]);
        assert!(media.items.iter().all(|i| i.shortcode == "post1"));
    }

    #[tokio::test]
    async fn fetch_error_aborts_the_crawl() {
        let provider = MockProvider::new()
            .with_page(page(vec![image("A")], Some("c2")))
            .with_page_error("connection reset");

        let err = PaginationCrawler::new(&provider).crawl("42").await.unwrap_err();
        assert!(matches!(err, ArchiveError::UpstreamUnavailable(_)));
        assert_eq!(provider.page_calls(), 2);
    }
}

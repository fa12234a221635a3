// Media normalization: single images and sidecar carousels flatten into
// uniform MediaItems. Anything that is not an image is skipped.

use instagram_client::{ImageNode, MediaNode};

use crate::error::{ArchiveError, Result};
use crate::types::MediaItem;

/// Post-level like/comment totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Engagement {
    pub likes: u64,
    pub comments: u64,
}

impl Engagement {
    /// Counts carried by a top-level node. Unrecognized nodes carry none.
    pub fn of(node: &MediaNode) -> Self {
        let (likes, comments) = match node {
            MediaNode::Image(img) => (img.edge_media_preview_like, img.edge_media_to_comment),
            MediaNode::Sidecar(side) => (side.edge_media_preview_like, side.edge_media_to_comment),
            MediaNode::Other => (None, None),
        };
        Self {
            likes: likes.map(|c| c.count).unwrap_or(0),
            comments: comments.map(|c| c.count).unwrap_or(0),
        }
    }
}

/// Flatten one top-level node into media items, in provider order.
///
/// - `Image` yields exactly one item.
/// - `Sidecar` yields one item per image child; video children are dropped.
/// - `Other` yields nothing. Callers decide what an empty result means.
///
/// Every item gets the same `engagement`.
pub fn normalize(node: &MediaNode, engagement: Engagement) -> Result<Vec<MediaItem>> {
    match node {
        MediaNode::Image(img) => Ok(vec![media_item(img, None, engagement)?]),
        MediaNode::Sidecar(side) => side
            .children()
            .filter_map(|child| match child {
                MediaNode::Image(img) => Some(img),
                MediaNode::Sidecar(_) | MediaNode::Other => None,
            })
            .map(|img| media_item(img, Some(side.shortcode.as_str()), engagement))
            .collect(),
        MediaNode::Other => Ok(Vec::new()),
    }
}

fn media_item(
    img: &ImageNode,
    parent_shortcode: Option<&str>,
    engagement: Engagement,
) -> Result<MediaItem> {
    let thumbnail = img.display_resources.first().ok_or_else(|| {
        ArchiveError::MalformedUpstreamNode(format!("node {} has no display resources", img.id))
    })?;

    let shortcode = img
        .shortcode
        .as_deref()
        .or(parent_shortcode)
        .ok_or_else(|| {
            ArchiveError::MalformedUpstreamNode(format!("node {} has no shortcode", img.id))
        })?;

    Ok(MediaItem {
        id: img.id.clone(),
        media_url: img.display_url.clone(),
        height: img.dimensions.height,
        width: img.dimensions.width,
        thumbnail_url: thumbnail.src.clone(),
        shortcode: shortcode.to_string(),
        like_count: engagement.likes,
        comment_count: engagement.comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn image(id: &str, shortcode: Option<&str>) -> Value {
        let mut v = json!({
            "__typename": "GraphImage",
            "id": id,
            "display_url": format!("https://cdn.example.com/{id}.jpg"),
            "dimensions": { "height": 1350, "width": 1080 },
            "display_resources": [
                { "src": format!("https://cdn.example.com/{id}_640.jpg"), "config_width": 640, "config_height": 800 },
                { "src": format!("https://cdn.example.com/{id}_1080.jpg"), "config_width": 1080, "config_height": 1350 }
            ]
        });
        if let Some(code) = shortcode {
            v["shortcode"] = json!(code);
        }
        v
    }

    fn video(id: &str) -> Value {
        json!({ "__typename": "GraphVideo", "id": id, "video_url": "https://cdn.example.com/v.mp4" })
    }

    fn sidecar(children: Vec<Value>) -> MediaNode {
        let edges: Vec<Value> = children.into_iter().map(|n| json!({ "node": n })).collect();
        serde_json::from_value(json!({
            "__typename": "GraphSidecar",
            "id": "parent",
            "shortcode": "side123",
            "edge_sidecar_to_children": { "edges": edges },
            "edge_media_preview_like": { "count": 99 },
            "edge_media_to_comment": { "count": 7 }
        }))
        .unwrap()
    }

    fn node(v: Value) -> MediaNode {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn single_image_yields_one_item() {
        let mut v = image("1", Some("abc123"));
        v["edge_media_preview_like"] = json!({ "count": 10 });
        v["edge_media_to_comment"] = json!({ "count": 2 });
        let n = node(v);

        let items = normalize(&n, Engagement::of(&n)).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id, "1");
        assert_eq!(item.media_url, "https://cdn.example.com/1.jpg");
        assert_eq!(item.thumbnail_url, "https://cdn.example.com/1_640.jpg");
        assert_eq!((item.height, item.width), (1350, 1080));
        assert_eq!(item.shortcode, "abc123");
        assert_eq!((item.like_count, item.comment_count), (10, 2));
    }

    #[test]
    fn sidecar_skips_videos_and_keeps_order() {
        let n = sidecar(vec![
            image("a", Some("childA")),
            video("v"),
            image("b", Some("childB")),
        ]);

        let items = normalize(&n, Engagement::of(&n)).unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        for item in &items {
            assert_eq!(item.like_count, 99);
            assert_eq!(item.comment_count, 7);
        }
    }

    #[test]
    fn sidecar_child_without_shortcode_inherits_parent() {
        let n = sidecar(vec![image("a", None)]);
        let items = normalize(&n, Engagement::of(&n)).unwrap();
        assert_eq!(items[0].shortcode, "side123");
    }

    #[test]
    fn sidecar_of_only_videos_is_empty() {
        let n = sidecar(vec![video("v1"), video("v2")]);
        assert!(normalize(&n, Engagement::of(&n)).unwrap().is_empty());
    }

    #[test]
    fn other_type_yields_nothing() {
        let n = node(video("v"));
        assert_eq!(Engagement::of(&n), Engagement::default());
        assert!(normalize(&n, Engagement::of(&n)).unwrap().is_empty());
    }

    #[test]
    fn missing_display_resources_is_malformed() {
        let mut v = image("1", Some("abc123"));
        v["display_resources"] = json!([]);
        let n = node(v);
        assert!(matches!(
            normalize(&n, Engagement::default()),
            Err(ArchiveError::MalformedUpstreamNode(_))
        ));
    }

    #[test]
    fn malformed_child_fails_the_whole_sidecar() {
        let mut bad = image("b", Some("x"));
        bad["display_resources"] = json!([]);
        let n = sidecar(vec![image("a", Some("y")), bad]);
        assert!(normalize(&n, Engagement::of(&n)).is_err());
    }

    #[test]
    fn supplied_engagement_wins_over_node_counts() {
        let mut v = image("1", Some("abc123"));
        v["edge_media_preview_like"] = json!({ "count": 10 });
        let n = node(v);
        let items = normalize(&n, Engagement { likes: 3, comments: 4 }).unwrap();
        assert_eq!((items[0].like_count, items[0].comment_count), (3, 4));
    }
}

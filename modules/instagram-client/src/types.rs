use serde::Deserialize;

// --- Shared GraphQL shapes ---

/// `{ "count": n }` wrapper used for likes and comments.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EdgeCount {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Dimensions {
    pub height: u32,
    pub width: u32,
}

/// One rendition of an image at a given resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayResource {
    pub src: String,
    pub config_width: u32,
    pub config_height: u32,
}

// --- Media nodes ---

/// A media node, dispatched on the provider's `__typename` tag.
/// Videos, reels and any future type land in `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum MediaNode {
    #[serde(rename = "GraphImage")]
    Image(ImageNode),
    #[serde(rename = "GraphSidecar")]
    Sidecar(SidecarNode),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawImageNode")]
pub struct ImageNode {
    pub id: String,
    /// Absent on some sidecar children.
    pub shortcode: Option<String>,
    pub display_url: String,
    pub dimensions: Dimensions,
    /// Resolution variants, smallest first. Timeline nodes only carry
    /// `thumbnail_src`/`thumbnail_resources`; those fill this list instead.
    pub display_resources: Vec<DisplayResource>,
    pub edge_media_preview_like: Option<EdgeCount>,
    pub edge_media_to_comment: Option<EdgeCount>,
}

#[derive(Deserialize)]
struct RawImageNode {
    id: String,
    shortcode: Option<String>,
    display_url: String,
    dimensions: Dimensions,
    #[serde(default)]
    display_resources: Vec<DisplayResource>,
    thumbnail_src: Option<String>,
    #[serde(default)]
    thumbnail_resources: Vec<DisplayResource>,
    edge_media_preview_like: Option<EdgeCount>,
    edge_media_to_comment: Option<EdgeCount>,
}

impl From<RawImageNode> for ImageNode {
    fn from(raw: RawImageNode) -> Self {
        let mut display_resources = raw.display_resources;
        if display_resources.is_empty() {
            if let Some(src) = raw.thumbnail_src.filter(|s| !s.is_empty()) {
                // The timeline does not report the thumbnail's size.
                display_resources.push(DisplayResource {
                    src,
                    config_width: 0,
                    config_height: 0,
                });
            }
            display_resources.extend(raw.thumbnail_resources);
        }
        Self {
            id: raw.id,
            shortcode: raw.shortcode,
            display_url: raw.display_url,
            dimensions: raw.dimensions,
            display_resources,
            edge_media_preview_like: raw.edge_media_preview_like,
            edge_media_to_comment: raw.edge_media_to_comment,
        }
    }
}

/// A carousel post. Engagement counts live here, not on the children.
#[derive(Debug, Clone, Deserialize)]
pub struct SidecarNode {
    pub id: String,
    pub shortcode: String,
    pub edge_sidecar_to_children: Connection<MediaNode>,
    pub edge_media_preview_like: Option<EdgeCount>,
    pub edge_media_to_comment: Option<EdgeCount>,
}

impl SidecarNode {
    /// Children in the order the provider returned them.
    pub fn children(&self) -> impl Iterator<Item = &MediaNode> {
        self.edge_sidecar_to_children.edges.iter().map(|e| &e.node)
    }
}

/// Owner block embedded in a `shortcode_media` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeOwner {
    pub id: String,
    pub username: String,
    pub profile_pic_url: String,
}

// --- Post query ---

/// A single post: its owner plus the typed media node.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMedia {
    pub owner: NodeOwner,
    #[serde(flatten)]
    pub node: MediaNode,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PostQueryResponse {
    pub data: PostQueryData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PostQueryData {
    pub shortcode_media: Option<PostMedia>,
}

// --- Profile info ---

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUser {
    pub id: String,
    pub username: String,
    pub profile_pic_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfileInfoResponse {
    pub data: ProfileInfoData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ProfileInfoData {
    pub user: Option<ProfileUser>,
}

// --- Owner timeline ---

/// One page of an owner's timeline.
#[derive(Debug, Clone, Default)]
pub struct TimelinePage {
    pub nodes: Vec<MediaNode>,
    /// `None` once the provider reports there is nothing further.
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TimelineResponse {
    pub data: TimelineData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TimelineData {
    pub user: Option<TimelineUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TimelineUser {
    pub edge_owner_to_timeline_media: TimelineMedia,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TimelineMedia {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<MediaNode>>,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl From<TimelineMedia> for TimelinePage {
    fn from(media: TimelineMedia) -> Self {
        let end_cursor = if media.page_info.has_next_page {
            media.page_info.end_cursor.filter(|c| !c.is_empty())
        } else {
            None
        };
        Self {
            nodes: media.edges.into_iter().map(|e| e.node).collect(),
            end_cursor,
        }
    }
}

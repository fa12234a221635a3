pub mod error;
pub mod types;

pub use error::{InstagramError, Result};
pub use types::{
    Connection, Dimensions, DisplayResource, Edge, EdgeCount, ImageNode, MediaNode, NodeOwner,
    PostMedia, ProfileUser, SidecarNode, TimelinePage,
};

use serde::de::DeserializeOwned;
use types::{PostQueryResponse, ProfileInfoResponse, TimelineResponse};

const BASE_URL: &str = "https://www.instagram.com";

/// Persisted query for a single post looked up by shortcode.
const POST_QUERY_HASH: &str = "b3055c01b4b222b8a47dc12b090e4e64";

/// Persisted query for an owner's timeline media.
const TIMELINE_QUERY_HASH: &str = "003056d32c2554def87228bc3fd9668a";

/// App id the web frontend sends with REST calls.
const WEB_APP_ID: &str = "936619743392459";

const DEFAULT_PAGE_SIZE: u32 = 50;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub struct InstagramClient {
    client: reqwest::Client,
    base_url: String,
    page_size: u32,
    user_agent: String,
}

impl Default for InstagramClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InstagramClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Fetch a single post by shortcode.
    pub async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia> {
        tracing::info!(shortcode, "Fetching Instagram post");

        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();
        let resp: PostQueryResponse = self.graphql(POST_QUERY_HASH, &variables).await?;

        resp.data
            .shortcode_media
            .ok_or_else(|| InstagramError::NotFound(format!("post {shortcode}")))
    }

    /// Resolve a username to the owner's stable id and profile metadata.
    pub async fn fetch_profile(&self, username: &str) -> Result<ProfileUser> {
        tracing::info!(username, "Fetching Instagram profile");

        let url = format!("{}/api/v1/users/web_profile_info/", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("username", username)])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header("x-ig-app-id", WEB_APP_ID)
            .send()
            .await?;

        let info: ProfileInfoResponse = Self::read_json(resp).await?;
        info.data
            .user
            .ok_or_else(|| InstagramError::NotFound(format!("profile {username}")))
    }

    /// Fetch one page of an owner's timeline. `after` is the previous page's cursor.
    pub async fn fetch_timeline_page(
        &self,
        owner_id: &str,
        after: Option<&str>,
    ) -> Result<TimelinePage> {
        let mut variables = serde_json::json!({
            "id": owner_id,
            "first": self.page_size,
        });
        if let Some(cursor) = after.filter(|c| !c.is_empty()) {
            variables["after"] = serde_json::Value::String(cursor.to_string());
        }

        let resp: TimelineResponse = self
            .graphql(TIMELINE_QUERY_HASH, &variables.to_string())
            .await?;
        let user = resp
            .data
            .user
            .ok_or_else(|| InstagramError::NotFound(format!("timeline for owner {owner_id}")))?;

        let page = TimelinePage::from(user.edge_owner_to_timeline_media);
        tracing::debug!(
            owner_id,
            nodes = page.nodes.len(),
            has_next = page.end_cursor.is_some(),
            "Fetched timeline page"
        );
        Ok(page)
    }

    async fn graphql<T: DeserializeOwned>(&self, query_hash: &str, variables: &str) -> Result<T> {
        let url = format!("{}/graphql/query/", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("query_hash", query_hash), ("variables", variables)])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        Self::read_json(resp).await
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            let body = resp.text().await.unwrap_or_default();
            return Err(InstagramError::NotFound(body));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InstagramError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

// Upstream boundary. Archive calls this without knowing which client is
// behind it. Production wires in InstagramClient; tests use MockProvider.

use async_trait::async_trait;
use instagram_client::{InstagramClient, PostMedia, ProfileUser, TimelinePage};

use crate::error::Result;

/// Opaque pagination token. Never parsed, only handed back to the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor(Option<String>);

impl PageCursor {
    /// The first-page sentinel.
    pub fn first() -> Self {
        Self(None)
    }

    /// Wrap a provider-issued cursor.
    pub fn from_provider(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub(crate) fn as_token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia>;

    async fn fetch_profile(&self, username: &str) -> Result<ProfileUser>;

    async fn fetch_profile_page(&self, owner_id: &str, cursor: &PageCursor)
        -> Result<TimelinePage>;
}

#[async_trait]
impl MediaProvider for InstagramClient {
    async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia> {
        Ok(InstagramClient::fetch_post(self, shortcode).await?)
    }

    async fn fetch_profile(&self, username: &str) -> Result<ProfileUser> {
        Ok(InstagramClient::fetch_profile(self, username).await?)
    }

    async fn fetch_profile_page(
        &self,
        owner_id: &str,
        cursor: &PageCursor,
    ) -> Result<TimelinePage> {
        Ok(self.fetch_timeline_page(owner_id, cursor.as_token()).await?)
    }
}

// ---------------------------------------------------------------------------
// MockProvider (for tests)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-support"))]
pub use mock::{MockProvider, ProviderCall};

#[cfg(any(test, feature = "test-support"))]
mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;
    use crate::error::ArchiveError;

    /// One recorded upstream call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProviderCall {
        Post(String),
        Profile(String),
        Page { owner_id: String, cursor: PageCursor },
    }

    /// Scripted provider. Posts and profiles are served by key; timeline pages
    /// are served in the order they were queued. Records every call.
    #[derive(Default)]
    pub struct MockProvider {
        posts: Mutex<HashMap<String, PostMedia>>,
        profiles: Mutex<HashMap<String, ProfileUser>>,
        pages: Mutex<VecDeque<std::result::Result<TimelinePage, String>>>,
        calls: Mutex<Vec<ProviderCall>>,
    }

    impl MockProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_post(self, shortcode: &str, post: PostMedia) -> Self {
            self.posts.lock().unwrap().insert(shortcode.to_string(), post);
            self
        }

        pub fn with_profile(self, username: &str, user: ProfileUser) -> Self {
            self.profiles
                .lock()
                .unwrap()
                .insert(username.to_string(), user);
            self
        }

        pub fn with_page(self, page: TimelinePage) -> Self {
            self.pages.lock().unwrap().push_back(Ok(page));
            self
        }

        pub fn with_page_error(self, message: &str) -> Self {
            self.pages
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
            self
        }

        pub fn calls(&self) -> Vec<ProviderCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn page_calls(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| matches!(c, ProviderCall::Page { .. }))
                .count()
        }

        fn record(&self, call: ProviderCall) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl MediaProvider for MockProvider {
        async fn fetch_post(&self, shortcode: &str) -> Result<PostMedia> {
            self.record(ProviderCall::Post(shortcode.to_string()));
            self.posts
                .lock()
                .unwrap()
                .get(shortcode)
                .cloned()
                .ok_or_else(|| ArchiveError::UpstreamUnavailable(format!("no post {shortcode}")))
        }

        async fn fetch_profile(&self, username: &str) -> Result<ProfileUser> {
            self.record(ProviderCall::Profile(username.to_string()));
            self.profiles
                .lock()
                .unwrap()
                .get(username)
                .cloned()
                .ok_or_else(|| ArchiveError::UpstreamUnavailable(format!("no profile {username}")))
        }

        async fn fetch_profile_page(
            &self,
            owner_id: &str,
            cursor: &PageCursor,
        ) -> Result<TimelinePage> {
            self.record(ProviderCall::Page {
                owner_id: owner_id.to_string(),
                cursor: cursor.clone(),
            });
            match self.pages.lock().unwrap().pop_front() {
                Some(Ok(page)) => Ok(page),
                Some(Err(message)) => Err(ArchiveError::UpstreamUnavailable(message)),
                None => Err(ArchiveError::UpstreamUnavailable(
                    "no more scripted pages".to_string(),
                )),
            }
        }
    }
}

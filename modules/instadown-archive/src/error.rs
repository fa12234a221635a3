/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Malformed upstream node: {0}")]
    MalformedUpstreamNode(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<instagram_client::InstagramError> for ArchiveError {
    fn from(err: instagram_client::InstagramError) -> Self {
        ArchiveError::UpstreamUnavailable(err.to_string())
    }
}

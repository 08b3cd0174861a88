use async_trait::async_trait;
use thiserror::Error;

use super::moderation_models::{Comment, Item, ItemState, RepoRef};

/// Errors raised by the content-hosting platform adapter.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The referenced resource does not exist (or no longer exists).
    #[error("not found")]
    NotFound,
    /// Creation raced with a concurrent creator.
    #[error("already exists")]
    AlreadyExists,
    #[error("platform API error: {0}")]
    Api(String),
}

/// The minimal platform surface the moderation engine needs.
///
/// Implementations talk to the hosting platform; the engine never sees
/// wire formats. Every call may fail with [`PlatformError::NotFound`]
/// (handled specially where absence is expected) or a transport error,
/// which propagates.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Runs an item search, most recently updated first, one page only.
    /// The query string is complete, repository scope included.
    async fn search_items(&self, query: &str, page_size: u32)
        -> Result<Vec<Item>, PlatformError>;

    async fn list_comments(&self, repo: &RepoRef, number: u64)
        -> Result<Vec<Comment>, PlatformError>;

    async fn get_label(&self, repo: &RepoRef, name: &str) -> Result<(), PlatformError>;

    async fn create_label(
        &self,
        repo: &RepoRef,
        name: &str,
        color: &str,
    ) -> Result<(), PlatformError>;

    async fn add_label(&self, repo: &RepoRef, number: u64, label: &str)
        -> Result<(), PlatformError>;

    async fn remove_label(
        &self,
        repo: &RepoRef,
        number: u64,
        label: &str,
    ) -> Result<(), PlatformError>;

    async fn create_comment(
        &self,
        repo: &RepoRef,
        number: u64,
        body: &str,
    ) -> Result<(), PlatformError>;

    async fn edit_title(
        &self,
        repo: &RepoRef,
        number: u64,
        title: &str,
    ) -> Result<(), PlatformError>;

    async fn edit_body(&self, repo: &RepoRef, number: u64, body: &str)
        -> Result<(), PlatformError>;

    async fn edit_comment(
        &self,
        repo: &RepoRef,
        comment_id: u64,
        body: &str,
    ) -> Result<(), PlatformError>;

    async fn set_state(
        &self,
        repo: &RepoRef,
        number: u64,
        state: ItemState,
    ) -> Result<(), PlatformError>;
}

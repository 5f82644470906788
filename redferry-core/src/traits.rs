//! Ports between the pipeline stages. The run loop in the `migrator`
//! crate is written against these, so the network and database clients
//! can be swapped for in-memory fakes in tests.

use async_trait::async_trait;

use crate::error::{DestinationError, SourceError, StorageError};
use crate::types::{
    DestinationCommunity, MigratedComment, MigratedPost, SourceComment, SourcePost,
};

/// Read side: the platform posts are copied from.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Front-page posts of a subreddit in the source's own hot order,
    /// at most 25 entries.
    async fn fetch_hot(&self, subreddit: &str) -> Result<Vec<SourcePost>, SourceError>;

    /// The post's comment tree flattened into parent-before-child order.
    async fn fetch_comment_tree(
        &self,
        subreddit: &str,
        post_id: &str,
    ) -> Result<Vec<SourceComment>, SourceError>;
}

/// Write side: the instance posts are copied to.
#[async_trait]
pub trait Destination: Send + Sync {
    /// Exact, case-insensitive name lookup. Zero or ambiguous matches
    /// both fail with `CommunityNotFound`.
    async fn resolve_community(
        &self,
        name: &str,
    ) -> Result<DestinationCommunity, DestinationError>;

    async fn create_post(
        &self,
        community: &DestinationCommunity,
        post: &SourcePost,
    ) -> Result<MigratedPost, DestinationError>;

    /// `parent` is None for replies attached directly to the post.
    async fn create_comment(
        &self,
        post: &MigratedPost,
        parent: Option<&MigratedComment>,
        comment: &SourceComment,
    ) -> Result<MigratedComment, DestinationError>;
}

/// Privileged storage access used to backdate created rows, since the
/// public write API always stamps "now".
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn backdate_post(
        &self,
        post: &MigratedPost,
        source: &SourcePost,
    ) -> Result<(), StorageError>;

    async fn backdate_comment(
        &self,
        comment: &MigratedComment,
        source: &SourceComment,
    ) -> Result<(), StorageError>;
}

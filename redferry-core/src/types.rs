use chrono::{DateTime, Utc};

/// A post as returned by the source's hot listing. Fetched once, never
/// mutated.
#[derive(Debug, Clone)]
pub struct SourcePost {
    pub id: String,
    pub subreddit: String,
    pub title: String,
    /// Self-text, if any.
    pub body: Option<String>,
    /// External URL for link posts. Self posts carry no link.
    pub link: Option<String>,
    pub author: String,
    pub score: i64,
    pub created: DateTime<Utc>,
    pub nsfw: bool,
}

/// One node of a post's comment tree, flattened into parent-before-child
/// order by the source reader.
#[derive(Debug, Clone)]
pub struct SourceComment {
    pub id: String,
    /// None for top-level comments attached directly to the post.
    pub parent_id: Option<String>,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created: DateTime<Utc>,
}

/// A community on the destination instance. Looked up by name, never
/// created by this tool.
#[derive(Debug, Clone)]
pub struct DestinationCommunity {
    pub id: i64,
    pub name: String,
}

/// Identifier of a post created on the destination, kept only to carry
/// the id forward to comment replay and backfill within one run.
#[derive(Debug, Clone)]
pub struct MigratedPost {
    pub id: i64,
    pub source_id: String,
}

#[derive(Debug, Clone)]
pub struct MigratedComment {
    pub id: i64,
    pub source_id: String,
    /// Destination id of the parent comment; None for replies to the post
    /// itself.
    pub parent_id: Option<i64>,
}

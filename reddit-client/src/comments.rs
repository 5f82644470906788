use redferry_core::SourceComment;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::api::{epoch_to_utc, RedditListing, RedditListingChild};

#[derive(Debug, Clone, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    pub author: String,
    pub body: String,
    pub score: i64,
    pub created_utc: f64,
    #[serde(default)]
    pub replies: Replies,
}

/// Reddit encodes "no replies" as an empty string instead of an empty
/// listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Replies {
    Nested(Box<RedditListing<Value>>),
    Empty(String),
}

impl Default for Replies {
    fn default() -> Self {
        Replies::Empty(String::new())
    }
}

/// Flattens a comment listing depth-first into parent-before-child order.
/// `more` stubs (collapsed continuation markers) are dropped, along with
/// any children whose payload does not parse as a comment.
pub fn flatten_listing(listing: &RedditListing<Value>) -> Vec<SourceComment> {
    let mut comments = Vec::new();
    walk(&listing.data.children, None, &mut comments);
    comments
}

fn walk(
    children: &[RedditListingChild<Value>],
    parent: Option<&str>,
    out: &mut Vec<SourceComment>,
) {
    for child in children {
        if child.kind != "t1" {
            continue;
        }
        let data: RedditCommentData = match serde_json::from_value(child.data.clone()) {
            Ok(data) => data,
            Err(e) => {
                warn!("Skipping unparseable comment payload: {e}");
                continue;
            }
        };
        out.push(SourceComment {
            id: data.id.clone(),
            parent_id: parent.map(str::to_string),
            author: data.author,
            body: data.body,
            score: data.score,
            created: epoch_to_utc(data.created_utc),
        });
        if let Replies::Nested(replies) = &data.replies {
            walk(&replies.data.children, Some(&data.id), out);
        }
    }
}

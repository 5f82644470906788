use std::collections::{HashMap, HashSet};

use redferry_core::{Destination, MigratedComment, MigratedPost, SourceComment};
use tracing::warn;

/// Result of replaying one post's comment tree.
#[derive(Debug, Default)]
pub struct CommentReplay {
    /// Created comments paired with their source, in creation order,
    /// for the backfill step.
    pub migrated: Vec<(MigratedComment, SourceComment)>,
    pub failed: usize,
    pub orphaned: usize,
}

/// Replays a comment tree under a migrated post. The input is in
/// parent-before-child order, so a single pass suffices: every comment
/// is created against its already-created destination parent, or the
/// post itself for top-level comments. When a creation fails, the
/// subtree below it is skipped without an attempt — there is no
/// destination parent to attach it to.
pub async fn replay_comments<D: Destination>(
    destination: &D,
    post: &MigratedPost,
    comments: &[SourceComment],
) -> CommentReplay {
    let mut replay = CommentReplay::default();
    let mut created: HashMap<&str, MigratedComment> = HashMap::new();
    let mut dead: HashSet<&str> = HashSet::new();

    for comment in comments {
        let parent = match &comment.parent_id {
            None => None,
            Some(parent_id) if dead.contains(parent_id.as_str()) => {
                warn!(
                    "Orphaned subtree at comment {}: parent {} was not created",
                    comment.id, parent_id
                );
                replay.orphaned += 1;
                dead.insert(&comment.id);
                continue;
            }
            Some(parent_id) => match created.get(parent_id.as_str()) {
                Some(parent) => Some(parent),
                None => {
                    // parent never appeared in the input at all
                    warn!(
                        "Orphaned subtree at comment {}: parent {} unknown",
                        comment.id, parent_id
                    );
                    replay.orphaned += 1;
                    dead.insert(&comment.id);
                    continue;
                }
            },
        };

        match destination.create_comment(post, parent, comment).await {
            Ok(migrated) => {
                created.insert(&comment.id, migrated.clone());
                replay.migrated.push((migrated, comment.clone()));
            }
            Err(e) => {
                warn!("Could not create comment {}: {e}", comment.id);
                replay.failed += 1;
                dead.insert(&comment.id);
            }
        }
    }

    replay
}

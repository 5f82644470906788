use redferry_core::{
    Destination, DestinationCommunity, MetadataStore, MigrationError, PostSource, RunConfig,
    SourcePost, StorageError,
};
use tracing::{info, warn};

use crate::comments::replay_comments;
use crate::report::{RunReport, SubredditOutcome};

/// Run context: credentials and connections are acquired once in `main`
/// and handed in here; the loop itself owns no global state.
pub struct Migrator<'a, S, D, B> {
    config: &'a RunConfig,
    source: &'a S,
    destination: &'a D,
    backfill: Option<&'a B>,
}

impl<'a, S, D, B> Migrator<'a, S, D, B>
where
    S: PostSource,
    D: Destination,
    B: MetadataStore,
{
    pub fn new(
        config: &'a RunConfig,
        source: &'a S,
        destination: &'a D,
        backfill: Option<&'a B>,
    ) -> Self {
        Self {
            config,
            source,
            destination,
            backfill,
        }
    }

    /// Runs the whole migration: strictly sequential, one subreddit at a
    /// time, one post at a time. Per-item failures are logged and
    /// recorded in the report; nothing here retries.
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::default();

        for (subreddit, with_comments) in self.config.subreddit_plan() {
            match self.migrate_subreddit(&subreddit, with_comments).await {
                Ok(outcome) => report.subreddits.push(outcome),
                Err(reason) if reason.is_fatal() => {
                    report.fatal = Some(reason);
                    break;
                }
                Err(reason) => {
                    warn!("Skipping r/{subreddit}: {reason}");
                    report
                        .subreddits
                        .push(SubredditOutcome::skipped(&subreddit, reason));
                }
            }
        }

        report
    }

    async fn migrate_subreddit(
        &self,
        subreddit: &str,
        with_comments: bool,
    ) -> Result<SubredditOutcome, MigrationError> {
        let posts = self.source.fetch_hot(subreddit).await?;
        let community = self.destination.resolve_community(subreddit).await?;
        info!(
            "Migrating {} posts from r/{} into {} (id {})",
            posts.len(),
            subreddit,
            community.name,
            community.id
        );

        let mut outcome = SubredditOutcome::new(subreddit);

        if self.config.dry_run {
            for post in &posts {
                info!("[dry run] would migrate \"{}\" ({})", post.title, post.id);
            }
            return Ok(outcome);
        }

        for post in &posts {
            self.migrate_post(&community, post, with_comments, &mut outcome)
                .await?;
        }

        Ok(outcome)
    }

    /// Errors returned here are fatal (unusable storage); everything
    /// per-item is absorbed into the outcome.
    async fn migrate_post(
        &self,
        community: &DestinationCommunity,
        post: &SourcePost,
        with_comments: bool,
        outcome: &mut SubredditOutcome,
    ) -> Result<(), MigrationError> {
        let migrated = match self.destination.create_post(community, post).await {
            Ok(migrated) => migrated,
            Err(e) => {
                warn!(
                    "Could not create post {} in {}: {e}",
                    post.id, community.name
                );
                outcome.posts_failed += 1;
                return Ok(());
            }
        };
        outcome.posts_migrated += 1;

        let mut migrated_comments = Vec::new();
        if with_comments {
            match self
                .source
                .fetch_comment_tree(&post.subreddit, &post.id)
                .await
            {
                Ok(tree) => {
                    let replay = replay_comments(self.destination, &migrated, &tree).await;
                    outcome.comments_migrated += replay.migrated.len();
                    outcome.comments_failed += replay.failed;
                    outcome.comments_orphaned += replay.orphaned;
                    migrated_comments = replay.migrated;
                }
                Err(e) => {
                    // degraded outcome: the post stays, its comments do not
                    warn!("Post {} migrated without comments: {e}", post.id);
                }
            }
        }

        let Some(store) = self.backfill else {
            return Ok(());
        };
        match store.backdate_post(&migrated, post).await {
            Ok(()) => outcome.rows_backfilled += 1,
            Err(e @ StorageError::Unusable { .. }) => return Err(e.into()),
            Err(e) => {
                warn!("Timestamp left at now for post {}: {e}", migrated.id);
                outcome.rows_skipped += 1;
            }
        }
        for (migrated_comment, source_comment) in &migrated_comments {
            match store.backdate_comment(migrated_comment, source_comment).await {
                Ok(()) => outcome.rows_backfilled += 1,
                Err(e @ StorageError::Unusable { .. }) => return Err(e.into()),
                Err(e) => {
                    warn!(
                        "Timestamp left at now for comment {}: {e}",
                        migrated_comment.id
                    );
                    outcome.rows_skipped += 1;
                }
            }
        }
        Ok(())
    }
}

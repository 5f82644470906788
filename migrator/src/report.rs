use redferry_core::MigrationError;
use tracing::info;

/// Accumulated outcome of one migration run. Per-item failures end up
/// here instead of aborting the run; the operator reconciles from the
/// logged summary.
#[derive(Debug, Default)]
pub struct RunReport {
    pub subreddits: Vec<SubredditOutcome>,
    /// Set when the run was cut short by a fatal error (unusable
    /// storage, rejected credentials). Remaining subreddits were never
    /// attempted.
    pub fatal: Option<MigrationError>,
}

#[derive(Debug)]
pub struct SubredditOutcome {
    pub subreddit: String,
    /// Set when the whole subreddit was skipped before any post was
    /// attempted (source unavailable, community unresolved).
    pub skipped: Option<MigrationError>,
    pub posts_migrated: usize,
    pub posts_failed: usize,
    pub comments_migrated: usize,
    pub comments_failed: usize,
    pub comments_orphaned: usize,
    pub rows_backfilled: usize,
    pub rows_skipped: usize,
}

impl SubredditOutcome {
    pub fn new(subreddit: &str) -> Self {
        Self {
            subreddit: subreddit.to_string(),
            skipped: None,
            posts_migrated: 0,
            posts_failed: 0,
            comments_migrated: 0,
            comments_failed: 0,
            comments_orphaned: 0,
            rows_backfilled: 0,
            rows_skipped: 0,
        }
    }

    pub fn skipped(subreddit: &str, reason: MigrationError) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::new(subreddit)
        }
    }
}

impl RunReport {
    pub fn total_posts_migrated(&self) -> usize {
        self.subreddits.iter().map(|s| s.posts_migrated).sum()
    }

    pub fn skipped_subreddits(&self) -> impl Iterator<Item = &SubredditOutcome> {
        self.subreddits.iter().filter(|s| s.skipped.is_some())
    }

    pub fn log_summary(&self) {
        for outcome in &self.subreddits {
            match &outcome.skipped {
                Some(reason) => info!("r/{}: skipped ({reason})", outcome.subreddit),
                None => info!(
                    "r/{}: {} posts migrated ({} failed), {} comments migrated ({} failed, {} orphaned), {} rows backdated ({} left at now)",
                    outcome.subreddit,
                    outcome.posts_migrated,
                    outcome.posts_failed,
                    outcome.comments_migrated,
                    outcome.comments_failed,
                    outcome.comments_orphaned,
                    outcome.rows_backfilled,
                    outcome.rows_skipped,
                ),
            }
        }
        match &self.fatal {
            Some(reason) => info!(
                "Run aborted after {} subreddits: {reason}",
                self.subreddits.len()
            ),
            None => info!(
                "Run finished: {} posts across {} subreddits",
                self.total_posts_migrated(),
                self.subreddits.len()
            ),
        }
    }
}

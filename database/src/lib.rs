//! Privileged backfill against the destination instance's Postgres.
//!
//! The public write API stamps every created row with "now"; this module
//! rewrites the `published` timestamps (and non-default scores) of rows
//! the migrator just created, keyed by the ids the API returned. It
//! never touches identifiers or content.

use async_trait::async_trait;
use redferry_core::{
    MetadataStore, MigratedComment, MigratedPost, SourceComment, SourcePost, StorageError,
};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

/// Score 1 is the platform default for a freshly created row; writing it
/// back would be a no-op.
const DEFAULT_SCORE: i64 = 1;

pub struct MetadataBackfill {
    pool: PgPool,
}

impl MetadataBackfill {
    /// Connects and verifies the pool once at run start. An unusable
    /// connection here is fatal for the whole run.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Unusable {
                reason: e.to_string(),
            })?;

        info!("Connected to destination storage");
        Ok(Self { pool })
    }
}

#[async_trait]
impl MetadataStore for MetadataBackfill {
    async fn backdate_post(
        &self,
        post: &MigratedPost,
        source: &SourcePost,
    ) -> Result<(), StorageError> {
        let row_err = |e| StorageError::RowUpdate {
            entity: "post",
            id: post.id,
            source: e,
        };

        sqlx::query("UPDATE post SET published = $1 WHERE id = $2")
            .bind(source.created)
            .bind(post.id)
            .execute(&self.pool)
            .await
            .map_err(row_err)?;
        sqlx::query("UPDATE post_aggregates SET published = $1 WHERE post_id = $2")
            .bind(source.created)
            .bind(post.id)
            .execute(&self.pool)
            .await
            .map_err(row_err)?;

        if source.score != DEFAULT_SCORE {
            sqlx::query("UPDATE post_aggregates SET score = $1 WHERE post_id = $2")
                .bind(source.score)
                .bind(post.id)
                .execute(&self.pool)
                .await
                .map_err(row_err)?;
        }

        debug!(
            "Backdated post {} to {} (score {})",
            post.id, source.created, source.score
        );
        Ok(())
    }

    async fn backdate_comment(
        &self,
        comment: &MigratedComment,
        source: &SourceComment,
    ) -> Result<(), StorageError> {
        let row_err = |e| StorageError::RowUpdate {
            entity: "comment",
            id: comment.id,
            source: e,
        };

        sqlx::query("UPDATE comment SET published = $1 WHERE id = $2")
            .bind(source.created)
            .bind(comment.id)
            .execute(&self.pool)
            .await
            .map_err(row_err)?;
        sqlx::query("UPDATE comment_aggregates SET published = $1 WHERE comment_id = $2")
            .bind(source.created)
            .bind(comment.id)
            .execute(&self.pool)
            .await
            .map_err(row_err)?;

        if source.score != DEFAULT_SCORE {
            sqlx::query("UPDATE comment_aggregates SET score = $1 WHERE comment_id = $2")
                .bind(source.score)
                .bind(comment.id)
                .execute(&self.pool)
                .await
                .map_err(row_err)?;
        }

        debug!("Backdated comment {} to {}", comment.id, source.created);
        Ok(())
    }
}

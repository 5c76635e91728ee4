//! PostgreSQL implementation of LinkRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use safechat_core::entities::{ParentChildLink, SurveillanceLevel};
use safechat_core::error::DomainError;
use safechat_core::traits::{LinkRepository, RepoResult};
use safechat_core::value_objects::Snowflake;

use crate::models::LinkModel;

use super::error::{map_db_error, map_unique_violation, raw_ids};

/// PostgreSQL implementation of LinkRepository
#[derive(Clone)]
pub struct PgLinkRepository {
    pool: PgPool,
}

impl PgLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_links(models: Vec<LinkModel>) -> RepoResult<Vec<ParentChildLink>> {
    models.into_iter().map(ParentChildLink::try_from).collect()
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
    ) -> RepoResult<Option<ParentChildLink>> {
        let result = sqlx::query_as::<_, LinkModel>(
            r"
            SELECT parent_id, child_id, surveillance_level, created_at
            FROM parent_child_links
            WHERE parent_id = $1 AND child_id = $2
            ",
        )
        .bind(parent_id.into_inner())
        .bind(child_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ParentChildLink::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_for_parent_among(
        &self,
        parent_id: Snowflake,
        child_ids: &[Snowflake],
    ) -> RepoResult<Vec<ParentChildLink>> {
        let results = sqlx::query_as::<_, LinkModel>(
            r"
            SELECT parent_id, child_id, surveillance_level, created_at
            FROM parent_child_links
            WHERE parent_id = $1 AND child_id = ANY($2)
            ",
        )
        .bind(parent_id.into_inner())
        .bind(raw_ids(child_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_links(results)
    }

    #[instrument(skip(self))]
    async fn find_by_parent(&self, parent_id: Snowflake) -> RepoResult<Vec<ParentChildLink>> {
        let results = sqlx::query_as::<_, LinkModel>(
            r"
            SELECT parent_id, child_id, surveillance_level, created_at
            FROM parent_child_links
            WHERE parent_id = $1
            ORDER BY created_at
            ",
        )
        .bind(parent_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_links(results)
    }

    #[instrument(skip(self, link), fields(parent_id = %link.parent_id, child_id = %link.child_id))]
    async fn create(&self, link: &ParentChildLink) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO parent_child_links (parent_id, child_id, surveillance_level, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(link.parent_id.into_inner())
        .bind(link.child_id.into_inner())
        .bind(link.surveillance_level.as_str())
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::LinkExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_level(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
        level: SurveillanceLevel,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE parent_child_links
            SET surveillance_level = $3
            WHERE parent_id = $1 AND child_id = $2
            ",
        )
        .bind(parent_id.into_inner())
        .bind(child_id.into_inner())
        .bind(level.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete(&self, parent_id: Snowflake, child_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            "DELETE FROM parent_child_links WHERE parent_id = $1 AND child_id = $2",
        )
        .bind(parent_id.into_inner())
        .bind(child_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

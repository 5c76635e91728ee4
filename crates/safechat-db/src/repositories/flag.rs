//! PostgreSQL implementation of FlagRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use safechat_core::entities::Flag;
use safechat_core::traits::{FlagRepository, RepoResult};
use safechat_core::value_objects::Snowflake;

use crate::models::FlagModel;

use super::error::{map_db_error, raw_ids};

/// PostgreSQL implementation of FlagRepository
#[derive(Clone)]
pub struct PgFlagRepository {
    pool: PgPool,
}

impl PgFlagRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlagRepository for PgFlagRepository {
    #[instrument(skip(self, flag), fields(flag_id = %flag.id, message_id = %flag.message_id))]
    async fn create(&self, flag: &Flag) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO flags (id, message_id, flagged_by, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(flag.id.into_inner())
        .bind(flag.message_id.into_inner())
        .bind(flag.flagged_by.into_inner())
        .bind(flag.reason.as_deref())
        .bind(flag.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn find_by_message_ids(
        &self,
        message_ids: &[Snowflake],
    ) -> RepoResult<HashMap<Snowflake, Vec<Flag>>> {
        if message_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let results = sqlx::query_as::<_, FlagModel>(
            r"
            SELECT id, message_id, flagged_by, reason, created_at
            FROM flags
            WHERE message_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(raw_ids(message_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut grouped: HashMap<Snowflake, Vec<Flag>> = HashMap::new();
        for flag in results.into_iter().map(Flag::from) {
            grouped.entry(flag.message_id).or_default().push(flag);
        }
        Ok(grouped)
    }

    #[instrument(skip(self))]
    async fn delete_by_message(&self, message_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM flags WHERE message_id = $1")
            .bind(message_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn exists_for_chat(&self, chat_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM flags f
                JOIN messages m ON m.id = f.message_id
                WHERE m.chat_id = $1
            )
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgFlagRepository>();
    }
}

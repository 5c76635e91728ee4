//! PostgreSQL implementation of ChatRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use safechat_core::entities::Chat;
use safechat_core::error::DomainError;
use safechat_core::traits::{ChatRepository, RepoResult};
use safechat_core::value_objects::Snowflake;

use crate::models::ChatModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ChatRepository
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        let result = sqlx::query_as::<_, ChatModel>(
            "SELECT id, participant_a, participant_b, created_at FROM chats WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Chat::from))
    }

    #[instrument(skip(self))]
    async fn find_between(&self, a: Snowflake, b: Snowflake) -> RepoResult<Option<Chat>> {
        let result = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, participant_a, participant_b, created_at
            FROM chats
            WHERE LEAST(participant_a, participant_b) = LEAST($1::BIGINT, $2::BIGINT)
              AND GREATEST(participant_a, participant_b) = GREATEST($1::BIGINT, $2::BIGINT)
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Chat::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        let results = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, participant_a, participant_b, created_at
            FROM chats
            WHERE participant_a = $1 OR participant_b = $1
            ORDER BY id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Chat::from).collect())
    }

    #[instrument(skip(self, chat), fields(chat_id = %chat.id))]
    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO chats (id, participant_a, participant_b, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(chat.id.into_inner())
        .bind(chat.participant_a.into_inner())
        .bind(chat.participant_b.into_inner())
        .bind(chat.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ChatExists))?;

        Ok(())
    }
}

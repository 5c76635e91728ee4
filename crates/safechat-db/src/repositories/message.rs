//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use safechat_core::entities::Message;
use safechat_core::traits::{MessageQuery, MessageRepository, RepoResult};
use safechat_core::value_objects::Snowflake;

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::map_db_error;

const MESSAGE_COLUMNS: &str =
    "id, chat_id, sender_id, content, attachment_url, attachment_content_type, created_at";

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1");
        let result = sqlx::query_as::<_, MessageModel>(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn find_by_chat(
        &self,
        chat_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 100);

        let results = match (query.before, query.after) {
            (Some(before), None) => {
                // Older than the cursor (scrolling up)
                let sql = format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages \
                     WHERE chat_id = $1 AND id < $2 ORDER BY id DESC LIMIT $3"
                );
                sqlx::query_as::<_, MessageModel>(&sql)
                    .bind(chat_id.into_inner())
                    .bind(before.into_inner())
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            (None, Some(after)) => {
                // Newer than the cursor (scrolling down)
                let sql = format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages \
                     WHERE chat_id = $1 AND id > $2 ORDER BY id ASC LIMIT $3"
                );
                sqlx::query_as::<_, MessageModel>(&sql)
                    .bind(chat_id.into_inner())
                    .bind(after.into_inner())
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            _ => {
                let sql = format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages \
                     WHERE chat_id = $1 ORDER BY id DESC LIMIT $2"
                );
                sqlx::query_as::<_, MessageModel>(&sql)
                    .bind(chat_id.into_inner())
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn latest_in_chat(&self, chat_id: Snowflake) -> RepoResult<Option<Message>> {
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = $1 ORDER BY id DESC LIMIT 1"
        );
        let result = sqlx::query_as::<_, MessageModel>(&sql)
            .bind(chat_id.into_inner())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, chat_id = %message.chat_id))]
    async fn create(&self, message: &Message) -> RepoResult<()> {
        let insert = MessageInsert::new(message);

        sqlx::query(
            r"
            INSERT INTO messages
                (id, chat_id, sender_id, content, attachment_url, attachment_content_type, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(insert.id)
        .bind(insert.chat_id)
        .bind(insert.sender_id)
        .bind(insert.content)
        .bind(insert.attachment_url)
        .bind(insert.attachment_content_type)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}

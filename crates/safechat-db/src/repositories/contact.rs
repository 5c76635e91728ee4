//! PostgreSQL implementation of ContactRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use safechat_core::entities::{ApprovedContact, PendingContactRequest};
use safechat_core::error::DomainError;
use safechat_core::traits::{ContactRepository, RepoResult};
use safechat_core::value_objects::Snowflake;

use crate::models::{ApprovedContactModel, ContactRequestModel};

use super::error::{map_db_error, map_unique_violation, raw_ids};

const INSERT_APPROVAL: &str = r"
    INSERT INTO approved_contacts (child_id, contact_id, parent_id, created_at)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (child_id, contact_id) DO NOTHING
";

/// PostgreSQL implementation of ContactRepository
#[derive(Clone)]
pub struct PgContactRepository {
    pool: PgPool,
}

impl PgContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_approval_tx(
    tx: &mut Transaction<'_, Postgres>,
    approval: &ApprovedContact,
) -> RepoResult<()> {
    sqlx::query(INSERT_APPROVAL)
        .bind(approval.child_id.into_inner())
        .bind(approval.contact_id.into_inner())
        .bind(approval.parent_id.into_inner())
        .bind(approval.created_at)
        .execute(&mut **tx)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    #[instrument(skip(self))]
    async fn is_approved(&self, child_id: Snowflake, contact_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM approved_contacts WHERE child_id = $1 AND contact_id = $2
            )
            ",
        )
        .bind(child_id.into_inner())
        .bind(contact_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn find_approved(&self, child_id: Snowflake) -> RepoResult<Vec<ApprovedContact>> {
        let results = sqlx::query_as::<_, ApprovedContactModel>(
            r"
            SELECT child_id, contact_id, parent_id, created_at
            FROM approved_contacts
            WHERE child_id = $1
            ORDER BY created_at
            ",
        )
        .bind(child_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ApprovedContact::from).collect())
    }

    #[instrument(skip(self, approval), fields(child_id = %approval.child_id, contact_id = %approval.contact_id))]
    async fn insert_approval(&self, approval: &ApprovedContact) -> RepoResult<()> {
        sqlx::query(INSERT_APPROVAL)
            .bind(approval.child_id.into_inner())
            .bind(approval.contact_id.into_inner())
            .bind(approval.parent_id.into_inner())
            .bind(approval.created_at)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, request, approvals), fields(request_id = %request.id))]
    async fn approve_request(
        &self,
        request: &PendingContactRequest,
        approvals: &[ApprovedContact; 2],
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        for approval in approvals {
            insert_approval_tx(&mut tx, approval).await?;
        }

        sqlx::query("DELETE FROM pending_contact_requests WHERE id = $1")
            .bind(request.id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_pair(&self, a: Snowflake, b: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            DELETE FROM approved_contacts
            WHERE (child_id = $1 AND contact_id = $2) OR (child_id = $2 AND contact_id = $1)
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_request(&self, id: Snowflake) -> RepoResult<Option<PendingContactRequest>> {
        let result = sqlx::query_as::<_, ContactRequestModel>(
            r"
            SELECT id, child_id, contact_id, requested_by, created_at
            FROM pending_contact_requests
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PendingContactRequest::from))
    }

    #[instrument(skip(self))]
    async fn find_request_between(
        &self,
        a: Snowflake,
        b: Snowflake,
    ) -> RepoResult<Option<PendingContactRequest>> {
        let result = sqlx::query_as::<_, ContactRequestModel>(
            r"
            SELECT id, child_id, contact_id, requested_by, created_at
            FROM pending_contact_requests
            WHERE (child_id = $1 AND contact_id = $2) OR (child_id = $2 AND contact_id = $1)
            LIMIT 1
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(PendingContactRequest::from))
    }

    #[instrument(skip(self))]
    async fn find_requests_for(
        &self,
        contact_ids: &[Snowflake],
    ) -> RepoResult<Vec<PendingContactRequest>> {
        if contact_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, ContactRequestModel>(
            r"
            SELECT id, child_id, contact_id, requested_by, created_at
            FROM pending_contact_requests
            WHERE contact_id = ANY($1)
            ORDER BY id
            ",
        )
        .bind(raw_ids(contact_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(PendingContactRequest::from).collect())
    }

    #[instrument(skip(self, request), fields(request_id = %request.id))]
    async fn create_request(&self, request: &PendingContactRequest) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO pending_contact_requests (id, child_id, contact_id, requested_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(request.id.into_inner())
        .bind(request.child_id.into_inner())
        .bind(request.contact_id.into_inner())
        .bind(request.requested_by.into_inner())
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::RequestExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_request(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM pending_contact_requests WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

//! Supervision service
//!
//! Parent-side management of parent/child links and surveillance levels.

use safechat_core::entities::{ParentChildLink, SurveillanceLevel, User};
use safechat_core::{DomainError, Snowflake};
use tracing::{info, instrument, warn};

use crate::dto::{ChildResponse, UpdateSurveillanceRequest};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Supervision service
pub struct SupervisionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> SupervisionService<'a> {
    /// Create a new SupervisionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Load an account or fail with 404
    pub async fn require_user(&self, user_id: Snowflake) -> ServiceResult<User> {
        Ok(self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound(user_id))?)
    }

    /// Load an account that must be a parent
    pub async fn require_parent(&self, user_id: Snowflake) -> ServiceResult<User> {
        let user = self.require_user(user_id).await?;
        if user.is_child() {
            return Err(DomainError::ParentOnly.into());
        }
        Ok(user)
    }

    /// The caller's link to `child_id`, or 403
    pub async fn require_link(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
    ) -> ServiceResult<ParentChildLink> {
        Ok(self
            .ctx
            .link_repo()
            .find(parent_id, child_id)
            .await?
            .ok_or(DomainError::NotSupervisingParent(child_id))?)
    }

    /// Children the parent supervises, oldest link first
    #[instrument(skip(self))]
    pub async fn list_children(&self, parent_id: Snowflake) -> ServiceResult<Vec<ChildResponse>> {
        self.require_parent(parent_id).await?;
        let links = self.ctx.link_repo().find_by_parent(parent_id).await?;

        let mut children = Vec::with_capacity(links.len());
        for link in links {
            match self.ctx.user_repo().find_by_id(link.child_id).await? {
                Some(child) => children.push(ChildResponse::new(&link, &child)),
                None => warn!(child_id = %link.child_id, "Linked child account missing"),
            }
        }

        Ok(children)
    }

    /// Change the level for one child. Only `strict`, `medium` and `mild`
    /// are accepted.
    #[instrument(skip(self, request))]
    pub async fn set_surveillance_level(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
        request: UpdateSurveillanceRequest,
    ) -> ServiceResult<ChildResponse> {
        let level: SurveillanceLevel = request.level.parse()?;

        let mut link = self
            .ctx
            .link_repo()
            .find(parent_id, child_id)
            .await?
            .ok_or(DomainError::LinkNotFound {
                parent_id,
                child_id,
            })?;

        if !self
            .ctx
            .link_repo()
            .update_level(parent_id, child_id, level)
            .await?
        {
            return Err(DomainError::LinkNotFound {
                parent_id,
                child_id,
            }
            .into());
        }
        link.surveillance_level = level;

        let child = self.require_user(child_id).await?;
        info!(parent_id = %parent_id, child_id = %child_id, level = %level, "Surveillance level changed");

        Ok(ChildResponse::new(&link, &child))
    }

    /// Sever supervision. The child account stays.
    #[instrument(skip(self))]
    pub async fn unlink(&self, parent_id: Snowflake, child_id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.link_repo().delete(parent_id, child_id).await? {
            return Err(DomainError::LinkNotFound {
                parent_id,
                child_id,
            }
            .into());
        }

        info!(parent_id = %parent_id, child_id = %child_id, "Child unlinked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use safechat_core::traits::{LinkRepository, UserRepository};

    fn level(value: &str) -> UpdateSurveillanceRequest {
        UpdateSurveillanceRequest {
            level: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_set_level_parses_strictly() {
        let h = Harness::new();
        let parent = h.parent("Pat").await;
        let child = h.child("kid").await;
        h.link(parent, child, SurveillanceLevel::Medium).await;
        let service = SupervisionService::new(&h.ctx);

        let updated = service
            .set_surveillance_level(parent, child, level("strict"))
            .await
            .unwrap();
        assert_eq!(updated.surveillance_level, SurveillanceLevel::Strict);

        for bad in ["STRICT", "high", " mild", ""] {
            let err = service
                .set_surveillance_level(parent, child, level(bad))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 400, "{bad:?} accepted");
        }

        let stored = h.store.find(parent, child).await.unwrap().unwrap();
        assert_eq!(stored.surveillance_level, SurveillanceLevel::Strict);
    }

    #[tokio::test]
    async fn test_set_level_requires_link() {
        let h = Harness::new();
        let parent = h.parent("Pat").await;
        let child = h.child("kid").await;

        let err = SupervisionService::new(&h.ctx)
            .set_surveillance_level(parent, child, level("mild"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_unlink_keeps_child_account() {
        let h = Harness::new();
        let parent = h.parent("Pat").await;
        let child = h.child("kid").await;
        h.link(parent, child, SurveillanceLevel::Strict).await;
        let service = SupervisionService::new(&h.ctx);

        assert_eq!(service.list_children(parent).await.unwrap().len(), 1);
        service.unlink(parent, child).await.unwrap();

        assert!(service.list_children(parent).await.unwrap().is_empty());
        assert!(h.store.find_by_id(child).await.unwrap().is_some());
        assert_eq!(service.unlink(parent, child).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_children_cannot_list_children() {
        let h = Harness::new();
        let child = h.child("kid").await;

        let err = SupervisionService::new(&h.ctx).list_children(child).await.unwrap_err();
        assert_eq!(err.error_code(), "PARENT_ONLY");
    }
}

//! Contact service
//!
//! Child-to-child contact requests between parents, and the approved
//! contact list the contact gate reads from.
//!
//! Accepting a request must leave both approval directions in place. The
//! store writes them in one transaction; afterwards both directions are
//! read back, a missing one is written once more, and a pair that is still
//! half-approved is reported as [`ServiceError::Integrity`].

use safechat_core::entities::{ApprovedContact, PendingContactRequest};
use safechat_core::{DomainError, Snowflake};
use tracing::{error, info, instrument, warn};

use crate::dto::{ContactRequestResponse, ContactResponse, CreateContactRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::supervision::SupervisionService;

/// Contact service
pub struct ContactService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContactService<'a> {
    /// Create a new ContactService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Ask for the caller's child to be connected with another child
    #[instrument(skip(self, request))]
    pub async fn request_contact(
        &self,
        parent_id: Snowflake,
        request: CreateContactRequest,
    ) -> ServiceResult<ContactRequestResponse> {
        let CreateContactRequest {
            child_id,
            contact_id,
        } = request;

        let supervision = SupervisionService::new(self.ctx);
        supervision.require_link(parent_id, child_id).await?;

        if child_id == contact_id {
            return Err(ServiceError::validation("A child cannot be their own contact"));
        }

        let contact = supervision.require_user(contact_id).await?;
        if !contact.is_child() {
            return Err(DomainError::NotAChild(contact_id).into());
        }

        if self.ctx.contact_repo().is_approved(child_id, contact_id).await? {
            return Err(DomainError::AlreadyApproved.into());
        }
        if self
            .ctx
            .contact_repo()
            .find_request_between(child_id, contact_id)
            .await?
            .is_some()
        {
            return Err(DomainError::RequestExists.into());
        }

        let pending =
            PendingContactRequest::new(self.ctx.generate_id(), child_id, contact_id, parent_id);
        self.ctx.contact_repo().create_request(&pending).await?;

        info!(request_id = %pending.id, child_id = %child_id, contact_id = %contact_id, "Contact requested");
        Ok(ContactRequestResponse::from(&pending))
    }

    /// Pending requests asking for one of the caller's children
    #[instrument(skip(self))]
    pub async fn list_incoming_requests(
        &self,
        parent_id: Snowflake,
    ) -> ServiceResult<Vec<ContactRequestResponse>> {
        let children: Vec<Snowflake> = self
            .ctx
            .link_repo()
            .find_by_parent(parent_id)
            .await?
            .into_iter()
            .map(|link| link.child_id)
            .collect();

        if children.is_empty() {
            return Ok(Vec::new());
        }

        let requests = self.ctx.contact_repo().find_requests_for(&children).await?;
        Ok(requests.iter().map(ContactRequestResponse::from).collect())
    }

    /// Accept a request for the caller's child, approving both directions
    #[instrument(skip(self))]
    pub async fn accept_request(
        &self,
        parent_id: Snowflake,
        request_id: Snowflake,
    ) -> ServiceResult<[ContactResponse; 2]> {
        let request = self.load_request(request_id).await?;
        SupervisionService::new(self.ctx)
            .require_link(parent_id, request.contact_id)
            .await?;

        let approvals = request.approvals(parent_id);
        self.ctx
            .contact_repo()
            .approve_request(&request, &approvals)
            .await?;

        self.verify_both_directions(&approvals).await?;

        info!(
            request_id = %request_id,
            child_id = %request.child_id,
            contact_id = %request.contact_id,
            "Contact request accepted"
        );
        Ok(approvals.each_ref().map(ContactResponse::from))
    }

    /// Decline a request. Either side's parent may do so.
    #[instrument(skip(self))]
    pub async fn decline_request(
        &self,
        parent_id: Snowflake,
        request_id: Snowflake,
    ) -> ServiceResult<()> {
        let request = self.load_request(request_id).await?;
        let links = self
            .ctx
            .link_repo()
            .find_for_parent_among(parent_id, &[request.child_id, request.contact_id])
            .await?;
        if links.is_empty() {
            return Err(DomainError::NotSupervisingParent(request.contact_id).into());
        }

        if !self.ctx.contact_repo().delete_request(request_id).await? {
            return Err(DomainError::ContactRequestNotFound(request_id).into());
        }

        info!(request_id = %request_id, parent_id = %parent_id, "Contact request declined");
        Ok(())
    }

    /// Remove both approval directions between the caller's child and a contact
    #[instrument(skip(self))]
    pub async fn revoke_contact(
        &self,
        parent_id: Snowflake,
        child_id: Snowflake,
        contact_id: Snowflake,
    ) -> ServiceResult<()> {
        SupervisionService::new(self.ctx)
            .require_link(parent_id, child_id)
            .await?;

        let removed = self.ctx.contact_repo().delete_pair(child_id, contact_id).await?;
        if removed == 0 {
            return Err(ServiceError::not_found("Contact", contact_id.to_string()));
        }

        info!(child_id = %child_id, contact_id = %contact_id, removed, "Contact revoked");
        Ok(())
    }

    /// Approved contacts of a child, for the child or a supervising parent
    #[instrument(skip(self))]
    pub async fn list_contacts(
        &self,
        viewer: Snowflake,
        child_id: Snowflake,
    ) -> ServiceResult<Vec<ContactResponse>> {
        if viewer != child_id {
            SupervisionService::new(self.ctx)
                .require_link(viewer, child_id)
                .await?;
        }

        let contacts = self.ctx.contact_repo().find_approved(child_id).await?;
        Ok(contacts.iter().map(ContactResponse::from).collect())
    }

    async fn load_request(&self, request_id: Snowflake) -> ServiceResult<PendingContactRequest> {
        Ok(self
            .ctx
            .contact_repo()
            .find_request(request_id)
            .await?
            .ok_or(DomainError::ContactRequestNotFound(request_id))?)
    }

    async fn verify_both_directions(&self, approvals: &[ApprovedContact; 2]) -> ServiceResult<()> {
        for approval in approvals {
            if self.direction_present(approval).await? {
                continue;
            }

            warn!(
                child_id = %approval.child_id,
                contact_id = %approval.contact_id,
                "Approval direction missing after accept, re-inserting"
            );
            self.ctx.contact_repo().insert_approval(approval).await?;

            if !self.direction_present(approval).await? {
                error!(
                    child_id = %approval.child_id,
                    contact_id = %approval.contact_id,
                    "Approval direction still missing after repair"
                );
                return Err(ServiceError::Integrity(format!(
                    "approval {} -> {} missing",
                    approval.child_id, approval.contact_id
                )));
            }
        }
        Ok(())
    }

    async fn direction_present(&self, approval: &ApprovedContact) -> ServiceResult<bool> {
        Ok(self
            .ctx
            .contact_repo()
            .is_approved(approval.child_id, approval.contact_id)
            .await?)
    }
}

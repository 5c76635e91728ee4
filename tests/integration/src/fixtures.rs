//! Test fixtures and data generators
//!
//! Accounts and relationships are provisioned outside the API, so they are
//! seeded straight into the server's store.

use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::Result;
use safechat_core::entities::{ApprovedContact, ParentChildLink, User};
use safechat_core::traits::{ContactRepository, LinkRepository, UserRepository};
use safechat_core::{Snowflake, SurveillanceLevel};
use serde::Deserialize;

use crate::helpers::TestServer;

/// Counter for unique account ids, well clear of the system accounts
static COUNTER: AtomicI64 = AtomicI64::new(10_000);

pub fn unique_id() -> Snowflake {
    Snowflake::new(COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// A seeded account and a token for it
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Snowflake,
    pub token: String,
}

impl TestServer {
    pub async fn seed_parent(&self, first_name: &str) -> Result<Account> {
        let id = unique_id();
        let user = User::new_parent(id, first_name.into(), "Tester".into());
        UserRepository::create(self.store.as_ref(), &user).await?;
        Ok(Account {
            id,
            token: self.token_for(id)?,
        })
    }

    pub async fn seed_child(&self, username: &str) -> Result<Account> {
        let id = unique_id();
        let user = User::new_child(id, format!("{username}{id}"), username.into(), "Kid".into());
        UserRepository::create(self.store.as_ref(), &user).await?;
        Ok(Account {
            id,
            token: self.token_for(id)?,
        })
    }

    pub async fn seed_link(
        &self,
        parent: &Account,
        child: &Account,
        level: SurveillanceLevel,
    ) -> Result<()> {
        LinkRepository::create(
            self.store.as_ref(),
            &ParentChildLink::new(parent.id, child.id, level),
        )
        .await?;
        Ok(())
    }

    /// Approve a pair of children for each other
    pub async fn seed_approval(
        &self,
        a: &Account,
        b: &Account,
        approved_by: &Account,
    ) -> Result<()> {
        for (child, contact) in [(a.id, b.id), (b.id, a.id)] {
            self.store
                .insert_approval(&ApprovedContact::new(child, contact, approved_by.id))
                .await?;
        }
        Ok(())
    }

    /// A parent with one linked child
    pub async fn seed_family(
        &self,
        parent_name: &str,
        child_name: &str,
        level: SurveillanceLevel,
    ) -> Result<(Account, Account)> {
        let parent = self.seed_parent(parent_name).await?;
        let child = self.seed_child(child_name).await?;
        self.seed_link(&parent, &child, level).await?;
        Ok((parent, child))
    }
}

// ============================================================================
// Response views
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorView,
}

#[derive(Debug, Deserialize)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// The deny reason code carried by a 403
    pub fn reason(&self) -> Option<&str> {
        self.error.details.as_ref()?.get("reason")?.as_str()
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatView {
    pub id: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AccessView {
    pub chat_id: String,
    pub allowed: bool,
    pub basis: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FlaggedView {
    pub has_flagged_messages: bool,
}

#[derive(Debug, Deserialize)]
pub struct FlagView {
    pub id: String,
    pub flagged_by: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub content: Option<String>,
    pub flagged: bool,
    pub flags: Vec<FlagView>,
}

#[derive(Debug, Deserialize)]
pub struct PageView<T> {
    pub data: Vec<T>,
    pub pagination: PaginationView,
}

#[derive(Debug, Deserialize)]
pub struct PaginationView {
    pub has_more: bool,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct ClearedView {
    pub cleared: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChildView {
    pub child: serde_json::Value,
    pub surveillance_level: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactRequestView {
    pub id: String,
    pub child_id: String,
    pub contact_id: String,
    pub requested_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ContactView {
    pub child_id: String,
    pub contact_id: String,
    pub approved_by: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanAcceptedView {
    pub message_id: String,
    pub branch: String,
}

//! In-process entity store
//!
//! Implements every repository trait over a single `RwLock`, so multi-row
//! writes such as approving a contact request are atomic. Used when no
//! `DATABASE_URL` is configured and by tests, which can also inject faults
//! to exercise failure paths.

mod repositories;

use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::RwLock;

use safechat_core::entities::{
    ApprovedContact, Chat, Flag, Message, ParentChildLink, PendingContactRequest, User,
};
use safechat_core::error::DomainError;
use safechat_core::value_objects::Snowflake;

/// Failure modes a test can switch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFault {
    /// Every user read or write errors
    Users,
    /// Every link read or write errors
    Links,
    Chats,
    Messages,
    /// Every flag read or write errors
    Flags,
    /// Every contact or request read or write errors
    Contacts,
    /// `approve_request` commits only the first direction
    HalfApproval,
    /// Single-row `insert_approval` reports success but writes nothing
    LoseApprovalWrites,
}

impl StoreFault {
    fn table(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Links => "parent_child_links",
            Self::Chats => "chats",
            Self::Messages => "messages",
            Self::Flags => "flags",
            Self::Contacts | Self::HalfApproval | Self::LoseApprovalWrites => "approved_contacts",
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub users: HashMap<Snowflake, User>,
    pub links: BTreeMap<(Snowflake, Snowflake), ParentChildLink>,
    pub chats: BTreeMap<Snowflake, Chat>,
    /// Keyed by id, so iteration order is creation order
    pub messages: BTreeMap<Snowflake, Message>,
    pub flags: BTreeMap<Snowflake, Flag>,
    pub approvals: BTreeMap<(Snowflake, Snowflake), ApprovedContact>,
    pub requests: BTreeMap<Snowflake, PendingContactRequest>,
}

/// Thread-safe in-memory implementation of all repositories
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    faults: RwLock<HashSet<StoreFault>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject_fault(&self, fault: StoreFault) {
        self.faults.write().insert(fault);
    }

    pub fn clear_fault(&self, fault: StoreFault) {
        self.faults.write().remove(&fault);
    }

    pub fn clear_faults(&self) {
        self.faults.write().clear();
    }

    pub(crate) fn has_fault(&self, fault: StoreFault) -> bool {
        self.faults.read().contains(&fault)
    }

    /// Error out if `fault` is active
    pub(crate) fn check(&self, fault: StoreFault) -> Result<(), DomainError> {
        if self.has_fault(fault) {
            return Err(DomainError::DatabaseError(format!(
                "injected fault on {}",
                fault.table()
            )));
        }
        Ok(())
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> R {
        f(&self.tables.read())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.tables.write())
    }

    /// Total flags stored, for assertions
    pub fn flag_count(&self) -> usize {
        self.read(|t| t.flags.len())
    }

    /// Total messages stored, for assertions
    pub fn message_count(&self) -> usize {
        self.read(|t| t.messages.len())
    }
}

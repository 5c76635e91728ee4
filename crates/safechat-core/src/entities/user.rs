//! User entity - a parent or child account

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Whether an account is a parent or a supervised child.
///
/// Stored rows only carry a nullable `username`; the store adapter resolves
/// it into this variant once, so nothing downstream inspects the raw column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountKind {
    Parent,
    Child { username: String },
}

impl AccountKind {
    /// Resolve from the stored username column. Empty or whitespace-only
    /// usernames count as absent.
    pub fn from_username(username: Option<&str>) -> Self {
        match username.map(str::trim) {
            Some(name) if !name.is_empty() => Self::Child {
                username: name.to_string(),
            },
            _ => Self::Parent,
        }
    }

    /// Inverse of [`AccountKind::from_username`]
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Parent => None,
            Self::Child { username } => Some(username),
        }
    }

    #[inline]
    pub fn is_child(&self) -> bool {
        matches!(self, Self::Child { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child { .. } => "child",
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub kind: AccountKind,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new_parent(id: Snowflake, first_name: String, last_name: String) -> Self {
        Self {
            id,
            kind: AccountKind::Parent,
            first_name,
            last_name,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    pub fn new_child(
        id: Snowflake,
        username: String,
        first_name: String,
        last_name: String,
    ) -> Self {
        Self {
            id,
            kind: AccountKind::Child { username },
            first_name,
            last_name,
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_child(&self) -> bool {
        self.kind.is_child()
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.kind.username().unwrap_or_default().to_string()
        } else {
            full.to_string()
        }
    }
}

//! Chat access decision rules
//!
//! The rules are evaluated in order and the first match wins:
//!
//! 1. A direct participant is always allowed.
//! 2. A supervising parent with a `strict` link is allowed.
//! 3. A supervising parent with a `medium` link is allowed only while some
//!    message in the chat carries a flag.
//! 4. A supervising parent with a `mild` link is denied.
//! 5. Anybody else is denied.
//!
//! This module holds the decision logic only. The caller performs the store
//! lookups lazily: links are read only for non-participants, and the flag
//! predicate only when [`evaluate`] answers [`AccessStep::NeedsFlagCheck`].
//! A lookup that fails must become [`DenyReason::Unavailable`]; access is
//! never granted on an error.

use std::fmt;

use serde::Serialize;

use crate::entities::{Chat, SurveillanceLevel};
use crate::value_objects::Snowflake;

/// Why access was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessBasis {
    Participant,
    StrictSupervision,
    FlaggedContent,
}

/// Why access was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DenyReason {
    /// Child tried to open a chat with a contact their parent has not approved
    PendingApproval,
    /// Parent's link is `mild`
    MildBlocked,
    /// Parent's link is `medium` and nothing in the chat is flagged
    MediumNoFlags,
    /// Viewer is neither a participant nor a supervising parent
    NoRelationship,
    /// A lookup failed; fail closed
    Unavailable,
}

impl DenyReason {
    pub const fn code(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending-approval",
            Self::MildBlocked => "mild-blocked",
            Self::MediumNoFlags => "medium-no-flags",
            Self::NoRelationship => "no-relationship",
            Self::Unavailable => "unavailable",
        }
    }

    /// Explanation shown to the person who was refused.
    /// `Unavailable` deliberately says nothing about the cause.
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::PendingApproval => {
                "This contact is waiting for a parent's approval. You can chat once it is approved."
            }
            Self::MildBlocked => {
                "Your surveillance level for this child is mild, so their chats stay private. \
                 You will be notified if something concerning is flagged."
            }
            Self::MediumNoFlags => {
                "Your surveillance level for this child is medium. This chat becomes visible \
                 only when one of its messages has been flagged."
            }
            Self::NoRelationship => "You do not have access to this chat.",
            Self::Unavailable => "This chat cannot be opened right now. Please try again later.",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Final outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow { basis: AccessBasis },
    Deny(DenyReason),
}

impl AccessDecision {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Allow { .. } => None,
            Self::Deny(reason) => Some(*reason),
        }
    }
}

/// Result of evaluating the rules before the flag predicate is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStep {
    Decided(AccessDecision),
    /// Rule 3 applies; call [`resolve_flag_check`] with the live predicate
    NeedsFlagCheck,
}

/// Evaluate rules 1, 2, 4 and 5.
///
/// `strongest_level` is the strongest surveillance level among the viewer's
/// own links to either participant, or `None` when the viewer supervises
/// neither. It is ignored for participants.
pub fn evaluate(
    viewer: Snowflake,
    chat: &Chat,
    strongest_level: Option<SurveillanceLevel>,
) -> AccessStep {
    if chat.has_participant(viewer) {
        return AccessStep::Decided(AccessDecision::Allow {
            basis: AccessBasis::Participant,
        });
    }

    match strongest_level {
        Some(SurveillanceLevel::Strict) => AccessStep::Decided(AccessDecision::Allow {
            basis: AccessBasis::StrictSupervision,
        }),
        Some(SurveillanceLevel::Medium) => AccessStep::NeedsFlagCheck,
        Some(SurveillanceLevel::Mild) => {
            AccessStep::Decided(AccessDecision::Deny(DenyReason::MildBlocked))
        }
        None => AccessStep::Decided(AccessDecision::Deny(DenyReason::NoRelationship)),
    }
}

/// Finish rule 3 once the "any message in this chat is flagged" predicate
/// has been read.
pub fn resolve_flag_check(has_flags: bool) -> AccessDecision {
    if has_flags {
        AccessDecision::Allow {
            basis: AccessBasis::FlaggedContent,
        }
    } else {
        AccessDecision::Deny(DenyReason::MediumNoFlags)
    }
}

/// Evaluate with the flag predicate already known. Convenience for callers
/// that have computed everything eagerly.
pub fn decide(
    viewer: Snowflake,
    chat: &Chat,
    strongest_level: Option<SurveillanceLevel>,
    has_flags: bool,
) -> AccessDecision {
    match evaluate(viewer, chat, strongest_level) {
        AccessStep::Decided(decision) => decision,
        AccessStep::NeedsFlagCheck => resolve_flag_check(has_flags),
    }
}

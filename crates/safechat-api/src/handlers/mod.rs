//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod chats;
pub mod contacts;
pub mod health;
pub mod messages;
pub mod moderation;
pub mod supervision;

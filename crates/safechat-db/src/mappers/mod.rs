//! Entity to model mappers
//!
//! Conversions between domain entities (safechat-core) and database models.
//! - `From<Model> for Entity` (or `TryFrom` where a column must be validated)
//! - `*Insert` structs: flatten entity data for binding

mod chat;
mod contact;
mod flag;
mod link;
mod message;
mod user;

pub use message::MessageInsert;
pub use user::UserInsert;

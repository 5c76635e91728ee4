//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in safechat-core.

mod chat;
mod contact;
mod error;
mod flag;
mod link;
mod message;
mod user;

pub use chat::PgChatRepository;
pub use contact::PgContactRepository;
pub use flag::PgFlagRepository;
pub use link::PgLinkRepository;
pub use message::PgMessageRepository;
pub use user::PgUserRepository;

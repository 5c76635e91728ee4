//! Database models - SQLx-compatible structs for PostgreSQL tables

mod chat;
mod contact;
mod flag;
mod link;
mod message;
mod user;

pub use chat::ChatModel;
pub use contact::{ApprovedContactModel, ContactRequestModel};
pub use flag::FlagModel;
pub use link::LinkModel;
pub use message::MessageModel;
pub use user::UserModel;

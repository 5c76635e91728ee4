//! Domain entities - core business objects

mod chat;
mod contact;
mod flag;
mod link;
mod message;
mod user;

pub use chat::Chat;
pub use contact::{ApprovedContact, PendingContactRequest};
pub use flag::Flag;
pub use link::{ParentChildLink, SurveillanceLevel};
pub use message::{Attachment, Message, MAX_MESSAGE_LENGTH};
pub use user::{AccountKind, User};

//! Repository traits (ports)

mod repositories;

pub use repositories::{
    ChatRepository, ContactRepository, FlagRepository, LinkRepository, MessageQuery,
    MessageRepository, RepoResult, UserRepository,
};

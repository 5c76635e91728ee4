//! Access policy - who may read a chat

pub mod access;

pub use access::{decide, evaluate, resolve_flag_check, AccessBasis, AccessDecision, AccessStep, DenyReason};

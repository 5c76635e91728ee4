//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! business logic, validation, and orchestration of domain operations.

pub mod access;
pub mod chat;
pub mod contact;
pub mod context;
pub mod error;
pub mod flag;
pub mod message;
pub mod scan;
pub mod supervision;

// Re-export all services for convenience
pub use access::AccessService;
pub use chat::ChatService;
pub use contact::ContactService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use flag::FlagService;
pub use message::MessageService;
pub use scan::ScanService;
pub use supervision::SupervisionService;

//! # safechat-service
//!
//! Application layer: the access decision engine, the contact approval
//! gate, the flag ledger, the moderation pipeline and the chat use cases,
//! plus the DTOs the API serializes.

pub mod dto;
pub mod moderation;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use moderation::{
    DisabledImageScanner, HttpImageScanner, ImageScanner, ModerationDispatch, ModerationJob,
    ModerationPipeline, ModerationQueue, ModerationWorker,
};
pub use services::{
    AccessService, ChatService, ContactService, FlagService, MessageService, ScanService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, SupervisionService,
};

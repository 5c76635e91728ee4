//! Moderation pipeline
//!
//! The send path builds [`ModerationJob`]s and hands them to a
//! [`ModerationDispatch`] without awaiting anything. A [`ModerationWorker`]
//! drains the queue and runs each job through the [`ModerationPipeline`].
//! Failures are logged and dropped; nothing is retried.

mod job;
mod pipeline;
mod queue;
mod scanner;
mod worker;

pub use job::{JobKind, ModerationJob};
pub use pipeline::{ModerationError, ModerationPipeline, ScanOutcome};
pub use queue::{ModerationDispatch, ModerationQueue};
pub use scanner::{
    scanner_from_config, DisabledImageScanner, HttpImageScanner, ImageScanRequest, ImageScanner,
    ImageVerdict, ScanError,
};
pub use worker::ModerationWorker;

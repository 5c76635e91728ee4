//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, and pagination.

mod auth;
mod internal;
mod pagination;
mod path;
mod validated;

pub use auth::AuthUser;
pub use internal::{InternalCaller, INTERNAL_KEY_HEADER};
pub use pagination::{Pagination, PaginationParams};
pub use path::parse_id;
pub use validated::{OptionalValidatedJson, ValidatedJson};

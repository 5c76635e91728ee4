//! Value objects - immutable types that represent domain concepts

mod snowflake;
mod system_accounts;

pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use system_accounts::SystemAccounts;

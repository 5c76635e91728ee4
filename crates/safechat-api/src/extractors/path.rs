//! Path parameter parsing
//!
//! Snowflake IDs arrive as strings in the path.

use safechat_core::Snowflake;

use crate::response::ApiError;

/// Parse one path segment as a Snowflake, naming the parameter on failure
pub fn parse_id(raw: &str, name: &str) -> Result<Snowflake, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::invalid_path(format!("Invalid {name} format")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "chat_id").unwrap(), Snowflake::new(42));

        let err = parse_id("abc", "chat_id").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PATH_PARAMETER");
        assert!(err.to_string().contains("chat_id"));
    }
}

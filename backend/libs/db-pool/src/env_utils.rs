//! Environment variable parsing utilities
//!
//! Missing or unparsable values fall back to the supplied default so callers never
//! need to unwrap.

use std::str::FromStr;

/// Parse an environment variable with a default fallback
///
/// # Example
/// ```ignore
/// let port: u16 = parse_env_with_default("SERVER_PORT", 8080);
/// ```
pub fn parse_env_with_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no`, `on/off`.
pub fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_parse_env_with_default_fallback() {
        std::env::remove_var("DB_POOL_TEST_NUMBER");
        assert_eq!(parse_env_with_default("DB_POOL_TEST_NUMBER", 7u32), 7);

        std::env::set_var("DB_POOL_TEST_NUMBER", "not-a-number");
        assert_eq!(parse_env_with_default("DB_POOL_TEST_NUMBER", 7u32), 7);

        std::env::set_var("DB_POOL_TEST_NUMBER", " 42 ");
        assert_eq!(parse_env_with_default("DB_POOL_TEST_NUMBER", 7u32), 42);

        std::env::remove_var("DB_POOL_TEST_NUMBER");
    }

    #[test]
    #[serial_test::serial]
    fn test_parse_env_bool_variants() {
        for (raw, expected) in [("true", true), ("0", false), ("YES", true), ("off", false)] {
            std::env::set_var("DB_POOL_TEST_FLAG", raw);
            assert_eq!(parse_env_bool("DB_POOL_TEST_FLAG", !expected), expected);
        }

        std::env::set_var("DB_POOL_TEST_FLAG", "maybe");
        assert!(parse_env_bool("DB_POOL_TEST_FLAG", true));

        std::env::remove_var("DB_POOL_TEST_FLAG");
    }
}

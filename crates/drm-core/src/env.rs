//! Environment variable utilities
//!
//! Typed `env_get<T>` helpers used for runtime configuration, e.g. the
//! buffer-manager backend override (`SLP_BUFMGR_MODULE`) or log settings.

use std::str::FromStr;

/// Get an environment variable parsed as `T`, or the default.
///
/// Any type implementing `FromStr` works; parse failures fall back to
/// the default.
#[inline]
pub fn env_get<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Get an environment variable as a boolean.
///
/// Accepts "1", "true", "yes", "on" (case-insensitive) as true. Unset
/// returns the default; anything else is false.
#[inline]
pub fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

/// `Some(T)` if the variable is set and parses, `None` otherwise.
#[inline]
pub fn env_get_opt<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// String value with a default; no `FromStr` bound needed.
#[inline]
pub fn env_get_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Whether the variable is set at all, regardless of value.
#[inline]
pub fn env_is_set(key: &str) -> bool {
    std::env::var(key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_get_default() {
        let val: usize = env_get("__SLPDRM_TEST_UNSET__", 42);
        assert_eq!(val, 42);
    }

    #[test]
    fn test_env_get_opt_none() {
        let val: Option<usize> = env_get_opt("__SLPDRM_TEST_UNSET__");
        assert!(val.is_none());
    }

    #[test]
    fn test_env_get_str_default() {
        let val = env_get_str("__SLPDRM_TEST_UNSET__", "exynos");
        assert_eq!(val, "exynos");
    }

    #[test]
    fn test_env_get_with_set_var() {
        std::env::set_var("__SLPDRM_TEST_NUM__", "123");
        let val: usize = env_get("__SLPDRM_TEST_NUM__", 0);
        assert_eq!(val, 123);
        std::env::remove_var("__SLPDRM_TEST_NUM__");
    }

    #[test]
    fn test_env_get_bool_variants() {
        std::env::set_var("__SLPDRM_TEST_BOOL__", "yes");
        assert!(env_get_bool("__SLPDRM_TEST_BOOL__", false));

        std::env::set_var("__SLPDRM_TEST_BOOL__", "0");
        assert!(!env_get_bool("__SLPDRM_TEST_BOOL__", true));

        std::env::remove_var("__SLPDRM_TEST_BOOL__");
        assert!(env_get_bool("__SLPDRM_TEST_BOOL__", true));
        assert!(!env_is_set("__SLPDRM_TEST_BOOL__"));
    }

    #[test]
    fn test_env_get_invalid_parse() {
        std::env::set_var("__SLPDRM_TEST_BAD__", "not_a_number");
        let val: usize = env_get("__SLPDRM_TEST_BAD__", 99);
        assert_eq!(val, 99);
        std::env::remove_var("__SLPDRM_TEST_BAD__");
    }
}

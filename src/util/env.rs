//! Environment helpers: dotenv loading and ergonomic getters.
use std::sync::Once;

static INIT: Once = Once::new();

/// Load `.env` exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        let _ = dotenv::dotenv();
    });
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_unset() {
        std::env::set_var("RATINGS_EXPORT_TEST_BLANK", "   ");
        assert_eq!(env_opt("RATINGS_EXPORT_TEST_BLANK"), None);
        std::env::set_var("RATINGS_EXPORT_TEST_BLANK", "staging");
        assert_eq!(
            env_opt("RATINGS_EXPORT_TEST_BLANK").as_deref(),
            Some("staging")
        );
        std::env::remove_var("RATINGS_EXPORT_TEST_BLANK");
    }

    #[test]
    fn missing_values_are_none() {
        assert_eq!(env_opt("RATINGS_EXPORT_TEST_DEFINITELY_UNSET"), None);
    }
}

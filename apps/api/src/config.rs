use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::retry::RetryPolicy;

const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

/// Application configuration loaded from environment variables.
/// Startup fails if the upstream API key is missing or a numeric value is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Everything needed to construct the upstream chat-completion client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let api_key = first_env(&["LLM_API_KEY", "DEEPSEEK_API_KEY"])?;

        let max_retries: u32 = parse_env("LLM_MAX_RETRIES", 1)?;
        let retry_base_ms: u64 = parse_env("LLM_RETRY_BASE_MS", 500)?;

        Ok(Config {
            llm: LlmConfig {
                api_key,
                base_url: std::env::var("LLM_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
                model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
                timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 60)?),
                retry: RetryPolicy::new(max_retries, Duration::from_millis(retry_base_ms)),
            },
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Value of the first variable in `keys` that is set and non-blank.
fn first_env(keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.trim().is_empty()))
        .with_context(|| {
            format!(
                "Required environment variable is not set (tried {})",
                keys.join(", ")
            )
        })
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("CAREER_API_TEST_SURELY_UNSET_VAR", 8000).unwrap();
        assert_eq!(value, 8000);
    }

    #[test]
    fn test_missing_key_error_names_every_candidate() {
        let err = first_env(&["CAREER_API_TEST_UNSET_KEY_A", "CAREER_API_TEST_UNSET_KEY_B"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("CAREER_API_TEST_UNSET_KEY_A"));
        assert!(err.contains("CAREER_API_TEST_UNSET_KEY_B"));
    }

    #[test]
    fn test_first_env_falls_through_to_later_keys() {
        std::env::set_var("CAREER_API_TEST_SECOND_KEY", "sk-second");
        let value = first_env(&["CAREER_API_TEST_FIRST_KEY_UNSET", "CAREER_API_TEST_SECOND_KEY"]);
        assert_eq!(value.unwrap(), "sk-second");
        std::env::remove_var("CAREER_API_TEST_SECOND_KEY");
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CAREER_API_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("CAREER_API_TEST_BAD_PORT", 8000);
        assert!(result.is_err());
        std::env::remove_var("CAREER_API_TEST_BAD_PORT");
    }

    #[test]
    fn test_parse_env_trims_whitespace() {
        std::env::set_var("CAREER_API_TEST_TIMEOUT", " 45 ");
        let value: u64 = parse_env("CAREER_API_TEST_TIMEOUT", 60).unwrap();
        assert_eq!(value, 45);
        std::env::remove_var("CAREER_API_TEST_TIMEOUT");
    }
}

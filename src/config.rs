// src/config.rs
use crate::errors::AuraError;
use crate::services::llm_service::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub redis_url: String,
    pub gateway_url: String,
    pub gateway_api_key: String,
    pub model: String,
    pub retry: RetryPolicy,
    pub auth_url: String,
    pub auth_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AuraError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuraError::Configuration(format!("{} must be set", key)))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let defaults = RetryPolicy::default();
        let max_retries = parse_or(&lookup, "AI_MAX_RETRIES", defaults.max_retries)?;
        let delay_ms = parse_or(
            &lookup,
            "AI_RETRY_DELAY_MS",
            defaults.delay.as_millis() as u64,
        )?;

        Ok(Self {
            bind_addr: or_default("BIND_ADDR", "0.0.0.0:8080"),
            redis_url: or_default("REDIS_URL", "redis://127.0.0.1:6379"),
            gateway_url: or_default("AI_GATEWAY_URL", DEFAULT_GATEWAY_URL),
            gateway_api_key: required("AI_GATEWAY_API_KEY")?,
            model: or_default("AI_MODEL", DEFAULT_MODEL),
            retry: RetryPolicy {
                max_retries,
                delay: Duration::from_millis(delay_ms),
            },
            auth_url: required("AUTH_URL")?,
            auth_api_key: required("AUTH_API_KEY")?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AuraError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AuraError::Configuration(format!("Invalid {}: {}", key, e))),
        None => Ok(default),
    }
}

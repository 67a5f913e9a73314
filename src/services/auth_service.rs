// src/services/auth_service.rs
use crate::errors::AuraError;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::Deserialize;

/// Accepts `Bearer <token>` or a bare token.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuraError> {
    let header = header.ok_or(AuraError::AuthRequired)?;
    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

    if token.is_empty() {
        return Err(AuraError::AuthRequired);
    }
    Ok(token)
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Returns the owning user id.
    async fn verify(&self, token: &str) -> Result<String, AuraError>;
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

/// Validates access tokens against the hosted auth provider's `/auth/v1/user`.
pub struct AuthService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AuthService {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl TokenVerifier for AuthService {
    async fn verify(&self, token: &str) -> Result<String, AuraError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| {
                error!("Auth provider request failed: {}", e);
                AuraError::Unauthorized
            })?;

        if !response.status().is_success() {
            error!("Auth verification failed: {}", response.status());
            return Err(AuraError::Unauthorized);
        }

        let user: AuthUser = response.json().await.map_err(|e| {
            error!("Invalid auth provider response: {}", e);
            AuraError::Unauthorized
        })?;

        Ok(user.id)
    }
}

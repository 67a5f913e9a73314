// src/services/redis_service.rs
use crate::errors::AuraError;
use crate::models::*;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};

/// Recommended looks history expires after 30 days of inactivity.
const LOOKS_TTL_SECONDS: usize = 30 * 24 * 60 * 60;

#[async_trait]
pub trait LookRepository: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<ColorProfile>, AuraError>;

    /// Items ordered by compatibility label.
    async fn fetch_wardrobe(&self, user_id: &str) -> Result<Vec<WardrobeItem>, AuraError>;

    async fn insert_recommended_looks(
        &self,
        record: &RecommendedLooksRecord,
    ) -> Result<(), AuraError>;
}

pub struct RedisService {
    conn: ConnectionManager,
}

impl RedisService {
    pub async fn new(redis_url: &str) -> Result<Self, AuraError> {
        let client = Client::open(redis_url).map_err(|e| AuraError::Redis(e.to_string()))?;
        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AuraError::Redis(e.to_string()))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AuraError::Redis(e.to_string()))?;

        Ok(Self { conn })
    }
}

pub fn sort_by_compatibility(items: &mut [WardrobeItem]) {
    items.sort_by(|a, b| a.compatibility().as_str().cmp(b.compatibility().as_str()));
}

#[async_trait]
impl LookRepository for RedisService {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<ColorProfile>, AuraError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(format!("profile:{}", user_id))
            .await
            .map_err(|e| AuraError::Redis(e.to_string()))?;

        value
            .map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(|e| AuraError::Serialization(e.to_string()))
    }

    async fn fetch_wardrobe(&self, user_id: &str) -> Result<Vec<WardrobeItem>, AuraError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(format!("wardrobe:{}", user_id))
            .await
            .map_err(|e| AuraError::Redis(e.to_string()))?;

        let Some(value) = value else {
            return Ok(Vec::new());
        };

        let mut items: Vec<WardrobeItem> =
            serde_json::from_str(&value).map_err(|e| AuraError::Serialization(e.to_string()))?;
        sort_by_compatibility(&mut items);
        Ok(items)
    }

    async fn insert_recommended_looks(
        &self,
        record: &RecommendedLooksRecord,
    ) -> Result<(), AuraError> {
        let mut conn = self.conn.clone();
        let key = format!("recommended_looks:{}", record.user_id);
        let value = serde_json::to_string(record)
            .map_err(|e| AuraError::Serialization(e.to_string()))?;

        conn.lpush::<_, _, ()>(&key, value)
            .await
            .map_err(|e| AuraError::Redis(e.to_string()))?;

        conn.expire::<_, ()>(&key, LOOKS_TTL_SECONDS)
            .await
            .map_err(|e| AuraError::Redis(e.to_string()))?;

        Ok(())
    }
}

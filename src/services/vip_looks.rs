// src/services/vip_looks.rs
use crate::errors::AuraError;
use crate::models::{LookData, RecommendedLooksRecord, SuggestedLook};
use crate::services::auth_service::{TokenVerifier, bearer_token};
use crate::services::llm_service::LLMService;
use crate::services::look_enricher::{enrich_looks, parse_looks};
use crate::services::prompt_builder::build_vip_prompt;
use crate::services::redis_service::LookRepository;
use log::{info, warn};
use std::sync::Arc;
use uuid::Uuid;

pub const MIN_WARDROBE_ITEMS: usize = 3;
pub const DEFAULT_LOOK_COUNT: u32 = 3;
pub const MAX_LOOK_COUNT: u32 = 10;
pub const VIP_OCCASION: &str = "vip";

pub struct VipLookService {
    verifier: Arc<dyn TokenVerifier>,
    repository: Arc<dyn LookRepository>,
    llm_service: Arc<LLMService>,
}

impl VipLookService {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        repository: Arc<dyn LookRepository>,
        llm_service: Arc<LLMService>,
    ) -> Self {
        Self {
            verifier,
            repository,
            llm_service,
        }
    }

    pub async fn suggest(
        &self,
        authorization: Option<&str>,
        count: Option<u32>,
    ) -> Result<Vec<SuggestedLook>, AuraError> {
        let token = bearer_token(authorization)?;
        let user_id = self.verifier.verify(token).await?;
        let count = count
            .unwrap_or(DEFAULT_LOOK_COUNT)
            .clamp(1, MAX_LOOK_COUNT);

        info!("Generating {} VIP looks for user {}", count, user_id);

        let profile = self.repository.fetch_profile(&user_id).await?;
        let wardrobe = self.repository.fetch_wardrobe(&user_id).await?;

        if wardrobe.len() < MIN_WARDROBE_ITEMS {
            return Err(AuraError::InsufficientInput {
                required: MIN_WARDROBE_ITEMS,
                found: wardrobe.len(),
            });
        }

        let prompt = build_vip_prompt(&wardrobe, profile.as_ref(), count);
        let content = self.llm_service.generate(prompt).await?;
        let looks = enrich_looks(parse_looks(&content)?, &wardrobe);

        info!("Generated {} VIP looks successfully", looks.len());

        let record = RecommendedLooksRecord {
            id: Uuid::new_v4(),
            user_id,
            occasion: VIP_OCCASION.to_string(),
            look_data: LookData {
                looks: looks.clone(),
            },
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.repository.insert_recommended_looks(&record).await {
            warn!("Failed to cache VIP looks {}: {}", record.id, e);
        }

        Ok(looks)
    }
}

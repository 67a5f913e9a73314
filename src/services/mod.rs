// src/services/mod.rs
pub mod auth_service;
pub mod image_codec;
pub mod image_processor;
pub mod llm_service;
pub mod look_enricher;
pub mod prompt_builder;
pub mod redis_service;
pub mod vip_looks;

pub use auth_service::AuthService;
pub use image_codec::HttpImageCodec;
pub use image_processor::ImageProcessor;
pub use llm_service::{GatewayClient, LLMService};
pub use redis_service::RedisService;
pub use vip_looks::VipLookService;

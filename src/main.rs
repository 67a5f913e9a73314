// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

mod config;
mod errors;
mod handlers;
mod models;
mod services;

use crate::config::AppConfig;
use crate::handlers::{inspect_image, normalize_flat_object, normalize_portrait, suggest_vip_looks};
use crate::services::{
    AuthService, GatewayClient, HttpImageCodec, ImageProcessor, LLMService, RedisService,
    VipLookService,
};

#[derive(Clone)]
pub struct AppState {
    vip_looks: Arc<VipLookService>,
    image_processor: Arc<ImageProcessor>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Aura Looks service...");

    let config = AppConfig::from_env()?;

    // Initialize services
    let redis_service = Arc::new(
        RedisService::new(&config.redis_url)
            .await
            .with_context(|| format!("connecting to {}", config.redis_url))?,
    );
    let gateway = Arc::new(GatewayClient::new(
        config.gateway_url.clone(),
        config.gateway_api_key.clone(),
    ));
    let llm_service = Arc::new(LLMService::new(gateway, config.model.clone(), config.retry));
    let auth_service = Arc::new(AuthService::new(
        config.auth_url.clone(),
        config.auth_api_key.clone(),
    ));

    let app_state = AppState {
        vip_looks: Arc::new(VipLookService::new(auth_service, redis_service, llm_service)),
        image_processor: Arc::new(ImageProcessor::new(Arc::new(HttpImageCodec::new()))),
    };

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
    })
    .bind(&config.bind_addr)?
    .run()
    .await?;

    Ok(())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/looks/vip", web::post().to(suggest_vip_looks))
            .route("/images/portrait", web::post().to(normalize_portrait))
            .route("/images/flat", web::post().to(normalize_flat_object))
            .route("/images/inspect", web::post().to(inspect_image)),
    )
    .route("/health", web::get().to(health_check));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "aura-looks",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

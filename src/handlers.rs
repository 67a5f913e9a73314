// src/handlers.rs
use crate::{AppState, errors::AuraError, models::*};
use actix_web::{HttpRequest, HttpResponse, http::header, web};
use serde::Deserialize;

const MAX_TARGET_DIMENSION: u32 = 4096;

#[derive(Debug, Default, Deserialize)]
pub struct VipLooksRequest {
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PortraitRequest {
    pub url: String,
    pub target_height: Option<u32>,
    pub quality: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct FlatObjectRequest {
    pub url: String,
    pub max_size: Option<u32>,
    pub quality: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct InspectRequest {
    pub url: String,
}

pub async fn suggest_vip_looks(
    req: HttpRequest,
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AuraError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let count = parse_vip_looks_request(&body)?.count;

    let looks = data.vip_looks.suggest(authorization, count).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "looks": looks })))
}

pub async fn normalize_portrait(
    body: web::Json<PortraitRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AuraError> {
    let body = body.into_inner();
    let defaults = PortraitSpec::default();
    let spec = PortraitSpec {
        target_height: validate_dimension(body.target_height, defaults.target_height)?,
        quality: validate_quality(body.quality, defaults.quality)?,
        ..defaults
    };

    let result = data
        .image_processor
        .normalize_for_portrait_subject(validate_url(&body.url)?, spec)
        .await?;

    Ok(image_response(result))
}

pub async fn normalize_flat_object(
    body: web::Json<FlatObjectRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AuraError> {
    let body = body.into_inner();
    let defaults = FlatObjectSpec::default();
    let spec = FlatObjectSpec {
        max_dimension: validate_dimension(body.max_size, defaults.max_dimension)?,
        quality: validate_quality(body.quality, defaults.quality)?,
    };

    let result = data
        .image_processor
        .normalize_for_flat_object(validate_url(&body.url)?, spec)
        .await?;

    Ok(image_response(result))
}

pub async fn inspect_image(
    body: web::Json<InspectRequest>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, AuraError> {
    let geometry = data
        .image_processor
        .inspect_geometry(validate_url(&body.url)?)
        .await?;

    Ok(HttpResponse::Ok().json(geometry))
}

// An empty body means defaults; anything else must be a valid request.
fn parse_vip_looks_request(body: &[u8]) -> Result<VipLooksRequest, AuraError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(VipLooksRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AuraError::Validation(format!("Invalid request body: {}", e)))
}

fn image_response(result: ConversionResult) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(result.content_type())
        .insert_header(("X-Image-Width", result.width.to_string()))
        .insert_header(("X-Image-Height", result.height.to_string()))
        .body(result.data)
}

fn validate_url(url: &str) -> Result<&str, AuraError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AuraError::Validation("url is required".to_string()));
    }
    Ok(url)
}

fn validate_dimension(value: Option<u32>, default: u32) -> Result<u32, AuraError> {
    match value {
        None => Ok(default),
        Some(v) if (1..=MAX_TARGET_DIMENSION).contains(&v) => Ok(v),
        Some(v) => Err(AuraError::Validation(format!(
            "Dimension {} must be between 1 and {}",
            v, MAX_TARGET_DIMENSION
        ))),
    }
}

fn validate_quality(value: Option<u8>, default: u8) -> Result<u8, AuraError> {
    match value {
        None => Ok(default),
        Some(q) if (1..=100).contains(&q) => Ok(q),
        Some(q) => Err(AuraError::Validation(format!(
            "Quality {} must be between 1 and 100",
            q
        ))),
    }
}

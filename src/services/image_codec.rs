// src/services/image_codec.rs
use crate::errors::AuraError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use image::{ColorType, DynamicImage, RgbImage, codecs::jpeg::JpegEncoder};
use reqwest::Client;

/// Decode/encode capability used by the normalization pipeline.
#[async_trait]
pub trait ImageCodec: Send + Sync {
    async fn decode(&self, source: &str) -> Result<DynamicImage, AuraError>;

    async fn encode(&self, raster: RgbImage, quality: u8) -> Result<Vec<u8>, AuraError>;
}

/// Fetches sources over HTTP (or reads `data:` URLs) and uses the `image` crate.
pub struct HttpImageCodec {
    client: Client,
}

impl HttpImageCodec {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn fetch(&self, source: &str) -> Result<Bytes, AuraError> {
        if let Some(payload) = source.strip_prefix("data:") {
            return decode_data_url(payload);
        }

        let response = self
            .client
            .get(source)
            .send()
            .await
            .map_err(|e| AuraError::Decode(format!("Failed to fetch image: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuraError::Decode(format!(
                "Image source responded with {}",
                response.status()
            )));
        }

        response
            .bytes()
            .await
            .map_err(|e| AuraError::Decode(format!("Failed to read image body: {}", e)))
    }
}

#[async_trait]
impl ImageCodec for HttpImageCodec {
    async fn decode(&self, source: &str) -> Result<DynamicImage, AuraError> {
        let data = self.fetch(source).await?;
        tokio::task::spawn_blocking(move || decode_bytes(&data))
            .await
            .map_err(|e| AuraError::Decode(format!("Decode task failed: {}", e)))?
    }

    async fn encode(&self, raster: RgbImage, quality: u8) -> Result<Vec<u8>, AuraError> {
        tokio::task::spawn_blocking(move || encode_jpeg(&raster, quality))
            .await
            .map_err(|e| AuraError::Encode(format!("Encode task failed: {}", e)))?
    }
}

pub fn decode_bytes(data: &[u8]) -> Result<DynamicImage, AuraError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AuraError::Decode(format!("Invalid image format: {}", e)))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(AuraError::Decode("Image has zero dimensions".to_string()));
    }

    Ok(img)
}

pub fn encode_jpeg(raster: &RgbImage, quality: u8) -> Result<Vec<u8>, AuraError> {
    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100))
        .encode(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ColorType::Rgb8,
        )
        .map_err(|e| AuraError::Encode(e.to_string()))?;

    if output.is_empty() {
        return Err(AuraError::Encode("Encoder produced no payload".to_string()));
    }

    Ok(output)
}

// Only base64 payloads are accepted: `data:image/png;base64,....`
fn decode_data_url(payload: &str) -> Result<Bytes, AuraError> {
    let (meta, data) = payload
        .split_once(',')
        .ok_or_else(|| AuraError::Decode("Malformed data URL".to_string()))?;

    if !meta.ends_with(";base64") {
        return Err(AuraError::Decode(
            "Only base64 data URLs are supported".to_string(),
        ));
    }

    general_purpose::STANDARD
        .decode(data.trim())
        .map(Bytes::from)
        .map_err(|e| AuraError::Decode(format!("Invalid base64 payload: {}", e)))
}

// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// ---- Image pipeline ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Portrait ratio used for fashion photography.
    pub const PORTRAIT: AspectRatio = AspectRatio { width: 3, height: 4 };

    pub fn value(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortraitSpec {
    pub target_height: u32,
    pub aspect: AspectRatio,
    pub quality: u8,
}

impl PortraitSpec {
    pub fn target_width(&self) -> u32 {
        (self.target_height as f64 * self.aspect.value()).round() as u32
    }
}

impl Default for PortraitSpec {
    fn default() -> Self {
        Self {
            target_height: 1365,
            aspect: AspectRatio::PORTRAIT,
            quality: 92,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlatObjectSpec {
    pub max_dimension: u32,
    pub quality: u8,
}

impl Default for FlatObjectSpec {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            quality: 92,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ConversionResult {
    pub fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub is_portrait: bool,
    pub needs_normalization: bool,
}

// ---- Wardrobe & profile ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compatibility {
    Ideal,
    Neutral,
    Avoid,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Compatibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compatibility::Ideal => "ideal",
            Compatibility::Neutral => "neutral",
            Compatibility::Avoid => "avoid",
            Compatibility::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DominantColor {
    pub name: String,
    pub hex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub dominant_colors: Option<Vec<DominantColor>>,
    #[serde(default)]
    pub color_code: Option<String>,
    #[serde(default)]
    pub chromatic_compatibility: Option<Compatibility>,
}

impl WardrobeItem {
    pub fn compatibility(&self) -> Compatibility {
        self.chromatic_compatibility.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorAnalysis {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub recommended_colors: Vec<String>,
    #[serde(default)]
    pub avoid_colors: Vec<String>,
    #[serde(default)]
    pub skin_tone: Option<String>,
    #[serde(default)]
    pub undertone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorProfile {
    #[serde(default)]
    pub color_season: Option<String>,
    #[serde(default)]
    pub color_analysis: Option<ColorAnalysis>,
}

// ---- Looks ----

/// A look exactly as the generation service proposed it. Creative fields
/// (name, occasion, styling tip, ...) stay opaque in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedLook {
    // Ids the model referenced; non-string entries never resolve.
    #[serde(default)]
    pub items: Value,
    // Self-reported by the model; never trusted.
    #[allow(dead_code)]
    #[serde(default)]
    pub chromatic_score: Option<Value>,
    #[allow(dead_code)]
    #[serde(default)]
    pub vip_tier: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeneratedLook {
    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.items
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedLooks {
    pub looks: Vec<GeneratedLook>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VipTier {
    Gold,
    Silver,
    Bronze,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookItem {
    pub id: String,
    pub name: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub chromatic_compatibility: Compatibility,
}

impl From<&WardrobeItem> for LookItem {
    fn from(item: &WardrobeItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
            chromatic_compatibility: item.compatibility(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedLook {
    pub items: Vec<LookItem>,
    pub chromatic_score: u8,
    pub vip_tier: VipTier,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SuggestedLook {
    pub fn name(&self) -> Option<&str> {
        self.extra.get("name").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookData {
    pub looks: Vec<SuggestedLook>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedLooksRecord {
    pub id: Uuid,
    pub user_id: String,
    pub occasion: String,
    pub look_data: LookData,
    pub created_at: DateTime<Utc>,
}

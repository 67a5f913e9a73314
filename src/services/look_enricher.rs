// src/services/look_enricher.rs
use crate::errors::AuraError;
use crate::models::{
    Compatibility, GeneratedLook, GeneratedLooks, LookItem, SuggestedLook, VipTier, WardrobeItem,
};
use log::{debug, error};
use std::collections::HashMap;

/// First `{` through last `}` of the text, inclusive.
pub fn extract_json_object(text: &str) -> Result<&str, AuraError> {
    let start = text.find('{');
    let end = text.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(AuraError::MalformedResponse(
            "No JSON object found in AI response".to_string(),
        )),
    }
}

pub fn parse_looks(text: &str) -> Result<Vec<GeneratedLook>, AuraError> {
    let parsed = extract_json_object(text)
        .and_then(|json| {
            serde_json::from_str::<GeneratedLooks>(json)
                .map_err(|e| AuraError::MalformedResponse(format!("Failed to parse looks: {}", e)))
        })
        .inspect_err(|e| {
            error!("Failed to parse AI response: {}", e);
            debug!("Raw AI response: {}", text);
        })?;

    Ok(parsed.looks)
}

pub fn compatibility_points(label: Compatibility) -> u32 {
    match label {
        Compatibility::Ideal => 100,
        Compatibility::Neutral => 50,
        Compatibility::Avoid => 0,
        Compatibility::Unknown => 25,
    }
}

pub fn chromatic_score(items: &[&WardrobeItem]) -> u8 {
    if items.is_empty() {
        return 0;
    }

    let total: u32 = items
        .iter()
        .map(|item| compatibility_points(item.compatibility()))
        .sum();
    (total as f64 / items.len() as f64).round() as u8
}

impl VipTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => VipTier::Gold,
            75..=89 => VipTier::Silver,
            _ => VipTier::Bronze,
        }
    }
}

/// Resolves item ids, recomputes score and tier, and ranks best first.
pub fn enrich_looks(looks: Vec<GeneratedLook>, wardrobe: &[WardrobeItem]) -> Vec<SuggestedLook> {
    let by_id: HashMap<&str, &WardrobeItem> =
        wardrobe.iter().map(|item| (item.id.as_str(), item)).collect();

    let mut enriched: Vec<SuggestedLook> = looks
        .into_iter()
        .map(|look| {
            let resolved: Vec<&WardrobeItem> = look
                .item_ids()
                .filter_map(|id| by_id.get(id).copied())
                .collect();
            let score = chromatic_score(&resolved);

            SuggestedLook {
                items: resolved.into_iter().map(LookItem::from).collect(),
                chromatic_score: score,
                vip_tier: VipTier::from_score(score),
                extra: look.extra,
            }
        })
        .collect();

    enriched.sort_by(|a, b| b.chromatic_score.cmp(&a.chromatic_score));
    enriched
}

// src/services/prompt_builder.rs
use crate::models::{ColorAnalysis, ColorProfile, WardrobeItem};

pub const DEFAULT_SEASON: &str = "spring-warm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exemplars {
    pub br: &'static [&'static str],
    pub intl: &'static [&'static str],
}

const DEFAULT_EXEMPLARS: Exemplars = Exemplars {
    br: &["Gisele Bündchen"],
    intl: &["Cindy Crawford"],
};

const EXEMPLARS_BY_SEASON: &[(&str, Exemplars)] = &[
    (
        "spring-light",
        Exemplars {
            br: &["Angélica", "Claudia Leitte", "Eliana"],
            intl: &["Taylor Swift", "Blake Lively", "Reese Witherspoon"],
        },
    ),
    (
        "spring-warm",
        Exemplars {
            br: &["Marina Ruy Barbosa", "Mariana Ximenes", "Letícia Spiller"],
            intl: &["Jessica Chastain", "Nicole Kidman", "Amy Adams"],
        },
    ),
    (
        "spring-bright",
        Exemplars {
            br: &["Anitta", "Taís Araújo", "IZA", "Ludmilla"],
            intl: &["Zendaya", "Rihanna", "Lupita Nyong'o"],
        },
    ),
    (
        "summer-light",
        Exemplars {
            br: &["Grazi Massafera", "Flávia Alessandra", "Carolina Dieckmann"],
            intl: &["Elle Fanning", "Cate Blanchett", "Kate Middleton"],
        },
    ),
    (
        "summer-soft",
        Exemplars {
            br: &["Deborah Secco", "Giovanna Ewbank", "Fernanda Paes Leme"],
            intl: &["Jennifer Aniston", "Sarah Jessica Parker"],
        },
    ),
    (
        "summer-cool",
        Exemplars {
            br: &["Adriana Lima", "Fernanda Montenegro", "Alessandra Ambrosio"],
            intl: &["Anne Hathaway", "Keira Knightley"],
        },
    ),
    (
        "autumn-soft",
        Exemplars {
            br: &["Juliana Paes", "Paolla Oliveira", "Dira Paes"],
            intl: &["Drew Barrymore", "Julia Roberts"],
        },
    ),
    (
        "autumn-warm",
        Exemplars {
            br: &["Sabrina Sato", "Camila Pitanga", "Lucy Alves"],
            intl: &["Julianne Moore", "Emma Stone"],
        },
    ),
    (
        "autumn-deep",
        Exemplars {
            br: &["Juliana Alves", "Cris Vianna", "Preta Gil"],
            intl: &["Jennifer Lopez", "Eva Mendes", "Sofia Vergara"],
        },
    ),
    (
        "winter-bright",
        Exemplars {
            br: &["Bruna Marquezine", "Isis Valverde", "Mel Maia"],
            intl: &["Megan Fox", "Kim Kardashian", "Dita Von Teese"],
        },
    ),
    (
        "winter-cool",
        Exemplars {
            br: &["Malu Mader", "Glória Pires", "Christiane Torloni"],
            intl: &["Angelina Jolie", "Liv Tyler", "Courteney Cox"],
        },
    ),
    (
        "winter-deep",
        Exemplars {
            br: &["Sheron Menezzes", "Erika Januza", "Liniker", "Lázaro Ramos"],
            intl: &["Beyoncé", "Kerry Washington", "Naomi Campbell"],
        },
    ),
];

/// `"Winter  Deep"` -> `"winter-deep"`.
pub fn normalize_season_key(season: &str) -> String {
    season
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

pub fn exemplars_for_season(season: &str) -> Exemplars {
    let key = normalize_season_key(season);
    EXEMPLARS_BY_SEASON
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, exemplars)| *exemplars)
        .unwrap_or(DEFAULT_EXEMPLARS)
}

pub fn season_id(profile: Option<&ColorProfile>) -> String {
    let analysis = profile.and_then(|p| p.color_analysis.as_ref());

    if let Some((season, subtype)) =
        analysis.and_then(|a| Some((a.season.as_deref()?, a.subtype.as_deref()?)))
    {
        return format!("{}-{}", season, subtype).to_lowercase();
    }

    profile
        .and_then(|p| p.color_season.clone())
        .unwrap_or_else(|| DEFAULT_SEASON.to_string())
}

pub fn describe_wardrobe(items: &[WardrobeItem]) -> String {
    items
        .iter()
        .map(|item| {
            let colors = match &item.dominant_colors {
                Some(colors) => colors
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.hex))
                    .collect::<Vec<_>>()
                    .join(", "),
                None => item
                    .color_code
                    .clone()
                    .unwrap_or_else(|| "not analyzed".to_string()),
            };

            format!(
                "- ID: {} | {} | Name: {} | Colors: {} | Compat: {}",
                item.id,
                item.category,
                item.name.as_deref().unwrap_or("Unnamed"),
                colors,
                item.compatibility().as_str()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn profile_context(analysis: Option<&ColorAnalysis>, exemplars: &Exemplars) -> String {
    let references = format!(
        "Brazilian reference celebrities: {}\nInternational reference celebrities: {}",
        exemplars.br.join(", "),
        exemplars.intl.join(", ")
    );

    let Some(analysis) = analysis else {
        return format!(
            "## VIP COLOR PROFILE\nFull analysis not available.\n{}\n",
            references
        );
    };

    let list_or = |colors: &[String], limit: usize| {
        if colors.is_empty() {
            "not defined".to_string()
        } else {
            colors.iter().take(limit).cloned().collect::<Vec<_>>().join(", ")
        }
    };

    format!(
        "## CLIENT VIP COLOR PROFILE\nSeason: {} {}\n{}\nIdeal colors: {}\nColors to avoid: {}\nSkin tone: {}\nUndertone: {}\n",
        analysis.season.as_deref().unwrap_or("not defined"),
        analysis.subtype.as_deref().unwrap_or(""),
        references,
        list_or(&analysis.recommended_colors, 8),
        list_or(&analysis.avoid_colors, 5),
        analysis.skin_tone.as_deref().unwrap_or("not defined"),
        analysis.undertone.as_deref().unwrap_or("not defined"),
    )
}

const OUTPUT_SHAPE: &str = r##"{
  "looks": [
    {
      "name": "Glamorous, memorable name",
      "items": ["uuid1", "uuid2"],
      "occasion": "event|gala|date|photoshoot|work",
      "harmony_type": "triad|split_complementary|tetradic|analogous",
      "color_harmony": "Technical explanation of the harmony applied",
      "chromatic_score": 95,
      "styling_tip": "Main refined styling tip",
      "trend_inspiration": "Current trend name",
      "confidence_boost": "Unique empowering sentence",
      "accessory_suggestions": ["premium accessory 1", "premium accessory 2"],
      "vip_tier": "gold|silver|bronze",
      "celebrity_inspiration": {
        "name": "Celebrity name (prefer Brazilian)",
        "reference": "Specific event or editorial",
        "why": "Why the combination works for the season"
      },
      "investment_piece": {
        "category": "piece category",
        "description": "Timeless piece suggested",
        "why": "Why it is worth the investment"
      },
      "color_theory_deep": {
        "principle": "Principle applied (e.g. Chromatic Triad)",
        "explanation": "Detailed explanation with 60-30-10 proportions",
        "hex_palette": ["#HEX1", "#HEX2", "#HEX3"]
      },
      "occasion_details": {
        "perfect_for": "Where the look shines",
        "avoid_for": "Where to avoid it",
        "best_time": "Best time (day/night)"
      },
      "styling_secrets": ["Styling secret 1", "Styling secret 2"]
    }
  ]
}"##;

/// Renders the full VIP looks prompt. Identical inputs give identical text.
pub fn build_vip_prompt(
    items: &[WardrobeItem],
    profile: Option<&ColorProfile>,
    count: u32,
) -> String {
    let exemplars = exemplars_for_season(&season_id(profile));
    let analysis = profile.and_then(|p| p.color_analysis.as_ref());

    format!(
        r#"You are **Aura Elite**, image consultant to A-list celebrities and premium fashion editor. Your job is to create high-impact looks that make the client feel like a red carpet star.

{context}
## AVAILABLE WARDROBE
{wardrobe}

## VIP ELITE MISSION
Create exactly {count} HIGH-IMPACT, EXCLUSIVE looks using ONLY pieces from the wardrobe above. Each look must be unique and sophisticated.

## MANDATORY VIP CRITERIA

### 1. CELEBRITY INSPIRATION (PREFER BRAZILIAN)
For each look, cite a celebrity with the same color season and an iconic moment that inspires the combination. Use the celebrities listed in the profile.

### 2. ADVANCED COLOR THEORY
- **60-30-10 rule**: 60% dominant, 30% secondary, 10% accent
- **Temperature**: warm vs cool colors and their impact
- **Intensity and value**: depth and brightness
- **Psychological effect**: red=power, blue=trust, green=balance
- Provide the HEX palette of the main colors of the look

### 3. ADVANCED HARMONIES
- Triad, split complementary, tetradic, analogous with accent

### 4. INVESTMENT PIECE
Suggest ONE timeless piece the client should consider acquiring to elevate this look.

### 5. OCCASION DETAILS
- Where the look shines, where to avoid it, best time of day

### 6. PROFESSIONAL STYLING SECRETS
2 exclusive tips celebrity stylists use

### 7. CURRENT TRENDS
Quiet Luxury, Old Money Aesthetic, Mob Wife, Cherry Coded, Butter Yellow, Burgundy Renaissance, Chocolate Brown Revival, Coastal Grandmother

### 8. VIP CLASSIFICATION
- GOLD: score 90-100, perfect harmony, all pieces ideal
- SILVER: score 75-89, excellent combination
- BRONZE: score 60-74, very good combination

## INVIOLABLE RULES
1. Use ONLY pieces with compatibility "ideal" or "neutral"
2. NEVER use pieces with compatibility "avoid"
3. Each look: 2-4 pieces that work beautifully together
4. Glamorous, memorable names in Portuguese
5. A personalized, empowering confidence sentence

Return ONLY valid JSON (no markdown, no comments):
{shape}"#,
        context = profile_context(analysis, &exemplars),
        wardrobe = describe_wardrobe(items),
        count = count,
        shape = OUTPUT_SHAPE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Compatibility, DominantColor};

    fn item(id: &str, compat: Option<Compatibility>) -> WardrobeItem {
        WardrobeItem {
            id: id.to_string(),
            category: "top".to_string(),
            name: None,
            image_url: None,
            dominant_colors: None,
            color_code: None,
            chromatic_compatibility: compat,
        }
    }

    #[test]
    fn season_key_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize_season_key("Winter  Deep"), "winter-deep");
        assert_eq!(
            exemplars_for_season("Winter Deep"),
            exemplars_for_season("winter-deep")
        );
        assert!(exemplars_for_season("AUTUMN warm").br.contains(&"Sabrina Sato"));
        assert_eq!(normalize_season_key(" winter deep "), "winter-deep");
    }

    #[test]
    fn unknown_season_falls_back_to_default_pair() {
        let exemplars = exemplars_for_season("monsoon-vivid");
        assert_eq!(exemplars.br, &["Gisele Bündchen"]);
        assert_eq!(exemplars.intl, &["Cindy Crawford"]);
    }

    #[test]
    fn season_id_prefers_analysis_then_legacy_then_default() {
        let analysed = ColorProfile {
            color_season: Some("summer-soft".into()),
            color_analysis: Some(ColorAnalysis {
                season: Some("Winter".into()),
                subtype: Some("Cool".into()),
                ..ColorAnalysis::default()
            }),
        };
        assert_eq!(season_id(Some(&analysed)), "winter-cool");

        let legacy = ColorProfile {
            color_season: Some("summer-soft".into()),
            color_analysis: Some(ColorAnalysis {
                season: Some("Winter".into()),
                ..ColorAnalysis::default()
            }),
        };
        assert_eq!(season_id(Some(&legacy)), "summer-soft");
        assert_eq!(season_id(None), DEFAULT_SEASON);
    }

    #[test]
    fn wardrobe_lines_render_colors_and_fallbacks() {
        let mut named = item("a1", Some(Compatibility::Ideal));
        named.name = Some("Silk blouse".into());
        named.dominant_colors = Some(vec![
            DominantColor {
                name: "Ivory".into(),
                hex: "#FFFFF0".into(),
            },
            DominantColor {
                name: "Navy".into(),
                hex: "#000080".into(),
            },
        ]);
        let mut coded = item("b2", None);
        coded.color_code = Some("#112233".into());
        let bare = item("c3", Some(Compatibility::Avoid));

        let text = describe_wardrobe(&[named, coded, bare]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "- ID: a1 | top | Name: Silk blouse | Colors: Ivory (#FFFFF0), Navy (#000080) | Compat: ideal"
        );
        assert_eq!(
            lines[1],
            "- ID: b2 | top | Name: Unnamed | Colors: #112233 | Compat: unknown"
        );
        assert_eq!(
            lines[2],
            "- ID: c3 | top | Name: Unnamed | Colors: not analyzed | Compat: avoid"
        );
    }

    #[test]
    fn prompt_is_deterministic_and_carries_rules() {
        let items = vec![
            item("a", Some(Compatibility::Ideal)),
            item("b", Some(Compatibility::Neutral)),
            item("c", Some(Compatibility::Avoid)),
        ];
        let first = build_vip_prompt(&items, None, 4);
        let second = build_vip_prompt(&items, None, 4);

        assert_eq!(first, second);
        assert!(first.contains("Create exactly 4"));
        assert!(first.contains("Full analysis not available."));
        assert!(first.contains("Marina Ruy Barbosa"));
        assert!(first.contains("GOLD: score 90-100"));
        assert!(first.contains("\"chromatic_score\": 95"));
        assert!(first.contains("NEVER use pieces with compatibility \"avoid\""));
    }

    #[test]
    fn profile_context_truncates_color_lists() {
        let colors: Vec<String> = (0..12).map(|i| format!("c{}", i)).collect();
        let profile = ColorProfile {
            color_season: None,
            color_analysis: Some(ColorAnalysis {
                season: Some("autumn".into()),
                subtype: Some("deep".into()),
                recommended_colors: colors.clone(),
                avoid_colors: colors,
                skin_tone: Some("olive".into()),
                undertone: None,
            }),
        };

        let prompt = build_vip_prompt(&[], Some(&profile), 3);
        assert!(prompt.contains("Ideal colors: c0, c1, c2, c3, c4, c5, c6, c7\n"));
        assert!(prompt.contains("Colors to avoid: c0, c1, c2, c3, c4\n"));
        assert!(prompt.contains("Undertone: not defined"));
        assert!(prompt.contains("Jennifer Lopez"));
    }
}

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::error::StudioError;
use super::settings::ArtisticStyle;

const PRESETS: [(ArtisticStyle, &str); 18] = [
    (
        ArtisticStyle::HyperrealisticGame,
        "high-end video game engine render, unreal engine 5, raytracing, cinematic shadows, 8k resolution",
    ),
    (
        ArtisticStyle::TitleMaker,
        "bold cinematic movie title design, typography focused, dramatic backdrop, high contrast",
    ),
    (
        ArtisticStyle::BangladeshiFolkArt,
        "traditional Bangladeshi Nakshi Kantha patterns, folk motifs, vibrant local colors, rural heritage aesthetics",
    ),
    (
        ArtisticStyle::RickshawSticker,
        "Bangladeshi rickshaw art style, hand-painted motifs, bold primary colors, birds and floral patterns, glossy finish",
    ),
    (
        ArtisticStyle::Photorealistic,
        "national geographic photography style, ultra-detailed textures, natural light, professional DSLR lens",
    ),
    (
        ArtisticStyle::Impressionist,
        "oil on canvas, visible brushstrokes, Monet style, play of light and atmosphere",
    ),
    (
        ArtisticStyle::Surrealist,
        "Salvador Dali inspiration, dream-like landscapes, melting objects, impossible geometry",
    ),
    (
        ArtisticStyle::Minimalist,
        "clean lines, negative space, Bauhaus inspired, limited color palette, simple geometry",
    ),
    (
        ArtisticStyle::Cyberpunk,
        "neon-drenched streets, rainy night, futuristic technology, blade runner aesthetic, cyan and magenta lighting",
    ),
    (
        ArtisticStyle::PixarStyle,
        "3D animated feature film look, soft character lighting, vibrant colors, expressive features",
    ),
    (
        ArtisticStyle::VintagePhotograph,
        "1960s film grain, faded colors, sepia tones, historical document feel, light leaks",
    ),
    (
        ArtisticStyle::Gta,
        "Grand Theft Auto V loading screen art, saturated colors, thick black outlines, cell-shaded textures",
    ),
    (
        ArtisticStyle::Gta6,
        "modern Vice City sunset aesthetic, high-fidelity character art, realistic lighting with GTA flair",
    ),
    (
        ArtisticStyle::EightBitArcadeGame,
        "pixel art, limited color palette, retro 1980s game aesthetics, sharp squares",
    ),
    (
        ArtisticStyle::JustABanana,
        "surreal banana-themed world, yellow dominance, playful fruit textures",
    ),
    (
        ArtisticStyle::AnimeStyle,
        "modern high-budget anime film look, Studio Ghibli or CoMix Wave Films aesthetic, beautiful backgrounds",
    ),
    (
        ArtisticStyle::HandPainted,
        "acrylic on canvas texture, human touch, slight imperfections, rich impasto",
    ),
    (
        ArtisticStyle::OldHandPaintedCartoon,
        "1940s rubber hose animation, vintage Disney or Fleischer Studios aesthetic, grainy black and white",
    ),
];

/// Style -> prompt fragment lookup, built once
static STYLE_PRESETS: Lazy<HashMap<ArtisticStyle, &'static str>> =
    Lazy::new(|| PRESETS.iter().copied().collect());

/// Descriptive prompt fragment for a style
pub fn style_fragment(style: ArtisticStyle) -> &'static str {
    STYLE_PRESETS.get(&style).copied().unwrap_or_default()
}

/// Check that every style has a non-empty fragment. Run at startup.
pub fn validate_presets() -> Result<(), StudioError> {
    check_coverage(&STYLE_PRESETS)
}

fn check_coverage(table: &HashMap<ArtisticStyle, &'static str>) -> Result<(), StudioError> {
    let missing: Vec<&str> = ArtisticStyle::ALL
        .iter()
        .filter(|style| table.get(style).map_or(true, |fragment| fragment.trim().is_empty()))
        .map(|style| style.name())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StudioError::InvalidPresetTable(missing.join(", ")))
    }
}

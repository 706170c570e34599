use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::StudioError;

/// Upper bound of the lighting and complexity sliders.
pub const LEVEL_MAX: u8 = 10;

/// Artistic style presets offered by the studio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtisticStyle {
    #[serde(rename = "Hyperrealistic Game")]
    HyperrealisticGame,
    #[serde(rename = "Title Maker")]
    TitleMaker,
    #[serde(rename = "Bangladeshi Folk Art")]
    BangladeshiFolkArt,
    #[serde(rename = "Rickshaw Sticker")]
    RickshawSticker,
    Photorealistic,
    Impressionist,
    Surrealist,
    Minimalist,
    Cyberpunk,
    #[serde(rename = "Pixar Style")]
    PixarStyle,
    #[serde(rename = "Vintage Photograph")]
    VintagePhotograph,
    #[serde(rename = "GTA")]
    Gta,
    #[serde(rename = "GTA 6")]
    Gta6,
    #[serde(rename = "8-bit Arcade Game")]
    EightBitArcadeGame,
    #[serde(rename = "Just a Banana")]
    JustABanana,
    #[serde(rename = "Anime Style")]
    AnimeStyle,
    #[serde(rename = "Hand-painted")]
    HandPainted,
    #[serde(rename = "Old hand-painted cartoon style")]
    OldHandPaintedCartoon,
}

impl ArtisticStyle {
    /// All styles in picker order
    pub const ALL: [ArtisticStyle; 18] = [
        ArtisticStyle::HyperrealisticGame,
        ArtisticStyle::TitleMaker,
        ArtisticStyle::BangladeshiFolkArt,
        ArtisticStyle::RickshawSticker,
        ArtisticStyle::Photorealistic,
        ArtisticStyle::Impressionist,
        ArtisticStyle::Surrealist,
        ArtisticStyle::Minimalist,
        ArtisticStyle::Cyberpunk,
        ArtisticStyle::PixarStyle,
        ArtisticStyle::VintagePhotograph,
        ArtisticStyle::Gta,
        ArtisticStyle::Gta6,
        ArtisticStyle::EightBitArcadeGame,
        ArtisticStyle::JustABanana,
        ArtisticStyle::AnimeStyle,
        ArtisticStyle::HandPainted,
        ArtisticStyle::OldHandPaintedCartoon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtisticStyle::HyperrealisticGame => "Hyperrealistic Game",
            ArtisticStyle::TitleMaker => "Title Maker",
            ArtisticStyle::BangladeshiFolkArt => "Bangladeshi Folk Art",
            ArtisticStyle::RickshawSticker => "Rickshaw Sticker",
            ArtisticStyle::Photorealistic => "Photorealistic",
            ArtisticStyle::Impressionist => "Impressionist",
            ArtisticStyle::Surrealist => "Surrealist",
            ArtisticStyle::Minimalist => "Minimalist",
            ArtisticStyle::Cyberpunk => "Cyberpunk",
            ArtisticStyle::PixarStyle => "Pixar Style",
            ArtisticStyle::VintagePhotograph => "Vintage Photograph",
            ArtisticStyle::Gta => "GTA",
            ArtisticStyle::Gta6 => "GTA 6",
            ArtisticStyle::EightBitArcadeGame => "8-bit Arcade Game",
            ArtisticStyle::JustABanana => "Just a Banana",
            ArtisticStyle::AnimeStyle => "Anime Style",
            ArtisticStyle::HandPainted => "Hand-painted",
            ArtisticStyle::OldHandPaintedCartoon => "Old hand-painted cartoon style",
        }
    }

    /// Kebab-case identifier for command-line use (e.g. "gta-6")
    pub fn slug(&self) -> String {
        self.name().to_lowercase().replace(' ', "-")
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn previous(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for ArtisticStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArtisticStyle {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.name().to_lowercase() == wanted || style.slug() == wanted)
            .ok_or_else(|| StudioError::InvalidParameter(format!("unknown style '{}'", s)))
    }
}

/// Output aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Landscape,
        AspectRatio::Portrait,
        AspectRatio::Classic,
        AspectRatio::ClassicPortrait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Classic => "4:3",
            AspectRatio::ClassicPortrait => "3:4",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn previous(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|ratio| ratio.as_str() == s.trim())
            .ok_or_else(|| {
                StudioError::InvalidParameter(format!(
                    "invalid aspect ratio '{}'. Valid values: {}",
                    s,
                    Self::ALL.map(|r| r.as_str()).join(", ")
                ))
            })
    }
}

/// Requested output quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageQuality {
    Standard,
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageQuality {
    pub const ALL: [ImageQuality; 3] = [ImageQuality::Standard, ImageQuality::TwoK, ImageQuality::FourK];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "Standard",
            ImageQuality::TwoK => "2K",
            ImageQuality::FourK => "4K",
        }
    }

    pub fn tier(&self) -> QualityTier {
        match self {
            ImageQuality::Standard => QualityTier::Standard,
            ImageQuality::TwoK | ImageQuality::FourK => QualityTier::High,
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn previous(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for ImageQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageQuality {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|quality| quality.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                StudioError::InvalidParameter(format!(
                    "invalid quality '{}'. Valid values: Standard, 2K, 4K",
                    s
                ))
            })
    }
}

/// Model family a quality maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    Standard,
    High,
}

impl QualityTier {
    pub fn is_high(&self) -> bool {
        matches!(self, QualityTier::High)
    }
}

/// Parameters collected by the compose view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub style: ArtisticStyle,

    /// Cinematic lighting level (0-10)
    pub lighting: u8,

    /// Detail complexity level (0-10)
    pub complexity: u8,

    pub aspect_ratio: AspectRatio,

    pub quality: ImageQuality,

    /// Free-text scene description
    #[serde(default)]
    pub prompt: String,

    /// Source image as a base64 data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            style: ArtisticStyle::HyperrealisticGame,
            lighting: 8,
            complexity: 9,
            aspect_ratio: AspectRatio::Portrait,
            quality: ImageQuality::Standard,
            prompt: String::new(),
            source_image: None,
        }
    }
}

impl GenerationSettings {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_style(mut self, style: ArtisticStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_lighting(mut self, level: u8) -> Self {
        self.lighting = level.min(LEVEL_MAX);
        self
    }

    pub fn with_complexity(mut self, level: u8) -> Self {
        self.complexity = level.min(LEVEL_MAX);
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_source_image(mut self, data_uri: impl Into<String>) -> Self {
        self.source_image = Some(data_uri.into());
        self
    }

    /// True when there is something to send: a prompt or a source image
    pub fn has_input(&self) -> bool {
        !self.prompt.trim().is_empty() || self.source_image.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn tier(&self) -> QualityTier {
        self.quality.tier()
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

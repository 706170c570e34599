pub mod data_uri;
pub mod error;
pub mod image;
pub mod prompt;
pub mod settings;
pub mod styles;

pub use error::StudioError;
pub use image::GeneratedImage;
pub use prompt::build_prompt;
pub use settings::{ArtisticStyle, AspectRatio, GenerationSettings, ImageQuality, QualityTier};

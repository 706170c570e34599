use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::data_uri;
use super::error::StudioError;
use super::settings::GenerationSettings;

/// A finished generation kept in the studio history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Unique, time-derived ID (e.g. "1760000000000-1a2b3c4d")
    pub id: String,

    /// Image as a data URI
    pub url: String,

    /// The user's scene description
    pub prompt: String,

    /// Snapshot of the settings used
    pub settings: GenerationSettings,

    pub timestamp: DateTime<Utc>,
}

impl GeneratedImage {
    pub fn new(url: String, settings: GenerationSettings) -> Self {
        let timestamp = Utc::now();
        let uuid = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}", timestamp.timestamp_millis(), &uuid[..8]);

        Self {
            id,
            url,
            prompt: settings.prompt.clone(),
            settings,
            timestamp,
        }
    }

    pub fn mime_type(&self) -> &str {
        data_uri::mime_type(&self.url).unwrap_or("image/png")
    }

    /// Decoded image size in bytes
    pub fn byte_len(&self) -> usize {
        let payload = data_uri::payload(&self.url).trim_end_matches('=');
        payload.len() * 3 / 4
    }

    /// Get the prompt (truncated for display)
    pub fn prompt_preview(&self, max_chars: usize) -> String {
        if self.prompt.chars().count() <= max_chars {
            self.prompt.clone()
        } else {
            let cut: String = self.prompt.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }

    /// Write the image to `dir` as `p2l-studio-<millis>.<ext>`
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf, StudioError> {
        fs::create_dir_all(dir).await?;

        let bytes = data_uri::decode(&self.url)?;
        let filename = format!(
            "p2l-studio-{}.{}",
            Utc::now().timestamp_millis(),
            data_uri::extension_for(self.mime_type())
        );
        let path = dir.join(filename);

        fs::write(&path, &bytes).await?;
        tracing::info!("Saved image to: {}", path.display());

        Ok(path)
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for embed generation and placeholder messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Origin the YouTube player is served from
    pub youtube_origin: String,
    /// Origin the Vimeo player is served from
    pub vimeo_player_origin: String,
    /// Base for relative references when the block has no page URL
    pub base_url: String,
    /// `padding-bottom` of the responsive wrapper (16:9 by default)
    pub aspect_ratio_padding: String,
    /// Iframe title for YouTube embeds
    pub youtube_title: String,
    /// Iframe title for Vimeo embeds
    pub vimeo_title: String,
    /// Headline shown when the block references no media
    pub no_media_message: String,
    /// Hint shown below the headline
    pub no_media_hint: String,
    /// Message shown when the reference is not a valid URL
    pub invalid_url_message: String,
    /// File extension markers that make free text count as a reference
    pub extension_markers: Vec<String>,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            youtube_origin: "https://www.youtube.com".to_string(),
            vimeo_player_origin: "https://player.vimeo.com".to_string(),
            base_url: "https://localhost/".to_string(),
            aspect_ratio_padding: "56.25%".to_string(),
            youtube_title: "Content from Youtube".to_string(),
            vimeo_title: "Content from Vimeo".to_string(),
            no_media_message: "📹 Click to add video URL".to_string(),
            no_media_hint: "Use the properties panel (→) to add YouTube, Vimeo, or MP4 URL"
                .to_string(),
            invalid_url_message: "Invalid video URL.".to_string(),
            extension_markers: [".mp4", ".webm", ".ogg", ".mov"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl EmbedConfig {
    /// Load a JSON config file; missing keys keep their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!("Loaded embed config from {}", path.display());
        Ok(config)
    }

    /// Parsed fallback base URL, if it is a valid absolute URL
    pub fn base(&self) -> Option<Url> {
        Url::parse(&self.base_url).ok()
    }
}

use serde::Deserialize;

use crate::brightness;

/// One parameterized configuration covering both historical variants of the
/// player; the only divergence between them is `mute_disables_slider`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Stream URL assigned to the media element.
    pub stream_url: String,
    /// Wallpaper applied when no persisted selection exists.
    pub default_wallpaper_url: String,
    /// Volume used on first run and when unmuting with no recorded level.
    pub default_volume: f32,
    /// Whether the volume slider is disabled while muted.
    pub mute_disables_slider: bool,
    /// Brightness classification threshold on the 0-255 scale.
    pub brightness_threshold: f32,
    /// Uploaded wallpaper files above this size are rejected before any read.
    pub max_upload_bytes: u64,
    /// Transform window of the analyser node.
    pub fft_size: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            stream_url: "https://stream.radioparadise.com/aac-128".to_string(),
            default_wallpaper_url: "assets/default-bg.jpg".to_string(),
            default_volume: 0.5,
            mute_disables_slider: true,
            brightness_threshold: brightness::DEFAULT_THRESHOLD,
            max_upload_bytes: 5 * 1024 * 1024,
            fft_size: 256,
        }
    }
}

impl PlayerConfig {
    /// Parse a configuration from JSON, filling missing fields with defaults.
    /// Malformed JSON falls back to the default configuration entirely.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("invalid player config, using defaults: {e}");
                Self::default()
            }
        }
    }
}

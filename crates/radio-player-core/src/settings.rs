//! Persisted settings: four string keys in a string key-value store.
//!
//! The codec is written against plain closures so the browser build can
//! plug in `localStorage` while tests use a `HashMap`. Reads are tolerant:
//! anything missing or unparseable falls back to the configured defaults.

use crate::config::PlayerConfig;
use crate::wallpaper::WallpaperSource;

pub const VOLUME_KEY: &str = "volume";
pub const MUTED_KEY: &str = "muted";
pub const WALLPAPER_KEY: &str = "lastWallpaper";
pub const WALLPAPER_KIND_KEY: &str = "lastWallpaperKind";

/// Everything surviving a reload: the two audio scalars and the wallpaper
/// reference. The theme flag is deliberately absent; it is recomputed from
/// the wallpaper's pixels at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub volume: f32,
    pub muted: bool,
    pub wallpaper: Option<WallpaperSource>,
}

impl Settings {
    /// Read settings through `read`, falling back to `config` defaults for
    /// anything missing or malformed.
    pub fn load(config: &PlayerConfig, read: impl Fn(&str) -> Option<String>) -> Self {
        let volume = read(VOLUME_KEY)
            .and_then(|v| v.parse::<f32>().ok())
            .map_or(config.default_volume, |v| v.clamp(0.0, 1.0));
        let muted = read(MUTED_KEY).is_some_and(|v| v == "true");
        let wallpaper = match (read(WALLPAPER_KIND_KEY), read(WALLPAPER_KEY)) {
            (Some(kind), Some(reference)) => WallpaperSource::from_parts(&kind, reference),
            // Entries written before the kind tag existed were always URLs.
            (None, Some(reference)) => Some(WallpaperSource::Url(reference)),
            _ => None,
        };
        Self { volume, muted, wallpaper }
    }

    /// Key-value pairs for the audio scalars, written on every change.
    pub fn audio_pairs(volume: f32, muted: bool) -> [(&'static str, String); 2] {
        [
            (VOLUME_KEY, format!("{volume}")),
            (MUTED_KEY, muted.to_string()),
        ]
    }

    /// Key-value pairs persisting a wallpaper selection.
    pub fn wallpaper_pairs(source: &WallpaperSource) -> [(&'static str, String); 2] {
        [
            (WALLPAPER_KEY, source.reference().to_string()),
            (WALLPAPER_KIND_KEY, source.kind().to_string()),
        ]
    }

    /// Keys removed when the wallpaper is reset to the default.
    pub fn wallpaper_keys() -> [&'static str; 2] {
        [WALLPAPER_KEY, WALLPAPER_KIND_KEY]
    }
}

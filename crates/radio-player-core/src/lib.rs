//! Platform-independent logic for the radio player.
//!
//! Everything in this crate is pure Rust with no browser bindings: the
//! brightness classifier, the playback/volume state machine, the wallpaper
//! pipeline bookkeeping, and the persisted-settings codec. The `radio-player`
//! crate wires these into `egui` and `web-sys`.

pub mod brightness;
pub mod config;
pub mod player;
pub mod settings;
pub mod wallpaper;

pub use config::PlayerConfig;
pub use player::{MediaEvent, PlayerState, StreamStatus};
pub use settings::Settings;
pub use wallpaper::{WallpaperError, WallpaperSource, WallpaperState};

//! Inert backend for non-wasm builds.
//!
//! Streaming, the analyser graph, and localStorage are browser capabilities;
//! off-web every operation degrades along the same paths the browser build
//! takes on failure, which keeps the app logic testable with plain
//! `cargo test`.

use radio_player_core::{MediaEvent, PlayerConfig};

use crate::events::{BackendError, EventQueue, SharedSpectrum, UiEvent};

pub struct Backend {
    events: EventQueue,
}

impl Backend {
    pub fn new(
        _config: &PlayerConfig,
        events: EventQueue,
        _spectrum: SharedSpectrum,
    ) -> Result<Self, BackendError> {
        Ok(Self { events })
    }

    pub fn request_play(&mut self) {
        self.events.push(UiEvent::Media(MediaEvent::PlayRejected(
            "audio playback is only available in the browser build".to_string(),
        )));
    }

    pub fn pause(&self) {
        self.events.push(UiEvent::Media(MediaEvent::Pause));
    }

    pub fn set_volume(&self, _volume: f32) {}

    pub fn set_muted(&self, _muted: bool) {}

    pub fn read_setting(&self, _key: &str) -> Option<String> {
        None
    }

    pub fn write_setting(&self, _key: &str, _value: &str) {}

    pub fn remove_setting(&self, _key: &str) {}

    pub fn show_wallpaper(&self, _reference: &str) {}

    /// No pixels to read here, so this resolves to the dark default the same
    /// way an unreadable image does in the browser.
    pub fn classify_wallpaper(&self, _reference: &str, generation: u64) {
        self.events.push(UiEvent::Classified { generation, is_light: false });
    }

    pub fn validate_wallpaper_url(&self, url: &str) {
        self.events.push(UiEvent::UrlValidated(url.to_string()));
    }

    pub fn open_wallpaper_picker(&self, _max_bytes: u64) {}
}

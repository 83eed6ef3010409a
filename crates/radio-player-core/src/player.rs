//! Playback and volume state machine.
//!
//! `PlayerState` is the single owner of everything the controls display.
//! Play/pause state is never assumed after a user action; it is re-derived
//! from the media element's own events so the button can not desynchronize
//! from actual playback.

use crate::config::PlayerConfig;

/// State-change notifications coming back from the media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// The element started fetching the stream.
    LoadStart,
    /// Playback stalled waiting for data.
    Waiting,
    /// Enough data buffered to (re)start playback.
    CanPlay,
    /// Playback actually started.
    Play,
    /// Playback actually paused.
    Pause,
    /// The element reported a stream error.
    Error(String),
    /// A `play()` attempt was rejected by the platform (e.g. autoplay block).
    PlayRejected(String),
}

/// Transient status line shown under the controls.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StreamStatus {
    #[default]
    Idle,
    Loading,
    Buffering,
    Ready,
    Playing,
    Paused,
    Error(String),
}

impl StreamStatus {
    pub fn label(&self) -> String {
        match self {
            StreamStatus::Idle => "Ready to play".to_string(),
            StreamStatus::Loading => "Loading stream...".to_string(),
            StreamStatus::Buffering => "Buffering...".to_string(),
            StreamStatus::Ready => "Stream ready".to_string(),
            StreamStatus::Playing => "Playing".to_string(),
            StreamStatus::Paused => "Paused".to_string(),
            StreamStatus::Error(msg) => format!("Error: {msg}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, StreamStatus::Error(_))
    }
}

/// Live playback state plus the remembered pre-mute volume.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub is_playing: bool,
    pub muted: bool,
    /// Actual output volume in [0, 1]. Forced to 0 while muted.
    pub volume: f32,
    pub status: StreamStatus,
    /// Last non-zero volume, restored on unmute.
    previous_volume: f32,
    default_volume: f32,
}

impl PlayerState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            is_playing: false,
            muted: false,
            volume: config.default_volume,
            status: StreamStatus::Idle,
            previous_volume: config.default_volume,
            default_volume: config.default_volume,
        }
    }

    /// Rebuild the state from persisted scalars on startup.
    pub fn restored(config: &PlayerConfig, volume: f32, muted: bool) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        let mut state = Self::new(config);
        state.muted = muted || volume == 0.0;
        state.volume = if state.muted { 0.0 } else { volume };
        state.previous_volume = if volume > 0.0 { volume } else { config.default_volume };
        state
    }

    /// Slider moved. Positive values clear mute and become the new restore
    /// point; exactly zero is treated as muting, not merely silence.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        if volume > 0.0 {
            self.muted = false;
            self.volume = volume;
            self.previous_volume = volume;
        } else {
            self.muted = true;
            self.volume = 0.0;
        }
    }

    /// Mute button. Muting remembers the current volume; unmuting restores
    /// it, or the default if nothing non-zero was ever recorded.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.muted = false;
            self.volume = if self.previous_volume > 0.0 {
                self.previous_volume
            } else {
                self.default_volume
            };
        } else {
            self.previous_volume = self.volume;
            self.muted = true;
            self.volume = 0.0;
        }
    }

    /// Whether the slider accepts input right now.
    pub fn slider_enabled(&self, config: &PlayerConfig) -> bool {
        !(self.muted && config.mute_disables_slider)
    }

    /// Fold a media-element event into the displayed state.
    pub fn apply_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadStart => self.status = StreamStatus::Loading,
            MediaEvent::Waiting => self.status = StreamStatus::Buffering,
            MediaEvent::CanPlay => {
                if !self.is_playing {
                    self.status = StreamStatus::Ready;
                }
            }
            MediaEvent::Play => {
                self.is_playing = true;
                self.status = StreamStatus::Playing;
            }
            MediaEvent::Pause => {
                self.is_playing = false;
                self.status = StreamStatus::Paused;
            }
            // A rejected `play()` never fires a `play` event, so the button
            // stays paused just like on a stream error.
            MediaEvent::Error(msg) | MediaEvent::PlayRejected(msg) => {
                self.is_playing = false;
                self.status = StreamStatus::Error(msg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PlayerState {
        PlayerState::new(&PlayerConfig::default())
    }

    #[test]
    fn zero_volume_means_muted() {
        let mut p = state();
        p.set_volume(0.0);
        assert!(p.muted);
        assert_eq!(p.volume, 0.0);
        assert!(!p.slider_enabled(&PlayerConfig::default()));
    }

    #[test]
    fn positive_volume_clears_mute_and_records_restore_point() {
        let mut p = state();
        p.toggle_mute();
        assert!(p.muted);
        p.set_volume(0.3);
        assert!(!p.muted);
        assert_eq!(p.volume, 0.3);
    }

    #[test]
    fn unmute_restores_exact_premute_volume() {
        let mut p = state();
        p.set_volume(0.73);
        p.toggle_mute();
        assert!(p.muted);
        assert_eq!(p.volume, 0.0);
        p.toggle_mute();
        assert!(!p.muted);
        assert_eq!(p.volume, 0.73);
    }

    #[test]
    fn unmute_without_recorded_volume_uses_default() {
        let mut p = state();
        p.set_volume(0.0); // mutes via the slider, previous stays at default
        p.previous_volume = 0.0; // simulate no non-zero level ever recorded
        p.toggle_mute();
        assert_eq!(p.volume, 0.5);
    }

    #[test]
    fn slider_stays_enabled_when_configured() {
        let cfg = PlayerConfig {
            mute_disables_slider: false,
            ..PlayerConfig::default()
        };
        let mut p = PlayerState::new(&cfg);
        p.toggle_mute();
        assert!(p.slider_enabled(&cfg));
    }

    #[test]
    fn restored_state_matches_persisted_scalars() {
        let cfg = PlayerConfig::default();
        let p = PlayerState::restored(&cfg, 0.73, false);
        assert_eq!(p.volume, 0.73);
        assert!(!p.muted);
    }

    #[test]
    fn restored_muted_state_forces_zero_volume() {
        let cfg = PlayerConfig::default();
        let p = PlayerState::restored(&cfg, 0.4, true);
        assert!(p.muted);
        assert_eq!(p.volume, 0.0);
        // And the pre-mute level survives as the restore point.
        let mut p = p;
        p.toggle_mute();
        assert_eq!(p.volume, 0.4);
    }

    #[test]
    fn playback_state_follows_element_events() {
        let mut p = state();
        p.apply_media_event(MediaEvent::LoadStart);
        assert_eq!(p.status, StreamStatus::Loading);
        p.apply_media_event(MediaEvent::Play);
        assert!(p.is_playing);
        p.apply_media_event(MediaEvent::Waiting);
        assert_eq!(p.status, StreamStatus::Buffering);
        p.apply_media_event(MediaEvent::Pause);
        assert!(!p.is_playing);
        assert_eq!(p.status, StreamStatus::Paused);
    }

    #[test]
    fn canplay_does_not_override_active_playback() {
        let mut p = state();
        p.apply_media_event(MediaEvent::Play);
        p.apply_media_event(MediaEvent::CanPlay);
        assert_eq!(p.status, StreamStatus::Playing);
    }

    #[test]
    fn rejected_play_reports_error_and_stays_paused() {
        let mut p = state();
        p.apply_media_event(MediaEvent::PlayRejected("autoplay blocked".to_string()));
        assert!(!p.is_playing);
        assert!(p.status.is_error());
        assert_eq!(p.status.label(), "Error: autoplay blocked");
    }

    #[test]
    fn stream_error_is_non_fatal_to_controls() {
        let mut p = state();
        p.apply_media_event(MediaEvent::Play);
        p.apply_media_event(MediaEvent::Error("network error".to_string()));
        assert!(!p.is_playing);
        // Volume handling still works after an error.
        p.set_volume(0.9);
        assert_eq!(p.volume, 0.9);
    }
}

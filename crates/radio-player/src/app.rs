//! The radio player app: controls, status surfaces, menu, and visualizer.

use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui::{self, Color32, RichText};
use radio_player_core::{
    MediaEvent, PlayerConfig, PlayerState, Settings, WallpaperSource, WallpaperState,
};

use crate::events::{EventQueue, SharedSpectrum, UiEvent};
use crate::ui;
use crate::Backend;

pub struct RadioApp {
    config: PlayerConfig,
    player: PlayerState,
    wallpaper: WallpaperState,
    /// Dismissible warning banner for stream errors and rejected selections.
    banner: Option<String>,
    menu_open: bool,
    url_input: String,
    spectrum: SharedSpectrum,
    events: EventQueue,
    backend: Option<Backend>,
    /// Theme last pushed into egui, to avoid resetting visuals every frame.
    applied_theme: Option<bool>,
}

impl RadioApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: PlayerConfig) -> Self {
        Self::with_config(config)
    }

    pub fn with_config(config: PlayerConfig) -> Self {
        let events = EventQueue::new();
        let spectrum: SharedSpectrum =
            Rc::new(RefCell::new(vec![0u8; (config.fft_size / 2) as usize]));

        let backend = match Backend::new(&config, events.clone(), spectrum.clone()) {
            Ok(backend) => Some(backend),
            Err(e) => {
                log::error!("backend unavailable: {e}");
                None
            }
        };

        let settings = Settings::load(&config, |key| {
            backend.as_ref().and_then(|b| b.read_setting(key))
        });
        let player = PlayerState::restored(&config, settings.volume, settings.muted);

        let mut app = Self {
            player,
            wallpaper: WallpaperState::default(),
            banner: None,
            menu_open: false,
            url_input: String::new(),
            spectrum,
            events,
            backend,
            applied_theme: None,
            config,
        };
        app.sync_audio_output();

        // Re-apply the persisted wallpaper, or fall back to the default.
        // Classification reruns either way; the theme is never persisted.
        match settings.wallpaper {
            Some(source) => app.apply_wallpaper(source, false),
            None => app.show_default_wallpaper(),
        }
        app
    }

    fn sync_audio_output(&self) {
        if let Some(backend) = &self.backend {
            backend.set_volume(self.player.volume);
            backend.set_muted(self.player.muted);
        }
    }

    fn persist_audio_settings(&self) {
        if let Some(backend) = &self.backend {
            for (key, value) in Settings::audio_pairs(self.player.volume, self.player.muted) {
                backend.write_setting(key, &value);
            }
        }
    }

    fn toggle_playback(&mut self) {
        if let Some(backend) = &mut self.backend {
            if self.player.is_playing {
                backend.pause();
            } else {
                backend.request_play();
            }
        }
        // The displayed state is corrected by the element's own events.
    }

    fn on_volume_slider(&mut self, volume: f32) {
        self.player.set_volume(volume);
        self.sync_audio_output();
        self.persist_audio_settings();
    }

    fn on_mute_toggle(&mut self) {
        self.player.toggle_mute();
        self.sync_audio_output();
        self.persist_audio_settings();
    }

    /// Apply a wallpaper and kick off its brightness classification. The
    /// visual change lands first; the theme follows when the tokened result
    /// comes back.
    fn apply_wallpaper(&mut self, source: WallpaperSource, persist: bool) {
        let generation = self.wallpaper.begin_apply(source.clone());
        if let Some(backend) = &self.backend {
            backend.show_wallpaper(source.reference());
            backend.classify_wallpaper(source.reference(), generation);
            if persist {
                for (key, value) in Settings::wallpaper_pairs(&source) {
                    backend.write_setting(key, &value);
                }
            }
        }
        self.menu_open = false;
    }

    fn show_default_wallpaper(&mut self) {
        let generation = self.wallpaper.begin_reset();
        if let Some(backend) = &self.backend {
            backend.show_wallpaper(&self.config.default_wallpaper_url);
            backend.classify_wallpaper(&self.config.default_wallpaper_url, generation);
        }
    }

    /// Reset to the default wallpaper and forget the persisted selection.
    fn reset_wallpaper(&mut self) {
        self.url_input.clear();
        if let Some(backend) = &self.backend {
            for key in Settings::wallpaper_keys() {
                backend.remove_setting(key);
            }
        }
        self.show_default_wallpaper();
        self.menu_open = false;
    }

    fn submit_wallpaper_url(&mut self) {
        let url = self.url_input.trim().to_string();
        if url.is_empty() {
            self.banner = Some("Please enter an image URL.".to_string());
            return;
        }
        if let Some(backend) = &self.backend {
            backend.validate_wallpaper_url(&url);
        }
    }

    fn open_wallpaper_picker(&mut self) {
        // Picking a file supersedes any half-typed URL.
        self.url_input.clear();
        if let Some(backend) = &self.backend {
            backend.open_wallpaper_picker(self.config.max_upload_bytes);
        }
    }

    /// Fold everything the platform reported since the last frame into the
    /// app state.
    fn drain_events(&mut self) {
        for event in self.events.drain() {
            match event {
                UiEvent::Media(media) => {
                    if let MediaEvent::Error(msg) | MediaEvent::PlayRejected(msg) = &media {
                        self.banner = Some(msg.clone());
                    }
                    self.player.apply_media_event(media);
                }
                UiEvent::Classified { generation, is_light } => {
                    self.wallpaper.finish_classification(generation, is_light);
                }
                UiEvent::WallpaperPicked { data_url } => {
                    self.url_input.clear();
                    self.apply_wallpaper(WallpaperSource::Data(data_url), true);
                }
                UiEvent::UrlValidated(url) => {
                    self.url_input.clear();
                    self.apply_wallpaper(WallpaperSource::Url(url), true);
                }
                UiEvent::WallpaperRejected(msg) | UiEvent::UrlRejected(msg) => {
                    self.banner = Some(msg);
                }
            }
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let want_light = self.wallpaper.theme_is_light;
        if self.applied_theme != Some(want_light) {
            ctx.set_visuals(if want_light {
                egui::Visuals::light()
            } else {
                egui::Visuals::dark()
            });
            self.applied_theme = Some(want_light);
        }
    }

    fn draw_menu_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Settings");
        ui.separator();

        ui.label("Background from URL:");
        ui.add(
            egui::TextEdit::singleline(&mut self.url_input)
                .hint_text("https://example.org/image.jpg"),
        );
        if ui.button("Apply URL").clicked() {
            self.submit_wallpaper_url();
        }

        ui.add_space(8.0);
        if ui.button("Upload image…").clicked() {
            self.open_wallpaper_picker();
        }
        ui.label(
            RichText::new("Up to 5 MiB")
                .small()
                .color(Color32::GRAY),
        );

        ui.add_space(8.0);
        if ui.button("Reset background").clicked() {
            self.reset_wallpaper();
        }
    }

    fn draw_banner(&mut self, ui: &mut egui::Ui) {
        let mut dismissed = false;
        if let Some(msg) = &self.banner {
            egui::Frame::new()
                .fill(Color32::from_rgba_unmultiplied(120, 40, 40, 220))
                .corner_radius(egui::CornerRadius::same(4))
                .inner_margin(egui::Margin::same(6))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.colored_label(Color32::WHITE, format!("⚠ {msg}"));
                        if ui.small_button("✕").clicked() {
                            dismissed = true;
                        }
                    });
                });
        }
        if dismissed {
            self.banner = None;
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let play_icon = if self.player.is_playing { "⏸" } else { "▶" };
            if ui.button(RichText::new(play_icon).size(24.0)).clicked() {
                self.toggle_playback();
            }

            ui.add_space(12.0);

            let icon = ui::volume_icon(self.player.volume, self.player.muted);
            if ui.button(icon).clicked() {
                self.on_mute_toggle();
            }

            let mut volume = self.player.volume;
            let enabled = self.player.slider_enabled(&self.config);
            let response = ui.add_enabled(
                enabled,
                egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false),
            );
            if response.changed() {
                self.on_volume_slider(volume);
            }
        });

        let status = &self.player.status;
        let color = if status.is_error() {
            Color32::from_rgb(255, 100, 100)
        } else {
            Color32::GRAY
        };
        ui.colored_label(color, status.label());
    }
}

impl eframe::App for RadioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        self.apply_theme(ctx);

        // The visualizer animates continuously for the page's lifetime.
        ctx.request_repaint();

        let mut toggle_rect = egui::Rect::NOTHING;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let icon = if self.menu_open { "✕" } else { "☰" };
                let response = ui.button(icon);
                toggle_rect = response.rect;
                if response.clicked() {
                    self.menu_open = !self.menu_open;
                }
                ui.heading("Internet Radio");
            });
        });

        let mut menu_rect = egui::Rect::NOTHING;
        if self.menu_open {
            let response = egui::SidePanel::left("settings_menu")
                .resizable(false)
                .default_width(240.0)
                .show(ctx, |ui| {
                    self.draw_menu_panel(ui);
                });
            menu_rect = response.response.rect;
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::new())
            .show(ctx, |ui| {
                self.draw_banner(ui);
                self.draw_controls(ui);

                // The remaining area tracks the viewport; each frame redraws
                // the bars at whatever size is current.
                let rect = ui.available_rect_before_wrap();
                ui.allocate_rect(rect, egui::Sense::hover());
                ui::draw_visualizer(ui.painter(), rect, &self.spectrum.borrow());
            });

        // Clicking anywhere outside the open menu (and its toggle) closes it.
        if self.menu_open {
            let pressed_outside = ctx.input(|i| {
                i.pointer.any_pressed()
                    && i.pointer.press_origin().is_some_and(|pos| {
                        !menu_rect.contains(pos) && !toggle_rect.contains(pos)
                    })
            });
            if pressed_outside {
                self.menu_open = false;
            }
        }
    }

    // Let the wallpaper behind the canvas show through.
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_player_core::StreamStatus;

    fn app() -> RadioApp {
        RadioApp::with_config(PlayerConfig::default())
    }

    #[test]
    fn startup_classifies_the_default_wallpaper() {
        let mut app = app();
        assert!(app.wallpaper.current().is_none());
        app.drain_events();
        // The stub backend reports the dark fallback for the default image.
        assert!(!app.wallpaper.theme_is_light);
    }

    #[test]
    fn rejected_play_surfaces_a_banner_and_stays_paused() {
        let mut app = app();
        app.toggle_playback();
        app.drain_events();
        assert!(!app.player.is_playing);
        assert!(app.player.status.is_error());
        assert!(app.banner.is_some());
    }

    #[test]
    fn validated_url_becomes_the_current_wallpaper() {
        let mut app = app();
        app.drain_events();
        app.url_input = " https://example.org/bg.jpg ".to_string();
        app.submit_wallpaper_url();
        app.drain_events();
        assert_eq!(
            app.wallpaper.current(),
            Some(&WallpaperSource::Url("https://example.org/bg.jpg".to_string()))
        );
        assert!(app.url_input.is_empty());
    }

    #[test]
    fn empty_url_submission_only_warns() {
        let mut app = app();
        app.drain_events();
        app.submit_wallpaper_url();
        assert_eq!(app.banner.as_deref(), Some("Please enter an image URL."));
        assert!(app.wallpaper.current().is_none());
    }

    #[test]
    fn picked_file_clears_the_pending_url_input() {
        let mut app = app();
        app.drain_events();
        app.url_input = "half-typed".to_string();
        app.events.push(UiEvent::WallpaperPicked {
            data_url: "data:image/png;base64,AAAA".to_string(),
        });
        app.drain_events();
        assert!(app.url_input.is_empty());
        assert_eq!(
            app.wallpaper.current().map(WallpaperSource::kind),
            Some("data")
        );
    }

    #[test]
    fn rejected_upload_leaves_the_active_wallpaper_unchanged() {
        let mut app = app();
        app.drain_events();
        app.events
            .push(UiEvent::UrlValidated("https://example.org/a.jpg".to_string()));
        app.drain_events();
        let before = app.wallpaper.current().cloned();
        app.events
            .push(UiEvent::WallpaperRejected("image is too large".to_string()));
        app.drain_events();
        assert_eq!(app.wallpaper.current().cloned(), before);
        assert!(app.banner.is_some());
    }

    #[test]
    fn stream_error_keeps_controls_usable() {
        let mut app = app();
        app.events.push(UiEvent::Media(MediaEvent::Error(
            "a network error interrupted the stream".to_string(),
        )));
        app.drain_events();
        assert!(matches!(app.player.status, StreamStatus::Error(_)));
        app.on_volume_slider(0.9);
        assert_eq!(app.player.volume, 0.9);
    }

    #[test]
    fn applying_a_wallpaper_closes_the_menu() {
        let mut app = app();
        app.drain_events();
        app.menu_open = true;
        app.apply_wallpaper(
            WallpaperSource::Url("https://example.org/a.jpg".to_string()),
            true,
        );
        assert!(!app.menu_open);
    }
}

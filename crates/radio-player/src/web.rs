//! Browser backend: media element, analyser graph, localStorage, wallpaper
//! decoding. Only compiled for wasm32.
//!
//! All platform callbacks push into the shared [`EventQueue`]; the app never
//! mutates its own state from inside a closure.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use radio_player_core::{brightness, wallpaper, MediaEvent, PlayerConfig};

use crate::events::{BackendError, EventQueue, SharedSpectrum, UiEvent};

const AUDIO_ELEMENT_ID: &str = "radio_stream";
const FILE_INPUT_ID: &str = "wallpaper_file_input";

pub struct Backend {
    audio: web_sys::HtmlAudioElement,
    audio_ctx: Option<web_sys::AudioContext>,
    // Analyser setup must happen once, after a user gesture; re-invocation
    // is a no-op.
    analyser_initialized: bool,
    events: EventQueue,
    spectrum: SharedSpectrum,
    fft_size: u32,
    threshold: f32,
}

fn js_err(value: &JsValue) -> BackendError {
    BackendError::Platform(format!("{value:?}"))
}

fn window() -> Result<web_sys::Window, BackendError> {
    web_sys::window().ok_or_else(|| BackendError::Platform("no window".to_string()))
}

fn document() -> Result<web_sys::Document, BackendError> {
    window()?
        .document()
        .ok_or_else(|| BackendError::Platform("no document".to_string()))
}

/// Human-readable message for a media element error code.
fn media_error_message(error: Option<web_sys::MediaError>) -> String {
    let msg = match error.map(|e| e.code()) {
        Some(code) if code == web_sys::MediaError::MEDIA_ERR_ABORTED => "playback was aborted",
        Some(code) if code == web_sys::MediaError::MEDIA_ERR_NETWORK => {
            "a network error interrupted the stream"
        }
        Some(code) if code == web_sys::MediaError::MEDIA_ERR_DECODE => {
            "the stream could not be decoded"
        }
        Some(code) if code == web_sys::MediaError::MEDIA_ERR_SRC_NOT_SUPPORTED => {
            "the stream format is not supported"
        }
        _ => "unknown stream error",
    };
    msg.to_string()
}

impl Backend {
    pub fn new(
        config: &PlayerConfig,
        events: EventQueue,
        spectrum: SharedSpectrum,
    ) -> Result<Self, BackendError> {
        let document = document()?;
        let audio = match document
            .get_element_by_id(AUDIO_ELEMENT_ID)
            .and_then(|el| el.dyn_into::<web_sys::HtmlAudioElement>().ok())
        {
            Some(audio) => audio,
            None => {
                let audio = document
                    .create_element("audio")
                    .map_err(|e| js_err(&e))?
                    .dyn_into::<web_sys::HtmlAudioElement>()
                    .map_err(|e| js_err(&e))?;
                audio.set_id(AUDIO_ELEMENT_ID);
                audio.set_cross_origin(Some("anonymous"));
                audio.set_preload("none");
                document
                    .body()
                    .ok_or_else(|| BackendError::Platform("no body".to_string()))?
                    .append_child(&audio)
                    .map_err(|e| js_err(&e))?;
                audio
            }
        };
        audio.set_src(&config.stream_url);

        let backend = Self {
            audio,
            audio_ctx: None,
            analyser_initialized: false,
            events,
            spectrum,
            fft_size: config.fft_size,
            threshold: config.brightness_threshold,
        };
        backend.hook_media_events()?;
        Ok(backend)
    }

    /// Mirror the element's own state changes into the event queue; the
    /// displayed play/pause state is derived from these, never assumed.
    fn hook_media_events(&self) -> Result<(), BackendError> {
        let simple = [
            ("play", MediaEvent::Play),
            ("pause", MediaEvent::Pause),
            ("waiting", MediaEvent::Waiting),
            ("canplay", MediaEvent::CanPlay),
            ("loadstart", MediaEvent::LoadStart),
        ];
        for (name, event) in simple {
            let events = self.events.clone();
            let callback = Closure::wrap(Box::new(move || {
                events.push(UiEvent::Media(event.clone()));
            }) as Box<dyn FnMut()>);
            self.audio
                .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
                .map_err(|e| js_err(&e))?;
            callback.forget();
        }

        let events = self.events.clone();
        let audio = self.audio.clone();
        let on_error = Closure::wrap(Box::new(move || {
            let msg = media_error_message(audio.error());
            events.push(UiEvent::Media(MediaEvent::Error(msg)));
        }) as Box<dyn FnMut()>);
        self.audio
            .add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref())
            .map_err(|e| js_err(&e))?;
        on_error.forget();
        Ok(())
    }

    /// Build the analysis graph on the first play gesture: media source ->
    /// analyser -> destination, so the tap does not alter what is heard. A
    /// 16ms interval polls frequency data into the shared buffer for the
    /// page's lifetime.
    fn ensure_analyser(&mut self) {
        if self.analyser_initialized {
            return;
        }
        if let Err(e) = self.init_analyser() {
            web_sys::console::warn_1(&format!("analyser init failed: {e}").into());
        }
    }

    fn init_analyser(&mut self) -> Result<(), BackendError> {
        let ctx = web_sys::AudioContext::new().map_err(|e| js_err(&e))?;
        let analyser = ctx.create_analyser().map_err(|e| js_err(&e))?;
        analyser.set_fft_size(self.fft_size);
        analyser.set_smoothing_time_constant(0.8);

        let source = ctx
            .create_media_element_source(&self.audio)
            .map_err(|e| js_err(&e))?;
        // A media element accepts exactly one source node, and creating it
        // reroutes the element's output into this context for good. The
        // graph is committed from here on: never retry source creation.
        self.analyser_initialized = true;
        self.audio_ctx = Some(ctx.clone());

        let tapped = source
            .connect_with_audio_node(&analyser)
            .and_then(|_| analyser.connect_with_audio_node(&ctx.destination()));
        if let Err(e) = tapped {
            // Keep the stream audible even without a spectrum tap.
            source
                .connect_with_audio_node(&ctx.destination())
                .map_err(|err| js_err(&err))?;
            return Err(js_err(&e));
        }

        let spectrum = self.spectrum.clone();
        let poll = Closure::wrap(Box::new(move || {
            let len = analyser.frequency_bin_count() as usize;
            let mut data = vec![0u8; len];
            analyser.get_byte_frequency_data(&mut data);
            *spectrum.borrow_mut() = data;
        }) as Box<dyn Fn()>);
        window()?
            .set_interval_with_callback_and_timeout_and_arguments_0(
                poll.as_ref().unchecked_ref(),
                16, // ~60fps
            )
            .map_err(|e| js_err(&e))?;
        poll.forget();
        Ok(())
    }

    /// Start playback. A rejected promise (e.g. blocked autoplay) becomes a
    /// `PlayRejected` event; the button state is corrected by the element's
    /// own events either way.
    pub fn request_play(&mut self) {
        self.ensure_analyser();
        if let Some(ctx) = &self.audio_ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
        let events = self.events.clone();
        match self.audio.play() {
            Ok(promise) => {
                spawn_local(async move {
                    if let Err(e) = JsFuture::from(promise).await {
                        let msg = e
                            .as_string()
                            .unwrap_or_else(|| "playback was rejected by the browser".to_string());
                        events.push(UiEvent::Media(MediaEvent::PlayRejected(msg)));
                    }
                });
            }
            Err(e) => {
                events.push(UiEvent::Media(MediaEvent::PlayRejected(format!("{e:?}"))));
            }
        }
    }

    pub fn pause(&self) {
        self.audio.pause().ok();
    }

    pub fn set_volume(&self, volume: f32) {
        self.audio.set_volume(f64::from(volume));
    }

    pub fn set_muted(&self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    pub fn read_setting(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    pub fn write_setting(&self, key: &str, value: &str) {
        if let Some(storage) = self.storage() {
            if storage.set_item(key, value).is_err() {
                web_sys::console::warn_1(&format!("could not persist {key}").into());
            }
        }
    }

    pub fn remove_setting(&self, key: &str) {
        if let Some(storage) = self.storage() {
            storage.remove_item(key).ok();
        }
    }

    /// Cover-fit, centered, non-repeating body background.
    pub fn show_wallpaper(&self, reference: &str) {
        let Some(body) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
        else {
            return;
        };
        let style = body.style();
        style
            .set_property("background-image", &format!("url('{reference}')"))
            .ok();
        style.set_property("background-size", "cover").ok();
        style.set_property("background-repeat", "no-repeat").ok();
        style
            .set_property("background-position", "center center")
            .ok();
    }

    /// Decode the image off-screen and classify its average brightness.
    /// Every failure path reports the dark default for this generation; a
    /// background always resolves to some theme decision.
    pub fn classify_wallpaper(&self, reference: &str, generation: u64) {
        let events = self.events.clone();
        let threshold = self.threshold;
        let Ok(img) = web_sys::HtmlImageElement::new() else {
            events.push(UiEvent::Classified { generation, is_light: false });
            return;
        };
        // Required to read pixel data from cross-origin URLs.
        img.set_cross_origin(Some("anonymous"));

        let img_for_load = img.clone();
        let events_for_load = events.clone();
        let onload = Closure::wrap(Box::new(move || {
            let is_light = read_pixels(&img_for_load)
                .is_some_and(|rgba| brightness::is_light(&rgba, threshold));
            events_for_load.push(UiEvent::Classified { generation, is_light });
        }) as Box<dyn FnMut()>);

        let onerror = Closure::wrap(Box::new(move || {
            events.push(UiEvent::Classified { generation, is_light: false });
        }) as Box<dyn FnMut()>);

        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
        img.set_src(reference);
    }

    /// Attempt a decode before applying a URL wallpaper; a background that
    /// cannot be decoded is never applied.
    pub fn validate_wallpaper_url(&self, url: &str) {
        let Ok(img) = web_sys::HtmlImageElement::new() else {
            self.events
                .push(UiEvent::UrlRejected("could not create a test image".to_string()));
            return;
        };
        let url_owned = url.to_string();
        let events_for_load = self.events.clone();
        let onload = Closure::wrap(Box::new(move || {
            events_for_load.push(UiEvent::UrlValidated(url_owned.clone()));
        }) as Box<dyn FnMut()>);

        let url_for_error = url.to_string();
        let events_for_error = self.events.clone();
        let onerror = Closure::wrap(Box::new(move || {
            events_for_error.push(UiEvent::UrlRejected(format!(
                "Invalid image URL or unable to load image: {url_for_error}"
            )));
        }) as Box<dyn FnMut()>);

        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();
        img.set_src(url);
    }

    /// Open a hidden file input. The size gate runs before any read; files
    /// within the limit are converted to a data URL for embedding.
    pub fn open_wallpaper_picker(&self, max_bytes: u64) {
        let Ok(document) = document() else { return };
        let input = match document
            .get_element_by_id(FILE_INPUT_ID)
            .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            Some(input) => input,
            None => {
                let Some(input) = document
                    .create_element("input")
                    .ok()
                    .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
                else {
                    return;
                };
                input.set_type("file");
                input.set_id(FILE_INPUT_ID);
                input.set_accept("image/*");
                input.style().set_property("display", "none").ok();
                if let Some(body) = document.body() {
                    body.append_child(&input).ok();
                }
                input
            }
        };

        let events = self.events.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let input = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());
            if let Some(input) = input {
                if let Some(file) = input.files().and_then(|files| files.get(0)) {
                    let size = file.size() as u64;
                    if let Err(e) = wallpaper::check_upload_size(size, max_bytes) {
                        events.push(UiEvent::WallpaperRejected(e.to_string()));
                    } else if let Ok(reader) = web_sys::FileReader::new() {
                        let reader_for_load = reader.clone();
                        let events_for_load = events.clone();
                        let onload = Closure::wrap(Box::new(move || {
                            if let Some(data_url) = reader_for_load
                                .result()
                                .ok()
                                .and_then(|v| v.as_string())
                            {
                                events_for_load.push(UiEvent::WallpaperPicked { data_url });
                            }
                        }) as Box<dyn FnMut()>);
                        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
                        onload.forget();
                        if reader.read_as_data_url(&file).is_err() {
                            events.push(UiEvent::WallpaperRejected(
                                "could not read the selected file".to_string(),
                            ));
                        }
                    }
                }
                input.set_value(""); // Reset for next use
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        input.set_onchange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();

        input.click();
    }
}

/// Draw the decoded image to an off-screen canvas at natural resolution and
/// pull its RGBA bytes. `None` when pixel data cannot be read (cross-origin
/// taint, zero-sized image).
fn read_pixels(img: &web_sys::HtmlImageElement) -> Option<Vec<u8>> {
    let document = web_sys::window()?.document()?;
    let width = img.natural_width();
    let height = img.natural_height();
    if width == 0 || height == 0 {
        return None;
    }
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")
        .ok()??
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .ok()?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0).ok()?;
    let image_data = ctx
        .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
        .ok()?;
    Some(image_data.data().0)
}

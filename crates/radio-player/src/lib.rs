//! Browser internet-radio player: play/pause and volume controls bound to a
//! streaming audio element, a frequency visualizer, a slide-out settings
//! panel, and user-chosen background imagery with brightness-adaptive
//! theming. Compiled to WebAssembly and mounted on a host canvas; the
//! non-wasm build carries an inert backend so the app logic tests natively.

pub mod app;
pub mod events;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::Backend;

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(not(target_arch = "wasm32"))]
pub use native::Backend;

pub use app::RadioApp;

// WASM entry point
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsCast;

    console_error_panic_hook::set_once();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("no global window exists")
            .document()
            .expect("should have a document on window");

        let canvas = document
            .get_element_by_id("radio_player_canvas")
            .expect("no canvas element with id 'radio_player_canvas'")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("element with id 'radio_player_canvas' is not a canvas");

        // Host pages can override defaults through a JSON data attribute.
        let config = canvas
            .get_attribute("data-config")
            .map(|json| radio_player_core::PlayerConfig::from_json(&json))
            .unwrap_or_default();

        let web_options = eframe::WebOptions::default();

        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(move |cc| Ok(Box::new(RadioApp::new(cc, config)))),
            )
            .await
            .expect("Failed to start eframe");
    });

    Ok(())
}

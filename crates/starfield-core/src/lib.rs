//! Interactive starfield background and message form, compiled to
//! WebAssembly.
//!
//! The page calls [`mount`] once. It draws a field of stars that shy away
//! from the mouse and ease back to rest. It also forwards the form's text to
//! a PostgREST-style table and reports progress in a status line.
//!
//! [`StarField`] is exported on its own for pages that render the field
//! themselves.

use wasm_bindgen::prelude::*;

// `println!`-style logging to the browser console.
macro_rules! console_log {
    ( $( $t:tt )* ) => {
        web_sys::console::log_1(&format!( $( $t )* ).into())
    }
}

macro_rules! console_error {
    ( $( $t:tt )* ) => {
        web_sys::console::error_1(&format!( $( $t )* ).into())
    }
}

pub mod canvas;
pub mod config;
pub mod error;
pub mod field;
pub mod sink;
pub mod submit;

pub use config::{MountConfig, PageConfig, RemoteConfig};
pub use error::SubmitError;
pub use field::{Pointer, Star, StarField};
pub use submit::{Status, Submission};

/// Wires the starfield and the message form into the current document.
///
/// `options` may be `undefined` or an object with any of `canvasId`,
/// `formId`, `inputId`, `statusId`, `remoteUrl`, `remoteKey` and `table`.
#[wasm_bindgen]
pub fn mount(options: JsValue) -> Result<(), JsValue> {
    let config = MountConfig::from_options(&options);
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let seed = (js_sys::Math::random() * u32::MAX as f64) as u32;
    canvas::attach(&window, &document, &config.page.canvas_id, seed)?;

    if !config.remote.is_configured() {
        console_log!("remote sink not configured; submissions will be refused");
    }
    submit::attach(&document, &config.page, config.remote)?;
    Ok(())
}

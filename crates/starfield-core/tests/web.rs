//! Browser tests: run with `wasm-pack test --headless --firefox crates/starfield-core`.
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use js_sys::{Object, Promise, Reflect};
use starfield_core::mount;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Event, EventInit, HtmlFormElement, HtmlInputElement, Response, ResponseInit};

wasm_bindgen_test_configure!(run_in_browser);

/// Builds a canvas + form fixture with ids suffixed by `tag` and returns the
/// options object that points `mount` at it. Without `configured` the
/// credentials are blank.
fn fixture(tag: &str, configured: bool) -> JsValue {
    let document = web_sys::window().unwrap().document().unwrap();
    let container = document.create_element("div").unwrap();
    container.set_inner_html(&format!(
        r#"<canvas id="canvas-{tag}"></canvas>
           <form id="form-{tag}">
             <input id="input-{tag}" type="text">
             <p id="status-{tag}"></p>
           </form>"#
    ));
    document.body().unwrap().append_child(&container).unwrap();

    let options = Object::new();
    for (key, value) in [
        ("canvasId", format!("canvas-{tag}")),
        ("formId", format!("form-{tag}")),
        ("inputId", format!("input-{tag}")),
        ("statusId", format!("status-{tag}")),
        ("remoteUrl", if configured { "https://stub.invalid".into() } else { String::new() }),
        ("remoteKey", if configured { "anon-key".into() } else { String::new() }),
    ] {
        Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_str(&value)).unwrap();
    }
    options.into()
}

/// Replaces `window.fetch` with a counter that answers every request with
/// `201 Created`. Dropping the guard puts the real fetch back.
struct FetchStub {
    calls: Rc<Cell<u32>>,
    original: JsValue,
    _handler: Closure<dyn FnMut(JsValue) -> Promise>,
}

impl FetchStub {
    fn install() -> Self {
        let window = web_sys::window().unwrap();
        let original = Reflect::get(&window, &JsValue::from_str("fetch")).unwrap();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let handler = Closure::<dyn FnMut(JsValue) -> Promise>::new(move |_req: JsValue| {
            counter.set(counter.get() + 1);
            let init = ResponseInit::new();
            init.set_status(201);
            let response = Response::new_with_opt_str_and_init(None, &init).unwrap();
            Promise::resolve(&response)
        });
        Reflect::set(&window, &JsValue::from_str("fetch"), handler.as_ref()).unwrap();
        FetchStub {
            calls,
            original,
            _handler: handler,
        }
    }

    fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl Drop for FetchStub {
    fn drop(&mut self) {
        let window = web_sys::window().unwrap();
        let _ = Reflect::set(&window, &JsValue::from_str("fetch"), &self.original);
    }
}

fn by_id<T: JsCast>(id: &str) -> T {
    web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .get_element_by_id(id)
        .unwrap()
        .dyn_into::<T>()
        .unwrap()
}

fn submit(tag: &str) -> bool {
    let init = EventInit::new();
    init.set_cancelable(true);
    let ev = Event::new_with_event_init_dict("submit", &init).unwrap();
    by_id::<HtmlFormElement>(&format!("form-{tag}"))
        .dispatch_event(&ev)
        .unwrap()
}

async fn sleep(ms: i32) {
    let promise = Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn status_text(tag: &str) -> String {
    by_id::<web_sys::Element>(&format!("status-{tag}"))
        .text_content()
        .unwrap_or_default()
}

#[wasm_bindgen_test]
fn mount_fails_on_missing_canvas() {
    let options = fixture("missing", false);
    Reflect::set(&options, &JsValue::from_str("canvasId"), &JsValue::from_str("no-such-canvas"))
        .unwrap();
    assert!(mount(options).is_err());
}

#[wasm_bindgen_test]
fn mount_sizes_canvas_to_viewport() {
    mount(fixture("size", false)).unwrap();
    let window = web_sys::window().unwrap();
    let canvas = by_id::<web_sys::HtmlCanvasElement>("canvas-size");
    let width = window.inner_width().unwrap().as_f64().unwrap();
    assert_eq!(canvas.width(), width as u32);
}

#[wasm_bindgen_test]
async fn empty_submit_is_ignored() {
    let fetch = FetchStub::install();
    mount(fixture("empty", true)).unwrap();
    // default navigation is always prevented
    assert!(!submit("empty"));
    sleep(20).await;
    assert_eq!(status_text("empty"), "");
    assert_eq!(fetch.calls(), 0);
}

#[wasm_bindgen_test]
async fn delivered_submit_resets_form_and_clears_status() {
    let fetch = FetchStub::install();
    mount(fixture("sent", true)).unwrap();
    let input = by_id::<HtmlInputElement>("input-sent");
    input.set_value("anyone there?");

    submit("sent");
    assert_eq!(status_text("sent"), "Transmitting...");

    sleep(20).await;
    assert_eq!(fetch.calls(), 1);
    assert_eq!(status_text("sent"), "Sent.");
    assert_eq!(input.value(), "");

    sleep(3100).await;
    assert_eq!(status_text("sent"), "");
    assert_eq!(fetch.calls(), 1);
}

#[wasm_bindgen_test]
async fn unconfigured_submit_reports_and_keeps_text() {
    let fetch = FetchStub::install();
    mount(fixture("unconfigured", false)).unwrap();
    let input = by_id::<HtmlInputElement>("input-unconfigured");
    input.set_value("hello?");

    submit("unconfigured");
    sleep(20).await;

    assert!(status_text("unconfigured").contains("not configured"));
    assert_eq!(input.value(), "hello?");
    assert_eq!(fetch.calls(), 0);
}

use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, MouseEvent, Window};

use crate::field::StarField;
use crate::submit::element_by_id;

pub const STAR_FILL: &str = "rgba(255, 255, 255, 0.8)";

/// The canvas, its 2D context and the field drawn onto it.
pub struct Stage {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    field: StarField,
}

impl Stage {
    pub fn new(canvas: HtmlCanvasElement, seed: u32) -> Result<Stage, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Stage {
            canvas,
            ctx,
            field: StarField::new(seed),
        })
    }

    /// Matches the surface to the viewport and reseeds the whole field.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.max(0.0) as u32);
        self.canvas.set_height(height.max(0.0) as u32);
        self.field.resize(width, height);
        console_log!(
            "starfield: {}x{}, {} stars",
            self.field.width(),
            self.field.height(),
            self.field.len()
        );
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.field.set_pointer(x, y);
    }

    /// One display frame: clear, advance every star, draw every star.
    pub fn frame(&mut self) -> Result<(), JsValue> {
        self.ctx.clear_rect(0.0, 0.0, self.field.width(), self.field.height());
        self.field.step();
        self.ctx.set_fill_style_str(STAR_FILL);
        for star in self.field.stars() {
            self.ctx.begin_path();
            self.ctx.arc(star.x(), star.y(), star.size(), 0.0, TAU)?;
            self.ctx.close_path();
            self.ctx.fill();
        }
        Ok(())
    }
}

fn viewport(window: &Window) -> (f64, f64) {
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height)
}

fn request_frame(window: &Window, f: &Closure<dyn FnMut()>) {
    if window.request_animation_frame(f.as_ref().unchecked_ref()).is_err() {
        console_error!("requestAnimationFrame failed; animation stopped");
    }
}

/// Sizes the canvas, hooks resize and pointer tracking, and starts the
/// frame loop. Everything registered here lives as long as the page.
pub fn attach(
    window: &Window,
    document: &Document,
    canvas_id: &str,
    seed: u32,
) -> Result<(), JsValue> {
    let canvas = element_by_id(document, canvas_id)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| JsValue::from_str(&format!("#{canvas_id} is not a canvas")))?;
    let stage = Rc::new(RefCell::new(Stage::new(canvas, seed)?));

    let (width, height) = viewport(window);
    stage.borrow_mut().resize(width, height);

    let on_resize = {
        let stage = stage.clone();
        let window = window.clone();
        Closure::<dyn FnMut()>::new(move || {
            let (width, height) = viewport(&window);
            stage.borrow_mut().resize(width, height);
        })
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();

    let on_move = {
        let stage = stage.clone();
        Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
            stage.borrow_mut().set_pointer(ev.client_x() as f64, ev.client_y() as f64);
        })
    };
    window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();

    // The frame closure re-arms itself through this slot.
    let slot: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let first = slot.clone();
    let loop_window = window.clone();
    *first.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
        if let Err(err) = stage.borrow_mut().frame() {
            console_error!("frame failed: {:?}", err);
        }
        if let Some(f) = slot.borrow().as_ref() {
            request_frame(&loop_window, f);
        }
    }));
    if let Some(f) = first.borrow().as_ref() {
        request_frame(window, f);
    }
    Ok(())
}

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
};

use crate::config::{PageConfig, RemoteConfig};
use crate::error::SubmitError;
use crate::sink;

pub const TRANSMITTING_TEXT: &str = "Transmitting...";
pub const SENT_TEXT: &str = "Sent.";
pub const CLEAR_DELAY_MS: i32 = 3000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Idle,
    Transmitting,
    Sent,
    Failed(String),
}

impl Status {
    pub fn text(&self) -> &str {
        match self {
            Status::Idle => "",
            Status::Transmitting => TRANSMITTING_TEXT,
            Status::Sent => SENT_TEXT,
            Status::Failed(message) => message,
        }
    }
}

/// What the page should do once an attempt settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Reset the form and schedule the status clear for this attempt.
    Delivered(u32),
    /// Leave the form as it is.
    Failed,
    /// A newer attempt owns the status; nothing to do.
    Stale,
}

/// Status of the most recent submission attempt.
///
/// Attempts are numbered so that a settle or delayed clear belonging to an
/// older attempt never overwrites a newer one.
#[derive(Debug)]
pub struct Submission {
    status: Status,
    attempt: u32,
}

impl Default for Submission {
    fn default() -> Self {
        Self::new()
    }
}

impl Submission {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
            attempt: 0,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Starts a new attempt for `text`, or returns `None` without touching
    /// anything when there is nothing to send.
    pub fn begin(&mut self, text: &str) -> Option<u32> {
        if text.is_empty() {
            return None;
        }
        self.attempt = self.attempt.wrapping_add(1);
        self.status = Status::Transmitting;
        Some(self.attempt)
    }

    pub fn settle(&mut self, attempt: u32, result: Result<(), SubmitError>) -> Outcome {
        if attempt != self.attempt {
            return Outcome::Stale;
        }
        match result {
            Ok(()) => {
                self.status = Status::Sent;
                Outcome::Delivered(attempt)
            }
            Err(err) => {
                self.status = Status::Failed(err.status_message());
                Outcome::Failed
            }
        }
    }

    /// Delayed clear after a successful send. Returns whether the status
    /// changed.
    pub fn expire(&mut self, attempt: u32) -> bool {
        if attempt == self.attempt && self.status == Status::Sent {
            self.status = Status::Idle;
            true
        } else {
            false
        }
    }
}

/// The form, its text control and the status line, bound together.
struct FormView {
    form: HtmlFormElement,
    input: TextControl,
    status: Element,
}

enum TextControl {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl TextControl {
    fn from_element(el: Element, id: &str) -> Result<Self, JsValue> {
        let el = match el.dyn_into::<HtmlInputElement>() {
            Ok(input) => return Ok(TextControl::Input(input)),
            Err(el) => el,
        };
        el.dyn_into::<HtmlTextAreaElement>()
            .map(TextControl::TextArea)
            .map_err(|_| JsValue::from_str(&format!("#{id} is not a text input")))
    }

    fn value(&self) -> String {
        match self {
            TextControl::Input(el) => el.value(),
            TextControl::TextArea(el) => el.value(),
        }
    }
}

impl FormView {
    fn show(&self, status: &Status) {
        self.status.set_text_content(Some(status.text()));
    }
}

/// Wires the submit handler onto the page's form.
pub fn attach(
    document: &Document,
    page: &PageConfig,
    remote: RemoteConfig,
) -> Result<(), JsValue> {
    let form = element_by_id(document, &page.form_id)?
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| JsValue::from_str(&format!("#{} is not a form", page.form_id)))?;
    let input = element_by_id(document, &page.input_id)?;
    let input = TextControl::from_element(input, &page.input_id)?;
    let status = element_by_id(document, &page.status_id)?;

    let view = Rc::new(FormView {
        form,
        input,
        status,
    });
    let state = Rc::new(RefCell::new(Submission::new()));
    let remote = Rc::new(remote);

    let on_submit = {
        let view = view.clone();
        Closure::<dyn FnMut(Event)>::new(move |ev: Event| {
            ev.prevent_default();
            let text = view.input.value();
            let Some(attempt) = state.borrow_mut().begin(&text) else {
                return;
            };
            view.status.set_class_name("");
            view.show(state.borrow().status());

            let view = view.clone();
            let state = state.clone();
            let remote = remote.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = sink::append(&remote, &text).await;
                if let Err(err) = &result {
                    console_error!("submission failed: {err}");
                }
                let outcome = state.borrow_mut().settle(attempt, result);
                match outcome {
                    Outcome::Delivered(attempt) => {
                        view.show(state.borrow().status());
                        view.form.reset();
                        schedule_clear(view, state, attempt);
                    }
                    Outcome::Failed => view.show(state.borrow().status()),
                    Outcome::Stale => {}
                }
            });
        })
    };
    view.form
        .add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;
    on_submit.forget();
    Ok(())
}

fn schedule_clear(view: Rc<FormView>, state: Rc<RefCell<Submission>>, attempt: u32) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::<dyn FnMut()>::once(move || {
        if state.borrow_mut().expire(attempt) {
            view.show(state.borrow().status());
        }
    });
    match window.set_timeout_with_callback_and_timeout_and_arguments_0(
        cb.as_ref().unchecked_ref(),
        CLEAR_DELAY_MS,
    ) {
        Ok(_) => cb.forget(),
        Err(_) => console_error!("could not schedule status clear"),
    }
}

pub(crate) fn element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

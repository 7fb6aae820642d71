use js_sys::Reflect;
use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::config::RemoteConfig;
use crate::error::SubmitError;

#[derive(Serialize)]
struct Record<'a> {
    content: &'a str,
}

/// PostgREST error body. Only `message` is surfaced.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// A fully-formed insert call, kept as plain data until it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl InsertRequest {
    pub fn new(config: &RemoteConfig, content: &str) -> Result<Self, SubmitError> {
        let url = config.endpoint()?;
        let key = config.access_key.trim();
        let body = serde_json::to_string(&[Record { content }])?;
        Ok(Self {
            url,
            headers: vec![
                ("apikey", key.to_string()),
                ("Authorization", format!("Bearer {key}")),
                ("Content-Type", "application/json".to_string()),
                ("Prefer", "return=minimal".to_string()),
            ],
            body,
        })
    }

    fn to_request(&self) -> Result<Request, JsValue> {
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_mode(RequestMode::Cors);
        init.set_body(&JsValue::from_str(&self.body));
        let request = Request::new_with_str_and_init(&self.url, &init)?;
        let headers = request.headers();
        for (name, value) in &self.headers {
            headers.set(name, value)?;
        }
        Ok(request)
    }
}

/// Maps a non-2xx response body to the error the user sees.
pub fn remote_error(status: u16, body: &str) -> SubmitError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_default();
    SubmitError::Remote { status, message }
}

/// Appends one `{content}` row to the configured table. One attempt, no
/// retry, no timeout beyond the browser's own.
pub async fn append(config: &RemoteConfig, content: &str) -> Result<(), SubmitError> {
    let request = InsertRequest::new(config, content)?;
    let request = request.to_request().map_err(transport_error)?;
    let window =
        web_sys::window().ok_or_else(|| SubmitError::Transport("no window".to_string()))?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport_error)?;
    let response: Response = response.dyn_into().map_err(transport_error)?;
    if response.ok() {
        return Ok(());
    }

    let body = match response.text() {
        Ok(promise) => JsFuture::from(promise)
            .await
            .ok()
            .and_then(|v| v.as_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    };
    Err(remote_error(response.status(), &body))
}

fn transport_error(err: JsValue) -> SubmitError {
    let message = Reflect::get(&err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_default();
    SubmitError::Transport(message)
}

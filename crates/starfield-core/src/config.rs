use js_sys::Reflect;
use wasm_bindgen::JsValue;

use crate::error::SubmitError;

pub const PLACEHOLDER_URL: &str = "YOUR_SUPABASE_URL_HERE";
pub const PLACEHOLDER_KEY: &str = "YOUR_SUPABASE_ANON_KEY_HERE";
pub const DEFAULT_TABLE: &str = "questions";

const EMBEDDED_URL: Option<&str> = option_env!("STARFIELD_REMOTE_URL");
const EMBEDDED_KEY: Option<&str> = option_env!("STARFIELD_REMOTE_KEY");

/// Where submitted messages go: a PostgREST-style project URL, its public
/// access key, and the table that receives one row per message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub access_key: String,
    pub table: String,
}

impl Default for RemoteConfig {
    /// Credentials baked in at build time, or the placeholders when the build
    /// did not provide them.
    fn default() -> Self {
        Self {
            base_url: EMBEDDED_URL.unwrap_or(PLACEHOLDER_URL).to_string(),
            access_key: EMBEDDED_KEY.unwrap_or(PLACEHOLDER_KEY).to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl RemoteConfig {
    pub fn new(base_url: &str, access_key: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            access_key: access_key.to_string(),
            table: DEFAULT_TABLE.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        is_set(&self.base_url, PLACEHOLDER_URL)
            && is_set(&self.access_key, PLACEHOLDER_KEY)
            && !self.table.trim().is_empty()
    }

    /// Insert endpoint for the configured table. Fails closed while either
    /// credential is blank or still the placeholder.
    pub fn endpoint(&self) -> Result<String, SubmitError> {
        if !self.is_configured() {
            return Err(SubmitError::NotConfigured);
        }
        Ok(format!(
            "{}/rest/v1/{}",
            self.base_url.trim().trim_end_matches('/'),
            self.table.trim()
        ))
    }

    /// Overlays `remoteUrl`, `remoteKey` and `table` from a JS options object.
    pub fn apply_options(&mut self, options: &JsValue) {
        if let Some(url) = get_string(options, "remoteUrl") {
            self.base_url = url;
        }
        if let Some(key) = get_string(options, "remoteKey") {
            self.access_key = key;
        }
        if let Some(table) = get_string(options, "table") {
            self.table = table;
        }
    }
}

fn is_set(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != placeholder
}

/// DOM element ids the page is wired to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageConfig {
    pub canvas_id: String,
    pub form_id: String,
    pub input_id: String,
    pub status_id: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            canvas_id: "starCanvas".to_string(),
            form_id: "questionForm".to_string(),
            input_id: "question".to_string(),
            status_id: "statusMessage".to_string(),
        }
    }
}

impl PageConfig {
    pub fn apply_options(&mut self, options: &JsValue) {
        if let Some(v) = get_string(options, "canvasId") {
            self.canvas_id = v;
        }
        if let Some(v) = get_string(options, "formId") {
            self.form_id = v;
        }
        if let Some(v) = get_string(options, "inputId") {
            self.input_id = v;
        }
        if let Some(v) = get_string(options, "statusId") {
            self.status_id = v;
        }
    }
}

/// Both halves of the mount configuration, read from the optional object
/// handed to `mount`.
#[derive(Clone, Debug, Default)]
pub struct MountConfig {
    pub page: PageConfig,
    pub remote: RemoteConfig,
}

impl MountConfig {
    pub fn from_options(options: &JsValue) -> Self {
        let mut config = Self::default();
        if options.is_object() {
            config.page.apply_options(options);
            config.remote.apply_options(options);
        }
        config
    }
}

fn get_string(obj: &JsValue, key: &str) -> Option<String> {
    let v = Reflect::get(obj, &JsValue::from_str(key)).ok()?;
    if v.is_undefined() || v.is_null() {
        return None;
    }
    v.as_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_fail_closed() {
        let config = RemoteConfig::new(PLACEHOLDER_URL, PLACEHOLDER_KEY);
        assert!(!config.is_configured());
        assert!(matches!(config.endpoint(), Err(SubmitError::NotConfigured)));
    }

    #[test]
    fn test_one_missing_credential_fails_closed() {
        let no_key = RemoteConfig::new("https://abc.supabase.co", "  ");
        assert!(matches!(no_key.endpoint(), Err(SubmitError::NotConfigured)));

        let no_url = RemoteConfig::new("", "anon-key");
        assert!(matches!(no_url.endpoint(), Err(SubmitError::NotConfigured)));
    }

    #[test]
    fn test_endpoint_targets_table() {
        let config = RemoteConfig::new("https://abc.supabase.co/", "anon-key");
        assert_eq!(
            config.endpoint().unwrap(),
            "https://abc.supabase.co/rest/v1/questions"
        );

        let mut other = config.clone();
        other.table = "feedback".to_string();
        assert_eq!(
            other.endpoint().unwrap(),
            "https://abc.supabase.co/rest/v1/feedback"
        );
    }

    #[test]
    fn test_blank_table_fails_closed() {
        let mut config = RemoteConfig::new("https://abc.supabase.co", "anon-key");
        config.table = String::new();
        assert!(config.endpoint().is_err());
    }

    #[test]
    fn test_default_page_ids() {
        let page = PageConfig::default();
        assert_eq!(page.canvas_id, "starCanvas");
        assert_eq!(page.form_id, "questionForm");
        assert_eq!(page.input_id, "question");
        assert_eq!(page.status_id, "statusMessage");
    }
}
